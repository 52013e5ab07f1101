use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Position on the node grid. `z` is the floor, larger is higher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub z: i32,
    pub y: i32,
    pub x: i32,
}

impl Coords {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { z, y, x }
    }
}

/// Footprint size in node-grid half-cells; each axis is 1 or 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub w: i32,
    pub h: i32,
}

impl Dimensions {
    pub const UNIT: Self = Self { w: 1, h: 1 };

    pub fn from_flags(wide: Option<bool>, tall: Option<bool>) -> Self {
        Self {
            w: if wide == Some(true) { 2 } else { 1 },
            h: if tall == Some(true) { 2 } else { 1 },
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Opaque capability token. Placement and materialization only compare these.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    HasSmallKey,
    HasBigKey,
    HasWeapon,
    CanCross2Gaps,
    CanRemoveLightStones,
    Custom(String),
}

/// One gate: every capability in the group is needed together.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirement(pub Vec<Capability>);

impl Requirement {
    pub fn single(capability: Capability) -> Self {
        Self(vec![capability])
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    /// Lock kind for this gate. A big key outranks a small key.
    pub fn lock(&self) -> Option<KeyKind> {
        if self.contains(&Capability::HasBigKey) {
            Some(KeyKind::Big)
        } else if self.contains(&Capability::HasSmallKey) {
            Some(KeyKind::Small)
        } else {
            None
        }
    }

    pub fn is_weapon_gate(&self) -> bool {
        self.contains(&Capability::HasWeapon)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    #[default]
    Normal,
    Boss,
    Trap,
    Treasure,
    BigChest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    Small,
    Big,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Beetle,
    Snake,
    Flameling,
    Stoneguard,
    Guardian,
}

/// Replacement for the generic interior fill of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RoomPopulator {
    /// Leave the carved shell bare.
    Empty,
    /// One boss-flagged enemy in the middle of the room.
    BossArena { enemy: EnemyKind },
    /// A single visible chest in the middle of the room.
    Shrine,
}

/// Running extent of every placed footprint. Only ever widens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub z_min: i32,
    pub z_max: i32,
}

impl Bounds {
    pub fn around(origin: Coords, dimensions: Dimensions) -> Self {
        Self {
            x_min: origin.x,
            x_max: origin.x + dimensions.w - 1,
            y_min: origin.y,
            y_max: origin.y + dimensions.h - 1,
            z_min: origin.z,
            z_max: origin.z,
        }
    }

    pub fn include(&mut self, origin: Coords, dimensions: Dimensions) {
        self.x_min = self.x_min.min(origin.x);
        self.x_max = self.x_max.max(origin.x + dimensions.w - 1);
        self.y_min = self.y_min.min(origin.y);
        self.y_max = self.y_max.max(origin.y + dimensions.h - 1);
        self.z_min = self.z_min.min(origin.z);
        self.z_max = self.z_max.max(origin.z);
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
            && self.z_min <= other.z_min
            && self.z_max >= other.z_max
    }

    pub fn floor_count(&self) -> usize {
        (self.z_max - self.z_min + 1) as usize
    }
}

/// Hard limits a placement must satisfy. Spans are counted in half-cells
/// (`max_w`, `max_h`) and floors (`max_d`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConstraints {
    pub min_x: i32,
    pub max_x: i32,
    pub max_w: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub max_h: i32,
    pub min_z: i32,
    pub max_z: i32,
    pub max_d: i32,
}

impl Default for ZoneConstraints {
    fn default() -> Self {
        Self {
            min_x: -16,
            max_x: 15,
            max_w: 12,
            min_y: -16,
            max_y: 15,
            max_h: 12,
            min_z: -2,
            max_z: 2,
            max_d: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_only_widens() {
        let mut bounds = Bounds::around(Coords::new(0, 0, 0), Dimensions::UNIT);
        let before = bounds;
        bounds.include(Coords::new(2, -1, 1), Dimensions { w: 2, h: 1 });
        assert!(bounds.contains(&before));
        assert_eq!(bounds.x_max, 3);
        assert_eq!(bounds.y_min, -1);
        assert_eq!(bounds.floor_count(), 2);

        let widened = bounds;
        bounds.include(Coords::new(1, 0, 0), Dimensions::UNIT);
        assert_eq!(bounds, widened, "including an interior cell must not change bounds");
    }

    #[test]
    fn big_key_outranks_small_key_in_mixed_gate() {
        let gate = Requirement(vec![Capability::HasSmallKey, Capability::HasBigKey]);
        assert_eq!(gate.lock(), Some(KeyKind::Big));
        assert_eq!(Requirement::single(Capability::HasWeapon).lock(), None);
    }

    #[test]
    fn footprint_flags_map_to_dimensions() {
        assert_eq!(Dimensions::from_flags(None, None), Dimensions::UNIT);
        assert_eq!(Dimensions::from_flags(Some(true), Some(false)), Dimensions { w: 2, h: 1 });
        assert_eq!(Dimensions::from_flags(Some(false), Some(true)), Dimensions { w: 1, h: 2 });
    }
}
