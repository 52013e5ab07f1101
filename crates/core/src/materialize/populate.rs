//! Room interiors: loot, enemies and decoration.

use std::collections::BTreeSet;

use log::debug;

use super::ZoneBuild;
use super::skeletons::{RoomLayout, Skeleton};
use crate::random::ZoneRng;
use crate::tree::{AreaBinding, NodeId};
use crate::types::{EnemyKind, KeyKind, RoomPopulator, RoomType};
use crate::zone::{
    AreaDefinition, ChestContents, ChestDefinition, EnemyDefinition, FIELD_LAYER, FLOOR_LAYER,
    ObjectDefinition, TILE_SIZE, TileRect, tiles,
};

/// Slots sit this many tiles inside the room edge, clear of walls and doors.
pub const INTERIOR_INSET: i32 = 4;
pub const PATH_DECOR_CHANCE: f64 = 0.2;

const ENEMIES: [EnemyKind; 4] =
    [EnemyKind::Beetle, EnemyKind::Snake, EnemyKind::Flameling, EnemyKind::Stoneguard];
const DECOR: [(u16, u16); 3] = [
    (tiles::BUSH, tiles::TALL_GRASS),
    (tiles::ROCK, tiles::LIGHT_STONE),
    (tiles::TALL_GRASS, tiles::BUSH),
];

/// Weighted treasure roll: 10% 100, 40% 50, 50% 20.
pub fn roll_loot(rng: &mut ZoneRng) -> u32 {
    let roll = rng.random();
    if roll < 0.1 {
        100
    } else if roll < 0.5 {
        50
    } else {
        20
    }
}

/// What a room must hold, decided before any slot is filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomNeeds {
    pub loot: Option<ChestContents>,
    pub enemies: bool,
    pub boss: bool,
    pub hidden_loot: bool,
    pub depth: u32,
}

impl RoomNeeds {
    pub fn min_slots(&self, rng: &mut ZoneRng) -> usize {
        let loot = usize::from(self.loot.is_some());
        let enemy = self.enemies || (loot > 0 && rng.chance(0.5));
        loot + usize::from(enemy)
    }
}

struct RoomFill<'a> {
    id_prefix: String,
    area: &'a mut AreaDefinition,
    rng: &'a mut ZoneRng,
    enemies_placed: usize,
}

impl RoomFill<'_> {
    fn chest(&mut self, slot: TileRect, contents: ChestContents, hidden_until_cleared: bool) {
        self.area.layer_mut(FLOOR_LAYER).fill(slot, tiles::SPECIAL_FLOOR);
        let (x, y) = slot.center();
        self.area.objects.push(ObjectDefinition::Chest(ChestDefinition {
            id: format!("{}:chest", self.id_prefix),
            x: x * TILE_SIZE,
            y: y * TILE_SIZE,
            contents,
            hidden_until_cleared,
        }));
    }

    fn enemy(&mut self, slot: TileRect, enemy: EnemyKind, boss: bool) {
        let (x, y) = slot.center();
        self.area.objects.push(ObjectDefinition::Enemy(EnemyDefinition {
            id: format!("{}:enemy{}", self.id_prefix, self.enemies_placed),
            x: x * TILE_SIZE,
            y: y * TILE_SIZE,
            enemy,
            boss,
        }));
        self.enemies_placed += 1;
    }

    /// Outer tiles on a 1-2 tile border, inner tiles in the middle; only open
    /// ground is covered.
    fn decorate(&mut self, slot: TileRect) {
        let (outer, inner) =
            self.rng.element(&DECOR).copied().unwrap_or((tiles::BUSH, tiles::TALL_GRASS));
        let thickness = self.rng.range(1, 2);
        let core = slot.inset(thickness);
        let field = self.area.layer_mut(FIELD_LAYER);
        for (x, y) in slot.tiles() {
            if field.get(x, y) != Some(tiles::EMPTY) {
                continue;
            }
            let tile = if core.w > 0 && core.h > 0 && core.contains(x, y) { inner } else { outer };
            field.set(x, y, tile);
        }
    }
}

pub fn populate_rooms(build: &mut ZoneBuild<'_>, enemy_rooms: &BTreeSet<NodeId>, rng: &ZoneRng) {
    for (index, id) in build.tree.depth_first().into_iter().enumerate() {
        if build.tree[id].area.is_none() {
            continue;
        }
        let Some((binding, rect)) = build.room(id) else {
            continue;
        };
        let mut room_rng = rng.fork(index as u64);
        populate_room(build, id, binding, rect, enemy_rooms.contains(&id), &mut room_rng);
    }
}

fn populate_room(
    build: &mut ZoneBuild<'_>,
    id: NodeId,
    binding: AreaBinding,
    rect: TileRect,
    enemy_gated: bool,
    rng: &mut ZoneRng,
) {
    let node = &build.tree[id];
    let room_type = node.room_type;
    let populator = node.populate_room;
    let key = node.key;
    let depth = node.depth;
    let prefix = node.id.clone().unwrap_or_else(|| node.name());

    let loot_amount = (room_type == RoomType::Treasure).then(|| roll_loot(rng));
    build.tree[id].loot_amount = loot_amount;
    let contents = match (key, room_type) {
        (Some(KeyKind::Small), _) => Some(ChestContents::SmallKey),
        (Some(KeyKind::Big), _) => Some(ChestContents::BigKey),
        (None, RoomType::BigChest) => Some(ChestContents::BigTreasure),
        (None, RoomType::Treasure) => loot_amount.map(ChestContents::Money),
        (None, _) => None,
    };
    let needs = RoomNeeds {
        loot: contents,
        enemies: enemy_gated || matches!(room_type, RoomType::Trap | RoomType::Boss),
        boss: room_type == RoomType::Boss,
        hidden_loot: false,
        depth,
    };
    let hidden_loot = needs.enemies && room_type != RoomType::BigChest;
    let needs = RoomNeeds { hidden_loot, ..needs };

    let (area, _) = build.area_pair(binding);
    let mut fill = RoomFill { id_prefix: prefix, area, rng, enemies_placed: 0 };
    if let Some(populator) = populator {
        run_populator(&mut fill, populator, rect, needs);
        return;
    }

    let interior = rect.inset(INTERIOR_INSET);
    let min_slots = needs.min_slots(fill.rng);
    let mut layout = Skeleton::roll(fill.rng).generate(fill.rng, interior);
    if layout.slots.len() < min_slots {
        layout = Skeleton::EmptyRoom.generate(fill.rng, interior);
    }
    fill_slots(&mut fill, &mut layout, needs);
    debug!("populated {} with {} slots", fill.id_prefix, layout.slots.len());
}

fn run_populator(
    fill: &mut RoomFill<'_>,
    populator: RoomPopulator,
    rect: TileRect,
    needs: RoomNeeds,
) {
    let (x, y) = rect.center();
    let middle = TileRect::new(x - 1, y - 1, 2, 2);
    match populator {
        RoomPopulator::Empty => {}
        RoomPopulator::BossArena { enemy } => fill.enemy(middle, enemy, true),
        RoomPopulator::Shrine => {
            let contents = needs.loot.unwrap_or(ChestContents::Money(20));
            fill.chest(middle, contents, false);
        }
    }
}

/// Slots are filled left to right: the chest, then the enemy the room must
/// have, then enemies drawn against the depth budget, then decoration.
fn fill_slots(fill: &mut RoomFill<'_>, layout: &mut RoomLayout, needs: RoomNeeds) {
    layout.slots.sort_by_key(|slot| (slot.x, slot.y));
    let mut loot = needs.loot;
    let mut enemy_required = needs.enemies;
    let mut budget = 1 + needs.depth / 3;

    for &slot in &layout.slots {
        if let Some(contents) = loot.take() {
            fill.chest(slot, contents, needs.hidden_loot);
        } else if enemy_required {
            enemy_required = false;
            let enemy = if needs.boss { EnemyKind::Guardian } else { pick_enemy(fill.rng) };
            fill.enemy(slot, enemy, needs.boss);
            budget = budget.saturating_sub(1);
        } else if budget > 0 && fill.rng.chance(f64::from(budget) / f64::from(budget + 1)) {
            let enemy = pick_enemy(fill.rng);
            fill.enemy(slot, enemy, false);
            budget -= 1;
        } else {
            fill.decorate(slot);
        }
    }

    for &path in &layout.paths {
        if fill.rng.chance(PATH_DECOR_CHANCE) {
            fill.area.layer_mut(FLOOR_LAYER).fill(path, tiles::PATH);
        }
    }
}

fn pick_enemy(rng: &mut ZoneRng) -> EnemyKind {
    rng.element(&ENEMIES).copied().unwrap_or(EnemyKind::Beetle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> AreaDefinition {
        let mut area = AreaDefinition::default();
        area.layer_mut(FIELD_LAYER);
        area
    }

    fn filler<'a>(
        prefix: &str,
        area: &'a mut AreaDefinition,
        rng: &'a mut ZoneRng,
    ) -> RoomFill<'a> {
        RoomFill { id_prefix: prefix.to_string(), area, rng, enemies_placed: 0 }
    }

    #[test]
    fn loot_roll_only_yields_known_amounts() {
        let mut rng = ZoneRng::new(8);
        let mut seen = BTreeSet::new();
        for _ in 0..400 {
            seen.insert(roll_loot(&mut rng));
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![20, 50, 100]);
    }

    #[test]
    fn chest_comes_first_and_hides_behind_enemies() {
        let mut area = room();
        let mut rng = ZoneRng::new(3);
        let mut fill = filler("n4", &mut area, &mut rng);
        let mut layout = RoomLayout {
            slots: vec![
                TileRect::new(10, 4, 3, 3),
                TileRect::new(4, 4, 3, 3),
                TileRect::new(4, 10, 3, 3),
            ],
            paths: Vec::new(),
        };
        let needs = RoomNeeds {
            loot: Some(ChestContents::SmallKey),
            enemies: true,
            boss: false,
            hidden_loot: true,
            depth: 0,
        };

        fill_slots(&mut fill, &mut layout, needs);

        let chest = area.objects.iter().find_map(|object| match object {
            ObjectDefinition::Chest(chest) => Some(chest.clone()),
            _ => None,
        });
        let chest = chest.expect("chest placed");
        let origin = (5 * TILE_SIZE, 5 * TILE_SIZE);
        assert_eq!((chest.x, chest.y), origin, "leftmost slot holds the chest");
        assert!(chest.hidden_until_cleared);
        assert_eq!(chest.contents, ChestContents::SmallKey);
        assert!(area.objects.iter().any(|object| matches!(object, ObjectDefinition::Enemy(_))));
        let floor = area.layer(FLOOR_LAYER).and_then(|grid| grid.get(4, 4));
        assert_eq!(floor, Some(tiles::SPECIAL_FLOOR));
    }

    #[test]
    fn boss_rooms_get_a_boss() {
        let mut area = room();
        let mut rng = ZoneRng::new(5);
        let mut fill = filler("n9", &mut area, &mut rng);
        let mut layout = RoomLayout { slots: vec![TileRect::new(4, 4, 3, 3)], paths: Vec::new() };
        let needs =
            RoomNeeds { loot: None, enemies: true, boss: true, hidden_loot: false, depth: 6 };

        fill_slots(&mut fill, &mut layout, needs);

        assert_eq!(
            area.objects,
            vec![ObjectDefinition::Enemy(EnemyDefinition {
                id: "n9:enemy0".to_string(),
                x: 5 * TILE_SIZE,
                y: 5 * TILE_SIZE,
                enemy: EnemyKind::Guardian,
                boss: true,
            })]
        );
    }

    #[test]
    fn decoration_never_covers_walls() {
        let mut area = room();
        area.layer_mut(FIELD_LAYER).set(4, 4, tiles::WALL);
        let mut rng = ZoneRng::new(12);
        let mut fill = filler("n1", &mut area, &mut rng);
        fill.decorate(TileRect::new(4, 4, 3, 3));

        let field = area.layer(FIELD_LAYER).expect("field layer");
        assert_eq!(field.get(4, 4), Some(tiles::WALL));
        let covered = TileRect::new(4, 4, 3, 3)
            .tiles()
            .skip(1)
            .all(|(x, y)| field.get(x, y) != Some(tiles::EMPTY));
        assert!(covered);
    }

    #[test]
    fn minimum_slots_count_loot_and_enemies() {
        let mut rng = ZoneRng::new(1);
        let guarded = RoomNeeds {
            loot: Some(ChestContents::BigKey),
            enemies: true,
            boss: false,
            hidden_loot: true,
            depth: 1,
        };
        assert_eq!(guarded.min_slots(&mut rng), 2);
        let empty =
            RoomNeeds { loot: None, enemies: false, boss: false, hidden_loot: false, depth: 1 };
        assert_eq!(empty.min_slots(&mut rng), 0);
    }
}
