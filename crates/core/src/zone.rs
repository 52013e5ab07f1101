//! Materialized zone: floors of super-tile areas with layers, objects and
//! sections.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Direction, EnemyKind};

/// Pixels per tile.
pub const TILE_SIZE: i32 = 16;
/// Tiles per node-grid half-cell side.
pub const HALF_CELL_TILES: i32 = 16;
/// Tiles per super-tile area side.
pub const AREA_TILES: i32 = 2 * HALF_CELL_TILES;

pub const FLOOR_LAYER: &str = "floor";
pub const FIELD_LAYER: &str = "field";

pub mod tiles {
    pub const EMPTY: u16 = 0;
    pub const FLOOR: u16 = 1;
    pub const WALL: u16 = 2;
    pub const LIGHT_STONE: u16 = 3;
    pub const GAP: u16 = 4;
    pub const BUSH: u16 = 5;
    pub const ROCK: u16 = 6;
    pub const TALL_GRASS: u16 = 7;
    pub const PATH: u16 = 8;
    pub const SPECIAL_FLOOR: u16 = 9;
}

/// Tile-space rectangle relative to its area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl TileRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(self) -> i32 {
        self.x + self.w - 1
    }

    pub fn bottom(self) -> i32 {
        self.y + self.h - 1
    }

    pub fn inset(self, amount: i32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.w - 2 * amount).max(0),
            (self.h - 2 * amount).max(0),
        )
    }

    pub fn grow(self, amount: i32) -> Self {
        Self::new(self.x - amount, self.y - amount, self.w + 2 * amount, self.h + 2 * amount)
    }

    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn intersection(self, other: TileRect) -> Option<TileRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right >= x && bottom >= y).then(|| TileRect::new(x, y, right - x + 1, bottom - y + 1))
    }

    pub fn tiles(self) -> impl Iterator<Item = (i32, i32)> {
        (self.y..self.y + self.h).flat_map(move |y| (self.x..self.x + self.w).map(move |x| (x, y)))
    }

    pub fn center(self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

/// Row-major tile ids for one area layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TileGrid {
    pub w: i32,
    pub h: i32,
    pub tiles: Vec<u16>,
}

impl TileGrid {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h, tiles: vec![tiles::EMPTY; (w * h) as usize] }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.w && y < self.h).then(|| (y * self.w + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        self.index(x, y).map(|index| self.tiles[index])
    }

    /// Out-of-grid writes are dropped.
    pub fn set(&mut self, x: i32, y: i32, tile: u16) {
        if let Some(index) = self.index(x, y) {
            self.tiles[index] = tile;
        }
    }

    pub fn fill(&mut self, rect: TileRect, tile: u16) {
        for (x, y) in rect.tiles() {
            self.set(x, y, tile);
        }
    }

    /// Outline of `rect`, `thickness` tiles deep.
    pub fn frame(&mut self, rect: TileRect, thickness: i32, tile: u16) {
        let inner = rect.inset(thickness);
        for (x, y) in rect.tiles() {
            if inner.w == 0 || inner.h == 0 || !inner.contains(x, y) {
                self.set(x, y, tile);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AreaLayer {
    pub key: String,
    pub grid: TileGrid,
}

/// Camera and logic scope inside an area; `node` names the room it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AreaSection {
    pub rect: TileRect,
    pub node: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorType {
    Door,
    StairsUp,
    StairsDown,
    Entrance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorStatus {
    Normal,
    ClosedEnemy,
    Locked,
    BigKeyLocked,
}

impl DoorStatus {
    pub fn is_lock(self) -> bool {
        matches!(self, Self::Locked | Self::BigKeyLocked)
    }
}

/// Object positions are pixels relative to the owning area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DoorDefinition {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub direction: Direction,
    pub door_type: DoorType,
    pub status: DoorStatus,
    pub target_zone: Option<String>,
    pub target_object_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "amount")]
pub enum ChestContents {
    Money(u32),
    SmallKey,
    BigKey,
    BigTreasure,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChestDefinition {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub contents: ChestContents,
    pub hidden_until_cleared: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnemyDefinition {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub enemy: EnemyKind,
    pub boss: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ObjectDefinition {
    Door(DoorDefinition),
    Chest(ChestDefinition),
    Enemy(EnemyDefinition),
}

impl ObjectDefinition {
    pub fn id(&self) -> &str {
        match self {
            Self::Door(door) => &door.id,
            Self::Chest(chest) => &chest.id,
            Self::Enemy(enemy) => &enemy.id,
        }
    }

    pub fn as_door(&self) -> Option<&DoorDefinition> {
        match self {
            Self::Door(door) => Some(door),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AreaDefinition {
    pub layers: Vec<AreaLayer>,
    pub objects: Vec<ObjectDefinition>,
    pub sections: Vec<AreaSection>,
}

impl AreaDefinition {
    pub fn layer(&self, key: &str) -> Option<&TileGrid> {
        self.layers.iter().find(|layer| layer.key == key).map(|layer| &layer.grid)
    }

    /// The named layer, created empty on first use.
    pub fn layer_mut(&mut self, key: &str) -> &mut TileGrid {
        let index = match self.layers.iter().position(|layer| layer.key == key) {
            Some(index) => index,
            None => {
                self.layers.push(AreaLayer {
                    key: key.to_string(),
                    grid: TileGrid::new(AREA_TILES, AREA_TILES),
                });
                self.layers.len() - 1
            }
        };
        &mut self.layers[index].grid
    }

    pub fn doors(&self) -> impl Iterator<Item = &DoorDefinition> {
        self.objects.iter().filter_map(ObjectDefinition::as_door)
    }
}

/// The same layer on an area and its spirit twin, created where missing.
pub fn layer_pair<'a>(
    base: &'a mut AreaDefinition,
    spirit: &'a mut AreaDefinition,
    key: &str,
) -> (&'a mut TileGrid, &'a mut TileGrid) {
    (base.layer_mut(key), spirit.layer_mut(key))
}

/// One floor. Both grids are indexed `[row][column]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZoneFloor {
    pub z: i32,
    pub grid: Vec<Vec<AreaDefinition>>,
    pub spirit_grid: Vec<Vec<AreaDefinition>>,
}

impl ZoneFloor {
    pub fn new(z: i32, columns: usize, rows: usize) -> Self {
        let blank = vec![vec![AreaDefinition::default(); columns]; rows];
        Self { z, grid: blank.clone(), spirit_grid: blank }
    }

    pub fn areas(&self) -> impl Iterator<Item = &AreaDefinition> {
        self.grid.iter().flatten()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub key: String,
    pub floors: Vec<ZoneFloor>,
}

impl Zone {
    pub fn empty(key: &str) -> Self {
        Self { key: key.to_string(), floors: Vec::new() }
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectDefinition> {
        self.floors
            .iter()
            .flat_map(|floor| floor.grid.iter().chain(&floor.spirit_grid).flatten())
            .flat_map(|area| &area.objects)
    }

    pub fn doors(&self) -> impl Iterator<Item = &DoorDefinition> {
        self.objects().filter_map(ObjectDefinition::as_door)
    }

    pub fn find_object(&self, id: &str) -> Option<&ObjectDefinition> {
        self.objects().find(|object| object.id() == id)
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        push_str(&mut bytes, &self.key);
        bytes.extend((self.floors.len() as u32).to_le_bytes());
        for floor in &self.floors {
            bytes.extend(floor.z.to_le_bytes());
            for grid in [&floor.grid, &floor.spirit_grid] {
                bytes.extend((grid.len() as u32).to_le_bytes());
                for row in grid {
                    bytes.extend((row.len() as u32).to_le_bytes());
                    for area in row {
                        push_area(&mut bytes, area);
                    }
                }
            }
        }
        bytes
    }

    /// Stable hash of `canonical_bytes`; equal fingerprints mean equal zones.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn push_str(bytes: &mut Vec<u8>, value: &str) {
    bytes.extend((value.len() as u32).to_le_bytes());
    bytes.extend(value.as_bytes());
}

fn push_opt_str(bytes: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(value) => {
            bytes.push(1);
            push_str(bytes, value);
        }
        None => bytes.push(0),
    }
}

fn push_rect(bytes: &mut Vec<u8>, rect: TileRect) {
    for value in [rect.x, rect.y, rect.w, rect.h] {
        bytes.extend(value.to_le_bytes());
    }
}

fn push_area(bytes: &mut Vec<u8>, area: &AreaDefinition) {
    bytes.extend((area.sections.len() as u32).to_le_bytes());
    for section in &area.sections {
        push_rect(bytes, section.rect);
        push_opt_str(bytes, section.node.as_deref());
    }
    bytes.extend((area.layers.len() as u32).to_le_bytes());
    for layer in &area.layers {
        push_str(bytes, &layer.key);
        for tile in &layer.grid.tiles {
            bytes.extend(tile.to_le_bytes());
        }
    }
    bytes.extend((area.objects.len() as u32).to_le_bytes());
    for object in &area.objects {
        push_object(bytes, object);
    }
}

fn push_object(bytes: &mut Vec<u8>, object: &ObjectDefinition) {
    match object {
        ObjectDefinition::Door(door) => {
            bytes.push(0);
            push_str(bytes, &door.id);
            for value in [door.x, door.y, door.w, door.h] {
                bytes.extend(value.to_le_bytes());
            }
            bytes.push(door.direction as u8);
            bytes.push(door.door_type as u8);
            bytes.push(door.status as u8);
            push_opt_str(bytes, door.target_zone.as_deref());
            push_opt_str(bytes, door.target_object_id.as_deref());
        }
        ObjectDefinition::Chest(chest) => {
            bytes.push(1);
            push_str(bytes, &chest.id);
            bytes.extend(chest.x.to_le_bytes());
            bytes.extend(chest.y.to_le_bytes());
            let (tag, amount) = match chest.contents {
                ChestContents::Money(amount) => (0, amount),
                ChestContents::SmallKey => (1, 0),
                ChestContents::BigKey => (2, 0),
                ChestContents::BigTreasure => (3, 0),
            };
            bytes.push(tag);
            bytes.extend(amount.to_le_bytes());
            bytes.push(u8::from(chest.hidden_until_cleared));
        }
        ObjectDefinition::Enemy(enemy) => {
            bytes.push(2);
            push_str(bytes, &enemy.id);
            bytes.extend(enemy.x.to_le_bytes());
            bytes.extend(enemy.y.to_le_bytes());
            bytes.push(enemy.enemy as u8);
            bytes.push(u8::from(enemy.boss));
        }
    }
}
