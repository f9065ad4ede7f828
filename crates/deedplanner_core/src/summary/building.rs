//! Rooms, buildings and the part of each tile they own

use crate::key::EntityType;
use std::fmt::Write;

/// Which slots of a tile belong to a room or building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilePart {
    /// Interior tile: floors, roofs, walls, decorations
    Everything,
    /// Only the wall on the south edge (the room lies to the south)
    HorizontalWallOnly,
    /// Only the wall on the west edge (the room lies to the west)
    VerticalWallOnly,
    /// Both edge walls, nothing else
    WallsOnly,
}

impl TilePart {
    /// Whether entities in a slot of `entity_type` are part of this
    pub fn includes(&self, entity_type: EntityType) -> bool {
        match self {
            TilePart::Everything => true,
            TilePart::HorizontalWallOnly => entity_type.is_horizontal_wall(),
            TilePart::VerticalWallOnly => entity_type.is_vertical_wall(),
            TilePart::WallsOnly => entity_type.is_horizontal_wall() || entity_type.is_vertical_wall(),
        }
    }

    pub fn includes_floor(&self) -> bool {
        *self == TilePart::Everything
    }

    pub fn includes_vertical_wall(&self) -> bool {
        matches!(
            self,
            TilePart::Everything | TilePart::VerticalWallOnly | TilePart::WallsOnly
        )
    }

    pub fn includes_horizontal_wall(&self) -> bool {
        matches!(
            self,
            TilePart::Everything | TilePart::HorizontalWallOnly | TilePart::WallsOnly
        )
    }

    /// Smallest part covering both
    pub fn merge(self, other: TilePart) -> TilePart {
        match (self, other) {
            (TilePart::Everything, _) | (_, TilePart::Everything) => TilePart::Everything,
            (a, b) if a == b => a,
            _ => TilePart::WallsOnly,
        }
    }
}

/// One tile of a room or building and the part of it that counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSummary {
    pub x: i32,
    pub y: i32,
    pub part: TilePart,
}

/// An enclosed region of tiles bounded by house walls
#[derive(Debug, Clone)]
pub struct Room {
    pub(crate) tiles: Vec<TileSummary>,
}

impl Room {
    /// Interior tiles plus the neighbouring tiles holding the room's north
    /// and east walls
    pub fn tiles(&self) -> &[TileSummary] {
        &self.tiles
    }

    /// Number of interior tiles
    pub fn interior_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| tile.part == TilePart::Everything)
            .count()
    }

    pub fn create_summary(&self) -> String {
        let mut summary = String::new();
        let _ = writeln!(summary, "Room with {} tiles:", self.interior_count());
        for tile in &self.tiles {
            let _ = writeln!(summary, "  ({}, {}) {:?}", tile.x, tile.y, tile.part);
        }
        summary
    }
}

/// Rooms joined by shared walls
#[derive(Debug, Clone)]
pub struct Building {
    pub(crate) index: usize,
    pub(crate) rooms: Vec<Room>,
    pub(crate) all_tiles: Vec<TileSummary>,
}

impl PartialEq for Building {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Building {}

impl Building {
    /// Every tile of every room, each listed once with the merged part
    pub fn all_tiles(&self) -> &[TileSummary] {
        &self.all_tiles
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Number of interior tiles
    pub fn tiles_count(&self) -> usize {
        self.all_tiles
            .iter()
            .filter(|tile| tile.part == TilePart::Everything)
            .count()
    }

    pub fn rooms_count(&self) -> usize {
        self.rooms.len()
    }

    /// Carpentry skill needed to plan the building: one per tile plus one
    /// per room beyond the first
    pub fn carpentry_required(&self) -> usize {
        (self.tiles_count() + self.rooms_count()).saturating_sub(1).max(1)
    }

    pub fn create_summary(&self) -> String {
        let mut summary = String::new();
        let _ = writeln!(
            summary,
            "Building with {} rooms and {} tiles, carpentry {}",
            self.rooms_count(),
            self.tiles_count(),
            self.carpentry_required()
        );
        for room in &self.rooms {
            summary.push_str(&room.create_summary());
        }
        summary
    }
}
