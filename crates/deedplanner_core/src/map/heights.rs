//! Corner heights: the height commands and the cached extrema

use super::{LayerFilter, Map, MapState};
use crate::command::ReversibleCommand;
use crate::constants::{HEIGHT_SCALE, TILE_SIZE};
use crate::error::MapError;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeightKind {
    Surface,
    Cave,
    CaveSize,
}

/// Heights of one tile before an edit
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeightSample {
    pub surface: i32,
    pub cave: i32,
}

struct HeightChangeCommand {
    x: i32,
    y: i32,
    kind: HeightKind,
    old_value: i32,
    new_value: i32,
}

impl HeightChangeCommand {
    fn apply(&self, state: &mut MapState, value: i32) {
        let Some(tile) = state.tile_mut(self.x, self.y) else {
            return;
        };
        let previous = HeightSample {
            surface: tile.surface_height,
            cave: tile.cave_height,
        };
        match self.kind {
            HeightKind::Surface => tile.surface_height = value,
            HeightKind::Cave => tile.cave_height = value,
            HeightKind::CaveSize => tile.cave_size = value,
        }

        let filter = match self.kind {
            HeightKind::Surface => LayerFilter::Surface,
            HeightKind::Cave | HeightKind::CaveSize => LayerFilter::Cave,
        };
        // A corner height moves the entities of every tile sharing that corner
        for (dx, dy) in [(0, 0), (-1, 0), (0, -1), (-1, -1)] {
            state.update_entity_positions(self.x + dx, self.y + dy, filter);
        }
        state.recalculate_height(self.x, self.y, previous);
    }
}

impl ReversibleCommand<MapState> for HeightChangeCommand {
    fn execute(&mut self, state: &mut MapState) {
        self.apply(state, self.new_value);
    }

    fn undo(&mut self, state: &mut MapState) {
        self.apply(state, self.old_value);
    }

    fn description(&self) -> &str {
        match self.kind {
            HeightKind::Surface => "Change surface height",
            HeightKind::Cave => "Change cave height",
            HeightKind::CaveSize => "Change cave size",
        }
    }
}

impl MapState {
    /// Full rescan of the four height extrema
    pub fn recalculate_heights(&mut self) {
        let mut lowest_surface = i32::MAX;
        let mut highest_surface = i32::MIN;
        let mut lowest_cave = i32::MAX;
        let mut highest_cave = i32::MIN;

        for tile in &self.tiles {
            lowest_surface = lowest_surface.min(tile.surface_height);
            highest_surface = highest_surface.max(tile.surface_height);
            lowest_cave = lowest_cave.min(tile.cave_height);
            highest_cave = highest_cave.max(tile.cave_height);
        }

        self.lowest_surface_height = lowest_surface;
        self.highest_surface_height = highest_surface;
        self.lowest_cave_height = lowest_cave;
        self.highest_cave_height = highest_cave;
    }

    /// Update the extrema and the height-grid vertex after one tile changed.
    ///
    /// Growing extrema are updated in place. When the tile previously held an
    /// extremum and moved inward the cached value may be stale, so this falls
    /// back to [`MapState::recalculate_heights`].
    pub(crate) fn recalculate_height(&mut self, x: i32, y: i32, previous: HeightSample) {
        let Some(tile) = self.tile(x, y) else {
            return;
        };
        let surface = tile.surface_height;
        let cave = tile.cave_height;

        let surface_stale = (previous.surface == self.highest_surface_height && surface < previous.surface)
            || (previous.surface == self.lowest_surface_height && surface > previous.surface);
        let cave_stale = (previous.cave == self.highest_cave_height && cave < previous.cave)
            || (previous.cave == self.lowest_cave_height && cave > previous.cave);

        if surface_stale || cave_stale {
            self.recalculate_heights();
        } else {
            self.highest_surface_height = self.highest_surface_height.max(surface);
            self.lowest_surface_height = self.lowest_surface_height.min(surface);
            self.highest_cave_height = self.highest_cave_height.max(cave);
            self.lowest_cave_height = self.lowest_cave_height.min(cave);
        }

        self.update_height_vertex(x, y);
    }

    fn update_height_vertex(&mut self, x: i32, y: i32) {
        let Some(tile) = self.tile(x, y) else {
            return;
        };
        let world_x = x as f32 * TILE_SIZE;
        let world_z = y as f32 * TILE_SIZE;
        let surface = Vec3::new(world_x, tile.surface_height as f32 * HEIGHT_SCALE, world_z);
        let cave = Vec3::new(world_x, tile.cave_height as f32 * HEIGHT_SCALE, world_z);
        let index = self.coordinate_to_index(x, y);
        self.scene.update_height_vertex(index, surface, cave);
    }

    /// Push every vertex of both height grids
    pub(crate) fn refresh_height_grid(&mut self) {
        for x in 0..=self.width {
            for y in 0..=self.height {
                self.update_height_vertex(x, y);
            }
        }
    }
}

impl Map {
    fn set_height(&mut self, x: i32, y: i32, kind: HeightKind, value: i32) -> Result<(), MapError> {
        let tile = self.state.checked_tile(x, y)?;
        let old_value = match kind {
            HeightKind::Surface => tile.surface_height,
            HeightKind::Cave => tile.cave_height,
            HeightKind::CaveSize => tile.cave_size,
        };
        if old_value == value {
            return Ok(());
        }
        self.execute(Box::new(HeightChangeCommand {
            x,
            y,
            kind,
            old_value,
            new_value: value,
        }));
        Ok(())
    }

    /// Set the surface height of corner `(x, y)`. Edge tiles are allowed.
    pub fn set_surface_height(&mut self, x: i32, y: i32, height: i32) -> Result<(), MapError> {
        self.set_height(x, y, HeightKind::Surface, height)
    }

    pub fn set_cave_height(&mut self, x: i32, y: i32, height: i32) -> Result<(), MapError> {
        self.set_height(x, y, HeightKind::Cave, height)
    }

    pub fn set_cave_size(&mut self, x: i32, y: i32, size: i32) -> Result<(), MapError> {
        self.set_height(x, y, HeightKind::CaveSize, size)
    }

    /// Full rescan of the height extrema
    pub fn recalculate_heights(&mut self) {
        self.state.recalculate_heights();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_database;

    #[test]
    fn test_raise_and_undo_restores_extrema() {
        let mut map = Map::new(5, 5, &sample_database()).unwrap();
        map.set_surface_height(2, 2, 5).unwrap();
        assert_eq!(map.highest_surface_height(), 5);
        assert_eq!(map.tile(2, 2).unwrap().surface_height(), 5);

        map.undo();
        assert_eq!(map.highest_surface_height(), 0);
        assert_eq!(map.tile(2, 2).unwrap().surface_height(), 0);

        map.redo();
        assert_eq!(map.highest_surface_height(), 5);
    }

    #[test]
    fn test_lowering_non_extreme_tile_keeps_cache() {
        let mut map = Map::new(4, 4, &sample_database()).unwrap();
        map.set_surface_height(0, 0, 20).unwrap();
        map.set_surface_height(1, 1, 10).unwrap();
        map.set_surface_height(1, 1, 5).unwrap();
        assert_eq!(map.highest_surface_height(), 20);
        assert_eq!(map.lowest_surface_height(), 0);
    }

    #[test]
    fn test_cave_extrema() {
        let mut map = Map::new(4, 4, &sample_database()).unwrap();
        map.set_cave_height(3, 3, -12).unwrap();
        assert_eq!(map.lowest_cave_height(), -12);
        assert_eq!(map.highest_cave_height(), 0);
        map.set_cave_height(3, 3, 0).unwrap();
        assert_eq!(map.lowest_cave_height(), 0);
    }

    #[test]
    fn test_same_height_records_nothing() {
        let mut map = Map::new(4, 4, &sample_database()).unwrap();
        map.set_surface_height(1, 1, 0).unwrap();
        assert!(!map.can_undo());
        map.set_cave_size(1, 1, 30).unwrap();
        map.set_cave_size(1, 1, 30).unwrap();
        assert_eq!(map.undo_len(), 1);
    }

    #[test]
    fn test_edge_tile_height_allowed() {
        let mut map = Map::new(3, 3, &sample_database()).unwrap();
        assert!(map.set_surface_height(3, 3, 7).is_ok());
        assert_eq!(
            map.set_surface_height(4, 3, 7),
            Err(MapError::TileOutOfBounds { x: 4, y: 3 })
        );
    }
}
