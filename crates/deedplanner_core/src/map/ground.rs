//! Ground and cave editing: painting, road directions and flood fill

use super::{Map, MapState};
use crate::command::ReversibleCommand;
use crate::data::{CaveData, GroundData};
use crate::entity::{Cave, Ground, RoadDirection};
use crate::error::MapError;
use std::sync::Arc;

/// Swaps a tile's ground with the stashed one
struct GroundChangeCommand {
    x: i32,
    y: i32,
    stash: Ground,
}

impl GroundChangeCommand {
    fn swap(&mut self, state: &mut MapState) {
        if let Some(tile) = state.tile_mut(self.x, self.y) {
            std::mem::swap(&mut tile.ground, &mut self.stash);
        }
        state.refresh_ground_around(self.x, self.y);
    }
}

impl ReversibleCommand<MapState> for GroundChangeCommand {
    fn execute(&mut self, state: &mut MapState) {
        self.swap(state);
    }

    fn undo(&mut self, state: &mut MapState) {
        self.swap(state);
    }

    fn description(&self) -> &str {
        "Change ground"
    }
}

struct CaveChangeCommand {
    x: i32,
    y: i32,
    stash: Cave,
}

impl CaveChangeCommand {
    fn swap(&mut self, state: &mut MapState) {
        if let Some(tile) = state.tile_mut(self.x, self.y) {
            std::mem::swap(&mut tile.cave, &mut self.stash);
        }
    }
}

impl ReversibleCommand<MapState> for CaveChangeCommand {
    fn execute(&mut self, state: &mut MapState) {
        self.swap(state);
    }

    fn undo(&mut self, state: &mut MapState) {
        self.swap(state);
    }

    fn description(&self) -> &str {
        "Change cave"
    }
}

impl MapState {
    /// Push the quadrant textures of one tile to the scene
    pub(crate) fn refresh_ground(&mut self, x: i32, y: i32) {
        let Some(tile) = self.tile(x, y) else {
            return;
        };
        let neighbours = [(-1, 0), (0, 1), (1, 0), (0, -1)]
            .map(|(dx, dy)| self.relative_tile(x, y, dx, dy).map(|t| t.ground()));
        let textures = tile.ground().quadrant_textures(neighbours);
        self.scene.set_ground_textures(x, y, &textures);
    }

    /// Refresh a tile and its four neighbours, whose road blending may
    /// depend on it
    pub(crate) fn refresh_ground_around(&mut self, x: i32, y: i32) {
        self.refresh_ground(x, y);
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            self.refresh_ground(x + dx, y + dy);
        }
    }

    pub(crate) fn refresh_all_ground(&mut self) {
        for x in 0..=self.width {
            for y in 0..=self.height {
                self.refresh_ground(x, y);
            }
        }
    }
}

fn same_ground(a: &GroundData, b: &GroundData) -> bool {
    a.short_name == b.short_name
}

impl Map {
    /// Replace ground data and road direction of one tile in one command.
    /// Returns true when anything changed.
    pub fn paint_ground(
        &mut self,
        x: i32,
        y: i32,
        data: Arc<GroundData>,
        direction: RoadDirection,
    ) -> Result<bool, MapError> {
        self.state.check_buildable(x, y)?;
        let tile = self.state.checked_tile(x, y)?;
        let ground = tile.ground();
        if same_ground(ground.data(), &data) && ground.road_direction() == direction {
            return Ok(false);
        }

        let stash = Ground {
            data,
            road_direction: direction,
        };
        self.execute(Box::new(GroundChangeCommand { x, y, stash }));
        Ok(true)
    }

    /// Replace the ground data, keeping the road direction
    pub fn set_ground_data(&mut self, x: i32, y: i32, data: Arc<GroundData>) -> Result<bool, MapError> {
        let direction = self.state.checked_tile(x, y)?.ground().road_direction();
        self.paint_ground(x, y, data, direction)
    }

    pub fn set_road_direction(&mut self, x: i32, y: i32, direction: RoadDirection) -> Result<bool, MapError> {
        let data = self.state.checked_tile(x, y)?.ground().data().clone();
        self.paint_ground(x, y, data, direction)
    }

    /// Replace the 4-connected region of buildable tiles sharing the ground
    /// of `(x, y)` with `data`. Returns the number of tiles changed.
    pub fn flood_fill_ground(&mut self, x: i32, y: i32, data: Arc<GroundData>) -> Result<usize, MapError> {
        self.state.check_buildable(x, y)?;
        let to_replace = self.state.checked_tile(x, y)?.ground().data().clone();
        if same_ground(&to_replace, &data) {
            return Ok(0);
        }

        let mut changed = 0;
        let mut stack = vec![(x, y)];
        while let Some((ax, ay)) = stack.pop() {
            if self.state.check_buildable(ax, ay).is_err() {
                continue;
            }
            let matches = self
                .state
                .tile(ax, ay)
                .is_some_and(|tile| same_ground(tile.ground().data(), &to_replace));
            if !matches {
                continue;
            }

            self.set_ground_data(ax, ay, data.clone())?;
            changed += 1;
            stack.extend([(ax - 1, ay), (ax + 1, ay), (ax, ay - 1), (ax, ay + 1)]);
        }

        tracing::debug!(tiles = changed, "Flood filled ground with '{}'", data.short_name);
        Ok(changed)
    }

    pub fn set_cave_data(&mut self, x: i32, y: i32, data: Arc<CaveData>) -> Result<bool, MapError> {
        self.state.check_buildable(x, y)?;
        let tile = self.state.checked_tile(x, y)?;
        if tile.cave().data().short_name == data.short_name {
            return Ok(false);
        }
        self.execute(Box::new(CaveChangeCommand {
            x,
            y,
            stash: Cave { data },
        }));
        Ok(true)
    }
}
