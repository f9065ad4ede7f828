//! Roof level and shape recalculation
//!
//! Runs in two passes over the whole map. The first settles every roof's
//! level; the second derives each roof's shape from the settled levels of its
//! neighbours, so the result does not depend on visiting order.

use super::{Map, MapState};
use crate::constants::FLOOR_LIMIT;
use crate::entity::{EntityKind, RoofShape};
use crate::key::{EntityKey, EntityType};
use std::collections::HashMap;

/// Cardinal neighbours in N, E, S, W order
const CARDINALS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Diagonal neighbours in NE, SE, SW, NW order
const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Yaw of a roof slope falling towards each cardinal side
const SIDE_ROTATIONS: [f32; 4] = [180.0, 270.0, 0.0, 90.0];

/// Yaw of an inner corner opening towards each diagonal
const CORNER_ROTATIONS: [f32; 4] = [180.0, 270.0, 0.0, 90.0];

type RoofPosition = (i32, i32, i32);

impl MapState {
    fn roof_positions(&self) -> Vec<RoofPosition> {
        let mut positions = Vec::new();
        for tile in &self.tiles {
            for floor in 0..FLOOR_LIMIT {
                if tile.tile_content(floor).and_then(|e| e.as_roof()).is_some() {
                    positions.push((tile.x(), tile.y(), floor));
                }
            }
        }
        positions
    }

    fn has_roof(&self, x: i32, y: i32, floor: i32) -> bool {
        self.tile(x, y)
            .and_then(|tile| tile.tile_content(floor))
            .and_then(|entity| entity.as_roof())
            .is_some()
    }

    /// Chebyshev distance to the nearest tile without a roof on the same
    /// floor, minus one. A lone roof is level 0.
    fn roof_level(&self, x: i32, y: i32, floor: i32) -> i32 {
        let max_radius = self.width.max(self.height) + 1;
        for radius in 1..=max_radius {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    if !self.has_roof(x + dx, y + dy, floor) {
                        return radius - 1;
                    }
                }
            }
        }
        max_radius
    }

    fn roof_shape(
        levels: &HashMap<RoofPosition, i32>,
        (x, y, floor): RoofPosition,
    ) -> (RoofShape, f32) {
        let level = levels.get(&(x, y, floor)).copied().unwrap_or(0);
        let lower = |(dx, dy): (i32, i32)| {
            levels
                .get(&(x + dx, y + dy, floor))
                .map_or(true, |neighbour| *neighbour < level)
        };

        let sides: Vec<bool> = CARDINALS.iter().map(|offset| lower(*offset)).collect();
        let lower_sides: Vec<usize> = (0..4).filter(|i| sides[*i]).collect();

        match lower_sides.as_slice() {
            [] => match DIAGONALS.iter().position(|offset| lower(*offset)) {
                Some(corner) => (RoofShape::InnerCorner, CORNER_ROTATIONS[corner]),
                None => (RoofShape::Flat, 0.0),
            },
            [side] => (RoofShape::Side, SIDE_ROTATIONS[*side]),
            [a, b] if b - a == 2 => (RoofShape::Ridge, if *a == 0 { 0.0 } else { 90.0 }),
            // Adjacent pair; (N, W) wraps around
            [0, 3] => (RoofShape::OuterCorner, SIDE_ROTATIONS[3]),
            [a, _] => (RoofShape::OuterCorner, SIDE_ROTATIONS[*a]),
            [_, _, _] => {
                let high = (0..4).find(|i| !sides[*i]).unwrap_or(0);
                (RoofShape::RidgeEnd, SIDE_ROTATIONS[(high + 2) % 4])
            }
            _ => (RoofShape::Peak, 0.0),
        }
    }

    /// Recompute level then shape of every roof on the map
    pub fn recalculate_roofs(&mut self) {
        let positions = self.roof_positions();

        let levels: HashMap<RoofPosition, i32> = positions
            .iter()
            .map(|&(x, y, floor)| ((x, y, floor), self.roof_level(x, y, floor)))
            .collect();

        let scene = self.scene.as_mut();
        for position in &positions {
            let (shape, rotation) = Self::roof_shape(&levels, *position);
            let (x, y, floor) = *position;
            let index = (x * (self.height + 1) + y) as usize;
            let key = EntityKey::new(floor, EntityType::Floorroof);
            let Some(entity) = self.tiles[index].entities.get_mut(&key) else {
                continue;
            };
            let model = entity.model;
            if let EntityKind::Roof(roof) = &mut entity.kind {
                roof.level = levels.get(position).copied().unwrap_or(0);
                roof.shape = shape;
                roof.rotation = rotation;
                if let Some(handle) = model {
                    scene.update_roof_model(handle, shape, rotation, roof.level);
                }
            }
        }

        tracing::debug!(roofs = positions.len(), "Recalculated roofs");
    }
}

impl Map {
    pub fn recalculate_roofs(&mut self) {
        self.state.recalculate_roofs();
    }
}
