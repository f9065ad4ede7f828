//! Ground painting: pencil with corner picking, strokes and flood fill

use deedplanner_core::{GroundData, Map, MapError, RoadDirection, TILE_SIZE};
use std::sync::Arc;

/// Distance from a tile border, in world units, inside which a click picks
/// the corner rather than the tile
const CORNER_PICK_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroundToolMode {
    #[default]
    Pencil,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// What a ground click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    /// The middle of the tile
    InnerTile,
    /// The tile corner at absolute corner coordinates
    Corner { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionHit {
    pub tile_x: i32,
    pub tile_y: i32,
    pub target: SelectionTarget,
}

impl SelectionHit {
    /// Resolve a ground raycast at world `(x, z)`
    pub fn from_world(x: f32, z: f32) -> Self {
        let tile_x = (x / TILE_SIZE).floor() as i32;
        let tile_y = (z / TILE_SIZE).floor() as i32;
        let local_x = x - tile_x as f32 * TILE_SIZE;
        let local_y = z - tile_y as f32 * TILE_SIZE;

        let near = |local: f32| {
            if local < CORNER_PICK_DISTANCE {
                Some(0)
            } else if local > TILE_SIZE - CORNER_PICK_DISTANCE {
                Some(1)
            } else {
                None
            }
        };
        let target = match (near(local_x), near(local_y)) {
            (Some(dx), Some(dy)) => SelectionTarget::Corner {
                x: tile_x + dx,
                y: tile_y + dy,
            },
            _ => SelectionTarget::InnerTile,
        };
        Self {
            tile_x,
            tile_y,
            target,
        }
    }

    /// Road direction a diagonal ground takes when painted with this hit
    pub fn road_direction(&self) -> RoadDirection {
        let SelectionTarget::Corner { x, y } = self.target else {
            return RoadDirection::Center;
        };
        match (x - self.tile_x, y - self.tile_y) {
            (0, 0) => RoadDirection::SW,
            (1, 0) => RoadDirection::SE,
            (0, 1) => RoadDirection::NW,
            (1, 1) => RoadDirection::NE,
            _ => RoadDirection::Center,
        }
    }
}

/// Ground tool state: one ground per mouse button
pub struct GroundTool {
    pub left: Arc<GroundData>,
    pub right: Arc<GroundData>,
    pub mode: GroundToolMode,
    /// Corner clicks on diagonal grounds set the road direction
    pub edit_corners: bool,
}

impl GroundTool {
    pub fn new(left: Arc<GroundData>, right: Arc<GroundData>) -> Self {
        Self {
            left,
            right,
            mode: GroundToolMode::default(),
            edit_corners: true,
        }
    }

    fn data(&self, button: MouseButton) -> Arc<GroundData> {
        match button {
            MouseButton::Left => self.left.clone(),
            MouseButton::Right => self.right.clone(),
        }
    }

    fn direction_for(&self, data: &GroundData, hit: &SelectionHit) -> RoadDirection {
        if self.edit_corners && data.diagonal {
            hit.road_direction()
        } else {
            RoadDirection::Center
        }
    }

    /// Apply the tool once as a finished action. Returns the number of
    /// tiles changed.
    pub fn apply(&self, map: &mut Map, hit: SelectionHit, button: MouseButton) -> Result<usize, MapError> {
        let data = self.data(button);
        let changed = match self.mode {
            GroundToolMode::Pencil => {
                let direction = self.direction_for(&data, &hit);
                usize::from(map.paint_ground(hit.tile_x, hit.tile_y, data, direction)?)
            }
            GroundToolMode::Fill => map.flood_fill_ground(hit.tile_x, hit.tile_y, data)?,
        };
        map.finish_action();
        Ok(changed)
    }

    /// Pencil along a drag from `from` to `to` as one action. Tiles off the
    /// buildable area are skipped.
    pub fn stroke(&self, map: &mut Map, from: (i32, i32), to: (i32, i32), button: MouseButton) -> usize {
        let data = self.data(button);
        let mut changed = 0;
        for (x, y) in bresenham_line(from.0, from.1, to.0, to.1) {
            match map.paint_ground(x, y, data.clone(), RoadDirection::Center) {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(e) => tracing::debug!("Stroke skipped ({}, {}): {}", x, y, e),
            }
        }
        map.finish_action();
        changed
    }
}

/// Bresenham's line algorithm - generates all tile coordinates along a line
fn bresenham_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);
    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    points
}
