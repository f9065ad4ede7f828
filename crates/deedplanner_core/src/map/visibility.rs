//! Rendered floor selection and the x-ray view of the floors below it

use super::{Map, MapState};
use crate::constants::{is_valid_floor, CAVE_FLOOR_COUNT, FLOOR_HEIGHT, FLOOR_LIMIT};
use crate::error::MapError;
use crate::scene::{GridKind, SceneLayer};

/// Opacity of a floor relative to the rendered one: 1.0 for the rendered
/// floor, 0.6 one floor below and 0.25 two floors below.
pub fn relative_floor_opacity(relative_floor: i32) -> Result<f32, MapError> {
    match relative_floor {
        0 => Ok(1.0),
        -1 => Ok(0.6),
        -2 => Ok(0.25),
        other => Err(MapError::OpacityOutOfRange(other)),
    }
}

/// Index of `floor` within its surface or cave layer stack
fn layer_index(floor: i32) -> i32 {
    if floor >= 0 {
        floor
    } else {
        -floor - 1
    }
}

impl MapState {
    /// Opacity of `floor` under the current view, `None` when hidden
    pub fn layer_opacity(&self, floor: i32) -> Option<f32> {
        let layers = if floor >= 0 {
            &self.surface_layers
        } else {
            &self.cave_layers
        };
        layers.get(layer_index(floor) as usize).copied().flatten()
    }

    fn layer_state(&self, index: i32, target: i32) -> Option<f32> {
        if self.render_entire_layer {
            return Some(1.0);
        }
        // Floors outside the x-ray range are simply not drawn
        relative_floor_opacity(index - target).ok()
    }

    /// Push layer visibility and grid placement for the rendered floor
    pub(crate) fn apply_visibility(&mut self) {
        let underground = self.rendered_floor < 0;
        let target = layer_index(self.rendered_floor);

        self.surface_layers = (0..FLOOR_LIMIT)
            .map(|index| (!underground).then(|| self.layer_state(index, target)).flatten())
            .collect();
        self.cave_layers = (0..CAVE_FLOOR_COUNT)
            .map(|index| underground.then(|| self.layer_state(index, target)).flatten())
            .collect();

        for (index, state) in self.surface_layers.iter().enumerate() {
            self.scene
                .set_layer_visibility(SceneLayer::Surface(index), state.is_some(), state.unwrap_or(0.0));
        }
        for (index, state) in self.cave_layers.iter().enumerate() {
            self.scene
                .set_layer_visibility(SceneLayer::Cave(index), state.is_some(), state.unwrap_or(0.0));
        }

        let grid = if underground {
            GridKind::Cave
        } else {
            GridKind::Surface
        };
        self.scene
            .set_grid(grid, self.rendered_floor as f32 * FLOOR_HEIGHT);
    }
}

impl Map {
    pub fn rendered_floor(&self) -> i32 {
        self.state.rendered_floor
    }

    pub fn render_entire_layer(&self) -> bool {
        self.state.render_entire_layer
    }

    /// Switch the view to `floor`; negative floors show the cave stack
    pub fn set_rendered_floor(&mut self, floor: i32) -> Result<(), MapError> {
        if !is_valid_floor(floor) {
            return Err(MapError::FloorOutOfRange(floor));
        }
        self.state.rendered_floor = floor;
        self.state.apply_visibility();
        Ok(())
    }

    /// Show every floor of the current stack at full opacity instead of the
    /// x-ray view
    pub fn set_render_entire_layer(&mut self, render_entire_layer: bool) {
        self.state.render_entire_layer = render_entire_layer;
        self.state.apply_visibility();
    }

    pub fn layer_opacity(&self, floor: i32) -> Option<f32> {
        self.state.layer_opacity(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_database;

    #[test]
    fn test_relative_floor_opacity() {
        assert_eq!(relative_floor_opacity(0), Ok(1.0));
        assert_eq!(relative_floor_opacity(-1), Ok(0.6));
        assert_eq!(relative_floor_opacity(-2), Ok(0.25));
        assert_eq!(relative_floor_opacity(-3), Err(MapError::OpacityOutOfRange(-3)));
        assert_eq!(relative_floor_opacity(1), Err(MapError::OpacityOutOfRange(1)));
    }

    #[test]
    fn test_surface_xray() {
        let mut map = Map::new(3, 3, &sample_database()).unwrap();
        map.set_rendered_floor(3).unwrap();
        assert_eq!(map.layer_opacity(3), Some(1.0));
        assert_eq!(map.layer_opacity(2), Some(0.6));
        assert_eq!(map.layer_opacity(1), Some(0.25));
        assert_eq!(map.layer_opacity(0), None);
        assert_eq!(map.layer_opacity(4), None);
        assert_eq!(map.layer_opacity(-1), None);
    }

    #[test]
    fn test_cave_view_hides_surface() {
        let mut map = Map::new(3, 3, &sample_database()).unwrap();
        map.set_rendered_floor(-1).unwrap();
        assert_eq!(map.layer_opacity(-1), Some(1.0));
        assert_eq!(map.layer_opacity(0), None);
        assert_eq!(map.layer_opacity(-2), None);

        map.set_rendered_floor(-3).unwrap();
        assert_eq!(map.layer_opacity(-3), Some(1.0));
        assert_eq!(map.layer_opacity(-2), Some(0.6));
        assert_eq!(map.layer_opacity(-1), Some(0.25));
    }

    #[test]
    fn test_render_entire_layer() {
        let mut map = Map::new(3, 3, &sample_database()).unwrap();
        map.set_rendered_floor(1).unwrap();
        map.set_render_entire_layer(true);
        for floor in 0..FLOOR_LIMIT {
            assert_eq!(map.layer_opacity(floor), Some(1.0));
        }
        assert_eq!(map.layer_opacity(-1), None);
    }

    #[test]
    fn test_invalid_rendered_floor() {
        let mut map = Map::new(3, 3, &sample_database()).unwrap();
        assert_eq!(map.set_rendered_floor(16), Err(MapError::FloorOutOfRange(16)));
        assert_eq!(map.rendered_floor(), 0);
    }
}
