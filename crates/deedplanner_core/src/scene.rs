//! Interface to the renderer that draws the map
//!
//! The core never touches meshes or materials. Every visual side effect of an
//! edit goes through a [`SceneBackend`], whose methods all default to no-ops so
//! the map can run headless. Model handles are allocated by the core and
//! tracked in a [`ModelRegistry`], which also implements the asynchronous load
//! lifecycle: a model becomes visible only once it is both loaded and active.

use crate::data::{ModelReference, TextureReference};
use crate::entity::RoofShape;
use glam::Vec3;
use std::collections::HashMap;

/// Opaque handle to a model owned by the scene backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(u64);

impl ModelHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Per-floor root that models are parented to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneLayer {
    /// Surface floor `0..FLOOR_LIMIT`
    Surface(usize),
    /// Cave floor `-1` is index 0, `-2` index 1, and so on
    Cave(usize),
}

impl SceneLayer {
    /// Layer holding entities of `floor`
    pub fn for_floor(floor: i32) -> Self {
        if floor >= 0 {
            SceneLayer::Surface(floor as usize)
        } else {
            SceneLayer::Cave((-floor - 1) as usize)
        }
    }
}

/// Which height-visualization grid is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Surface,
    Cave,
}

/// Result of asking the backend to start loading a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelLoad {
    /// Geometry is available immediately
    Ready,
    /// Geometry arrives later through [`crate::Map::complete_model_load`]
    Pending,
}

/// What a new model is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource<'a> {
    /// A model asset loaded from disk
    Asset(&'a ModelReference),
    /// A roof mesh generated by the backend, textured with the given texture
    Roof(&'a TextureReference),
}

/// Quadrant textures of one ground tile, in W, N, E, S order
pub type GroundTextures = [TextureReference; 4];

/// Renderer callbacks driven by map edits
#[allow(unused_variables)]
pub trait SceneBackend {
    /// Begin creating a model for an entity on the given layer
    fn spawn_model(&mut self, handle: ModelHandle, source: ModelSource<'_>, layer: SceneLayer) -> ModelLoad {
        ModelLoad::Ready
    }

    fn destroy_model(&mut self, handle: ModelHandle) {}

    fn set_model_visible(&mut self, handle: ModelHandle, visible: bool) {}

    /// Place a model; `rotation` is the yaw in degrees
    fn set_model_transform(&mut self, handle: ModelHandle, position: Vec3, rotation: f32) {}

    fn set_model_opacity(&mut self, handle: ModelHandle, opacity: f32) {}

    /// Swap a wall model for the variant matching the slope under it
    fn update_wall_model(&mut self, handle: ModelHandle, model: &ModelReference, slope_difference: i32) {}

    /// Rebuild a roof model once its level and shape are settled
    fn update_roof_model(&mut self, handle: ModelHandle, shape: RoofShape, rotation: f32, level: i32) {}

    fn set_ground_textures(&mut self, x: i32, y: i32, textures: &GroundTextures) {}

    /// Move one vertex of both height grids; `index` is `x * (height + 1) + y`
    fn update_height_vertex(&mut self, index: usize, surface: Vec3, cave: Vec3) {}

    fn set_layer_visibility(&mut self, layer: SceneLayer, visible: bool, opacity: f32) {}

    /// Show one height grid at the given elevation and hide the other
    fn set_grid(&mut self, grid: GridKind, elevation: f32) {}

    /// Vertical probe against the ground surface at world `(x, z)`
    fn probe_ground_height(&self, x: f32, z: f32) -> Option<f32> {
        None
    }
}

/// Backend used when no renderer is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScene;

impl SceneBackend for NullScene {}

#[derive(Debug, Clone, Copy, Default)]
struct ModelState {
    loaded: bool,
    active: bool,
}

/// Tracks every live model handle and its load/activation state
#[derive(Debug, Default)]
pub struct ModelRegistry {
    next_handle: u64,
    models: HashMap<ModelHandle, ModelState>,
}

impl ModelRegistry {
    /// Allocate a handle and ask the backend to start loading it.
    /// New models start inactive.
    pub fn create(
        &mut self,
        scene: &mut dyn SceneBackend,
        source: ModelSource<'_>,
        layer: SceneLayer,
    ) -> ModelHandle {
        self.next_handle += 1;
        let handle = ModelHandle(self.next_handle);
        let loaded = scene.spawn_model(handle, source, layer) == ModelLoad::Ready;
        self.models.insert(
            handle,
            ModelState {
                loaded,
                active: false,
            },
        );
        handle
    }

    pub fn set_active(&mut self, scene: &mut dyn SceneBackend, handle: ModelHandle, active: bool) {
        if let Some(state) = self.models.get_mut(&handle) {
            state.active = active;
            scene.set_model_visible(handle, state.loaded && active);
        }
    }

    /// Mark a pending load as finished. Returns false when the model was
    /// destroyed while loading, in which case the result must be dropped.
    pub fn complete_load(&mut self, scene: &mut dyn SceneBackend, handle: ModelHandle) -> bool {
        let Some(state) = self.models.get_mut(&handle) else {
            tracing::debug!("Dropping load result for destroyed model {:?}", handle);
            return false;
        };
        state.loaded = true;
        scene.set_model_visible(handle, state.active);
        true
    }

    pub fn destroy(&mut self, scene: &mut dyn SceneBackend, handle: ModelHandle) {
        if self.models.remove(&handle).is_some() {
            scene.destroy_model(handle);
        }
    }

    pub fn contains(&self, handle: ModelHandle) -> bool {
        self.models.contains_key(&handle)
    }

    pub fn is_visible(&self, handle: ModelHandle) -> bool {
        self.models
            .get(&handle)
            .is_some_and(|state| state.loaded && state.active)
    }

    pub fn is_loaded(&self, handle: ModelHandle) -> bool {
        self.models.get(&handle).is_some_and(|state| state.loaded)
    }

    /// Number of models currently alive in the scene
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
