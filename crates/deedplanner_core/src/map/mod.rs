//! The map: a dense `(width + 1) x (height + 1)` grid of tiles, cached height
//! extrema, floor visibility and the command history shared by every tile.
//!
//! [`Map`] splits into [`MapState`], which commands mutate, and the
//! [`CommandManager`] that records them. Queries are answered by the state;
//! every content edit is an operation on `Map` that runs through the history.

mod ground;
mod heights;
mod roofs;
mod visibility;

use crate::command::{CommandManager, ReversibleCommand};
use crate::constants::{FLOOR_HEIGHT, FLOOR_THICKNESS, HEIGHT_SCALE, TILE_SIZE};
use crate::data::{Database, Materials};
use crate::entity::{Cave, EntityKind, Ground, TileEntity};
use crate::error::MapError;
use crate::key::EntityKey;
use crate::scene::{ModelHandle, ModelRegistry, ModelSource, NullScene, SceneBackend, SceneLayer};
use crate::summary::TilePart;
use crate::tile::Tile;
use glam::Vec3;

pub use visibility::relative_floor_opacity;

/// Which entities of a tile a refresh touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LayerFilter {
    Surface,
    Cave,
}

impl LayerFilter {
    pub(crate) fn for_floor(floor: i32) -> Self {
        if floor >= 0 {
            LayerFilter::Surface
        } else {
            LayerFilter::Cave
        }
    }

    fn matches(&self, floor: i32) -> bool {
        match self {
            LayerFilter::Surface => floor >= 0,
            LayerFilter::Cave => floor < 0,
        }
    }
}

/// Everything the command history mutates
pub struct MapState {
    width: i32,
    height: i32,
    pub(crate) tiles: Vec<Tile>,
    lowest_surface_height: i32,
    highest_surface_height: i32,
    lowest_cave_height: i32,
    highest_cave_height: i32,
    rendered_floor: i32,
    render_entire_layer: bool,
    /// Opacity of each visible surface layer, `None` when hidden
    surface_layers: Vec<Option<f32>>,
    /// Opacity of each visible cave layer, `None` when hidden
    cave_layers: Vec<Option<f32>>,
    next_entity_id: u64,
    pub(crate) models: ModelRegistry,
    pub(crate) scene: Box<dyn SceneBackend>,
}

impl MapState {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Index of tile `(x, y)` in the grid and in the height-grid meshes
    pub fn coordinate_to_index(&self, x: i32, y: i32) -> usize {
        (x * (self.height + 1) + y) as usize
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x <= self.width && y <= self.height
    }

    /// Tiles on the last row or column only mark the map boundary
    pub fn is_edge_tile(&self, x: i32, y: i32) -> bool {
        x == self.width || y == self.height
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.tiles.get(self.coordinate_to_index(x, y))
    }

    pub(crate) fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let index = self.coordinate_to_index(x, y);
        self.tiles.get_mut(index)
    }

    pub fn checked_tile(&self, x: i32, y: i32) -> Result<&Tile, MapError> {
        self.tile(x, y).ok_or(MapError::TileOutOfBounds { x, y })
    }

    /// Neighbour of `(x, y)` at offset `(dx, dy)`, or `None` past the edge
    pub fn relative_tile(&self, x: i32, y: i32, dx: i32, dy: i32) -> Option<&Tile> {
        let (Some(x), Some(y)) = (x.checked_add(dx), y.checked_add(dy)) else {
            return None;
        };
        self.tile(x, y)
    }

    /// All tiles, edge tiles included, in column-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Tiles that can hold content
    pub fn buildable_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles
            .iter()
            .filter(|tile| !self.is_edge_tile(tile.x(), tile.y()))
    }

    pub(crate) fn check_buildable(&self, x: i32, y: i32) -> Result<(), MapError> {
        if !self.in_bounds(x, y) {
            return Err(MapError::TileOutOfBounds { x, y });
        }
        if self.is_edge_tile(x, y) {
            return Err(MapError::EdgeTile { x, y });
        }
        Ok(())
    }

    pub fn lowest_surface_height(&self) -> i32 {
        self.lowest_surface_height
    }

    pub fn highest_surface_height(&self) -> i32 {
        self.highest_surface_height
    }

    pub fn lowest_cave_height(&self) -> i32 {
        self.lowest_cave_height
    }

    pub fn highest_cave_height(&self) -> i32 {
        self.highest_cave_height
    }

    pub fn rendered_floor(&self) -> i32 {
        self.rendered_floor
    }

    pub fn render_entire_layer(&self) -> bool {
        self.render_entire_layer
    }

    /// Ground height under world `(x, z)`; 0 when the probe finds nothing
    pub fn interpolated_height(&self, x: f32, z: f32) -> f32 {
        self.scene.probe_ground_height(x, z).unwrap_or(0.0)
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Build an entity for `key`, spawning its model inactive
    pub(crate) fn create_entity(&mut self, key: &EntityKey, kind: EntityKind) -> TileEntity {
        self.next_entity_id += 1;
        let layer = SceneLayer::for_floor(key.floor());
        let scene = self.scene.as_mut();
        let model = match &kind {
            EntityKind::Floor(floor) => Some(ModelSource::Asset(&floor.data.model)),
            EntityKind::Roof(roof) => Some(ModelSource::Roof(&roof.data.texture)),
            EntityKind::Wall(wall) => Some(ModelSource::Asset(wall.model_reference())),
            EntityKind::Decoration(decoration) => Some(ModelSource::Asset(&decoration.data.model)),
            EntityKind::Label(_) => None,
        }
        .map(|source| self.models.create(scene, source, layer));

        if let (Some(handle), EntityKind::Wall(wall)) = (model, &kind) {
            scene.update_wall_model(handle, wall.model_reference(), wall.slope_difference);
        }

        TileEntity {
            id: crate::entity::EntityId(self.next_entity_id),
            model,
            position: Vec3::ZERO,
            kind,
        }
    }

    /// Put `incoming` into a slot and return the previous occupant. The
    /// outgoing model is hidden and the incoming one shown; neither is
    /// destroyed.
    pub(crate) fn swap_slot(
        &mut self,
        x: i32,
        y: i32,
        key: &EntityKey,
        incoming: Option<TileEntity>,
    ) -> Option<TileEntity> {
        let index = self.coordinate_to_index(x, y);
        let tile = &mut self.tiles[index];
        let outgoing = tile.entities.remove(key);
        let scene = self.scene.as_mut();

        if let Some(handle) = outgoing.as_ref().and_then(|entity| entity.model) {
            self.models.set_active(scene, handle, false);
        }
        if let Some(entity) = incoming {
            if let Some(handle) = entity.model {
                self.models.set_active(scene, handle, true);
            }
            tile.entities.insert(*key, entity);
        }
        outgoing
    }

    /// Destroy the model of an entity that left the history for good
    pub(crate) fn release_entity(&mut self, entity: TileEntity) {
        if let Some(handle) = entity.model {
            self.models.destroy(self.scene.as_mut(), handle);
        }
    }

    /// Slope under a wall in slot `key`: this corner minus the next corner
    /// along the wall. A missing neighbour counts as level.
    pub(crate) fn slope_difference(&self, x: i32, y: i32, key: &EntityKey) -> i32 {
        let (dx, dy) = if key.entity_type().is_vertical_wall() {
            (0, 1)
        } else if key.entity_type().is_horizontal_wall() {
            (1, 0)
        } else {
            return 0;
        };
        let Some(tile) = self.tile(x, y) else {
            return 0;
        };
        let own = tile.height_for_floor(key.floor());
        self.relative_tile(x, y, dx, dy)
            .map_or(0, |neighbour| own - neighbour.height_for_floor(key.floor()))
    }

    fn entity_world_position(&self, tile: &Tile, key: &EntityKey) -> Vec3 {
        let floor_offset = key.floor() as f32 * FLOOR_HEIGHT;
        match key.sub_position() {
            Some(sub) => {
                let x = tile.x() as f32 * TILE_SIZE + sub.x;
                let z = tile.y() as f32 * TILE_SIZE + sub.y;
                let mut height = self.interpolated_height(x, z);
                let floating = tile
                    .entity(key)
                    .and_then(TileEntity::as_decoration)
                    .is_some_and(|decoration| decoration.data().floating);
                if floating && key.floor() == 0 {
                    height = height.max(0.0);
                }
                if tile.tile_content(key.floor()).is_some() {
                    height += FLOOR_THICKNESS;
                }
                Vec3::new(x, height + floor_offset, z)
            }
            None => Vec3::new(
                tile.x() as f32 * TILE_SIZE,
                tile.height_for_floor(key.floor()) as f32 * HEIGHT_SCALE + floor_offset,
                tile.y() as f32 * TILE_SIZE,
            ),
        }
    }

    /// Recompute world positions and wall slopes of one tile's entities
    pub(crate) fn update_entity_positions(&mut self, x: i32, y: i32, filter: LayerFilter) {
        let Some(tile) = self.tile(x, y) else {
            return;
        };

        let updates: Vec<(EntityKey, Vec3, i32)> = tile
            .entities
            .keys()
            .filter(|key| filter.matches(key.floor()))
            .map(|key| {
                (
                    *key,
                    self.entity_world_position(tile, key),
                    self.slope_difference(x, y, key),
                )
            })
            .collect();

        let index = self.coordinate_to_index(x, y);
        let scene = self.scene.as_mut();
        for (key, position, slope_difference) in updates {
            let Some(entity) = self.tiles[index].entities.get_mut(&key) else {
                continue;
            };
            entity.position = position;
            let rotation = entity.rotation();
            if let Some(handle) = entity.model {
                scene.set_model_transform(handle, position, rotation);
            }
            if let (EntityKind::Wall(wall), Some(handle)) = (&mut entity.kind, entity.model) {
                if wall.slope_difference != slope_difference {
                    wall.slope_difference = slope_difference;
                    scene.update_wall_model(handle, wall.model_reference(), slope_difference);
                }
            }
        }
    }

    /// Apply the current floor opacity to one entity's model
    pub(crate) fn update_entity_rendering(&mut self, x: i32, y: i32, key: &EntityKey) {
        let Some(handle) = self
            .tile(x, y)
            .and_then(|tile| tile.entity(key))
            .and_then(TileEntity::model)
        else {
            return;
        };
        if let Some(opacity) = self.layer_opacity(key.floor()) {
            self.scene.set_model_opacity(handle, opacity);
        }
    }
}

/// A multi-floor building map with undo/redo
pub struct Map {
    pub(crate) state: MapState,
    pub(crate) commands: CommandManager<MapState>,
}

impl Map {
    /// Headless map of `width x height` buildable tiles
    pub fn new(width: i32, height: i32, database: &Database) -> Result<Self, MapError> {
        Self::with_scene(width, height, database, Box::new(NullScene))
    }

    /// Map that drives `scene` for every visual change
    pub fn with_scene(
        width: i32,
        height: i32,
        database: &Database,
        scene: Box<dyn SceneBackend>,
    ) -> Result<Self, MapError> {
        if width < 1 || height < 1 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        let ground = database
            .default_ground()
            .ok_or(MapError::MissingDefaultData("ground"))?;
        let cave = database
            .default_cave()
            .ok_or(MapError::MissingDefaultData("cave"))?;

        let mut tiles = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
        for x in 0..=width {
            for y in 0..=height {
                tiles.push(Tile::new(
                    x,
                    y,
                    Ground::new(ground.clone()),
                    Cave::new(cave.clone()),
                ));
            }
        }

        let state = MapState {
            width,
            height,
            tiles,
            lowest_surface_height: 0,
            highest_surface_height: 0,
            lowest_cave_height: 0,
            highest_cave_height: 0,
            rendered_floor: 0,
            render_entire_layer: false,
            surface_layers: Vec::new(),
            cave_layers: Vec::new(),
            next_entity_id: 0,
            models: ModelRegistry::default(),
            scene,
        };

        let mut map = Self {
            state,
            commands: CommandManager::new(),
        };
        map.state.refresh_all_ground();
        map.state.refresh_height_grid();
        map.state.recalculate_heights();
        map.state.apply_visibility();

        tracing::info!("Created {}x{} map", width, height);
        Ok(map)
    }

    /// Read access to everything the map holds
    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn width(&self) -> i32 {
        self.state.width
    }

    pub fn height(&self) -> i32 {
        self.state.height
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.state.tile(x, y)
    }

    pub fn relative_tile(&self, x: i32, y: i32, dx: i32, dy: i32) -> Option<&Tile> {
        self.state.relative_tile(x, y, dx, dy)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.state.tiles()
    }

    /// Every live model, including those stashed in the undo history
    pub fn models(&self) -> &ModelRegistry {
        self.state.models()
    }

    pub fn lowest_surface_height(&self) -> i32 {
        self.state.lowest_surface_height
    }

    pub fn highest_surface_height(&self) -> i32 {
        self.state.highest_surface_height
    }

    pub fn lowest_cave_height(&self) -> i32 {
        self.state.lowest_cave_height
    }

    pub fn highest_cave_height(&self) -> i32 {
        self.state.highest_cave_height
    }

    pub fn interpolated_height(&self, x: f32, z: f32) -> f32 {
        self.state.interpolated_height(x, z)
    }

    pub(crate) fn execute(&mut self, command: Box<dyn ReversibleCommand<MapState>>) {
        tracing::trace!("Executing '{}'", command.description());
        self.commands
            .add_to_action_and_execute(command, &mut self.state);
    }

    /// Close the action being built
    pub fn finish_action(&mut self) {
        self.commands.finish_action();
    }

    pub fn undo(&mut self) -> bool {
        self.commands.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        self.commands.redo(&mut self.state)
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.commands.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.commands.redo_len()
    }

    /// Forget all history, destroying every entity only the history held
    pub fn clear_history(&mut self) {
        self.commands.clear(&mut self.state);
    }

    /// Cap the number of undoable actions; `None` keeps everything
    pub fn set_history_limit(&mut self, limit: Option<usize>) {
        self.commands.set_max_actions(limit, &mut self.state);
    }

    /// Finish a pending model load. Returns false and drops the result when
    /// the model was destroyed while it was loading.
    pub fn complete_model_load(&mut self, handle: ModelHandle) -> bool {
        self.state
            .models
            .complete_load(self.state.scene.as_mut(), handle)
    }

    /// Materials for every buildable tile of the map
    pub fn calculate_map_materials(&self) -> Materials {
        let mut materials = Materials::new();
        for tile in self.state.buildable_tiles() {
            materials.add_all(&tile.calculate_tile_materials(TilePart::Everything));
        }
        materials
    }
}
