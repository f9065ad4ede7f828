//! A single grid cell: ground, cave, corner heights and the keyed entity slots
//! for every floor.
//!
//! Tiles are read-only from outside the crate. All slot mutations go through
//! the commands in [`commands`], issued by the placement operations on
//! [`crate::Map`].

pub(crate) mod commands;
mod placement;

use crate::data::Materials;
use crate::entity::{Cave, Decoration, EntityId, Ground, Label, TileEntity, Wall};
use crate::error::MapError;
use crate::key::{EntityKey, EntityType};
use crate::summary::TilePart;
use std::collections::HashMap;

/// Sub-tile position of a tile's central decoration
pub const CENTRAL_POSITION: (f32, f32) = (2.0, 2.0);

#[derive(Debug, Clone)]
pub struct Tile {
    x: i32,
    y: i32,
    pub(crate) surface_height: i32,
    pub(crate) cave_height: i32,
    pub(crate) cave_size: i32,
    pub(crate) ground: Ground,
    pub(crate) cave: Cave,
    pub(crate) entities: HashMap<EntityKey, TileEntity>,
}

impl Tile {
    pub(crate) fn new(x: i32, y: i32, ground: Ground, cave: Cave) -> Self {
        Self {
            x,
            y,
            surface_height: 0,
            cave_height: 0,
            cave_size: 0,
            ground,
            cave,
            entities: HashMap::new(),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn surface_height(&self) -> i32 {
        self.surface_height
    }

    pub fn cave_height(&self) -> i32 {
        self.cave_height
    }

    pub fn cave_size(&self) -> i32 {
        self.cave_size
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn cave(&self) -> &Cave {
        &self.cave
    }

    /// Corner height the entities of `floor` stand on
    pub fn height_for_floor(&self, floor: i32) -> i32 {
        if floor < 0 {
            self.cave_height
        } else {
            self.surface_height
        }
    }

    pub fn entity(&self, key: &EntityKey) -> Option<&TileEntity> {
        self.entities.get(key)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&EntityKey, &TileEntity)> {
        self.entities.iter()
    }

    /// Entities ordered by floor, slot type and position
    pub fn sorted_entities(&self) -> Vec<(&EntityKey, &TileEntity)> {
        let mut entities: Vec<_> = self.entities.iter().collect();
        entities.sort_by(|a, b| a.0.cmp(b.0));
        entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Floor or roof on `floor`
    pub fn tile_content(&self, floor: i32) -> Option<&TileEntity> {
        self.entities.get(&EntityKey::new(floor, EntityType::Floorroof))
    }

    fn wall_in_slot(&self, floor: i32, entity_type: EntityType) -> Option<&Wall> {
        self.entities
            .get(&EntityKey::new(floor, entity_type))
            .and_then(TileEntity::as_wall)
    }

    pub fn vertical_wall(&self, floor: i32) -> Option<&Wall> {
        self.wall_in_slot(floor, EntityType::Vwall)
    }

    pub fn vertical_fence(&self, floor: i32) -> Option<&Wall> {
        self.wall_in_slot(floor, EntityType::Vfence)
    }

    pub fn horizontal_wall(&self, floor: i32) -> Option<&Wall> {
        self.wall_in_slot(floor, EntityType::Hwall)
    }

    pub fn horizontal_fence(&self, floor: i32) -> Option<&Wall> {
        self.wall_in_slot(floor, EntityType::Hfence)
    }

    pub fn label(&self, floor: i32) -> Option<&Label> {
        self.entities
            .get(&EntityKey::new(floor, EntityType::Label))
            .and_then(TileEntity::as_label)
    }

    /// Decorations on every floor
    pub fn decorations(&self) -> impl Iterator<Item = (&EntityKey, &Decoration)> {
        self.entities
            .iter()
            .filter_map(|(key, entity)| entity.as_decoration().map(|decoration| (key, decoration)))
    }

    /// Decoration standing in the middle of the tile on `floor`
    pub fn central_decoration(&self, floor: i32) -> Option<&Decoration> {
        let (x, y) = CENTRAL_POSITION;
        self.entities
            .get(&EntityKey::freeform(floor, EntityType::Object, x, y))
            .and_then(TileEntity::as_decoration)
    }

    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.values().any(|entity| entity.id == id)
    }

    fn find_key_of_entity(&self, id: EntityId) -> Result<&EntityKey, MapError> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.id == id)
            .map(|(key, _)| key)
            .ok_or(MapError::EntityNotInTile)
    }

    pub fn find_type_of_entity(&self, id: EntityId) -> Result<EntityType, MapError> {
        self.find_key_of_entity(id).map(EntityKey::entity_type)
    }

    pub fn find_floor_of_entity(&self, id: EntityId) -> Result<i32, MapError> {
        self.find_key_of_entity(id).map(EntityKey::floor)
    }

    /// Materials for the given part of this tile on one floor
    pub fn calculate_floor_materials(&self, floor: i32, part: TilePart) -> Materials {
        let mut materials = Materials::new();
        for (key, entity) in &self.entities {
            if key.floor() != floor || !part.includes(key.entity_type()) {
                continue;
            }
            if let Some(cost) = entity.materials() {
                materials.add_all(cost);
            }
        }
        materials
    }

    /// Materials for the given part of this tile across all floors
    pub fn calculate_tile_materials(&self, part: TilePart) -> Materials {
        let mut materials = Materials::new();
        for (key, entity) in &self.entities {
            if !part.includes(key.entity_type()) {
                continue;
            }
            if let Some(cost) = entity.materials() {
                materials.add_all(cost);
            }
        }
        materials
    }
}
