//! Persisted map shape
//!
//! A [`MapDocument`] is the plain tree a map file holds: every tile (edge
//! tiles included) with its heights, ground, cave and per-floor entities. It
//! is independent of the XML mechanics in [`crate::xml`] and can be
//! serialized with serde as well.

use crate::constants::TITLE_STRING;
use crate::data::Database;
use crate::entity::{EntityKind, FloorOrientation, Label, RoadDirection};
use crate::error::{DocumentError, MapError};
use crate::key::EntityType;
use crate::map::Map;
use crate::scene::SceneBackend;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub width: i32,
    pub height: i32,
    pub exporter: String,
    pub tiles: Vec<TileDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDocument {
    pub x: i32,
    pub y: i32,
    pub height: i32,
    pub cave_height: i32,
    pub cave_size: i32,
    pub ground: GroundDocument,
    #[serde(default)]
    pub cave: Option<String>,
    #[serde(default)]
    pub levels: Vec<LevelDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundDocument {
    pub id: String,
    #[serde(default)]
    pub dir: RoadDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDocument {
    pub value: i32,
    pub entities: Vec<EntityDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntityDocument {
    Floor {
        id: String,
        #[serde(default)]
        orientation: FloorOrientation,
    },
    Roof {
        id: String,
    },
    HWall {
        id: String,
        #[serde(default)]
        reversed: bool,
    },
    VWall {
        id: String,
        #[serde(default)]
        reversed: bool,
    },
    Object {
        id: String,
        x: f32,
        y: f32,
        #[serde(default)]
        rotation: f32,
    },
    Label {
        text: String,
        color: [f32; 3],
    },
}

impl EntityDocument {
    /// Element name in the XML form
    pub fn element_name(&self) -> &'static str {
        match self {
            EntityDocument::Floor { .. } => "floor",
            EntityDocument::Roof { .. } => "roof",
            EntityDocument::HWall { .. } => EntityType::Hwall.serialized_name(),
            EntityDocument::VWall { .. } => EntityType::Vwall.serialized_name(),
            EntityDocument::Object { .. } => EntityType::Object.serialized_name(),
            EntityDocument::Label { .. } => EntityType::Label.serialized_name(),
        }
    }
}

impl MapDocument {
    /// Re-window the document: add (or with negative values remove) tiles on
    /// each side. Tiles keep their content relative to the old map; tiles
    /// landing on the new edge keep their heights only.
    pub fn resized(&self, left: i32, right: i32, bottom: i32, top: i32) -> Result<MapDocument, MapError> {
        let width = self.width + left + right;
        let height = self.height + bottom + top;
        if width < 1 || height < 1 {
            return Err(MapError::InvalidDimensions { width, height });
        }

        let tiles = self
            .tiles
            .iter()
            .filter_map(|tile| {
                let (x, y) = (tile.x + left, tile.y + bottom);
                if x < 0 || y < 0 || x > width || y > height {
                    return None;
                }
                let mut moved = tile.clone();
                moved.x = x;
                moved.y = y;
                if x == width || y == height {
                    moved.levels.clear();
                }
                Some(moved)
            })
            .collect();

        tracing::info!(
            "Resized map document from {}x{} to {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        Ok(MapDocument {
            width,
            height,
            exporter: self.exporter.clone(),
            tiles,
        })
    }
}

fn entity_document(kind: &EntityKind, entity_type: EntityType) -> Option<EntityDocument> {
    let document = match kind {
        EntityKind::Floor(floor) => EntityDocument::Floor {
            id: floor.data().short_name.clone(),
            orientation: floor.orientation(),
        },
        EntityKind::Roof(roof) => EntityDocument::Roof {
            id: roof.data().short_name.clone(),
        },
        EntityKind::Wall(wall) if entity_type.is_horizontal_wall() => EntityDocument::HWall {
            id: wall.data().short_name.clone(),
            reversed: wall.reversed(),
        },
        EntityKind::Wall(wall) if entity_type.is_vertical_wall() => EntityDocument::VWall {
            id: wall.data().short_name.clone(),
            reversed: wall.reversed(),
        },
        EntityKind::Wall(_) => return None,
        EntityKind::Decoration(decoration) => EntityDocument::Object {
            id: decoration.data().short_name.clone(),
            x: decoration.position().x,
            y: decoration.position().y,
            rotation: decoration.rotation(),
        },
        EntityKind::Label(label) => EntityDocument::Label {
            text: label.text.clone(),
            color: label.color,
        },
    };
    Some(document)
}

impl Map {
    /// Snapshot of the whole map in its persisted shape
    pub fn to_document(&self) -> MapDocument {
        let tiles = self
            .tiles()
            .map(|tile| {
                let mut levels: BTreeMap<i32, Vec<EntityDocument>> = BTreeMap::new();
                for (key, entity) in tile.sorted_entities() {
                    if let Some(document) = entity_document(entity.kind(), key.entity_type()) {
                        levels.entry(key.floor()).or_default().push(document);
                    }
                }

                TileDocument {
                    x: tile.x(),
                    y: tile.y(),
                    height: tile.surface_height(),
                    cave_height: tile.cave_height(),
                    cave_size: tile.cave_size(),
                    ground: GroundDocument {
                        id: tile.ground().data().short_name.clone(),
                        dir: tile.ground().road_direction(),
                    },
                    cave: Some(tile.cave().data().short_name.clone()),
                    levels: levels
                        .into_iter()
                        .map(|(value, entities)| LevelDocument { value, entities })
                        .collect(),
                }
            })
            .collect();

        MapDocument {
            width: self.width(),
            height: self.height(),
            exporter: TITLE_STRING.to_string(),
            tiles,
        }
    }

    /// Build a map from a document. Unknown content ids and content the map
    /// rejects are logged and skipped; the rest of the tile still loads.
    pub fn from_document(
        document: &MapDocument,
        database: &Database,
        scene: Box<dyn SceneBackend>,
    ) -> Result<Map, DocumentError> {
        let mut map = Map::with_scene(document.width, document.height, database, scene)?;

        for tile in &document.tiles {
            map.load_tile_terrain(tile, database);
        }
        for tile in &document.tiles {
            for level in &tile.levels {
                for entity in &level.entities {
                    map.load_entity(tile.x, tile.y, level.value, entity, database);
                }
            }
        }

        map.clear_history();
        map.state.refresh_all_ground();
        map.state.refresh_height_grid();
        map.state.recalculate_heights();
        map.state.recalculate_roofs();

        tracing::info!(
            "Loaded {}x{} map exported by '{}'",
            document.width,
            document.height,
            document.exporter
        );
        Ok(map)
    }

    fn load_tile_terrain(&mut self, document: &TileDocument, database: &Database) {
        let (x, y) = (document.x, document.y);
        let ground = database.ground(&document.ground.id);
        if ground.is_none() {
            tracing::warn!("Unknown ground '{}' on tile ({}, {})", document.ground.id, x, y);
        }
        let cave = document.cave.as_deref().and_then(|id| {
            let cave = database.cave(id);
            if cave.is_none() {
                tracing::warn!("Unknown cave '{}' on tile ({}, {})", id, x, y);
            }
            cave
        });

        let Some(tile) = self.state.tile_mut(x, y) else {
            tracing::warn!("Skipping tile ({}, {}) outside the map", x, y);
            return;
        };
        tile.surface_height = document.height;
        tile.cave_height = document.cave_height;
        tile.cave_size = document.cave_size;
        if let Some(data) = ground {
            tile.ground.data = data;
            tile.ground.road_direction = document.ground.dir;
        }
        if let Some(data) = cave {
            tile.cave.data = data;
        }
    }

    fn load_entity(&mut self, x: i32, y: i32, floor: i32, document: &EntityDocument, database: &Database) {
        let result = match document {
            EntityDocument::Floor { id, orientation } => match database.floor(id) {
                Some(data) => self.set_floor(x, y, Some(data), *orientation, floor),
                None => return warn_unknown("floor", id, x, y),
            },
            EntityDocument::Roof { id } => match database.roof(id) {
                Some(data) => self.set_roof(x, y, Some(data), floor),
                None => return warn_unknown("roof", id, x, y),
            },
            EntityDocument::HWall { id, reversed } => match database.wall(id) {
                Some(data) => self.set_horizontal_wall(x, y, Some(data), *reversed, floor),
                None => return warn_unknown("wall", id, x, y),
            },
            EntityDocument::VWall { id, reversed } => match database.wall(id) {
                Some(data) => self.set_vertical_wall(x, y, Some(data), *reversed, floor),
                None => return warn_unknown("wall", id, x, y),
            },
            EntityDocument::Object {
                id,
                x: sub_x,
                y: sub_y,
                rotation,
            } => match database.decoration(id) {
                Some(data) => {
                    self.set_decoration(x, y, Some(data), Vec2::new(*sub_x, *sub_y), *rotation, floor)
                }
                None => return warn_unknown("decoration", id, x, y),
            },
            EntityDocument::Label { text, color } => {
                let label = Label {
                    text: text.clone(),
                    color: *color,
                };
                self.set_label(x, y, Some(label), floor)
            }
        };

        if let Err(e) = result {
            tracing::warn!(
                "Skipping <{}> on tile ({}, {}), floor {}: {}",
                document.element_name(),
                x,
                y,
                floor,
                e
            );
        }
    }
}

fn warn_unknown(what: &str, id: &str, x: i32, y: i32) {
    tracing::warn!("Unknown {} '{}' on tile ({}, {}), skipping", what, id, x, y);
}
