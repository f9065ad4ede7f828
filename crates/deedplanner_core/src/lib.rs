//! Core model for deedplanner
//!
//! This crate provides the multi-floor building map and everything derived
//! from it:
//! - `Map` - A grid of tiles with heights, visibility and a shared undo history
//! - `Tile` - Ground, cave and the keyed entity slots of every floor
//! - `EntityKey` - Address of one slot within a tile
//! - `CommandManager` - Linear undo/redo history of reversible commands
//! - `BuildingsSummary` - Buildings and rooms derived from house walls
//! - `MapDocument` - The persisted map shape, with its XML reader and writer
//! - `SceneBackend` - The renderer interface the map drives

mod command;
mod constants;
mod data;
mod document;
mod entity;
mod error;
mod key;
mod map;
mod scene;
mod summary;
mod tile;
mod warnings;
mod xml;

pub use command::{CommandManager, ReversibleCommand};
pub use constants::{
    is_valid_floor, CAVE_FLOOR_COUNT, DEED_TOKEN, DEFAULT_GROUND, FLOOR_HEIGHT, FLOOR_LIMIT, HEIGHT_SCALE,
    NEGATIVE_FLOOR_LIMIT, TILE_SIZE, TITLE_STRING, VERSION_STRING,
};
pub use data::{
    CaveData, Database, DecorationData, FloorData, GroundData, Materials, ModelReference, RoofData,
    TextureReference, WallData,
};
pub use document::{EntityDocument, GroundDocument, LevelDocument, MapDocument, TileDocument};
pub use entity::{
    Cave, Decoration, EntityId, EntityKind, Floor, FloorOrientation, Ground, Label, RoadDirection, Roof, RoofShape,
    TileEntity, Wall, WallOrientation,
};
pub use error::{DatabaseError, DocumentError, MapError};
pub use key::{EntityKey, EntityType};
pub use map::{relative_floor_opacity, Map, MapState};
pub use scene::{
    GridKind, GroundTextures, ModelHandle, ModelLoad, ModelRegistry, ModelSource, NullScene, SceneBackend, SceneLayer,
};
pub use summary::{Building, BuildingsSummary, Room, TilePart, TileSummary};
pub use tile::{Tile, CENTRAL_POSITION};
pub use warnings::{collect_map_warnings, warning_lines, MapWarning, WarningKind, CHECKS_FAILED, NO_WARNINGS};
pub use xml::{read_map_document, write_map_document};
