//! Content database: the ground, cave, wall, floor, roof and decoration
//! definitions that tile entities reference.
//!
//! Definitions are loaded once from JSON and shared through `Arc`, so an
//! entity's data handle stays valid for the life of the entity regardless of
//! what happens to the database afterwards.

mod materials;

pub use materials::Materials;

use crate::constants::DEFAULT_GROUND;
use crate::error::DatabaseError;
use crate::tile::CENTRAL_POSITION;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Path of a model asset, resolved by the scene backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelReference(pub String);

/// Path of a texture asset, resolved by the scene backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureReference(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundData {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub tex2d: TextureReference,
    #[serde(default)]
    pub tex3d: TextureReference,
    /// Diagonal grounds (roads) support corner road directions
    #[serde(default)]
    pub diagonal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaveData {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub texture: TextureReference,
    /// Solid rock rather than open cave floor
    #[serde(default)]
    pub wall: bool,
    /// Used for freshly created tiles
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallData {
    pub name: String,
    pub short_name: String,
    /// Model used on the ground floor
    pub bottom_model: ModelReference,
    /// Model used on upper floors
    pub normal_model: ModelReference,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Counts towards building enclosure
    #[serde(default)]
    pub house_wall: bool,
    /// Arched walls leave room for a fence in the fence slot
    #[serde(default)]
    pub arch: bool,
    /// Fences that are built in the fence slot
    #[serde(default)]
    pub arch_buildable: bool,
    #[serde(default)]
    pub materials: Materials,
    #[serde(default)]
    pub icon: TextureReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorData {
    pub name: String,
    pub short_name: String,
    pub model: ModelReference,
    /// Openings (doors, stairs) still count as floor content
    #[serde(default)]
    pub opening: bool,
    #[serde(default)]
    pub materials: Materials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoofData {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub texture: TextureReference,
    #[serde(default)]
    pub materials: Materials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationData {
    pub name: String,
    pub short_name: String,
    pub model: ModelReference,
    #[serde(default)]
    pub category: String,
    /// Always placed at the tile center
    #[serde(default)]
    pub center_only: bool,
    /// Always placed at the tile corner
    #[serde(default)]
    pub corner_only: bool,
    /// Rests on the water surface instead of sinking below it
    #[serde(default)]
    pub floating: bool,
    #[serde(default)]
    pub materials: Materials,
}

impl DecorationData {
    /// Sub-tile position this decoration actually occupies when placed at `position`
    pub fn anchored_position(&self, position: Vec2) -> Vec2 {
        if self.center_only {
            Vec2::new(CENTRAL_POSITION.0, CENTRAL_POSITION.1)
        } else if self.corner_only {
            Vec2::ZERO
        } else {
            position
        }
    }
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_scale() -> f32 {
    1.0
}

/// On-disk layout of the database file
#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseFile {
    #[serde(default)]
    grounds: Vec<GroundData>,
    #[serde(default)]
    caves: Vec<CaveData>,
    #[serde(default)]
    walls: Vec<WallData>,
    #[serde(default)]
    floors: Vec<FloorData>,
    #[serde(default)]
    roofs: Vec<RoofData>,
    #[serde(default)]
    decorations: Vec<DecorationData>,
}

/// All content definitions, keyed by short name
#[derive(Debug, Clone, Default)]
pub struct Database {
    grounds: HashMap<String, Arc<GroundData>>,
    caves: HashMap<String, Arc<CaveData>>,
    walls: HashMap<String, Arc<WallData>>,
    floors: HashMap<String, Arc<FloorData>>,
    roofs: HashMap<String, Arc<RoofData>>,
    decorations: HashMap<String, Arc<DecorationData>>,
    default_cave: Option<String>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a database from its JSON representation
    pub fn from_json_str(content: &str) -> Result<Self, DatabaseError> {
        let file: DatabaseFile =
            serde_json::from_str(content).map_err(|e| DatabaseError::ParseError(e.to_string()))?;

        let mut database = Database::new();
        file.grounds.into_iter().for_each(|g| database.insert_ground(g));
        file.caves.into_iter().for_each(|c| database.insert_cave(c));
        file.walls.into_iter().for_each(|w| database.insert_wall(w));
        file.floors.into_iter().for_each(|f| database.insert_floor(f));
        file.roofs.into_iter().for_each(|r| database.insert_roof(r));
        file.decorations
            .into_iter()
            .for_each(|d| database.insert_decoration(d));

        tracing::info!(
            grounds = database.grounds.len(),
            walls = database.walls.len(),
            floors = database.floors.len(),
            roofs = database.roofs.len(),
            decorations = database.decorations.len(),
            "Loaded content database"
        );
        Ok(database)
    }

    /// Load a database from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, DatabaseError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    pub fn insert_ground(&mut self, data: GroundData) {
        self.grounds.insert(data.short_name.clone(), Arc::new(data));
    }

    pub fn insert_cave(&mut self, data: CaveData) {
        if data.default || self.default_cave.is_none() {
            self.default_cave = Some(data.short_name.clone());
        }
        self.caves.insert(data.short_name.clone(), Arc::new(data));
    }

    pub fn insert_wall(&mut self, data: WallData) {
        self.walls.insert(data.short_name.clone(), Arc::new(data));
    }

    pub fn insert_floor(&mut self, data: FloorData) {
        self.floors.insert(data.short_name.clone(), Arc::new(data));
    }

    pub fn insert_roof(&mut self, data: RoofData) {
        self.roofs.insert(data.short_name.clone(), Arc::new(data));
    }

    pub fn insert_decoration(&mut self, data: DecorationData) {
        self.decorations
            .insert(data.short_name.clone(), Arc::new(data));
    }

    pub fn ground(&self, short_name: &str) -> Option<Arc<GroundData>> {
        self.grounds.get(short_name).cloned()
    }

    pub fn cave(&self, short_name: &str) -> Option<Arc<CaveData>> {
        self.caves.get(short_name).cloned()
    }

    pub fn wall(&self, short_name: &str) -> Option<Arc<WallData>> {
        self.walls.get(short_name).cloned()
    }

    pub fn floor(&self, short_name: &str) -> Option<Arc<FloorData>> {
        self.floors.get(short_name).cloned()
    }

    pub fn roof(&self, short_name: &str) -> Option<Arc<RoofData>> {
        self.roofs.get(short_name).cloned()
    }

    pub fn decoration(&self, short_name: &str) -> Option<Arc<DecorationData>> {
        self.decorations.get(short_name).cloned()
    }

    /// Ground every new tile starts with
    pub fn default_ground(&self) -> Option<Arc<GroundData>> {
        self.ground(DEFAULT_GROUND)
    }

    /// Cave data every new tile starts with
    pub fn default_cave(&self) -> Option<Arc<CaveData>> {
        self.default_cave.as_deref().and_then(|name| self.cave(name))
    }
}
