//! Tile entities: the content placed in a tile's keyed slots, plus the
//! always-present ground and cave of every tile.

use crate::data::{
    CaveData, DecorationData, FloorData, GroundData, Materials, ModelReference, RoofData, TextureReference,
    WallData,
};
use crate::scene::ModelHandle;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Map-unique identity of a placed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Road shape of a diagonal ground tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoadDirection {
    #[default]
    Center,
    NW,
    NE,
    SW,
    SE,
}

impl RoadDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadDirection::Center => "CENTER",
            RoadDirection::NW => "NW",
            RoadDirection::NE => "NE",
            RoadDirection::SW => "SW",
            RoadDirection::SE => "SE",
        }
    }

    /// Lenient parse; anything unknown is the plain center road
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "NW" => RoadDirection::NW,
            "NE" => RoadDirection::NE,
            "SW" => RoadDirection::SW,
            "SE" => RoadDirection::SE,
            _ => RoadDirection::Center,
        }
    }

    fn covers_west(&self) -> bool {
        matches!(self, RoadDirection::NW | RoadDirection::SW)
    }

    fn covers_east(&self) -> bool {
        matches!(self, RoadDirection::NE | RoadDirection::SE)
    }

    fn covers_south(&self) -> bool {
        matches!(self, RoadDirection::SW | RoadDirection::SE)
    }

    fn covers_north(&self) -> bool {
        matches!(self, RoadDirection::NW | RoadDirection::NE)
    }
}

/// The ground of a tile
#[derive(Debug, Clone)]
pub struct Ground {
    pub(crate) data: Arc<GroundData>,
    pub(crate) road_direction: RoadDirection,
}

impl Ground {
    pub fn new(data: Arc<GroundData>) -> Self {
        Self {
            data,
            road_direction: RoadDirection::Center,
        }
    }

    pub fn data(&self) -> &Arc<GroundData> {
        &self.data
    }

    pub fn road_direction(&self) -> RoadDirection {
        self.road_direction
    }

    /// Quadrant textures (W, N, E, S) given the neighbours' grounds in the
    /// same order. A road side takes the neighbour's texture unless the road
    /// direction keeps that side or the neighbour is missing.
    pub fn quadrant_textures(&self, neighbours: [Option<&Ground>; 4]) -> [TextureReference; 4] {
        let own = self.data.tex3d.clone();
        if self.road_direction == RoadDirection::Center {
            return [own.clone(), own.clone(), own.clone(), own];
        }

        let direction = self.road_direction;
        let keeps_own = [
            direction.covers_west(),
            direction.covers_north(),
            direction.covers_east(),
            direction.covers_south(),
        ];
        let mut textures: [TextureReference; 4] = Default::default();
        for (i, neighbour) in neighbours.iter().enumerate() {
            textures[i] = match neighbour {
                Some(ground) if !keeps_own[i] => ground.data.tex3d.clone(),
                _ => own.clone(),
            };
        }
        textures
    }
}

/// The cave layer of a tile
#[derive(Debug, Clone)]
pub struct Cave {
    pub(crate) data: Arc<CaveData>,
}

impl Cave {
    pub fn new(data: Arc<CaveData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Arc<CaveData> {
        &self.data
    }
}

/// Rotation of a floor tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FloorOrientation {
    Up,
    Right,
    #[default]
    Down,
    Left,
}

impl FloorOrientation {
    pub fn rotation(&self) -> f32 {
        match self {
            FloorOrientation::Up => 0.0,
            FloorOrientation::Right => 90.0,
            FloorOrientation::Down => 180.0,
            FloorOrientation::Left => 270.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FloorOrientation::Up => "UP",
            FloorOrientation::Right => "RIGHT",
            FloorOrientation::Down => "DOWN",
            FloorOrientation::Left => "LEFT",
        }
    }
}

impl FromStr for FloorOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(FloorOrientation::Up),
            "RIGHT" => Ok(FloorOrientation::Right),
            "DOWN" => Ok(FloorOrientation::Down),
            "LEFT" => Ok(FloorOrientation::Left),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for FloorOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallOrientation {
    /// Runs along the X axis on the tile's south edge
    Horizontal,
    /// Runs along the Y axis on the tile's west edge
    Vertical,
}

impl WallOrientation {
    pub fn rotation(&self) -> f32 {
        match self {
            WallOrientation::Horizontal => 180.0,
            WallOrientation::Vertical => 90.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wall {
    pub(crate) data: Arc<WallData>,
    pub(crate) reversed: bool,
    pub(crate) orientation: WallOrientation,
    pub(crate) slope_difference: i32,
    pub(crate) ground_floor: bool,
}

impl Wall {
    pub fn data(&self) -> &Arc<WallData> {
        &self.data
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn orientation(&self) -> WallOrientation {
        self.orientation
    }

    /// Height of this tile's corner minus the next corner along the wall
    pub fn slope_difference(&self) -> i32 {
        self.slope_difference
    }

    /// Ground floor walls use the data's bottom model
    pub fn model_reference(&self) -> &ModelReference {
        if self.ground_floor {
            &self.data.bottom_model
        } else {
            &self.data.normal_model
        }
    }
}

#[derive(Debug, Clone)]
pub struct Floor {
    pub(crate) data: Arc<FloorData>,
    pub(crate) orientation: FloorOrientation,
}

impl Floor {
    pub fn data(&self) -> &Arc<FloorData> {
        &self.data
    }

    pub fn orientation(&self) -> FloorOrientation {
        self.orientation
    }
}

/// Shape of a roof tile, derived from which neighbours sit lower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoofShape {
    /// Surrounded by roofs of at least the same level
    #[default]
    Flat,
    /// Only a diagonal neighbour is lower
    InnerCorner,
    /// One side is lower
    Side,
    /// Two adjacent sides are lower
    OuterCorner,
    /// Two opposite sides are lower
    Ridge,
    /// Three sides are lower
    RidgeEnd,
    /// All four sides are lower
    Peak,
}

#[derive(Debug, Clone)]
pub struct Roof {
    pub(crate) data: Arc<RoofData>,
    pub(crate) level: i32,
    pub(crate) shape: RoofShape,
    pub(crate) rotation: f32,
}

impl Roof {
    pub fn data(&self) -> &Arc<RoofData> {
        &self.data
    }

    /// Distance to the nearest roof edge, 0 at the edge
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn shape(&self) -> RoofShape {
        self.shape
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }
}

#[derive(Debug, Clone)]
pub struct Decoration {
    pub(crate) data: Arc<DecorationData>,
    pub(crate) position: Vec2,
    pub(crate) rotation: f32,
}

impl Decoration {
    pub fn data(&self) -> &Arc<DecorationData> {
        &self.data
    }

    /// Sub-tile position in `[0, 4)`
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Yaw in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: [f32; 3],
}

/// Closed set of slot entity variants
#[derive(Debug, Clone)]
pub enum EntityKind {
    Floor(Floor),
    Roof(Roof),
    Wall(Wall),
    Decoration(Decoration),
    Label(Label),
}

/// An entity occupying one keyed slot of a tile
#[derive(Debug, Clone)]
pub struct TileEntity {
    pub(crate) id: EntityId,
    pub(crate) model: Option<ModelHandle>,
    pub(crate) position: Vec3,
    pub(crate) kind: EntityKind,
}

impl TileEntity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    /// World position, refreshed whenever the tile or its heights change
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn as_floor(&self) -> Option<&Floor> {
        match &self.kind {
            EntityKind::Floor(floor) => Some(floor),
            _ => None,
        }
    }

    pub fn as_roof(&self) -> Option<&Roof> {
        match &self.kind {
            EntityKind::Roof(roof) => Some(roof),
            _ => None,
        }
    }

    pub fn as_wall(&self) -> Option<&Wall> {
        match &self.kind {
            EntityKind::Wall(wall) => Some(wall),
            _ => None,
        }
    }

    pub fn as_decoration(&self) -> Option<&Decoration> {
        match &self.kind {
            EntityKind::Decoration(decoration) => Some(decoration),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match &self.kind {
            EntityKind::Label(label) => Some(label),
            _ => None,
        }
    }

    /// Short name of the content data, if the entity has any
    pub fn short_name(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Floor(floor) => Some(&floor.data.short_name),
            EntityKind::Roof(roof) => Some(&roof.data.short_name),
            EntityKind::Wall(wall) => Some(&wall.data.short_name),
            EntityKind::Decoration(decoration) => Some(&decoration.data.short_name),
            EntityKind::Label(_) => None,
        }
    }

    /// Construction cost of this entity
    pub fn materials(&self) -> Option<&Materials> {
        match &self.kind {
            EntityKind::Floor(floor) => Some(&floor.data.materials),
            EntityKind::Roof(roof) => Some(&roof.data.materials),
            EntityKind::Wall(wall) => Some(&wall.data.materials),
            EntityKind::Decoration(decoration) => Some(&decoration.data.materials),
            EntityKind::Label(_) => None,
        }
    }

    /// Yaw in degrees
    pub fn rotation(&self) -> f32 {
        match &self.kind {
            EntityKind::Floor(floor) => floor.orientation.rotation(),
            EntityKind::Roof(roof) => roof.rotation,
            EntityKind::Wall(wall) => wall.orientation.rotation(),
            EntityKind::Decoration(decoration) => decoration.rotation,
            EntityKind::Label(_) => 0.0,
        }
    }
}
