//! Error types for map editing, content loading and map documents

use std::fmt;

/// Precondition violations reported by map and tile operations
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Coordinates outside `[0, width] x [0, height]`
    TileOutOfBounds { x: i32, y: i32 },
    /// Edge tiles only mark the map boundary and never hold content
    EdgeTile { x: i32, y: i32 },
    /// Floor index outside the supported surface/cave range
    FloorOutOfRange(i32),
    /// Freeform sub-tile position outside `[0, 4)`
    SubPositionOutOfRange { x: f32, y: f32 },
    /// The queried entity does not belong to the tile
    EntityNotInTile,
    /// Relative floor opacity requested outside `-2..=0`
    OpacityOutOfRange(i32),
    /// The content database lacks an entry every map needs
    MissingDefaultData(&'static str),
    /// Map dimensions must be at least one tile
    InvalidDimensions { width: i32, height: i32 },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::TileOutOfBounds { x, y } => write!(f, "Tile ({}, {}) is outside the map", x, y),
            MapError::EdgeTile { x, y } => {
                write!(f, "Tile ({}, {}) is a map edge marker and cannot hold content", x, y)
            }
            MapError::FloorOutOfRange(floor) => write!(f, "Floor {} is out of range", floor),
            MapError::SubPositionOutOfRange { x, y } => {
                write!(f, "Sub-tile position ({}, {}) is outside the tile", x, y)
            }
            MapError::EntityNotInTile => write!(f, "Entity is not part of the tile"),
            MapError::OpacityOutOfRange(relative) => write!(
                f,
                "Relative floor opacity is supported only for values from -2 to 0, supplied value: {}",
                relative
            ),
            MapError::MissingDefaultData(what) => {
                write!(f, "Content database has no default {}", what)
            }
            MapError::InvalidDimensions { width, height } => {
                write!(f, "Invalid map dimensions {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for MapError {}

/// Errors raised while reading or writing a map document
#[derive(Debug)]
pub enum DocumentError {
    /// Underlying XML syntax or encoding error
    Xml(String),
    /// Root element is not `<map>`
    UnexpectedRoot(String),
    /// A required attribute is absent
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// An attribute value could not be parsed
    InvalidAttribute {
        attribute: String,
        value: String,
    },
    /// The document was rejected by the map (bad dimensions, etc.)
    Map(MapError),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Xml(e) => write!(f, "XML error: {}", e),
            DocumentError::UnexpectedRoot(name) => {
                write!(f, "Expected <map> root element, found <{}>", name)
            }
            DocumentError::MissingAttribute { element, attribute } => {
                write!(f, "Element <{}> is missing attribute '{}'", element, attribute)
            }
            DocumentError::InvalidAttribute { attribute, value } => {
                write!(f, "Invalid value '{}' for attribute '{}'", value, attribute)
            }
            DocumentError::Map(e) => write!(f, "Map error: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<quick_xml::Error> for DocumentError {
    fn from(e: quick_xml::Error) -> Self {
        DocumentError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocumentError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        DocumentError::Xml(e.to_string())
    }
}

impl From<MapError> for DocumentError {
    fn from(e: MapError) -> Self {
        DocumentError::Map(e)
    }
}

/// Errors raised while loading the content database
#[derive(Debug)]
pub enum DatabaseError {
    IoError(String),
    ParseError(String),
    /// A `name=count` material list entry could not be parsed
    InvalidMaterials(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::IoError(e) => write!(f, "IO error: {}", e),
            DatabaseError::ParseError(e) => write!(f, "Parse error: {}", e),
            DatabaseError::InvalidMaterials(entry) => {
                write!(f, "Invalid materials entry: '{}'", entry)
            }
        }
    }
}

impl std::error::Error for DatabaseError {}
