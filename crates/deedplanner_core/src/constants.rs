//! Map-wide constants shared by the model, the document format and the tools

/// Version string written into saved maps
pub const VERSION_STRING: &str = "3.0.5 ALPHA";

/// Exporter string written into the `exporter` attribute of saved maps
pub const TITLE_STRING: &str = "DeedPlanner 3.0.5 ALPHA";

/// Number of surface floors (0..FLOOR_LIMIT)
pub const FLOOR_LIMIT: i32 = 16;

/// Lowest cave floor (NEGATIVE_FLOOR_LIMIT..0)
pub const NEGATIVE_FLOOR_LIMIT: i32 = -6;

/// Number of cave floors
pub const CAVE_FLOOR_COUNT: i32 = -NEGATIVE_FLOOR_LIMIT;

/// Edge length of one tile in world units
pub const TILE_SIZE: f32 = 4.0;

/// World units per height unit (heights are stored as integers)
pub const HEIGHT_SCALE: f32 = 0.1;

/// Vertical distance between two floors in world units
pub const FLOOR_HEIGHT: f32 = 3.0;

/// Lift applied to freeform decorations standing on a floor
pub const FLOOR_THICKNESS: f32 = 0.25;

/// Sub-tile positions are in `[0, SUB_TILE_EXTENT)`
pub const SUB_TILE_EXTENT: f32 = 4.0;

/// Grounds every new tile starts with
pub const DEFAULT_GROUND: &str = "gr";

/// Decoration short name marking a deed token
pub const DEED_TOKEN: &str = "token";

/// Returns true when `floor` addresses an existing surface or cave layer
#[inline]
pub fn is_valid_floor(floor: i32) -> bool {
    (NEGATIVE_FLOOR_LIMIT..FLOOR_LIMIT).contains(&floor)
}
