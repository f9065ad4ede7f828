//! deedplanner_editor - Editor layer for deedplanner maps
//!
//! This crate provides everything the editor does that is not drawing:
//! - Editor preferences (new map size, undo limit, recent maps)
//! - Map projects: opening and saving map files
//! - Tools: ground pencil and fill, materials calculator, map warnings
//!
//! The map model itself lives in [`deedplanner_core`].

pub mod preferences;
pub mod project;
pub mod tools;

pub use deedplanner_core;

use deedplanner_core::{Database, DatabaseError};

/// Content database shipped with the editor
pub const BUNDLED_DATABASE: &str = include_str!("../assets/database.json");

pub fn bundled_database() -> Result<Database, DatabaseError> {
    Database::from_json_str(BUNDLED_DATABASE)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_database_has_defaults() {
        let database = bundled_database().unwrap();
        assert!(database.default_ground().is_some());
        assert_eq!(database.default_cave().unwrap().short_name, "rock");
        assert!(database.ground("sr").unwrap().diagonal);
        assert!(database.decoration(deedplanner_core::DEED_TOKEN).is_some());
    }
}
