//! Editor preferences that persist between sessions

mod file;

pub use file::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of maps kept in the recent list
pub const MAX_RECENT_MAPS: usize = 10;

/// A recently opened map file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentMap {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Width of maps created with "new"
    pub default_width: i32,
    /// Height of maps created with "new"
    pub default_height: i32,
    /// Maximum number of undoable actions, `None` for unlimited
    pub undo_limit: Option<usize>,
    /// Show the whole current layer instead of the floor with its neighbours
    pub render_entire_layer: bool,
    /// Most recent first
    pub recent_maps: Vec<RecentMap>,
    pub auto_open_last_map: bool,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            default_width: 25,
            default_height: 25,
            undo_limit: None,
            render_entire_layer: false,
            recent_maps: Vec::new(),
            auto_open_last_map: false,
        }
    }
}

impl EditorPreferences {
    /// Move `path` to the front of the recent list, dropping the oldest
    /// entries past [`MAX_RECENT_MAPS`]
    pub fn add_recent_map(&mut self, path: PathBuf, name: String) {
        let path = path.to_string_lossy().into_owned();
        self.recent_maps.retain(|recent| recent.path != path);
        self.recent_maps.insert(0, RecentMap { path, name });
        self.recent_maps.truncate(MAX_RECENT_MAPS);
    }

    pub fn remove_recent_map(&mut self, path: &str) {
        self.recent_maps.retain(|recent| recent.path != path);
    }

    pub fn clear_recent_maps(&mut self) {
        self.recent_maps.clear();
    }

    pub fn last_map(&self) -> Option<&RecentMap> {
        self.recent_maps.first()
    }

    /// The last map, if auto-open is enabled and the file still exists
    pub fn map_to_auto_open(&self) -> Option<&Path> {
        if !self.auto_open_last_map {
            return None;
        }
        self.last_map()
            .map(|recent| Path::new(recent.path.as_str()))
            .filter(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let preferences = EditorPreferences::default();
        assert_eq!((preferences.default_width, preferences.default_height), (25, 25));
        assert_eq!(preferences.undo_limit, None);
        assert!(preferences.last_map().is_none());
    }

    #[test]
    fn test_recent_maps_most_recent_first() {
        let mut preferences = EditorPreferences::default();
        preferences.add_recent_map(PathBuf::from("a.map"), "a".to_string());
        preferences.add_recent_map(PathBuf::from("b.map"), "b".to_string());
        preferences.add_recent_map(PathBuf::from("a.map"), "a again".to_string());

        let names: Vec<&str> = preferences.recent_maps.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a again", "b"]);

        preferences.remove_recent_map("b.map");
        assert_eq!(preferences.recent_maps.len(), 1);
        preferences.clear_recent_maps();
        assert!(preferences.recent_maps.is_empty());
    }

    #[test]
    fn test_recent_maps_capped() {
        let mut preferences = EditorPreferences::default();
        for i in 0..15 {
            preferences.add_recent_map(PathBuf::from(format!("{}.map", i)), i.to_string());
        }
        assert_eq!(preferences.recent_maps.len(), MAX_RECENT_MAPS);
        assert_eq!(preferences.last_map().unwrap().name, "14");
    }

    #[test]
    fn test_auto_open_requires_flag_and_file() {
        let mut preferences = EditorPreferences::default();
        preferences.add_recent_map(PathBuf::from("Cargo.toml"), "manifest".to_string());
        assert!(preferences.map_to_auto_open().is_none());

        preferences.auto_open_last_map = true;
        assert_eq!(preferences.map_to_auto_open(), Some(Path::new("Cargo.toml")));

        preferences.add_recent_map(PathBuf::from("missing/nowhere.map"), "gone".to_string());
        assert!(preferences.map_to_auto_open().is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let preferences: EditorPreferences = serde_json::from_str(r#"{ "undo_limit": 50 }"#).unwrap();
        assert_eq!(preferences.undo_limit, Some(50));
        assert_eq!(preferences.default_width, 25);
    }
}
