//! Map project management
//!
//! A [`MapProject`] is an open map together with the file it belongs to and
//! whether it has unsaved edits.

mod file;

pub use file::*;

use crate::preferences::EditorPreferences;
use deedplanner_core::{Database, Map, MapError, SceneBackend};
use std::path::{Path, PathBuf};

pub struct MapProject {
    pub map: Map,
    pub path: Option<PathBuf>,
    pub dirty: bool,
}

impl MapProject {
    /// New empty map sized from the preferences
    pub fn new(
        database: &Database,
        preferences: &EditorPreferences,
        scene: Box<dyn SceneBackend>,
    ) -> Result<Self, MapError> {
        let map = Map::with_scene(
            preferences.default_width,
            preferences.default_height,
            database,
            scene,
        )?;
        Ok(Self::from_map(map, preferences))
    }

    /// Wrap an already built map, applying the history and visibility preferences
    pub fn from_map(mut map: Map, preferences: &EditorPreferences) -> Self {
        map.set_history_limit(preferences.undo_limit);
        map.set_render_entire_layer(preferences.render_entire_layer);
        Self {
            map,
            path: None,
            dirty: false,
        }
    }

    /// Display name: the file stem, or "Untitled" before the first save
    pub fn name(&self) -> &str {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|stem| stem.to_str())
            .unwrap_or("Untitled")
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
