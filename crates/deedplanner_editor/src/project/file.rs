//! Map file save/load operations

use super::MapProject;
use crate::preferences::EditorPreferences;
use deedplanner_core::{read_map_document, write_map_document, Database, Map, SceneBackend};
use std::path::Path;

#[derive(Debug)]
pub enum ProjectError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    NoPath,
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::IoError(e) => write!(f, "IO error: {}", e),
            ProjectError::ParseError(e) => write!(f, "Parse error: {}", e),
            ProjectError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ProjectError::NoPath => write!(f, "No file path set"),
        }
    }
}

impl std::error::Error for ProjectError {}

impl MapProject {
    /// Load a map file. Unknown content in the file is skipped with a warning.
    pub fn load(
        path: &Path,
        database: &Database,
        preferences: &EditorPreferences,
        scene: Box<dyn SceneBackend>,
    ) -> Result<Self, ProjectError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ProjectError::IoError(e.to_string()))?;

        let document =
            read_map_document(&content).map_err(|e| ProjectError::ParseError(e.to_string()))?;
        let map = Map::from_document(&document, database, scene)
            .map_err(|e| ProjectError::ParseError(e.to_string()))?;

        let mut project = Self::from_map(map, preferences);
        project.path = Some(path.to_path_buf());

        tracing::info!("Opened map {:?}", path);
        Ok(project)
    }

    /// Save map to file
    pub fn save(&mut self, path: &Path) -> Result<(), ProjectError> {
        let content = write_map_document(&self.map.to_document())
            .map_err(|e| ProjectError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ProjectError::IoError(e.to_string()))?;

        self.path = Some(path.to_path_buf());
        self.dirty = false;

        tracing::info!("Saved map to {:?}", path);
        Ok(())
    }

    /// Save to current path if set
    pub fn save_current(&mut self) -> Result<(), ProjectError> {
        if let Some(path) = self.path.clone() {
            self.save(&path)
        } else {
            Err(ProjectError::NoPath)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_database;
    use deedplanner_core::{FloorOrientation, NullScene};
    use std::path::PathBuf;

    fn scratch_file() -> PathBuf {
        std::env::temp_dir().join(format!("deedplanner-map-{}.map", fastrand::u64(..)))
    }

    #[test]
    fn test_save_and_load() {
        let database = sample_database();
        let preferences = EditorPreferences::default();
        let mut project = MapProject::new(&database, &preferences, Box::new(NullScene)).unwrap();
        project.map.set_surface_height(3, 3, 25).unwrap();
        project
            .map
            .set_floor(3, 3, database.floor("pl"), FloorOrientation::Left, 1)
            .unwrap();
        project.mark_dirty();

        let path = scratch_file();
        project.save(&path).unwrap();
        assert!(!project.dirty);
        assert_eq!(project.path.as_deref(), Some(path.as_path()));

        let loaded = MapProject::load(&path, &database, &preferences, Box::new(NullScene)).unwrap();
        assert_eq!(loaded.map.to_document(), project.map.to_document());
        assert!(!loaded.map.can_undo());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_save_current_without_path() {
        let preferences = EditorPreferences::default();
        let mut project = MapProject::new(&sample_database(), &preferences, Box::new(NullScene)).unwrap();
        assert!(matches!(project.save_current(), Err(ProjectError::NoPath)));
    }

    #[test]
    fn test_load_errors() {
        let database = sample_database();
        let preferences = EditorPreferences::default();
        let missing = MapProject::load(
            Path::new("does/not/exist.map"),
            &database,
            &preferences,
            Box::new(NullScene),
        );
        assert!(matches!(missing, Err(ProjectError::IoError(_))));

        let path = scratch_file();
        std::fs::write(&path, "<deed></deed>").unwrap();
        let wrong_root = MapProject::load(&path, &database, &preferences, Box::new(NullScene));
        assert!(matches!(wrong_root, Err(ProjectError::ParseError(_))));
        std::fs::remove_file(path).unwrap();
    }
}
