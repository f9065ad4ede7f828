//! Preferences file save/load operations

use super::EditorPreferences;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug)]
pub enum PreferencesError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    NoConfigDir,
}

impl std::fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferencesError::IoError(e) => write!(f, "IO error: {}", e),
            PreferencesError::ParseError(e) => write!(f, "Parse error: {}", e),
            PreferencesError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            PreferencesError::NoConfigDir => write!(f, "Could not determine config directory"),
        }
    }
}

impl std::error::Error for PreferencesError {}

impl EditorPreferences {
    /// Get the config directory path for the editor
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "warlander", "deedplanner").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the preferences file path
    pub fn preferences_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(PREFERENCES_FILE))
    }

    /// Load preferences from file, returning defaults if not found
    pub fn load() -> Self {
        let result = Self::preferences_path()
            .ok_or(PreferencesError::NoConfigDir)
            .and_then(|path| Self::load_from(&path));
        match result {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Could not load preferences: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load preferences from `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self, PreferencesError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| PreferencesError::IoError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| PreferencesError::ParseError(e.to_string()))
    }

    /// Save preferences to file
    pub fn save(&self) -> Result<(), PreferencesError> {
        let path = Self::preferences_path().ok_or(PreferencesError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save preferences to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| PreferencesError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PreferencesError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| PreferencesError::IoError(e.to_string()))?;

        tracing::info!("Saved preferences to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("deedplanner-prefs-{}", fastrand::u64(..)))
    }

    #[test]
    fn test_save_and_load() {
        let dir = scratch_dir();
        let path = dir.join("nested").join(PREFERENCES_FILE);

        let mut preferences = EditorPreferences::default();
        preferences.undo_limit = Some(200);
        preferences.add_recent_map(PathBuf::from("castle.map"), "castle".to_string());
        preferences.save_to(&path).unwrap();

        let loaded = EditorPreferences::load_from(&path).unwrap();
        assert_eq!(loaded, preferences);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = scratch_dir().join(PREFERENCES_FILE);
        assert_eq!(EditorPreferences::load_from(&path).unwrap(), EditorPreferences::default());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = scratch_dir();
        let path = dir.join(PREFERENCES_FILE);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "{ undo_limit").unwrap();

        assert!(matches!(
            EditorPreferences::load_from(&path),
            Err(PreferencesError::ParseError(_))
        ));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
