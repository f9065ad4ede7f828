//! Map warnings tool

use deedplanner_core::{collect_map_warnings, warning_lines, Map};

/// Lines shown in the warnings panel: every finding, or the all-clear line
pub fn map_warning_lines(map: &Map) -> Vec<String> {
    let warnings = collect_map_warnings(map);
    if !warnings.is_empty() {
        tracing::info!(warnings = warnings.len(), "Map has warnings");
    }
    warning_lines(&warnings)
}
