//! Editor tools - ground painting, materials calculator, map warnings
//!
//! The GUI translates input into calls on these; each call that edits the
//! map closes its own undo action.

mod ground;
mod materials;
mod warnings;

pub use ground::{GroundTool, GroundToolMode, MouseButton, SelectionHit, SelectionTarget};
pub use materials::{materials_report, MaterialsMode};
pub use warnings::map_warning_lines;
