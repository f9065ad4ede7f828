//! Map consistency warnings
//!
//! Checks run over every tile against the ground floor buildings summary.
//! A check that fails does not stop the scan, but its error is logged and the
//! report is replaced by one generic item.

use crate::constants::{DEED_TOKEN, FLOOR_LIMIT, NEGATIVE_FLOOR_LIMIT};
use crate::error::MapError;
use crate::map::Map;
use crate::summary::BuildingsSummary;
use crate::tile::Tile;
use std::fmt;

const SLOPED_WALL: &str = "\nBuilding wall on sloped terrain.";
const CONTENT_OUTSIDE_BUILDING: &str =
    "Floor or roof outside known building.\nPlease make sure all ground level walls are built.";
const WALL_OUTSIDE_BUILDING: &str =
    "Wall outside known building.\nPlease make sure all ground level walls are built.";
const BUILDINGS_SHARING_CORNER: &str = "Buildings sharing corner.\nTwo buildings cannot share any corner.";
const TOKEN_INSIDE_BUILDING: &str = "Deed token inside building.\nTokens must be placed outside.";

pub const CHECKS_FAILED: &str = "Some of warning checks failed. Please check program logs for errors.";
pub const NO_WARNINGS: &str = "No warnings for this map.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    SlopedWall,
    ContentOutsideBuilding,
    WallOutsideBuilding,
    BuildingsSharingCorner,
    TokenInsideBuilding,
    /// A check could not complete; details are in the log
    CheckFailed,
}

impl WarningKind {
    fn text(&self) -> &'static str {
        match self {
            WarningKind::SlopedWall => SLOPED_WALL,
            WarningKind::ContentOutsideBuilding => CONTENT_OUTSIDE_BUILDING,
            WarningKind::WallOutsideBuilding => WALL_OUTSIDE_BUILDING,
            WarningKind::BuildingsSharingCorner => BUILDINGS_SHARING_CORNER,
            WarningKind::TokenInsideBuilding => TOKEN_INSIDE_BUILDING,
            WarningKind::CheckFailed => CHECKS_FAILED,
        }
    }
}

/// One finding of the warnings scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapWarning {
    pub kind: WarningKind,
    /// Tile the finding is about; `None` for [`WarningKind::CheckFailed`]
    pub tile: Option<(i32, i32)>,
}

impl MapWarning {
    fn at(tile: &Tile, kind: WarningKind) -> Self {
        Self {
            kind,
            tile: Some((tile.x(), tile.y())),
        }
    }
}

impl fmt::Display for MapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tile {
            Some((x, y)) => write!(f, "({}, {}) {}", x, y, self.kind.text()),
            None => f.write_str(self.kind.text()),
        }
    }
}

type Check = fn(&Map, &BuildingsSummary, &Tile, &mut Vec<MapWarning>) -> Result<(), MapError>;

fn check_sloped_walls(
    _map: &Map,
    _summary: &BuildingsSummary,
    tile: &Tile,
    warnings: &mut Vec<MapWarning>,
) -> Result<(), MapError> {
    for floor in NEGATIVE_FLOOR_LIMIT..FLOOR_LIMIT {
        let sloped = [tile.vertical_wall(floor), tile.horizontal_wall(floor)]
            .into_iter()
            .flatten()
            .any(|wall| wall.data().house_wall && wall.slope_difference() != 0);
        if sloped {
            warnings.push(MapWarning::at(tile, WarningKind::SlopedWall));
            break;
        }
    }
    Ok(())
}

fn check_content_outside_building(
    _map: &Map,
    summary: &BuildingsSummary,
    tile: &Tile,
    warnings: &mut Vec<MapWarning>,
) -> Result<(), MapError> {
    let contains_floor = summary.contains_floor(tile);
    let contains_vertical_wall = summary.contains_vertical_wall(tile);
    let contains_horizontal_wall = summary.contains_horizontal_wall(tile);
    if contains_vertical_wall && contains_horizontal_wall {
        return Ok(());
    }

    for floor in NEGATIVE_FLOOR_LIMIT..FLOOR_LIMIT {
        if !contains_floor && tile.tile_content(floor).is_some() {
            warnings.push(MapWarning::at(tile, WarningKind::ContentOutsideBuilding));
        }

        let stray_vertical = !contains_vertical_wall
            && tile
                .vertical_wall(floor)
                .is_some_and(|wall| wall.data().house_wall);
        let stray_horizontal = !contains_horizontal_wall
            && tile
                .horizontal_wall(floor)
                .is_some_and(|wall| wall.data().house_wall);
        if stray_vertical || stray_horizontal {
            warnings.push(MapWarning::at(tile, WarningKind::WallOutsideBuilding));
            break;
        }
    }
    Ok(())
}

fn check_buildings_sharing_corner(
    _map: &Map,
    summary: &BuildingsSummary,
    tile: &Tile,
    warnings: &mut Vec<MapWarning>,
) -> Result<(), MapError> {
    let Some(building) = summary.building_at_tile(tile) else {
        return Ok(());
    };
    for dx in [-1, 1] {
        let diagonal = summary.building_at_coords(tile.x() + dx, tile.y() + 1);
        if diagonal.is_some_and(|other| other != building) {
            warnings.push(MapWarning::at(tile, WarningKind::BuildingsSharingCorner));
        }
    }
    Ok(())
}

fn check_token_inside_building(
    _map: &Map,
    summary: &BuildingsSummary,
    tile: &Tile,
    warnings: &mut Vec<MapWarning>,
) -> Result<(), MapError> {
    let is_token = tile
        .central_decoration(0)
        .is_some_and(|decoration| decoration.data().short_name == DEED_TOKEN);
    if is_token && summary.building_at_tile(tile).is_some() {
        warnings.push(MapWarning::at(tile, WarningKind::TokenInsideBuilding));
    }
    Ok(())
}

const CHECKS: [(&str, Check); 4] = [
    ("sloped walls", check_sloped_walls),
    ("content outside building", check_content_outside_building),
    ("buildings sharing corner", check_buildings_sharing_corner),
    ("token inside building", check_token_inside_building),
];

/// Run every check on every tile of the map
pub fn collect_map_warnings(map: &Map) -> Vec<MapWarning> {
    run_checks(map, &CHECKS)
}

fn run_checks(map: &Map, checks: &[(&str, Check)]) -> Vec<MapWarning> {
    let summary = BuildingsSummary::new(map, 0);
    let mut warnings = Vec::new();
    let mut failed = false;

    for tile in map.tiles() {
        for (name, check) in checks {
            if let Err(e) = check(map, &summary, tile, &mut warnings) {
                tracing::error!("Warning check '{}' failed on ({}, {}): {}", name, tile.x(), tile.y(), e);
                failed = true;
            }
        }
    }

    if failed {
        warnings.clear();
        warnings.push(MapWarning {
            kind: WarningKind::CheckFailed,
            tile: None,
        });
    }
    tracing::debug!(warnings = warnings.len(), "Collected map warnings");
    warnings
}

/// Warnings as display lines, or the single all-clear line
pub fn warning_lines(warnings: &[MapWarning]) -> Vec<String> {
    if warnings.is_empty() {
        return vec![NO_WARNINGS.to_string()];
    }
    warnings.iter().map(MapWarning::to_string).collect()
}
