//! Materials calculator reports

use deedplanner_core::{BuildingsSummary, Map, Materials};
use std::fmt::Write;

const NO_BUILDING: &str = "No valid building on clicked tile";
const NO_ROOM: &str = "No valid room on clicked tile";
const CARPENTRY_ON_GROUND_ONLY: &str = "To calculate carpentry needed, please use this option on a ground floor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialsMode {
    /// Whole building on every floor, using the ground floor layout
    #[default]
    BuildingAllLevels,
    /// The building on the current floor only
    BuildingCurrentLevel,
    /// The room on the current floor only
    RoomCurrentLevel,
}

/// Text report for the building or room at `(x, y)`
pub fn materials_report(map: &Map, mode: MaterialsMode, x: i32, y: i32, floor: i32) -> String {
    match mode {
        MaterialsMode::BuildingAllLevels => building_all_levels(map, x, y),
        MaterialsMode::BuildingCurrentLevel => building_current_level(map, x, y, floor),
        MaterialsMode::RoomCurrentLevel => room_current_level(map, x, y, floor),
    }
}

fn building_all_levels(map: &Map, x: i32, y: i32) -> String {
    let summary = BuildingsSummary::new(map, 0);
    let Some(building) = summary.building_at_coords(x, y) else {
        return NO_BUILDING.to_string();
    };

    let mut materials = Materials::new();
    for part in building.all_tiles() {
        if let Some(tile) = map.tile(part.x, part.y) {
            materials.add_all(&tile.calculate_tile_materials(part.part));
        }
    }
    tracing::debug!("{}", building.create_summary());

    let mut report = String::new();
    let _ = writeln!(report, "Carpentry needed: {}", building.carpentry_required());
    let _ = writeln!(report, "Total tiles: {}", building.tiles_count());
    let _ = writeln!(report);
    let _ = write!(report, "{}", materials);
    report
}

fn building_current_level(map: &Map, x: i32, y: i32, floor: i32) -> String {
    let summary = BuildingsSummary::new(map, floor);
    let Some(building) = summary.building_at_coords(x, y) else {
        return NO_BUILDING.to_string();
    };

    let mut materials = Materials::new();
    for part in building.all_tiles() {
        if let Some(tile) = map.tile(part.x, part.y) {
            materials.add_all(&tile.calculate_floor_materials(floor, part.part));
        }
    }
    tracing::debug!("{}", building.create_summary());

    let mut report = String::new();
    if floor == 0 || floor == -1 {
        let _ = writeln!(report, "Carpentry needed: {}", building.carpentry_required());
    } else {
        let _ = writeln!(report, "{}", CARPENTRY_ON_GROUND_ONLY);
    }
    let _ = writeln!(report, "Rooms on this level: {}", building.rooms_count());
    let _ = writeln!(report, "Tiles on this level: {}", building.tiles_count());
    let _ = writeln!(report);
    let _ = write!(report, "{}", materials);
    report
}

fn room_current_level(map: &Map, x: i32, y: i32, floor: i32) -> String {
    let summary = BuildingsSummary::new(map, floor);
    let Some(room) = map.tile(x, y).and_then(|tile| summary.room_at_tile(tile)) else {
        return NO_ROOM.to_string();
    };

    let mut materials = Materials::new();
    for part in room.tiles() {
        if let Some(tile) = map.tile(part.x, part.y) {
            materials.add_all(&tile.calculate_floor_materials(floor, part.part));
        }
    }
    tracing::debug!("{}", room.create_summary());

    let mut report = String::new();
    let _ = writeln!(report, "Tiles in this room: {}", room.tiles().len());
    let _ = writeln!(report);
    let _ = write!(report, "{}", materials);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_database;
    use deedplanner_core::FloorOrientation;

    /// 2x1 house of two rooms split by an interior wall, floored on levels 0 and 1
    fn two_room_house() -> Map {
        let database = sample_database();
        let mut map = Map::new(5, 4, &database).unwrap();
        let wall = database.wall("ww");
        for x in 1..3 {
            map.set_horizontal_wall(x, 1, wall.clone(), false, 0).unwrap();
            map.set_horizontal_wall(x, 2, wall.clone(), false, 0).unwrap();
        }
        for x in 1..4 {
            map.set_vertical_wall(x, 1, wall.clone(), false, 0).unwrap();
        }
        for x in 1..3 {
            for floor in 0..2 {
                map.set_floor(x, 1, database.floor("pl"), FloorOrientation::Down, floor)
                    .unwrap();
            }
        }
        map.finish_action();
        map
    }

    #[test]
    fn test_building_all_levels() {
        let map = two_room_house();
        let report = materials_report(&map, MaterialsMode::BuildingAllLevels, 1, 1, 0);
        assert_eq!(
            report,
            "Carpentry needed: 3\nTotal tiles: 2\n\nMaterials needed:\n\nNails = 78\nPlank = 320\n"
        );
    }

    #[test]
    fn test_building_current_level_above_ground() {
        let map = two_room_house();
        let report = materials_report(&map, MaterialsMode::BuildingCurrentLevel, 2, 1, 1);
        assert_eq!(report, NO_BUILDING);

        let report = materials_report(&map, MaterialsMode::BuildingCurrentLevel, 2, 1, 0);
        assert!(report.starts_with("Carpentry needed: 3\nRooms on this level: 2\nTiles on this level: 2\n"));
    }

    #[test]
    fn test_room_current_level() {
        let map = two_room_house();
        let report = materials_report(&map, MaterialsMode::RoomCurrentLevel, 1, 1, 0);
        assert_eq!(
            report,
            "Tiles in this room: 3\n\nMaterials needed:\n\nNails = 42\nPlank = 170\n"
        );

        assert_eq!(materials_report(&map, MaterialsMode::RoomCurrentLevel, 0, 0, 0), NO_ROOM);
    }
}
