mod common;

use common::{database, RecordingScene};
use deedplanner_core::{
    read_map_document, write_map_document, EntityDocument, FloorOrientation, Label, Map, NullScene, RoadDirection,
};
use glam::Vec2;

fn furnished_map() -> Map {
    let database = database();
    let mut map = Map::new(5, 4, &database).unwrap();

    map.set_surface_height(1, 1, 12).unwrap();
    map.set_surface_height(5, 4, -3).unwrap();
    map.set_cave_height(2, 2, -30).unwrap();
    map.set_cave_size(2, 2, 40).unwrap();
    map.paint_ground(3, 0, database.ground("sr").unwrap(), RoadDirection::SW)
        .unwrap();
    map.set_cave_data(0, 3, database.cave("cf").unwrap()).unwrap();

    map.set_floor(1, 1, database.floor("pl"), FloorOrientation::Right, 0)
        .unwrap();
    map.set_floor(1, 1, database.floor("ss"), FloorOrientation::Up, -1)
        .unwrap();
    map.set_horizontal_wall(1, 1, database.wall("sa"), true, 0).unwrap();
    map.set_horizontal_wall(1, 1, database.wall("if"), false, 0).unwrap();
    map.set_vertical_wall(2, 1, database.wall("sw"), false, 1).unwrap();
    map.set_roof(2, 2, database.roof("sl"), 2).unwrap();
    map.set_decoration(3, 2, database.decoration("barrel"), Vec2::new(1.5, 2.25), 45.0, 0)
        .unwrap();
    map.set_decoration(3, 2, database.decoration("barrel"), Vec2::new(3.0, 0.5), 0.0, 0)
        .unwrap();
    map.set_label(
        4,
        3,
        Some(Label {
            text: "Smithy & \"forge\"".to_string(),
            color: [1.0, 0.5, 0.25],
        }),
        0,
    )
    .unwrap();
    map.finish_action();
    map
}

#[test]
fn test_document_round_trip() {
    let map = furnished_map();
    let document = map.to_document();

    let loaded = Map::from_document(&document, &database(), Box::new(NullScene)).unwrap();
    assert_eq!(loaded.to_document(), document);
    assert!(!loaded.can_undo());
    assert_eq!(loaded.highest_surface_height(), 12);
    assert_eq!(loaded.lowest_surface_height(), -3);
    assert_eq!(loaded.lowest_cave_height(), -30);
}

#[test]
fn test_xml_round_trip() {
    let map = furnished_map();
    let xml = write_map_document(&map.to_document()).unwrap();
    let document = read_map_document(&xml).unwrap();

    let loaded = Map::from_document(&document, &database(), Box::new(NullScene)).unwrap();
    assert_eq!(loaded.to_document(), map.to_document());

    let tile = loaded.tile(3, 0).unwrap();
    assert_eq!(tile.ground().data().short_name, "sr");
    assert_eq!(tile.ground().road_direction(), RoadDirection::SW);
    let floor = loaded.tile(1, 1).unwrap().tile_content(0).unwrap().as_floor().unwrap();
    assert_eq!(floor.orientation(), FloorOrientation::Right);
    assert!(loaded.tile(1, 1).unwrap().horizontal_wall(0).unwrap().reversed());
    assert!(loaded.tile(1, 1).unwrap().horizontal_fence(0).is_some());
}

#[test]
fn test_unknown_content_is_skipped() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<map width="3" height="3" exporter="DeedPlanner 2.9">
  <tile x="0" y="0" height="4" caveHeight="0" caveSize="30">
    <ground id="lava"/>
    <level value="0">
      <floor id="marble"/>
      <hWall id="sw"/>
      <object id="barrel" x="9" y="1"/>
    </level>
  </tile>
  <tile x="1" y="1" height="0" caveHeight="0" caveSize="30">
    <ground id="di" dir="NW"/>
    <level value="0">
      <floor id="pl"/>
    </level>
  </tile>
  <tile x="3" y="3" height="2" caveHeight="0" caveSize="30">
    <ground id="gr"/>
    <level value="0">
      <floor id="pl"/>
    </level>
  </tile>
</map>"#;
    let document = read_map_document(xml).unwrap();
    let map = Map::from_document(&document, &database(), Box::new(RecordingScene::default())).unwrap();

    let origin = map.tile(0, 0).unwrap();
    assert_eq!(origin.surface_height(), 4);
    assert_eq!(origin.ground().data().short_name, "gr");
    assert!(origin.tile_content(0).is_none());
    assert!(origin.horizontal_wall(0).is_some());
    assert_eq!(origin.decorations().count(), 0);

    let tile = map.tile(1, 1).unwrap();
    assert_eq!(tile.ground().road_direction(), RoadDirection::NW);
    let floor = tile.tile_content(0).unwrap().as_floor().unwrap();
    assert_eq!(floor.orientation(), FloorOrientation::Down);

    // Edge tiles keep their heights but never hold content
    let edge = map.tile(3, 3).unwrap();
    assert_eq!(edge.surface_height(), 2);
    assert_eq!(edge.entity_count(), 0);
}

#[test]
fn test_resized_document_loads() {
    let map = furnished_map();
    let document = map.to_document().resized(1, 0, 0, -1).unwrap();
    assert_eq!((document.width, document.height), (6, 3));

    let loaded = Map::from_document(&document, &database(), Box::new(NullScene)).unwrap();
    assert_eq!(loaded.tile(2, 1).unwrap().surface_height(), 12);
    assert!(loaded.tile(2, 1).unwrap().tile_content(0).is_some());
    // The label at (4, 3) moved onto the new top edge and was dropped
    assert!(loaded.tile(5, 3).unwrap().label(0).is_none());
    assert!(loaded
        .to_document()
        .tiles
        .iter()
        .flat_map(|tile| tile.levels.iter())
        .flat_map(|level| level.entities.iter())
        .all(|entity| !matches!(entity, EntityDocument::Label { .. })));
}
