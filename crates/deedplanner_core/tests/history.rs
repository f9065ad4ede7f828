mod common;

use common::{database, RecordingScene};
use deedplanner_core::{FloorOrientation, Map, MapDocument, RoadDirection};
use glam::Vec2;

fn random_edit(map: &mut Map, rng: &mut fastrand::Rng) {
    let database = database();
    let x = rng.i32(0..map.width());
    let y = rng.i32(0..map.height());
    let floor = rng.i32(0..3);
    match rng.u8(0..7) {
        0 => map.set_surface_height(x, y, rng.i32(-40..40)).unwrap(),
        1 => {
            let ground = if rng.bool() { "di" } else { "sr" };
            map.paint_ground(x, y, database.ground(ground).unwrap(), RoadDirection::NE)
                .unwrap();
        }
        2 => {
            let data = if rng.bool() { database.floor("pl") } else { None };
            map.set_floor(x, y, data, FloorOrientation::Left, floor).unwrap();
        }
        3 => {
            let wall = ["sw", "sa", "if"][rng.usize(0..3)];
            map.set_horizontal_wall(x, y, database.wall(wall), rng.bool(), floor)
                .unwrap();
        }
        4 => {
            map.set_vertical_wall(x, y, database.wall("sw"), false, floor).unwrap();
        }
        5 => {
            let position = Vec2::new(rng.u8(0..4) as f32, rng.u8(0..4) as f32);
            map.set_decoration(x, y, database.decoration("barrel"), position, 90.0, floor)
                .unwrap();
        }
        _ => {
            map.set_roof(x, y, database.roof("sl"), floor + 1).unwrap();
        }
    }
    map.finish_action();
}

fn snapshot(map: &Map) -> (MapDocument, i32, i32) {
    (
        map.to_document(),
        map.highest_surface_height(),
        map.lowest_surface_height(),
    )
}

#[test]
fn test_undo_all_restores_initial_state() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut map = Map::new(6, 6, &database()).unwrap();
    let initial = snapshot(&map);

    for _ in 0..60 {
        random_edit(&mut map, &mut rng);
    }
    while map.undo() {}

    assert_eq!(snapshot(&map), initial);
    assert!(map.tiles().all(|tile| tile.entity_count() == 0));
}

#[test]
fn test_undo_redo_is_noop() {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut map = Map::new(5, 5, &database()).unwrap();

    for _ in 0..40 {
        random_edit(&mut map, &mut rng);
        if !map.can_undo() {
            continue;
        }
        let before = snapshot(&map);
        assert!(map.undo());
        assert!(map.redo());
        assert_eq!(snapshot(&map), before);
    }
}

#[test]
fn test_same_floor_twice_is_one_entry() {
    let database = database();
    let mut map = Map::new(4, 4, &database).unwrap();

    assert!(map
        .set_floor(1, 1, database.floor("pl"), FloorOrientation::Up, 0)
        .unwrap()
        .is_some());
    map.finish_action();
    assert!(map
        .set_floor(1, 1, database.floor("pl"), FloorOrientation::Up, 0)
        .unwrap()
        .is_none());
    map.finish_action();

    assert_eq!(map.undo_len(), 1);
}

#[test]
fn test_raise_corner_scenario() {
    let mut map = Map::new(5, 5, &database()).unwrap();
    let before = map.highest_surface_height();
    assert_eq!(before, 0);

    map.set_surface_height(2, 2, 5).unwrap();
    assert_eq!(map.highest_surface_height(), 5);

    map.undo();
    assert_eq!(map.highest_surface_height(), before);
}

#[test]
fn test_flood_fill_is_one_action() {
    let database = database();
    let mut map = Map::new(4, 4, &database).unwrap();

    let changed = map.flood_fill_ground(0, 0, database.ground("di").unwrap()).unwrap();
    map.finish_action();
    assert_eq!(changed, 16);
    assert_eq!(map.undo_len(), 1);
    let dirt = map
        .tiles()
        .filter(|tile| tile.ground().data().short_name == "di")
        .count();
    assert_eq!(dirt, 16);

    assert!(map.undo());
    assert!(map
        .tiles()
        .all(|tile| tile.ground().data().short_name == "gr"));
}

#[test]
fn test_replaced_entities_destroyed_exactly_once() {
    let database = database();
    let scene = RecordingScene::default();
    let log = scene.log.clone();
    let mut map = Map::with_scene(4, 4, &database, Box::new(scene)).unwrap();

    let first = map
        .set_floor(1, 1, database.floor("pl"), FloorOrientation::Down, 0)
        .unwrap()
        .unwrap();
    map.finish_action();
    map.set_floor(1, 1, database.floor("ss"), FloorOrientation::Down, 0)
        .unwrap();
    map.finish_action();
    let handles = log.borrow().spawned.clone();
    assert_eq!(handles.len(), 2);

    // Undo leaves "ss" only in the redo branch
    map.undo();
    assert!(log.borrow().destroyed.is_empty());
    let first_tile = map.tile(1, 1).unwrap();
    assert!(first_tile.contains_entity(first));

    // A new edit prunes the redo branch
    map.set_floor(1, 1, None, FloorOrientation::Down, 0).unwrap();
    map.finish_action();
    assert_eq!(log.borrow().destroyed, vec![handles[1]]);

    // Clearing the history releases the floor held only by the cleared command
    map.clear_history();
    assert_eq!(log.borrow().destroy_count(handles[0]), 1);
    assert_eq!(log.borrow().destroy_count(handles[1]), 1);
    assert!(map.models().is_empty());

    map.clear_history();
    assert_eq!(log.borrow().destroyed.len(), 2);
}

#[test]
fn test_history_limit_releases_evicted_actions() {
    let database = database();
    let scene = RecordingScene::default();
    let log = scene.log.clone();
    let mut map = Map::with_scene(4, 4, &database, Box::new(scene)).unwrap();
    map.set_history_limit(Some(2));

    for floor in ["pl", "ss", "pl", "ss"] {
        map.set_floor(2, 2, database.floor(floor), FloorOrientation::Down, 0)
            .unwrap();
        map.finish_action();
    }

    assert_eq!(map.undo_len(), 2);
    let log = log.borrow();
    assert_eq!(log.spawned.len(), 4);
    // The first evicted action placed into an empty slot and holds nothing;
    // the second releases the floor it replaced
    assert_eq!(log.destroyed, vec![log.spawned[0]]);
    assert_eq!(map.models().len(), 3);
}

#[test]
fn test_loaded_entities_become_visible() {
    let database = database();
    let scene = RecordingScene::default();
    let log = scene.log.clone();
    let mut map = Map::with_scene(3, 3, &database, Box::new(scene)).unwrap();

    map.set_floor(0, 0, database.floor("pl"), FloorOrientation::Down, 0)
        .unwrap();
    map.set_vertical_wall(1, 0, database.wall("sw"), false, 0).unwrap();
    assert_eq!(log.borrow().visible_models(), 2);

    map.undo();
    assert_eq!(log.borrow().visible_models(), 0);
}
