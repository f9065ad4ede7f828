//! Placement operations on [`Map`]: every slot edit is checked for a real
//! change, then recorded as one [`EntityChangeCommand`].

use super::commands::{EntityChangeCommand, SlotSwap};
use crate::constants::{is_valid_floor, SUB_TILE_EXTENT};
use crate::data::{DecorationData, FloorData, RoofData, WallData};
use crate::entity::{
    Decoration, EntityId, EntityKind, Floor, FloorOrientation, Label, Roof, RoofShape, TileEntity, Wall,
    WallOrientation,
};
use crate::error::MapError;
use crate::key::{EntityKey, EntityType};
use crate::map::Map;
use glam::Vec2;
use std::sync::Arc;

impl Map {
    fn check_placement(&self, x: i32, y: i32, floor: i32) -> Result<(), MapError> {
        if !is_valid_floor(floor) {
            return Err(MapError::FloorOutOfRange(floor));
        }
        self.state.check_buildable(x, y)
    }

    fn occupant(&self, x: i32, y: i32, key: &EntityKey) -> Option<&TileEntity> {
        self.state.tile(x, y).and_then(|tile| tile.entity(key))
    }

    /// Record one command replacing the given slots. Returns the id of the
    /// first entity placed.
    fn replace_slots(&mut self, x: i32, y: i32, changes: Vec<(EntityKey, Option<TileEntity>)>) -> Option<EntityId> {
        if changes.is_empty() {
            return None;
        }
        let placed = changes
            .iter()
            .find_map(|(_, entity)| entity.as_ref().map(TileEntity::id));
        let swaps = changes
            .into_iter()
            .map(|(key, incoming)| {
                let occupant = self.occupant(x, y, &key).map(TileEntity::id);
                SlotSwap::new(key, occupant, incoming)
            })
            .collect();
        self.execute(Box::new(EntityChangeCommand::new(x, y, swaps)));
        placed
    }

    /// Place, replace or (with `None`) clear the floor on `floor`.
    /// Returns the placed entity, `None` when clearing or nothing changed.
    pub fn set_floor(
        &mut self,
        x: i32,
        y: i32,
        data: Option<Arc<FloorData>>,
        orientation: FloorOrientation,
        floor: i32,
    ) -> Result<Option<EntityId>, MapError> {
        self.check_placement(x, y, floor)?;
        let key = EntityKey::new(floor, EntityType::Floorroof);
        let current = self.occupant(x, y, &key);

        let Some(data) = data else {
            if current.is_some() {
                self.replace_slots(x, y, vec![(key, None)]);
            }
            return Ok(None);
        };

        let unchanged = current
            .and_then(TileEntity::as_floor)
            .is_some_and(|f| f.data.short_name == data.short_name && f.orientation == orientation);
        if unchanged {
            return Ok(None);
        }

        let entity = self
            .state
            .create_entity(&key, EntityKind::Floor(Floor { data, orientation }));
        Ok(self.replace_slots(x, y, vec![(key, Some(entity))]))
    }

    /// Place, replace or clear the roof on `floor`. Roofs exist on surface
    /// floors only.
    pub fn set_roof(
        &mut self,
        x: i32,
        y: i32,
        data: Option<Arc<RoofData>>,
        floor: i32,
    ) -> Result<Option<EntityId>, MapError> {
        if floor < 0 {
            return Err(MapError::FloorOutOfRange(floor));
        }
        self.check_placement(x, y, floor)?;
        let key = EntityKey::new(floor, EntityType::Floorroof);
        let current = self.occupant(x, y, &key);

        let Some(data) = data else {
            if current.is_some() {
                self.replace_slots(x, y, vec![(key, None)]);
            }
            return Ok(None);
        };

        let unchanged = current
            .and_then(TileEntity::as_roof)
            .is_some_and(|roof| roof.data.short_name == data.short_name);
        if unchanged {
            return Ok(None);
        }

        let roof = Roof {
            data,
            level: 0,
            shape: RoofShape::Flat,
            rotation: 0.0,
        };
        let entity = self.state.create_entity(&key, EntityKind::Roof(roof));
        Ok(self.replace_slots(x, y, vec![(key, Some(entity))]))
    }

    /// Wall on the west edge of the tile, running along Y
    pub fn set_vertical_wall(
        &mut self,
        x: i32,
        y: i32,
        data: Option<Arc<WallData>>,
        reversed: bool,
        floor: i32,
    ) -> Result<Option<EntityId>, MapError> {
        self.set_wall(x, y, data, reversed, floor, WallOrientation::Vertical)
    }

    /// Wall on the south edge of the tile, running along X
    pub fn set_horizontal_wall(
        &mut self,
        x: i32,
        y: i32,
        data: Option<Arc<WallData>>,
        reversed: bool,
        floor: i32,
    ) -> Result<Option<EntityId>, MapError> {
        self.set_wall(x, y, data, reversed, floor, WallOrientation::Horizontal)
    }

    fn set_wall(
        &mut self,
        x: i32,
        y: i32,
        data: Option<Arc<WallData>>,
        reversed: bool,
        floor: i32,
        orientation: WallOrientation,
    ) -> Result<Option<EntityId>, MapError> {
        self.check_placement(x, y, floor)?;
        let (wall_type, fence_type) = match orientation {
            WallOrientation::Vertical => (EntityType::Vwall, EntityType::Vfence),
            WallOrientation::Horizontal => (EntityType::Hwall, EntityType::Hfence),
        };
        let wall_key = EntityKey::new(floor, wall_type);
        let fence_key = EntityKey::new(floor, fence_type);
        let current_wall = self.occupant(x, y, &wall_key).and_then(TileEntity::as_wall);
        let current_fence = self.occupant(x, y, &fence_key).and_then(TileEntity::as_wall);

        let Some(data) = data else {
            let key = if current_wall.is_some() {
                wall_key
            } else if current_fence.is_some() {
                fence_key
            } else {
                return Ok(None);
            };
            self.replace_slots(x, y, vec![(key, None)]);
            return Ok(None);
        };

        let same = |wall: &Wall| wall.data.short_name == data.short_name && wall.reversed == reversed;
        let mut changes = Vec::new();
        let key = if data.arch_buildable {
            // Fences only stand under arches; a solid wall has to go
            if current_wall.is_some_and(|wall| !wall.data.arch) {
                changes.push((wall_key, None));
            }
            if current_fence.is_some_and(same) {
                None
            } else {
                Some(fence_key)
            }
        } else {
            if !data.arch && current_fence.is_some() {
                changes.push((fence_key, None));
            }
            if current_wall.is_some_and(same) {
                None
            } else {
                Some(wall_key)
            }
        };

        if let Some(key) = key {
            let wall = Wall {
                slope_difference: self.state.slope_difference(x, y, &key),
                data,
                reversed,
                orientation,
                ground_floor: floor == 0,
            };
            let entity = self.state.create_entity(&key, EntityKind::Wall(wall));
            changes.insert(0, (key, Some(entity)));
        }
        Ok(self.replace_slots(x, y, changes))
    }

    /// Place, replace or clear a freeform decoration at a sub-tile
    /// `position` in `[0, 4)`
    pub fn set_decoration(
        &mut self,
        x: i32,
        y: i32,
        data: Option<Arc<DecorationData>>,
        position: Vec2,
        rotation: f32,
        floor: i32,
    ) -> Result<Option<EntityId>, MapError> {
        self.check_placement(x, y, floor)?;
        let in_tile = |v: f32| (0.0..SUB_TILE_EXTENT).contains(&v);
        if !in_tile(position.x) || !in_tile(position.y) {
            tracing::warn!(
                "Rejected decoration at ({}, {}) on tile ({}, {})",
                position.x,
                position.y,
                x,
                y
            );
            return Err(MapError::SubPositionOutOfRange {
                x: position.x,
                y: position.y,
            });
        }

        let Some(data) = data else {
            let key = EntityKey::freeform(floor, EntityType::Object, position.x, position.y);
            if self.occupant(x, y, &key).is_some() {
                self.replace_slots(x, y, vec![(key, None)]);
            }
            return Ok(None);
        };

        let position = data.anchored_position(position);
        let key = EntityKey::freeform(floor, EntityType::Object, position.x, position.y);
        let current = self.occupant(x, y, &key);
        let unchanged = current
            .and_then(TileEntity::as_decoration)
            .is_some_and(|d| d.data.short_name == data.short_name && d.rotation == rotation);
        if unchanged {
            return Ok(None);
        }

        let decoration = Decoration {
            data,
            position,
            rotation,
        };
        let entity = self
            .state
            .create_entity(&key, EntityKind::Decoration(decoration));
        Ok(self.replace_slots(x, y, vec![(key, Some(entity))]))
    }

    pub fn set_label(&mut self, x: i32, y: i32, label: Option<Label>, floor: i32) -> Result<Option<EntityId>, MapError> {
        self.check_placement(x, y, floor)?;
        let key = EntityKey::new(floor, EntityType::Label);
        let current = self.occupant(x, y, &key).and_then(TileEntity::as_label);
        if current == label.as_ref() {
            return Ok(None);
        }

        let entity = label.map(|label| self.state.create_entity(&key, EntityKind::Label(label)));
        Ok(self.replace_slots(x, y, vec![(key, entity)]))
    }

    /// Make tile `(dst_x, dst_y)` a copy of `(src_x, src_y)`: heights,
    /// ground, cave and every slot. Copied entities are new entities.
    pub fn paste_tile(&mut self, src_x: i32, src_y: i32, dst_x: i32, dst_y: i32) -> Result<(), MapError> {
        self.state.checked_tile(src_x, src_y)?;
        self.state.check_buildable(dst_x, dst_y)?;
        if (src_x, src_y) == (dst_x, dst_y) {
            return Ok(());
        }

        let source = self.state.checked_tile(src_x, src_y)?.clone();
        self.set_surface_height(dst_x, dst_y, source.surface_height())?;
        self.set_cave_height(dst_x, dst_y, source.cave_height())?;
        self.set_cave_size(dst_x, dst_y, source.cave_size())?;
        self.paint_ground(
            dst_x,
            dst_y,
            source.ground().data().clone(),
            source.ground().road_direction(),
        )?;
        self.set_cave_data(dst_x, dst_y, source.cave().data().clone())?;

        let mut changes: Vec<(EntityKey, Option<TileEntity>)> = self
            .state
            .checked_tile(dst_x, dst_y)?
            .sorted_entities()
            .into_iter()
            .filter(|(key, _)| source.entity(key).is_none())
            .map(|(key, _)| (*key, None))
            .collect();

        for (key, entity) in source.sorted_entities() {
            let mut kind = entity.kind.clone();
            if let EntityKind::Wall(wall) = &mut kind {
                wall.slope_difference = self.state.slope_difference(dst_x, dst_y, key);
            }
            changes.push((*key, Some(self.state.create_entity(key, kind))));
        }

        self.replace_slots(dst_x, dst_y, changes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_database;

    #[test]
    fn test_same_floor_twice_is_one_action() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        let planks = database.floor("pl").unwrap();

        let first = map.set_floor(1, 1, Some(planks.clone()), FloorOrientation::Up, 0).unwrap();
        assert!(first.is_some());
        let second = map.set_floor(1, 1, Some(planks), FloorOrientation::Up, 0).unwrap();
        assert!(second.is_none());
        map.finish_action();
        assert_eq!(map.undo_len(), 1);
        assert_eq!(map.tile(1, 1).unwrap().tile_content(0).unwrap().id(), first.unwrap());
    }

    #[test]
    fn test_replace_then_undo_restores_previous_entity() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        let planks = database.floor("pl").unwrap();

        let first = map.set_floor(0, 0, Some(planks.clone()), FloorOrientation::Up, 1).unwrap().unwrap();
        map.finish_action();
        let second = map.set_floor(0, 0, Some(planks), FloorOrientation::Left, 1).unwrap().unwrap();
        map.finish_action();
        assert_ne!(first, second);

        map.undo();
        let tile = map.tile(0, 0).unwrap();
        assert_eq!(tile.tile_content(1).unwrap().id(), first);
        assert_eq!(tile.tile_content(1).unwrap().as_floor().unwrap().orientation(), FloorOrientation::Up);

        map.redo();
        assert_eq!(map.tile(0, 0).unwrap().tile_content(1).unwrap().id(), second);
    }

    #[test]
    fn test_clear_floor() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        map.set_floor(2, 1, database.floor("pl"), FloorOrientation::Down, 0).unwrap();
        map.finish_action();

        assert_eq!(map.set_floor(2, 1, None, FloorOrientation::Down, 0).unwrap(), None);
        assert!(map.tile(2, 1).unwrap().tile_content(0).is_none());
        assert_eq!(map.undo_len(), 2);

        // Clearing an empty slot records nothing
        map.finish_action();
        map.set_floor(2, 1, None, FloorOrientation::Down, 0).unwrap();
        assert_eq!(map.undo_len(), 2);
    }

    #[test]
    fn test_roof_replaces_floor_in_shared_slot() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        map.set_floor(1, 1, database.floor("pl"), FloorOrientation::Down, 2).unwrap();
        map.set_roof(1, 1, database.roof("th"), 2).unwrap();
        let content = map.tile(1, 1).unwrap().tile_content(2).unwrap();
        assert!(content.as_roof().is_some());
        assert_eq!(map.set_roof(1, 1, database.roof("th"), -1), Err(MapError::FloorOutOfRange(-1)));
    }

    #[test]
    fn test_fence_replaces_solid_wall() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        map.set_vertical_wall(1, 1, database.wall("ww"), false, 0).unwrap();
        map.finish_action();

        map.set_vertical_wall(1, 1, database.wall("af"), false, 0).unwrap();
        map.finish_action();
        let tile = map.tile(1, 1).unwrap();
        assert!(tile.vertical_wall(0).is_none());
        assert_eq!(tile.vertical_fence(0).unwrap().data().short_name, "af");

        map.undo();
        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.vertical_wall(0).unwrap().data().short_name, "ww");
        assert!(tile.vertical_fence(0).is_none());
    }

    #[test]
    fn test_fence_stands_under_arch() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        map.set_horizontal_wall(1, 1, database.wall("aw"), false, 0).unwrap();
        map.set_horizontal_wall(1, 1, database.wall("af"), true, 0).unwrap();
        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.horizontal_wall(0).unwrap().data().short_name, "aw");
        assert!(tile.horizontal_fence(0).unwrap().reversed());

        // Solid wall over the fence clears it
        map.set_horizontal_wall(1, 1, database.wall("ww"), false, 0).unwrap();
        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.horizontal_wall(0).unwrap().data().short_name, "ww");
        assert!(tile.horizontal_fence(0).is_none());

        // Clearing removes the wall first, then the fence
        map.set_horizontal_wall(1, 1, None, false, 0).unwrap();
        assert!(map.tile(1, 1).unwrap().horizontal_wall(0).is_none());
    }

    #[test]
    fn test_reversed_wall_is_a_change() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        map.set_vertical_wall(0, 0, database.wall("ww"), false, 0).unwrap();
        assert!(map.set_vertical_wall(0, 0, database.wall("ww"), false, 0).unwrap().is_none());
        assert!(map.set_vertical_wall(0, 0, database.wall("ww"), true, 0).unwrap().is_some());
    }

    #[test]
    fn test_wall_slope_against_edge_tile() {
        let database = sample_database();
        let mut map = Map::new(2, 2, &database).unwrap();
        map.set_surface_height(1, 1, 10).unwrap();
        map.set_horizontal_wall(1, 1, database.wall("ww"), false, 0).unwrap();
        map.set_vertical_wall(1, 1, database.wall("ww"), false, 0).unwrap();
        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.horizontal_wall(0).unwrap().slope_difference(), 10);
        assert_eq!(tile.vertical_wall(0).unwrap().slope_difference(), 10);
        assert!(tile.horizontal_wall(0).unwrap().model_reference().0.contains("bottom"));
    }

    #[test]
    fn test_decorations_by_position() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        let barrel = database.decoration("barrel");

        map.set_decoration(1, 1, barrel.clone(), Vec2::new(2.0, 2.0), 0.0, 0).unwrap();
        map.set_decoration(1, 1, barrel.clone(), Vec2::new(0.5, 3.5), 45.0, 0).unwrap();
        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.decorations().count(), 2);
        assert_eq!(tile.central_decoration(0).unwrap().data().short_name, "barrel");

        assert_eq!(
            map.set_decoration(1, 1, barrel, Vec2::new(4.0, 1.0), 0.0, 0),
            Err(MapError::SubPositionOutOfRange { x: 4.0, y: 1.0 })
        );
    }

    #[test]
    fn test_anchored_decorations_snap_to_their_slot() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();

        let token = map
            .set_decoration(1, 1, database.decoration("token"), Vec2::new(0.5, 3.0), 0.0, 0)
            .unwrap()
            .unwrap();
        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.central_decoration(0).unwrap().data().short_name, "token");
        assert_eq!(tile.find_type_of_entity(token), Ok(EntityType::Object));

        map.set_decoration(1, 1, database.decoration("lamp"), Vec2::new(3.5, 1.5), 0.0, 0)
            .unwrap();
        let lamp = map
            .tile(1, 1)
            .unwrap()
            .decorations()
            .map(|(_, decoration)| decoration)
            .find(|decoration| decoration.data().short_name == "lamp")
            .unwrap();
        assert_eq!(lamp.position(), Vec2::ZERO);

        // Same anchored slot again is no change
        assert!(map
            .set_decoration(1, 1, database.decoration("token"), Vec2::new(1.0, 1.0), 0.0, 0)
            .unwrap()
            .is_none());
        assert_eq!(map.tile(1, 1).unwrap().decorations().count(), 2);
    }

    #[test]
    fn test_floating_decoration_stays_on_water() {
        struct Lakebed;
        impl crate::scene::SceneBackend for Lakebed {
            fn probe_ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
                Some(-2.0)
            }
        }

        let database = sample_database();
        let mut map = Map::with_scene(3, 3, &database, Box::new(Lakebed)).unwrap();
        let raft = map
            .set_decoration(1, 1, database.decoration("raft"), Vec2::new(1.0, 1.0), 0.0, 0)
            .unwrap()
            .unwrap();
        let barrel = map
            .set_decoration(1, 1, database.decoration("barrel"), Vec2::new(3.0, 3.0), 0.0, 0)
            .unwrap()
            .unwrap();

        let tile = map.tile(1, 1).unwrap();
        let height_of = |id| {
            tile.entities()
                .find(|(_, entity)| entity.id() == id)
                .map(|(_, entity)| entity.position().y)
                .unwrap()
        };
        assert_eq!(height_of(raft), 0.0);
        assert_eq!(height_of(barrel), -2.0);
    }

    #[test]
    fn test_label() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        let label = Label {
            text: "Smithy".to_string(),
            color: [1.0, 0.5, 0.0],
        };
        assert!(map.set_label(0, 2, Some(label.clone()), 0).unwrap().is_some());
        assert!(map.set_label(0, 2, Some(label.clone()), 0).unwrap().is_none());
        assert_eq!(map.tile(0, 2).unwrap().label(0), Some(&label));
        assert!(map.tile(0, 2).unwrap().entity(&EntityKey::new(0, EntityType::Label)).unwrap().model().is_none());
    }

    #[test]
    fn test_placement_preconditions() {
        let database = sample_database();
        let mut map = Map::new(3, 3, &database).unwrap();
        let planks = database.floor("pl");
        assert_eq!(
            map.set_floor(3, 1, planks.clone(), FloorOrientation::Down, 0),
            Err(MapError::EdgeTile { x: 3, y: 1 })
        );
        assert_eq!(
            map.set_floor(1, 1, planks.clone(), FloorOrientation::Down, 16),
            Err(MapError::FloorOutOfRange(16))
        );
        assert_eq!(
            map.set_floor(-1, 1, planks, FloorOrientation::Down, 0),
            Err(MapError::TileOutOfBounds { x: -1, y: 1 })
        );
        assert!(!map.can_undo());
    }

    #[test]
    fn test_paste_tile_makes_exact_copy() {
        let database = sample_database();
        let mut map = Map::new(4, 4, &database).unwrap();
        map.set_surface_height(0, 0, 12).unwrap();
        map.set_floor(0, 0, database.floor("pl"), FloorOrientation::Right, 0).unwrap();
        map.set_vertical_wall(0, 0, database.wall("ww"), true, 1).unwrap();
        map.set_roof(2, 2, database.roof("th"), 3).unwrap();
        map.finish_action();

        map.paste_tile(0, 0, 2, 2).unwrap();
        map.finish_action();

        let source = map.tile(0, 0).unwrap();
        let copy = map.tile(2, 2).unwrap();
        assert_eq!(copy.surface_height(), 12);
        assert_eq!(copy.entity_count(), source.entity_count());
        assert!(copy.tile_content(3).is_none());
        assert_eq!(copy.tile_content(0).unwrap().as_floor().unwrap().orientation(), FloorOrientation::Right);
        assert!(copy.vertical_wall(1).unwrap().reversed());
        assert_ne!(copy.tile_content(0).unwrap().id(), source.tile_content(0).unwrap().id());

        map.undo();
        let restored = map.tile(2, 2).unwrap();
        assert_eq!(restored.surface_height(), 0);
        assert!(restored.tile_content(3).unwrap().as_roof().is_some());
        assert_eq!(restored.entity_count(), 1);
    }
}
