//! Entity slot addressing within a tile
//!
//! Every placeable entity on a tile lives in exactly one slot, addressed by an
//! [`EntityKey`]: the floor index plus the slot type, and for freeform objects
//! the sub-tile position as well.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// The slot type of a keyed tile entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// Floor or roof (they share one slot per floor)
    Floorroof,
    Hwall,
    Vwall,
    Hfence,
    Vfence,
    Hborder,
    Vborder,
    /// Freeform decoration
    Object,
    Label,
}

impl EntityType {
    /// Element name used in the map document
    pub fn serialized_name(&self) -> &'static str {
        match self {
            EntityType::Floorroof => "floor",
            EntityType::Hwall | EntityType::Hfence => "hWall",
            EntityType::Vwall | EntityType::Vfence => "vWall",
            EntityType::Hborder => "hBorder",
            EntityType::Vborder => "vBorder",
            EntityType::Object => "object",
            EntityType::Label => "label",
        }
    }

    /// Wall and fence slots running along the X axis
    pub fn is_horizontal_wall(&self) -> bool {
        matches!(self, EntityType::Hwall | EntityType::Hfence)
    }

    /// Wall and fence slots running along the Y axis
    pub fn is_vertical_wall(&self) -> bool {
        matches!(self, EntityType::Vwall | EntityType::Vfence)
    }
}

/// Address of one entity slot on a tile.
///
/// Two keys are equal when floor and type match, and, for freeform keys, when
/// the sub-tile positions are bit-for-bit equal. Positions are never compared
/// with an epsilon; callers always pass already-rounded values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EntityKey {
    floor: i32,
    entity_type: EntityType,
    sub_position: Option<Vec2>,
}

impl EntityKey {
    /// Key for a tile-anchored slot
    pub fn new(floor: i32, entity_type: EntityType) -> Self {
        Self {
            floor,
            entity_type,
            sub_position: None,
        }
    }

    /// Key for a freeform slot at a sub-tile position in `[0, 4)`
    pub fn freeform(floor: i32, entity_type: EntityType, sub_x: f32, sub_y: f32) -> Self {
        Self {
            floor,
            entity_type,
            sub_position: Some(Vec2::new(sub_x, sub_y)),
        }
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Sub-tile position of a freeform key
    pub fn sub_position(&self) -> Option<Vec2> {
        self.sub_position
    }

    pub fn is_freeform(&self) -> bool {
        self.sub_position.is_some()
    }

    /// Surface floors are `>= 0`, caves are negative
    pub fn is_surface(&self) -> bool {
        self.floor >= 0
    }

    pub fn is_ground_floor(&self) -> bool {
        self.floor == 0
    }

    fn position_bits(&self) -> Option<(u32, u32)> {
        // 0.0 and -0.0 address the same slot
        self.sub_position
            .map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
    }
}

impl PartialEq for EntityKey {
    fn eq(&self, other: &Self) -> bool {
        self.floor == other.floor
            && self.entity_type == other.entity_type
            && self.position_bits() == other.position_bits()
    }
}

impl Eq for EntityKey {}

impl Hash for EntityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.floor.hash(state);
        self.entity_type.hash(state);
        self.position_bits().hash(state);
    }
}

/// Orders by floor, then slot type, then position. Sub-tile positions are
/// never negative, so their bit patterns sort like the values.
impl Ord for EntityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.floor, self.entity_type, self.position_bits()).cmp(&(
            other.floor,
            other.entity_type,
            other.position_bits(),
        ))
    }
}

impl PartialOrd for EntityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_plain_key_equality() {
        assert_eq!(
            EntityKey::new(1, EntityType::Hwall),
            EntityKey::new(1, EntityType::Hwall)
        );
        assert_ne!(
            EntityKey::new(1, EntityType::Hwall),
            EntityKey::new(2, EntityType::Hwall)
        );
        assert_ne!(
            EntityKey::new(1, EntityType::Hwall),
            EntityKey::new(1, EntityType::Hfence)
        );
    }

    #[test]
    fn test_freeform_key_includes_position() {
        let a = EntityKey::freeform(0, EntityType::Object, 1.5, 2.0);
        let b = EntityKey::freeform(0, EntityType::Object, 1.5, 2.0);
        let c = EntityKey::freeform(0, EntityType::Object, 1.5, 2.25);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, EntityKey::new(0, EntityType::Object));

        let mut slots = HashMap::new();
        slots.insert(a, "first");
        slots.insert(c, "second");
        assert_eq!(slots.get(&b), Some(&"first"));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_negative_zero_is_same_slot() {
        let a = EntityKey::freeform(0, EntityType::Object, 0.0, 1.0);
        let b = EntityKey::freeform(0, EntityType::Object, -0.0, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ordering() {
        let mut keys = vec![
            EntityKey::freeform(0, EntityType::Object, 3.0, 0.5),
            EntityKey::new(1, EntityType::Floorroof),
            EntityKey::freeform(0, EntityType::Object, 1.0, 2.0),
            EntityKey::new(0, EntityType::Vwall),
            EntityKey::new(-1, EntityType::Floorroof),
        ];
        keys.sort();
        assert_eq!(keys[0], EntityKey::new(-1, EntityType::Floorroof));
        assert_eq!(keys[1], EntityKey::new(0, EntityType::Vwall));
        assert_eq!(keys[2], EntityKey::freeform(0, EntityType::Object, 1.0, 2.0));
        assert_eq!(keys[3], EntityKey::freeform(0, EntityType::Object, 3.0, 0.5));
        assert_eq!(keys[4], EntityKey::new(1, EntityType::Floorroof));
    }

    #[test]
    fn test_surface_and_ground_floor() {
        assert!(EntityKey::new(0, EntityType::Floorroof).is_surface());
        assert!(EntityKey::new(0, EntityType::Floorroof).is_ground_floor());
        assert!(EntityKey::new(3, EntityType::Floorroof).is_surface());
        assert!(!EntityKey::new(3, EntityType::Floorroof).is_ground_floor());
        assert!(!EntityKey::new(-1, EntityType::Floorroof).is_surface());
    }
}
