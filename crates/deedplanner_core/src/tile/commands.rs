//! Slot replacement command
//!
//! An [`EntityChangeCommand`] swaps entities between a tile's slots and its
//! own stash. After `execute` the stash holds what was replaced; after `undo`
//! it holds what was introduced. Either way the stash is exactly what the
//! history would need to restore, so both disposal hooks release it.

use crate::command::ReversibleCommand;
use crate::entity::{EntityId, TileEntity};
use crate::key::{EntityKey, EntityType};
use crate::map::{LayerFilter, MapState};

/// One slot touched by a command
pub(crate) struct SlotSwap {
    pub key: EntityKey,
    /// Id of the entity the slot must hold when this swap is replayed
    pub occupant: Option<EntityId>,
    /// Entity waiting to go into the slot
    pub stash: Option<TileEntity>,
}

impl SlotSwap {
    pub fn new(key: EntityKey, occupant: Option<EntityId>, incoming: Option<TileEntity>) -> Self {
        Self {
            key,
            occupant,
            stash: incoming,
        }
    }

    fn apply(&mut self, state: &mut MapState, x: i32, y: i32) {
        let incoming_id = self.stash.as_ref().map(TileEntity::id);
        let outgoing = state.swap_slot(x, y, &self.key, self.stash.take());
        assert_eq!(
            outgoing.as_ref().map(TileEntity::id),
            self.occupant,
            "slot {:?} on ({}, {}) holds an unexpected entity",
            self.key,
            x,
            y
        );
        self.occupant = incoming_id;
        self.stash = outgoing;
    }
}

/// Replaces the occupants of one or more slots of a single tile
pub(crate) struct EntityChangeCommand {
    x: i32,
    y: i32,
    swaps: Vec<SlotSwap>,
}

impl EntityChangeCommand {
    pub fn new(x: i32, y: i32, swaps: Vec<SlotSwap>) -> Self {
        Self { x, y, swaps }
    }

    fn refresh(&self, state: &mut MapState) {
        let mut filters: Vec<LayerFilter> = self
            .swaps
            .iter()
            .map(|swap| LayerFilter::for_floor(swap.key.floor()))
            .collect();
        filters.sort_by_key(|filter| *filter == LayerFilter::Cave);
        filters.dedup();
        for filter in filters {
            state.update_entity_positions(self.x, self.y, filter);
        }

        for swap in &self.swaps {
            state.update_entity_rendering(self.x, self.y, &swap.key);
        }
        if self
            .swaps
            .iter()
            .any(|swap| swap.key.entity_type() == EntityType::Floorroof)
        {
            state.recalculate_roofs();
        }
    }

    fn release_stash(&mut self, state: &mut MapState) {
        for swap in &mut self.swaps {
            if let Some(entity) = swap.stash.take() {
                state.release_entity(entity);
            }
        }
    }
}

impl ReversibleCommand<MapState> for EntityChangeCommand {
    fn execute(&mut self, state: &mut MapState) {
        for swap in self.swaps.iter_mut() {
            swap.apply(state, self.x, self.y);
        }
        self.refresh(state);
    }

    fn undo(&mut self, state: &mut MapState) {
        for swap in self.swaps.iter_mut().rev() {
            swap.apply(state, self.x, self.y);
        }
        self.refresh(state);
    }

    fn dispose_undo(&mut self, state: &mut MapState) {
        self.release_stash(state);
    }

    fn dispose_redo(&mut self, state: &mut MapState) {
        self.release_stash(state);
    }

    fn description(&self) -> &str {
        "Change tile entity"
    }
}
