//! In-memory stores.
//!
//! Nothing survives the process. Both stores keep their records in ordered
//! maps so iteration (and therefore every query result) is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use dominion_core::{EventStore, Kingdom, KingdomStore, SpawnHistory, StoreError};
use dominion_types::{ChainChoice, ChainId, Event, EventId, KingdomId};

// ---------------------------------------------------------------------------
// Kingdoms
// ---------------------------------------------------------------------------

/// Kingdoms held in a map keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKingdomStore {
    kingdoms: BTreeMap<KingdomId, Kingdom>,
    histories: BTreeMap<KingdomId, SpawnHistory>,
}

impl InMemoryKingdomStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            kingdoms: BTreeMap::new(),
            histories: BTreeMap::new(),
        }
    }

    /// Number of stored kingdoms.
    pub fn len(&self) -> usize {
        self.kingdoms.len()
    }

    /// Whether the store holds no kingdoms.
    pub fn is_empty(&self) -> bool {
        self.kingdoms.is_empty()
    }
}

impl KingdomStore for InMemoryKingdomStore {
    fn find_by_id(&self, id: KingdomId) -> Result<Option<Kingdom>, StoreError> {
        Ok(self.kingdoms.get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Kingdom>, StoreError> {
        Ok(self.kingdoms.values().find(|k| k.name() == name).cloned())
    }

    fn save(&mut self, kingdom: &Kingdom) -> Result<(), StoreError> {
        self.kingdoms.insert(kingdom.id(), kingdom.clone());
        Ok(())
    }

    fn exists(&self, id: KingdomId) -> Result<bool, StoreError> {
        Ok(self.kingdoms.contains_key(&id))
    }

    fn find_spawn_history(&self, id: KingdomId) -> Result<Option<SpawnHistory>, StoreError> {
        Ok(self.histories.get(&id).cloned())
    }

    fn save_spawn_history(
        &mut self,
        id: KingdomId,
        history: &SpawnHistory,
    ) -> Result<(), StoreError> {
        self.histories.insert(id, history.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events plus the per-kingdom state around them.
///
/// An event is active for a kingdom from [`EventStore::activate_for_kingdom`]
/// until [`EventStore::mark_as_processed`]. Re-activating a processed event
/// makes it active again, which is how a chain that spawns a second time
/// reuses its authored events.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    events: BTreeMap<EventId, Event>,
    active: BTreeSet<(KingdomId, EventId)>,
    processed: BTreeSet<(KingdomId, EventId)>,
    chain_choices: BTreeMap<(KingdomId, ChainId), Vec<ChainChoice>>,
}

impl InMemoryEventStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            active: BTreeSet::new(),
            processed: BTreeSet::new(),
            chain_choices: BTreeMap::new(),
        }
    }

    /// Whether `event_id` has been processed for the kingdom.
    pub fn is_processed(&self, event_id: &EventId, kingdom_id: KingdomId) -> bool {
        self.processed.contains(&(kingdom_id, event_id.clone()))
    }

    /// Forget a kingdom's recorded choices for a chain, ready for a new
    /// run of it.
    pub fn clear_chain_choices(&mut self, kingdom_id: KingdomId, chain_id: &ChainId) {
        self.chain_choices.remove(&(kingdom_id, chain_id.clone()));
    }
}

impl EventStore for InMemoryEventStore {
    fn find_active_events(&self, kingdom_id: KingdomId) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .active
            .iter()
            .filter(|(k, _)| *k == kingdom_id)
            .filter_map(|(_, id)| self.events.get(id))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.get(id).cloned())
    }

    fn save(&mut self, event: &Event) -> Result<(), StoreError> {
        self.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    fn mark_as_processed(
        &mut self,
        event_id: &EventId,
        kingdom_id: KingdomId,
    ) -> Result<(), StoreError> {
        let key = (kingdom_id, event_id.clone());
        self.active.remove(&key);
        self.processed.insert(key);
        debug!(kingdom = %kingdom_id, event = %event_id, "event processed");
        Ok(())
    }

    fn activate_for_kingdom(
        &mut self,
        event_id: &EventId,
        kingdom_id: KingdomId,
    ) -> Result<(), StoreError> {
        if !self.events.contains_key(event_id) {
            return Err(StoreError::NotFound {
                entity: "event",
                id: event_id.to_string(),
            });
        }
        let key = (kingdom_id, event_id.clone());
        self.processed.remove(&key);
        self.active.insert(key);
        debug!(kingdom = %kingdom_id, event = %event_id, "event activated");
        Ok(())
    }

    fn find_by_chain_id(&self, chain_id: &ChainId) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .events
            .values()
            .filter(|e| e.chain_id() == Some(chain_id))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.chain.as_ref().map_or(0, |link| link.position));
        Ok(events)
    }

    fn save_chain_choice(
        &mut self,
        kingdom_id: KingdomId,
        chain_id: &ChainId,
        choice: ChainChoice,
    ) -> Result<(), StoreError> {
        self.chain_choices
            .entry((kingdom_id, chain_id.clone()))
            .or_default()
            .push(choice);
        Ok(())
    }

    fn get_chain_choices(
        &self,
        kingdom_id: KingdomId,
        chain_id: &ChainId,
    ) -> Result<Vec<ChainChoice>, StoreError> {
        Ok(self
            .chain_choices
            .get(&(kingdom_id, chain_id.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn is_chain_complete(
        &self,
        kingdom_id: KingdomId,
        chain_id: &ChainId,
    ) -> Result<bool, StoreError> {
        let Some(last) = self
            .events
            .values()
            .find(|e| e.chain_id() == Some(chain_id) && e.is_chain_end())
        else {
            return Ok(false);
        };
        Ok(self
            .chain_choices
            .get(&(kingdom_id, chain_id.clone()))
            .is_some_and(|choices| choices.iter().any(|c| c.event_id == last.id)))
    }
}
