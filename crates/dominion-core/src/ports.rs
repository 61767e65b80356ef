//! Collaborator interfaces the core depends on but does not implement.
//!
//! - [`KingdomStore`] loads and saves kingdoms, plus the chain spawn
//!   history kept alongside each one.
//! - [`EventStore`] tracks which events are active or processed per
//!   kingdom, and records chain choices.
//! - [`ConfigProvider`] supplies the tuning tables.
//!
//! Reference implementations live in the `dominion-store` crate. The traits
//! are synchronous: every call runs inside the caller's load-mutate-save
//! cycle for one kingdom.

use dominion_types::{ChainChoice, ChainId, Event, EventId, KingdomId};

use crate::config::{ConfigError, GameTuning};
use crate::kingdom::Kingdom;
use crate::manager::SpawnHistory;

/// Errors raised by collaborator implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A stored document could not be encoded or decoded.
    #[error("failed to (de)serialize stored document: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The configuration source could not be loaded.
    #[error("failed to load configuration: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// An operation referred to a record that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },
}

/// Persistence for kingdoms.
///
/// Implementations must round-trip every kingdom field, including the full
/// per-resource stock.
pub trait KingdomStore {
    /// Load a kingdom by id.
    fn find_by_id(&self, id: KingdomId) -> Result<Option<Kingdom>, StoreError>;

    /// Load a kingdom by name.
    fn find_by_name(&self, name: &str) -> Result<Option<Kingdom>, StoreError>;

    /// Insert or replace a kingdom.
    fn save(&mut self, kingdom: &Kingdom) -> Result<(), StoreError>;

    /// Whether a kingdom with this id is stored.
    fn exists(&self, id: KingdomId) -> Result<bool, StoreError>;

    /// The chain spawn history saved for a kingdom, if any.
    fn find_spawn_history(&self, id: KingdomId) -> Result<Option<SpawnHistory>, StoreError>;

    /// Insert or replace a kingdom's chain spawn history.
    fn save_spawn_history(
        &mut self,
        id: KingdomId,
        history: &SpawnHistory,
    ) -> Result<(), StoreError>;
}

/// Persistence for events and per-kingdom event state.
pub trait EventStore {
    /// Events activated for the kingdom and not yet processed.
    fn find_active_events(&self, kingdom_id: KingdomId) -> Result<Vec<Event>, StoreError>;

    /// Load an event by id.
    fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, StoreError>;

    /// Insert or replace an event.
    fn save(&mut self, event: &Event) -> Result<(), StoreError>;

    /// Mark an event as handled for a kingdom.
    fn mark_as_processed(&mut self, event_id: &EventId, kingdom_id: KingdomId)
    -> Result<(), StoreError>;

    /// Make a stored event active for a kingdom.
    fn activate_for_kingdom(
        &mut self,
        event_id: &EventId,
        kingdom_id: KingdomId,
    ) -> Result<(), StoreError>;

    /// Every event of a chain, sorted by position.
    fn find_by_chain_id(&self, chain_id: &ChainId) -> Result<Vec<Event>, StoreError>;

    /// Append a choice to a kingdom's history for a chain.
    fn save_chain_choice(
        &mut self,
        kingdom_id: KingdomId,
        chain_id: &ChainId,
        choice: ChainChoice,
    ) -> Result<(), StoreError>;

    /// A kingdom's recorded choices for a chain, in order.
    fn get_chain_choices(
        &self,
        kingdom_id: KingdomId,
        chain_id: &ChainId,
    ) -> Result<Vec<ChainChoice>, StoreError>;

    /// Whether the kingdom has chosen on the chain's final event.
    fn is_chain_complete(&self, kingdom_id: KingdomId, chain_id: &ChainId)
    -> Result<bool, StoreError>;
}

/// Source of the tuning tables.
///
/// Tables may change at runtime behind the provider; callers that want a
/// stable view wrap it in a cache with a freshness window.
pub trait ConfigProvider {
    /// The current tuning.
    fn tuning(&self) -> Result<GameTuning, StoreError>;
}
