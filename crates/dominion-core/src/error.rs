//! Error types for the `dominion-core` crate.
//!
//! These are the hard failures: they indicate a programming or configuration
//! mistake rather than a player decision. Expected, player-facing refusals
//! (not enough gold, prestige not yet earned) are modelled as outcome enums
//! in the owning service instead.

use dominion_types::EventId;

/// Errors raised by the simulation core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A faction identifier did not name one of the five canonical kinds.
    #[error("unknown faction: {name}")]
    UnknownFaction {
        /// The identifier that failed to parse.
        name: String,
    },

    /// A resource identifier did not name a tracked resource.
    #[error("unknown resource: {name}")]
    UnknownResource {
        /// The identifier that failed to parse.
        name: String,
    },

    /// An advisor identifier did not name an advisor office.
    #[error("unknown advisor type: {name}")]
    UnknownAdvisor {
        /// The identifier that failed to parse.
        name: String,
    },

    /// A chain was built from fewer than two events.
    #[error("an event chain needs at least 2 events, got {count}")]
    ChainTooShort {
        /// Number of events supplied.
        count: usize,
    },

    /// A choice id did not match any choice on the event.
    #[error("event {event} has no choice '{choice}'")]
    UnknownChoice {
        /// The event that was resolved.
        event: EventId,
        /// The choice id that was not found.
        choice: String,
    },
}
