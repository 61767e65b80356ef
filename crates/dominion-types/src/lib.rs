//! Shared type definitions for the Dominion kingdom simulation.
//!
//! This crate is the single source of truth for the value types used across
//! the Dominion workspace. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers (UUID v7 for runtime entities, string
//!   keys for authored events and chains)
//! - [`enums`] -- Closed enumerations (resources, factions, moods, advisors,
//!   event categories)
//! - [`structs`] -- Resource snapshots, events, chain bookkeeping, court

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AdvisorType, ChainPath, CharacterRole, EventSeverity, EventType, FactionType, Mood,
    ResourceType,
};
pub use ids::{AdvisorId, ChainId, CharacterId, EventId, FactionEventId, KingdomId};
pub use structs::{
    Advisor, ChainChoice, ChainContext, ChainLink, ChainReward, Character, ChoiceChainData, Event,
    EventChoice, EventConsequence, FactionEvent, ResourceDelta, ResourceRequirement, Resources,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes one `.ts` file per exported type into `bindings/`
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::KingdomId::export_all();
        let _ = crate::ids::AdvisorId::export_all();
        let _ = crate::ids::CharacterId::export_all();
        let _ = crate::ids::FactionEventId::export_all();
        let _ = crate::ids::EventId::export_all();
        let _ = crate::ids::ChainId::export_all();

        // Enums
        let _ = crate::enums::ResourceType::export_all();
        let _ = crate::enums::FactionType::export_all();
        let _ = crate::enums::Mood::export_all();
        let _ = crate::enums::AdvisorType::export_all();
        let _ = crate::enums::CharacterRole::export_all();
        let _ = crate::enums::EventType::export_all();
        let _ = crate::enums::EventSeverity::export_all();
        let _ = crate::enums::ChainPath::export_all();

        // Structs
        let _ = crate::structs::Resources::export_all();
        let _ = crate::structs::ResourceDelta::export_all();
        let _ = crate::structs::ResourceRequirement::export_all();
        let _ = crate::structs::EventConsequence::export_all();
        let _ = crate::structs::ChoiceChainData::export_all();
        let _ = crate::structs::EventChoice::export_all();
        let _ = crate::structs::ChainLink::export_all();
        let _ = crate::structs::Event::export_all();
        let _ = crate::structs::ChainChoice::export_all();
        let _ = crate::structs::ChainContext::export_all();
        let _ = crate::structs::ChainReward::export_all();
        let _ = crate::structs::Advisor::export_all();
        let _ = crate::structs::Character::export_all();
        let _ = crate::structs::FactionEvent::export_all();
    }
}
