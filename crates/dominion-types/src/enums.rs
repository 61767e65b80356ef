//! Enumeration types for the Dominion simulation.
//!
//! Every category of "kind" in the game (resources, factions, moods,
//! advisors, events) is a closed enum so that adding a variant forces every
//! `match` in the workspace to be revisited.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A tracked resource in the kingdom's authoritative stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceType {
    /// Coin in the royal treasury.
    Gold,
    /// Political capital at court.
    Influence,
    /// Religious devotion of the realm.
    Faith,
    /// Accumulated learning and records.
    Knowledge,
    /// Loyalty of the subjects to the crown.
    Loyalty,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Gold,
        Self::Influence,
        Self::Faith,
        Self::Knowledge,
        Self::Loyalty,
    ];

    /// Lowercase identifier used in configuration and logs.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Influence => "influence",
            Self::Faith => "faith",
            Self::Knowledge => "knowledge",
            Self::Loyalty => "loyalty",
        }
    }

    /// Parse a resource from its key or variant name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.key().eq_ignore_ascii_case(name.trim()))
    }
}

// ---------------------------------------------------------------------------
// Factions
// ---------------------------------------------------------------------------

/// One of the five political factions of the realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FactionType {
    /// Landed aristocracy.
    Nobility,
    /// Traders and guilds.
    Merchants,
    /// The standing army and its officers.
    Military,
    /// The church hierarchy.
    Clergy,
    /// Peasants, laborers and townsfolk.
    Commoners,
}

impl FactionType {
    /// Every faction kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Nobility,
        Self::Merchants,
        Self::Military,
        Self::Clergy,
        Self::Commoners,
    ];

    /// Canonical display name (also the variant name).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nobility => "Nobility",
            Self::Merchants => "Merchants",
            Self::Military => "Military",
            Self::Clergy => "Clergy",
            Self::Commoners => "Commoners",
        }
    }

    /// Parse a faction from its canonical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl core::fmt::Display for FactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete mood bucket derived from a faction's approval rating.
///
/// Variants are declared from worst to best so the derived `Ord` follows
/// approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Mood {
    /// Approval at or below 20.
    Hostile,
    /// Approval in (20, 40].
    Unhappy,
    /// Approval in (40, 60].
    Neutral,
    /// Approval in (60, 80].
    Content,
    /// Approval above 80.
    Loyal,
}

impl Mood {
    /// Bucket an approval rating into a mood.
    ///
    /// Bucket edges are inclusive on the upper bound: exactly 20 is
    /// `Hostile`, exactly 80 is `Content`.
    pub fn from_approval(approval: Decimal) -> Self {
        if approval <= Decimal::from(20) {
            Self::Hostile
        } else if approval <= Decimal::from(40) {
            Self::Unhappy
        } else if approval <= Decimal::from(60) {
            Self::Neutral
        } else if approval <= Decimal::from(80) {
            Self::Content
        } else {
            Self::Loyal
        }
    }
}

// ---------------------------------------------------------------------------
// Court
// ---------------------------------------------------------------------------

/// The office an advisor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AdvisorType {
    /// Keeps the books and raises taxes.
    Treasurer,
    /// Commands the army.
    General,
    /// Handles foreign and domestic envoys.
    Diplomat,
    /// Speaks for the church at court.
    HighPriest,
    /// Runs the royal archive.
    Scholar,
}

impl AdvisorType {
    /// Every advisor kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Treasurer,
        Self::General,
        Self::Diplomat,
        Self::HighPriest,
        Self::Scholar,
    ];

    /// Parse an advisor kind from its variant name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| format!("{a:?}").eq_ignore_ascii_case(name.trim()))
    }
}

/// The role a character plays at court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CharacterRole {
    /// The reigning monarch.
    Ruler,
    /// Next in line to the throne.
    Heir,
    /// A noble or official attending court.
    Courtier,
    /// A sworn knight or war hero.
    Champion,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Category tag of a narrative event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// Court intrigue and succession matters.
    Political,
    /// Trade, taxation and harvests.
    Economic,
    /// Wars, raids and the army.
    Military,
    /// Church affairs and belief.
    Religious,
    /// Everyday life of the realm.
    Social,
    /// A faction is openly restless.
    FactionUnrest,
    /// A faction has taken up arms or withdrawn allegiance.
    FactionRebellion,
}

/// How urgent an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventSeverity {
    /// Flavor only.
    Minor,
    /// Worth attention.
    Moderate,
    /// Costly if ignored.
    Severe,
    /// Threatens the realm.
    Critical,
}

/// The classification of how a chain was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ChainPath {
    /// Negotiation and compromise dominated.
    Peaceful,
    /// Force and control dominated (also the tie-break).
    Aggressive,
}
