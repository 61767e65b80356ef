//! Value structs for the Dominion simulation.
//!
//! Covers the legacy five-field [`Resources`] view and its signed
//! [`ResourceDelta`] sibling, the narrative [`Event`] model, chain
//! bookkeeping ([`ChainContext`], [`ChainChoice`], [`ChainReward`]), and the
//! people at court ([`Advisor`], [`Character`]).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AdvisorType, CharacterRole, EventSeverity, EventType, FactionType};
use crate::ids::{AdvisorId, ChainId, CharacterId, EventId, FactionEventId, KingdomId};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Immutable five-field resource snapshot.
///
/// This is the legacy view of a kingdom's holdings. Gold, influence and
/// loyalty mirror the authoritative per-type stock; population and military
/// power exist only here. No field is ever negative after [`subtract`].
///
/// [`subtract`]: Resources::subtract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Coin in the treasury.
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Political capital.
    #[ts(as = "String")]
    pub influence: Decimal,
    /// Loyalty of the subjects.
    #[ts(as = "String")]
    pub loyalty: Decimal,
    /// Number of subjects.
    #[ts(as = "String")]
    pub population: Decimal,
    /// Strength of the standing army.
    #[ts(as = "String")]
    pub military_power: Decimal,
}

impl Resources {
    /// Build a snapshot from explicit values.
    pub const fn new(
        gold: Decimal,
        influence: Decimal,
        loyalty: Decimal,
        population: Decimal,
        military_power: Decimal,
    ) -> Self {
        Self {
            gold,
            influence,
            loyalty,
            population,
            military_power,
        }
    }

    /// A snapshot with every field at zero.
    pub const fn zero() -> Self {
        Self::new(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        )
    }

    /// Field-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            gold: self.gold.saturating_add(other.gold),
            influence: self.influence.saturating_add(other.influence),
            loyalty: self.loyalty.saturating_add(other.loyalty),
            population: self.population.saturating_add(other.population),
            military_power: self.military_power.saturating_add(other.military_power),
        }
    }

    /// Field-wise difference, clamped at zero.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        Self {
            gold: floor_zero(self.gold.saturating_sub(other.gold)),
            influence: floor_zero(self.influence.saturating_sub(other.influence)),
            loyalty: floor_zero(self.loyalty.saturating_sub(other.loyalty)),
            population: floor_zero(self.population.saturating_sub(other.population)),
            military_power: floor_zero(self.military_power.saturating_sub(other.military_power)),
        }
    }

    /// Apply a signed delta, clamping every field at zero.
    #[must_use]
    pub fn apply_delta(&self, delta: &ResourceDelta) -> Self {
        Self {
            gold: floor_zero(self.gold.saturating_add(delta.gold)),
            influence: floor_zero(self.influence.saturating_add(delta.influence)),
            loyalty: floor_zero(self.loyalty.saturating_add(delta.loyalty)),
            population: floor_zero(self.population.saturating_add(delta.population)),
            military_power: floor_zero(self.military_power.saturating_add(delta.military_power)),
        }
    }
}

fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Signed change to the five legacy resource fields.
///
/// Used by event consequences and chain rewards. Negative values are
/// allowed; the receiving [`Resources`] clamps at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceDelta {
    /// Change in gold.
    #[serde(default)]
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Change in influence.
    #[serde(default)]
    #[ts(as = "String")]
    pub influence: Decimal,
    /// Change in loyalty.
    #[serde(default)]
    #[ts(as = "String")]
    pub loyalty: Decimal,
    /// Change in population.
    #[serde(default)]
    #[ts(as = "String")]
    pub population: Decimal,
    /// Change in military power.
    #[serde(default)]
    #[ts(as = "String")]
    pub military_power: Decimal,
}

impl ResourceDelta {
    /// Set the gold component.
    #[must_use]
    pub const fn with_gold(mut self, gold: Decimal) -> Self {
        self.gold = gold;
        self
    }

    /// Set the influence component.
    #[must_use]
    pub const fn with_influence(mut self, influence: Decimal) -> Self {
        self.influence = influence;
        self
    }

    /// Set the loyalty component.
    #[must_use]
    pub const fn with_loyalty(mut self, loyalty: Decimal) -> Self {
        self.loyalty = loyalty;
        self
    }

    /// Set the population component.
    #[must_use]
    pub const fn with_population(mut self, population: Decimal) -> Self {
        self.population = population;
        self
    }

    /// Set the military power component.
    #[must_use]
    pub const fn with_military_power(mut self, military_power: Decimal) -> Self {
        self.military_power = military_power;
        self
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.gold.is_zero()
            && self.influence.is_zero()
            && self.loyalty.is_zero()
            && self.population.is_zero()
            && self.military_power.is_zero()
    }
}

/// Minimum holdings a choice demands before it can be taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceRequirement {
    /// Minimum gold.
    #[serde(default)]
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Minimum influence.
    #[serde(default)]
    #[ts(as = "String")]
    pub influence: Decimal,
    /// Minimum loyalty.
    #[serde(default)]
    #[ts(as = "String")]
    pub loyalty: Decimal,
    /// Minimum population.
    #[serde(default)]
    #[ts(as = "String")]
    pub population: Decimal,
    /// Minimum military power.
    #[serde(default)]
    #[ts(as = "String")]
    pub military_power: Decimal,
}

impl ResourceRequirement {
    /// Whether `resources` meets every threshold.
    pub fn is_met_by(&self, resources: &Resources) -> bool {
        resources.gold >= self.gold
            && resources.influence >= self.influence
            && resources.loyalty >= self.loyalty
            && resources.population >= self.population
            && resources.military_power >= self.military_power
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One effect of taking a choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventConsequence {
    /// Resource change.
    #[serde(default)]
    pub resources: ResourceDelta,
    /// Approval change applied to every faction.
    #[serde(default)]
    #[ts(as = "String")]
    pub stability: Decimal,
    /// Change to the loyalty resource.
    #[serde(default)]
    #[ts(as = "String")]
    pub loyalty: Decimal,
    /// Narrative text shown to the player.
    pub description: String,
    /// Turns after resolution before a long-term effect lands. Zero for
    /// immediate effects.
    #[serde(default)]
    pub delay_turns: u32,
}

impl EventConsequence {
    /// A consequence with only a description.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Set the resource delta.
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceDelta) -> Self {
        self.resources = resources;
        self
    }

    /// Set the stability delta.
    #[must_use]
    pub fn with_stability(mut self, stability: Decimal) -> Self {
        self.stability = stability;
        self
    }

    /// Set the loyalty delta.
    #[must_use]
    pub fn with_loyalty(mut self, loyalty: Decimal) -> Self {
        self.loyalty = loyalty;
        self
    }

    /// Set the delay in turns.
    #[must_use]
    pub fn delayed(mut self, turns: u32) -> Self {
        self.delay_turns = turns;
        self
    }
}

/// Chain-specific data carried by a choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChoiceChainData {
    /// Modifiers handed to the next event of the chain (e.g. a tension
    /// level the successor uses to scale its consequences).
    #[serde(default)]
    #[ts(as = "BTreeMap<String, String>")]
    pub next_event_modifier: BTreeMap<String, Decimal>,
}

/// A decision the player can take on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventChoice {
    /// Identifier, unique within the event. For chain events this is also a
    /// path signal (see chain path inference).
    pub id: String,
    /// Text shown to the player.
    pub text: String,
    /// Holdings required to take this choice.
    #[serde(default)]
    pub requirements: ResourceRequirement,
    /// Applied as soon as the choice is taken.
    pub immediate_effect: EventConsequence,
    /// Applied later by the caller.
    #[serde(default)]
    pub long_term_effects: Vec<EventConsequence>,
    /// Chain-specific data.
    #[serde(default)]
    pub chain_data: Option<ChoiceChainData>,
}

impl EventChoice {
    /// Create a choice with no requirements or long-term effects.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        immediate_effect: EventConsequence,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            requirements: ResourceRequirement::default(),
            immediate_effect,
            long_term_effects: Vec::new(),
            chain_data: None,
        }
    }

    /// Set the requirements.
    #[must_use]
    pub fn requiring(mut self, requirements: ResourceRequirement) -> Self {
        self.requirements = requirements;
        self
    }

    /// Append a long-term effect.
    #[must_use]
    pub fn with_long_term(mut self, effect: EventConsequence) -> Self {
        self.long_term_effects.push(effect);
        self
    }

    /// Attach a modifier for the next chain event.
    #[must_use]
    pub fn with_next_event_modifier(mut self, key: impl Into<String>, value: Decimal) -> Self {
        self.chain_data
            .get_or_insert_with(ChoiceChainData::default)
            .next_event_modifier
            .insert(key.into(), value);
        self
    }
}

/// Position of an event inside a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChainLink {
    /// The chain this event belongs to.
    pub chain_id: ChainId,
    /// 1-based position within the chain.
    pub position: u32,
    /// Total number of events in the chain.
    pub length: u32,
    /// The event before this one, if any.
    pub previous_event_id: Option<EventId>,
    /// The event after this one, if any.
    pub next_event_id: Option<EventId>,
}

/// A narrative decision point.
///
/// Events are built once and never mutated; linking an event into a chain
/// yields a new value via [`Event::with_chain_link`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Stable identifier.
    pub id: EventId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Category tag.
    pub event_type: EventType,
    /// Urgency.
    pub severity: EventSeverity,
    /// Available decisions, in display order.
    pub choices: Vec<EventChoice>,
    /// When the event lapses, if ever.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Chain metadata; `None` for standalone events.
    #[serde(default)]
    pub chain: Option<ChainLink>,
}

impl Event {
    /// Create a standalone event without choices.
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        description: impl Into<String>,
        event_type: EventType,
        severity: EventSeverity,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            event_type,
            severity,
            choices: Vec::new(),
            expires_at: None,
            chain: None,
        }
    }

    /// Append a choice.
    #[must_use]
    pub fn with_choice(mut self, choice: EventChoice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Set an expiry timestamp.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Return a copy of this event carrying the given chain metadata.
    #[must_use]
    pub fn with_chain_link(mut self, link: ChainLink) -> Self {
        self.chain = Some(link);
        self
    }

    /// Look up a choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    /// Whether the event belongs to a chain.
    pub const fn is_chain_event(&self) -> bool {
        self.chain.is_some()
    }

    /// The chain id, for chain events.
    pub fn chain_id(&self) -> Option<&ChainId> {
        self.chain.as_ref().map(|c| &c.chain_id)
    }

    /// The predecessor's id, if any.
    pub fn previous_event_id(&self) -> Option<&EventId> {
        self.chain.as_ref().and_then(|c| c.previous_event_id.as_ref())
    }

    /// The successor's id, if any.
    pub fn next_event_id(&self) -> Option<&EventId> {
        self.chain.as_ref().and_then(|c| c.next_event_id.as_ref())
    }

    /// True iff the event has no predecessor.
    pub fn is_chain_start(&self) -> bool {
        self.previous_event_id().is_none()
    }

    /// True iff the event has no successor.
    pub fn is_chain_end(&self) -> bool {
        self.next_event_id().is_none()
    }

    /// Whether the event has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

/// A single recorded decision inside a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChainChoice {
    /// The event the choice was taken on.
    pub event_id: EventId,
    /// The choice taken.
    pub choice_id: String,
    /// When it was taken.
    pub timestamp: DateTime<Utc>,
}

/// Per-kingdom, per-chain decision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChainContext {
    /// The kingdom walking the chain.
    pub kingdom_id: KingdomId,
    /// The chain being walked.
    pub chain_id: ChainId,
    /// Every choice so far, in order.
    pub previous_choices: Vec<ChainChoice>,
    /// Position of the last resolved event (0 before the first choice).
    pub current_position: u32,
}

impl ChainContext {
    /// Start an empty context.
    pub const fn new(kingdom_id: KingdomId, chain_id: ChainId) -> Self {
        Self {
            kingdom_id,
            chain_id,
            previous_choices: Vec::new(),
            current_position: 0,
        }
    }

    /// Rebuild a context from stored choices.
    pub fn from_choices(kingdom_id: KingdomId, chain_id: ChainId, choices: Vec<ChainChoice>) -> Self {
        let current_position = u32::try_from(choices.len()).unwrap_or(u32::MAX);
        Self {
            kingdom_id,
            chain_id,
            previous_choices: choices,
            current_position,
        }
    }

    /// Iterate the recorded choice ids.
    pub fn choice_ids(&self) -> impl Iterator<Item = &str> {
        self.previous_choices.iter().map(|c| c.choice_id.as_str())
    }
}

/// What a completed chain grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChainReward {
    /// Resource change applied to the kingdom.
    pub resources: ResourceDelta,
    /// Named unlocks (reserved; not applied to kingdom state).
    #[serde(default)]
    pub unlocks: Vec<String>,
    /// Narrative text.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Court
// ---------------------------------------------------------------------------

/// An advisor holding office at court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Advisor {
    /// Unique id.
    pub id: AdvisorId,
    /// Office held.
    pub kind: AdvisorType,
    /// Display name.
    pub name: String,
    /// When the advisor was hired.
    pub hired_at: DateTime<Utc>,
}

/// A named character at court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Character {
    /// Unique id.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Role at court.
    pub role: CharacterRole,
}

impl Character {
    /// Create a character with a fresh id.
    pub fn new(name: impl Into<String>, role: CharacterRole) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            role,
        }
    }
}

/// An unrest or rebellion event raised by a faction's low approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FactionEvent {
    /// Unique id.
    pub id: FactionEventId,
    /// The kingdom the faction belongs to.
    pub kingdom_id: KingdomId,
    /// The faction that raised it.
    pub faction: FactionType,
    /// `FactionUnrest` or `FactionRebellion`.
    pub event_type: EventType,
    /// `Severe` for unrest, `Critical` for rebellion.
    pub severity: EventSeverity,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Approval at the moment the event fired.
    #[ts(as = "String")]
    pub approval: Decimal,
    /// When the event fired.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn subtract_clamps_at_zero() {
        let have = Resources::new(dec!(10), dec!(5), dec!(0), dec!(100), dec!(3));
        let cost = Resources::new(dec!(15), dec!(5), dec!(1), dec!(40), dec!(0));
        let left = have.subtract(&cost);
        assert_eq!(left, Resources::new(dec!(0), dec!(0), dec!(0), dec!(60), dec!(3)));
    }

    #[test]
    fn add_is_associative() {
        let a = Resources::new(dec!(1), dec!(2), dec!(3), dec!(4), dec!(5));
        let b = Resources::new(dec!(10), dec!(0.5), dec!(0), dec!(7), dec!(1));
        let c = Resources::new(dec!(0.25), dec!(9), dec!(2), dec!(0), dec!(3));
        assert_eq!(a.add(&b).add(&c), a.add(&b.add(&c)));
    }

    #[test]
    fn negative_delta_clamps_at_zero() {
        let have = Resources::new(dec!(100), dec!(0), dec!(20), dec!(0), dec!(0));
        let delta = ResourceDelta::default()
            .with_gold(dec!(-30))
            .with_loyalty(dec!(-50));
        let after = have.apply_delta(&delta);
        assert_eq!(after.gold, dec!(70));
        assert_eq!(after.loyalty, dec!(0));
    }

    #[test]
    fn requirement_checks_every_field() {
        let req = ResourceRequirement {
            gold: dec!(50),
            military_power: dec!(10),
            ..ResourceRequirement::default()
        };
        let rich_but_weak = Resources::new(dec!(500), dec!(0), dec!(0), dec!(0), dec!(9));
        let enough = Resources::new(dec!(50), dec!(0), dec!(0), dec!(0), dec!(10));
        assert!(!req.is_met_by(&rich_but_weak));
        assert!(req.is_met_by(&enough));
    }

    #[test]
    fn chain_flags_follow_links() {
        let standalone = Event::new("e", "t", "d", EventType::Social, EventSeverity::Minor);
        assert!(standalone.is_chain_start());
        assert!(standalone.is_chain_end());
        assert!(!standalone.is_chain_event());

        let middle = standalone.with_chain_link(ChainLink {
            chain_id: ChainId::from("c"),
            position: 2,
            length: 3,
            previous_event_id: Some(EventId::from("a")),
            next_event_id: Some(EventId::from("z")),
        });
        assert!(!middle.is_chain_start());
        assert!(!middle.is_chain_end());
        assert_eq!(middle.chain_id(), Some(&ChainId::from("c")));
    }

    #[test]
    fn choice_modifier_builder_creates_chain_data() {
        let choice = EventChoice::new("show_force", "Show force", EventConsequence::described("x"))
            .with_next_event_modifier("tension", dec!(2));
        let data = choice.chain_data.unwrap();
        assert_eq!(data.next_event_modifier.get("tension"), Some(&dec!(2)));
    }
}
