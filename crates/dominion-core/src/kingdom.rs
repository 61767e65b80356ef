//! The kingdom aggregate.
//!
//! A [`Kingdom`] is plain data plus the mutating operations every service
//! goes through. It owns:
//!
//! - the authoritative [`ResourceStock`] and the legacy five-field
//!   [`Resources`] view (gold, influence and loyalty mirror the stock after
//!   every mutation; population and military power live only in the view),
//! - exactly one [`Faction`] per [`FactionType`], created at neutral
//!   approval and never added or removed,
//! - the court (advisors and characters), the prestige level, the
//!   completed-event counter, the offline-progress timestamp, unlocked
//!   achievements and per-resource multipliers.
//!
//! Services in this crate are functions over a `&Kingdom` or `&mut Kingdom`;
//! persisting the result is the caller's job.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use dominion_types::{
    Advisor, Character, CharacterRole, FactionType, KingdomId, ResourceDelta, ResourceType,
    Resources,
};

use crate::config::KingdomTuning;
use crate::error::CoreError;
use crate::faction::Faction;
use crate::stock::ResourceStock;

/// The aggregate root of one player's realm.
///
/// Loading goes through [`KingdomRecord`]: factions and stock re-establish
/// their own bounds, missing factions come back at neutral, and the legacy
/// resource view is re-synced from the stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KingdomRecord")]
pub struct Kingdom {
    id: KingdomId,
    name: String,
    ruler: Option<String>,
    resources: Resources,
    stock: ResourceStock,
    factions: BTreeMap<FactionType, Faction>,
    pub(crate) characters: Vec<Character>,
    pub(crate) advisors: Vec<Advisor>,
    pub(crate) prestige_level: u32,
    pub(crate) completed_events_count: u32,
    last_calculation: DateTime<Utc>,
    achievements: BTreeSet<String>,
    resource_multipliers: BTreeMap<ResourceType, Decimal>,
    created_at: DateTime<Utc>,
}

/// Stored form of a [`Kingdom`].
#[derive(Deserialize)]
struct KingdomRecord {
    id: KingdomId,
    name: String,
    #[serde(default)]
    ruler: Option<String>,
    resources: Resources,
    stock: ResourceStock,
    #[serde(deserialize_with = "deserialize_factions")]
    factions: BTreeMap<FactionType, Faction>,
    #[serde(default)]
    characters: Vec<Character>,
    #[serde(default)]
    advisors: Vec<Advisor>,
    #[serde(default)]
    prestige_level: u32,
    #[serde(default)]
    completed_events_count: u32,
    last_calculation: DateTime<Utc>,
    #[serde(default)]
    achievements: BTreeSet<String>,
    #[serde(default)]
    resource_multipliers: BTreeMap<ResourceType, Decimal>,
    created_at: DateTime<Utc>,
}

impl From<KingdomRecord> for Kingdom {
    fn from(record: KingdomRecord) -> Self {
        let mut kingdom = Self {
            id: record.id,
            name: record.name,
            ruler: record.ruler,
            resources: record.resources,
            stock: record.stock,
            factions: record.factions,
            characters: record.characters,
            advisors: record.advisors,
            prestige_level: record.prestige_level,
            completed_events_count: record.completed_events_count,
            last_calculation: record.last_calculation,
            achievements: record.achievements,
            resource_multipliers: record.resource_multipliers,
            created_at: record.created_at,
        };
        kingdom.sync_legacy_view();
        kingdom
    }
}

impl Kingdom {
    /// Found a new kingdom.
    ///
    /// All five factions start at approval 50. When `ruler` is given, a
    /// [`CharacterRole::Ruler`] character is seated at court.
    pub fn new(
        name: impl Into<String>,
        ruler: Option<String>,
        tuning: &KingdomTuning,
        now: DateTime<Utc>,
    ) -> Self {
        let stock = ResourceStock::with_amounts(tuning.resource_cap, &tuning.starting_stock);
        let characters = ruler
            .iter()
            .map(|r| Character::new(r.clone(), CharacterRole::Ruler))
            .collect();
        let mut kingdom = Self {
            id: KingdomId::new(),
            name: name.into(),
            ruler,
            resources: Resources::new(
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                tuning.starting_population,
                tuning.starting_military_power,
            ),
            stock,
            factions: all_factions(),
            characters,
            advisors: Vec::new(),
            prestige_level: 0,
            completed_events_count: 0,
            last_calculation: now,
            achievements: BTreeSet::new(),
            resource_multipliers: BTreeMap::new(),
            created_at: now,
        };
        kingdom.sync_legacy_view();
        kingdom
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Kingdom id.
    pub const fn id(&self) -> KingdomId {
        self.id
    }

    /// Kingdom name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the ruler, if one was crowned at founding.
    pub fn ruler(&self) -> Option<&str> {
        self.ruler.as_deref()
    }

    /// When the kingdom was founded.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Legacy five-field view.
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Authoritative per-resource holdings.
    pub const fn stock(&self) -> &ResourceStock {
        &self.stock
    }

    /// Add a signed amount to one resource, clamped to `[0, cap]`.
    /// Returns the new amount.
    pub fn add_resource(&mut self, resource: ResourceType, amount: Decimal) -> Decimal {
        let next = self.stock.add(resource, amount);
        self.sync_legacy_view();
        next
    }

    /// [`add_resource`](Self::add_resource) by resource name.
    pub fn add_resource_by_name(&mut self, name: &str, amount: Decimal) -> Result<Decimal, CoreError> {
        let resource = ResourceType::from_name(name).ok_or_else(|| CoreError::UnknownResource {
            name: name.to_owned(),
        })?;
        Ok(self.add_resource(resource, amount))
    }

    /// Apply a five-field delta.
    ///
    /// Gold, influence and loyalty go through the capped stock; population
    /// and military power adjust the legacy view directly, floored at zero.
    pub fn apply_resource_delta(&mut self, delta: &ResourceDelta) {
        self.resources = self.resources.apply_delta(delta);
        self.stock.add(ResourceType::Gold, delta.gold);
        self.stock.add(ResourceType::Influence, delta.influence);
        self.stock.add(ResourceType::Loyalty, delta.loyalty);
        self.sync_legacy_view();
    }

    /// Deduct `cost` from the stock if every entry is covered.
    pub fn try_spend(&mut self, cost: &BTreeMap<ResourceType, Decimal>) -> bool {
        let spent = self.stock.try_spend(cost);
        if spent {
            self.sync_legacy_view();
        }
        spent
    }

    /// Overwrite the stock with `baseline` (absent resources become zero).
    pub(crate) fn reset_stock(&mut self, baseline: &BTreeMap<ResourceType, Decimal>) {
        self.stock.reset_to(baseline);
        self.sync_legacy_view();
    }

    /// Kingdom-specific multiplier for `resource`; one when unset.
    pub fn resource_multiplier(&self, resource: ResourceType) -> Decimal {
        self.resource_multipliers
            .get(&resource)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Set a kingdom-specific multiplier for `resource`.
    pub fn set_resource_multiplier(&mut self, resource: ResourceType, multiplier: Decimal) {
        self.resource_multipliers
            .insert(resource, multiplier.max(Decimal::ZERO));
    }

    /// When resources were last brought up to date.
    pub const fn last_calculation(&self) -> DateTime<Utc> {
        self.last_calculation
    }

    /// Record that resources are current as of `at`. Never moves backward.
    pub(crate) fn mark_calculated(&mut self, at: DateTime<Utc>) {
        if at > self.last_calculation {
            self.last_calculation = at;
        }
    }

    fn sync_legacy_view(&mut self) {
        self.resources.gold = self.stock.get(ResourceType::Gold);
        self.resources.influence = self.stock.get(ResourceType::Influence);
        self.resources.loyalty = self.stock.get(ResourceType::Loyalty);
    }

    // -----------------------------------------------------------------------
    // Factions
    // -----------------------------------------------------------------------

    /// The faction of `kind`.
    pub fn faction(&self, kind: FactionType) -> Option<&Faction> {
        self.factions.get(&kind)
    }

    /// The faction with the given name.
    pub fn faction_by_name(&self, name: &str) -> Result<&Faction, CoreError> {
        FactionType::from_name(name)
            .and_then(|kind| self.factions.get(&kind))
            .ok_or_else(|| CoreError::UnknownFaction {
                name: name.to_owned(),
            })
    }

    /// Approval of `kind`; neutral if somehow absent.
    pub fn approval(&self, kind: FactionType) -> Decimal {
        self.faction(kind)
            .map_or(crate::faction::NEUTRAL_APPROVAL, Faction::approval)
    }

    /// Every faction, in declaration order of [`FactionType`].
    pub fn factions(&self) -> impl Iterator<Item = &Faction> {
        self.factions.values()
    }

    /// Shift one faction's approval. Other factions are untouched; use
    /// [`FactionService::calculate_faction_impact`] and
    /// [`apply_faction_impacts`](Self::apply_faction_impacts) to propagate.
    ///
    /// [`FactionService::calculate_faction_impact`]: crate::factions::FactionService::calculate_faction_impact
    pub fn apply_faction_change(&mut self, kind: FactionType, delta: Decimal) {
        if let Some(faction) = self.factions.get_mut(&kind) {
            faction.change_approval(delta);
            debug!(
                kingdom = %self.id,
                faction = %kind,
                delta = %delta,
                approval = %faction.approval(),
                "faction approval changed"
            );
        }
    }

    /// [`apply_faction_change`](Self::apply_faction_change) by faction name.
    pub fn apply_faction_change_by_name(&mut self, name: &str, delta: Decimal) -> Result<(), CoreError> {
        let kind = FactionType::from_name(name).ok_or_else(|| CoreError::UnknownFaction {
            name: name.to_owned(),
        })?;
        self.apply_faction_change(kind, delta);
        Ok(())
    }

    /// Apply a precomputed impact map.
    pub fn apply_faction_impacts(&mut self, impacts: &BTreeMap<FactionType, Decimal>) {
        for (&kind, &delta) in impacts {
            self.apply_faction_change(kind, delta);
        }
    }

    /// Shift every faction's approval by the same amount.
    pub fn apply_stability_change(&mut self, delta: Decimal) {
        for faction in self.factions.values_mut() {
            faction.change_approval(delta);
        }
    }

    /// Overwrite one faction's approval.
    pub(crate) fn set_faction_approval(&mut self, kind: FactionType, approval: Decimal) {
        if let Some(faction) = self.factions.get_mut(&kind) {
            faction.set_approval(approval);
        }
    }

    /// Mean approval across all factions.
    pub fn stability(&self) -> Decimal {
        let total = self
            .factions
            .values()
            .fold(Decimal::ZERO, |acc, f| acc.saturating_add(f.approval()));
        let count = Decimal::from(self.factions.len());
        total.checked_div(count).unwrap_or(Decimal::ZERO)
    }

    // -----------------------------------------------------------------------
    // Court
    // -----------------------------------------------------------------------

    /// Advisors currently holding office.
    pub fn advisors(&self) -> &[Advisor] {
        &self.advisors
    }

    /// Seat an advisor. Slot and cost checks belong to
    /// [`hire_advisor`](crate::advisors::hire_advisor).
    pub fn add_advisor(&mut self, advisor: Advisor) {
        self.advisors.push(advisor);
    }

    /// Characters at court.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Add a character to court.
    pub fn add_character(&mut self, character: Character) {
        self.characters.push(character);
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Number of completed prestige resets.
    pub const fn prestige_level(&self) -> u32 {
        self.prestige_level
    }

    /// Events resolved since the last prestige reset.
    pub const fn completed_events_count(&self) -> u32 {
        self.completed_events_count
    }

    /// Count one more resolved event.
    pub const fn increment_completed_events(&mut self) {
        self.completed_events_count = self.completed_events_count.saturating_add(1);
    }

    /// Unlocked achievement keys.
    pub const fn achievements(&self) -> &BTreeSet<String> {
        &self.achievements
    }

    /// Record an achievement. Returns `false` if it was already unlocked.
    pub fn unlock_achievement(&mut self, key: &str) -> bool {
        self.achievements.insert(key.to_owned())
    }
}

fn all_factions() -> BTreeMap<FactionType, Faction> {
    FactionType::ALL
        .into_iter()
        .map(|kind| (kind, Faction::new(kind)))
        .collect()
}

/// Accept a stored faction map, filling in any missing kind at neutral.
fn deserialize_factions<'de, D>(deserializer: D) -> Result<BTreeMap<FactionType, Faction>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = BTreeMap::<FactionType, Faction>::deserialize(deserializer)?;
    let mut factions = all_factions();
    for (kind, faction) in stored {
        if faction.kind() == kind {
            factions.insert(kind, faction);
        }
    }
    Ok(factions)
}
