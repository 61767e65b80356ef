//! Resource generation: per-second rates, offline catch-up and capped
//! totals.
//!
//! The rate of each resource is built up as:
//!
//! 1. the configured base rate (zero when unconfigured),
//! 2. times the multiplier of every advisor held. Advisors boost every
//!    resource, not one in particular,
//! 3. times the prestige resource multiplier and the resource's own
//!    prestige multiplier,
//! 4. times `1 + (approval - 50) / 100 * faction multiplier` for each
//!    faction above 50 approval that lists the resource,
//! 5. times the kingdom's own multiplier for the resource.
//!
//! Offline progress is `min(rate * seconds, cap - current)`, never negative,
//! so the generator and [`Kingdom::add_resource`] agree on the ceiling.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use dominion_types::{ResourceType, Resources};

use crate::config::GameTuning;
use crate::faction::NEUTRAL_APPROVAL;
use crate::kingdom::Kingdom;
use crate::prestige::PrestigeBonuses;

/// Computes generation from a kingdom and the tuning tables.
#[derive(Debug, Clone, Copy)]
pub struct ResourceGenerator<'a> {
    tuning: &'a GameTuning,
}

impl<'a> ResourceGenerator<'a> {
    /// A generator over `tuning`.
    pub const fn new(tuning: &'a GameTuning) -> Self {
        Self { tuning }
    }

    /// Per-second rate of every tracked resource.
    pub fn calculate_generation_rates(&self, kingdom: &Kingdom) -> BTreeMap<ResourceType, Decimal> {
        let prestige = PrestigeBonuses::for_level(kingdom.prestige_level());

        let advisor_multiplier = kingdom
            .advisors()
            .iter()
            .fold(Decimal::ONE, |acc, a| {
                acc.saturating_mul(self.tuning.advisor_multiplier(a.kind))
            });

        ResourceType::ALL
            .into_iter()
            .map(|resource| {
                let mut rate = self
                    .tuning
                    .base_rate(resource)
                    .saturating_mul(advisor_multiplier)
                    .saturating_mul(prestige.resource_multiplier)
                    .saturating_mul(self.tuning.resource_prestige_multiplier(resource));

                for faction in kingdom.factions() {
                    let approval = faction.approval();
                    if approval <= NEUTRAL_APPROVAL {
                        continue;
                    }
                    let Some(bonus) = self.tuning.factions.get(&faction.kind()) else {
                        continue;
                    };
                    if !bonus.bonus_resources.contains(&resource) {
                        continue;
                    }
                    let share = approval
                        .saturating_sub(NEUTRAL_APPROVAL)
                        .checked_div(Decimal::ONE_HUNDRED)
                        .unwrap_or(Decimal::ZERO)
                        .saturating_mul(bonus.multiplier);
                    rate = rate.saturating_mul(Decimal::ONE.saturating_add(share));
                }

                rate = rate.saturating_mul(kingdom.resource_multiplier(resource));
                (resource, rate.max(Decimal::ZERO))
            })
            .collect()
    }

    /// What `seconds` of absence would yield, bounded by each resource's
    /// headroom below the cap.
    pub fn calculate_offline_progress(
        &self,
        kingdom: &Kingdom,
        seconds: u64,
    ) -> BTreeMap<ResourceType, Decimal> {
        let elapsed = Decimal::from(seconds);
        self.calculate_generation_rates(kingdom)
            .into_iter()
            .map(|(resource, rate)| {
                let produced = rate.saturating_mul(elapsed);
                let room = kingdom.stock().headroom(resource);
                (resource, produced.min(room).max(Decimal::ZERO))
            })
            .collect()
    }

    /// Legacy view of `seconds` of production: gold and influence only.
    pub fn generate_resources(&self, kingdom: &Kingdom, seconds: u64) -> Resources {
        let progress = self.calculate_offline_progress(kingdom, seconds);
        let amount = |r: ResourceType| progress.get(&r).copied().unwrap_or(Decimal::ZERO);
        Resources::new(
            amount(ResourceType::Gold),
            amount(ResourceType::Influence),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        )
    }

    /// Bring the kingdom's stock up to `now`.
    ///
    /// Elapsed time since the last calculation is capped at the configured
    /// offline window. Returns what was added.
    pub fn advance_kingdom(
        &self,
        kingdom: &mut Kingdom,
        now: DateTime<Utc>,
    ) -> BTreeMap<ResourceType, Decimal> {
        let elapsed = now
            .signed_duration_since(kingdom.last_calculation())
            .num_seconds();
        let seconds = u64::try_from(elapsed)
            .unwrap_or(0)
            .min(self.tuning.kingdom.max_offline_seconds);

        let progress = self.calculate_offline_progress(kingdom, seconds);
        for (&resource, &amount) in &progress {
            kingdom.add_resource(resource, amount);
        }
        kingdom.mark_calculated(now);

        debug!(
            kingdom = %kingdom.id(),
            seconds,
            gold = %progress.get(&ResourceType::Gold).copied().unwrap_or(Decimal::ZERO),
            "offline progress applied"
        );
        progress
    }
}

impl Kingdom {
    /// Advance this kingdom's resources to `now` under `tuning`.
    pub fn calculate_resource_generation(
        &mut self,
        tuning: &GameTuning,
        now: DateTime<Utc>,
    ) -> BTreeMap<ResourceType, Decimal> {
        ResourceGenerator::new(tuning).advance_kingdom(self, now)
    }
}
