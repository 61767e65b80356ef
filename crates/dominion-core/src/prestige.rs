//! Prestige: the level-gated reset that trades current progress for
//! permanent bonuses.
//!
//! Each level adds 10% to every resource rate and one advisor slot, and
//! lets factions keep 10% of their distance from neutral approval across
//! the reset (capped at 90%).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use dominion_types::{FactionType, ResourceType};

use crate::config::PrestigeTuning;
use crate::faction::NEUTRAL_APPROVAL;
use crate::kingdom::Kingdom;

/// Bonuses granted by a prestige level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrestigeBonuses {
    /// Multiplier on every resource rate: `1 + 0.1 * level`.
    pub resource_multiplier: Decimal,
    /// Extra advisor slots: `level`.
    pub advisor_slots: u32,
    /// Share of faction standing kept across a reset:
    /// `min(0.1 * level, 0.9)`.
    pub faction_relation_retention: Decimal,
}

impl PrestigeBonuses {
    /// Bonuses for `level`.
    pub fn for_level(level: u32) -> Self {
        let step = Decimal::new(1, 1).saturating_mul(Decimal::from(level));
        Self {
            resource_multiplier: Decimal::ONE.saturating_add(step),
            advisor_slots: level,
            faction_relation_retention: step.min(Decimal::new(9, 1)),
        }
    }
}

/// What a prestige reset will write into the kingdom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrestigeReset {
    /// The baseline stock after the reset.
    pub new_resources: BTreeMap<ResourceType, Decimal>,
    /// Per-faction offset from neutral approval that survives the reset.
    pub retained_faction_relations: BTreeMap<FactionType, Decimal>,
}

/// Result of a prestige attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrestigeOutcome {
    /// The reset happened.
    Performed {
        /// Level after the reset.
        new_level: u32,
        /// Bonuses of the new level.
        bonuses: PrestigeBonuses,
    },
    /// The kingdom is not ready; nothing changed.
    Rejected {
        /// Player-facing explanation.
        message: String,
        /// Completed events needed.
        required: u32,
        /// Completed events so far.
        current: u32,
    },
}

impl PrestigeOutcome {
    /// Whether the reset happened.
    pub const fn is_performed(&self) -> bool {
        matches!(self, Self::Performed { .. })
    }
}

/// Prestige rules over the configured requirements.
#[derive(Debug, Clone, Default)]
pub struct PrestigeService {
    tuning: PrestigeTuning,
}

impl PrestigeService {
    /// A service over the given requirements.
    pub const fn new(tuning: PrestigeTuning) -> Self {
        Self { tuning }
    }

    /// Bonuses for `level`.
    pub fn calculate_prestige_bonuses(level: u32) -> PrestigeBonuses {
        PrestigeBonuses::for_level(level)
    }

    /// Whether the kingdom has completed enough events to reset.
    pub const fn can_prestige(&self, kingdom: &Kingdom) -> bool {
        kingdom.completed_events_count() >= self.tuning.required_completed_events
    }

    /// Compute the reset for moving `kingdom` to `new_level`, without
    /// touching it.
    pub fn prepare_prestige_reset(&self, kingdom: &Kingdom, new_level: u32) -> PrestigeReset {
        let retention = PrestigeBonuses::for_level(new_level).faction_relation_retention;
        let new_resources = ResourceType::ALL
            .into_iter()
            .map(|r| {
                let amount = if r == ResourceType::Gold {
                    self.tuning.baseline_gold
                } else {
                    Decimal::ZERO
                };
                (r, amount)
            })
            .collect();
        let retained_faction_relations = kingdom
            .factions()
            .map(|f| {
                let offset = f.approval().saturating_sub(NEUTRAL_APPROVAL);
                (f.kind(), offset.saturating_mul(retention))
            })
            .collect();
        PrestigeReset {
            new_resources,
            retained_faction_relations,
        }
    }

    /// Reset the kingdom into the next prestige level.
    ///
    /// Either every part of the reset applies or, when the kingdom is not
    /// ready, nothing does.
    pub fn perform_prestige(&self, kingdom: &mut Kingdom) -> PrestigeOutcome {
        let required = self.tuning.required_completed_events;
        let current = kingdom.completed_events_count();
        if !self.can_prestige(kingdom) {
            return PrestigeOutcome::Rejected {
                message: format!(
                    "Need {required} completed events to prestige, have {current}"
                ),
                required,
                current,
            };
        }

        let new_level = kingdom.prestige_level().saturating_add(1);
        let reset = self.prepare_prestige_reset(kingdom, new_level);

        kingdom.prestige_level = new_level;
        kingdom.reset_stock(&reset.new_resources);
        for (&kind, &offset) in &reset.retained_faction_relations {
            kingdom.set_faction_approval(kind, NEUTRAL_APPROVAL.saturating_add(offset));
        }
        kingdom.completed_events_count = 0;
        kingdom.advisors.clear();
        kingdom.characters.clear();

        let bonuses = PrestigeBonuses::for_level(new_level);
        info!(
            kingdom = %kingdom.id(),
            level = new_level,
            multiplier = %bonuses.resource_multiplier,
            "prestige reset performed"
        );
        PrestigeOutcome::Performed { new_level, bonuses }
    }
}

impl Kingdom {
    /// Reset into the next prestige level under `tuning`.
    pub fn perform_prestige(&mut self, tuning: &PrestigeTuning) -> PrestigeOutcome {
        PrestigeService::new(tuning.clone()).perform_prestige(self)
    }

    /// Bonuses of the current prestige level.
    pub fn prestige_bonuses(&self) -> PrestigeBonuses {
        PrestigeBonuses::for_level(self.prestige_level)
    }
}
