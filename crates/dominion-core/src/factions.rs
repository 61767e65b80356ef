//! Faction politics: mood bonuses, threshold events, impact propagation
//! and power scoring.
//!
//! Every function here is pure over its inputs. [`FactionService`] owns an
//! immutable [`FactionTables`] value (relation graph, thresholds, base
//! power) injected at construction; nothing is read from global state.
//!
//! # Impact propagation
//!
//! A change of `delta` to faction A reaches every other faction B as
//! `round(delta * relation[A][B] * 0.5)`, rounding halves toward positive
//! infinity. A itself receives the full `delta`. The result is a map; the
//! caller applies it with [`Kingdom::apply_faction_impacts`].
//!
//! # Threshold events
//!
//! Each kind has its own cutoffs. At or below `rebellion` a random critical
//! rebellion event fires; at or below `unrest` a random severe unrest event
//! fires. The `discontent` band is named but silent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dominion_types::{
    EventSeverity, EventType, FactionEvent, FactionEventId, FactionType, KingdomId, Mood,
};

use crate::catalog::{FactionEventTemplate, REBELLION_TEMPLATES, UNREST_TEMPLATES};
use crate::faction::Faction;
use crate::kingdom::Kingdom;
use crate::relations::{ApprovalThresholds, FactionTables};

/// Share of a relation weight that reaches the related faction.
const PROPAGATION_FACTOR: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Approval below which power collapses quadratically.
const LEGITIMACY_FLOOR: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Kind-specific bonus granted on top of the mood bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindBonus {
    /// Merchants: multiplier on trade income.
    Trade(Decimal),
    /// Military: multiplier on military strength.
    Military(Decimal),
    /// Commoners: multiplier on production.
    Production(Decimal),
}

/// What a faction's mood is worth to the crown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodBonus {
    /// Multiplier on the resources this faction influences.
    pub resource_multiplier: Decimal,
    /// Additive stability modifier.
    pub stability_bonus: Decimal,
    /// Kind-specific bonus; `None` for Nobility and Clergy.
    pub kind_bonus: Option<KindBonus>,
}

/// Pure functions over factions and the injected [`FactionTables`].
#[derive(Debug, Clone, Default)]
pub struct FactionService {
    tables: FactionTables,
}

impl FactionService {
    /// A service over the given tables.
    pub const fn new(tables: FactionTables) -> Self {
        Self { tables }
    }

    /// The tables this service reads.
    pub const fn tables(&self) -> &FactionTables {
        &self.tables
    }

    /// Step-function bonus for the faction's current mood.
    ///
    /// The kind-specific bonus carries the same multiplier as the mood
    /// bonus, tagged with the domain it applies to.
    pub fn calculate_mood_bonus(&self, faction: &Faction) -> MoodBonus {
        let (multiplier, stability) = match faction.mood() {
            Mood::Hostile => (Decimal::new(6, 1), -20),
            Mood::Unhappy => (Decimal::new(8, 1), -10),
            Mood::Neutral => (Decimal::ONE, 0),
            Mood::Content => (Decimal::new(11, 1), 5),
            Mood::Loyal => (Decimal::new(12, 1), 10),
        };
        let kind_bonus = match faction.kind() {
            FactionType::Merchants => Some(KindBonus::Trade(multiplier)),
            FactionType::Military => Some(KindBonus::Military(multiplier)),
            FactionType::Commoners => Some(KindBonus::Production(multiplier)),
            FactionType::Nobility | FactionType::Clergy => None,
        };
        MoodBonus {
            resource_multiplier: multiplier,
            stability_bonus: Decimal::from(stability),
            kind_bonus,
        }
    }

    /// Raise an unrest or rebellion event if the faction's approval has
    /// fallen through one of its thresholds.
    pub fn generate_faction_event(
        &self,
        kingdom_id: KingdomId,
        faction: &Faction,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Option<FactionEvent> {
        let thresholds = self.tables.thresholds(faction.kind());
        let approval = faction.approval();

        let (event_type, severity, templates) = if approval <= thresholds.rebellion {
            (
                EventType::FactionRebellion,
                EventSeverity::Critical,
                REBELLION_TEMPLATES,
            )
        } else if approval <= thresholds.unrest {
            (
                EventType::FactionUnrest,
                EventSeverity::Severe,
                UNREST_TEMPLATES,
            )
        } else {
            return None;
        };

        let template = pick_template(templates, rng)?;
        let event = FactionEvent {
            id: FactionEventId::new(),
            kingdom_id,
            faction: faction.kind(),
            event_type,
            severity,
            title: template.title(faction.kind()),
            description: template.description(faction.kind()),
            approval,
            created_at: now,
        };

        if severity == EventSeverity::Critical {
            warn!(
                kingdom = %kingdom_id,
                faction = %faction.kind(),
                approval = %approval,
                title = %event.title,
                "faction rebellion"
            );
        } else {
            debug!(
                kingdom = %kingdom_id,
                faction = %faction.kind(),
                approval = %approval,
                title = %event.title,
                "faction unrest"
            );
        }
        Some(event)
    }

    /// Raise events for every faction of a kingdom that has crossed a
    /// threshold.
    pub fn generate_kingdom_events(
        &self,
        kingdom: &Kingdom,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Vec<FactionEvent> {
        kingdom
            .factions()
            .filter_map(|f| self.generate_faction_event(kingdom.id(), f, rng, now))
            .collect()
    }

    /// Per-faction approval deltas caused by changing `target` by `delta`.
    ///
    /// The target gets the full delta; every other faction present in the
    /// kingdom gets the rounded, halved, relation-weighted share. Zero
    /// shares are included so the map always names every faction.
    pub fn calculate_faction_impact(
        &self,
        kingdom: &Kingdom,
        target: FactionType,
        delta: Decimal,
    ) -> BTreeMap<FactionType, Decimal> {
        kingdom
            .factions()
            .map(|f| {
                let kind = f.kind();
                let share = if kind == target {
                    delta
                } else {
                    let weight = self.tables.relation(target, kind);
                    round_half_up(
                        delta
                            .saturating_mul(weight)
                            .saturating_mul(PROPAGATION_FACTOR),
                    )
                };
                (kind, share)
            })
            .collect()
    }

    /// Political weight of a faction at the given approval.
    pub fn calculate_faction_power(&self, kind: FactionType, approval: Decimal) -> Decimal {
        let approval = approval.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let ratio = approval
            .checked_div(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO);
        let modifier = if approval < LEGITIMACY_FLOOR {
            ratio.saturating_mul(ratio)
        } else {
            ratio
        };
        self.tables.base_power(kind).saturating_mul(modifier)
    }

    /// Approval cutoffs for a kind.
    pub fn required_approval_thresholds(&self, kind: FactionType) -> ApprovalThresholds {
        self.tables.thresholds(kind)
    }
}

fn pick_template<'a>(
    templates: &'a [FactionEventTemplate],
    rng: &mut impl Rng,
) -> Option<&'a FactionEventTemplate> {
    if templates.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..templates.len());
    templates.get(idx)
}

/// Round to the nearest integer, halves toward positive infinity.
pub(crate) fn round_half_up(value: Decimal) -> Decimal {
    value.saturating_add(Decimal::new(5, 1)).floor()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;

    use crate::config::KingdomTuning;

    use super::*;

    fn kingdom() -> Kingdom {
        Kingdom::new("Avalon", None, &KingdomTuning::default(), DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn mood_bonus_steps() {
        let service = FactionService::default();
        let hostile = Faction::with_approval(FactionType::Nobility, dec!(10));
        let loyal = Faction::with_approval(FactionType::Nobility, dec!(95));

        let bonus = service.calculate_mood_bonus(&hostile);
        assert_eq!(bonus.resource_multiplier, dec!(0.6));
        assert_eq!(bonus.stability_bonus, dec!(-20));
        assert_eq!(bonus.kind_bonus, None);

        let bonus = service.calculate_mood_bonus(&loyal);
        assert_eq!(bonus.resource_multiplier, dec!(1.2));
        assert_eq!(bonus.stability_bonus, dec!(10));
    }

    #[test]
    fn kind_bonus_depends_on_faction() {
        let service = FactionService::default();
        let merchants = Faction::with_approval(FactionType::Merchants, dec!(70));
        let military = Faction::new(FactionType::Military);
        let commoners = Faction::with_approval(FactionType::Commoners, dec!(30));

        assert_eq!(
            service.calculate_mood_bonus(&merchants).kind_bonus,
            Some(KindBonus::Trade(dec!(1.1)))
        );
        assert_eq!(
            service.calculate_mood_bonus(&military).kind_bonus,
            Some(KindBonus::Military(dec!(1)))
        );
        assert_eq!(
            service.calculate_mood_bonus(&commoners).kind_bonus,
            Some(KindBonus::Production(dec!(0.8)))
        );
    }

    #[test]
    fn nobility_change_propagates_to_commoners() {
        let service = FactionService::default();
        let impacts = service.calculate_faction_impact(&kingdom(), FactionType::Nobility, dec!(20));
        assert_eq!(impacts.get(&FactionType::Nobility), Some(&dec!(20)));
        assert_eq!(impacts.get(&FactionType::Commoners), Some(&dec!(-6)));
        assert_eq!(impacts.get(&FactionType::Military), Some(&dec!(4)));
        assert_eq!(impacts.len(), 5);
    }

    #[test]
    fn impact_does_not_mutate_kingdom() {
        let service = FactionService::default();
        let k = kingdom();
        let before = k.clone();
        let _ = service.calculate_faction_impact(&k, FactionType::Clergy, dec!(-40));
        assert_eq!(k, before);
    }

    #[test]
    fn impact_rounds_halves_up() {
        // 5 * -0.1 * 0.5 = -0.25 -> 0; 5 * 0.3 * 0.5 = 0.75 -> 1
        let service = FactionService::default();
        let impacts = service.calculate_faction_impact(&kingdom(), FactionType::Merchants, dec!(5));
        assert_eq!(impacts.get(&FactionType::Military), Some(&dec!(0)));
        assert_eq!(impacts.get(&FactionType::Commoners), Some(&dec!(1)));
        assert_eq!(round_half_up(dec!(-2.5)), dec!(-2));
        assert_eq!(round_half_up(dec!(2.5)), dec!(3));
    }

    #[test]
    fn applied_impacts_stay_clamped() {
        let service = FactionService::default();
        let mut k = kingdom();
        let impacts = service.calculate_faction_impact(&k, FactionType::Nobility, dec!(200));
        k.apply_faction_impacts(&impacts);
        assert_eq!(k.approval(FactionType::Nobility), dec!(100));
        assert_eq!(k.approval(FactionType::Commoners), dec!(0));
    }

    #[test]
    fn power_collapses_below_legitimacy_floor() {
        let service = FactionService::default();
        assert_eq!(
            service.calculate_faction_power(FactionType::Military, dec!(100)),
            dec!(35)
        );
        assert_eq!(
            service.calculate_faction_power(FactionType::Military, dec!(30)),
            dec!(10.5)
        );
        // 0.2^2 * 35
        assert_eq!(
            service.calculate_faction_power(FactionType::Military, dec!(20)),
            dec!(1.4)
        );
    }

    #[test]
    fn thresholds_select_event_severity() {
        let service = FactionService::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let id = KingdomId::new();
        let now = DateTime::<Utc>::UNIX_EPOCH;

        // Nobility: rebellion 15, unrest 30, discontent 45.
        let rebels = Faction::with_approval(FactionType::Nobility, dec!(15));
        let event = service.generate_faction_event(id, &rebels, &mut rng, now);
        assert_eq!(event.as_ref().map(|e| e.severity), Some(EventSeverity::Critical));
        assert_eq!(
            event.as_ref().map(|e| e.event_type),
            Some(EventType::FactionRebellion)
        );

        let restless = Faction::with_approval(FactionType::Nobility, dec!(30));
        let event = service.generate_faction_event(id, &restless, &mut rng, now);
        assert_eq!(event.map(|e| e.severity), Some(EventSeverity::Severe));

        let discontent = Faction::with_approval(FactionType::Nobility, dec!(40));
        assert!(service.generate_faction_event(id, &discontent, &mut rng, now).is_none());
    }

    #[test]
    fn generated_events_name_the_faction() {
        let service = FactionService::default();
        let mut rng = SmallRng::seed_from_u64(3);
        for seed_offset in 0..10 {
            let faction = Faction::with_approval(FactionType::Clergy, Decimal::from(seed_offset));
            let event =
                service.generate_faction_event(KingdomId::new(), &faction, &mut rng, Utc::now());
            let text = event.map(|e| format!("{} {}", e.title, e.description));
            assert!(text.is_some_and(|t| t.contains("Clergy")));
        }
    }

    #[test]
    fn kingdom_scan_reports_only_low_factions() {
        let service = FactionService::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut k = kingdom();
        k.apply_faction_change(FactionType::Military, dec!(-35));
        let events = service.generate_kingdom_events(&k, &mut rng, Utc::now());
        assert_eq!(events.len(), 1);
        assert!(events.iter().all(|e| e.faction == FactionType::Military));
    }
}
