//! Achievements: milestones recorded once in the kingdom's unlocked set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use dominion_types::{Mood, ResourceType};

use crate::kingdom::Kingdom;

/// Military power needed for [`Achievement::IronFist`].
const IRON_FIST_MILITARY_POWER: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Completed events needed for [`Achievement::Chronicler`].
const CHRONICLER_EVENTS: u32 = 10;

/// A milestone a kingdom can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    /// Completed a prestige reset.
    FirstPrestige,
    /// Filled the treasury to the cap.
    FullTreasury,
    /// Every faction is Content or Loyal.
    BelovedRuler,
    /// A faction is Hostile while the army is strong.
    IronFist,
    /// Resolved ten events in one prestige cycle.
    Chronicler,
}

impl Achievement {
    /// Every achievement.
    pub const ALL: [Self; 5] = [
        Self::FirstPrestige,
        Self::FullTreasury,
        Self::BelovedRuler,
        Self::IronFist,
        Self::Chronicler,
    ];

    /// Key stored in the kingdom's unlocked set.
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstPrestige => "first_prestige",
            Self::FullTreasury => "full_treasury",
            Self::BelovedRuler => "beloved_ruler",
            Self::IronFist => "iron_fist",
            Self::Chronicler => "chronicler",
        }
    }

    /// Whether `kingdom` currently meets the condition.
    pub fn is_met(self, kingdom: &Kingdom) -> bool {
        match self {
            Self::FirstPrestige => kingdom.prestige_level() >= 1,
            Self::FullTreasury => kingdom.stock().is_full(ResourceType::Gold),
            Self::BelovedRuler => kingdom.factions().all(|f| f.mood() >= Mood::Content),
            Self::IronFist => {
                kingdom.resources().military_power >= IRON_FIST_MILITARY_POWER
                    && kingdom.factions().any(|f| f.mood() == Mood::Hostile)
            }
            Self::Chronicler => kingdom.completed_events_count() >= CHRONICLER_EVENTS,
        }
    }
}

/// Unlock every achievement the kingdom now meets and return the new ones.
pub fn evaluate_achievements(kingdom: &mut Kingdom) -> Vec<Achievement> {
    let unlocked: Vec<Achievement> = Achievement::ALL
        .into_iter()
        .filter(|a| a.is_met(kingdom))
        .filter(|a| !kingdom.achievements().contains(a.key()))
        .collect();
    for achievement in &unlocked {
        kingdom.unlock_achievement(achievement.key());
        info!(kingdom = %kingdom.id(), achievement = achievement.key(), "achievement unlocked");
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    use dominion_types::{FactionType, ResourceDelta};

    use crate::config::KingdomTuning;

    use super::*;

    fn kingdom() -> Kingdom {
        Kingdom::new("Avalon", None, &KingdomTuning::default(), DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn fresh_kingdom_has_nothing() {
        let mut k = kingdom();
        assert!(evaluate_achievements(&mut k).is_empty());
    }

    #[test]
    fn unlocks_only_once() {
        let mut k = kingdom();
        k.add_resource(ResourceType::Gold, dec!(20000));
        assert_eq!(evaluate_achievements(&mut k), vec![Achievement::FullTreasury]);
        assert!(evaluate_achievements(&mut k).is_empty());
        assert!(k.achievements().contains("full_treasury"));
    }

    #[test]
    fn beloved_ruler_needs_every_faction() {
        let mut k = kingdom();
        k.apply_stability_change(dec!(15));
        k.apply_faction_change(FactionType::Clergy, dec!(-10));
        assert!(!Achievement::BelovedRuler.is_met(&k));
        k.apply_faction_change(FactionType::Clergy, dec!(10));
        assert!(Achievement::BelovedRuler.is_met(&k));
    }

    #[test]
    fn iron_fist_needs_army_and_enemies() {
        let mut k = kingdom();
        k.apply_faction_change(FactionType::Commoners, dec!(-40));
        assert!(!Achievement::IronFist.is_met(&k));
        k.apply_resource_delta(&ResourceDelta::default().with_military_power(dec!(490)));
        assert!(Achievement::IronFist.is_met(&k));
    }

    #[test]
    fn chronicler_counts_events() {
        let mut k = kingdom();
        for _ in 0..10 {
            k.increment_completed_events();
        }
        assert_eq!(evaluate_achievements(&mut k), vec![Achievement::Chronicler]);
    }
}
