//! Integration tests for a kingdom's full lifecycle through the core
//! services: founding, generation, faction politics, a complete event
//! chain, and a prestige reset.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal_macros::dec;

use dominion_core::catalog::{self, NOBLE_REBELLION};
use dominion_core::{
    EventChainManager, EventChainService, FactionService, GameTuning, Kingdom, PrestigeOutcome,
    ResolutionOutcome, ResourceGenerator, evaluate_achievements, resolve_event,
};
use dominion_types::{ChainContext, ChainId, EventId, FactionType, ResourceType};

// =============================================================================
// Helpers
// =============================================================================

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn found(tuning: &GameTuning) -> Kingdom {
    Kingdom::new("Camelot", Some("Arthur".to_owned()), &tuning.kingdom, epoch())
}

/// Manager with the built-in chains, where the noble rebellion always
/// spawns once its bounds hold.
fn eager_manager() -> EventChainManager {
    let mut manager = EventChainManager::new(EventChainService::new(catalog::builtin_rewards()));
    for mut chain in catalog::builtin_chains() {
        if chain.chain_id.as_str() == NOBLE_REBELLION {
            chain.condition.probability = 1.0;
        } else {
            chain.condition.probability = 0.0;
        }
        manager.register_chain(chain).unwrap();
    }
    manager
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn offline_generation_respects_cap() {
    let tuning = GameTuning::default();
    let mut kingdom = found(&tuning);
    kingdom.add_resource(ResourceType::Gold, dec!(9899));

    let generator = ResourceGenerator::new(&tuning);
    let progress = generator.calculate_offline_progress(&kingdom, 10);
    assert_eq!(progress[&ResourceType::Gold], dec!(1));

    kingdom.calculate_resource_generation(&tuning, epoch() + Duration::seconds(10));
    assert_eq!(kingdom.resources().gold, dec!(10000));
    kingdom.calculate_resource_generation(&tuning, epoch() + Duration::seconds(20));
    assert_eq!(kingdom.resources().gold, dec!(10000));
}

#[test]
fn noble_favour_costs_commoner_support() {
    let tuning = GameTuning::default();
    let service = FactionService::new(tuning.faction_tables.clone());
    let mut kingdom = found(&tuning);

    let impacts = service.calculate_faction_impact(&kingdom, FactionType::Nobility, dec!(20));
    assert_eq!(impacts[&FactionType::Nobility], dec!(20));
    assert_eq!(impacts[&FactionType::Commoners], dec!(-6));

    kingdom.apply_faction_impacts(&impacts);
    assert_eq!(kingdom.approval(FactionType::Nobility), dec!(70));
    assert_eq!(kingdom.approval(FactionType::Commoners), dec!(44));
}

#[test]
fn noble_rebellion_played_peacefully() {
    let tuning = GameTuning::default();
    let mut kingdom = found(&tuning);
    kingdom.add_resource(ResourceType::Gold, dec!(400));
    let mut manager = eager_manager();
    let mut rng = SmallRng::seed_from_u64(42);

    // Too early to spawn.
    assert!(manager.check_and_spawn_chains(&kingdom, 1, &mut rng).is_empty());

    let spawned = manager.check_and_spawn_chains(&kingdom, 3, &mut rng);
    assert_eq!(spawned.len(), 1);
    let mut current = spawned.into_iter().next().unwrap();
    assert_eq!(current.id, EventId::from("noble_rebellion_1"));

    let chain_id = ChainId::from(NOBLE_REBELLION);
    let mut context = ChainContext::new(kingdom.id(), chain_id.clone());
    let choices = [
        "investigate_peacefully",
        "negotiate_compromise",
        "peaceful_resolution",
    ];
    for (turn, choice) in choices.into_iter().enumerate() {
        let outcome =
            resolve_event(&mut kingdom, &current, choice, Some(&mut context), epoch()).unwrap();
        let ResolutionOutcome::Resolved(resolution) = outcome else {
            panic!("choice {choice} was rejected");
        };
        if resolution.chain_completed {
            assert_eq!(turn, 2);
            break;
        }
        let next = resolution.chain_step.unwrap().next_event_id.unwrap();
        current = manager.find_event(&next).unwrap().clone();
    }
    assert_eq!(context.previous_choices.len(), 3);

    let gold_before = kingdom.resources().gold;
    let reward = manager
        .process_chain_completion(&mut kingdom, &chain_id, &context)
        .unwrap();
    assert_eq!(reward.resources.gold, dec!(500));
    assert_eq!(kingdom.resources().gold, gold_before + dec!(500));

    // Paid once.
    assert!(
        manager
            .process_chain_completion(&mut kingdom, &chain_id, &context)
            .is_none()
    );

    // Cooldown holds even though the chain finished.
    for turn in 4..23 {
        assert!(manager.check_and_spawn_chains(&kingdom, turn, &mut rng).is_empty());
    }
    assert_eq!(manager.check_and_spawn_chains(&kingdom, 23, &mut rng).len(), 1);
}

#[test]
fn prestige_cycle() {
    let tuning = GameTuning::default();
    let mut kingdom = found(&tuning);
    kingdom.add_resource(ResourceType::Gold, dec!(2500));
    kingdom.apply_faction_change(FactionType::Clergy, dec!(30));

    let rejected = kingdom.perform_prestige(&tuning.prestige);
    assert!(matches!(
        rejected,
        PrestigeOutcome::Rejected {
            required: 10,
            current: 0,
            ..
        }
    ));
    assert_eq!(kingdom.prestige_level(), 0);

    for _ in 0..10 {
        kingdom.increment_completed_events();
    }
    let unlocked = evaluate_achievements(&mut kingdom);
    assert_eq!(unlocked.len(), 1);

    let performed = kingdom.perform_prestige(&tuning.prestige);
    assert!(matches!(
        performed,
        PrestigeOutcome::Performed { new_level: 1, .. }
    ));
    assert_eq!(kingdom.completed_events_count(), 0);
    assert_eq!(kingdom.resources().gold, dec!(100));
    assert_eq!(kingdom.approval(FactionType::Clergy), dec!(53));

    // Achievements survive the reset.
    assert!(kingdom.achievements().contains("chronicler"));
    assert_eq!(
        evaluate_achievements(&mut kingdom)
            .iter()
            .map(|a| a.key())
            .collect::<Vec<_>>(),
        vec!["first_prestige"]
    );

    // Prestige multiplies every rate by 1.1.
    let rates = ResourceGenerator::new(&tuning).calculate_generation_rates(&kingdom);
    assert_eq!(rates[&ResourceType::Gold], dec!(1.1));
}

#[test]
fn kingdom_survives_json_round_trip() {
    let tuning = GameTuning::default();
    let mut kingdom = found(&tuning);
    kingdom.add_resource(ResourceType::Knowledge, dec!(77));
    kingdom.apply_faction_change(FactionType::Military, dec!(-45));
    kingdom.increment_completed_events();

    let json = serde_json::to_string_pretty(&kingdom).unwrap();
    let back: Kingdom = serde_json::from_str(&json).unwrap();
    assert_eq!(back, kingdom);
    assert_eq!(back.stock().get(ResourceType::Knowledge), dec!(77));
}
