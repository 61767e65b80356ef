//! Chain spawning and completion.
//!
//! The [`EventChainManager`] holds the registered chains and decides, once
//! per turn, which of them start. Each chain id cycles through
//! `Dormant -> Spawned -> Dormant`: it spawns when its [`SpawnCondition`]
//! holds, its cooldown since the last spawn has elapsed, and a uniform draw
//! lands under its probability. The spawn turn is recorded at once.
//! Whether the player ever finished the previous run is not consulted, and
//! a re-spawn drops the paid-out record of the kingdom's previous run, so
//! the history holds at most one finished run per kingdom and chain.
//!
//! Completing a chain resolves the path reward through the
//! [`EventChainService`] and applies its resources to the kingdom. Unlocks
//! are handed to an [`UnlockHook`]; the default hook ignores them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dominion_types::{ChainContext, ChainId, ChainReward, Event, EventId, KingdomId, ResourceType};

use crate::chain::EventChainService;
use crate::error::CoreError;
use crate::kingdom::Kingdom;

/// Gate on when a chain may start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnCondition {
    /// Earliest turn.
    #[serde(default)]
    pub min_turn: u64,
    /// Latest turn.
    #[serde(default)]
    pub max_turn: Option<u64>,
    /// Lowest kingdom stability.
    #[serde(default)]
    pub min_stability: Option<Decimal>,
    /// Highest kingdom stability.
    #[serde(default)]
    pub max_stability: Option<Decimal>,
    /// Least gold held.
    #[serde(default)]
    pub min_gold: Option<Decimal>,
    /// Least influence held.
    #[serde(default)]
    pub min_influence: Option<Decimal>,
    /// Chance in `[0, 1]` of spawning once every bound holds.
    pub probability: f64,
    /// Turns that must pass after a spawn before the next.
    #[serde(default)]
    pub cooldown_turns: u64,
}

impl SpawnCondition {
    /// Whether every deterministic bound holds for `kingdom` at `turn`.
    pub fn is_satisfied(&self, kingdom: &Kingdom, turn: u64) -> bool {
        if turn < self.min_turn {
            return false;
        }
        if self.max_turn.is_some_and(|max| turn > max) {
            return false;
        }
        let stability = kingdom.stability();
        if self.min_stability.is_some_and(|min| stability < min) {
            return false;
        }
        if self.max_stability.is_some_and(|max| stability > max) {
            return false;
        }
        let stock = kingdom.stock();
        if self
            .min_gold
            .is_some_and(|min| stock.get(ResourceType::Gold) < min)
        {
            return false;
        }
        if self
            .min_influence
            .is_some_and(|min| stock.get(ResourceType::Influence) < min)
        {
            return false;
        }
        true
    }
}

/// A chain the manager can spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDefinition {
    /// Chain id, also the reward-table key.
    pub chain_id: ChainId,
    /// The events, in order. Linked on registration.
    pub events: Vec<Event>,
    /// When the chain may start.
    pub condition: SpawnCondition,
}

/// Extension point for chain-completion unlocks.
///
/// Unlock names carry no kingdom semantics yet; the default implementation
/// does nothing.
pub trait UnlockHook {
    /// Called with the unlocks of a granted reward.
    fn apply_unlocks(&mut self, kingdom: &mut Kingdom, chain_id: &ChainId, unlocks: &[String]) {
        let _ = (kingdom, chain_id, unlocks);
    }
}

/// Unlock hook that ignores every unlock.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreUnlocks;

impl UnlockHook for IgnoreUnlocks {}

/// A finished chain run, kept so its reward is paid only once.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompletedRun {
    /// The kingdom that finished the run.
    pub kingdom_id: KingdomId,
    /// The chain.
    pub chain_id: ChainId,
    /// Timestamp of the run's last recorded choice.
    pub finished_at: Option<DateTime<Utc>>,
}

/// Persistable manager state.
///
/// Stores save it alongside the kingdom so cooldowns and payouts carry
/// over between runs of the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnHistory {
    /// Turns the driver has played. Spawn turns count on the same scale.
    #[serde(default)]
    pub turns_played: u64,
    /// Turn each chain last spawned on.
    #[serde(default)]
    pub last_spawn_turn: BTreeMap<ChainId, u64>,
    /// Runs whose reward has been paid.
    #[serde(default)]
    pub completed_runs: BTreeSet<CompletedRun>,
}

/// Registry of spawnable chains plus their spawn and completion history.
#[derive(Debug)]
pub struct EventChainManager<H = IgnoreUnlocks> {
    chains: Vec<ChainDefinition>,
    history: SpawnHistory,
    service: EventChainService,
    unlocks: H,
}

impl EventChainManager<IgnoreUnlocks> {
    /// A manager with no chains, resolving rewards through `service`.
    pub fn new(service: EventChainService) -> Self {
        Self::with_unlock_hook(service, IgnoreUnlocks)
    }
}

impl<H: UnlockHook> EventChainManager<H> {
    /// A manager that forwards unlocks to `unlocks`.
    pub fn with_unlock_hook(service: EventChainService, unlocks: H) -> Self {
        Self {
            chains: Vec::new(),
            history: SpawnHistory::default(),
            service,
            unlocks,
        }
    }

    /// Link a chain's events and register it. Re-registering an id
    /// replaces the previous definition.
    pub fn register_chain(&mut self, definition: ChainDefinition) -> Result<(), CoreError> {
        let ChainDefinition {
            chain_id,
            events,
            condition,
        } = definition;
        let events = EventChainService::link_chain(chain_id.clone(), events)?;
        self.chains.retain(|c| c.chain_id != chain_id);
        debug!(chain = %chain_id, events = events.len(), "chain registered");
        self.chains.push(ChainDefinition {
            chain_id,
            events,
            condition,
        });
        Ok(())
    }

    /// Registered chains.
    pub fn chains(&self) -> &[ChainDefinition] {
        &self.chains
    }

    /// The chain service rewards resolve through.
    pub const fn service(&self) -> &EventChainService {
        &self.service
    }

    /// Look up a registered (linked) event by id.
    pub fn find_event(&self, event_id: &EventId) -> Option<&Event> {
        self.chains
            .iter()
            .flat_map(|c| c.events.iter())
            .find(|e| &e.id == event_id)
    }

    /// Start every chain whose gate opens this turn and return the first
    /// event of each.
    pub fn check_and_spawn_chains(
        &mut self,
        kingdom: &Kingdom,
        current_turn: u64,
        rng: &mut impl Rng,
    ) -> Vec<Event> {
        let mut spawned = Vec::new();
        for chain in &self.chains {
            if let Some(&last) = self.history.last_spawn_turn.get(&chain.chain_id) {
                if current_turn.saturating_sub(last) < chain.condition.cooldown_turns
                    || current_turn < last
                {
                    continue;
                }
            }
            if !chain.condition.is_satisfied(kingdom, current_turn) {
                continue;
            }
            let roll: f64 = rng.random();
            if roll >= chain.condition.probability {
                continue;
            }
            let Some(first) = chain.events.first() else {
                continue;
            };

            self.history
                .last_spawn_turn
                .insert(chain.chain_id.clone(), current_turn);
            self.history
                .completed_runs
                .retain(|run| run.kingdom_id != kingdom.id() || run.chain_id != chain.chain_id);
            info!(
                kingdom = %kingdom.id(),
                chain = %chain.chain_id,
                turn = current_turn,
                "event chain spawned"
            );
            spawned.push(first.clone());
        }
        spawned
    }

    /// Pay out a finished chain run.
    ///
    /// Returns the reward that was applied, or `None` when the chain has no
    /// reward registered or this run was already paid.
    pub fn process_chain_completion(
        &mut self,
        kingdom: &mut Kingdom,
        chain_id: &ChainId,
        context: &ChainContext,
    ) -> Option<ChainReward> {
        let run = CompletedRun {
            kingdom_id: kingdom.id(),
            chain_id: chain_id.clone(),
            finished_at: context.previous_choices.last().map(|c| c.timestamp),
        };
        if self.history.completed_runs.contains(&run) {
            debug!(chain = %chain_id, "chain reward already granted");
            return None;
        }

        let reward = self.service.chain_completion_reward(chain_id, context)?;
        kingdom.apply_resource_delta(&reward.resources);
        self.unlocks
            .apply_unlocks(kingdom, chain_id, &reward.unlocks);
        self.history.completed_runs.insert(run);

        info!(
            kingdom = %kingdom.id(),
            chain = %chain_id,
            gold = %reward.resources.gold,
            influence = %reward.resources.influence,
            loyalty = %reward.resources.loyalty,
            "event chain completed"
        );
        Some(reward)
    }

    /// Copy out the spawn and completion history for persistence.
    pub fn export_history(&self) -> SpawnHistory {
        self.history.clone()
    }

    /// Replace the history with a previously exported one.
    pub fn restore_history(&mut self, history: SpawnHistory) {
        self.history = history;
    }

    /// Turns played so far according to the history.
    pub const fn turns_played(&self) -> u64 {
        self.history.turns_played
    }

    /// Record that `turns` turns have been played.
    pub fn set_turns_played(&mut self, turns: u64) {
        self.history.turns_played = turns;
    }

    /// Turn `chain_id` last spawned on.
    pub fn last_spawn_turn(&self, chain_id: &ChainId) -> Option<u64> {
        self.history.last_spawn_turn.get(chain_id).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;

    use dominion_types::{ChainChoice, EventChoice, EventConsequence, EventSeverity, EventType};

    use crate::catalog;
    use crate::config::KingdomTuning;

    use super::*;

    fn kingdom() -> Kingdom {
        Kingdom::new("Avalon", None, &KingdomTuning::default(), DateTime::<Utc>::UNIX_EPOCH)
    }

    fn always(cooldown_turns: u64) -> SpawnCondition {
        SpawnCondition {
            min_turn: 0,
            max_turn: None,
            min_stability: None,
            max_stability: None,
            min_gold: None,
            min_influence: None,
            probability: 1.0,
            cooldown_turns,
        }
    }

    fn definition(id: &str, condition: SpawnCondition) -> ChainDefinition {
        let event = |n: u32| {
            Event::new(
                format!("{id}_{n}"),
                "t",
                "d",
                EventType::Political,
                EventSeverity::Moderate,
            )
            .with_choice(EventChoice::new(
                "negotiate",
                "n",
                EventConsequence::described("n"),
            ))
        };
        ChainDefinition {
            chain_id: ChainId::from(id),
            events: vec![event(1), event(2)],
            condition,
        }
    }

    fn manager_with(defs: Vec<ChainDefinition>) -> EventChainManager {
        let mut manager = EventChainManager::new(EventChainService::new(catalog::builtin_rewards()));
        for def in defs {
            assert!(manager.register_chain(def).is_ok());
        }
        manager
    }

    #[test]
    fn spawns_first_event_only() {
        let mut manager = manager_with(vec![definition("alpha", always(5))]);
        let mut rng = SmallRng::seed_from_u64(1);
        let spawned = manager.check_and_spawn_chains(&kingdom(), 0, &mut rng);
        assert_eq!(spawned.len(), 1);
        let first = spawned.first();
        assert_eq!(first.map(|e| e.id.as_str()), Some("alpha_1"));
        assert!(first.is_some_and(Event::is_chain_start));
        assert_eq!(manager.last_spawn_turn(&ChainId::from("alpha")), Some(0));
    }

    #[test]
    fn never_respawns_within_cooldown() {
        let mut manager = manager_with(vec![definition("alpha", always(4))]);
        let mut rng = SmallRng::seed_from_u64(2);
        let k = kingdom();
        let spawn_turns: Vec<u64> = (0..20)
            .filter(|&turn| !manager.check_and_spawn_chains(&k, turn, &mut rng).is_empty())
            .collect();
        assert_eq!(spawn_turns, vec![0, 4, 8, 12, 16]);
    }

    #[test]
    fn several_chains_can_spawn_together() {
        let mut manager =
            manager_with(vec![definition("alpha", always(3)), definition("beta", always(3))]);
        let mut rng = SmallRng::seed_from_u64(3);
        let spawned = manager.check_and_spawn_chains(&kingdom(), 1, &mut rng);
        assert_eq!(spawned.len(), 2);
    }

    #[test]
    fn zero_probability_never_spawns() {
        let condition = SpawnCondition {
            probability: 0.0,
            ..always(0)
        };
        let mut manager = manager_with(vec![definition("alpha", condition)]);
        let mut rng = SmallRng::seed_from_u64(4);
        let k = kingdom();
        for turn in 0..50 {
            assert!(manager.check_and_spawn_chains(&k, turn, &mut rng).is_empty());
        }
        assert_eq!(manager.last_spawn_turn(&ChainId::from("alpha")), None);
    }

    #[test]
    fn bounds_gate_spawning() {
        let condition = SpawnCondition {
            min_turn: 3,
            max_turn: Some(5),
            min_gold: Some(dec!(150)),
            max_stability: Some(dec!(60)),
            ..always(0)
        };
        let mut manager = manager_with(vec![definition("alpha", condition)]);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut k = kingdom();

        assert!(manager.check_and_spawn_chains(&k, 4, &mut rng).is_empty());
        k.add_resource(ResourceType::Gold, dec!(100));
        assert!(manager.check_and_spawn_chains(&k, 2, &mut rng).is_empty());
        assert!(manager.check_and_spawn_chains(&k, 6, &mut rng).is_empty());
        assert_eq!(manager.check_and_spawn_chains(&k, 3, &mut rng).len(), 1);
    }

    #[test]
    fn stability_bounds_read_mean_approval() {
        let condition = SpawnCondition {
            min_stability: Some(dec!(55)),
            ..always(0)
        };
        let mut manager = manager_with(vec![definition("alpha", condition)]);
        let mut rng = SmallRng::seed_from_u64(6);
        let mut k = kingdom();
        assert!(manager.check_and_spawn_chains(&k, 1, &mut rng).is_empty());
        k.apply_stability_change(dec!(10));
        assert_eq!(manager.check_and_spawn_chains(&k, 1, &mut rng).len(), 1);
    }

    #[test]
    fn too_short_chain_is_rejected() {
        let mut manager = EventChainManager::new(EventChainService::default());
        let mut def = definition("alpha", always(0));
        def.events.truncate(1);
        assert!(matches!(
            manager.register_chain(def),
            Err(CoreError::ChainTooShort { count: 1 })
        ));
    }

    #[test]
    fn completion_applies_reward_once() {
        let mut manager = manager_with(catalog::builtin_chains());
        let mut k = kingdom();
        let mut ctx = ChainContext::new(k.id(), ChainId::from("noble_rebellion"));
        for id in ["show_force", "prepare_suppression", "force_surrender"] {
            ctx.previous_choices.push(ChainChoice {
                event_id: EventId::from("x"),
                choice_id: id.to_owned(),
                timestamp: DateTime::<Utc>::UNIX_EPOCH,
            });
        }

        let reward = manager.process_chain_completion(&mut k, &ChainId::from("noble_rebellion"), &ctx);
        assert!(reward.is_some());
        assert_eq!(k.resources().gold, dec!(300));
        assert_eq!(k.resources().military_power, dec!(160));
        assert_eq!(k.resources().loyalty, dec!(0));

        let again = manager.process_chain_completion(&mut k, &ChainId::from("noble_rebellion"), &ctx);
        assert!(again.is_none());
        assert_eq!(k.resources().gold, dec!(300));
    }

    #[derive(Default)]
    struct RecordingHook {
        seen: Vec<String>,
    }

    impl UnlockHook for RecordingHook {
        fn apply_unlocks(&mut self, _kingdom: &mut Kingdom, _chain_id: &ChainId, unlocks: &[String]) {
            self.seen.extend(unlocks.iter().cloned());
        }
    }

    #[test]
    fn unlocks_reach_the_hook() {
        let mut manager = EventChainManager::with_unlock_hook(
            EventChainService::new(catalog::builtin_rewards()),
            RecordingHook::default(),
        );
        let mut k = kingdom();
        let ctx = ChainContext::new(k.id(), ChainId::from("noble_rebellion"));
        let reward = manager.process_chain_completion(&mut k, &ChainId::from("noble_rebellion"), &ctx);
        let unlocks = reward.unwrap().unlocks;
        assert!(!unlocks.is_empty());
        assert_eq!(manager.unlocks.seen, unlocks);
    }

    #[test]
    fn history_survives_export_and_restore() {
        let mut manager = manager_with(vec![definition("alpha", always(10))]);
        let mut rng = SmallRng::seed_from_u64(8);
        let k = kingdom();
        assert_eq!(manager.check_and_spawn_chains(&k, 2, &mut rng).len(), 1);

        let saved = manager.export_history();
        let mut fresh = manager_with(vec![definition("alpha", always(10))]);
        fresh.restore_history(saved);
        assert!(fresh.check_and_spawn_chains(&k, 5, &mut rng).is_empty());
        assert_eq!(fresh.check_and_spawn_chains(&k, 12, &mut rng).len(), 1);
    }

    #[test]
    fn respawn_forgets_the_paid_run() {
        let mut manager = manager_with(catalog::builtin_chains());
        let mut rng = SmallRng::seed_from_u64(9);
        let mut k = kingdom();
        let noble = ChainId::from("noble_rebellion");
        let ctx = ChainContext::new(k.id(), noble.clone());

        assert!(manager.process_chain_completion(&mut k, &noble, &ctx).is_some());
        let someone_else = CompletedRun {
            kingdom_id: KingdomId::new(),
            chain_id: noble.clone(),
            finished_at: None,
        };
        manager.history.completed_runs.insert(someone_else.clone());
        assert_eq!(manager.history.completed_runs.len(), 2);

        // Walk turns until the chain starts again.
        let respawned = (0..500).any(|turn| {
            manager
                .check_and_spawn_chains(&k, turn, &mut rng)
                .iter()
                .any(|e| e.chain_id() == Some(&noble))
        });
        assert!(respawned);
        let left: Vec<_> = manager.history.completed_runs.iter().cloned().collect();
        assert_eq!(left, vec![someone_else]);
    }

    #[test]
    fn turns_played_travels_with_the_history() {
        let mut manager = manager_with(Vec::new());
        manager.set_turns_played(17);
        let mut fresh = manager_with(Vec::new());
        fresh.restore_history(manager.export_history());
        assert_eq!(fresh.turns_played(), 17);
    }
}
