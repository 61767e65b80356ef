//! Event chains: linking, choice recording, path inference and rewards.
//!
//! A chain is an ordered run of at least two [`Event`]s sharing one
//! [`ChainId`]. Linking assigns 1-based positions, the chain length, and
//! predecessor/successor ids; the inputs are consumed and linked copies are
//! returned, so an event is never mutated after construction.
//!
//! The path a player took through a chain is inferred from the bag of
//! recorded choice ids by substring markers (see [`infer_chain_path`]) and
//! selects the peaceful or aggressive reward from a [`ChainRewardTable`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dominion_types::{
    ChainChoice, ChainContext, ChainId, ChainLink, ChainPath, ChainReward, Event, EventChoice,
    EventId,
};

use crate::error::CoreError;

/// Choice-id fragments that count toward the peaceful path.
pub const PEACEFUL_MARKERS: [&str; 4] = ["peaceful", "negotiate", "cooperate", "embrace"];

/// Choice-id fragments that count toward the aggressive path.
pub const AGGRESSIVE_MARKERS: [&str; 4] = ["force", "control", "suppress", "secular"];

/// Classify a chain run from its recorded choice ids.
///
/// Each id scores at most one point per group: one for peaceful if it
/// contains any peaceful marker, one for aggressive if it contains any
/// aggressive marker. Peaceful wins only on a strictly larger score; ties
/// (including no signal at all) resolve to [`ChainPath::Aggressive`].
pub fn infer_chain_path<'a>(choice_ids: impl IntoIterator<Item = &'a str>) -> ChainPath {
    let (peaceful, aggressive) =
        choice_ids
            .into_iter()
            .fold((0_usize, 0_usize), |(peaceful, aggressive), id| {
                let p = PEACEFUL_MARKERS.iter().any(|m| id.contains(m));
                let a = AGGRESSIVE_MARKERS.iter().any(|m| id.contains(m));
                (
                    peaceful.saturating_add(usize::from(p)),
                    aggressive.saturating_add(usize::from(a)),
                )
            });
    if peaceful > aggressive {
        ChainPath::Peaceful
    } else {
        ChainPath::Aggressive
    }
}

/// Rewards for both ways through one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewards {
    /// Granted when the run resolves peacefully.
    pub peaceful: ChainReward,
    /// Granted when the run resolves aggressively.
    pub aggressive: ChainReward,
}

impl PathRewards {
    /// The reward for `path`.
    pub const fn for_path(&self, path: ChainPath) -> &ChainReward {
        match path {
            ChainPath::Peaceful => &self.peaceful,
            ChainPath::Aggressive => &self.aggressive,
        }
    }
}

/// Path-specific completion rewards keyed by chain id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainRewardTable {
    rewards: BTreeMap<ChainId, PathRewards>,
}

impl ChainRewardTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            rewards: BTreeMap::new(),
        }
    }

    /// Register (or replace) the rewards for a chain.
    pub fn insert(&mut self, chain_id: ChainId, rewards: PathRewards) {
        self.rewards.insert(chain_id, rewards);
    }

    /// Rewards for a chain, if registered.
    pub fn get(&self, chain_id: &ChainId) -> Option<&PathRewards> {
        self.rewards.get(chain_id)
    }

    /// Number of chains with rewards.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Whether no chain has rewards.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// What resolving one chain event hands forward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    /// The event to present next; `None` at the end of the chain or for
    /// standalone events.
    pub next_event_id: Option<EventId>,
    /// Modifiers the next event should apply.
    pub modifiers: BTreeMap<String, Decimal>,
}

/// Chain linking, choice recording and reward resolution.
#[derive(Debug, Clone, Default)]
pub struct EventChainService {
    rewards: ChainRewardTable,
}

impl EventChainService {
    /// A service over the given reward table.
    pub const fn new(rewards: ChainRewardTable) -> Self {
        Self { rewards }
    }

    /// The reward table.
    pub const fn rewards(&self) -> &ChainRewardTable {
        &self.rewards
    }

    /// Link `events` into a new chain under a freshly generated id.
    pub fn create_event_chain(events: Vec<Event>) -> Result<Vec<Event>, CoreError> {
        Self::link_chain(ChainId::generate(), events)
    }

    /// Link `events` into a chain under the given id.
    ///
    /// Fails with [`CoreError::ChainTooShort`] for fewer than two events.
    pub fn link_chain(chain_id: ChainId, events: Vec<Event>) -> Result<Vec<Event>, CoreError> {
        if events.len() < 2 {
            return Err(CoreError::ChainTooShort {
                count: events.len(),
            });
        }

        let length = u32::try_from(events.len()).unwrap_or(u32::MAX);
        let ids: Vec<EventId> = events.iter().map(|e| e.id.clone()).collect();

        let linked: Vec<Event> = events
            .into_iter()
            .enumerate()
            .map(|(idx, event)| {
                let previous_event_id = idx.checked_sub(1).and_then(|p| ids.get(p)).cloned();
                let next_event_id = idx.checked_add(1).and_then(|n| ids.get(n)).cloned();
                let position = u32::try_from(idx)
                    .unwrap_or(u32::MAX)
                    .saturating_add(1);
                event.with_chain_link(ChainLink {
                    chain_id: chain_id.clone(),
                    position,
                    length,
                    previous_event_id,
                    next_event_id,
                })
            })
            .collect();

        debug!(chain = %chain_id, length, "event chain linked");
        Ok(linked)
    }

    /// The successor of `event`, if any.
    pub fn next_in_chain(event: &Event) -> Option<&EventId> {
        event.next_event_id()
    }

    /// Record a choice on a chain event and hand forward the successor id
    /// and the choice's modifiers.
    ///
    /// Standalone events are a no-op returning an empty step.
    pub fn process_chain_choice(
        event: &Event,
        choice: &EventChoice,
        context: &mut ChainContext,
        now: DateTime<Utc>,
    ) -> ChainStep {
        let Some(link) = event.chain.as_ref() else {
            return ChainStep::default();
        };

        context.previous_choices.push(ChainChoice {
            event_id: event.id.clone(),
            choice_id: choice.id.clone(),
            timestamp: now,
        });
        context.current_position = link.position;

        debug!(
            chain = %link.chain_id,
            event = %event.id,
            choice = %choice.id,
            position = link.position,
            "chain choice recorded"
        );

        ChainStep {
            next_event_id: link.next_event_id.clone(),
            modifiers: choice
                .chain_data
                .as_ref()
                .map(|d| d.next_event_modifier.clone())
                .unwrap_or_default(),
        }
    }

    /// The reward for the path recorded in `context`, if the chain has
    /// rewards registered.
    pub fn chain_completion_reward(
        &self,
        chain_id: &ChainId,
        context: &ChainContext,
    ) -> Option<ChainReward> {
        let rewards = self.rewards.get(chain_id)?;
        let path = infer_chain_path(context.choice_ids());
        debug!(chain = %chain_id, ?path, "chain path inferred");
        Some(rewards.for_path(path).clone())
    }

    /// True iff `event` has no successor.
    pub fn is_chain_complete(event: &Event) -> bool {
        event.is_chain_end()
    }
}
