//! Resolving a player's choice on an event.
//!
//! A choice id that is not on the event is a programming error and fails
//! hard. An expired event or a choice the kingdom cannot afford is a normal
//! refusal ([`ResolutionOutcome::Rejected`]) and leaves the kingdom as it
//! was.
//!
//! On success the immediate consequence lands at once: its resource delta,
//! its stability delta on every faction, and its loyalty delta on the
//! loyalty resource. Long-term consequences are returned for the caller to
//! schedule. Chain events also record the choice in the chain context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use dominion_types::{ChainContext, Event, EventConsequence, EventId, ResourceType};

use crate::chain::{ChainStep, EventChainService};
use crate::error::CoreError;
use crate::kingdom::Kingdom;

/// A choice that took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The resolved event.
    pub event_id: EventId,
    /// The choice taken.
    pub choice_id: String,
    /// Consequences still to land, each with its delay in turns.
    pub long_term_effects: Vec<EventConsequence>,
    /// Chain bookkeeping; `None` for standalone events.
    pub chain_step: Option<ChainStep>,
    /// Whether this event closed its chain.
    pub chain_completed: bool,
}

/// Result of resolving a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// The choice took effect.
    Resolved(Resolution),
    /// The choice could not be taken; nothing changed.
    Rejected {
        /// Player-facing explanation.
        message: String,
    },
}

impl ResolutionOutcome {
    /// The resolution, when the choice took effect.
    pub fn into_resolved(self) -> Option<Resolution> {
        match self {
            Self::Resolved(resolution) => Some(resolution),
            Self::Rejected { .. } => None,
        }
    }
}

/// Apply one consequence to the kingdom.
pub fn apply_consequence(kingdom: &mut Kingdom, consequence: &EventConsequence) {
    kingdom.apply_resource_delta(&consequence.resources);
    if !consequence.stability.is_zero() {
        kingdom.apply_stability_change(consequence.stability);
    }
    if !consequence.loyalty.is_zero() {
        kingdom.add_resource(ResourceType::Loyalty, consequence.loyalty);
    }
}

/// Resolve `choice_id` on `event` for `kingdom`.
///
/// `context` must be the kingdom's context for the event's chain when the
/// event is a chain event. A context for another chain or another kingdom
/// is left untouched, as is any context passed with a standalone event.
pub fn resolve_event(
    kingdom: &mut Kingdom,
    event: &Event,
    choice_id: &str,
    context: Option<&mut ChainContext>,
    now: DateTime<Utc>,
) -> Result<ResolutionOutcome, CoreError> {
    let choice = event.choice(choice_id).ok_or_else(|| CoreError::UnknownChoice {
        event: event.id.clone(),
        choice: choice_id.to_owned(),
    })?;

    if event.is_expired(now) {
        return Ok(ResolutionOutcome::Rejected {
            message: format!("'{}' has expired", event.title),
        });
    }
    if !choice.requirements.is_met_by(kingdom.resources()) {
        return Ok(ResolutionOutcome::Rejected {
            message: format!("The realm cannot afford '{}'", choice.text),
        });
    }

    apply_consequence(kingdom, &choice.immediate_effect);
    kingdom.increment_completed_events();

    let chain_step = match (event.chain_id(), context) {
        (Some(chain_id), Some(ctx))
            if ctx.chain_id == *chain_id && ctx.kingdom_id == kingdom.id() =>
        {
            Some(EventChainService::process_chain_choice(event, choice, ctx, now))
        }
        (Some(chain_id), Some(ctx)) => {
            debug!(
                event = %event.id,
                chain = %chain_id,
                context_chain = %ctx.chain_id,
                "chain context does not belong to this event, not recorded"
            );
            None
        }
        _ => None,
    };
    let chain_completed = event.is_chain_event() && EventChainService::is_chain_complete(event);

    debug!(
        kingdom = %kingdom.id(),
        event = %event.id,
        choice = %choice.id,
        chain_completed,
        "event resolved"
    );

    Ok(ResolutionOutcome::Resolved(Resolution {
        event_id: event.id.clone(),
        choice_id: choice.id.clone(),
        long_term_effects: choice.long_term_effects.clone(),
        chain_step,
        chain_completed,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use dominion_types::{
        ChainId, EventChoice, KingdomId, EventSeverity, EventType, FactionType, ResourceDelta,
        ResourceRequirement,
    };

    use crate::config::KingdomTuning;

    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn kingdom() -> Kingdom {
        Kingdom::new("Avalon", None, &KingdomTuning::default(), epoch())
    }

    fn harvest() -> Event {
        Event::new(
            "harvest",
            "Bountiful Harvest",
            "The granaries overflow.",
            EventType::Economic,
            EventSeverity::Minor,
        )
        .with_choice(
            EventChoice::new(
                "sell_surplus",
                "Sell the surplus abroad",
                EventConsequence::described("Coin flows in.")
                    .with_resources(ResourceDelta::default().with_gold(dec!(40)))
                    .with_stability(dec!(-5))
                    .with_loyalty(dec!(-10)),
            )
            .with_long_term(EventConsequence::described("Bread prices rise.").delayed(2)),
        )
        .with_choice(
            EventChoice::new(
                "feast",
                "Hold a royal feast",
                EventConsequence::described("The realm celebrates.")
                    .with_stability(dec!(8)),
            )
            .requiring(ResourceRequirement {
                gold: dec!(500),
                ..ResourceRequirement::default()
            }),
        )
    }

    #[test]
    fn immediate_effect_lands() {
        let mut k = kingdom();
        let outcome = resolve_event(&mut k, &harvest(), "sell_surplus", None, epoch()).unwrap();
        assert_eq!(k.resources().gold, dec!(140));
        assert_eq!(k.resources().loyalty, dec!(40));
        assert_eq!(k.approval(FactionType::Clergy), dec!(45));
        assert_eq!(k.completed_events_count(), 1);
        let resolution = outcome.into_resolved().unwrap();
        assert_eq!(resolution.long_term_effects.len(), 1);
        assert!(resolution.chain_step.is_none());
        assert!(!resolution.chain_completed);
    }

    #[test]
    fn unaffordable_choice_is_rejected_softly() {
        let mut k = kingdom();
        let before = k.clone();
        let outcome = resolve_event(&mut k, &harvest(), "feast", None, epoch());
        assert!(matches!(outcome, Ok(ResolutionOutcome::Rejected { .. })));
        assert_eq!(k, before);
    }

    #[test]
    fn expired_event_is_rejected_softly() {
        let mut k = kingdom();
        let event = harvest().with_expiry(epoch() + Duration::minutes(5));
        let outcome = resolve_event(&mut k, &event, "sell_surplus", None, epoch() + Duration::hours(1));
        assert!(matches!(outcome, Ok(ResolutionOutcome::Rejected { .. })));
        assert_eq!(k.completed_events_count(), 0);
    }

    #[test]
    fn unknown_choice_is_a_hard_error() {
        let mut k = kingdom();
        let outcome = resolve_event(&mut k, &harvest(), "burn_it", None, epoch());
        assert!(matches!(outcome, Err(CoreError::UnknownChoice { .. })));
    }

    #[test]
    fn chain_events_record_the_choice() {
        let mut k = kingdom();
        let linked =
            EventChainService::link_chain(ChainId::from("harvests"), vec![harvest(), harvest()]);
        let linked = linked.unwrap();
        let mut ctx = ChainContext::new(k.id(), ChainId::from("harvests"));

        let mut completed = Vec::new();
        for event in &linked {
            let outcome = resolve_event(&mut k, event, "sell_surplus", Some(&mut ctx), epoch());
            completed.push(outcome.unwrap().into_resolved().unwrap().chain_completed);
        }
        assert_eq!(completed, vec![false, true]);
        assert_eq!(ctx.previous_choices.len(), 2);
        assert_eq!(ctx.current_position, 2);
    }

    #[test]
    fn context_for_another_chain_is_left_alone() {
        let mut k = kingdom();
        let linked =
            EventChainService::link_chain(ChainId::from("harvests"), vec![harvest(), harvest()])
                .unwrap();
        let mut foreign = ChainContext::new(k.id(), ChainId::from("famines"));
        let mut other_realm = ChainContext::new(KingdomId::new(), ChainId::from("harvests"));

        let first = linked.first().unwrap();
        let outcome = resolve_event(&mut k, first, "sell_surplus", Some(&mut foreign), epoch());
        let resolution = outcome.unwrap().into_resolved().unwrap();
        assert!(resolution.chain_step.is_none());
        assert!(foreign.previous_choices.is_empty());
        assert_eq!(foreign.current_position, 0);

        let outcome = resolve_event(&mut k, first, "sell_surplus", Some(&mut other_realm), epoch());
        assert!(outcome.unwrap().into_resolved().unwrap().chain_step.is_none());
        assert!(other_realm.previous_choices.is_empty());

        // The immediate effect still lands.
        assert_eq!(k.completed_events_count(), 2);
    }
}
