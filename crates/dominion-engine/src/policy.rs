//! Automatic decisions the headless driver takes on the ruler's behalf.

use dominion_core::{Kingdom, infer_chain_path};
use dominion_types::{AdvisorType, ChainPath, Event, EventChoice};

/// Pick a choice on `event`.
///
/// The first affordable choice leaning toward `preferred` wins; failing
/// that, the first affordable choice. `None` when nothing is affordable.
pub fn pick_choice<'e>(
    event: &'e Event,
    kingdom: &Kingdom,
    preferred: ChainPath,
) -> Option<&'e EventChoice> {
    let mut affordable = event
        .choices
        .iter()
        .filter(|c| c.requirements.is_met_by(kingdom.resources()));
    let fallback = affordable.clone().next();
    affordable
        .find(|c| infer_chain_path([c.id.as_str()]) == preferred)
        .or(fallback)
}

/// The first advisor office the kingdom has not filled yet.
pub fn next_advisor(kingdom: &Kingdom) -> Option<AdvisorType> {
    AdvisorType::ALL
        .into_iter()
        .find(|kind| kingdom.advisors().iter().all(|a| a.kind != *kind))
}
