//! Hiring advisors.
//!
//! Running out of slots or coin is an expected outcome, so both come back
//! as [`HireOutcome::Rejected`] rather than an error.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use dominion_types::{Advisor, AdvisorId, AdvisorType, ResourceType};

use crate::config::GameTuning;
use crate::error::CoreError;
use crate::kingdom::Kingdom;

/// Result of a hiring attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HireOutcome {
    /// The advisor took office.
    Hired(Advisor),
    /// Nothing changed.
    Rejected {
        /// Player-facing explanation.
        message: String,
        /// The price, when the treasury was the problem.
        cost: Option<BTreeMap<ResourceType, Decimal>>,
    },
}

/// Advisor slots available to `kingdom`: the base allowance plus one per
/// prestige level.
pub fn advisor_slots(kingdom: &Kingdom, tuning: &GameTuning) -> u32 {
    tuning
        .kingdom
        .base_advisor_slots
        .saturating_add(kingdom.prestige_bonuses().advisor_slots)
}

/// Hiring cost of `kind`; empty (free) when unconfigured.
pub fn advisor_cost(kind: AdvisorType, tuning: &GameTuning) -> BTreeMap<ResourceType, Decimal> {
    tuning
        .advisors
        .get(&kind)
        .map(|a| a.cost.clone())
        .unwrap_or_default()
}

/// Try to hire an advisor of `kind`.
pub fn hire_advisor(
    kingdom: &mut Kingdom,
    kind: AdvisorType,
    name: impl Into<String>,
    tuning: &GameTuning,
    now: DateTime<Utc>,
) -> HireOutcome {
    let slots = advisor_slots(kingdom, tuning);
    let held = u32::try_from(kingdom.advisors().len()).unwrap_or(u32::MAX);
    if held >= slots {
        return HireOutcome::Rejected {
            message: format!("All {slots} advisor slots are filled"),
            cost: None,
        };
    }

    let cost = advisor_cost(kind, tuning);
    if !kingdom.try_spend(&cost) {
        return HireOutcome::Rejected {
            message: format!("Not enough resources to hire a {kind:?}"),
            cost: Some(cost),
        };
    }

    let advisor = Advisor {
        id: AdvisorId::new(),
        kind,
        name: name.into(),
        hired_at: now,
    };
    kingdom.add_advisor(advisor.clone());
    info!(
        kingdom = %kingdom.id(),
        advisor = %advisor.id,
        kind = ?kind,
        "advisor hired"
    );
    HireOutcome::Hired(advisor)
}

/// [`hire_advisor`] by office name, e.g. `"treasurer"` or `"HighPriest"`.
///
/// An unknown office is a hard error; the kingdom is left untouched.
pub fn hire_advisor_by_name(
    kingdom: &mut Kingdom,
    office: &str,
    name: impl Into<String>,
    tuning: &GameTuning,
    now: DateTime<Utc>,
) -> Result<HireOutcome, CoreError> {
    let kind = AdvisorType::from_name(office).ok_or_else(|| CoreError::UnknownAdvisor {
        name: office.to_owned(),
    })?;
    Ok(hire_advisor(kingdom, kind, name, tuning, now))
}
