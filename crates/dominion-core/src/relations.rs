//! Static faction tables: the relation graph, approval thresholds and base
//! power per faction kind.
//!
//! The tables are plain data. [`FactionTables::default`] carries the stock
//! balance; the config file can override any part of it, and the result is
//! handed to [`FactionService`] at construction.
//!
//! Relation weights are directed: `relation(A, B)` is how much faction B
//! reacts to a change in A's standing. The graph is not required to be
//! symmetric.
//!
//! [`FactionService`]: crate::factions::FactionService

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dominion_types::FactionType;

/// Approval cutoffs for one faction kind.
///
/// Only `rebellion` and `unrest` trigger events. `discontent`, `stable` and
/// `supportive` are descriptive bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalThresholds {
    /// At or below: critical rebellion events.
    pub rebellion: Decimal,
    /// At or below (and above `rebellion`): severe unrest events.
    pub unrest: Decimal,
    /// At or below: openly discontent (no event).
    pub discontent: Decimal,
    /// At or above: stable.
    pub stable: Decimal,
    /// At or above: actively supportive.
    pub supportive: Decimal,
}

impl ApprovalThresholds {
    fn of(rebellion: i64, unrest: i64, discontent: i64, stable: i64, supportive: i64) -> Self {
        Self {
            rebellion: Decimal::from(rebellion),
            unrest: Decimal::from(unrest),
            discontent: Decimal::from(discontent),
            stable: Decimal::from(stable),
            supportive: Decimal::from(supportive),
        }
    }
}

impl Default for ApprovalThresholds {
    fn default() -> Self {
        Self::of(15, 30, 45, 60, 80)
    }
}

/// Relation graph, thresholds and base power for every faction kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionTables {
    /// `relations[A][B]`: weight of B's reaction to a change in A.
    pub relations: BTreeMap<FactionType, BTreeMap<FactionType, Decimal>>,
    /// Approval cutoffs per kind.
    pub thresholds: BTreeMap<FactionType, ApprovalThresholds>,
    /// Power at full approval per kind.
    pub base_power: BTreeMap<FactionType, Decimal>,
}

impl FactionTables {
    /// Weight of `to`'s reaction to a change in `from`. Missing entries
    /// (including self-relations) are zero.
    pub fn relation(&self, from: FactionType, to: FactionType) -> Decimal {
        self.relations
            .get(&from)
            .and_then(|row| row.get(&to))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Thresholds for a kind, falling back to the generic cutoffs.
    pub fn thresholds(&self, kind: FactionType) -> ApprovalThresholds {
        self.thresholds.get(&kind).copied().unwrap_or_default()
    }

    /// Base power for a kind. Missing entries are zero.
    pub fn base_power(&self, kind: FactionType) -> Decimal {
        self.base_power.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }
}

impl Default for FactionTables {
    fn default() -> Self {
        use FactionType::{Clergy, Commoners, Merchants, Military, Nobility};

        let row = |entries: [(FactionType, i64); 4]| -> BTreeMap<FactionType, Decimal> {
            // Weights are authored in tenths.
            entries
                .into_iter()
                .map(|(kind, tenths)| (kind, Decimal::new(tenths, 1)))
                .collect()
        };

        let relations = BTreeMap::from([
            (
                Nobility,
                row([(Merchants, -2), (Military, 4), (Clergy, 3), (Commoners, -6)]),
            ),
            (
                Merchants,
                row([(Nobility, -2), (Military, -1), (Clergy, -1), (Commoners, 3)]),
            ),
            (
                Military,
                row([(Nobility, 4), (Merchants, -1), (Clergy, 1), (Commoners, -2)]),
            ),
            (
                Clergy,
                row([(Nobility, 3), (Merchants, -3), (Military, 1), (Commoners, 4)]),
            ),
            (
                Commoners,
                row([(Nobility, -5), (Merchants, 3), (Military, -2), (Clergy, 4)]),
            ),
        ]);

        let thresholds = BTreeMap::from([
            (Nobility, ApprovalThresholds::of(15, 30, 45, 60, 80)),
            (Merchants, ApprovalThresholds::of(10, 25, 40, 60, 75)),
            (Military, ApprovalThresholds::of(20, 35, 50, 65, 85)),
            (Clergy, ApprovalThresholds::of(10, 25, 40, 55, 75)),
            (Commoners, ApprovalThresholds::of(20, 35, 45, 60, 80)),
        ]);

        let base_power = BTreeMap::from([
            (Nobility, Decimal::from(30)),
            (Merchants, Decimal::from(25)),
            (Military, Decimal::from(35)),
            (Clergy, Decimal::from(20)),
            (Commoners, Decimal::from(15)),
        ]);

        Self {
            relations,
            thresholds,
            base_power,
        }
    }
}
