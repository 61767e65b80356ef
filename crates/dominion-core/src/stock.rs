//! The authoritative per-resource holdings of a kingdom.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dominion_types::ResourceType;

/// Capped `ResourceType -> amount` map.
///
/// Every mutation keeps each amount within `[0, cap]`. Every
/// [`ResourceType`] has an entry, so reads never miss. Both hold after
/// loading too: stored amounts are clamped and missing entries read as
/// zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StockRecord")]
pub struct ResourceStock {
    amounts: BTreeMap<ResourceType, Decimal>,
    cap: Decimal,
}

/// Stored form of a [`ResourceStock`].
#[derive(Deserialize)]
struct StockRecord {
    #[serde(default)]
    amounts: BTreeMap<ResourceType, Decimal>,
    cap: Decimal,
}

impl From<StockRecord> for ResourceStock {
    fn from(record: StockRecord) -> Self {
        Self::with_amounts(record.cap, &record.amounts)
    }
}

impl ResourceStock {
    /// An empty stock with the given ceiling.
    pub fn empty(cap: Decimal) -> Self {
        Self {
            amounts: ResourceType::ALL
                .into_iter()
                .map(|r| (r, Decimal::ZERO))
                .collect(),
            cap: cap.max(Decimal::ZERO),
        }
    }

    /// A stock seeded from `initial`, clamped to the ceiling.
    pub fn with_amounts(cap: Decimal, initial: &BTreeMap<ResourceType, Decimal>) -> Self {
        let mut stock = Self::empty(cap);
        for (&resource, &amount) in initial {
            stock.set(resource, amount);
        }
        stock
    }

    /// The ceiling every amount is held under.
    pub const fn cap(&self) -> Decimal {
        self.cap
    }

    /// Current amount of `resource`.
    pub fn get(&self, resource: ResourceType) -> Decimal {
        self.amounts.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Room left below the ceiling for `resource`.
    pub fn headroom(&self, resource: ResourceType) -> Decimal {
        self.cap.saturating_sub(self.get(resource)).max(Decimal::ZERO)
    }

    /// Whether `resource` sits at the ceiling.
    pub fn is_full(&self, resource: ResourceType) -> bool {
        self.get(resource) >= self.cap
    }

    /// Overwrite the amount of `resource`, clamped to `[0, cap]`.
    pub fn set(&mut self, resource: ResourceType, amount: Decimal) {
        let clamped = amount.clamp(Decimal::ZERO, self.cap);
        self.amounts.insert(resource, clamped);
    }

    /// Add a signed amount to `resource`, clamped to `[0, cap]`. Returns
    /// the new amount.
    pub fn add(&mut self, resource: ResourceType, amount: Decimal) -> Decimal {
        let next = self.get(resource).saturating_add(amount);
        self.set(resource, next);
        self.get(resource)
    }

    /// Whether every entry of `cost` is covered.
    pub fn can_afford(&self, cost: &BTreeMap<ResourceType, Decimal>) -> bool {
        cost.iter().all(|(&resource, &amount)| self.get(resource) >= amount)
    }

    /// Deduct `cost` if affordable. Leaves the stock untouched and returns
    /// `false` otherwise.
    pub fn try_spend(&mut self, cost: &BTreeMap<ResourceType, Decimal>) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (&resource, &amount) in cost {
            self.add(resource, amount.saturating_mul(Decimal::NEGATIVE_ONE));
        }
        true
    }

    /// Replace every amount with `baseline`; resources absent from it drop
    /// to zero.
    pub fn reset_to(&mut self, baseline: &BTreeMap<ResourceType, Decimal>) {
        for resource in ResourceType::ALL {
            let amount = baseline.get(&resource).copied().unwrap_or(Decimal::ZERO);
            self.set(resource, amount);
        }
    }

    /// Iterate `(resource, amount)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, Decimal)> + '_ {
        self.amounts.iter().map(|(&r, &a)| (r, a))
    }

    /// Copy the amounts out as a plain map.
    pub fn to_map(&self) -> BTreeMap<ResourceType, Decimal> {
        self.amounts.clone()
    }
}
