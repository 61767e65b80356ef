//! The faction entity: a bounded approval rating and the mood derived
//! from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dominion_types::{FactionType, Mood};

/// Lowest possible approval.
pub const MIN_APPROVAL: Decimal = Decimal::ZERO;

/// Highest possible approval.
pub const MAX_APPROVAL: Decimal = Decimal::ONE_HUNDRED;

/// Approval every faction starts at.
pub const NEUTRAL_APPROVAL: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// One political faction of a kingdom.
///
/// Fields are private so that `mood` can only ever change together with
/// `approval`. Loading re-clamps approval and re-derives mood; a stored
/// mood is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FactionRecord")]
pub struct Faction {
    kind: FactionType,
    name: String,
    approval: Decimal,
    mood: Mood,
}

/// Stored form of a [`Faction`].
#[derive(Deserialize)]
struct FactionRecord {
    kind: FactionType,
    #[serde(default)]
    name: String,
    approval: Decimal,
}

impl From<FactionRecord> for Faction {
    fn from(record: FactionRecord) -> Self {
        let mut faction = Self::with_approval(record.kind, record.approval);
        if !record.name.is_empty() {
            faction.name = record.name;
        }
        faction
    }
}

impl Faction {
    /// A faction of `kind` at neutral approval.
    pub fn new(kind: FactionType) -> Self {
        Self::with_approval(kind, NEUTRAL_APPROVAL)
    }

    /// A faction of `kind` at the given approval (clamped).
    pub fn with_approval(kind: FactionType, approval: Decimal) -> Self {
        let approval = approval.clamp(MIN_APPROVAL, MAX_APPROVAL);
        Self {
            kind,
            name: kind.name().to_owned(),
            approval,
            mood: Mood::from_approval(approval),
        }
    }

    /// Faction kind.
    pub const fn kind(&self) -> FactionType {
        self.kind
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Approval rating in `[0, 100]`.
    pub const fn approval(&self) -> Decimal {
        self.approval
    }

    /// Mood bucket of the current approval.
    pub const fn mood(&self) -> Mood {
        self.mood
    }

    /// Shift approval by `delta`, clamp to `[0, 100]`, and recompute mood.
    pub fn change_approval(&mut self, delta: Decimal) {
        self.set_approval(self.approval.saturating_add(delta));
    }

    /// Overwrite approval (clamped) and recompute mood.
    pub fn set_approval(&mut self, approval: Decimal) {
        self.approval = approval.clamp(MIN_APPROVAL, MAX_APPROVAL);
        self.mood = Mood::from_approval(self.approval);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_faction_is_neutral() {
        let faction = Faction::new(FactionType::Clergy);
        assert_eq!(faction.approval(), dec!(50));
        assert_eq!(faction.mood(), Mood::Neutral);
        assert_eq!(faction.name(), "Clergy");
    }

    #[test]
    fn approval_clamps_on_large_deltas() {
        let mut faction = Faction::new(FactionType::Nobility);
        faction.change_approval(dec!(-200));
        assert_eq!(faction.approval(), dec!(0));
        assert_eq!(faction.mood(), Mood::Hostile);

        faction.change_approval(dec!(500));
        assert_eq!(faction.approval(), dec!(100));
        assert_eq!(faction.mood(), Mood::Loyal);
    }

    #[test]
    fn mood_tracks_every_change() {
        let mut faction = Faction::new(FactionType::Merchants);
        faction.change_approval(dec!(11));
        assert_eq!(faction.mood(), Mood::Content);
        faction.change_approval(dec!(-30));
        assert_eq!(faction.mood(), Mood::Unhappy);
    }

    #[test]
    fn serde_keeps_mood_consistent() {
        let faction = Faction::with_approval(FactionType::Military, dec!(85));
        let json = serde_json::to_string(&faction).unwrap();
        let back: Option<Faction> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(faction));
    }

    #[test]
    fn loading_clamps_approval_and_rederives_mood() {
        let json = r#"{"kind":"Nobility","name":"Nobility","approval":"250","mood":"Hostile"}"#;
        let faction: Faction = serde_json::from_str(json).unwrap();
        assert_eq!(faction.approval(), dec!(100));
        assert_eq!(faction.mood(), Mood::Loyal);

        let json = r#"{"kind":"Clergy","approval":"-5"}"#;
        let faction: Faction = serde_json::from_str(json).unwrap();
        assert_eq!(faction.approval(), dec!(0));
        assert_eq!(faction.mood(), Mood::Hostile);
        assert_eq!(faction.name(), "Clergy");
    }
}
