//! Configuration loading and typed tuning tables for the Dominion simulation.
//!
//! The canonical configuration lives in `dominion-config.yaml` at the
//! project root. Balance values (base rates, advisor costs and multipliers,
//! faction bonus tables, prestige requirements) live under the `tuning` key
//! and are what the [`ConfigProvider`] hands to the services. Every field has
//! a default so an empty file is a valid configuration.
//!
//! [`ConfigProvider`]: crate::ports::ConfigProvider

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dominion_types::{AdvisorType, FactionType, ResourceType};

use crate::relations::FactionTables;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Turn-driver settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Where the file-backed stores keep their data.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Balance tables consumed by the services.
    #[serde(default)]
    pub tuning: GameTuning,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DOMINION_DATA_DIR` overrides `storage.data_dir`
    /// - `DOMINION_SEED` overrides `session.seed`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DOMINION_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Some(seed) = std::env::var("DOMINION_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.session.seed = seed;
        }
    }
}

/// Turn-driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Seed for the random number generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of turns to play.
    #[serde(default = "default_turns")]
    pub turns: u64,

    /// Simulated seconds elapsing per turn.
    #[serde(default = "default_seconds_per_turn")]
    pub seconds_per_turn: u64,

    /// Name of the kingdom to load or create.
    #[serde(default = "default_kingdom_name")]
    pub kingdom_name: String,

    /// Ruler to crown when the kingdom is created.
    #[serde(default)]
    pub ruler_name: Option<String>,

    /// Prefer choices that lead down the peaceful path.
    #[serde(default = "default_true")]
    pub prefer_peaceful: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            turns: default_turns(),
            seconds_per_turn: default_seconds_per_turn(),
            kingdom_name: default_kingdom_name(),
            ruler_name: None,
            prefer_peaceful: true,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory for JSON kingdom documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Seconds a cached tuning table stays fresh.
    #[serde(default = "default_config_ttl_secs")]
    pub config_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            config_ttl_secs: default_config_ttl_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Balance tables for every service.
///
/// Lookups that miss a table entry degrade to a neutral contribution
/// (zero base rate, unit multiplier, no bonus) instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTuning {
    /// Kingdom-wide settings.
    #[serde(default)]
    pub kingdom: KingdomTuning,

    /// Per-resource generation tuning.
    #[serde(default = "default_resources")]
    pub resources: BTreeMap<ResourceType, ResourceTuning>,

    /// Per-advisor cost and multiplier.
    #[serde(default = "default_advisors")]
    pub advisors: BTreeMap<AdvisorType, AdvisorTuning>,

    /// Per-faction resource bonus.
    #[serde(default = "default_factions")]
    pub factions: BTreeMap<FactionType, FactionTuning>,

    /// Prestige requirements.
    #[serde(default)]
    pub prestige: PrestigeTuning,

    /// Relation graph, thresholds and power table.
    #[serde(default)]
    pub faction_tables: FactionTables,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            kingdom: KingdomTuning::default(),
            resources: default_resources(),
            advisors: default_advisors(),
            factions: default_factions(),
            prestige: PrestigeTuning::default(),
            faction_tables: FactionTables::default(),
        }
    }
}

impl GameTuning {
    /// Base generation rate per second; zero when unconfigured.
    pub fn base_rate(&self, resource: ResourceType) -> Decimal {
        self.resources
            .get(&resource)
            .map_or(Decimal::ZERO, |r| r.base_rate)
    }

    /// Per-resource prestige multiplier; one when unconfigured.
    pub fn resource_prestige_multiplier(&self, resource: ResourceType) -> Decimal {
        self.resources
            .get(&resource)
            .map_or(Decimal::ONE, |r| r.prestige_multiplier)
    }

    /// Advisor rate multiplier; one when unconfigured.
    pub fn advisor_multiplier(&self, kind: AdvisorType) -> Decimal {
        self.advisors.get(&kind).map_or(Decimal::ONE, |a| a.multiplier)
    }
}

/// Kingdom-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingdomTuning {
    /// Ceiling for every tracked resource.
    #[serde(default = "default_resource_cap")]
    pub resource_cap: Decimal,

    /// Starting holdings of a new kingdom.
    #[serde(default = "default_starting_stock")]
    pub starting_stock: BTreeMap<ResourceType, Decimal>,

    /// Starting population (legacy view only).
    #[serde(default = "default_starting_population")]
    pub starting_population: Decimal,

    /// Starting military power (legacy view only).
    #[serde(default = "default_starting_military_power")]
    pub starting_military_power: Decimal,

    /// Advisor slots available before any prestige.
    #[serde(default = "default_base_advisor_slots")]
    pub base_advisor_slots: u32,

    /// Longest absence credited by offline catch-up, in seconds.
    #[serde(default = "default_max_offline_seconds")]
    pub max_offline_seconds: u64,
}

impl Default for KingdomTuning {
    fn default() -> Self {
        Self {
            resource_cap: default_resource_cap(),
            starting_stock: default_starting_stock(),
            starting_population: default_starting_population(),
            starting_military_power: default_starting_military_power(),
            base_advisor_slots: default_base_advisor_slots(),
            max_offline_seconds: default_max_offline_seconds(),
        }
    }
}

/// Generation tuning for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTuning {
    /// Units generated per second before multipliers.
    pub base_rate: Decimal,

    /// Extra multiplier applied alongside the prestige bonus.
    #[serde(default = "default_one")]
    pub prestige_multiplier: Decimal,
}

/// Cost and effect of one advisor office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorTuning {
    /// Hiring cost.
    #[serde(default)]
    pub cost: BTreeMap<ResourceType, Decimal>,

    /// Multiplier applied to every resource rate while the advisor serves.
    #[serde(default = "default_one")]
    pub multiplier: Decimal,
}

/// Resource bonus granted by a faction above neutral approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionTuning {
    /// Resources the faction boosts.
    #[serde(default)]
    pub bonus_resources: Vec<ResourceType>,

    /// Strength of the boost.
    #[serde(default = "default_one")]
    pub multiplier: Decimal,
}

/// Prestige requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrestigeTuning {
    /// Completed events needed before a prestige reset is allowed.
    #[serde(default = "default_required_completed_events")]
    pub required_completed_events: u32,

    /// Gold granted by the post-reset baseline.
    #[serde(default = "default_baseline_gold")]
    pub baseline_gold: Decimal,
}

impl Default for PrestigeTuning {
    fn default() -> Self {
        Self {
            required_completed_events: default_required_completed_events(),
            baseline_gold: default_baseline_gold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_turns() -> u64 {
    50
}

const fn default_seconds_per_turn() -> u64 {
    60
}

fn default_kingdom_name() -> String {
    "Avalon".to_owned()
}

const fn default_true() -> bool {
    true
}

fn default_data_dir() -> String {
    "data/kingdoms".to_owned()
}

const fn default_config_ttl_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_one() -> Decimal {
    Decimal::ONE
}

fn default_resource_cap() -> Decimal {
    Decimal::from(10_000)
}

fn default_starting_stock() -> BTreeMap<ResourceType, Decimal> {
    BTreeMap::from([
        (ResourceType::Gold, Decimal::from(100)),
        (ResourceType::Influence, Decimal::from(10)),
        (ResourceType::Faith, Decimal::ZERO),
        (ResourceType::Knowledge, Decimal::ZERO),
        (ResourceType::Loyalty, Decimal::from(50)),
    ])
}

fn default_starting_population() -> Decimal {
    Decimal::from(100)
}

fn default_starting_military_power() -> Decimal {
    Decimal::from(10)
}

const fn default_base_advisor_slots() -> u32 {
    3
}

const fn default_max_offline_seconds() -> u64 {
    // One day.
    86_400
}

const fn default_required_completed_events() -> u32 {
    10
}

fn default_baseline_gold() -> Decimal {
    Decimal::from(100)
}

fn default_resources() -> BTreeMap<ResourceType, ResourceTuning> {
    // Rates are authored in hundredths per second.
    let rate = |hundredths: i64| ResourceTuning {
        base_rate: Decimal::new(hundredths, 2),
        prestige_multiplier: Decimal::ONE,
    };
    BTreeMap::from([
        (ResourceType::Gold, rate(100)),
        (ResourceType::Influence, rate(20)),
        (ResourceType::Faith, rate(10)),
        (ResourceType::Knowledge, rate(10)),
        (ResourceType::Loyalty, rate(5)),
    ])
}

fn default_advisors() -> BTreeMap<AdvisorType, AdvisorTuning> {
    let advisor = |cost: &[(ResourceType, i64)], hundredths: i64| AdvisorTuning {
        cost: cost
            .iter()
            .map(|&(resource, amount)| (resource, Decimal::from(amount)))
            .collect(),
        multiplier: Decimal::new(hundredths, 2),
    };
    BTreeMap::from([
        (
            AdvisorType::Treasurer,
            advisor(&[(ResourceType::Gold, 100)], 110),
        ),
        (
            AdvisorType::General,
            advisor(&[(ResourceType::Gold, 150), (ResourceType::Influence, 20)], 105),
        ),
        (
            AdvisorType::Diplomat,
            advisor(&[(ResourceType::Gold, 120), (ResourceType::Influence, 30)], 108),
        ),
        (
            AdvisorType::HighPriest,
            advisor(&[(ResourceType::Gold, 100), (ResourceType::Faith, 20)], 105),
        ),
        (
            AdvisorType::Scholar,
            advisor(&[(ResourceType::Gold, 80), (ResourceType::Knowledge, 10)], 106),
        ),
    ])
}

fn default_factions() -> BTreeMap<FactionType, FactionTuning> {
    let bonus = |resources: &[ResourceType], tenths: i64| FactionTuning {
        bonus_resources: resources.to_vec(),
        multiplier: Decimal::new(tenths, 1),
    };
    BTreeMap::from([
        (FactionType::Nobility, bonus(&[ResourceType::Influence], 10)),
        (FactionType::Merchants, bonus(&[ResourceType::Gold], 15)),
        (FactionType::Military, bonus(&[ResourceType::Loyalty], 5)),
        (FactionType::Clergy, bonus(&[ResourceType::Faith], 10)),
        (
            FactionType::Commoners,
            bonus(&[ResourceType::Gold, ResourceType::Loyalty], 5),
        ),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.session.seed, 42);
        assert_eq!(config.tuning.kingdom.resource_cap, dec!(10000));
        assert_eq!(config.tuning.prestige.required_completed_events, 10);
        assert_eq!(config.tuning.base_rate(ResourceType::Gold), dec!(1.0));
        assert_eq!(config.tuning.advisors.len(), AdvisorType::ALL.len());
    }

    #[test]
    fn parse_tuning_overrides() {
        let yaml = r"
session:
  turns: 5
  kingdom_name: Camelot
  ruler_name: Arthur
tuning:
  kingdom:
    resource_cap: 500
  resources:
    Gold:
      base_rate: 2.5
  advisors:
    Treasurer:
      cost:
        Gold: 40
      multiplier: 1.5
";
        let config = GameConfig::parse(yaml);
        let config = config.unwrap();

        assert_eq!(config.session.turns, 5);
        assert_eq!(config.session.ruler_name.as_deref(), Some("Arthur"));
        assert_eq!(config.tuning.kingdom.resource_cap, dec!(500));
        assert_eq!(config.tuning.base_rate(ResourceType::Gold), dec!(2.5));
        // A replaced table drops the entries it omits.
        assert_eq!(config.tuning.base_rate(ResourceType::Faith), Decimal::ZERO);
        assert_eq!(config.tuning.advisor_multiplier(AdvisorType::Treasurer), dec!(1.5));
        assert_eq!(config.tuning.advisor_multiplier(AdvisorType::Scholar), Decimal::ONE);
        // Untouched sections keep their defaults.
        assert_eq!(config.tuning.kingdom.base_advisor_slots, 3);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GameConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let config = GameConfig::parse("session: [unterminated");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("dominion-config.yaml");
        if path.exists() {
            let config = GameConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
