//! Headless turn driver for the Dominion simulation.
//!
//! Plays one kingdom for a configured number of turns, deciding every
//! event on the ruler's behalf, and persists the kingdom as JSON between
//! turns.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `dominion-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Open the kingdom store and the tuning provider
//! 4. Load or found the kingdom and register the built-in chains
//! 5. Run the turn loop
//! 6. Log the result

mod error;
mod policy;
mod session;

use std::path::Path;

use anyhow::Context as _;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dominion_core::config::LoggingConfig;
use dominion_core::{ConfigProvider, GameConfig, ManualClock, StoreError};
use dominion_store::{
    CachedConfigProvider, InMemoryEventStore, JsonFileKingdomStore, StaticConfigProvider,
    YamlConfigProvider,
};

use crate::error::EngineError;
use crate::session::Session;

const CONFIG_PATH: &str = "dominion-config.yaml";

/// Tuning comes from the config file when there is one, otherwise from the
/// built-in defaults.
enum TuningSource {
    File(CachedConfigProvider<YamlConfigProvider>),
    Defaults(StaticConfigProvider),
}

impl ConfigProvider for TuningSource {
    fn tuning(&self) -> Result<dominion_core::GameTuning, StoreError> {
        match self {
            Self::File(provider) => provider.tuning(),
            Self::Defaults(provider) => provider.tuning(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, from_file) = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("dominion-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        kingdom = config.session.kingdom_name,
        seed = config.session.seed,
        turns = config.session.turns,
        seconds_per_turn = config.session.seconds_per_turn,
        data_dir = config.storage.data_dir,
        "Configuration loaded"
    );

    // 3. Open the stores.
    let kingdoms = JsonFileKingdomStore::open(&config.storage.data_dir)
        .with_context(|| format!("opening kingdom store at {}", config.storage.data_dir))?;
    let tuning = if from_file {
        TuningSource::File(CachedConfigProvider::new(
            YamlConfigProvider::new(CONFIG_PATH),
            config.storage.config_ttl_secs,
        ))
    } else {
        TuningSource::Defaults(StaticConfigProvider::new(config.tuning.clone()))
    };

    // 4. Load or found the kingdom.
    let mut session = Session::start(
        config.session.clone(),
        kingdoms,
        InMemoryEventStore::new(),
        tuning,
        ManualClock::starting_at(Utc::now()),
    )
    .context("starting session")?;
    info!(
        kingdom = %session.kingdom_id(),
        chains = session.manager().chains().len(),
        "Session ready, entering turn loop"
    );

    // 5. Run the turn loop.
    let summary = session.run().context("running turn loop")?;

    // 6. Log the result.
    info!(
        kingdom = %session.kingdom_id(),
        turns = summary.turns,
        events_resolved = summary.events_resolved,
        chains_spawned = summary.chains_spawned,
        chains_completed = summary.chains_completed,
        prestige_level = summary.prestige_level,
        "dominion-engine shutdown complete"
    );
    Ok(())
}

/// Load the configuration from `dominion-config.yaml` in the working
/// directory. Returns whether the file was found.
fn load_config() -> Result<(GameConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((GameConfig::from_file(config_path)?, true))
    } else {
        let mut config = GameConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
