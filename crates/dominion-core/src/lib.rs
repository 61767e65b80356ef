//! Simulation core of the Dominion kingdom-management game.
//!
//! This crate owns the [`Kingdom`] aggregate and the services that act on
//! it: continuous resource generation, faction politics, branching event
//! chains, and the prestige reset loop. It performs no I/O; persistence and
//! configuration sources are reached through the traits in [`ports`].
//!
//! # Modules
//!
//! - [`kingdom`] -- The aggregate root and its mutating operations.
//! - [`faction`] -- Faction entity with clamped approval and derived mood.
//! - [`stock`] -- Capped per-resource holdings.
//! - [`relations`] -- Relation graph, approval thresholds, base power.
//! - [`factions`] -- [`FactionService`]: mood bonus, threshold events,
//!   impact propagation, power.
//! - [`generator`] -- [`ResourceGenerator`]: rates and offline progress.
//! - [`prestige`] -- [`PrestigeService`]: bonuses and the reset.
//! - [`chain`] -- [`EventChainService`]: linking, choices, path rewards.
//! - [`manager`] -- [`EventChainManager`]: spawning and completion.
//! - [`catalog`] -- Built-in chains, rewards and faction event text.
//! - [`advisors`] -- Hiring with costs and slot limits.
//! - [`resolution`] -- Applying a player's choice on an event.
//! - [`achievements`] -- Milestones recorded on the kingdom.
//! - [`config`] -- YAML configuration and tuning tables.
//! - [`clock`] -- Injectable time source.
//! - [`ports`] -- Store and config-provider traits.
//! - [`error`] -- [`CoreError`].

pub mod achievements;
pub mod advisors;
pub mod catalog;
pub mod chain;
pub mod clock;
pub mod config;
pub mod error;
pub mod faction;
pub mod factions;
pub mod generator;
pub mod kingdom;
pub mod manager;
pub mod ports;
pub mod prestige;
pub mod relations;
pub mod resolution;
pub mod stock;

pub use achievements::{Achievement, evaluate_achievements};
pub use advisors::{HireOutcome, hire_advisor, hire_advisor_by_name};
pub use chain::{ChainRewardTable, ChainStep, EventChainService, PathRewards, infer_chain_path};
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig, GameTuning};
pub use error::CoreError;
pub use faction::Faction;
pub use factions::{FactionService, KindBonus, MoodBonus};
pub use generator::ResourceGenerator;
pub use kingdom::Kingdom;
pub use manager::{ChainDefinition, EventChainManager, SpawnCondition, SpawnHistory, UnlockHook};
pub use ports::{ConfigProvider, EventStore, KingdomStore, StoreError};
pub use prestige::{PrestigeBonuses, PrestigeOutcome, PrestigeReset, PrestigeService};
pub use relations::{ApprovalThresholds, FactionTables};
pub use resolution::{Resolution, ResolutionOutcome, resolve_event};
pub use stock::ResourceStock;
