//! Reference implementations of the collaborators declared in
//! [`dominion_core::ports`].
//!
//! The core never touches storage directly. A caller loads a kingdom from a
//! [`KingdomStore`], mutates it through the services, and saves it back.
//! These implementations cover tests, the headless engine, and small
//! single-process deployments.
//!
//! # Modules
//!
//! - [`memory`] -- [`InMemoryKingdomStore`] and [`InMemoryEventStore`]
//! - [`json_file`] -- [`JsonFileKingdomStore`], one JSON document per kingdom
//! - [`config`] -- Static, YAML-backed and cached [`ConfigProvider`]s
//!
//! [`KingdomStore`]: dominion_core::KingdomStore
//! [`ConfigProvider`]: dominion_core::ConfigProvider

pub mod config;
pub mod json_file;
pub mod memory;

pub use config::{CachedConfigProvider, StaticConfigProvider, YamlConfigProvider};
pub use json_file::JsonFileKingdomStore;
pub use memory::{InMemoryEventStore, InMemoryKingdomStore};
