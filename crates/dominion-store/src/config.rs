//! Tuning-table providers.
//!
//! - [`StaticConfigProvider`] hands out a fixed [`GameTuning`].
//! - [`YamlConfigProvider`] re-reads the `tuning` section of a YAML file
//!   on every call.
//! - [`CachedConfigProvider`] wraps either one and serves a copy for a
//!   freshness window before asking again.

use std::cell::RefCell;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use dominion_core::{Clock, ConfigProvider, GameConfig, GameTuning, StoreError, SystemClock};

/// Always the same tuning.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    tuning: GameTuning,
}

impl StaticConfigProvider {
    /// Serve `tuning` forever.
    pub const fn new(tuning: GameTuning) -> Self {
        Self { tuning }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn tuning(&self) -> Result<GameTuning, StoreError> {
        Ok(self.tuning.clone())
    }
}

/// Tuning read from the `tuning` key of a configuration file.
#[derive(Debug, Clone)]
pub struct YamlConfigProvider {
    path: PathBuf,
}

impl YamlConfigProvider {
    /// Read from `path` on each request.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigProvider for YamlConfigProvider {
    fn tuning(&self) -> Result<GameTuning, StoreError> {
        let config = GameConfig::from_file(&self.path)?;
        debug!(path = %self.path.display(), "tuning loaded");
        Ok(config.tuning)
    }
}

/// A provider whose answers are reused until they are `ttl` old.
///
/// Failed loads are not cached; the next call tries again.
#[derive(Debug)]
pub struct CachedConfigProvider<P, C = SystemClock> {
    inner: P,
    clock: C,
    ttl: Duration,
    cached: RefCell<Option<(DateTime<Utc>, GameTuning)>>,
}

impl<P: ConfigProvider> CachedConfigProvider<P> {
    /// Cache `inner` for `ttl_secs` seconds of wall-clock time.
    pub fn new(inner: P, ttl_secs: u64) -> Self {
        Self::with_clock(inner, ttl_secs, SystemClock)
    }
}

impl<P: ConfigProvider, C: Clock> CachedConfigProvider<P, C> {
    /// Cache `inner` for `ttl_secs` seconds as measured by `clock`.
    pub fn with_clock(inner: P, ttl_secs: u64, clock: C) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            inner,
            clock,
            ttl,
            cached: RefCell::new(None),
        }
    }

    /// The clock freshness is measured against.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Drop the cached copy so the next call reloads.
    pub fn invalidate(&self) {
        *self.cached.borrow_mut() = None;
    }
}

impl<P: ConfigProvider, C: Clock> ConfigProvider for CachedConfigProvider<P, C> {
    fn tuning(&self) -> Result<GameTuning, StoreError> {
        let now = self.clock.now();
        if let Some((fetched_at, tuning)) = self.cached.borrow().as_ref() {
            let age = now.signed_duration_since(*fetched_at);
            if age >= Duration::zero() && age < self.ttl {
                return Ok(tuning.clone());
            }
        }

        let tuning = self.inner.tuning()?;
        debug!(ttl_secs = self.ttl.num_seconds(), "tuning cache refreshed");
        *self.cached.borrow_mut() = Some((now, tuning.clone()));
        Ok(tuning)
    }
}
