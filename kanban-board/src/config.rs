//! Engine configuration
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables with the `KANBAN_` prefix

use crate::error::{KanbanError, Result};
use crate::ordering::OrderingPolicy;
use crate::types::PositionBase;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "KANBAN_";

/// What to do with an intent that arrives while a mutation is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyPolicy {
    /// Wait for the in-flight mutation, then plan against the latest state
    #[default]
    Queue,
    /// Fail immediately with `KanbanError::Busy`
    Reject,
}

/// Settings for the optimistic mutation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First position of a dense run
    pub position_base: PositionBase,
    /// How long a rollback message stays visible
    pub error_display_ms: u64,
    /// Upper bound for each remote write; 0 disables the timeout
    pub remote_timeout_ms: u64,
    pub concurrency: ConcurrencyPolicy,
    /// Also persist positions of siblings renumbered by a move
    pub persist_sibling_renumbering: bool,
    /// Number of settled mutations kept in the history
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            position_base: PositionBase::Zero,
            error_display_ms: 3_000,
            remote_timeout_ms: 10_000,
            concurrency: ConcurrencyPolicy::Queue,
            persist_sibling_renumbering: true,
            history_limit: 100,
        }
    }
}

impl EngineConfig {
    /// Load from defaults and environment variables
    pub fn load() -> Result<Self> {
        Self::extract(Self::base_figment().merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load from defaults, the given file and environment variables
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::from(Toml::file(path)),
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => {
                return Err(KanbanError::config(format!(
                    "unsupported configuration format: {}",
                    path.display()
                )))
            }
        };

        debug!("Loading engine configuration from {}", path.display());
        Self::extract(
            Self::base_figment()
                .merge(file)
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.error_display_ms == 0 {
            return Err(KanbanError::config("error_display_ms must be greater than 0"));
        }
        if self.history_limit == 0 {
            return Err(KanbanError::config("history_limit must be greater than 0"));
        }
        Ok(())
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }

    pub fn remote_timeout(&self) -> Option<Duration> {
        (self.remote_timeout_ms > 0).then(|| Duration::from_millis(self.remote_timeout_ms))
    }

    pub fn ordering(&self) -> OrderingPolicy {
        OrderingPolicy::new(self.position_base)
    }

    pub fn with_position_base(mut self, base: PositionBase) -> Self {
        self.position_base = base;
        self
    }

    pub fn with_concurrency(mut self, concurrency: ConcurrencyPolicy) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_sibling_renumbering(mut self, persist: bool) -> Self {
        self.persist_sibling_renumbering = persist;
        self
    }
}
