// Layered configuration: defaults, optional file, environment

//! # Configuration
//!
//! Settings are read with the `config` crate, later sources overriding earlier
//! ones:
//!
//! 1. Built-in defaults
//! 2. `hr-workflow.toml` in the working directory, if present
//! 3. Environment variables prefixed `HR_WORKFLOW_`, with `__` between nested
//!    keys, e.g. `HR_WORKFLOW_SYNC__QUIET_PERIOD_MS=250`
//!
//! `.env` files are loaded with `dotenv` before the environment is read.
//!
//! ```toml
//! [sync]
//! quiet_period_ms = 1000
//!
//! [access]
//! manager_scope = "strict"   # or "role_only"
//!
//! [events]
//! buffer = 1000
//!
//! [log]
//! filter = "info"
//! ```

use ::config::{Config, ConfigBuilder, Environment, File};
use ::config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::engine::access::ManagerScopePolicy;
use crate::engine::sync::SyncConfig;
use crate::Result;

const DEFAULT_FILE: &str = "hr-workflow.toml";
const ENV_PREFIX: &str = "HR_WORKFLOW";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrWorkflowConfig {
    pub sync: SyncSettings,
    pub access: AccessSettings,
    pub events: EventSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Quiet period before a process snapshot is written
    pub quiet_period_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessSettings {
    pub manager_scope: ManagerScopePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    /// Events buffered per slow subscriber
    pub buffer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `hr_workflow=debug`
    pub filter: String,
}

impl Default for HrWorkflowConfig {
    fn default() -> Self {
        Self {
            sync: SyncSettings {
                quiet_period_ms: 1000,
            },
            access: AccessSettings {
                manager_scope: ManagerScopePolicy::Strict,
            },
            events: EventSettings { buffer: 1000 },
            log: LogSettings {
                filter: "info".to_string(),
            },
        }
    }
}

impl HrWorkflowConfig {
    /// Load from defaults, `hr-workflow.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_env_file();
        let file = Path::new(DEFAULT_FILE);
        Self::load_from(file.exists().then_some(file), Self::environment())
    }

    /// Load with an explicit settings file instead of the default one
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_env_file();
        Self::load_from(Some(path.as_ref()), Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_from(file: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Self::defaults()?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(environment);

        let settings: HrWorkflowConfig = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let defaults = HrWorkflowConfig::default();
        let builder = Config::builder()
            .set_default("sync.quiet_period_ms", defaults.sync.quiet_period_ms as i64)?
            .set_default("access.manager_scope", "strict")?
            .set_default("events.buffer", defaults.events.buffer as i64)?
            .set_default("log.filter", defaults.log.filter)?;
        Ok(builder)
    }

    /// Load `.env` if there is one; a missing file is not an error
    pub fn load_env_file() {
        if dotenv::dotenv().is_ok() {
            tracing::debug!("Loaded environment variables from .env file");
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::from_millis(self.sync.quiet_period_ms)
    }

    pub fn manager_scope_policy(&self) -> ManagerScopePolicy {
        self.access.manager_scope
    }

    /// Log filter: `RUST_LOG` wins over the configured directive
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log.filter))
    }
}
