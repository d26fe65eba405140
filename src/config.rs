//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global file, the
//! workspace file, then `STACKSNACK__*` environment variables. Tests included.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::settings::HiderSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::workspace_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackSnackConfig {
    /// Frame hiding switches and library patterns
    #[serde(default)]
    pub settings: HiderSettings,

    /// Reconciliation timing
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timing and retry bounds of the reconciliation controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Delay before a scheduled pass and between discovery retries
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Backoff when a trigger arrives while a pass is running
    #[serde(default = "default_busy_backoff_ms")]
    pub busy_backoff_ms: u64,

    /// Failed discovery attempts before giving up on a trigger
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Debounce window for re-filtering after the host appends frames
    #[serde(default = "default_resync_debounce_ms")]
    pub resync_debounce_ms: u64,

    /// Watch the located list and re-filter when it grows
    #[serde(default = "default_true")]
    pub continuous_resync: bool,
}

fn default_retry_delay_ms() -> u64 {
    10
}

fn default_busy_backoff_ms() -> u64 {
    50
}

fn default_max_retries() -> u32 {
    10
}

fn default_resync_debounce_ms() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            busy_backoff_ms: default_busy_backoff_ms(),
            max_retries: default_max_retries(),
            resync_debounce_ms: default_resync_debounce_ms(),
            continuous_resync: default_true(),
        }
    }
}

impl ReconcileConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn busy_backoff(&self) -> Duration {
        Duration::from_millis(self.busy_backoff_ms)
    }

    pub fn resync_debounce(&self) -> Duration {
        Duration::from_millis(self.resync_debounce_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Settings(String),
    Reconcile(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Settings(msg) => write!(f, "Settings: {}", msg),
            ValidationError::Reconcile(msg) => write!(f, "Reconcile: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StackSnackConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.settings.validate() {
            errors.push(ValidationError::Settings(e));
        }
        if let Err(e) = self.reconcile.validate() {
            errors.push(ValidationError::Reconcile(e));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "Unknown format '{}'",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`StackSnackConfig`] from all configured sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<StackSnackConfig, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);

        let config: StackSnackConfig = builder.build()?.try_deserialize()?;
        Self::finish(config)
    }

    /// Load configuration from a single explicit file (plus defaults).
    pub fn load_from_file(path: &Path) -> Result<StackSnackConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: StackSnackConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()?;
        Self::finish(config)
    }

    /// Path to the user-level config file, if a home directory can be found.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_config_path()
    }

    fn finish(mut config: StackSnackConfig) -> Result<StackSnackConfig, ConfigError> {
        config.settings.dedup_patterns();
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Invalid(error_msgs.join("\n"))
        })?;
        debug!(
            hide = config.settings.hide_library_frames,
            patterns = config.settings.library_patterns.len(),
            "Configuration loaded"
        );
        Ok(config)
    }
}
