//! Error types for the stack frame hiding engine.

use thiserror::Error;

/// Failures of a single reconciliation pass.
///
/// None of these ever reach the host: the controller logs them and turns them
/// into a state transition (retry, backoff, cache drop or give up).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Widget not found, not populated yet, or produced an empty view.
    #[error("Call stack not ready: {0}")]
    NotReady(String),

    /// Another pass holds the update guard.
    #[error("Reconciliation pass already running")]
    Busy,

    /// The widget's backing list refused the replacement contents.
    #[error("Widget rejected write: {0}")]
    WriteRejected(String),

    #[error("Unexpected reconciliation failure: {0}")]
    Unexpected(String),
}

impl ReconcileError {
    /// Whether the cached widget reference must be dropped after this failure.
    pub fn invalidates_cache(&self) -> bool {
        !matches!(self, ReconcileError::Busy)
    }

    /// Whether a bounded local retry is the right recovery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReconcileError::NotReady(_))
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Configuration validation failed:\n{0}")]
    Invalid(String),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Errors surfaced by the user-facing actions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("No paused debug session with a current frame")]
    NotAvailable,

    #[error("Cannot extract library pattern from this frame")]
    NoSourcePosition,

    #[error("Could not determine library pattern from: {0}")]
    NoPattern(String),

    #[error("Invalid library pattern: {0}")]
    InvalidPattern(String),
}

/// Errors of the command line front-end
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to render output: {0}")]
    Output(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(ConfigError::Serialize(err))
    }
}
