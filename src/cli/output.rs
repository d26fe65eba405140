//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ActionError, CliError};

/// Map a command error to the line printed on stderr.
pub fn map_error(e: &CliError) -> String {
    match e {
        CliError::Action(ActionError::InvalidPattern(pattern)) => {
            format!("Invalid library pattern '{}': patterns must not be blank", pattern)
        }
        other => other.to_string(),
    }
}
