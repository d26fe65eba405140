//! Workspace config file source: .stacksnack/config.toml and .stacksnack/{env}.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};

/// Path of the base workspace config file (also where the CLI saves settings).
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".stacksnack").join("config.toml")
}

/// Add workspace config files to builder.
/// Precedence: .stacksnack/config.toml (base) then .stacksnack/{STACKSNACK_ENV}.toml.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder;

    let base_config_path = workspace_config_path(workspace_root);
    if base_config_path.exists() {
        builder = builder.add_source(File::from(base_config_path).required(false));
    }

    if let Ok(env_name) = std::env::var("STACKSNACK_ENV") {
        let env_config_path = workspace_root
            .join(".stacksnack")
            .join(format!("{}.toml", env_name));
        if env_config_path.exists() {
            builder = builder.add_source(File::from(env_config_path).required(false));
        }
    }

    Ok(builder)
}
