//! Environment source: `STACKSNACK__SETTINGS__HIDE_LIBRARY_FRAMES=true` and friends.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("STACKSNACK")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
