//! Merge rules: defaults, override order, conflict handling.

use crate::settings::default_library_patterns;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources replace list values wholesale, so a file that sets
/// `library_patterns` fully overrides the default list.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("settings.hide_library_frames", false)?
        .set_default("settings.restrict_to_project_root", true)?
        .set_default("settings.library_patterns", default_library_patterns())?
        .set_default("reconcile.retry_delay_ms", 10)?
        .set_default("reconcile.busy_backoff_ms", 50)?
        .set_default("reconcile.max_retries", 10)?
        .set_default("reconcile.resync_debounce_ms", 30)?
        .set_default("reconcile.continuous_resync", true)
}
