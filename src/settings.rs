//! Frame hiding settings
//!
//! The persisted switches and library patterns that drive classification. The
//! reconciliation core only ever reads them through [`SettingsView`]; mutation
//! goes through [`SettingsStore`], which the actions and the CLI own.

use crate::error::ConfigError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Persisted frame hiding settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiderSettings {
    /// Collapse library frames in the call stack view
    #[serde(default)]
    pub hide_library_frames: bool,

    /// Treat frames outside the project root as library frames
    #[serde(default = "default_true")]
    pub restrict_to_project_root: bool,

    /// Case-insensitive path fragments identifying library code
    #[serde(default = "default_library_patterns")]
    pub library_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

pub fn default_library_patterns() -> Vec<String> {
    ["venv/", "site-packages/", "lib/python", "go/pkg/mod", "node_modules/"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for HiderSettings {
    fn default() -> Self {
        Self {
            hide_library_frames: false,
            restrict_to_project_root: default_true(),
            library_patterns: default_library_patterns(),
        }
    }
}

impl HiderSettings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), String> {
        if let Some(index) = self
            .library_patterns
            .iter()
            .position(|p| p.trim().is_empty())
        {
            return Err(format!("Library pattern #{} is blank", index + 1));
        }
        Ok(())
    }

    /// Drop duplicate patterns, keeping the first occurrence.
    pub fn dedup_patterns(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.library_patterns.retain(|p| seen.insert(p.clone()));
    }
}

/// Read-only view of the settings consumed by the reconciliation core.
pub trait SettingsView {
    fn hide_enabled(&self) -> bool;
    fn restrict_to_project_root(&self) -> bool;
    fn library_patterns(&self) -> Vec<String>;
}

impl SettingsView for HiderSettings {
    fn hide_enabled(&self) -> bool {
        self.hide_library_frames
    }

    fn restrict_to_project_root(&self) -> bool {
        self.restrict_to_project_root
    }

    fn library_patterns(&self) -> Vec<String> {
        self.library_patterns.clone()
    }
}

/// Shared, mutable settings holder
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<HiderSettings>>,
}

impl SettingsStore {
    pub fn new(mut settings: HiderSettings) -> Self {
        settings.dedup_patterns();
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> HiderSettings {
        self.inner.read().clone()
    }

    /// Set the hide flag; returns the previous value.
    pub fn set_hide_enabled(&self, enabled: bool) -> bool {
        let mut settings = self.inner.write();
        let previous = settings.hide_library_frames;
        settings.hide_library_frames = enabled;
        debug!(previous, enabled, "Hide library frames updated");
        previous
    }

    pub fn set_restrict_to_project_root(&self, enabled: bool) {
        self.inner.write().restrict_to_project_root = enabled;
    }

    /// Append a pattern; returns false if it was blank or already present.
    pub fn add_pattern(&self, pattern: &str) -> bool {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return false;
        }
        let mut settings = self.inner.write();
        if settings.library_patterns.iter().any(|p| p == pattern) {
            return false;
        }
        settings.library_patterns.push(pattern.to_string());
        info!(pattern, "Added library pattern");
        true
    }

    /// Remove a pattern; returns whether it was present.
    pub fn remove_pattern(&self, pattern: &str) -> bool {
        let mut settings = self.inner.write();
        let before = settings.library_patterns.len();
        settings.library_patterns.retain(|p| p != pattern);
        before != settings.library_patterns.len()
    }

    pub fn replace_patterns(&self, patterns: Vec<String>) {
        let mut settings = self.inner.write();
        settings.library_patterns = patterns
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        settings.dedup_patterns();
    }

    /// Load settings from a TOML file holding a bare `HiderSettings` table.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let settings: HiderSettings = toml::from_str(&contents)?;
        settings.validate().map_err(ConfigError::Invalid)?;
        Ok(Self::new(settings))
    }

    /// Write the current settings as TOML, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(&self.snapshot())?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

impl SettingsView for SettingsStore {
    fn hide_enabled(&self) -> bool {
        self.inner.read().hide_library_frames
    }

    fn restrict_to_project_root(&self) -> bool {
        self.inner.read().restrict_to_project_root
    }

    fn library_patterns(&self) -> Vec<String> {
        self.inner.read().library_patterns.clone()
    }
}
