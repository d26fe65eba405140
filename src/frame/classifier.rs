//! Project vs. library classification of stack frames.
//!
//! Pure and cheap: a few lowercase substring checks per frame, no caching, safe
//! to call from anywhere.

use crate::frame::path::{canonicalize_root, normalize_path_string};
use crate::frame::StackFrame;
use crate::settings::SettingsView;
use std::path::Path;

/// Which side of the project/library line a frame falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Project,
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LibraryPattern {
    original: String,
    lowered: String,
    /// `django.core` also matches as `django/core`
    dotted_as_path: Option<String>,
}

impl LibraryPattern {
    fn new(pattern: &str) -> Option<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase().replace('\\', "/");
        let dotted_as_path = lowered
            .contains('.')
            .then(|| lowered.replace('.', "/"));
        Some(Self {
            original: trimmed.to_string(),
            lowered,
            dotted_as_path,
        })
    }

    fn matches(&self, lowered_path: &str) -> bool {
        lowered_path.contains(&self.lowered)
            || self
                .dotted_as_path
                .as_deref()
                .is_some_and(|p| lowered_path.contains(p))
    }
}

/// Ordered set of library path fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPatternSet {
    patterns: Vec<LibraryPattern>,
}

impl LibraryPatternSet {
    /// Build from user patterns; blanks and duplicates are dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for pattern in patterns {
            if let Some(parsed) = LibraryPattern::new(pattern.as_ref()) {
                if !set.patterns.iter().any(|p| p.original == parsed.original) {
                    set.patterns.push(parsed);
                }
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.original.as_str())
    }

    /// Case-insensitive substring match against any pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }

    /// The first pattern matching `path`.
    pub fn first_match(&self, path: &str) -> Option<&str> {
        let lowered = normalize_path_string(path).to_lowercase();
        self.patterns
            .iter()
            .find(|p| p.matches(&lowered))
            .map(|p| p.original.as_str())
    }

    /// Whether some existing pattern already covers `fragment` (case-insensitive).
    pub fn covers(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.patterns.iter().any(|p| p.lowered.contains(&fragment))
    }
}

/// Decides whether a frame belongs to the project or to library code
#[derive(Debug, Clone)]
pub struct FrameClassifier {
    patterns: LibraryPatternSet,
    project_root: Option<String>,
    restrict_to_project_root: bool,
}

impl FrameClassifier {
    pub fn new(
        patterns: LibraryPatternSet,
        project_root: Option<&Path>,
        restrict_to_project_root: bool,
    ) -> Self {
        Self {
            patterns,
            project_root: project_root
                .map(|root| canonicalize_root(root).to_string_lossy().into_owned()),
            restrict_to_project_root,
        }
    }

    /// Build from the current settings snapshot.
    pub fn from_settings(settings: &dyn SettingsView, project_root: Option<&Path>) -> Self {
        Self::new(
            LibraryPatternSet::new(settings.library_patterns()),
            project_root,
            settings.restrict_to_project_root(),
        )
    }

    /// Classify a frame.
    ///
    /// Frames without a source position are library frames: with nothing to
    /// match against they are collapsed rather than shown.
    pub fn is_project_frame<F: StackFrame>(&self, frame: &F) -> bool {
        match frame.source_position() {
            Some(position) => self.is_project_path(&position.file),
            None => false,
        }
    }

    pub fn classify<F: StackFrame>(&self, frame: &F) -> FrameKind {
        if self.is_project_frame(frame) {
            FrameKind::Project
        } else {
            FrameKind::Library
        }
    }

    /// Classify a source file path.
    pub fn is_project_path(&self, path: &Path) -> bool {
        let path = normalize_path_string(&path.to_string_lossy());

        if self.patterns.matches(&path) {
            return false;
        }

        if !self.restrict_to_project_root {
            return true;
        }

        match &self.project_root {
            Some(root) => is_under_root(&path, root),
            None => true,
        }
    }
}

fn is_under_root(path: &str, root: &str) -> bool {
    if root.ends_with('/') {
        return path.starts_with(root);
    }
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Name of the directory containing `path`, used as a new library pattern.
pub fn extract_library_dir_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.trim().is_empty())
}
