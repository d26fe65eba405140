//! Stack Frames
//!
//! The displayable entries of a call-stack list: real frames owned by the host
//! and synthetic placeholders standing in for a run of hidden library frames.

pub mod classifier;
pub mod path;

pub use classifier::{FrameClassifier, LibraryPatternSet};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Source location of a frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: PathBuf,
    pub line: Option<u32>,
}

impl SourcePosition {
    pub fn new(file: impl Into<PathBuf>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file.display(), line),
            None => write!(f, "{}", self.file.display()),
        }
    }
}

/// A stack frame as exposed by the host.
///
/// Frames are created and destroyed by the host; this crate only reads them.
/// Equality is the host's frame identity and is what selection restore uses.
pub trait StackFrame: Clone + PartialEq + fmt::Debug + 'static {
    fn source_position(&self) -> Option<&SourcePosition>;
}

/// Placeholder for consecutive collapsed library frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HiddenFrames {
    count: NonZeroUsize,
}

impl HiddenFrames {
    /// A single hidden frame
    pub const ONE: Self = Self {
        count: NonZeroUsize::MIN,
    };

    /// Returns `None` for a zero count; a placeholder always hides something.
    pub fn new(count: usize) -> Option<Self> {
        NonZeroUsize::new(count).map(|count| Self { count })
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Combine two adjacent placeholders.
    pub fn merged(self, other: HiddenFrames) -> Self {
        Self {
            count: self.count.saturating_add(other.count()),
        }
    }

    /// Label shown in the call-stack list.
    pub fn label(&self) -> String {
        let count = self.count();
        format!(
            "     {} hidden frame{}",
            count,
            if count > 1 { "s" } else { "" }
        )
    }
}

/// One entry of the displayed call stack
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayFrame<F> {
    Frame(F),
    Hidden(HiddenFrames),
}

impl<F> DisplayFrame<F> {
    pub fn hidden(count: usize) -> Option<Self> {
        HiddenFrames::new(count).map(DisplayFrame::Hidden)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, DisplayFrame::Hidden(_))
    }

    pub fn as_frame(&self) -> Option<&F> {
        match self {
            DisplayFrame::Frame(frame) => Some(frame),
            DisplayFrame::Hidden(_) => None,
        }
    }

    pub fn as_hidden(&self) -> Option<HiddenFrames> {
        match self {
            DisplayFrame::Frame(_) => None,
            DisplayFrame::Hidden(hidden) => Some(*hidden),
        }
    }
}
