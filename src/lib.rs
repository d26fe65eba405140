//! StackSnack: library frame hiding for debugger call stacks
//!
//! Collapses runs of library frames in a debugger's call-stack view into
//! placeholder entries such as `3 hidden frames`, keeping project frames
//! visible. The engine sees the debugger only through the traits in [`host`]
//! and [`widget`]; [`reconcile::Reconciler`] decides when the view is
//! refiltered and [`views::build_filtered_view`] how.

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod host;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod settings;
pub mod views;
pub mod widget;

pub use error::{ActionError, CliError, ConfigError, ReconcileError};
pub use frame::{DisplayFrame, FrameClassifier, HiddenFrames, SourcePosition, StackFrame};
pub use reconcile::{PassState, PassStats, Reconciler};
pub use settings::{HiderSettings, SettingsStore, SettingsView};
