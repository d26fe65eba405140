//! CLI domain: parse, route, help, output, and presentation only.
//! The route table drives the library through the in-memory host.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, PatternCommands};
pub use presentation::{
    format_classify_json, format_classify_table, format_patterns, format_view_json,
    format_view_text, ClassifyRow, FrameKindLabel,
};
pub use route::{parse_frames, CollapseOptions, RunContext};
