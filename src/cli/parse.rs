//! CLI parse: clap types for StackSnack. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// StackSnack CLI - Collapse library frames in call stacks
#[derive(Parser)]
#[command(name = "stacksnack")]
#[command(about = "Collapse library frames in debugger call stacks into placeholders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify source paths as project or library code
    Classify {
        /// Source file paths to classify
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Project root (default: workspace root)
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Collapse a call stack read one frame per line (`path[:line]`, or `-`)
    Collapse {
        /// Input file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Project root (default: workspace root)
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// 1-based line of the frame currently being inspected
        #[arg(long)]
        current: Option<usize>,
        /// Stream frames in one at a time, this many milliseconds apart
        #[arg(long)]
        stream_ms: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Disable colors in text output
        #[arg(long)]
        no_color: bool,
    },
    /// Manage library patterns in the workspace config
    Patterns {
        #[command(subcommand)]
        command: PatternCommands,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PatternCommands {
    /// List the effective library patterns
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Add a library pattern
    Add {
        /// Case-insensitive path fragment, e.g. `site-packages/`
        pattern: String,
    },
    /// Remove a library pattern
    Remove {
        pattern: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective merged configuration as TOML
    Show,
}
