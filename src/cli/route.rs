//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::command_name;
use crate::cli::parse::{Commands, ConfigCommands, PatternCommands};
use crate::cli::presentation::{
    format_classify_json, format_classify_table, format_patterns, format_view_json,
    format_view_text, ClassifyRow,
};
use crate::config::{workspace_config_path, ConfigLoader, StackSnackConfig};
use crate::error::{ActionError, CliError, ConfigError};
use crate::frame::classifier::{FrameClassifier, FrameKind, LibraryPatternSet};
use crate::frame::path::canonicalize_root;
use crate::frame::DisplayFrame;
use crate::host::memory::{
    MemoryComponent, MemoryFrame, MemoryHost, MemoryList, MemorySession, MemoryToolWindow,
};
use crate::host::{HostEvent, PanelId, TabId};
use crate::reconcile::Reconciler;
use crate::scheduler::{LocalExecutor, ManualExecutor, UiExecutor};
use crate::settings::{HiderSettings, SettingsStore};
use crate::widget::{ComponentRef, ListWidget};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Options of the `collapse` command
#[derive(Debug, Clone, Default)]
pub struct CollapseOptions {
    pub project_root: Option<PathBuf>,
    /// 1-based input line of the current frame
    pub current: Option<usize>,
    /// Append frames one at a time with this interval
    pub stream: Option<Duration>,
    pub format: String,
    pub color: bool,
}

/// Runtime context for CLI execution: workspace, config paths, and the merged config.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: StackSnackConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &StackSnackConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, CliError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = %name, "Executing command");

        let result = self.execute_inner(command);

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = %name, duration_ms, "Command finished"),
            Err(err) => warn!(command = %name, duration_ms, error = %err, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, CliError> {
        match command {
            Commands::Classify {
                paths,
                project_root,
                format,
            } => self.handle_classify(paths, project_root.as_deref(), format),
            Commands::Collapse {
                input,
                project_root,
                current,
                stream_ms,
                format,
                no_color,
            } => {
                let text = read_input(input.as_deref())?;
                let options = CollapseOptions {
                    project_root: project_root.clone(),
                    current: *current,
                    stream: stream_ms.map(Duration::from_millis),
                    format: format.clone(),
                    color: !no_color && std::io::stdout().is_terminal(),
                };
                self.handle_collapse(&text, &options)
            }
            Commands::Patterns { command } => self.handle_patterns(command),
            Commands::Config {
                command: ConfigCommands::Show,
            } => Ok(toml::to_string_pretty(&self.config)?),
        }
    }

    fn project_root(&self, explicit: Option<&Path>) -> PathBuf {
        explicit.unwrap_or(&self.workspace_root).to_path_buf()
    }

    fn handle_classify(
        &self,
        paths: &[PathBuf],
        project_root: Option<&Path>,
        format: &str,
    ) -> Result<String, CliError> {
        let settings = &self.config.settings;
        let patterns = LibraryPatternSet::new(&settings.library_patterns);
        let root = self.project_root(project_root);
        let classifier = FrameClassifier::new(
            patterns.clone(),
            Some(&root),
            settings.restrict_to_project_root,
        );

        let rows: Vec<ClassifyRow> = paths
            .iter()
            .map(|path| {
                let resolved = if path.is_absolute() {
                    path.clone()
                } else {
                    self.workspace_root.join(path)
                };
                let resolved = canonicalize_root(&resolved);
                let kind = if classifier.is_project_path(&resolved) {
                    FrameKind::Project
                } else {
                    FrameKind::Library
                };
                let reason = match kind {
                    FrameKind::Project => None,
                    FrameKind::Library => Some(
                        patterns
                            .first_match(&resolved.to_string_lossy())
                            .map(|pattern| format!("matches '{}'", pattern))
                            .unwrap_or_else(|| "outside project root".to_string()),
                    ),
                };
                ClassifyRow {
                    path: path.display().to_string(),
                    kind: kind.into(),
                    reason,
                }
            })
            .collect();

        if format == "json" {
            format_classify_json(&rows)
        } else {
            Ok(format_classify_table(&rows))
        }
    }

    /// Run the full reconciliation pipeline over a call stack given as text.
    ///
    /// With `stream` set, the call stack starts with its first frame only and
    /// the rest is appended one frame per interval on a tokio `LocalSet`, the
    /// way a debugger fills the list while it walks the stack.
    pub fn handle_collapse(
        &self,
        text: &str,
        options: &CollapseOptions,
    ) -> Result<String, CliError> {
        let frames = parse_frames(text)?;
        let current_frame = match options.current {
            Some(line) => Some(
                frames
                    .iter()
                    .find(|frame| frame.id == line as u64)
                    .cloned()
                    .ok_or_else(|| CliError::InvalidInput(format!("no frame on line {}", line)))?,
            ),
            None => None,
        };

        let (view, selected) = match options.stream {
            None => self.collapse_now(frames, current_frame, options.project_root.as_deref()),
            Some(interval) => {
                self.collapse_streamed(frames, current_frame, options.project_root.as_deref(), interval)?
            }
        };

        if options.format == "json" {
            format_view_json(&view, selected)
        } else {
            Ok(format_view_text(&view, selected, options.color))
        }
    }

    fn collapse_now(
        &self,
        frames: Vec<MemoryFrame>,
        current: Option<MemoryFrame>,
        project_root: Option<&Path>,
    ) -> (Vec<DisplayFrame<MemoryFrame>>, Option<usize>) {
        let (host, list) = self.build_host(frames, current, project_root);
        let executor = Rc::new(ManualExecutor::new());
        let reconciler = self.reconciler(host, executor.clone());

        reconciler.handle(HostEvent::Paused);
        executor.run_until_idle();
        report(&reconciler);

        (list.entries(), list.selected_index())
    }

    fn collapse_streamed(
        &self,
        frames: Vec<MemoryFrame>,
        current: Option<MemoryFrame>,
        project_root: Option<&Path>,
        interval: Duration,
    ) -> Result<(Vec<DisplayFrame<MemoryFrame>>, Option<usize>), CliError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let local = tokio::task::LocalSet::new();

        let mut frames = frames.into_iter();
        let initial: Vec<MemoryFrame> = frames.by_ref().take(1).collect();
        let rest: Vec<MemoryFrame> = frames.collect();
        let (host, list) = self.build_host(initial, current, project_root);
        let reconcile = &self.config.reconcile;
        let settle = reconcile.resync_debounce()
            + reconcile.busy_backoff()
            + reconcile.retry_delay() * reconcile.max_retries;

        local.block_on(&runtime, async {
            let executor = Rc::new(LocalExecutor::new());
            let reconciler = self.reconciler(host, executor);
            reconciler.handle(HostEvent::Paused);

            for frame in rest {
                tokio::time::sleep(interval).await;
                list.push_frame(frame);
            }
            tokio::time::sleep(settle).await;
            report(&reconciler);
        });

        Ok((list.entries(), list.selected_index()))
    }

    fn build_host(
        &self,
        frames: Vec<MemoryFrame>,
        current: Option<MemoryFrame>,
        project_root: Option<&Path>,
    ) -> (Rc<MemoryHost<MemoryFrame>>, Rc<MemoryList<MemoryFrame>>) {
        let host = MemoryHost::new();
        host.set_project_root(Some(self.project_root(project_root)));
        let session = MemorySession::new();
        session.set_current(current.map(DisplayFrame::Frame));
        host.set_session(Some(session));

        let list = Rc::new(MemoryList::of_frames(frames));
        let window = MemoryToolWindow::new();
        window.add_tab(
            TabId(0),
            MemoryComponent::panel(vec![
                MemoryComponent::list(Rc::clone(&list)) as ComponentRef<MemoryFrame>
            ]),
        );
        host.set_tool_window(PanelId::Debug, window);
        (host, list)
    }

    /// A reconciler over `host` with hiding switched on.
    fn reconciler(
        &self,
        host: Rc<MemoryHost<MemoryFrame>>,
        executor: Rc<dyn UiExecutor>,
    ) -> Reconciler<MemoryFrame> {
        let settings = SettingsStore::new(self.config.settings.clone());
        settings.set_hide_enabled(true);
        Reconciler::new(
            host,
            Rc::new(settings),
            executor,
            self.config.reconcile.clone(),
        )
    }

    fn handle_patterns(&self, command: &PatternCommands) -> Result<String, CliError> {
        match command {
            PatternCommands::List { format } => {
                format_patterns(&self.config.settings.library_patterns, format)
            }
            PatternCommands::Add { pattern } => {
                let store = SettingsStore::new(self.config.settings.clone());
                let trimmed = pattern.trim();
                if trimmed.is_empty() {
                    return Err(ActionError::InvalidPattern(pattern.clone()).into());
                }
                if !store.add_pattern(trimmed) {
                    return Ok(format!("Pattern already present: {}", trimmed));
                }
                let path = self.save_settings(&store.snapshot())?;
                Ok(format!("Added pattern '{}' ({})", trimmed, path.display()))
            }
            PatternCommands::Remove { pattern } => {
                let store = SettingsStore::new(self.config.settings.clone());
                if !store.remove_pattern(pattern.trim()) {
                    return Ok(format!("Pattern not found: {}", pattern.trim()));
                }
                let path = self.save_settings(&store.snapshot())?;
                Ok(format!("Removed pattern '{}' ({})", pattern.trim(), path.display()))
            }
        }
    }

    /// Write `settings` into the `[settings]` table of the config file in use,
    /// keeping every other table.
    fn save_settings(&self, settings: &HiderSettings) -> Result<PathBuf, CliError> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| workspace_config_path(&self.workspace_root));

        let mut document: toml::Table = if path.exists() {
            let existing = std::fs::read_to_string(&path)?;
            toml::from_str(&existing).map_err(ConfigError::Parse)?
        } else {
            toml::Table::new()
        };
        document.insert("settings".to_string(), toml::Value::try_from(settings)?);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, toml::to_string_pretty(&document)?)?;
        info!(path = %path.display(), "Saved settings");
        Ok(path)
    }
}

fn report(reconciler: &Reconciler<MemoryFrame>) {
    let stats = reconciler.stats();
    debug!(?stats, "Collapse pipeline finished");
    if stats.views_written == 0 {
        warn!("Call stack was not filtered");
    }
}

/// Parse one frame per non-blank line; `#` starts a comment line.
/// Frame ids are the 1-based line numbers.
pub fn parse_frames(text: &str) -> Result<Vec<MemoryFrame>, CliError> {
    let frames: Vec<MemoryFrame> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with('#'))
        .filter_map(|(index, line)| MemoryFrame::parse(index as u64 + 1, line))
        .collect();
    if frames.is_empty() {
        return Err(CliError::InvalidInput("no frames in input".to_string()));
    }
    Ok(frames)
}

fn read_input(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
