//! CLI presentation: text and json formatters per command family.

use crate::error::CliError;
use crate::frame::classifier::FrameKind;
use crate::frame::{DisplayFrame, StackFrame};
use crate::host::memory::MemoryFrame;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

/// One row of `classify` output
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRow {
    pub path: String,
    pub kind: FrameKindLabel,
    /// Why the path is library code, if it is
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKindLabel {
    Project,
    Library,
}

impl From<FrameKind> for FrameKindLabel {
    fn from(kind: FrameKind) -> Self {
        match kind {
            FrameKind::Project => FrameKindLabel::Project,
            FrameKind::Library => FrameKindLabel::Library,
        }
    }
}

impl std::fmt::Display for FrameKindLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKindLabel::Project => write!(f, "project"),
            FrameKindLabel::Library => write!(f, "library"),
        }
    }
}

pub fn format_classify_table(rows: &[ClassifyRow]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Path", "Kind", "Reason"]);
    for row in rows {
        table.add_row(vec![
            row.path.clone(),
            row.kind.to_string(),
            row.reason.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.to_string()
}

pub fn format_classify_json(rows: &[ClassifyRow]) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&json!({ "frames": rows }))?)
}

/// Render a collapsed view, one entry per line.
///
/// `selected` marks the row restored as the current frame. Placeholders are
/// dimmed when `color` is set.
pub fn format_view_text(
    view: &[DisplayFrame<MemoryFrame>],
    selected: Option<usize>,
    color: bool,
) -> String {
    view.iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if selected == Some(index) { ">" } else { " " };
            match entry {
                DisplayFrame::Frame(frame) => format!("{} {}", marker, describe_frame(frame)),
                DisplayFrame::Hidden(hidden) if color => {
                    format!("{} {}", marker, hidden.label().dimmed())
                }
                DisplayFrame::Hidden(hidden) => format!("{} {}", marker, hidden.label()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_view_json(
    view: &[DisplayFrame<MemoryFrame>],
    selected: Option<usize>,
) -> Result<String, CliError> {
    let entries: Vec<serde_json::Value> = view
        .iter()
        .map(|entry| match entry {
            DisplayFrame::Frame(frame) => json!({
                "kind": "frame",
                "id": frame.id,
                "function": frame.function,
                "file": frame.source_position().map(|p| p.file.display().to_string()),
                "line": frame.source_position().and_then(|p| p.line),
            }),
            DisplayFrame::Hidden(hidden) => json!({
                "kind": "hidden",
                "count": hidden.count(),
            }),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&json!({
        "entries": entries,
        "selected": selected,
    }))?)
}

pub fn format_patterns(patterns: &[String], format: &str) -> Result<String, CliError> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(&json!({ "patterns": patterns }))?);
    }
    if patterns.is_empty() {
        return Ok("No library patterns configured.".to_string());
    }
    let mut lines: Vec<String> = patterns
        .iter()
        .enumerate()
        .map(|(i, p)| format!("  {}. {}", i + 1, p))
        .collect();
    lines.insert(0, "Library patterns:".to_string());
    Ok(lines.join("\n"))
}

fn describe_frame(frame: &MemoryFrame) -> String {
    match frame.source_position() {
        Some(position) => format!("{} ({})", frame.function, position),
        None => frame.function.clone(),
    }
}
