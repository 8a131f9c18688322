use std::path::PathBuf;

use serde::Serialize;

use crate::graph::{GraphLog, GraphNode};
use crate::palette::Palette;

/// One row as written to JSON, with its color resolved.
#[derive(Debug, Serialize)]
pub struct SnapshotRow<'a> {
    #[serde(flatten)]
    pub node: &'a GraphNode,
    pub color_index: usize,
    pub color: String,
}

/// Everything written out for one `log` run.
#[derive(Debug, Serialize)]
pub struct LogSnapshot<'a> {
    pub repository: PathBuf,
    pub uncommitted_changes: bool,
    /// Set when the layout failed and `rows` is the flat fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub max_lanes: usize,
    pub diagnostics: Vec<String>,
    pub rows: Vec<SnapshotRow<'a>>,
}

impl<'a> LogSnapshot<'a> {
    pub fn new(
        repository: PathBuf,
        uncommitted_changes: bool,
        log: &'a GraphLog,
        palette: &Palette,
    ) -> Self {
        LogSnapshot {
            repository,
            uncommitted_changes,
            error: None,
            max_lanes: log.max_lanes(),
            diagnostics: log.diagnostics().iter().map(ToString::to_string).collect(),
            rows: log
                .iter()
                .map(|node| SnapshotRow {
                    node,
                    color_index: node.color_index(palette.len()),
                    color: palette.color_for(node.lane).to_string(),
                })
                .collect(),
        }
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}
