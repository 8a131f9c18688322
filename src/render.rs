use crate::graph::{GraphLog, GraphNode, Lane};
use crate::palette::Palette;
use crate::time_utils::format_timestamp;

const RESET: &str = "\x1b[0m";

/// Plain-text rendering of laid-out rows, one line per commit.
#[derive(Debug, Clone)]
pub struct TextRenderer<'a> {
    palette: &'a Palette,
    color: bool,
}

impl<'a> TextRenderer<'a> {
    pub fn new(palette: &'a Palette, color: bool) -> Self {
        TextRenderer { palette, color }
    }

    pub fn render(&self, log: &GraphLog, uncommitted_changes: bool) -> String {
        let width = log.max_lanes().max(1);
        let mut out = String::new();
        if uncommitted_changes {
            out.push_str(&self.render_uncommitted(width));
            out.push('\n');
        }
        for node in log {
            out.push_str(&self.render_row(node, width));
            out.push('\n');
        }
        out
    }

    /// Pseudo row on lane 0 standing for the working tree.
    pub fn render_uncommitted(&self, width: usize) -> String {
        let mut line = String::new();
        self.push_glyph(&mut line, Lane::new(0), '*');
        line.push(' ');
        line.push_str(&" ".repeat(2 * width.saturating_sub(1)));
        line.push_str("Uncommitted changes");
        line
    }

    pub fn render_row(&self, node: &GraphNode, width: usize) -> String {
        let mut line = String::new();
        for position in 0..width.max(node.width()) {
            let lane = Lane::new(position);
            match glyph(node, lane) {
                Some(glyph) => self.push_glyph(&mut line, lane, glyph),
                None => line.push(' '),
            }
            line.push(' ');
        }

        let commit = &node.commit;
        line.push_str(commit.id.short());
        if !commit.labels.is_empty() {
            line.push_str(&format!(" ({})", commit.labels.join(", ")));
        }
        if !commit.summary.is_empty() {
            line.push(' ');
            line.push_str(&commit.summary);
        }
        line.push_str(&format!(" [{}]", format_timestamp(&commit.timestamp)));
        line.trim_end().to_string()
    }

    fn push_glyph(&self, line: &mut String, lane: Lane, glyph: char) {
        if self.color {
            line.push_str(&self.palette.ansi_for(lane));
            line.push(glyph);
            line.push_str(RESET);
        } else {
            line.push(glyph);
        }
    }
}

/// Character drawn for `lane` on this row, if any.
fn glyph(node: &GraphNode, lane: Lane) -> Option<char> {
    if lane == node.lane {
        return Some('*');
    }
    let right = lane > node.lane;
    let forking = node.forking_off_lanes.contains(&lane);
    let merging = node.merging_lanes.contains(&lane);
    match (forking, merging) {
        (true, true) => Some(if right { '>' } else { '<' }),
        // Runs up from the node.
        (true, false) => Some(if right { '/' } else { '\\' }),
        // Runs down from the node.
        (false, true) => Some(if right { '\\' } else { '/' }),
        (false, false) if node.passing_lanes.contains(&lane) => Some('|'),
        (false, false) => None,
    }
}
