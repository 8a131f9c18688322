use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::graph::{Commit, CommitId, GraphError, Lane};

/// One laid-out row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub row: usize,
    pub commit: Arc<Commit>,
    pub lane: Lane,
    /// Parents that get an edge below this row.
    pub parent_count: usize,
    /// Visited children that pointed at this commit.
    pub child_count: usize,
    pub passing_lanes: BTreeSet<Lane>,
    pub forking_off_lanes: BTreeSet<Lane>,
    pub merging_lanes: BTreeSet<Lane>,
}

impl GraphNode {
    /// A row with no graph information, used when a pass had to be abandoned.
    pub fn flat(row: usize, commit: Arc<Commit>) -> Self {
        GraphNode {
            row,
            commit,
            lane: Lane::new(0),
            parent_count: 0,
            child_count: 0,
            passing_lanes: BTreeSet::new(),
            forking_off_lanes: BTreeSet::new(),
            merging_lanes: BTreeSet::new(),
        }
    }

    pub fn color_index(&self, palette_size: usize) -> usize {
        self.lane.color_index(palette_size)
    }

    /// Number of columns this row touches.
    pub fn width(&self) -> usize {
        self.passing_lanes
            .iter()
            .chain(&self.forking_off_lanes)
            .chain(&self.merging_lanes)
            .chain(std::iter::once(&self.lane))
            .map(|lane| lane.position() + 1)
            .max()
            .unwrap_or(1)
    }
}

/// The finished output of one pass, in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphLog {
    nodes: Vec<GraphNode>,
    max_lanes: usize,
    diagnostics: Vec<GraphError>,
}

impl GraphLog {
    pub(crate) fn new(nodes: Vec<GraphNode>, max_lanes: usize, diagnostics: Vec<GraphError>) -> Self {
        GraphLog {
            nodes,
            max_lanes,
            diagnostics,
        }
    }

    /// Every commit on lane 0 with no connecting lines.
    pub fn flat<I>(commits: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Commit>>,
    {
        let nodes: Vec<GraphNode> = commits
            .into_iter()
            .enumerate()
            .map(|(row, commit)| GraphNode::flat(row, commit.into()))
            .collect();
        let max_lanes = usize::from(!nodes.is_empty());
        GraphLog::new(nodes, max_lanes, Vec::new())
    }

    /// Node at a selected row, if any.
    pub fn get(&self, row: usize) -> Option<&GraphNode> {
        self.nodes.get(row)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraphNode> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Highest number of lane positions the pass ever needed.
    pub fn max_lanes(&self) -> usize {
        self.max_lanes
    }

    /// Recoverable oddities noticed along the way.
    pub fn diagnostics(&self) -> &[GraphError] {
        &self.diagnostics
    }

    pub fn row_of(&self, id: &CommitId) -> Option<usize> {
        self.nodes.iter().position(|node| &node.commit.id == id)
    }
}

impl<'a> IntoIterator for &'a GraphLog {
    type Item = &'a GraphNode;
    type IntoIter = std::slice::Iter<'a, GraphNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
