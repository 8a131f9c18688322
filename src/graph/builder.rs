use std::collections::{BTreeSet, HashMap, HashSet};
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{Span, debug, trace, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::graph::classify::{RowInput, classify_row};
use crate::graph::{
    Commit, CommitId, GraphError, GraphLog, GraphNode, Lane, LanePool, MalformedReason,
};

/// A lane waiting for the commit it points at.
#[derive(Debug, Clone)]
struct PendingLane {
    lane: Lane,
    child: CommitId,
}

/// State for one layout pass.
///
/// Rows must arrive children first. Every parent named by a visited row gets
/// a pending lane, and the parent claims it when its own row comes up. The
/// builder is single-use: once the input is exhausted, start a new one.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pool: LanePool,
    pending: HashMap<CommitId, Vec<PendingLane>>,
    visited: HashSet<CommitId>,
    known: Option<HashSet<CommitId>>,
    diagnostics: Vec<GraphError>,
    row: usize,
}

impl GraphBuilder {
    /// Builder for a stream whose full set of ids is not known.
    ///
    /// A parent that never shows up keeps its lane active, and drawn as
    /// passing, until [`GraphBuilder::finish`] reports it as missing. Use
    /// [`GraphBuilder::with_known_commits`] when the ids are available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that knows the full set of ids up front.
    ///
    /// Parents outside that set are dropped as soon as they are named, so a
    /// shallow history closes its lanes right away instead of at the end.
    pub fn with_known_commits<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = CommitId>,
    {
        GraphBuilder {
            known: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn pool(&self) -> &LanePool {
        &self.pool
    }

    pub fn diagnostics(&self) -> &[GraphError] {
        &self.diagnostics
    }

    /// Rows laid out so far.
    pub fn rows(&self) -> usize {
        self.row
    }

    /// Lay out the next row.
    pub fn push(&mut self, commit: Arc<Commit>) -> Result<GraphNode, GraphError> {
        let row = self.row;
        if !self.visited.insert(commit.id.clone()) {
            return Err(GraphError::MalformedInput {
                commit: commit.id.clone(),
                reason: MalformedReason::DuplicateCommit,
            });
        }

        let entry_active: BTreeSet<Lane> = self.pool.active_lanes().collect();

        let mut child_lanes: Vec<Lane> = self
            .pending
            .remove(&commit.id)
            .unwrap_or_default()
            .into_iter()
            .map(|pending| pending.lane)
            .collect();
        child_lanes.sort_unstable();

        // The lowest pending lane survives, the others end on this row.
        let own = match child_lanes.first() {
            Some(lane) => *lane,
            None => self.pool.allocate(),
        };
        for lane in child_lanes.iter().skip(1) {
            self.pool.release(*lane)?;
        }

        let parents = self.resolve_parents(&commit)?;
        let mut parent_lanes = Vec::with_capacity(parents.len());
        for (idx, parent) in parents.into_iter().enumerate() {
            let lane = if idx == 0 { own } else { self.pool.allocate() };
            self.pending.entry(parent).or_default().push(PendingLane {
                lane,
                child: commit.id.clone(),
            });
            parent_lanes.push(lane);
        }

        if parent_lanes.is_empty() {
            self.pool.release(own)?;
        }

        let input = RowInput {
            active: &entry_active,
            own,
            child_lanes: &child_lanes,
            parent_lanes: &parent_lanes,
        };
        let lanes = classify_row(&input);
        trace!(
            "Row {} commit {} on lane {} (passing {:?}, forking off {:?}, merging {:?})",
            row,
            commit.id.short(),
            own,
            lanes.passing,
            lanes.forking_off,
            lanes.merging
        );

        self.row += 1;
        Ok(GraphNode {
            row,
            lane: own,
            parent_count: parent_lanes.len(),
            child_count: input.child_count(),
            passing_lanes: lanes.passing,
            forking_off_lanes: lanes.forking_off,
            merging_lanes: lanes.merging,
            commit,
        })
    }

    /// Close lanes whose parent never showed up.
    ///
    /// Called once the input is exhausted. Leftovers are reported in id order
    /// so the diagnostics do not depend on hash order.
    pub fn finish(&mut self) -> Result<(), GraphError> {
        let mut leftovers: Vec<(CommitId, Vec<PendingLane>)> = self.pending.drain().collect();
        leftovers.sort_by(|a, b| a.0.cmp(&b.0));
        for (parent, lanes) in leftovers {
            for PendingLane { lane, child } in lanes {
                self.pool.release(lane)?;
                self.record(GraphError::MissingParent {
                    child,
                    parent: parent.clone(),
                });
            }
        }
        debug!(
            "Laid out {} rows using {} lanes",
            self.row,
            self.pool.high_water()
        );
        Ok(())
    }

    /// Turn this builder into a lazy pass over `commits`.
    pub fn process<I>(self, commits: I) -> GraphPass<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Commit>>,
    {
        GraphPass {
            builder: self,
            commits: commits.into_iter(),
            done: false,
        }
    }

    /// Parents in order, minus duplicates and parents known to be absent.
    fn resolve_parents(&mut self, commit: &Commit) -> Result<Vec<CommitId>, GraphError> {
        let mut resolved: Vec<CommitId> = Vec::with_capacity(commit.parents.len());
        // Dropped parents count too, so a repeated missing parent is one duplicate.
        let mut seen: HashSet<&CommitId> = HashSet::with_capacity(commit.parents.len());
        for parent in &commit.parents {
            if *parent == commit.id {
                return Err(GraphError::MalformedInput {
                    commit: commit.id.clone(),
                    reason: MalformedReason::SelfParent,
                });
            }
            if self.visited.contains(parent) {
                return Err(GraphError::MalformedInput {
                    commit: commit.id.clone(),
                    reason: MalformedReason::ParentAlreadyVisited(parent.clone()),
                });
            }
            if !seen.insert(parent) {
                self.record(GraphError::DuplicateParentReference {
                    commit: commit.id.clone(),
                    parent: parent.clone(),
                });
                continue;
            }
            if let Some(known) = &self.known
                && !known.contains(parent)
            {
                self.record(GraphError::MissingParent {
                    child: commit.id.clone(),
                    parent: parent.clone(),
                });
                continue;
            }
            resolved.push(parent.clone());
        }
        Ok(resolved)
    }

    fn record(&mut self, diagnostic: GraphError) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Lazy, single-use sequence of laid-out rows.
///
/// Yields one `Ok` per input commit. After the first error it yields nothing
/// more. Leftover pending lanes are closed when the input runs out.
#[derive(Debug)]
pub struct GraphPass<I> {
    builder: GraphBuilder,
    commits: I,
    done: bool,
}

impl<I> GraphPass<I>
where
    I: Iterator,
    I::Item: Into<Arc<Commit>>,
{
    pub fn builder(&self) -> &GraphBuilder {
        &self.builder
    }

    /// Drain the pass into a [`GraphLog`].
    pub fn collect_log(self) -> Result<GraphLog, GraphError> {
        self.collect_log_until(|| false)
    }

    /// Drain the pass, giving up with [`GraphError::Cancelled`] as soon as
    /// `is_cancelled` says so. It is checked before every row.
    #[tracing::instrument(name = "Laying out commit graph", level = "info", skip_all)]
    pub fn collect_log_until<F>(mut self, is_cancelled: F) -> Result<GraphLog, GraphError>
    where
        F: Fn() -> bool,
    {
        let (lower, upper) = self.commits.size_hint();
        if upper == Some(lower) {
            Span::current().pb_set_length(lower as u64);
        }

        let mut nodes = Vec::with_capacity(lower);
        loop {
            if is_cancelled() {
                debug!("Abandoning layout after {} rows", nodes.len());
                return Err(GraphError::Cancelled);
            }
            match self.next() {
                Some(node) => {
                    nodes.push(node?);
                    Span::current().pb_inc(1);
                }
                None => break,
            }
        }

        let GraphBuilder {
            pool, diagnostics, ..
        } = self.builder;
        Ok(GraphLog::new(nodes, pool.high_water(), diagnostics))
    }
}

impl<I> Iterator for GraphPass<I>
where
    I: Iterator,
    I::Item: Into<Arc<Commit>>,
{
    type Item = Result<GraphNode, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.commits.next() {
            Some(commit) => {
                let result = self.builder.push(commit.into());
                if result.is_err() {
                    self.done = true;
                }
                Some(result)
            }
            None => {
                self.done = true;
                self.builder.finish().err().map(Err)
            }
        }
    }
}

impl<I> FusedIterator for GraphPass<I>
where
    I: Iterator,
    I::Item: Into<Arc<Commit>>,
{
}

/// Lay out a fully loaded history in one go.
///
/// All ids are known up front, so parents outside the slice become roots on
/// the spot.
pub fn layout<C>(commits: &[C]) -> Result<GraphLog, GraphError>
where
    C: Clone + Into<Arc<Commit>> + AsRef<Commit>,
{
    let known = commits.iter().map(|commit| commit.as_ref().id.clone());
    GraphBuilder::with_known_commits(known)
        .process(commits.iter().cloned())
        .collect_log()
}
