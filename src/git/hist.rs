use std::collections::HashMap;
use std::path::Path;

use git2::{BranchType, Oid, Repository, Sort};
use tracing::{debug, trace};

use crate::AppResult;
use crate::graph::{Commit, CommitId};
use crate::time_utils::git_time_to_datetime;

/// Which part of the history to walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Walk from every local branch tip instead of only HEAD.
    pub all_branches: bool,
    /// Stop after this many commits. Parents cut off by the limit show up as
    /// missing parents in the layout.
    pub max_count: Option<usize>,
}

/// Branch and tag names keyed by the commit they point at.
///
/// Names within one commit are sorted so the output is stable.
#[tracing::instrument(level = "trace", skip(repo))]
fn collect_labels(repo: &Repository) -> AppResult<HashMap<Oid, Vec<String>>> {
    let mut labels: HashMap<Oid, Vec<String>> = HashMap::new();
    for reference in repo.references()?.flatten() {
        if !(reference.is_branch() || reference.is_tag()) {
            continue;
        }
        let (Some(name), Ok(commit)) = (reference.shorthand(), reference.peel_to_commit()) else {
            trace!("Skipping reference {:?}", reference.name());
            continue;
        };
        labels
            .entry(commit.id())
            .or_default()
            .push(name.to_string());
    }
    for names in labels.values_mut() {
        names.sort();
    }
    Ok(labels)
}

fn local_branch_tips(repo: &Repository) -> AppResult<Vec<(String, Oid)>> {
    let mut branch_tips = Vec::new();
    for branch in repo.branches(Some(BranchType::Local))?.flatten() {
        if let Ok(Some(name)) = branch.0.name()
            && let Some(target) = branch.0.get().target()
        {
            branch_tips.push((name.to_string(), target));
        }
    }
    Ok(branch_tips)
}

/// Load commits from the repository at `path`, children before parents.
///
/// An unborn HEAD yields an empty history rather than an error.
#[tracing::instrument(name = "Loading commit history", level = "debug")]
pub fn load_history(path: &Path, options: &HistoryOptions) -> AppResult<Vec<Commit>> {
    let repo = Repository::discover(path)?;
    let labels = collect_labels(&repo)?;

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

    let branch_tips = if options.all_branches {
        local_branch_tips(&repo)?
    } else {
        Vec::new()
    };
    if branch_tips.is_empty() {
        if let Err(e) = revwalk.push_head() {
            debug!(
                "No HEAD to walk (likely unborn branch) for {:?}: {}",
                path, e
            );
            return Ok(Vec::new());
        }
    } else {
        for (name, tip) in &branch_tips {
            trace!("Walking from branch {} at {}", name, tip);
            revwalk.push(*tip)?;
        }
    }

    let limit = options.max_count.unwrap_or(usize::MAX);
    let mut commits = Vec::new();
    for oid in revwalk.take(limit) {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        trace!("Found commit object: {:?}", commit);
        commits.push(Commit {
            id: CommitId::from(oid),
            parents: commit.parent_ids().map(CommitId::from).collect(),
            timestamp: git_time_to_datetime(commit.time())?,
            summary: commit.summary().unwrap_or_default().to_string(),
            labels: labels.get(&oid).cloned().unwrap_or_default(),
        });
    }
    debug!("Loaded {} commits from {}", commits.len(), path.display());
    Ok(commits)
}
