use std::path::Path;

use git2::{Repository, Status, StatusOptions};
use tracing::trace;

use crate::AppResult;

fn get_status_opts() -> StatusOptions {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .include_ignored(false)
        .include_unmodified(false)
        .exclude_submodules(true)
        .recurse_untracked_dirs(true)
        .renames_head_to_index(true)
        .renames_index_to_workdir(true)
        .no_refresh(false)
        .update_index(false);
    opts
}

/// Whether the working tree or the index differ from HEAD.
///
/// Bare repositories have no working tree and never report changes.
#[tracing::instrument(name = "Checking for uncommitted changes", level = "debug")]
pub fn has_uncommitted_changes(path: &Path) -> AppResult<bool> {
    let repo = Repository::discover(path)?;
    if repo.is_bare() {
        return Ok(false);
    }
    let statuses = repo.statuses(Some(&mut get_status_opts()))?;
    for entry in statuses.iter() {
        let s = entry.status();
        if s.intersects(
            Status::WT_MODIFIED
                | Status::WT_DELETED
                | Status::WT_NEW
                | Status::WT_TYPECHANGE
                | Status::WT_RENAMED
                | Status::INDEX_MODIFIED
                | Status::INDEX_DELETED
                | Status::INDEX_NEW
                | Status::INDEX_TYPECHANGE
                | Status::INDEX_RENAMED
                | Status::CONFLICTED,
        ) {
            trace!("Uncommitted change in: {:?}", entry.path());
            return Ok(true);
        }
    }
    Ok(false)
}
