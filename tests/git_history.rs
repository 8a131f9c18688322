//! Loading and laying out real repositories.

use std::collections::HashMap;
use std::path::Path;

use commit_lanes::git::{HistoryOptions, has_uncommitted_changes, load_history};
use commit_lanes::graph::{GraphError, GraphLog, layout};
use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

fn commit(repo: &Repository, parents: &[Oid], secs: i64, message: &str) -> Oid {
    let tree_id = repo.treebuilder(None).unwrap().write().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parents: Vec<git2::Commit<'_>> = parents
        .iter()
        .map(|id| repo.find_commit(*id).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
    let signature = Signature::new("Lane Tester", "lanes@example.com", &Time::new(secs, 0)).unwrap();
    repo.commit(None, &signature, &signature, message, &tree, &parent_refs)
        .unwrap()
}

struct Fixture {
    dir: TempDir,
    ids: HashMap<&'static str, Oid>,
}

/// A, B, C on main; D, E on feature off B; F merges C and E into main.
fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let a = commit(&repo, &[], 100, "A");
    let b = commit(&repo, &[a], 200, "B");
    let c = commit(&repo, &[b], 300, "C");
    let d = commit(&repo, &[b], 310, "D");
    let e = commit(&repo, &[d], 320, "E");
    let f = commit(&repo, &[c, e], 400, "F");

    repo.reference("refs/heads/main", f, true, "main").unwrap();
    repo.set_head("refs/heads/main").unwrap();
    repo.branch("feature", &repo.find_commit(e).unwrap(), false)
        .unwrap();
    repo.tag_lightweight("v1", &repo.find_object(b, None).unwrap(), false)
        .unwrap();

    let ids = HashMap::from([("A", a), ("B", b), ("C", c), ("D", d), ("E", e), ("F", f)]);
    Fixture { dir, ids }
}

fn lane_of(log: &GraphLog, fixture: &Fixture, name: &str) -> usize {
    let id = fixture.ids[name].into();
    let row = log.row_of(&id).unwrap();
    log.get(row).unwrap().lane.position()
}

fn load(path: &Path, options: &HistoryOptions) -> GraphLog {
    let commits = load_history(path, options).unwrap();
    layout(&commits).unwrap()
}

#[test]
fn lays_out_branch_and_merge() {
    let fixture = fixture();
    let log = load(fixture.dir.path(), &HistoryOptions::default());

    assert_eq!(log.len(), 6);
    assert_eq!(log.max_lanes(), 2);
    assert!(log.diagnostics().is_empty());
    for name in ["A", "B", "C", "F"] {
        assert_eq!(lane_of(&log, &fixture, name), 0, "{name}");
    }
    for name in ["D", "E"] {
        assert_eq!(lane_of(&log, &fixture, name), 1, "{name}");
    }

    let head = log.get(0).unwrap();
    assert_eq!(head.commit.summary, "F");
    assert_eq!(head.commit.labels, vec!["main"]);
    assert_eq!(head.parent_count, 2);
    assert_eq!(head.commit.timestamp.unix_timestamp(), 400);

    let labels_of = |name: &str| {
        let row = log.row_of(&fixture.ids[name].into()).unwrap();
        log.get(row).unwrap().commit.labels.clone()
    };
    assert_eq!(labels_of("E"), vec!["feature"]);
    assert_eq!(labels_of("B"), vec!["v1"]);
    assert!(labels_of("A").is_empty());
}

#[test]
fn max_count_cuts_off_parents() {
    let fixture = fixture();
    let options = HistoryOptions {
        max_count: Some(3),
        ..HistoryOptions::default()
    };
    let log = load(fixture.dir.path(), &options);

    assert_eq!(log.len(), 3);
    assert_eq!(log.max_lanes(), 1);
    assert!(log.iter().all(|node| node.lane.position() == 0));
    assert_eq!(log.diagnostics().len(), 2);
    assert!(
        log.diagnostics()
            .iter()
            .all(|diagnostic| matches!(diagnostic, GraphError::MissingParent { .. }))
    );
}

#[test]
fn all_branches_includes_unmerged_tips() {
    let fixture = fixture();
    let repo = Repository::open(fixture.dir.path()).unwrap();
    let side = commit(&repo, &[fixture.ids["A"]], 500, "S");
    repo.branch("side", &repo.find_commit(side).unwrap(), false)
        .unwrap();

    let head_only = load_history(fixture.dir.path(), &HistoryOptions::default()).unwrap();
    assert_eq!(head_only.len(), 6);

    let options = HistoryOptions {
        all_branches: true,
        ..HistoryOptions::default()
    };
    let everything = load_history(fixture.dir.path(), &options).unwrap();
    assert_eq!(everything.len(), 7);
    assert_eq!(everything[0].summary, "S");
    let log = layout(&everything).unwrap();
    assert_eq!(log.len(), 7);
    assert!(log.diagnostics().is_empty());
}

#[test]
fn unborn_head_is_an_empty_history() {
    let dir = TempDir::new().unwrap();
    Repository::init(dir.path()).unwrap();
    let commits = load_history(dir.path(), &HistoryOptions::default()).unwrap();
    assert!(commits.is_empty());
}

#[test]
fn not_a_repository_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_history(dir.path(), &HistoryOptions::default()).is_err());
}

#[test]
fn detects_uncommitted_changes() {
    let fixture = fixture();
    assert!(!has_uncommitted_changes(fixture.dir.path()).unwrap());
    std::fs::write(fixture.dir.path().join("notes.txt"), "draft").unwrap();
    assert!(has_uncommitted_changes(fixture.dir.path()).unwrap());
}
