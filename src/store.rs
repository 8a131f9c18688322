//! Publishing layout results to readers.
//!
//! A refresh runs the repository load and the layout pass on a blocking
//! worker. Readers only ever see a complete result: the previous one stays in
//! place until a newer pass finishes, and a pass overtaken by a later refresh
//! is thrown away.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::graph::{Commit, GraphBuilder, GraphError, GraphLog};
use crate::{AppError, AppResult};

#[derive(Debug, Clone)]
pub enum LogStatus {
    Loading,
    Loaded(Arc<GraphLog>),
    Failed {
        message: String,
        /// Commits without lanes, when they could be loaded at all.
        fallback: Option<Arc<GraphLog>>,
    },
}

impl LogStatus {
    /// The log to show, laid out or flat.
    pub fn log(&self) -> Option<&Arc<GraphLog>> {
        match self {
            LogStatus::Loading => None,
            LogStatus::Loaded(log) => Some(log),
            LogStatus::Failed { fallback, .. } => fallback.as_ref(),
        }
    }
}

/// What became of one call to [`GraphStore::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published,
    /// A later refresh started before this one finished.
    Superseded,
    /// The pass failed and a failure status was published.
    Failed,
}

#[derive(Debug)]
pub struct GraphStore {
    generation: Arc<AtomicU64>,
    status: watch::Sender<LogStatus>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        let (status, _) = watch::channel(LogStatus::Loading);
        GraphStore {
            generation: Arc::new(AtomicU64::new(0)),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LogStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> LogStatus {
        self.status.borrow().clone()
    }

    /// Load commits with `load` and lay them out off the async runtime.
    ///
    /// Errors from `load` itself are published as a failure and returned.
    #[tracing::instrument(name = "Refreshing commit graph", level = "info", skip_all)]
    pub async fn refresh<F>(&self, load: F) -> AppResult<RefreshOutcome>
    where
        F: FnOnce() -> AppResult<Vec<Commit>> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = Arc::clone(&self.generation);
        debug!("Starting graph pass {}", generation);

        let span = tracing::Span::current();
        let handle = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let commits: Vec<Arc<Commit>> = load()?.into_iter().map(Arc::new).collect();
            let known = commits.iter().map(|commit| commit.id.clone());
            let result = GraphBuilder::with_known_commits(known)
                .process(commits.iter().cloned())
                .collect_log_until(|| latest.load(Ordering::Acquire) != generation);
            Ok::<_, AppError>((result, commits))
        });

        let (result, commits) = match handle.await? {
            Ok(done) => done,
            Err(err) => {
                error!("Loading history failed: {}", err);
                self.publish_if_current(
                    generation,
                    LogStatus::Failed {
                        message: format!("graph computation failed: {err}"),
                        fallback: None,
                    },
                );
                return Err(err);
            }
        };

        match result {
            Ok(log) => {
                let rows = log.len();
                if self.publish_if_current(generation, LogStatus::Loaded(Arc::new(log))) {
                    info!("Published graph with {} rows", rows);
                    Ok(RefreshOutcome::Published)
                } else {
                    Ok(RefreshOutcome::Superseded)
                }
            }
            Err(GraphError::Cancelled) => {
                debug!("Graph pass {} was superseded", generation);
                Ok(RefreshOutcome::Superseded)
            }
            Err(err) => {
                error!("Graph pass {} failed: {}", generation, err);
                let status = LogStatus::Failed {
                    message: format!("graph computation failed: {err}"),
                    fallback: Some(Arc::new(GraphLog::flat(commits))),
                };
                if self.publish_if_current(generation, status) {
                    Ok(RefreshOutcome::Failed)
                } else {
                    Ok(RefreshOutcome::Superseded)
                }
            }
        }
    }

    fn publish_if_current(&self, generation: u64, status: LogStatus) -> bool {
        // Compare inside the send so a newer pass cannot publish in between.
        self.status.send_if_modified(|current| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            *current = status;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Lane;

    fn history() -> Vec<Commit> {
        vec![
            Commit::new("m", ["a", "b"]),
            Commit::new("b", ["a"]),
            Commit::root("a"),
        ]
    }

    #[tokio::test]
    async fn publishes_completed_pass() {
        let store = GraphStore::new();
        assert!(matches!(store.status(), LogStatus::Loading));
        let outcome = store.refresh(|| Ok(history())).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Published);
        let status = store.status();
        let LogStatus::Loaded(log) = &status else {
            panic!("expected a loaded log, got {status:?}");
        };
        assert_eq!(log.len(), 3);
        assert_eq!(log.get(1).unwrap().lane, Lane::new(1));
    }

    #[tokio::test]
    async fn malformed_history_falls_back_to_flat_list() {
        let store = GraphStore::new();
        let outcome = store
            .refresh(|| Ok(vec![Commit::new("a", ["b"]), Commit::new("b", ["a"])]))
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Failed);
        let status = store.status();
        let LogStatus::Failed { message, fallback } = &status else {
            panic!("expected a failure, got {status:?}");
        };
        assert!(message.starts_with("graph computation failed"));
        let fallback = fallback.as_ref().unwrap();
        assert_eq!(fallback.len(), 2);
        assert!(fallback.iter().all(|node| node.lane == Lane::new(0)));
        assert_eq!(status.log().map(|log| log.len()), Some(2));
    }

    #[tokio::test]
    async fn load_error_is_published_and_returned() {
        let store = GraphStore::new();
        let result = store
            .refresh(|| Err(AppError::Other("no repository".into())))
            .await;
        assert!(matches!(result, Err(AppError::Other(_))));
        assert!(matches!(
            store.status(),
            LogStatus::Failed { fallback: None, .. }
        ));
    }

    #[tokio::test]
    async fn failed_refresh_replaces_previous_result() {
        let store = GraphStore::new();
        store.refresh(|| Ok(history())).await.unwrap();
        store
            .refresh(|| Ok(vec![Commit::new("a", ["a"])]))
            .await
            .unwrap();
        assert!(matches!(store.status(), LogStatus::Failed { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overtaken_pass_publishes_nothing() {
        let store = GraphStore::new();
        let mut updates = store.subscribe();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (resume_tx, resume_rx) = std::sync::mpsc::channel::<()>();

        let slow = store.refresh(move || {
            started_tx.send(()).ok();
            resume_rx.recv().ok();
            Ok(history())
        });
        let fast = async {
            started_rx.await.unwrap();
            store
                .refresh(move || {
                    resume_tx.send(()).ok();
                    Ok(vec![Commit::root("only")])
                })
                .await
                .unwrap()
        };

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow.unwrap(), RefreshOutcome::Superseded);
        assert_eq!(fast, RefreshOutcome::Published);

        assert!(updates.has_changed().unwrap());
        let status = updates.borrow_and_update().clone();
        let LogStatus::Loaded(log) = status else {
            panic!("expected a loaded log");
        };
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(0).unwrap().commit.id.as_str(), "only");
    }
}
