use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use crate::graph::{CommitId, Lane};

/// Everything that can go wrong, or merely look odd, during a layout pass.
///
/// `MissingParent` and `DuplicateParentReference` never abort a pass. They are
/// collected as diagnostics next to the result. The rest end the pass.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphError {
    #[error("Lane {lane} was released while not in use.")]
    InvalidLaneRelease { lane: Lane },
    #[error("Commit {child} names parent {parent}, which is not part of the history.")]
    MissingParent { child: CommitId, parent: CommitId },
    #[error("Commit {commit} lists parent {parent} more than once.")]
    DuplicateParentReference { commit: CommitId, parent: CommitId },
    #[error("Malformed history at commit {commit}: {reason}.")]
    MalformedInput {
        commit: CommitId,
        reason: MalformedReason,
    },
    #[error("Graph computation was superseded by a newer refresh.")]
    Cancelled,
}

impl GraphError {
    /// Whether the pass degrades gracefully instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GraphError::MissingParent { .. } | GraphError::DuplicateParentReference { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "parent", rename_all = "snake_case")]
pub enum MalformedReason {
    DuplicateCommit,
    SelfParent,
    ParentAlreadyVisited(CommitId),
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::DuplicateCommit => write!(f, "the commit appears twice"),
            MalformedReason::SelfParent => write!(f, "the commit lists itself as a parent"),
            MalformedReason::ParentAlreadyVisited(parent) => {
                write!(f, "parent {parent} was already visited")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_degradations_are_recoverable() {
        let missing = GraphError::MissingParent {
            child: "b".into(),
            parent: "a".into(),
        };
        let duplicate = GraphError::DuplicateParentReference {
            commit: "b".into(),
            parent: "a".into(),
        };
        assert!(missing.is_recoverable());
        assert!(duplicate.is_recoverable());
        assert!(!GraphError::Cancelled.is_recoverable());
        assert!(
            !GraphError::InvalidLaneRelease {
                lane: Lane::new(0)
            }
            .is_recoverable()
        );
    }

    #[test]
    fn malformed_input_message_names_the_reason() {
        let err = GraphError::MalformedInput {
            commit: "c".into(),
            reason: MalformedReason::ParentAlreadyVisited("a".into()),
        };
        assert_eq!(
            err.to_string(),
            "Malformed history at commit c: parent a was already visited."
        );
    }
}
