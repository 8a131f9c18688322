use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Number of hex digits shown for abbreviated ids.
pub const SHORT_ID_LEN: usize = 7;

/// Opaque commit identity, usually a hex object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        CommitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, never splitting a multi-byte char.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        CommitId::new(id)
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        CommitId(id)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        CommitId(oid.to_string())
    }
}

/// One commit record as handed over by the repository loader.
///
/// Only `id` and `parents` drive the layout. The timestamp, summary and labels
/// ride along for whoever renders the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    #[serde(with = "crate::serde_helpers::offset_datetime")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Commit {
    pub fn new<I, P>(id: impl Into<CommitId>, parents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<CommitId>,
    {
        Commit {
            id: id.into(),
            parents: parents.into_iter().map(Into::into).collect(),
            timestamp: OffsetDateTime::UNIX_EPOCH,
            summary: String::new(),
            labels: Vec::new(),
        }
    }

    pub fn root(id: impl Into<CommitId>) -> Self {
        Commit::new(id, Vec::<CommitId>::new())
    }

    pub fn with_timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

impl AsRef<Commit> for Commit {
    fn as_ref(&self) -> &Commit {
        self
    }
}
