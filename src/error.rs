use thiserror::Error;

/// Unified application error type to simplify bubbling errors through async flows.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Errored while handling a file. {0}")]
    Io(#[from] std::io::Error),
    #[error("Error from git. {0}")]
    Git(#[from] git2::Error),
    #[error("Error serializing json. {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Runtime error. {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
    #[error("Directory lookup failed. {0}")]
    Dir(#[from] commit_lanes_dirs::DirError),
    #[error("Timestamp out of range. {0}")]
    TimeRange(#[from] time::error::ComponentRange),
    #[error("Invalid configuration. {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for results that bubble `AppError`.
pub type AppResult<T> = Result<T, AppError>;
