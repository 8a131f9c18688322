//! Commit graph lane layout, plus the git loading and text output around it.

pub mod config;
pub mod context;
mod error;
pub mod git;
pub mod graph;
pub mod palette;
pub mod render;
pub(crate) mod serde_helpers;
pub mod store;
pub mod time_utils;

pub use error::{AppError, AppResult};
