/// Commit history collection for the layout pass.
pub mod hist;
/// Working tree status.
pub mod status;

pub use hist::{HistoryOptions, load_history};
pub use status::has_uncommitted_changes;
