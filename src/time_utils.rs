use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::trace;

use crate::AppResult;

const ROW_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day] [month repr:short] [year] [hour]:[minute]");

/// Convert a git timestamp into a datetime carrying the committer's offset.
pub fn git_time_to_datetime(time: git2::Time) -> AppResult<OffsetDateTime> {
    let utc = OffsetDateTime::from_unix_timestamp(time.seconds())?;
    // Out-of-range offsets fall back to UTC.
    let offset =
        UtcOffset::from_whole_seconds(time.offset_minutes() * 60).unwrap_or(UtcOffset::UTC);
    let dt = utc.to_offset(offset);
    trace!("Converted git time {}s to {}", time.seconds(), dt);
    Ok(dt)
}

/// Short human form used in text rows, e.g. `01 Mar 2024 12:30`.
pub fn format_timestamp(dt: &OffsetDateTime) -> String {
    dt.format(ROW_FORMAT)
        .unwrap_or_else(|_| "Unknown".to_string())
}
