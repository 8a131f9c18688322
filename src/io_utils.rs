use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use commit_lanes::AppResult;

/// Write `text` to `output`, or to stdout when no path is given.
#[tracing::instrument(name = "Writing output", level = "debug", skip(text))]
pub async fn write_text_output(output: Option<&Path>, text: &str) -> AppResult<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).await?;
            }
            fs::write(path, text).await?;
            debug!("Wrote {} bytes to {}", text.len(), path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Serialize `value` as pretty JSON and write it like [`write_text_output`].
#[tracing::instrument(name = "Writing JSON output", level = "debug", skip(value))]
pub async fn write_json_output<T: Serialize>(output: Option<&Path>, value: &T) -> AppResult<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_text_output(output, &json).await
}
