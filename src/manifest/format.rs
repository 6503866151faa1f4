use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::FeedRecord;

/// Errors that can occur while writing an output file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sorts records ascending by their full path string.
///
/// The sort is stable, so records sharing a path keep traversal order.
pub fn sort_records(records: &mut [FeedRecord]) {
    records.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Serializes records as `path<TAB>url` lines, each followed by `\n`.
///
/// Titles and tags are not part of the manifest. An empty slice renders
/// as a single `"\n"`.
pub fn render_tsv(records: &[FeedRecord]) -> String {
    let lines: Vec<String> = records
        .iter()
        .map(|record| {
            if has_separator(&record.path) || has_separator(&record.url) {
                tracing::warn!(
                    path = %record.path,
                    url = %record.url,
                    "Manifest entry contains a tab or newline and will not split cleanly"
                );
            }
            format!("{}\t{}", record.path, record.url)
        })
        .collect();

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn has_separator(field: &str) -> bool {
    field.contains(['\t', '\n', '\r'])
}

/// Replaces the file at `path` with `content`.
///
/// The content goes to a uniquely named temporary file next to `path`, is
/// synced to disk, then renamed over the destination. A failure at any
/// step removes the temporary file and leaves the destination untouched.
pub async fn write_atomic(path: &Path, content: &str) -> Result<(), WriteError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let io_error = |at: &Path, source| WriteError::Io {
        path: at.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .await
        .map_err(|e| io_error(&temp_path, e))?;

    let written = match file.write_all(content.as_bytes()).await {
        Ok(()) => file.sync_all().await,
        Err(e) => Err(e),
    };
    drop(file);

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(io_error(&temp_path, e));
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(io_error(path, e));
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote output file");
    Ok(())
}
