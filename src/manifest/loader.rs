use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest feed list accepted (16 MiB). Real lists are a few kilobytes;
/// anything near this size is almost certainly the wrong file.
pub const MAX_INPUT_SIZE: u64 = 16 * 1024 * 1024;

/// Errors that can occur while loading the feed list.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file is missing or unreadable.
    #[error("Failed to read feed list '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid YAML.
    #[error("Invalid YAML in feed list: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The file exceeds [`MAX_INPUT_SIZE`].
    #[error("Feed list too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Reads and parses the feed list at `path`.
///
/// The file is read in one piece; nothing downstream runs if this fails.
pub async fn load(path: &Path) -> Result<Value, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
    if metadata.len() > MAX_INPUT_SIZE {
        return Err(LoadError::TooLarge {
            size: metadata.len(),
            max: MAX_INPUT_SIZE,
        });
    }

    let content = tokio::fs::read_to_string(path).await.map_err(io_error)?;
    let document = parse_document(&content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded feed list");
    Ok(document)
}

/// Parses feed list content. Mapping keys keep their document order and
/// `<<: *anchor` merge keys are resolved into the mapping that holds them.
pub fn parse_document(content: &str) -> Result<Value, LoadError> {
    let mut document: Value = serde_yaml::from_str(content)?;
    document.apply_merge()?;
    Ok(document)
}
