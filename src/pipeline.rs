//! End-to-end manifest run: load → flatten → sort → render → write.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::manifest::{self, FeedRecord};
use crate::util::check_url;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of manifest entries written.
    pub records: usize,
    /// Number of entries whose URL failed the advisory check.
    pub flagged_urls: usize,
    /// Manifest path that was written.
    pub output: PathBuf,
    /// OPML export path, if one was written.
    pub opml: Option<PathBuf>,
}

/// Runs the whole pipeline described by `config`.
///
/// Nothing is written unless the feed list loads and flattens cleanly.
/// Each output file is replaced in one step, so a failed write leaves the
/// previous file in place.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let document = manifest::load(&config.input)
        .await
        .with_context(|| format!("Failed to load feed list '{}'", config.input.display()))?;
    tracing::debug!(document = ?document, "Parsed feed list");

    let mut records = manifest::flatten(&document).context("Failed to flatten feed list")?;
    manifest::sort_records(&mut records);
    tracing::debug!(count = records.len(), records = ?records, "Flattened feed records");

    let flagged_urls = if config.check_urls {
        report_suspicious_urls(&records)
    } else {
        0
    };

    let content = manifest::render_tsv(&records);
    manifest::write_atomic(&config.output, &content)
        .await
        .with_context(|| format!("Failed to write manifest '{}'", config.output.display()))?;

    if let Some(opml_path) = &config.opml {
        manifest::export_to_file(&records, opml_path)
            .await
            .with_context(|| format!("Failed to write OPML export '{}'", opml_path.display()))?;
    }

    tracing::info!(
        records = records.len(),
        flagged = flagged_urls,
        output = %config.output.display(),
        "Wrote fetch manifest"
    );

    Ok(RunSummary {
        records: records.len(),
        flagged_urls,
        output: config.output.clone(),
        opml: config.opml.clone(),
    })
}

/// Logs a warning for every record whose URL fails [`check_url`] and
/// returns how many did. Records are kept either way.
fn report_suspicious_urls(records: &[FeedRecord]) -> usize {
    records
        .iter()
        .filter(|record| match check_url(&record.url) {
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(path = %record.path, url = %record.url, error = %e, "Suspicious feed URL");
                true
            }
        })
        .count()
}
