//! Feed list manifest: loading, flattening, and output formats.
//!
//! - `loader` - Reads the YAML feed list from disk
//! - `flatten` - Walks the feed tree into [`FeedRecord`]s
//! - `format` - Sorts records, renders the TSV manifest, writes files atomically
//! - `opml` - Optional OPML 2.0 export that keeps titles and tags
//!
//! # Example
//!
//! ```
//! use fetchlist::manifest::{flatten, parse_document, render_tsv, sort_records};
//!
//! let doc = parse_document("b: {c: {_url: 'http://y'}}\na: {_url: 'http://x'}\n").unwrap();
//! let mut records = flatten(&doc).unwrap();
//! sort_records(&mut records);
//! assert_eq!(render_tsv(&records), "a/feed.xml\thttp://x\nb/c/feed.xml\thttp://y\n");
//! ```

mod flatten;
mod format;
mod loader;
mod opml;

pub use flatten::{flatten, FeedRecord, FlattenError, FEED_FILE_NAME, MAX_DEPTH};
pub use format::{render_tsv, sort_records, write_atomic, WriteError};
pub use loader::{load, parse_document, LoadError, MAX_INPUT_SIZE};
pub use opml::{export_opml, export_to_file};
