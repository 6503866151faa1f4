//! Utility functions shared by the manifest pipeline.
//!
//! - **URL checks**: advisory validation of feed URLs before they are
//!   written to the manifest
//!
//! # Examples
//!
//! ```
//! use fetchlist::util::check_url;
//!
//! assert!(check_url("https://example.com/feed.xml").is_ok());
//! assert!(check_url("ftp://example.com/feed.xml").is_err());
//! ```

mod url_validator;

pub use url_validator::{check_url, UrlCheckError};
