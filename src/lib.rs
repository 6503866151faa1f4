//! Flattens a YAML tree of feed sources into a tab-separated fetch manifest.
//!
//! The input document nests named groups of feeds. Any mapping that carries
//! a `_url` attribute becomes one manifest entry whose path is the chain of
//! keys leading to it, followed by `feed.xml`:
//!
//! ```yaml
//! news:
//!   lwn:
//!     _url: https://lwn.net/headlines/rss
//!     _title: LWN.net
//! ```
//!
//! becomes `news/lwn/feed.xml<TAB>https://lwn.net/headlines/rss`.
//!
//! The library exposes each stage separately ([`manifest::load`],
//! [`manifest::flatten`], [`manifest::render_tsv`], ...) and the whole run
//! as [`pipeline::run`].

pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod util;
