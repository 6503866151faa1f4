use serde_yaml::{Mapping, Number, Value};
use thiserror::Error;

/// Final path segment appended to every manifest entry.
pub const FEED_FILE_NAME: &str = "feed.xml";

/// Maximum number of child keys between the root and a visited node.
/// Far beyond anything the YAML parser accepts; only trees assembled
/// through the library API can reach it.
pub const MAX_DEPTH: usize = 1024;

const URL_KEY: &str = "_url";
const TITLE_KEY: &str = "_title";
const TAGS_KEY: &str = "_tags";

/// Errors that can occur while flattening a feed tree.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The tree nests child keys deeper than [`MAX_DEPTH`].
    #[error("Feed tree nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// One flattened manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    /// Child keys from the root to the declaring node, joined by `/`,
    /// with [`FEED_FILE_NAME`] as the last segment.
    pub path: String,
    /// Value of the node's `_url` attribute.
    pub url: String,
    /// Value of `_title`, if set.
    pub title: Option<String>,
    /// Value of `_tags`, if set. A single scalar becomes a one-element list.
    pub tags: Option<Vec<String>>,
}

/// Walks a feed tree depth-first and returns one [`FeedRecord`] per node
/// with a truthy `_url`.
///
/// Records come out in traversal order (document order for mappings);
/// callers that need a stable manifest sort them afterwards.
///
/// A node with both `_url` and child keys yields its own record and is
/// still descended into. Scalar leaves end the walk. Sequence elements
/// are visited as children keyed by their index.
///
/// # Errors
///
/// Returns [`FlattenError::MaxDepthExceeded`] if a branch is nested more
/// than [`MAX_DEPTH`] keys deep.
pub fn flatten(root: &Value) -> Result<Vec<FeedRecord>, FlattenError> {
    let mut path = Vec::new();
    let mut records = Vec::new();
    visit(root, &mut path, &mut records)?;
    Ok(records)
}

fn visit(
    node: &Value,
    path: &mut Vec<String>,
    records: &mut Vec<FeedRecord>,
) -> Result<(), FlattenError> {
    match node {
        Value::Mapping(map) => {
            if let Some(record) = record_for(map, path) {
                records.push(record);
            }

            for (key, child) in map {
                let Some(key) = plain_text(key) else {
                    tracing::warn!(
                        parent = %path.join("/"),
                        "Skipping child with a non-scalar key"
                    );
                    continue;
                };
                if key.starts_with('_') {
                    continue;
                }
                descend(key, child, path, records)?;
            }
        }
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                descend(index.to_string(), item, path, records)?;
            }
        }
        Value::Tagged(tagged) => visit(&tagged.value, path, records)?,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
    Ok(())
}

fn descend(
    key: String,
    child: &Value,
    path: &mut Vec<String>,
    records: &mut Vec<FeedRecord>,
) -> Result<(), FlattenError> {
    if path.len() >= MAX_DEPTH {
        return Err(FlattenError::MaxDepthExceeded(MAX_DEPTH));
    }
    path.push(key);
    let result = visit(child, path, records);
    path.pop();
    result
}

/// Builds the record for a mapping node, or `None` if it has no usable `_url`.
fn record_for(map: &Mapping, path: &[String]) -> Option<FeedRecord> {
    let raw_url = map.get(URL_KEY)?;
    let record_path = format!("{}/{}", path.join("/"), FEED_FILE_NAME);

    let url = match raw_url {
        Value::Sequence(_) | Value::Mapping(_) => {
            tracing::warn!(path = %record_path, "Ignoring _url that is not a scalar");
            return None;
        }
        other => scalar_text(other)?,
    };

    let title = map.get(TITLE_KEY).and_then(|value| match value {
        Value::Sequence(_) | Value::Mapping(_) => {
            tracing::warn!(path = %record_path, "Ignoring _title that is not a scalar");
            None
        }
        other => scalar_text(other),
    });

    let tags = map.get(TAGS_KEY).and_then(|value| tag_list(value, &record_path));

    Some(FeedRecord {
        path: record_path,
        url,
        title,
        tags,
    })
}

fn tag_list(value: &Value, record_path: &str) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => Some(items.iter().filter_map(plain_text).collect()),
        Value::Mapping(_) => {
            tracing::warn!(path = %record_path, "Ignoring _tags given as a mapping");
            None
        }
        Value::Tagged(tagged) => tag_list(&tagged.value, record_path),
        other => scalar_text(other).map(|tag| vec![tag]),
    }
}

/// Renders a truthy scalar as text. Null, `false`, zero, NaN and the empty
/// string are falsy and yield `None`, as do collections.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64().is_some_and(|f| f == 0.0 || f.is_nan()) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        other => plain_text(other),
    }
}

/// Text form of any scalar, falsy or not. Used for mapping keys (YAML
/// allows `2019:` or `true:`) and tag items. Collections have no text form.
fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_owned()),
        Value::Tagged(tagged) => plain_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Prints numbers the way feed lists have always been rendered: `1.0` as
/// `1`, `.inf` as `Infinity`, `.nan` as `NaN`.
fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_nan() => "NaN".to_owned(),
        Some(f) if f == f64::INFINITY => "Infinity".to_owned(),
        Some(f) if f == f64::NEG_INFINITY => "-Infinity".to_owned(),
        // -0.0 prints as "0"
        Some(f) if f == 0.0 => "0".to_owned(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).expect("test YAML should parse")
    }

    fn paths(records: &[FeedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_nested_feeds() {
        let doc = yaml(
            r#"
a:
  _url: "http://x/f.xml"
b:
  c:
    _url: "http://y/f.xml"
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(
            records,
            vec![
                FeedRecord {
                    path: "a/feed.xml".to_string(),
                    url: "http://x/f.xml".to_string(),
                    title: None,
                    tags: None,
                },
                FeedRecord {
                    path: "b/c/feed.xml".to_string(),
                    url: "http://y/f.xml".to_string(),
                    title: None,
                    tags: None,
                },
            ]
        );
    }

    #[test]
    fn test_parent_with_url_and_children() {
        let doc = yaml(
            r#"
blog:
  _url: "https://example.com/rss"
  d:
    _url: "https://example.com/d/rss"
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(paths(&records), vec!["blog/feed.xml", "blog/d/feed.xml"]);
    }

    #[test]
    fn test_root_url_has_leading_slash() {
        let doc = yaml(r#"_url: "https://example.com/rss""#);

        let records = flatten(&doc).unwrap();
        assert_eq!(paths(&records), vec!["/feed.xml"]);
    }

    #[test]
    fn test_title_and_tags_copied() {
        let doc = yaml(
            r#"
lwn:
  _url: "https://lwn.net/headlines/rss"
  _title: "LWN.net"
  _tags: [linux, kernel]
single:
  _url: "https://example.com/rss"
  _tags: news
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("LWN.net"));
        assert_eq!(
            records[0].tags,
            Some(vec!["linux".to_string(), "kernel".to_string()])
        );
        assert_eq!(records[1].title, None);
        assert_eq!(records[1].tags, Some(vec!["news".to_string()]));
    }

    #[test]
    fn test_no_url_anywhere() {
        let doc = yaml(
            r#"
group:
  _title: "Only a title"
  sub:
    other: 3
"#,
        );

        assert!(flatten(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_falsy_urls_skipped() {
        let doc = yaml(
            r#"
empty: { _url: "" }
null_url: { _url: ~ }
false_url: { _url: false }
zero: { _url: 0 }
numeric: { _url: 42 }
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(paths(&records), vec!["numeric/feed.xml"]);
        assert_eq!(records[0].url, "42");
    }

    #[test]
    fn test_collection_url_skipped() {
        let doc = yaml(
            r#"
listy:
  _url: [a, b]
mappy:
  _url: { nested: true }
"#,
        );

        assert!(flatten(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_underscore_children_not_visited() {
        let doc = yaml(
            r#"
_hidden:
  _url: "https://hidden.example.com/rss"
shown:
  _url: "https://shown.example.com/rss"
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(paths(&records), vec!["shown/feed.xml"]);
    }

    #[test]
    fn test_scalar_leaves_end_recursion() {
        let doc = yaml(
            r#"
name: "just a string"
count: 7
nothing: ~
"#,
        );

        assert!(flatten(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_sequence_children_keyed_by_index() {
        let doc = yaml(
            r#"
mirrors:
  - _url: "https://one.example.com/rss"
  - _url: "https://two.example.com/rss"
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(
            paths(&records),
            vec!["mirrors/0/feed.xml", "mirrors/1/feed.xml"]
        );
    }

    #[test]
    fn test_non_string_keys_rendered() {
        let doc = yaml(
            r#"
2019:
  _url: "https://example.com/2019.xml"
true:
  _url: "https://example.com/true.xml"
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(paths(&records), vec!["2019/feed.xml", "true/feed.xml"]);
    }

    #[test]
    fn test_document_order_preserved() {
        let doc = yaml(
            r#"
zeta: { _url: "https://z.example.com" }
alpha: { _url: "https://a.example.com" }
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(paths(&records), vec!["zeta/feed.xml", "alpha/feed.xml"]);
    }

    fn nested(depth: usize) -> Value {
        let mut leaf = Mapping::new();
        leaf.insert(
            Value::String(URL_KEY.to_string()),
            Value::String("https://deep.example.com/rss".to_string()),
        );
        let mut node = Value::Mapping(leaf);
        for _ in 0..depth {
            let mut parent = Mapping::new();
            parent.insert(Value::String("level".to_string()), node);
            node = Value::Mapping(parent);
        }
        node
    }

    #[test]
    fn test_nesting_at_depth_limit_allowed() {
        let records = flatten(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].path.matches('/').count(),
            MAX_DEPTH,
            "path should hold every level plus the feed file"
        );
    }

    #[test]
    fn test_deeply_nested_tree_rejected() {
        let err = flatten(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(matches!(err, FlattenError::MaxDepthExceeded(MAX_DEPTH)));
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_hundred_levels_from_yaml_text() {
        let mut src = String::new();
        for _ in 0..100 {
            src.push_str("{l: ");
        }
        src.push_str("{_url: 'https://deep.example.com/rss'}");
        for _ in 0..100 {
            src.push('}');
        }

        let records = flatten(&yaml(&src)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, format!("{}feed.xml", "l/".repeat(100)));
    }

    #[test]
    fn test_falsy_tag_items_kept() {
        let doc = yaml(
            r#"
feed:
  _url: "https://example.com/rss"
  _tags: [0, false, "", ~, keep]
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(
            records[0].tags,
            Some(vec![
                "0".to_string(),
                "false".to_string(),
                String::new(),
                "null".to_string(),
                "keep".to_string(),
            ])
        );
    }

    #[test]
    fn test_float_values_rendered_plainly() {
        let doc = yaml(
            r#"
1.5:
  _url: 1.0
  _tags: [.inf, -.inf, .nan, -0.0, 2.25]
"#,
        );

        let records = flatten(&doc).unwrap();
        assert_eq!(records[0].path, "1.5/feed.xml");
        assert_eq!(records[0].url, "1");
        assert_eq!(
            records[0].tags,
            Some(vec![
                "Infinity".to_string(),
                "-Infinity".to_string(),
                "NaN".to_string(),
                "0".to_string(),
                "2.25".to_string(),
            ])
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let doc = yaml(
            r#"
a: { _url: "https://a.example.com", b: { _url: "https://b.example.com" } }
c: { d: { e: { _url: "https://e.example.com" } } }
"#,
        );

        assert_eq!(flatten(&doc).unwrap(), flatten(&doc).unwrap());
    }
}
