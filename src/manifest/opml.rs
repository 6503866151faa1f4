use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

use super::{write_atomic, FeedRecord};

const OPML_TITLE: &str = "fetchlist feeds";

/// Exports records as an OPML 2.0 XML string.
///
/// Each record becomes one `<outline type="rss">` element. The record's
/// `_title` fills `text` and `title` (falling back to the manifest path),
/// and `_tags` are joined with commas into the `category` attribute.
/// This is the only output that carries titles and tags.
pub fn export_opml(records: &[FeedRecord]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut opml = BytesStart::new("opml");
    opml.push_attribute(("version", "2.0"));
    writer
        .write_event(Event::Start(opml))
        .context("Failed to write opml element")?;

    writer
        .write_event(Event::Start(BytesStart::new("head")))
        .context("Failed to write head element")?;
    writer
        .write_event(Event::Start(BytesStart::new("title")))
        .context("Failed to write title element")?;
    writer
        .write_event(Event::Text(BytesText::new(OPML_TITLE)))
        .context("Failed to write title text")?;
    writer
        .write_event(Event::End(BytesEnd::new("title")))
        .context("Failed to write title end")?;
    writer
        .write_event(Event::End(BytesEnd::new("head")))
        .context("Failed to write head end")?;

    writer
        .write_event(Event::Start(BytesStart::new("body")))
        .context("Failed to write body element")?;

    for record in records {
        let title = record.title.as_deref().unwrap_or(&record.path);
        let mut outline = BytesStart::new("outline");
        outline.push_attribute(("type", "rss"));
        outline.push_attribute(("text", title));
        outline.push_attribute(("title", title));
        outline.push_attribute(("xmlUrl", record.url.as_str()));
        if let Some(tags) = record.tags.as_ref().filter(|tags| !tags.is_empty()) {
            outline.push_attribute(("category", tags.join(",").as_str()));
        }
        writer
            .write_event(Event::Empty(outline))
            .context("Failed to write outline element")?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("body")))
        .context("Failed to write body end")?;
    writer
        .write_event(Event::End(BytesEnd::new("opml")))
        .context("Failed to write opml end")?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).context("Generated OPML contains invalid UTF-8")
}

/// Writes the OPML export for `records` to `path`, replacing it atomically.
pub async fn export_to_file(records: &[FeedRecord], path: &Path) -> Result<()> {
    let content = export_opml(records)?;
    write_atomic(path, &content).await?;
    Ok(())
}
