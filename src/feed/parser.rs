use serde::Deserialize;

/// One `<item>` element, as it appears in the document.
///
/// `pub_date` stays a raw string: publication dates are parsed during
/// reconciliation, where an unparsable value is counted per item instead of
/// failing the whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    pub description: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
}

/// Channel metadata plus items in document order (not necessarily
/// chronological).
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RawFeedItem>,
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "item")]
    items: Vec<RawFeedItem>,
}

/// Decode an RSS 2.0 document. XML entities are unescaped by the
/// deserializer; unknown elements are ignored.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, quick_xml::DeError> {
    let doc: RssDocument = quick_xml::de::from_reader(bytes)?;
    Ok(ParsedFeed {
        title: doc.channel.title,
        link: doc.channel.link,
        description: doc.channel.description,
        items: doc.channel.items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example &amp; Sons</title>
    <link>https://example.com</link>
    <description>News from Example</description>
    <item>
      <title>First post</title>
      <link>https://example.com/first</link>
      <description>Hello world</description>
      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
    </item>
    <item>
      <title>Second post</title>
      <link>https://example.com/second</link>
      <pubDate>Mon, 02 Jan 2006 15:04:05 MST</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel_and_items_in_order() {
        let feed = parse_feed(SAMPLE.as_bytes()).unwrap();
        assert_eq!(feed.title, "Example & Sons");
        assert_eq!(feed.link, "https://example.com");
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].title, "First post");
        assert_eq!(feed.items[1].title, "Second post");
        assert_eq!(
            feed.items[0].pub_date.as_deref(),
            Some("Mon, 02 Jan 2006 15:04:05 -0700")
        );
    }

    #[test]
    fn test_missing_description_is_none() {
        let feed = parse_feed(SAMPLE.as_bytes()).unwrap();
        assert_eq!(feed.items[0].description.as_deref(), Some("Hello world"));
        assert_eq!(feed.items[1].description, None);
    }

    #[test]
    fn test_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.title, "Empty");
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let xml = r#"<rss version="2.0"><channel>
            <title>T</title>
            <language>en</language>
            <item>
                <title>Post</title>
                <link>https://example.com/p</link>
                <guid>abc</guid>
                <category>misc</category>
            </item>
        </channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].link, "https://example.com/p");
    }

    #[test]
    fn test_not_xml_is_error() {
        assert!(parse_feed(b"<not valid xml").is_err());
        assert!(parse_feed(b"{\"json\": true}").is_err());
    }
}
