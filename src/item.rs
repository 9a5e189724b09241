use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};

/// One entry from a feed, in the shape the JSON endpoints emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl ArticleItem {
    /// Publication date, if present and parseable.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.pub_date.as_deref().and_then(parse_pub_date)
    }

    fn from_entry(entry: feed_rs::model::Entry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone());

        let published = entry.published.or(entry.updated);

        let summary = entry.summary.map(|s| s.content);
        let content = entry.content.and_then(|c| c.body).or(summary);
        let content_snippet = content
            .as_deref()
            .map(strip_html)
            .filter(|s| !s.is_empty());

        let guid = Some(entry.id).filter(|id| !id.is_empty());

        Self {
            title: entry.title.map(|t| t.content),
            link,
            pub_date: published.map(|dt| dt.to_rfc2822()),
            iso_date: published.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            creator: entry.authors.into_iter().next().map(|p| p.name),
            content,
            content_snippet,
            guid,
            categories: entry
                .categories
                .into_iter()
                .map(|c| c.label.unwrap_or(c.term))
                .collect(),
        }
    }
}

/// A decoded feed. Lives only for the duration of one request.
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    pub title: Option<String>,
    pub link: Option<String>,
    pub items: Vec<ArticleItem>,
}

impl From<feed_rs::model::Feed> for RawFeed {
    fn from(feed: feed_rs::model::Feed) -> Self {
        Self {
            title: feed.title.map(|t| t.content),
            link: feed.links.first().map(|l| l.href.clone()),
            items: feed.entries.into_iter().map(ArticleItem::from_entry).collect(),
        }
    }
}

/// Parse a feed-native date string. Naive forms are read as UTC.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Text content of an HTML fragment, whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    mod parse_pub_date_tests {
        use super::*;

        #[test]
        fn test_rfc2822() {
            let dt = parse_pub_date("Mon, 09 Dec 2024 12:00:00 +0000").unwrap();
            assert_eq!(dt.year(), 2024);
            assert_eq!(dt.month(), 12);
        }

        #[test]
        fn test_rfc2822_gmt() {
            let dt = parse_pub_date("Mon, 09 Dec 2024 12:00:00 GMT").unwrap();
            assert_eq!(dt.day(), 9);
        }

        #[test]
        fn test_rfc3339_converted_to_utc() {
            let dt = parse_pub_date("2024-01-01T01:00:00+03:00").unwrap();
            assert_eq!(dt.year(), 2023);
            assert_eq!(dt.month(), 12);
        }

        #[test]
        fn test_plain_date() {
            let dt = parse_pub_date("2024-03-01").unwrap();
            assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 1));
        }

        #[test]
        fn test_naive_datetime() {
            assert!(parse_pub_date("2024-03-01 10:30:00").is_some());
            assert!(parse_pub_date("2024-03-01T10:30:00").is_some());
        }

        #[test]
        fn test_garbage() {
            assert_eq!(parse_pub_date("yesterday-ish"), None);
            assert_eq!(parse_pub_date(""), None);
            assert_eq!(parse_pub_date("2024-13-45"), None);
        }
    }

    #[test]
    fn test_published_missing() {
        let item = ArticleItem::default();
        assert_eq!(item.published(), None);
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hello <b>world</b></p>\n<p>again</p>"),
            "Hello world again"
        );
        assert_eq!(strip_html("plain text"), "plain text");
    }

    #[test]
    fn test_serializes_camel_case_and_skips_empty() {
        let item = ArticleItem {
            title: Some("Hi".to_string()),
            pub_date: Some("2024-01-01".to_string()),
            content_snippet: Some("snip".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["pubDate"], "2024-01-01");
        assert_eq!(json["contentSnippet"], "snip");
        assert!(json.get("link").is_none());
        assert!(json.get("categories").is_none());
    }

    #[test]
    fn test_raw_feed_from_rss() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0">
                <channel>
                    <title>Tech News</title>
                    <link>https://technews.example.com</link>
                    <description>Latest tech news</description>
                    <item>
                        <title>Breaking: New Technology Announced</title>
                        <link>https://technews.example.com/article/1</link>
                        <guid>https://technews.example.com/article/1</guid>
                        <description>&lt;p&gt;Something &lt;em&gt;big&lt;/em&gt;&lt;/p&gt;</description>
                        <category>Tech</category>
                        <category>Gadgets</category>
                        <pubDate>Mon, 09 Dec 2024 12:00:00 GMT</pubDate>
                    </item>
                    <item>
                        <title>No date here</title>
                        <link>https://technews.example.com/article/2</link>
                    </item>
                </channel>
            </rss>
        "#;

        let feed: RawFeed = feed_rs::parser::parse(xml.as_bytes()).unwrap().into();

        assert_eq!(feed.title.as_deref(), Some("Tech News"));
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(
            first.title.as_deref(),
            Some("Breaking: New Technology Announced")
        );
        assert_eq!(
            first.link.as_deref(),
            Some("https://technews.example.com/article/1")
        );
        assert_eq!(first.content_snippet.as_deref(), Some("Something big"));
        assert_eq!(first.categories, vec!["Tech", "Gadgets"]);
        assert_eq!(first.published().unwrap().year(), 2024);
        assert!(first.iso_date.as_deref().unwrap().starts_with("2024-12-09T12:00:00"));

        let second = &feed.items[1];
        assert_eq!(second.pub_date, None);
        assert_eq!(second.published(), None);
    }

    #[test]
    fn test_raw_feed_from_atom() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <feed xmlns="http://www.w3.org/2005/Atom">
                <title>Atom Blog</title>
                <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
                <updated>2024-05-01T10:00:00Z</updated>
                <entry>
                    <title>Atom Entry</title>
                    <link rel="alternate" href="https://blog.example.com/atom-entry"/>
                    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
                    <updated>2024-05-01T10:00:00Z</updated>
                    <author><name>Jo</name></author>
                    <summary>Short summary</summary>
                </entry>
            </feed>
        "#;

        let feed: RawFeed = feed_rs::parser::parse(xml.as_bytes()).unwrap().into();

        assert_eq!(feed.items.len(), 1);
        let entry = &feed.items[0];
        assert_eq!(
            entry.link.as_deref(),
            Some("https://blog.example.com/atom-entry")
        );
        assert_eq!(entry.creator.as_deref(), Some("Jo"));
        assert_eq!(entry.content_snippet.as_deref(), Some("Short summary"));
        assert_eq!(entry.published().unwrap().month(), 5);
    }
}
