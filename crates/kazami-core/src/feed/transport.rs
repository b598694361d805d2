use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::KazamiError;
use crate::feed::models::GenericFeedItem;

/// A parsed feed as delivered by a transport.
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<GenericFeedItem>,
}

/// Fetches and parses a feed from a source locator.
pub trait FeedTransport: Send + Sync {
    fn fetch(&self, source: &str) -> impl Future<Output = Result<RawFeed, KazamiError>> + Send;
}

/// RSS over HTTP(S), or from a local file for `file://` URLs and plain paths.
#[derive(Debug, Clone, Default)]
pub struct RssTransport {
    client: reqwest::Client,
}

impl RssTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_source(&self, source: &str) -> Result<Vec<u8>, KazamiError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let response = self
                .client
                .get(source)
                .timeout(Duration::from_secs(30))
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| KazamiError::Transport(format!("fetch {source}: {e}")))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| KazamiError::Transport(format!("read {source}: {e}")))?;
            return Ok(bytes.to_vec());
        }

        let path = if source.starts_with("file://") {
            url::Url::parse(source)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| KazamiError::Transport(format!("invalid file URL: {source}")))?
        } else {
            std::path::PathBuf::from(source)
        };
        tokio::fs::read(&path)
            .await
            .map_err(|e| KazamiError::Transport(format!("read {}: {e}", path.display())))
    }
}

impl FeedTransport for RssTransport {
    async fn fetch(&self, source: &str) -> Result<RawFeed, KazamiError> {
        let bytes = self.read_source(source).await?;
        parse_channel(&bytes).map_err(|e| match e {
            KazamiError::Transport(msg) => KazamiError::Transport(format!("{source}: {msg}")),
            other => other,
        })
    }
}

/// Parse an RSS 2.0 document.
pub fn parse_channel(bytes: &[u8]) -> Result<RawFeed, KazamiError> {
    let channel = rss::Channel::read_from(bytes)
        .map_err(|e| KazamiError::Transport(format!("parse: {e}")))?;

    let items = channel.items().iter().map(convert_item).collect();

    Ok(RawFeed {
        title: channel.title().to_string(),
        link: channel.link().to_string(),
        description: channel.description().to_string(),
        items,
    })
}

fn convert_item(item: &rss::Item) -> GenericFeedItem {
    // Nyaa publishes size and swarm counts under its own namespace.
    let size = item
        .extensions()
        .get("nyaa")
        .and_then(|ext| ext.get("size"))
        .and_then(|values| values.first())
        .and_then(|v| v.value())
        .map(|s| s.to_string());

    let pub_date: Option<DateTime<Utc>> = item
        .pub_date()
        .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    GenericFeedItem {
        title: item.title().unwrap_or_default().to_string(),
        link: item.link().unwrap_or_default().to_string(),
        description: item.description().unwrap_or_default().to_string(),
        author: item.author().unwrap_or_default().to_string(),
        category: item
            .categories()
            .first()
            .map(|c| c.name().to_string())
            .unwrap_or_default(),
        comments: item.comments().unwrap_or_default().to_string(),
        enclosure: item.enclosure().map(|e| e.url().to_string()).unwrap_or_default(),
        guid: item.guid().map(|g| g.value().to_string()).unwrap_or_default(),
        pub_date,
        source: item.source().map(|s| s.url().to_string()).unwrap_or_default(),
        is_permalink: item.guid().map_or(true, |g| g.is_permalink()),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:nyaa="https://nyaa.si/xmlns/nyaa">
  <channel>
    <title>Nyaa - Home - Torrent File RSS</title>
    <link>https://nyaa.si/</link>
    <description>RSS Feed for Home</description>
    <item>
      <title>[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv</title>
      <link>https://nyaa.si/download/1.torrent</link>
      <guid isPermaLink="true">https://nyaa.si/view/1</guid>
      <pubDate>Fri, 06 Oct 2023 15:32:00 -0000</pubDate>
      <category>Anime - English-translated</category>
      <description>1.4 GiB</description>
      <nyaa:size>1.4 GiB</nyaa:size>
    </item>
    <item>
      <title>[Other] Show - 01</title>
      <link>magnet:?xt=urn:btih:abc</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel() {
        let feed = parse_channel(SAMPLE.as_bytes()).unwrap();
        assert_eq!(feed.title, "Nyaa - Home - Torrent File RSS");
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.guid, "https://nyaa.si/view/1");
        assert_eq!(first.size.as_deref(), Some("1.4 GiB"));
        assert_eq!(first.category, "Anime - English-translated");
        assert!(first.pub_date.is_some());
        assert!(first.is_permalink);

        assert_eq!(feed.items[1].link, "magnet:?xt=urn:btih:abc");
        assert!(feed.items[1].guid.is_empty());
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_channel(b"<html>not a feed</html>").unwrap_err();
        assert!(matches!(err, KazamiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, SAMPLE).unwrap();

        let transport = RssTransport::default();
        let feed = transport.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(feed.items.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let transport = RssTransport::default();
        let err = transport.fetch("/nonexistent/feed.xml").await.unwrap_err();
        assert!(matches!(err, KazamiError::Transport(_)));
    }
}
