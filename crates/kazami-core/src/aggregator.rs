//! Per-category feeds, the download archive, and the fetch-filter cycle.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use futures::future::join_all;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::archive::Archive;
use crate::download::Downloader;
use crate::error::KazamiError;
use crate::feed::{Feed, FeedCategory, FeedItem, FeedTransport, GenericFeedItem, RawFeed};
use crate::filter::FeedFilterManager;
use crate::library::Library;
use crate::title::{ReleaseTitleParser, TitleParser};

static RE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?\s*(?:[KMGT]i?B|bytes))\b").unwrap()
});

/// Owns one feed per category plus everything needed to filter and download
/// from them. Constructed once and handed to whatever drives the cycles.
pub struct Aggregator {
    feeds: Vec<Feed>,
    archive: Arc<Archive>,
    pub filter_manager: FeedFilterManager,
    /// Run the filter manager over link feeds after each check.
    pub filtering: bool,
    library: Arc<dyn Library>,
    parser: Arc<dyn TitleParser>,
}

impl Aggregator {
    pub fn new(
        filter_manager: FeedFilterManager,
        archive: Arc<Archive>,
        library: Arc<dyn Library>,
    ) -> Self {
        Self {
            feeds: FeedCategory::ALL.iter().map(|&c| Feed::new(c)).collect(),
            archive,
            filter_manager,
            filtering: true,
            library,
            parser: Arc::new(ReleaseTitleParser),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn TitleParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn get(&self, category: FeedCategory) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.category == category)
    }

    pub fn get_mut(&mut self, category: FeedCategory) -> Option<&mut Feed> {
        self.feeds.iter_mut().find(|f| f.category == category)
    }

    pub fn archive(&self) -> Arc<Archive> {
        Arc::clone(&self.archive)
    }

    /// Fetch every source of `category`, rebuild its feed and filter it.
    ///
    /// Returns `Ok(true)` when the feed was replaced. On failure the previous
    /// feed is kept: an `automatic` check logs the error and returns
    /// `Ok(false)`, a manual one returns it.
    pub async fn check<T: FeedTransport>(
        &mut self,
        transport: &T,
        category: FeedCategory,
        sources: &[String],
        automatic: bool,
    ) -> Result<bool, KazamiError> {
        let fetched = match fetch_all(transport, sources).await {
            Ok(raw) => raw,
            Err(e) if automatic => {
                warn!(%category, error = %e, "Automatic feed check failed");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let mut feed = self.build_feed(category, fetched);
        if self.filtering && category == FeedCategory::Link {
            self.filter_manager
                .run(&mut feed, &self.archive, self.library.as_ref(), true);
        }
        info!(%category, items = feed.items.len(), "Feed checked");

        if let Some(slot) = self.get_mut(category) {
            *slot = feed;
        }
        Ok(true)
    }

    fn build_feed(&self, category: FeedCategory, fetched: Vec<(String, RawFeed)>) -> Feed {
        let mut feed = Feed::new(category);
        let mut seen: Vec<GenericFeedItem> = Vec::new();

        for (source, raw) in fetched {
            if feed.title.is_empty() {
                feed.title = raw.title;
                feed.link = raw.link;
                feed.description = raw.description;
            }
            for entry in raw.items {
                if seen.iter().any(|s| Self::compare_feed_items(s, &entry)) {
                    debug!(title = %entry.title, %source, "Dropping duplicate feed item");
                    continue;
                }
                seen.push(entry.clone());
                let item = feed.push(entry);
                self.parse_description(item, &source);
            }
        }
        feed
    }

    /// Fill in episode data for an item. Parse failures leave the defaults.
    pub fn parse_description(&self, item: &mut FeedItem, source: &str) {
        match self.parser.parse(&item.entry.title) {
            Ok(data) => item.episode_data = data,
            Err(e) => {
                debug!(title = %item.entry.title, %source, error = %e, "Could not parse item");
            }
        }

        item.episode_data.file_size = item
            .entry
            .size
            .clone()
            .or_else(|| {
                RE_SIZE
                    .captures(&item.entry.description)
                    .map(|c| c[1].to_string())
            })
            .unwrap_or_default();

        let title = item.episode_data.anime_title.trim();
        if !title.is_empty() {
            item.episode_data.anime_id = self.library.find_anime_id(title);
        }
    }

    /// Same release: equal titles and an equal link or guid.
    pub fn compare_feed_items(a: &GenericFeedItem, b: &GenericFeedItem) -> bool {
        if a.title != b.title {
            return false;
        }
        let same_link = !a.link.is_empty() && a.link == b.link;
        let same_guid = !a.guid.is_empty() && a.guid == b.guid;
        same_link || same_guid
    }

    /// Selected releases that have not been downloaded yet, each logged.
    pub fn notify(&self, category: FeedCategory) -> Vec<&FeedItem> {
        let Some(feed) = self.get(category) else {
            return Vec::new();
        };
        let waiting: Vec<&FeedItem> = feed.selected().filter(|i| !i.archived).collect();
        for item in &waiting {
            info!(
                title = %item.entry.title,
                kind = %item.torrent_category(),
                new = item.episode_data.new_episode,
                "Release available"
            );
        }
        if !waiting.is_empty() {
            info!(%category, count = waiting.len(), "New releases available");
        }
        waiting
    }

    pub fn is_item_download_available(&self, category: FeedCategory) -> bool {
        self.get(category)
            .is_some_and(|f| self.filter_manager.is_item_download_available(f))
    }

    /// Download one item and archive it.
    ///
    /// Returns `Ok(false)` without downloading if the release is already
    /// archived or another download holds it.
    pub async fn download<D: Downloader>(
        &mut self,
        downloader: &D,
        category: FeedCategory,
        index: usize,
    ) -> Result<bool, KazamiError> {
        let archive = Arc::clone(&self.archive);
        let feed = self
            .get_mut(category)
            .ok_or_else(|| KazamiError::Download(format!("no {category} feed")))?;
        let item = feed
            .items
            .get(index)
            .cloned()
            .ok_or_else(|| KazamiError::Download(format!("no item at index {index}")))?;

        let id = item.canonical_id();
        if !archive.claim(id) {
            info!(title = %item.entry.title, "Already downloaded, skipping");
            return Ok(false);
        }
        feed.download_index = Some(index);

        if let Err(e) = downloader.download(&item).await {
            archive.release(id);
            warn!(title = %item.entry.title, error = %e, "Download failed");
            return Err(e);
        }
        // The claim stays pending so this session will not fetch it again.
        if let Err(e) = archive.commit(id) {
            warn!(title = %item.entry.title, error = %e, "Downloaded but not archived");
            return Err(e);
        }
        feed.items[index].archived = true;
        info!(title = %item.entry.title, "Downloaded");
        Ok(true)
    }

    /// Download every selected item in order, returning how many succeeded.
    /// Failures are logged and do not stop the remaining downloads.
    pub async fn download_selected<D: Downloader>(
        &mut self,
        downloader: &D,
        category: FeedCategory,
    ) -> Result<usize, KazamiError> {
        let mut downloaded = 0;
        let mut cursor = None;
        loop {
            let Some(feed) = self.get_mut(category) else {
                return Ok(0);
            };
            feed.download_index = cursor;
            let Some(index) = feed.next_download() else {
                break;
            };
            cursor = Some(index);
            match self.download(downloader, category, index).await {
                Ok(true) => downloaded += 1,
                Ok(false) => {}
                Err(e) => debug!(index, error = %e, "Skipping failed download"),
            }
        }
        if let Some(feed) = self.get_mut(category) {
            feed.download_index = None;
        }
        Ok(downloaded)
    }

    /// Replace the archive with the one stored at `path`. Returns whether the
    /// store could be opened.
    pub fn load_archive(&mut self, path: &Path) -> bool {
        self.archive = Arc::new(Archive::load(path));
        self.archive.is_persistent()
    }

    pub fn save_archive(&self) -> Result<usize, KazamiError> {
        let added = self.archive.save()?;
        debug!(added, "Saved archive");
        Ok(added)
    }

    pub fn search_archive(&self, file: &str) -> bool {
        self.archive.search(file)
    }
}

async fn fetch_all<T: FeedTransport>(
    transport: &T,
    sources: &[String],
) -> Result<Vec<(String, RawFeed)>, KazamiError> {
    if sources.is_empty() {
        return Err(KazamiError::Transport("no sources configured".into()));
    }
    let results = join_all(sources.iter().map(|s| transport.fetch(s))).await;
    sources
        .iter()
        .cloned()
        .zip(results)
        .map(|(source, raw)| raw.map(|raw| (source, raw)))
        .collect()
}
