use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::filter::FilterOption;

/// Which kind of content a feed carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedCategory {
    /// Broadcatching for torrent files and direct downloads.
    Link,
    /// News around the web.
    Text,
    /// Airing times.
    Time,
}

impl FeedCategory {
    pub const ALL: &[FeedCategory] = &[Self::Link, Self::Text, Self::Time];
}

impl std::fmt::Display for FeedCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Link => write!(f, "link"),
            Self::Text => write!(f, "text"),
            Self::Time => write!(f, "time"),
        }
    }
}

/// Filter outcome for one item within one fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedItemState {
    #[default]
    Blank,
    DiscardedNormal,
    /// Discarded, but the user may still pick it by hand.
    DiscardedInactive,
    /// Discarded and not shown at all.
    DiscardedHidden,
    Selected,
}

impl FeedItemState {
    pub fn is_discarded(self) -> bool {
        matches!(
            self,
            Self::DiscardedNormal | Self::DiscardedInactive | Self::DiscardedHidden
        )
    }

    /// Listing rank: selected first, then blank, then discards by severity.
    fn priority(self) -> u8 {
        match self {
            Self::Selected => 0,
            Self::Blank => 1,
            Self::DiscardedNormal => 2,
            Self::DiscardedInactive => 3,
            Self::DiscardedHidden => 4,
        }
    }
}

impl std::fmt::Display for FeedItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "blank"),
            Self::DiscardedNormal => write!(f, "discarded"),
            Self::DiscardedInactive => write!(f, "inactive"),
            Self::DiscardedHidden => write!(f, "hidden"),
            Self::Selected => write!(f, "selected"),
        }
    }
}

/// What a torrent listing contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TorrentCategory {
    Anime,
    /// A range of episodes or a complete season in one torrent.
    Batch,
    Other,
}

impl std::fmt::Display for TorrentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anime => write!(f, "anime"),
            Self::Batch => write!(f, "batch"),
            Self::Other => write!(f, "other"),
        }
    }
}

static RE_BATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:batch|complete)\b",
        r"|[\[(]\d{1,4} ?[-~] ?\d{1,4}[\])]",
        r"|\s\d{1,4} ?~ ?\d{1,4}\b",
    ))
    .unwrap()
});

/// A release listing exactly as the source feed published it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericFeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub category: String,
    pub comments: String,
    pub enclosure: String,
    pub guid: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub source: String,
    pub is_permalink: bool,
    /// Size advertised through feed extensions (e.g. `nyaa:size`).
    pub size: Option<String>,
}

/// Metadata derived from the release title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeData {
    /// Resolved library id, if the title was recognized.
    pub anime_id: Option<i64>,
    pub anime_title: String,
    pub episode_number: Option<u32>,
    /// Decimal part of a special such as "12.5".
    pub episode_fraction: Option<u32>,
    pub version: Option<u32>,
    pub group: String,
    pub resolution: String,
    pub video_type: String,
    pub file_size: String,
    /// Newer than anything available locally. Informational only.
    pub new_episode: bool,
}

/// Identity used to group releases of the same anime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimeKey {
    Id(i64),
    Title(String),
}

/// One release listing with its derived metadata and filter state.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    /// Position within the current fetch cycle.
    pub index: usize,
    pub entry: GenericFeedItem,
    pub magnet_link: Option<String>,
    pub state: FeedItemState,
    /// Set when the release is already in the download archive.
    pub archived: bool,
    /// Matched a prefer filter during the last pass.
    pub preferred: bool,
    pub episode_data: EpisodeData,
}

impl FeedItem {
    pub fn new(index: usize, mut entry: GenericFeedItem) -> Self {
        // Some trackers publish the magnet URI as the item link.
        let magnet_link = if entry.link.starts_with("magnet:") {
            Some(std::mem::take(&mut entry.link))
        } else {
            None
        };
        Self {
            index,
            entry,
            magnet_link,
            state: FeedItemState::Blank,
            archived: false,
            preferred: false,
            episode_data: EpisodeData::default(),
        }
    }

    pub fn is_discarded(&self) -> bool {
        self.state.is_discarded()
    }

    /// Discard according to `option`. A selected item stays selected.
    pub fn discard(&mut self, option: FilterOption) -> bool {
        if self.state == FeedItemState::Selected {
            return false;
        }
        self.state = match option {
            FilterOption::Default => FeedItemState::DiscardedNormal,
            FilterOption::Deactivate => FeedItemState::DiscardedInactive,
            FilterOption::Hide => FeedItemState::DiscardedHidden,
        };
        true
    }

    pub fn select(&mut self) {
        self.state = FeedItemState::Selected;
    }

    /// Discard unconditionally, overriding a previous selection.
    pub fn demote(&mut self) {
        self.state = FeedItemState::DiscardedNormal;
    }

    /// Identifier recorded in the download archive: the published release name.
    pub fn canonical_id(&self) -> &str {
        self.entry.title.trim()
    }

    /// Link to hand to a downloader, magnet preferred.
    pub fn download_link(&self) -> Option<&str> {
        self.magnet_link
            .as_deref()
            .or(Some(self.entry.link.as_str()).filter(|l| !l.is_empty()))
    }

    pub fn anime_key(&self) -> Option<AnimeKey> {
        if let Some(id) = self.episode_data.anime_id {
            return Some(AnimeKey::Id(id));
        }
        let title = self.episode_data.anime_title.trim();
        (!title.is_empty()).then(|| AnimeKey::Title(title.to_lowercase()))
    }

    /// Classify the listing. The tracker's own category wins over the title.
    pub fn torrent_category(&self) -> TorrentCategory {
        let category = self.entry.category.to_lowercase();
        if category.contains("batch") {
            return TorrentCategory::Batch;
        }
        if category.contains("anime") {
            return TorrentCategory::Anime;
        }
        if RE_BATCH.is_match(&self.entry.title) {
            return TorrentCategory::Batch;
        }
        if self.episode_data.episode_number.is_some() || self.anime_key().is_some() {
            return TorrentCategory::Anime;
        }
        TorrentCategory::Other
    }

    /// Same anime and same episode, fraction included (both without a number
    /// counts too). "12" and "12.5" are different episodes.
    pub fn is_same_episode(&self, other: &FeedItem) -> bool {
        let (mine, theirs) = (&self.episode_data, &other.episode_data);
        match (self.anime_key(), other.anime_key()) {
            (Some(a), Some(b)) => {
                a == b
                    && mine.episode_number == theirs.episode_number
                    && mine.episode_fraction == theirs.episode_fraction
            }
            _ => false,
        }
    }
}

/// Items order by listing rank, ties by feed position.
impl Ord for FeedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.state
            .priority()
            .cmp(&other.state.priority())
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for FeedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FeedItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FeedItem {}

/// The items of one category for the current fetch cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub category: FeedCategory,
    pub items: Vec<FeedItem>,
    /// Item currently being handed to the downloader.
    pub download_index: Option<usize>,
}

impl Feed {
    pub fn new(category: FeedCategory) -> Self {
        Self {
            title: String::new(),
            link: String::new(),
            description: String::new(),
            category,
            items: Vec::new(),
            download_index: None,
        }
    }

    /// Append an entry, assigning the next index.
    pub fn push(&mut self, entry: GenericFeedItem) -> &mut FeedItem {
        let index = self.items.len();
        self.items.push(FeedItem::new(index, entry));
        &mut self.items[index]
    }

    pub fn selected(&self) -> impl Iterator<Item = &FeedItem> {
        self.items
            .iter()
            .filter(|i| i.state == FeedItemState::Selected)
    }

    /// Items a listing should show: everything except hidden discards.
    pub fn visible(&self) -> impl Iterator<Item = &FeedItem> {
        self.items
            .iter()
            .filter(|i| i.state != FeedItemState::DiscardedHidden)
    }

    /// Visible items in listing order. `items` itself keeps feed order.
    pub fn sorted(&self) -> Vec<&FeedItem> {
        let mut items: Vec<_> = self.visible().collect();
        items.sort();
        items
    }

    /// Advance the download cursor to the next selected item after it.
    pub fn next_download(&mut self) -> Option<usize> {
        let start = self.download_index.map_or(0, |i| i + 1);
        let next = self.items[start.min(self.items.len())..]
            .iter()
            .find(|i| i.state == FeedItemState::Selected)
            .map(|i| i.index);
        self.download_index = next;
        next
    }
}
