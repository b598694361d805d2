pub mod aggregator;
pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod feed;
pub mod filter;
pub mod library;
pub mod title;

pub use aggregator::Aggregator;
pub use archive::{Archive, ArchiveStore};
pub use download::Downloader;
pub use error::KazamiError;
pub use feed::{
    EpisodeData, Feed, FeedCategory, FeedItem, FeedItemState, FeedTransport, GenericFeedItem,
    RssTransport, TorrentCategory,
};
pub use filter::{FeedFilter, FeedFilterCondition, FeedFilterManager, FeedFilterPreset};
pub use library::{AnimeInfo, Library, MemoryLibrary, WatchStatus};
pub use title::{ReleaseTitleParser, TitleParser};
