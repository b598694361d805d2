pub mod models;
pub mod transport;

pub use models::{
    AnimeKey, EpisodeData, Feed, FeedCategory, FeedItem, FeedItemState, GenericFeedItem,
    TorrentCategory,
};
pub use transport::{FeedTransport, RawFeed, RssTransport};
