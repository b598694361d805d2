use std::future::Future;

use crate::error::KazamiError;
use crate::feed::FeedItem;

/// Acquires a selected item. Success means the release may be archived.
pub trait Downloader: Send + Sync {
    fn download(&self, item: &FeedItem) -> impl Future<Output = Result<(), KazamiError>> + Send;
}
