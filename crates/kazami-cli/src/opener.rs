use kazami_core::{Downloader, FeedItem, KazamiError};

/// Hands magnet or torrent links to the system's default handler.
pub struct LinkOpener;

impl Downloader for LinkOpener {
    async fn download(&self, item: &FeedItem) -> Result<(), KazamiError> {
        let link = item
            .download_link()
            .ok_or_else(|| KazamiError::Download(format!("no link for {}", item.entry.title)))?
            .to_string();
        tokio::task::spawn_blocking(move || open::that(&link))
            .await
            .map_err(|e| KazamiError::Download(e.to_string()))?
            .map_err(|e| KazamiError::Download(format!("failed to open link: {e}")))
    }
}

/// Prints links instead of opening them.
pub struct LinkPrinter;

impl Downloader for LinkPrinter {
    async fn download(&self, item: &FeedItem) -> Result<(), KazamiError> {
        let link = item
            .download_link()
            .ok_or_else(|| KazamiError::Download(format!("no link for {}", item.entry.title)))?;
        println!("{link}");
        Ok(())
    }
}
