use thiserror::Error;

#[derive(Debug, Error)]
pub enum KazamiError {
    /// Feed unreachable or malformed.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("parse failed: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
