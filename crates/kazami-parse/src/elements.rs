use serde::{Deserialize, Serialize};

/// Elements extracted from a release title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elements {
    /// The anime title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw episode text as it appeared (e.g. "05v2", "12.5").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    /// Decimal part of a special such as "12.5".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_fraction: Option<u32>,
    /// Release version from a `v2`-style suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    /// Normalized resolution (e.g. "1080p").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Video codec or bit-depth term (e.g. "HEVC", "x264").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// CRC32 checksum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
}

impl Elements {
    /// True when neither a title nor an episode number could be found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.episode_number.is_none()
    }
}
