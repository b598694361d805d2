//! Query contract for the user's anime library.
//!
//! Filter conditions on `META_*`, `USER_STATUS` and `LOCAL_EPISODE_AVAILABLE`
//! only ever see the facts exposed here.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::KazamiError;

/// Airing status of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiringStatus {
    Airing,
    FinishedAiring,
    #[default]
    NotYetAired,
}

impl AiringStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::Airing => 1,
            Self::FinishedAiring => 2,
            Self::NotYetAired => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Airing => "Currently airing",
            Self::FinishedAiring => "Finished airing",
            Self::NotYetAired => "Not yet aired",
        }
    }
}

/// Series type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesType {
    #[default]
    Tv,
    Ova,
    Movie,
    Special,
    Ona,
    Music,
}

impl SeriesType {
    pub fn code(self) -> i64 {
        match self {
            Self::Tv => 1,
            Self::Ova => 2,
            Self::Movie => 3,
            Self::Special => 4,
            Self::Ona => 5,
            Self::Music => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::Ova => "OVA",
            Self::Movie => "Movie",
            Self::Special => "Special",
            Self::Ona => "ONA",
            Self::Music => "Music",
        }
    }
}

/// User's watch status. `NotInList` covers anime the user never added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    #[default]
    NotInList,
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
}

impl WatchStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::NotInList => 0,
            Self::Watching => 1,
            Self::Completed => 2,
            Self::OnHold => 3,
            Self::Dropped => 4,
            Self::PlanToWatch => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotInList => "Not in list",
            Self::Watching => "Watching",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
            Self::Dropped => "Dropped",
            Self::PlanToWatch => "Plan to Watch",
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the filter engine may ask about one anime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeInfo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub airing_status: AiringStatus,
    #[serde(default)]
    pub series_type: SeriesType,
    pub episodes: Option<u32>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    #[serde(default)]
    pub user_status: WatchStatus,
    #[serde(default)]
    pub watched_episodes: u32,
    /// Highest episode found on disk.
    pub last_available_episode: Option<u32>,
}

/// Read-only view of the library.
pub trait Library: Send + Sync {
    /// Resolve a parsed release title to an anime id.
    fn find_anime_id(&self, title: &str) -> Option<i64>;

    fn anime(&self, id: i64) -> Option<AnimeInfo>;
}

/// `HashMap`-backed library, loadable from a TOML snapshot:
///
/// ```toml
/// [[anime]]
/// id = 52991
/// title = "Sousou no Frieren"
/// user_status = "watching"
/// watched_episodes = 4
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    anime: HashMap<i64, AnimeInfo>,
    titles: HashMap<String, i64>,
}

#[derive(Deserialize)]
struct LibraryFile {
    #[serde(default)]
    anime: Vec<AnimeInfo>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: AnimeInfo) {
        for title in std::iter::once(&info.title).chain(&info.synonyms) {
            self.titles.insert(title.to_lowercase(), info.id);
        }
        self.anime.insert(info.id, info);
    }

    pub fn from_toml_str(content: &str) -> Result<Self, KazamiError> {
        let file: LibraryFile =
            toml::from_str(content).map_err(|e| KazamiError::Config(e.to_string()))?;
        let mut library = Self::new();
        for info in file.anime {
            library.insert(info);
        }
        Ok(library)
    }

    pub fn load(path: &Path) -> Result<Self, KazamiError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.anime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anime.is_empty()
    }
}

impl Library for MemoryLibrary {
    fn find_anime_id(&self, title: &str) -> Option<i64> {
        self.titles.get(&title.to_lowercase()).copied()
    }

    fn anime(&self, id: i64) -> Option<AnimeInfo> {
        self.anime.get(&id).cloned()
    }
}
