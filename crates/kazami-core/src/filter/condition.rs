use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::feed::FeedItem;
use crate::library::{AnimeInfo, WatchStatus};

/// Which item-derived field a condition tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterElement {
    MetaId,
    MetaStatus,
    MetaType,
    MetaEpisodes,
    MetaDateStart,
    MetaDateEnd,
    UserStatus,
    LocalEpisodeAvailable,
    EpisodeTitle,
    EpisodeNumber,
    EpisodeVersion,
    EpisodeGroup,
    EpisodeVideoResolution,
    EpisodeVideoType,
    FileTitle,
    FileCategory,
    FileDescription,
    FileLink,
}

impl FilterElement {
    pub const ALL: &[FilterElement] = &[
        Self::MetaId,
        Self::MetaStatus,
        Self::MetaType,
        Self::MetaEpisodes,
        Self::MetaDateStart,
        Self::MetaDateEnd,
        Self::UserStatus,
        Self::LocalEpisodeAvailable,
        Self::EpisodeTitle,
        Self::EpisodeNumber,
        Self::EpisodeVersion,
        Self::EpisodeGroup,
        Self::EpisodeVideoResolution,
        Self::EpisodeVideoType,
        Self::FileTitle,
        Self::FileCategory,
        Self::FileDescription,
        Self::FileLink,
    ];
}

impl std::fmt::Display for FilterElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MetaId => "Anime ID",
            Self::MetaStatus => "Airing status",
            Self::MetaType => "Type",
            Self::MetaEpisodes => "Episode count",
            Self::MetaDateStart => "Date started",
            Self::MetaDateEnd => "Date ended",
            Self::UserStatus => "User status",
            Self::LocalEpisodeAvailable => "Episode available",
            Self::EpisodeTitle => "Episode title",
            Self::EpisodeNumber => "Episode number",
            Self::EpisodeVersion => "Episode version",
            Self::EpisodeGroup => "Group",
            Self::EpisodeVideoResolution => "Resolution",
            Self::EpisodeVideoType => "Video type",
            Self::FileTitle => "File title",
            Self::FileCategory => "File category",
            Self::FileDescription => "File description",
            Self::FileLink => "File link",
        };
        f.write_str(s)
    }
}

/// Comparison operator for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    IsGreaterThan,
    IsGreaterThanOrEqualTo,
    IsLessThan,
    IsLessThanOrEqualTo,
    BeginsWith,
    EndsWith,
    Contains,
    NotContains,
}

impl FilterOperator {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::IsGreaterThan
                | Self::IsGreaterThanOrEqualTo
                | Self::IsLessThan
                | Self::IsLessThanOrEqualTo
        )
    }

    /// Operator result for an ordering; substring operators yield `None`.
    fn check_ordering(self, ord: Ordering) -> Option<bool> {
        Some(match self {
            Self::Equals => ord == Ordering::Equal,
            Self::NotEquals => ord != Ordering::Equal,
            Self::IsGreaterThan => ord == Ordering::Greater,
            Self::IsGreaterThanOrEqualTo => ord != Ordering::Less,
            Self::IsLessThan => ord == Ordering::Less,
            Self::IsLessThanOrEqualTo => ord != Ordering::Greater,
            _ => return None,
        })
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Equals => "is",
            Self::NotEquals => "is not",
            Self::IsGreaterThan => "is greater than",
            Self::IsGreaterThanOrEqualTo => "is greater than or equal to",
            Self::IsLessThan => "is less than",
            Self::IsLessThanOrEqualTo => "is less than or equal to",
            Self::BeginsWith => "begins with",
            Self::EndsWith => "ends with",
            Self::Contains => "contains",
            Self::NotContains => "does not contain",
        };
        f.write_str(s)
    }
}

/// One predicate: `element operator value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilterCondition {
    pub element: FilterElement,
    pub operator: FilterOperator,
    pub value: String,
}

/// A field value pulled out of an item for comparison.
#[derive(Debug, Clone, PartialEq)]
enum Field {
    Text(String),
    Number(i64),
    /// Enumerated value: numeric code and display name.
    Coded(i64, &'static str),
    Date(NaiveDate),
    Bool(bool),
    Missing,
}

impl FeedFilterCondition {
    pub fn new(element: FilterElement, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            element,
            operator,
            value: value.into(),
        }
    }

    /// Evaluate against an item. Total: anything that cannot be compared is false.
    pub fn evaluate(&self, item: &FeedItem, anime: Option<&AnimeInfo>) -> bool {
        let Some(value) = substitute_placeholders(&self.value, anime) else {
            return false;
        };
        compare(self.field(item, anime), self.operator, value.trim())
    }

    fn field(&self, item: &FeedItem, anime: Option<&AnimeInfo>) -> Field {
        let episode = &item.episode_data;
        let number = |n: Option<u32>| n.map_or(Field::Missing, |n| Field::Number(n.into()));
        let date = |d: Option<NaiveDate>| d.map_or(Field::Missing, Field::Date);

        match self.element {
            FilterElement::MetaId => episode.anime_id.map_or(Field::Missing, Field::Number),
            FilterElement::MetaStatus => anime.map_or(Field::Missing, |a| {
                Field::Coded(a.airing_status.code(), a.airing_status.as_str())
            }),
            FilterElement::MetaType => anime.map_or(Field::Missing, |a| {
                Field::Coded(a.series_type.code(), a.series_type.as_str())
            }),
            FilterElement::MetaEpisodes => number(anime.and_then(|a| a.episodes)),
            FilterElement::MetaDateStart => date(anime.and_then(|a| a.date_start)),
            FilterElement::MetaDateEnd => date(anime.and_then(|a| a.date_end)),
            FilterElement::UserStatus => {
                let status = anime.map_or(WatchStatus::NotInList, |a| a.user_status);
                Field::Coded(status.code(), status.as_str())
            }
            FilterElement::LocalEpisodeAvailable => {
                let available = match (anime, episode.episode_number) {
                    (Some(a), Some(n)) => a.last_available_episode.is_some_and(|last| n <= last),
                    _ => false,
                };
                Field::Bool(available)
            }
            FilterElement::EpisodeTitle => Field::Text(episode.anime_title.clone()),
            FilterElement::EpisodeNumber => number(episode.episode_number),
            // A release without a version tag is the first version.
            FilterElement::EpisodeVersion => Field::Number(episode.version.unwrap_or(1).into()),
            FilterElement::EpisodeGroup => Field::Text(episode.group.clone()),
            FilterElement::EpisodeVideoResolution => Field::Text(episode.resolution.clone()),
            FilterElement::EpisodeVideoType => Field::Text(episode.video_type.clone()),
            FilterElement::FileTitle => Field::Text(item.entry.title.clone()),
            FilterElement::FileCategory => Field::Text(item.entry.category.clone()),
            FilterElement::FileDescription => Field::Text(item.entry.description.clone()),
            FilterElement::FileLink => Field::Text(
                item.download_link().unwrap_or_default().to_string(),
            ),
        }
    }
}

impl std::fmt::Display for FeedFilterCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} \"{}\"", self.element, self.operator, self.value)
    }
}

/// Replace `%watched%` and `%total%`. `None` when a placeholder has no value.
fn substitute_placeholders(value: &str, anime: Option<&AnimeInfo>) -> Option<String> {
    if !value.contains('%') {
        return Some(value.to_string());
    }
    let mut out = value.to_string();
    if out.contains("%watched%") {
        out = out.replace("%watched%", &anime?.watched_episodes.to_string());
    }
    if out.contains("%total%") {
        out = out.replace("%total%", &anime?.episodes?.to_string());
    }
    Some(out)
}

fn compare(field: Field, op: FilterOperator, value: &str) -> bool {
    match field {
        Field::Text(text) => compare_text(&text, op, value),
        Field::Number(n) => match value.parse::<i64>() {
            Ok(v) => op
                .check_ordering(n.cmp(&v))
                .unwrap_or_else(|| compare_text(&n.to_string(), op, value)),
            Err(_) => false,
        },
        Field::Coded(code, name) => match value.parse::<i64>() {
            Ok(v) => op
                .check_ordering(code.cmp(&v))
                .unwrap_or_else(|| compare_text(name, op, value)),
            Err(_) if op.is_relational() => false,
            Err(_) => compare_text(name, op, value),
        },
        Field::Date(d) => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(v) => op
                .check_ordering(d.cmp(&v))
                .unwrap_or_else(|| compare_text(&d.to_string(), op, value)),
            Err(_) => false,
        },
        Field::Bool(b) => match (parse_bool(value), op) {
            (Some(v), FilterOperator::Equals) => b == v,
            (Some(v), FilterOperator::NotEquals) => b != v,
            _ => false,
        },
        Field::Missing => false,
    }
}

/// Case-insensitive text comparison. Relational operators never match text.
fn compare_text(text: &str, op: FilterOperator, value: &str) -> bool {
    let text = text.to_lowercase();
    let value = value.to_lowercase();
    match op {
        FilterOperator::Equals => text == value,
        FilterOperator::NotEquals => text != value,
        FilterOperator::BeginsWith => text.starts_with(&value),
        FilterOperator::EndsWith => text.ends_with(&value),
        FilterOperator::Contains => text.contains(&value),
        FilterOperator::NotContains => !text.contains(&value),
        _ => false,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
