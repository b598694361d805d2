//! `filters.toml`: the ordered, human-editable filter list.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::condition::{FeedFilterCondition, FilterElement, FilterOperator};
use super::rule::{FeedFilter, FilterAction, FilterOption, MatchMode};
use super::shortcode::Shortcode;
use crate::error::KazamiError;

#[derive(Debug, Serialize, Deserialize)]
struct FilterFile<T> {
    #[serde(default = "Vec::new")]
    filter: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawFilter {
    name: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    action: String,
    #[serde(rename = "match")]
    match_mode: String,
    #[serde(default = "default_option")]
    option: String,
    #[serde(default)]
    anime_ids: Vec<i64>,
    #[serde(default)]
    conditions: Vec<RawCondition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCondition {
    element: String,
    operator: String,
    value: String,
}

fn default_enabled() -> bool {
    true
}

fn default_option() -> String {
    FilterOption::Default.shortcode().to_string()
}

fn decode<T: Shortcode>(kind: &str, code: &str) -> Result<T, KazamiError> {
    T::from_shortcode(code).ok_or_else(|| KazamiError::Config(format!("unknown {kind} `{code}`")))
}

impl RawFilter {
    fn decode(self) -> Result<FeedFilter, KazamiError> {
        let conditions = self
            .conditions
            .into_iter()
            .map(|c| {
                Ok(FeedFilterCondition {
                    element: decode::<FilterElement>("element", &c.element)?,
                    operator: decode::<FilterOperator>("operator", &c.operator)?,
                    value: c.value,
                })
            })
            .collect::<Result<Vec<_>, KazamiError>>()?;

        Ok(FeedFilter {
            name: self.name,
            enabled: self.enabled,
            action: decode::<FilterAction>("action", &self.action)?,
            match_mode: decode::<MatchMode>("match", &self.match_mode)?,
            option: decode::<FilterOption>("option", &self.option)?,
            anime_ids: self.anime_ids,
            conditions,
        })
    }

    fn encode(filter: &FeedFilter) -> Self {
        Self {
            name: filter.name.clone(),
            enabled: filter.enabled,
            action: filter.action.shortcode().to_string(),
            match_mode: filter.match_mode.shortcode().to_string(),
            option: filter.option.shortcode().to_string(),
            anime_ids: filter.anime_ids.clone(),
            conditions: filter
                .conditions
                .iter()
                .map(|c| RawCondition {
                    element: c.element.shortcode().to_string(),
                    operator: c.operator.shortcode().to_string(),
                    value: c.value.clone(),
                })
                .collect(),
        }
    }
}

/// Decode a filter list. Filters that fail to decode are logged and skipped.
pub fn parse_filters(content: &str) -> Result<Vec<FeedFilter>, KazamiError> {
    let file: FilterFile<toml::Value> =
        toml::from_str(content).map_err(|e| KazamiError::Config(e.to_string()))?;

    let mut filters = Vec::with_capacity(file.filter.len());
    for (position, value) in file.filter.into_iter().enumerate() {
        let name = value
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();
        let decoded = value
            .try_into::<RawFilter>()
            .map_err(|e| KazamiError::Config(e.to_string()))
            .and_then(RawFilter::decode);
        match decoded {
            Ok(filter) => filters.push(filter),
            Err(e) => warn!(position, name, error = %e, "Skipping malformed filter"),
        }
    }
    Ok(filters)
}

pub fn load_filters(path: &Path) -> Result<Vec<FeedFilter>, KazamiError> {
    let content = std::fs::read_to_string(path)?;
    parse_filters(&content)
}

pub fn to_toml_string(filters: &[FeedFilter]) -> Result<String, KazamiError> {
    let file = FilterFile {
        filter: filters.iter().map(RawFilter::encode).collect(),
    };
    toml::to_string_pretty(&file).map_err(|e| KazamiError::Config(e.to_string()))
}

/// Write the list in order, replacing the file only once fully written.
pub fn save_filters(path: &Path, filters: &[FeedFilter]) -> Result<(), KazamiError> {
    let content = to_toml_string(filters)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::preset::default_presets;

    const SAMPLE: &str = r#"
[[filter]]
name = "Discard and deactivate not-in-list anime"
enabled = true
action = "discard"
match = "any"
option = "deactivate"
anime_ids = []
conditions = [
  { element = "user_status", operator = "equals", value = "0" },
]

[[filter]]
name = "Broken"
action = "explode"
match = "all"

[[filter]]
name = "Prefer Frieren 1080p"
action = "prefer"
match = "ALL"
anime_ids = [52991]
conditions = [
  { element = "episode_video_resolution", operator = "equals", value = "1080p" },
]
"#;

    #[test]
    fn test_malformed_filter_is_skipped() {
        let filters = parse_filters(SAMPLE).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].option, FilterOption::Deactivate);
        assert_eq!(filters[0].conditions[0].element, FilterElement::UserStatus);
        assert_eq!(filters[1].name, "Prefer Frieren 1080p");
        assert_eq!(filters[1].option, FilterOption::Default);
        assert!(filters[1].enabled);
        assert_eq!(filters[1].anime_ids, vec![52991]);
    }

    #[test]
    fn test_missing_field_is_skipped() {
        let content = r#"
[[filter]]
action = "select"
match = "all"

[[filter]]
name = "ok"
action = "select"
match = "all"
"#;
        let filters = parse_filters(content).unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "ok");
    }

    #[test]
    fn test_invalid_toml_fails_whole_load() {
        assert!(matches!(
            parse_filters("[[filter]\nname ="),
            Err(KazamiError::Config(_))
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_filters("").unwrap().is_empty());
    }

    #[test]
    fn test_save_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.toml");
        let filters: Vec<FeedFilter> = default_presets().into_iter().map(|p| p.filter).collect();

        save_filters(&path, &filters).unwrap();
        let loaded = load_filters(&path).unwrap();
        assert_eq!(loaded, filters);
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
