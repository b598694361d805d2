//! Stable short names for filter enums, used in `filters.toml`.

use super::condition::{FilterElement, FilterOperator};
use super::rule::{FilterAction, FilterOption, MatchMode};

/// Bidirectional mapping between an enum value and its short name.
pub trait Shortcode: Copy + PartialEq + 'static {
    const TABLE: &'static [(Self, &'static str)];

    fn shortcode(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(value, _)| *value == self)
            .map_or("", |(_, code)| code)
    }

    /// Case-insensitive lookup.
    fn from_shortcode(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::TABLE
            .iter()
            .find(|(_, c)| c.eq_ignore_ascii_case(code))
            .map(|(value, _)| *value)
    }
}

impl Shortcode for FilterAction {
    const TABLE: &'static [(Self, &'static str)] = &[
        (Self::Discard, "discard"),
        (Self::Select, "select"),
        (Self::Prefer, "prefer"),
    ];
}

impl Shortcode for MatchMode {
    const TABLE: &'static [(Self, &'static str)] = &[(Self::All, "all"), (Self::Any, "any")];
}

impl Shortcode for FilterOption {
    const TABLE: &'static [(Self, &'static str)] = &[
        (Self::Default, "default"),
        (Self::Deactivate, "deactivate"),
        (Self::Hide, "hide"),
    ];
}

impl Shortcode for FilterOperator {
    const TABLE: &'static [(Self, &'static str)] = &[
        (Self::Equals, "equals"),
        (Self::NotEquals, "notequals"),
        (Self::IsGreaterThan, "gt"),
        (Self::IsGreaterThanOrEqualTo, "ge"),
        (Self::IsLessThan, "lt"),
        (Self::IsLessThanOrEqualTo, "le"),
        (Self::BeginsWith, "beginswith"),
        (Self::EndsWith, "endswith"),
        (Self::Contains, "contains"),
        (Self::NotContains, "notcontains"),
    ];
}

impl Shortcode for FilterElement {
    const TABLE: &'static [(Self, &'static str)] = &[
        (Self::MetaId, "meta_id"),
        (Self::MetaStatus, "meta_status"),
        (Self::MetaType, "meta_type"),
        (Self::MetaEpisodes, "meta_episodes"),
        (Self::MetaDateStart, "meta_date_start"),
        (Self::MetaDateEnd, "meta_date_end"),
        (Self::UserStatus, "user_status"),
        (Self::LocalEpisodeAvailable, "local_episode_available"),
        (Self::EpisodeTitle, "episode_title"),
        (Self::EpisodeNumber, "episode_number"),
        (Self::EpisodeVersion, "episode_version"),
        (Self::EpisodeGroup, "episode_group"),
        (Self::EpisodeVideoResolution, "episode_video_resolution"),
        (Self::EpisodeVideoType, "episode_video_type"),
        (Self::FileTitle, "file_title"),
        (Self::FileCategory, "file_category"),
        (Self::FileDescription, "file_description"),
        (Self::FileLink, "file_link"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_table<T: Shortcode + std::fmt::Debug>(expected_len: usize) {
        assert_eq!(T::TABLE.len(), expected_len);
        let codes: HashSet<_> = T::TABLE.iter().map(|(_, c)| *c).collect();
        assert_eq!(codes.len(), expected_len, "duplicate code");
        for (value, code) in T::TABLE {
            assert_eq!(value.shortcode(), *code);
            assert_eq!(T::from_shortcode(code), Some(*value));
        }
    }

    #[test]
    fn test_tables_are_complete() {
        assert_table::<FilterAction>(3);
        assert_table::<MatchMode>(2);
        assert_table::<FilterOption>(3);
        assert_table::<FilterOperator>(10);
        assert_table::<FilterElement>(FilterElement::ALL.len());
        for element in FilterElement::ALL {
            assert!(!element.shortcode().is_empty(), "{element:?}");
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(FilterAction::from_shortcode("PREFER"), Some(FilterAction::Prefer));
        assert_eq!(
            FilterOperator::from_shortcode(" Ge "),
            Some(FilterOperator::IsGreaterThanOrEqualTo)
        );
        assert_eq!(MatchMode::from_shortcode("some"), None);
    }
}
