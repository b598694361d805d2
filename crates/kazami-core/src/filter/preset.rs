use super::condition::{FilterElement as E, FilterOperator as O};
use super::rule::{FeedFilter, FilterAction, FilterOption, MatchMode};

/// A filter shipped with the application.
#[derive(Debug, Clone)]
pub struct FeedFilterPreset {
    pub description: String,
    pub filter: FeedFilter,
    /// Added to a fresh filter list by `FeedFilterManager::add_presets`.
    pub is_default: bool,
}

impl FeedFilterPreset {
    fn new(description: &str, filter: FeedFilter, is_default: bool) -> Self {
        Self {
            description: description.to_string(),
            filter,
            is_default,
        }
    }
}

pub fn default_presets() -> Vec<FeedFilterPreset> {
    let mut presets = Vec::with_capacity(7);

    let mut f = FeedFilter::new(
        "Discard and deactivate not-in-list anime",
        FilterAction::Discard,
        MatchMode::Any,
        FilterOption::Deactivate,
    );
    f.add_condition(E::UserStatus, O::Equals, "0")
        .add_condition(E::UserStatus, O::Equals, "2")
        .add_condition(E::UserStatus, O::Equals, "4");
    presets.push(FeedFilterPreset::new(
        "Discards files that do not belong to any anime in your list, \
         or belong to completed or dropped ones",
        f,
        true,
    ));

    let mut f = FeedFilter::new(
        "Discard watched and available episodes",
        FilterAction::Discard,
        MatchMode::Any,
        FilterOption::Default,
    );
    f.add_condition(E::EpisodeNumber, O::IsLessThanOrEqualTo, "%watched%")
        .add_condition(E::LocalEpisodeAvailable, O::Equals, "true");
    presets.push(FeedFilterPreset::new(
        "Discards episodes you have already watched or downloaded",
        f,
        true,
    ));

    let mut f = FeedFilter::new(
        "Select currently watching",
        FilterAction::Select,
        MatchMode::All,
        FilterOption::Default,
    );
    // Later selects override earlier discards, so repeat the unwatched test here.
    f.add_condition(E::UserStatus, O::Equals, "1")
        .add_condition(E::EpisodeNumber, O::IsGreaterThan, "%watched%")
        .add_condition(E::LocalEpisodeAvailable, O::Equals, "false");
    presets.push(FeedFilterPreset::new(
        "Selects new episodes of anime you are watching",
        f,
        true,
    ));

    let mut f = FeedFilter::new(
        "Prefer new versions",
        FilterAction::Prefer,
        MatchMode::All,
        FilterOption::Default,
    );
    f.add_condition(E::EpisodeVersion, O::IsGreaterThan, "1");
    presets.push(FeedFilterPreset::new(
        "Prefers v2 files and above when there are earlier releases of the same episode",
        f,
        true,
    ));

    let mut f = FeedFilter::new(
        "Prefer 1080p",
        FilterAction::Prefer,
        MatchMode::All,
        FilterOption::Default,
    );
    f.add_condition(E::EpisodeVideoResolution, O::Equals, "1080p");
    presets.push(FeedFilterPreset::new(
        "Prefers 1080p files when there are other releases of the same episode",
        f,
        false,
    ));

    // Inert until the user fills in a group.
    let mut f = FeedFilter::new(
        "Prefer specific group",
        FilterAction::Prefer,
        MatchMode::All,
        FilterOption::Default,
    );
    f.enabled = false;
    f.add_condition(E::EpisodeGroup, O::Equals, "");
    presets.push(FeedFilterPreset::new(
        "Prefers releases from a group of your choice",
        f,
        false,
    ));

    let mut f = FeedFilter::new(
        "Discard low resolution",
        FilterAction::Discard,
        MatchMode::Any,
        FilterOption::Hide,
    );
    f.add_condition(E::EpisodeVideoResolution, O::Equals, "480p")
        .add_condition(E::EpisodeVideoResolution, O::Equals, "360p");
    presets.push(FeedFilterPreset::new(
        "Hides files below 720p",
        f,
        false,
    ));

    presets
}
