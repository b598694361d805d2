use serde::{Deserialize, Serialize};
use tracing::debug;

use super::condition::{FeedFilterCondition, FilterElement, FilterOperator};
use crate::feed::FeedItem;
use crate::library::{AnimeInfo, Library};

/// How the conditions of a filter are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Any => write!(f, "Any"),
        }
    }
}

/// What a filter does to an item it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Discard,
    Select,
    Prefer,
}

impl std::fmt::Display for FilterAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discard => write!(f, "Discard"),
            Self::Select => write!(f, "Select"),
            Self::Prefer => write!(f, "Prefer"),
        }
    }
}

/// Which discarded state a discard filter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOption {
    #[default]
    Default,
    /// The user may still pick the item by hand.
    Deactivate,
    Hide,
}

impl std::fmt::Display for FilterOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Deactivate => write!(f, "Deactivate"),
            Self::Hide => write!(f, "Hide"),
        }
    }
}

/// A named rule: conditions combined by `match_mode`, producing `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedFilter {
    pub name: String,
    pub enabled: bool,
    pub action: FilterAction,
    pub match_mode: MatchMode,
    pub option: FilterOption,
    /// Anime the filter is limited to. Empty applies to everything.
    pub anime_ids: Vec<i64>,
    pub conditions: Vec<FeedFilterCondition>,
}

impl FeedFilter {
    pub fn new(
        name: impl Into<String>,
        action: FilterAction,
        match_mode: MatchMode,
        option: FilterOption,
    ) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            action,
            match_mode,
            option,
            anime_ids: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn add_condition(
        &mut self,
        element: FilterElement,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> &mut Self {
        self.conditions
            .push(FeedFilterCondition::new(element, operator, value));
        self
    }

    pub fn with_anime_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.anime_ids = ids.into_iter().collect();
        self
    }

    /// Enabled and, when scoped, scoped to the item's anime.
    pub fn applies_to(&self, item: &FeedItem) -> bool {
        if !self.enabled {
            return false;
        }
        if self.anime_ids.is_empty() {
            return true;
        }
        item.episode_data
            .anime_id
            .is_some_and(|id| self.anime_ids.contains(&id))
    }

    /// Combine the conditions. An empty list is true for `All`, false for `Any`.
    pub fn matches(&self, item: &FeedItem, anime: Option<&AnimeInfo>) -> bool {
        match self.match_mode {
            MatchMode::All => self.conditions.iter().all(|c| c.evaluate(item, anime)),
            MatchMode::Any => self.conditions.iter().any(|c| c.evaluate(item, anime)),
        }
    }

    fn is_match(&self, item: &FeedItem, library: &dyn Library) -> bool {
        if !self.applies_to(item) {
            return false;
        }
        let anime = item.episode_data.anime_id.and_then(|id| library.anime(id));
        self.matches(item, anime.as_ref())
    }

    /// Apply the filter to `items[index]`, returning whether it matched.
    ///
    /// With `recursive` set, a matching prefer filter also settles the item's
    /// competitors: other live releases of the same episode that do not satisfy
    /// the filter are discarded, and the item is selected over them.
    pub fn filter(
        &self,
        items: &mut [FeedItem],
        index: usize,
        library: &dyn Library,
        recursive: bool,
    ) -> bool {
        let Some(item) = items.get(index) else {
            return false;
        };
        if !self.is_match(item, library) {
            return false;
        }

        let item = &mut items[index];
        match self.action {
            FilterAction::Discard => {
                if item.discard(self.option) {
                    debug!(filter = %self.name, index, state = %item.state, "Discarded item");
                }
            }
            FilterAction::Select => {
                item.select();
                debug!(filter = %self.name, index, "Selected item");
            }
            FilterAction::Prefer => {
                item.preferred = true;
                if recursive {
                    self.resolve_preference(items, index, library);
                }
            }
        }
        true
    }

    fn resolve_preference(&self, items: &mut [FeedItem], index: usize, library: &dyn Library) {
        let competitors: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(pos, other)| {
                *pos != index
                    && !other.is_discarded()
                    && !other.archived
                    && other.is_same_episode(&items[index])
            })
            .map(|(pos, _)| pos)
            .collect();
        if competitors.is_empty() {
            return;
        }

        for pos in competitors {
            if !self.filter(items, pos, library, false) {
                items[pos].demote();
                debug!(
                    filter = %self.name,
                    index = items[pos].index,
                    "Demoted non-preferred release"
                );
            }
        }
        items[index].select();
    }
}

impl std::fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} if {} of", self.name, self.action, self.match_mode)?;
        for (i, condition) in self.conditions.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{condition}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedItemState, GenericFeedItem};
    use crate::library::MemoryLibrary;

    use FilterElement as E;
    use FilterOperator as O;

    fn item(index: usize, group: &str, episode: u32) -> FeedItem {
        let mut item = FeedItem::new(
            index,
            GenericFeedItem {
                title: format!("[{group}] Show - {episode:02}"),
                ..Default::default()
            },
        );
        item.episode_data.anime_id = Some(7);
        item.episode_data.anime_title = "Show".into();
        item.episode_data.episode_number = Some(episode);
        item.episode_data.group = group.into();
        item
    }

    #[test]
    fn test_empty_conditions() {
        let lib = MemoryLibrary::default();
        let all = FeedFilter::new(
            "all",
            FilterAction::Select,
            MatchMode::All,
            FilterOption::Default,
        );
        let any = FeedFilter::new(
            "any",
            FilterAction::Select,
            MatchMode::Any,
            FilterOption::Default,
        );
        let mut items = vec![item(0, "A", 1)];
        assert!(!any.filter(&mut items, 0, &lib, false));
        assert_eq!(items[0].state, FeedItemState::Blank);
        assert!(all.filter(&mut items, 0, &lib, false));
        assert_eq!(items[0].state, FeedItemState::Selected);
    }

    #[test]
    fn test_discard_options() {
        let lib = MemoryLibrary::default();
        for (option, state) in [
            (FilterOption::Default, FeedItemState::DiscardedNormal),
            (FilterOption::Deactivate, FeedItemState::DiscardedInactive),
            (FilterOption::Hide, FeedItemState::DiscardedHidden),
        ] {
            let f = FeedFilter::new("d", FilterAction::Discard, MatchMode::All, option);
            let mut items = vec![item(0, "A", 1)];
            f.filter(&mut items, 0, &lib, false);
            assert_eq!(items[0].state, state);
        }
    }

    #[test]
    fn test_selected_is_not_discarded() {
        let lib = MemoryLibrary::default();
        let f = FeedFilter::new("d", FilterAction::Discard, MatchMode::All, FilterOption::Hide);
        let mut items = vec![item(0, "A", 1)];
        items[0].select();
        assert!(f.filter(&mut items, 0, &lib, false));
        assert_eq!(items[0].state, FeedItemState::Selected);
    }

    #[test]
    fn test_scoped_filter() {
        let lib = MemoryLibrary::default();
        let f = FeedFilter::new("s", FilterAction::Select, MatchMode::All, FilterOption::Default)
            .with_anime_ids([5]);
        let mut items = vec![item(0, "A", 1)];
        assert!(!f.filter(&mut items, 0, &lib, false));
        assert_eq!(items[0].state, FeedItemState::Blank);

        let f = f.with_anime_ids([5, 7]);
        assert!(f.filter(&mut items, 0, &lib, false));
    }

    #[test]
    fn test_disabled_filter() {
        let lib = MemoryLibrary::default();
        let mut f = FeedFilter::new(
            "s",
            FilterAction::Select,
            MatchMode::All,
            FilterOption::Default,
        );
        f.enabled = false;
        let mut items = vec![item(0, "A", 1)];
        assert!(!f.filter(&mut items, 0, &lib, false));
    }

    #[test]
    fn test_prefer_resolves_competitors() {
        let lib = MemoryLibrary::default();
        let mut f = FeedFilter::new(
            "p",
            FilterAction::Prefer,
            MatchMode::All,
            FilterOption::Default,
        );
        f.add_condition(E::EpisodeGroup, O::Equals, "A");
        let mut items = vec![item(0, "B", 1), item(1, "A", 1), item(2, "C", 2)];

        assert!(!f.filter(&mut items, 0, &lib, true));
        assert!(f.filter(&mut items, 1, &lib, true));
        assert_eq!(items[0].state, FeedItemState::DiscardedNormal);
        assert_eq!(items[1].state, FeedItemState::Selected);
        assert!(items[1].preferred);
        // Different episode, untouched.
        assert_eq!(items[2].state, FeedItemState::Blank);
    }

    #[test]
    fn test_prefer_without_competitors_only_marks() {
        let lib = MemoryLibrary::default();
        let mut f = FeedFilter::new(
            "p",
            FilterAction::Prefer,
            MatchMode::All,
            FilterOption::Default,
        );
        f.add_condition(E::EpisodeGroup, O::Equals, "A");
        let mut items = vec![item(0, "A", 1)];
        assert!(f.filter(&mut items, 0, &lib, true));
        assert_eq!(items[0].state, FeedItemState::Blank);
        assert!(items[0].preferred);
    }

    #[test]
    fn test_display() {
        let mut f = FeedFilter::new(
            "Only A",
            FilterAction::Select,
            MatchMode::Any,
            FilterOption::Default,
        );
        f.add_condition(E::EpisodeGroup, O::Equals, "A");
        assert_eq!(
            f.to_string(),
            "Only A (Select if Any of Group is \"A\")"
        );
    }
}
