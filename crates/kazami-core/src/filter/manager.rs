use std::path::Path;

use tracing::{debug, info};

use super::preset::{default_presets, FeedFilterPreset};
use super::rule::{FeedFilter, FilterAction, FilterOption, MatchMode};
use super::store;
use crate::archive::Archive;
use crate::error::KazamiError;
use crate::feed::Feed;
use crate::library::Library;

/// Owns the ordered filter list and runs it over feeds.
#[derive(Debug, Clone)]
pub struct FeedFilterManager {
    pub filters: Vec<FeedFilter>,
    presets: Vec<FeedFilterPreset>,
}

impl Default for FeedFilterManager {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FeedFilterManager {
    pub fn new(filters: Vec<FeedFilter>) -> Self {
        Self {
            filters,
            presets: default_presets(),
        }
    }

    /// Load the filter list from disk. A missing file yields the default presets
    /// when `use_presets` is set.
    pub fn load(path: &Path, use_presets: bool) -> Result<Self, KazamiError> {
        if path.exists() {
            let filters = store::load_filters(path)?;
            debug!(count = filters.len(), path = %path.display(), "Loaded filters");
            return Ok(Self::new(filters));
        }
        let mut manager = Self::default();
        if use_presets {
            manager.add_presets();
        }
        Ok(manager)
    }

    pub fn save(&self, path: &Path) -> Result<(), KazamiError> {
        store::save_filters(path, &self.filters)
    }

    pub fn presets(&self) -> &[FeedFilterPreset] {
        &self.presets
    }

    /// Append the filter of every default preset.
    pub fn add_presets(&mut self) {
        let defaults = self
            .presets
            .iter()
            .filter(|p| p.is_default)
            .map(|p| p.filter.clone());
        self.filters.extend(defaults);
    }

    /// Append an empty filter and return it for editing.
    pub fn add_filter(
        &mut self,
        action: FilterAction,
        match_mode: MatchMode,
        option: FilterOption,
        enabled: bool,
        name: &str,
    ) -> &mut FeedFilter {
        let mut filter = FeedFilter::new(name, action, match_mode, option);
        filter.enabled = enabled;
        self.filters.push(filter);
        let last = self.filters.len() - 1;
        &mut self.filters[last]
    }

    /// Drop anime ids the library no longer knows. A filter that loses all of
    /// its ids is disabled instead of becoming unscoped.
    pub fn cleanup(&mut self, library: &dyn Library) {
        for filter in &mut self.filters {
            if filter.anime_ids.is_empty() {
                continue;
            }
            filter.anime_ids.retain(|&id| library.anime(id).is_some());
            if filter.anime_ids.is_empty() {
                filter.enabled = false;
                info!(filter = %filter.name, "Disabled filter with no known anime left");
            }
        }
    }

    /// Run discard and select filters in list order, then prefer filters when
    /// `preferences` is set. Archived items are left alone.
    pub fn filter(&self, feed: &mut Feed, preferences: bool, library: &dyn Library) {
        for filter in self.filters.iter().filter(|f| f.action != FilterAction::Prefer) {
            for index in 0..feed.items.len() {
                if feed.items[index].archived {
                    continue;
                }
                filter.filter(&mut feed.items, index, library, false);
            }
        }

        if !preferences {
            return;
        }
        for item in &mut feed.items {
            item.preferred = false;
        }
        for filter in self.filters.iter().filter(|f| f.action == FilterAction::Prefer) {
            for index in 0..feed.items.len() {
                let item = &feed.items[index];
                if item.archived || item.is_discarded() {
                    continue;
                }
                filter.filter(&mut feed.items, index, library, true);
            }
        }
    }

    /// Discard every item already present in the archive.
    pub fn filter_archived(&self, feed: &mut Feed, archive: &Archive) {
        for item in &mut feed.items {
            if archive.search(item.canonical_id()) {
                item.archived = true;
                item.demote();
                debug!(title = %item.entry.title, "Item already in archive");
            }
        }
    }

    /// Flag items whose episode is beyond what is available locally.
    pub fn mark_new_episodes(&self, feed: &mut Feed, library: &dyn Library) {
        for item in &mut feed.items {
            let episode = &mut item.episode_data;
            episode.new_episode = false;
            if item.state.is_discarded() {
                continue;
            }
            let (Some(id), Some(number)) = (episode.anime_id, episode.episode_number) else {
                continue;
            };
            if let Some(anime) = library.anime(id) {
                episode.new_episode = number > anime.last_available_episode.unwrap_or(0);
            }
        }
    }

    pub fn is_item_download_available(&self, feed: &Feed) -> bool {
        feed.selected().next().is_some()
    }

    /// One full filtering cycle over a freshly loaded feed.
    pub fn run(
        &self,
        feed: &mut Feed,
        archive: &Archive,
        library: &dyn Library,
        preferences: bool,
    ) {
        self.filter_archived(feed, archive);
        self.filter(feed, preferences, library);
        self.mark_new_episodes(feed, library);

        let selected = feed.selected().count();
        let discarded = feed.items.iter().filter(|i| i.is_discarded()).count();
        info!(
            category = %feed.category,
            items = feed.items.len(),
            selected,
            discarded,
            "Filtered feed"
        );
    }
}
