use std::sync::Arc;

use kazami_core::feed::RawFeed;
use kazami_core::filter::{FilterAction, FilterElement, FilterOperator, FilterOption, MatchMode};
use kazami_core::{
    Aggregator, AnimeInfo, Archive, Feed, FeedCategory, FeedFilterManager, FeedItemState,
    FeedTransport, GenericFeedItem, KazamiError, MemoryLibrary, WatchStatus,
};

struct StaticFeed(Vec<&'static str>);

impl FeedTransport for StaticFeed {
    async fn fetch(&self, _source: &str) -> Result<RawFeed, KazamiError> {
        Ok(RawFeed {
            title: "static".into(),
            items: self
                .0
                .iter()
                .map(|title| GenericFeedItem {
                    title: title.to_string(),
                    link: format!("magnet:?dn={}", title.replace(' ', "+")),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    }
}

fn library() -> MemoryLibrary {
    let mut library = MemoryLibrary::new();
    library.insert(AnimeInfo {
        id: 7,
        title: "Show".into(),
        user_status: WatchStatus::Watching,
        ..Default::default()
    });
    library
}

async fn cycle(manager: FeedFilterManager, archive: Archive, titles: Vec<&'static str>) -> Feed {
    let mut aggregator = Aggregator::new(manager, Arc::new(archive), Arc::new(library()));
    aggregator
        .check(&StaticFeed(titles), FeedCategory::Link, &["static".to_string()], false)
        .await
        .unwrap();
    aggregator.get(FeedCategory::Link).unwrap().clone()
}

fn select_episode_one() -> FeedFilterManager {
    let mut manager = FeedFilterManager::default();
    manager
        .add_filter(FilterAction::Select, MatchMode::All, FilterOption::Default, true, "Episode 1")
        .add_condition(FilterElement::EpisodeNumber, FilterOperator::Equals, "1");
    manager
}

fn states(feed: &Feed) -> Vec<FeedItemState> {
    feed.items.iter().map(|i| i.state).collect()
}

#[tokio::test]
async fn test_select_matching_episode() {
    let feed = cycle(select_episode_one(), Archive::default(), vec!["Show - 01"]).await;
    assert_eq!(feed.items[0].episode_data.anime_id, Some(7));
    assert_eq!(states(&feed), [FeedItemState::Selected]);
    assert!(feed.items[0].magnet_link.is_some());
}

#[tokio::test]
async fn test_archived_item_is_discarded() {
    let archive = Archive::in_memory(["Show - 01"]);
    let feed = cycle(select_episode_one(), archive, vec!["Show - 01"]).await;
    assert_eq!(states(&feed), [FeedItemState::DiscardedNormal]);
    assert!(feed.items[0].archived);
}

#[tokio::test]
async fn test_prefer_group_resolves_duplicates() {
    let mut manager = FeedFilterManager::default();
    manager
        .add_filter(FilterAction::Prefer, MatchMode::All, FilterOption::Default, true, "Group A")
        .add_condition(FilterElement::EpisodeGroup, FilterOperator::Equals, "A");

    let feed = cycle(manager, Archive::default(), vec!["[B] Show - 01", "[A] Show - 01"]).await;
    assert_eq!(
        states(&feed),
        [FeedItemState::DiscardedNormal, FeedItemState::Selected]
    );
}

#[tokio::test]
async fn test_half_episode_is_not_a_duplicate() {
    let mut manager = FeedFilterManager::default();
    manager.add_filter(FilterAction::Select, MatchMode::All, FilterOption::Default, true, "all");
    manager
        .add_filter(FilterAction::Prefer, MatchMode::All, FilterOption::Default, true, "1080p")
        .add_condition(FilterElement::EpisodeVideoResolution, FilterOperator::Equals, "1080p");

    let titles = vec!["[A] Show - 12 [720p]", "[A] Show - 12.5 [1080p]"];
    let feed = cycle(manager, Archive::default(), titles).await;
    let numbers: Vec<_> = feed
        .items
        .iter()
        .map(|i| (i.episode_data.episode_number, i.episode_data.episode_fraction))
        .collect();
    assert_eq!(numbers, [(Some(12), None), (Some(12), Some(5))]);
    assert_eq!(
        states(&feed),
        [FeedItemState::Selected, FeedItemState::Selected]
    );
}

#[tokio::test]
async fn test_scoped_filter_does_not_apply() {
    let mut manager = FeedFilterManager::default();
    manager
        .add_filter(FilterAction::Select, MatchMode::All, FilterOption::Default, true, "Only 5")
        .anime_ids = vec![5];

    let feed = cycle(manager, Archive::default(), vec!["Show - 01"]).await;
    assert_eq!(feed.items[0].episode_data.anime_id, Some(7));
    assert_eq!(states(&feed), [FeedItemState::Blank]);
}

#[tokio::test]
async fn test_vacuous_matches() {
    let mut manager = FeedFilterManager::default();
    manager.add_filter(FilterAction::Discard, MatchMode::Any, FilterOption::Hide, true, "any");
    let feed = cycle(manager, Archive::default(), vec!["Show - 01"]).await;
    assert_eq!(states(&feed), [FeedItemState::Blank]);

    let mut manager = FeedFilterManager::default();
    manager.add_filter(FilterAction::Discard, MatchMode::All, FilterOption::Hide, true, "all");
    let feed = cycle(manager, Archive::default(), vec!["Show - 01"]).await;
    assert_eq!(states(&feed), [FeedItemState::DiscardedHidden]);
}

#[tokio::test]
async fn test_later_discard_cannot_undo_selection() {
    let mut manager = select_episode_one();
    manager.add_filter(
        FilterAction::Discard,
        MatchMode::All,
        FilterOption::Hide,
        true,
        "everything",
    );

    let feed = cycle(manager, Archive::default(), vec!["Show - 01", "Show - 02"]).await;
    assert_eq!(
        states(&feed),
        [FeedItemState::Selected, FeedItemState::DiscardedHidden]
    );
}

#[tokio::test]
async fn test_rerun_is_deterministic_and_idempotent() {
    let mut manager = FeedFilterManager::default();
    manager.add_presets();
    manager
        .add_filter(FilterAction::Prefer, MatchMode::All, FilterOption::Default, true, "1080p")
        .add_condition(FilterElement::EpisodeVideoResolution, FilterOperator::Equals, "1080p");
    let titles = vec![
        "[A] Show - 03 [720p]",
        "[B] Show - 03 [1080p]",
        "[A] Show - 04v2 [720p]",
        "[A] Show - 04 [720p]",
        "[C] Unknown Series - 01",
    ];

    let first = cycle(manager.clone(), Archive::default(), titles.clone()).await;
    let second = cycle(manager.clone(), Archive::default(), titles).await;
    assert_eq!(states(&first), states(&second));

    let mut rerun = first.clone();
    manager.filter(&mut rerun, true, &library());
    assert_eq!(states(&rerun), states(&first));

    assert_eq!(
        states(&first),
        [
            FeedItemState::DiscardedNormal,
            FeedItemState::Selected,
            FeedItemState::Selected,
            FeedItemState::DiscardedNormal,
            FeedItemState::DiscardedInactive,
        ]
    );
}
