pub mod condition;
pub mod manager;
pub mod preset;
pub mod rule;
pub mod shortcode;
pub mod store;

pub use condition::{FeedFilterCondition, FilterElement, FilterOperator};
pub use manager::FeedFilterManager;
pub use preset::FeedFilterPreset;
pub use rule::{FeedFilter, FilterAction, FilterOption, MatchMode};
pub use shortcode::Shortcode;
