pub mod agent_filter;
pub mod call_type_filter;
pub mod coaching_priority_selector;
pub mod follow_up_volume_selector;
pub mod objection_selector;
pub mod sentiment_filter;
pub mod top_performers_selector;

pub use agent_filter::AgentFilter;
pub use call_type_filter::CallTypeFilter;
pub use coaching_priority_selector::CoachingPrioritySelector;
pub use follow_up_volume_selector::FollowUpVolumeSelector;
pub use objection_selector::ObjectionSelector;
pub use sentiment_filter::SentimentFilter;
pub use top_performers_selector::TopPerformersSelector;
