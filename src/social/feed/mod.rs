//! 首页动态模块
//!
//! 原始动态 → 展示映射 → 可见性过滤 → 交错排序 → 渲染列表

pub mod filter;
pub mod interleave;
pub mod live;
pub mod loader;
pub mod pipeline;
pub mod snapshot;
pub mod suppression;
pub mod view;

pub use filter::{filter_visible, is_visible};
pub use interleave::{interleave, partition, Partitions};
pub use live::LiveFeed;
pub use loader::{FeedLoader, FeedSources};
pub use pipeline::assemble_feed;
pub use snapshot::FeedSnapshot;
pub use suppression::{ActionOutcome, SuppressionAction, SuppressionState, SuppressionTracker, Transition};
pub use view::{map_post, map_posts, FeedContext, PostView};
