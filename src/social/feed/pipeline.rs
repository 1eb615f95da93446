//! 动态组装管线：展示映射 → 可见性过滤 → 交错排序

use crate::social::feed::filter::filter_visible;
use crate::social::feed::interleave::partition;
use crate::social::feed::snapshot::FeedSnapshot;
use crate::social::feed::view::{map_posts, FeedContext, PostView};
use crate::social::post::RawPost;
use chrono::{DateTime, Utc};
use tracing::debug;

pub fn assemble_feed(
    raw: &[RawPost],
    viewer_id: Option<i64>,
    snapshot: &FeedSnapshot,
    ctx: &FeedContext,
    now: DateTime<Utc>,
) -> Vec<PostView> {
    let mapped = map_posts(raw, ctx, now);
    let visible = filter_visible(mapped, viewer_id, snapshot);
    let parts = partition(visible, viewer_id, snapshot.following());
    debug!(
        "[Feed] 组装动态：原始 {} 条，自己 {}，关注 {}，其他 {}",
        raw.len(),
        parts.own.len(),
        parts.followed.len(),
        parts.other.len()
    );
    parts.interleave()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::feed::view::tests::{now, raw};
    use crate::social::post::Visibility;
    use std::collections::HashSet;

    #[test]
    fn full_pipeline_orders_and_filters() {
        // 用户 1 关注 2；3 是陌生人
        let raws = vec![
            raw(1, 1, Visibility::Private),
            raw(2, 2, Visibility::FollowersOnly),
            raw(3, 3, Visibility::Public),
            raw(4, 3, Visibility::FollowersOnly),
            raw(5, 2, Visibility::Public),
            raw(6, 1, Visibility::Public),
            raw(7, 3, Visibility::Public),
            raw(8, 2, Visibility::Private),
        ];
        let snapshot = FeedSnapshot::new(HashSet::from([2]), HashSet::from([7]), HashSet::new());
        let feed = assemble_feed(&raws, Some(1), &snapshot, &FeedContext::default(), now());
        let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 6, 2, 5, 3]);
    }

    #[test]
    fn anonymous_pipeline_keeps_public_in_server_order() {
        let raws = vec![
            raw(1, 1, Visibility::Public),
            raw(2, 2, Visibility::Private),
            raw(3, 3, Visibility::Public),
        ];
        let feed = assemble_feed(&raws, None, &FeedSnapshot::default(), &FeedContext::default(), now());
        assert_eq!(feed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
    }
}
