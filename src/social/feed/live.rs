//! 当前屏幕上的动态列表
//!
//! 保存原始动态与过滤集合，任何集合变化都会重新走一遍组装管线，
//! 保证列表中的动态恰好是通过可见性过滤且不在隐藏/不感兴趣集合中的那些。

use crate::social::feed::pipeline::assemble_feed;
use crate::social::feed::snapshot::FeedSnapshot;
use crate::social::feed::suppression::{
    ActionOutcome, SuppressionAction, SuppressionState, SuppressionTracker, Transition,
};
use crate::social::feed::view::{FeedContext, PostView};
use crate::social::photo::PhotoUrlCache;
use crate::social::post::RawPost;
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LiveFeed {
    raw: Vec<RawPost>,
    viewer_id: Option<i64>,
    snapshot: FeedSnapshot,
    ctx: FeedContext,
    tracker: SuppressionTracker,
    rendered_at: DateTime<Utc>,
    posts: Vec<PostView>,
}

impl LiveFeed {
    pub fn new(raw: Vec<RawPost>, viewer_id: Option<i64>, snapshot: FeedSnapshot, ctx: FeedContext) -> Self {
        Self::build_at(raw, viewer_id, snapshot, ctx, Utc::now())
    }

    pub fn build_at(
        raw: Vec<RawPost>,
        viewer_id: Option<i64>,
        snapshot: FeedSnapshot,
        ctx: FeedContext,
        now: DateTime<Utc>,
    ) -> Self {
        let mut feed = Self {
            raw,
            viewer_id,
            snapshot,
            ctx,
            tracker: SuppressionTracker::new(),
            rendered_at: now,
            posts: Vec::new(),
        };
        feed.recompute();
        feed
    }

    pub fn posts(&self) -> &[PostView] {
        &self.posts
    }

    pub fn snapshot(&self) -> &FeedSnapshot {
        &self.snapshot
    }

    pub fn tracker(&self) -> &SuppressionTracker {
        &self.tracker
    }

    pub fn viewer_id(&self) -> Option<i64> {
        self.viewer_id
    }

    pub fn contains(&self, post_id: i64) -> bool {
        self.posts.iter().any(|p| p.id == post_id)
    }

    /// 以新的当前时间刷新相对时间
    pub fn refresh_times(&mut self, now: DateTime<Utc>) {
        self.rendered_at = now;
        self.recompute();
    }

    /// 发起隐藏/举报/不感兴趣；乐观动作会立即移除
    pub fn begin(&mut self, post_id: i64, action: SuppressionAction) -> Transition {
        let transition = self.tracker.begin(post_id, action);
        if transition == Transition::Remove {
            self.remove(post_id, action);
        }
        transition
    }

    /// 服务器返回后结束动作
    pub fn complete(&mut self, post_id: i64, outcome: ActionOutcome) -> Transition {
        let action = match self.tracker.state(post_id) {
            SuppressionState::Pending(action) => Some(action),
            _ => None,
        };
        let transition = self.tracker.complete(post_id, outcome);
        if let (Transition::Remove, Some(action)) = (transition, action) {
            self.remove(post_id, action);
        }
        transition
    }

    /// 关注/取消关注后的本地更新
    pub fn set_following(&mut self, user_id: i64, following: bool) {
        self.snapshot = if following {
            self.snapshot.with_followed(user_id)
        } else {
            self.snapshot.without_followed(user_id)
        };
        self.recompute();
    }

    pub fn set_photo_cache(&mut self, photo_cache: PhotoUrlCache) {
        self.ctx.photo_cache = photo_cache;
        self.recompute();
    }

    fn remove(&mut self, post_id: i64, action: SuppressionAction) {
        match action {
            SuppressionAction::Hide => self.snapshot = self.snapshot.with_hidden(post_id),
            SuppressionAction::NotInterested => {
                self.snapshot = self.snapshot.with_not_interested(post_id)
            }
            // 服务器已删除
            SuppressionAction::Report => self.raw.retain(|p| p.id != post_id),
        }
        self.posts.retain(|p| p.id != post_id);
        debug!("[Feed] 本地移除动态 {} ({:?})", post_id, action);
    }

    fn recompute(&mut self) {
        self.posts = assemble_feed(
            &self.raw,
            self.viewer_id,
            &self.snapshot,
            &self.ctx,
            self.rendered_at,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::feed::view::tests::{now, raw};
    use crate::social::post::Visibility;
    use std::collections::HashSet;

    fn ids(feed: &LiveFeed) -> Vec<i64> {
        feed.posts().iter().map(|p| p.id).collect()
    }

    fn sample() -> LiveFeed {
        let raws = vec![
            raw(1, 2, Visibility::Public),
            raw(2, 3, Visibility::FollowersOnly),
            raw(3, 4, Visibility::Public),
        ];
        LiveFeed::build_at(raws, Some(1), FeedSnapshot::default(), FeedContext::default(), now())
    }

    #[test]
    fn hide_removes_without_server_ack() {
        let mut feed = sample();
        assert_eq!(feed.begin(1, SuppressionAction::Hide), Transition::Remove);
        assert!(!feed.contains(1));
        assert!(feed.snapshot().hidden().contains(&1));

        // 服务器失败也不恢复
        feed.complete(1, ActionOutcome::Failed);
        feed.refresh_times(now());
        assert!(!feed.contains(1));
    }

    #[test]
    fn eliminated_report_removes_post() {
        let mut feed = sample();
        assert_eq!(feed.begin(3, SuppressionAction::Report), Transition::Keep);
        assert!(feed.contains(3));
        assert_eq!(
            feed.complete(3, ActionOutcome::Succeeded { eliminated: true }),
            Transition::Remove
        );
        assert!(!feed.contains(3));
        feed.refresh_times(now());
        assert!(!feed.contains(3));
    }

    #[test]
    fn following_reveals_followers_only_posts() {
        let mut feed = sample();
        assert_eq!(ids(&feed), vec![1, 3]);
        feed.set_following(3, true);
        assert_eq!(ids(&feed), vec![2, 1, 3]);
        feed.set_following(3, false);
        assert_eq!(ids(&feed), vec![1, 3]);
    }

    #[test]
    fn list_matches_filters_after_every_change() {
        let mut feed = sample();
        feed.begin(3, SuppressionAction::NotInterested);
        feed.set_following(3, true);
        let snapshot = feed.snapshot().clone();
        for post in feed.posts() {
            assert!(!snapshot.is_suppressed(post.id));
        }
        assert_eq!(ids(&feed), vec![2, 1]);
        assert!(snapshot.following() == &HashSet::from([3]));
    }
}
