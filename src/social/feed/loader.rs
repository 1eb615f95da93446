//! 动态加载：并发拉取动态、关注列表、隐藏集合
//!
//! 三路请求全部完成后再组装；任何一路失败都按空结果处理，不影响整体加载。

use crate::social::error::{ApiError, ApiResult};
use crate::social::feed::snapshot::FeedSnapshot;
use crate::social::follow::FollowApi;
use crate::social::post::{PostApi, RawPost};
use crate::social::report::ReportApi;
use std::collections::HashSet;
use tracing::{info, warn};

/// 一次加载的原始数据
#[derive(Debug, Clone, Default)]
pub struct FeedSources {
    pub posts: Vec<RawPost>,
    pub snapshot: FeedSnapshot,
    /// 任意一路返回 401
    pub unauthorized: bool,
}

impl FeedSources {
    pub fn author_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.posts.iter().map(|p| p.author_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Clone)]
pub struct FeedLoader {
    posts: PostApi,
    follows: FollowApi,
    reports: ReportApi,
}

impl FeedLoader {
    pub fn new(posts: PostApi, follows: FollowApi, reports: ReportApi) -> Self {
        Self {
            posts,
            follows,
            reports,
        }
    }

    /// `viewer_id` 为空时不请求关注与隐藏集合
    pub async fn load(&self, viewer_id: Option<i64>) -> FeedSources {
        let (posts, following, (hidden, not_interested)) = tokio::join!(
            self.posts.feed(),
            self.load_following(viewer_id),
            self.load_suppressed(viewer_id),
        );

        let unauthorized = is_401(&posts)
            || is_401(&following)
            || is_401(&hidden)
            || is_401(&not_interested);

        let posts = or_empty(posts, "动态列表");
        let following = or_empty(following, "关注列表");
        let hidden = or_empty(hidden, "隐藏列表");
        let not_interested = or_empty(not_interested, "不感兴趣列表");

        info!(
            "[FeedLoader] ✅ 加载完成：动态 {} 条，关注 {} 人，隐藏 {} 条，不感兴趣 {} 条",
            posts.len(),
            following.len(),
            hidden.len(),
            not_interested.len()
        );

        FeedSources {
            posts,
            snapshot: FeedSnapshot::new(following, hidden, not_interested),
            unauthorized,
        }
    }

    async fn load_following(&self, viewer_id: Option<i64>) -> ApiResult<HashSet<i64>> {
        match viewer_id {
            Some(id) => self.follows.following_ids(id).await,
            None => Ok(HashSet::new()),
        }
    }

    async fn load_suppressed(
        &self,
        viewer_id: Option<i64>,
    ) -> (ApiResult<HashSet<i64>>, ApiResult<HashSet<i64>>) {
        if viewer_id.is_none() {
            return (Ok(HashSet::new()), Ok(HashSet::new()));
        }
        tokio::join!(self.reports.hidden_ids(), self.reports.not_interested_ids())
    }
}

fn is_401<T>(result: &ApiResult<T>) -> bool {
    matches!(result, Err(ApiError::Unauthorized))
}

fn or_empty<T: Default>(result: ApiResult<T>, source: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!("[FeedLoader] {}加载失败，按空处理: {}", source, e);
        T::default()
    })
}
