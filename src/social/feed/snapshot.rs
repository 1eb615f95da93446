//! 动态过滤所用的只读集合快照
//!
//! 关注集合、隐藏集合、不感兴趣集合在一次加载后作为整体传入管线，
//! 所有修改都返回新快照。

use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    following: Arc<HashSet<i64>>,
    hidden: Arc<HashSet<i64>>,
    not_interested: Arc<HashSet<i64>>,
}

impl FeedSnapshot {
    pub fn new(following: HashSet<i64>, hidden: HashSet<i64>, not_interested: HashSet<i64>) -> Self {
        Self {
            following: Arc::new(following),
            hidden: Arc::new(hidden),
            not_interested: Arc::new(not_interested),
        }
    }

    pub fn following(&self) -> &HashSet<i64> {
        &self.following
    }

    pub fn hidden(&self) -> &HashSet<i64> {
        &self.hidden
    }

    pub fn not_interested(&self) -> &HashSet<i64> {
        &self.not_interested
    }

    pub fn follows(&self, user_id: i64) -> bool {
        self.following.contains(&user_id)
    }

    /// 被隐藏或标记为不感兴趣
    pub fn is_suppressed(&self, post_id: i64) -> bool {
        self.hidden.contains(&post_id) || self.not_interested.contains(&post_id)
    }

    pub fn with_followed(&self, user_id: i64) -> Self {
        Self {
            following: Arc::new(with(&self.following, user_id)),
            ..self.clone()
        }
    }

    pub fn without_followed(&self, user_id: i64) -> Self {
        Self {
            following: Arc::new(without(&self.following, user_id)),
            ..self.clone()
        }
    }

    pub fn with_hidden(&self, post_id: i64) -> Self {
        Self {
            hidden: Arc::new(with(&self.hidden, post_id)),
            ..self.clone()
        }
    }

    pub fn without_hidden(&self, post_id: i64) -> Self {
        Self {
            hidden: Arc::new(without(&self.hidden, post_id)),
            ..self.clone()
        }
    }

    pub fn with_not_interested(&self, post_id: i64) -> Self {
        Self {
            not_interested: Arc::new(with(&self.not_interested, post_id)),
            ..self.clone()
        }
    }
}

fn with(set: &HashSet<i64>, id: i64) -> HashSet<i64> {
    let mut next = set.clone();
    next.insert(id);
    next
}

fn without(set: &HashSet<i64>, id: i64) -> HashSet<i64> {
    let mut next = set.clone();
    next.remove(&id);
    next
}
