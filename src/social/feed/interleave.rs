//! 动态交错排序
//!
//! 先放最多 3 条自己的动态，然后循环"3 条关注者 + 1 条其他人"，
//! 两类都取完后再追加剩余的自己的动态。各分区内部保持服务器顺序。

use crate::social::feed::view::PostView;
use std::collections::HashSet;

/// 开头最多展示的自己的动态数
pub const OWN_LEAD: usize = 3;
/// 每轮关注者动态数
pub const FOLLOWED_RUN: usize = 3;
/// 每轮其他人动态数
pub const OTHER_RUN: usize = 1;

/// 按与当前用户的关系划分的三个分区
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions<T> {
    pub own: Vec<T>,
    pub followed: Vec<T>,
    pub other: Vec<T>,
}

impl<T> Partitions<T> {
    pub fn interleave(self) -> Vec<T> {
        interleave(self.own, self.followed, self.other)
    }
}

pub fn partition(posts: Vec<PostView>, viewer_id: Option<i64>, following: &HashSet<i64>) -> Partitions<PostView> {
    let mut parts = Partitions {
        own: Vec::new(),
        followed: Vec::new(),
        other: Vec::new(),
    };
    for post in posts {
        if viewer_id == Some(post.author_id) {
            parts.own.push(post);
        } else if following.contains(&post.author_id) {
            parts.followed.push(post);
        } else {
            parts.other.push(post);
        }
    }
    parts
}

pub fn interleave<T>(own: Vec<T>, followed: Vec<T>, other: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(own.len() + followed.len() + other.len());
    let mut own = own.into_iter();
    let mut followed = followed.into_iter().peekable();
    let mut other = other.into_iter().peekable();

    out.extend(own.by_ref().take(OWN_LEAD));
    while followed.peek().is_some() || other.peek().is_some() {
        out.extend(followed.by_ref().take(FOLLOWED_RUN));
        out.extend(other.by_ref().take(OTHER_RUN));
    }
    out.extend(own);
    out
}
