//! 可见性过滤

use crate::social::feed::snapshot::FeedSnapshot;
use crate::social::feed::view::PostView;
use crate::social::post::Visibility;
use std::collections::HashSet;

/// 单条动态对当前用户是否可见
///
/// 作者本人总能看到；公开动态所有人可见；仅关注者可见的动态要求已登录且关注了作者；
/// 私密动态只有作者可见。
pub fn is_visible(post: &PostView, viewer_id: Option<i64>, following: &HashSet<i64>) -> bool {
    if viewer_id == Some(post.author_id) {
        return true;
    }
    match post.visibility {
        Visibility::Public => true,
        Visibility::FollowersOnly => viewer_id.is_some() && following.contains(&post.author_id),
        Visibility::Private => false,
    }
}

/// 过滤不可见、已隐藏、不感兴趣的动态，保持原有顺序
pub fn filter_visible(posts: Vec<PostView>, viewer_id: Option<i64>, snapshot: &FeedSnapshot) -> Vec<PostView> {
    posts
        .into_iter()
        .filter(|post| is_visible(post, viewer_id, snapshot.following()))
        .filter(|post| !snapshot.is_suppressed(post.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::feed::view::tests::{now, raw};
    use crate::social::feed::view::{map_post, FeedContext};

    fn view(id: i64, author: i64, visibility: Visibility) -> PostView {
        map_post(&raw(id, author, visibility), &FeedContext::default(), now())
    }

    #[test]
    fn own_posts_are_always_visible() {
        for visibility in [Visibility::Public, Visibility::FollowersOnly, Visibility::Private] {
            assert!(is_visible(&view(1, 7, visibility), Some(7), &HashSet::new()));
        }
    }

    #[test]
    fn followers_only_requires_following_author() {
        let post = view(1, 7, Visibility::FollowersOnly);
        assert!(is_visible(&post, Some(3), &HashSet::from([7])));
        assert!(!is_visible(&post, Some(3), &HashSet::from([8])));
        assert!(!is_visible(&post, None, &HashSet::from([7])));
    }

    #[test]
    fn private_posts_only_for_author() {
        let post = view(1, 7, Visibility::Private);
        assert!(!is_visible(&post, Some(3), &HashSet::from([7])));
        assert!(!is_visible(&post, None, &HashSet::new()));
    }

    #[test]
    fn anonymous_viewers_only_see_public() {
        let posts = vec![
            view(1, 7, Visibility::Public),
            view(2, 7, Visibility::FollowersOnly),
            view(3, 7, Visibility::Private),
        ];
        let visible = filter_visible(posts, None, &FeedSnapshot::default());
        assert_eq!(visible.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn suppressed_posts_are_removed_even_when_visible() {
        let snapshot = FeedSnapshot::new(HashSet::from([7]), HashSet::from([1]), HashSet::from([2]));
        let posts = vec![
            view(1, 7, Visibility::Public),
            view(2, 7, Visibility::FollowersOnly),
            view(3, 7, Visibility::FollowersOnly),
            view(4, 3, Visibility::Private),
        ];
        let visible = filter_visible(posts, Some(3), &snapshot);
        assert_eq!(visible.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn visible_implies_rule_holds() {
        let following = HashSet::from([2, 4]);
        let viewers = [None, Some(1), Some(2), Some(3)];
        let visibilities = [Visibility::Public, Visibility::FollowersOnly, Visibility::Private];
        for viewer in viewers {
            for author in 1..=4 {
                for visibility in visibilities {
                    let post = view(1, author, visibility);
                    if is_visible(&post, viewer, &following) {
                        assert!(
                            viewer == Some(author)
                                || visibility == Visibility::Public
                                || (visibility == Visibility::FollowersOnly
                                    && viewer.is_some()
                                    && following.contains(&author))
                        );
                    }
                }
            }
        }
    }
}
