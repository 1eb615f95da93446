//! 动态展示模型：把服务器记录转换为可直接渲染的字段

use crate::social::format::{avatar_gradient, display_name, format_relative_time, initials, AvatarGradient};
use crate::social::photo::PhotoUrlCache;
use crate::social::post::{RawPost, Visibility};
use crate::social::storage::resolve_image_url;
use chrono::{DateTime, Utc};

/// 渲染所需的外部参数
#[derive(Debug, Clone, Default)]
pub struct FeedContext {
    pub storage_base_url: String,
    pub api_base_url: String,
    pub photo_cache: PhotoUrlCache,
}

impl FeedContext {
    pub fn new(storage_base_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            storage_base_url: storage_base_url.into(),
            api_base_url: api_base_url.into(),
            photo_cache: PhotoUrlCache::default(),
        }
    }

    pub fn with_photo_cache(mut self, photo_cache: PhotoUrlCache) -> Self {
        self.photo_cache = photo_cache;
        self
    }
}

/// 动态视图模型，每次加载重新生成，不做持久化
#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub author_initials: String,
    pub author_avatar_url: Option<String>,
    pub avatar: AvatarGradient,
    pub content: String,
    pub category: Option<String>,
    pub visibility: Visibility,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub relative_time: String,
    pub like_count: u32,
    pub comment_count: u32,
}

pub fn map_post(raw: &RawPost, ctx: &FeedContext, now: DateTime<Utc>) -> PostView {
    let author_name = display_name(raw.author_full_name.as_deref(), raw.author_username.as_deref());
    let author_avatar_url = ctx
        .photo_cache
        .get(raw.author_id)
        .map(str::to_string)
        .or_else(|| {
            resolve_image_url(
                raw.author_avatar.as_deref(),
                &ctx.storage_base_url,
                &ctx.api_base_url,
            )
        });

    PostView {
        id: raw.id,
        author_id: raw.author_id,
        author_initials: initials(&author_name),
        author_name,
        author_avatar_url,
        avatar: avatar_gradient(raw.author_id),
        content: raw.content.clone(),
        category: raw.category.clone(),
        visibility: raw.visibility,
        image_url: resolve_image_url(
            raw.image_url.as_deref(),
            &ctx.storage_base_url,
            &ctx.api_base_url,
        ),
        created_at: raw.created_at,
        relative_time: format_relative_time(raw.created_at, now),
        like_count: raw.like_count,
        comment_count: raw.comment_count,
    }
}

pub fn map_posts(raw: &[RawPost], ctx: &FeedContext, now: DateTime<Utc>) -> Vec<PostView> {
    raw.iter().map(|post| map_post(post, ctx, now)).collect()
}
