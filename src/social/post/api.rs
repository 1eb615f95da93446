//! 动态 HTTP API 客户端

use crate::social::error::{ApiError, ApiResult};
use crate::social::http::ApiClient;
use crate::social::post::models::{PostDraft, RawPost};
use reqwest::multipart::Form;
use serde_json::Value;
use tracing::info;

/// 动态相关的 HTTP API 客户端
#[derive(Clone)]
pub struct PostApi {
    api: ApiClient,
}

impl PostApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 首页动态
    pub async fn feed(&self) -> ApiResult<Vec<RawPost>> {
        let posts: Vec<RawPost> = self.api.get_list("/api/publicaciones", "首页动态").await?;
        info!("[PostAPI] ✅ 首页动态条数: {}", posts.len());
        Ok(posts)
    }

    /// 指定用户的动态
    pub async fn by_user(&self, user_id: i64) -> ApiResult<Vec<RawPost>> {
        self.api
            .get_list(&format!("/api/publicaciones/usuario/{}", user_id), "用户动态")
            .await
    }

    /// 当前用户自己的动态
    pub async fn mine(&self) -> ApiResult<Vec<RawPost>> {
        self.api
            .get_list("/api/publicaciones/mis-publicaciones", "我的动态")
            .await
    }

    pub async fn create(&self, draft: PostDraft) -> ApiResult<RawPost> {
        let form = Self::build_form(draft)?;
        self.api
            .post_multipart("/api/publicaciones", form, "发布动态")
            .await
    }

    pub async fn update(&self, post_id: i64, draft: PostDraft) -> ApiResult<RawPost> {
        let form = Self::build_form(draft)?;
        self.api
            .put_multipart(&format!("/api/publicaciones/{}", post_id), form, "编辑动态")
            .await
    }

    pub async fn delete(&self, post_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .delete(&format!("/api/publicaciones/{}", post_id), "删除动态")
            .await?;
        Ok(())
    }

    /// 文字与图片至少要有一项
    fn build_form(draft: PostDraft) -> ApiResult<Form> {
        let content = draft.content.trim().to_string();
        if content.is_empty() && draft.image.is_none() {
            return Err(ApiError::Validation(
                "La publicación no puede estar vacía".to_string(),
            ));
        }

        let mut form = Form::new()
            .text("contenido", content)
            .text("visibilidad", draft.visibility.as_str());
        if let Some(category) = draft.category {
            form = form.text("categoria", category);
        }
        if let Some(image) = draft.image {
            form = form.part("imagen", image.into_part()?);
        }
        Ok(form)
    }
}
