//! 评论 HTTP API 客户端
//!
//! 服务器会对评论自动审核，结果通过 `_censura` 字段返回。

use crate::social::error::{ApiError, ApiResult};
use crate::social::http::ApiClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// 审核严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CensorshipLevel {
    Ninguno,
    Bajo,
    Medio,
    Alto,
    #[serde(other)]
    Desconocido,
}

/// 服务器端自动审核的元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Censorship {
    #[serde(rename = "censurado", default)]
    pub flagged: bool,
    #[serde(rename = "nivel", default)]
    pub level: Option<CensorshipLevel>,
    #[serde(rename = "palabras_censuradas", default)]
    pub redacted_terms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "publicacion_id")]
    pub post_id: i64,
    #[serde(rename = "usuario_id")]
    pub author_id: i64,
    #[serde(rename = "contenido")]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "nombre_usuario", default)]
    pub author_username: Option<String>,
    #[serde(rename = "nombre_completo", default)]
    pub author_full_name: Option<String>,
    #[serde(rename = "foto_perfil", default)]
    pub author_avatar: Option<String>,
    #[serde(rename = "_censura", default, skip_serializing_if = "Option::is_none")]
    pub censorship: Option<Censorship>,
}

impl Comment {
    pub fn was_censored(&self) -> bool {
        self.censorship.as_ref().is_some_and(|c| c.flagged)
    }
}

#[derive(Clone)]
pub struct CommentApi {
    api: ApiClient,
}

impl CommentApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, post_id: i64, content: &str) -> ApiResult<Comment> {
        let content = validate_content(content)?;
        let comment: Comment = self
            .api
            .post_json(
                "/api/comentarios",
                &serde_json::json!({ "publicacion_id": post_id, "contenido": content }),
                "发表评论",
            )
            .await?;
        if comment.was_censored() {
            warn!(
                "[CommentAPI] 评论 {} 被自动审核: {:?}",
                comment.id, comment.censorship
            );
        }
        Ok(comment)
    }

    pub async fn list_for_post(&self, post_id: i64) -> ApiResult<Vec<Comment>> {
        self.api
            .get_list(&format!("/api/comentarios/publicacion/{}", post_id), "评论列表")
            .await
    }

    pub async fn update(&self, comment_id: i64, content: &str) -> ApiResult<Comment> {
        let content = validate_content(content)?;
        self.api
            .put_json(
                &format!("/api/comentarios/{}", comment_id),
                &serde_json::json!({ "contenido": content }),
                "编辑评论",
            )
            .await
    }

    pub async fn delete(&self, comment_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .delete(&format!("/api/comentarios/{}", comment_id), "删除评论")
            .await?;
        Ok(())
    }
}

fn validate_content(content: &str) -> ApiResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation(
            "El comentario no puede estar vacío".to_string(),
        ));
    }
    Ok(content)
}
