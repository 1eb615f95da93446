//! 动态模型

use crate::social::http::{deserialize_null_default, FileUpload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 可见范围
///
/// 缺省字段视为公开；null 或无法识别的取值按私密处理，只对作者本人可见。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    #[default]
    #[serde(rename = "publico")]
    Public,
    #[serde(rename = "seguidores")]
    FollowersOnly,
    #[serde(rename = "privado")]
    Private,
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Visibility::Private, Visibility::parse))
    }
}

impl Visibility {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "publico" | "público" | "public" => Visibility::Public,
            "seguidores" | "followers" => Visibility::FollowersOnly,
            _ => Visibility::Private,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "publico",
            Visibility::FollowersOnly => "seguidores",
            Visibility::Private => "privado",
        }
    }
}

/// 服务器返回的动态（只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: i64,
    #[serde(rename = "usuario_id")]
    pub author_id: i64,
    #[serde(rename = "contenido", default, deserialize_with = "deserialize_null_default")]
    pub content: String,
    #[serde(rename = "imagen_url", default)]
    pub image_url: Option<String>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "visibilidad", default)]
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "total_likes", default, deserialize_with = "deserialize_null_default")]
    pub like_count: u32,
    #[serde(
        rename = "total_comentarios",
        default,
        deserialize_with = "deserialize_null_default"
    )]
    pub comment_count: u32,
    #[serde(rename = "nombre_completo", default)]
    pub author_full_name: Option<String>,
    #[serde(rename = "nombre_usuario", default)]
    pub author_username: Option<String>,
    #[serde(rename = "foto_perfil", default)]
    pub author_avatar: Option<String>,
}

/// 发布或编辑动态
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub content: String,
    pub category: Option<String>,
    pub visibility: Visibility,
    pub image: Option<FileUpload>,
}

impl PostDraft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_image(mut self, image: FileUpload) -> Self {
        self.image = Some(image);
        self
    }
}
