//! 用户模型

use crate::social::format::display_name;
use serde::{Deserialize, Serialize};

/// 用户（资料页、作者信息、会话缓存共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nombre_usuario", default)]
    pub username: Option<String>,
    #[serde(rename = "nombre_completo", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "carrera", default)]
    pub career: Option<String>,
    #[serde(rename = "biografia", default)]
    pub bio: Option<String>,
    #[serde(rename = "foto_perfil", default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "foto_portada", default)]
    pub cover_url: Option<String>,
    #[serde(rename = "total_seguidores", default)]
    pub follower_count: u32,
    #[serde(rename = "total_siguiendo", default)]
    pub following_count: u32,
}

impl User {
    pub fn display_name(&self) -> String {
        display_name(self.full_name.as_deref(), self.username.as_deref())
    }
}

/// 资料更新请求，未设置的字段不会发送
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nombre_completo", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "carrera", skip_serializing_if = "Option::is_none")]
    pub career: Option<String>,
    #[serde(rename = "biografia", skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.career.is_none() && self.bio.is_none()
    }
}

/// 在线用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    #[serde(alias = "usuario_id")]
    pub id: i64,
    #[serde(rename = "nombre_usuario", default)]
    pub username: Option<String>,
    #[serde(rename = "nombre_completo", default)]
    pub full_name: Option<String>,
    #[serde(rename = "foto_perfil", default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "ultima_actividad", default)]
    pub last_seen: Option<chrono::DateTime<chrono::Utc>>,
}
