//! 通知模型与推送事件

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comentario,
    Seguidor,
    Reporte,
    Mencion,
    #[serde(other)]
    Otro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "tipo")]
    pub kind: NotificationKind,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "leida", default)]
    pub read: bool,
    #[serde(rename = "emisor_id", default)]
    pub actor_id: Option<i64>,
    #[serde(rename = "publicacion_id", default)]
    pub post_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// 推送通道上的事件帧：`{"evento": "...", "datos": {...}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "evento", content = "datos")]
pub enum PushEvent {
    #[serde(rename = "notificacion")]
    Notification(Notification),
    #[serde(rename = "no_leidas")]
    UnreadCount { total: u32 },
}
