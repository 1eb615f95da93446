//! 通知 HTTP API 客户端

use crate::social::error::ApiResult;
use crate::social::http::ApiClient;
use crate::social::notification::models::Notification;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct UnreadCount {
    #[serde(alias = "no_leidas", default)]
    total: u32,
}

#[derive(Clone)]
pub struct NotificationApi {
    api: ApiClient,
}

impl NotificationApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ApiResult<Vec<Notification>> {
        self.api.get_list("/api/notificaciones", "通知列表").await
    }

    pub async fn unread_count(&self) -> ApiResult<u32> {
        let count: UnreadCount = self
            .api
            .get("/api/notificaciones/no-leidas", "未读通知数")
            .await?;
        Ok(count.total)
    }

    pub async fn mark_read(&self, notification_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .put_json(
                &format!("/api/notificaciones/{}/leer", notification_id),
                &serde_json::json!({}),
                "标记已读",
            )
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> ApiResult<()> {
        let _: Value = self
            .api
            .put_json("/api/notificaciones/leer-todas", &serde_json::json!({}), "全部已读")
            .await?;
        Ok(())
    }
}
