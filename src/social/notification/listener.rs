//! 通知监听器回调接口

use crate::social::notification::models::Notification;
use async_trait::async_trait;

#[async_trait]
pub trait NotificationListener: Send + Sync {
    /// 收到新通知
    async fn on_new_notification(&self, notification: Notification);

    /// 未读数变更
    async fn on_unread_count_changed(&self, total: u32);

    /// 推送通道连接状态变更
    async fn on_connection_status_changed(&self, connected: bool, message: String);

    /// 会话过期（任意请求返回 401），调用方应跳转登录
    async fn on_session_expired(&self);
}

/// 默认空实现（无操作）
pub struct EmptyNotificationListener;

#[async_trait]
impl NotificationListener for EmptyNotificationListener {
    async fn on_new_notification(&self, _notification: Notification) {}
    async fn on_unread_count_changed(&self, _total: u32) {}
    async fn on_connection_status_changed(&self, _connected: bool, _message: String) {}
    async fn on_session_expired(&self) {}
}
