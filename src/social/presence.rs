//! 在线心跳
//!
//! 登录后 `start()`，登出时 `stop()`；两者都可重复调用。
//! 心跳返回 401 时任务自行退出并回调会话过期。

use crate::social::error::ApiError;
use crate::social::notification::listener::NotificationListener;
use crate::social::scope::ScreenScope;
use crate::social::user::UserApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct PresenceHeartbeat {
    users: UserApi,
    interval: Duration,
    listener: Option<Arc<dyn NotificationListener>>,
    scope: Option<ScreenScope>,
}

impl PresenceHeartbeat {
    pub fn new(users: UserApi, interval: Duration) -> Self {
        Self {
            users,
            interval,
            listener: None,
            scope: None,
        }
    }

    /// 心跳鉴权失败时通知该监听器
    pub fn with_listener(mut self, listener: Arc<dyn NotificationListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn is_running(&self) -> bool {
        self.scope.as_ref().is_some_and(|s| s.active_tasks() > 0)
    }

    /// 启动心跳；已在运行时返回 false
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            debug!("[Presence] 心跳已在运行");
            return false;
        }

        let users = self.users.clone();
        let period = self.interval;
        let listener = self.listener.clone();
        let mut scope = ScreenScope::new("presence");
        scope.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match users.heartbeat().await {
                    Ok(()) => debug!("[Presence] 💓 心跳成功"),
                    Err(ApiError::Unauthorized) => {
                        warn!("[Presence] 🔒 心跳鉴权失败，停止心跳");
                        if let Some(listener) = &listener {
                            listener.on_session_expired().await;
                        }
                        break;
                    }
                    Err(e) => warn!("[Presence] 心跳失败: {}", e),
                }
            }
        });
        // 旧作用域在此被丢弃并取消
        self.scope = Some(scope);
        info!("[Presence] ▶️ 心跳已启动，间隔 {:?}", period);
        true
    }

    /// 停止心跳并等待任务退出
    pub async fn stop(&mut self) {
        if let Some(scope) = self.scope.take() {
            scope.shutdown().await;
            info!("[Presence] ⏹️ 心跳已停止");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::http::ApiClient;
    use crate::social::notification::models::Notification;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct ExpiryFlag(AtomicBool);

    #[async_trait]
    impl NotificationListener for ExpiryFlag {
        async fn on_new_notification(&self, _notification: Notification) {}
        async fn on_unread_count_changed(&self, _total: u32) {}
        async fn on_connection_status_changed(&self, _connected: bool, _message: String) {}
        async fn on_session_expired(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    async fn heartbeat_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/usuarios/heartbeat"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn start_is_idempotent_and_stop_halts_ticks() {
        let server = heartbeat_server(200).await;
        let users = UserApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let mut presence = PresenceHeartbeat::new(users, Duration::from_millis(20));

        assert!(presence.start());
        assert!(!presence.start());
        tokio::time::sleep(Duration::from_millis(90)).await;
        presence.stop().await;
        assert!(!presence.is_running());

        let sent = server.received_requests().await.unwrap().len();
        assert!(sent >= 2, "expected several heartbeats, got {sent}");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(server.received_requests().await.unwrap().len(), sent);
    }

    #[tokio::test]
    async fn unauthorized_heartbeat_expires_session() {
        let server = heartbeat_server(401).await;
        let users = UserApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let flag = Arc::new(ExpiryFlag::default());
        let mut presence =
            PresenceHeartbeat::new(users, Duration::from_millis(20)).with_listener(flag.clone());

        presence.start();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(flag.0.load(Ordering::SeqCst));
        assert!(!presence.is_running());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
