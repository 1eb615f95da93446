//! 实时通知推送通道
//!
//! 连接 `ws(s)://…/ws/notificaciones?token=<jwt>`，按固定间隔发送 Ping 保活，
//! 断线后等待 `reconnect_delay` 重连；握手返回 401 时回调会话过期并退出。
//! 取消由外部 [`crate::social::scope::ScreenScope`] 负责。

use crate::social::notification::listener::NotificationListener;
use crate::social::notification::models::PushEvent;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, warn};

pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(25);
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct NotificationStream {
    ws_url: String,
    token: String,
    ping_interval: Duration,
    reconnect_delay: Duration,
    listener: Arc<dyn NotificationListener>,
}

impl NotificationStream {
    pub fn new(
        ws_url: impl Into<String>,
        token: impl Into<String>,
        listener: Arc<dyn NotificationListener>,
    ) -> Self {
        Self {
            ws_url: ws_url.into(),
            token: token.into(),
            ping_interval: DEFAULT_PING_INTERVAL,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            listener,
        }
    }

    pub fn with_ping_interval(mut self, ping_interval: Duration) -> Self {
        self.ping_interval = ping_interval;
        self
    }

    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    fn connect_url(&self) -> String {
        format!("{}?token={}", self.ws_url, self.token)
    }

    /// 持续运行直到会话过期
    pub async fn run(self) {
        loop {
            let reason = match self.run_once().await {
                Ok(()) => "连接已关闭".to_string(),
                Err(e) if is_unauthorized_handshake(&e) => {
                    warn!("[Notify] 🔒 推送通道鉴权失败，会话已过期");
                    self.listener
                        .on_connection_status_changed(false, "会话已过期".to_string())
                        .await;
                    self.listener.on_session_expired().await;
                    return;
                }
                Err(e) => {
                    error!("[Notify] WebSocket 错误: {}", e);
                    e.to_string()
                }
            };

            self.listener
                .on_connection_status_changed(false, reason)
                .await;
            info!(
                "[Notify] 🔁 {} 秒后重连",
                self.reconnect_delay.as_secs_f32()
            );
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn run_once(&self) -> Result<(), WsError> {
        info!("[Notify] 🔗 连接通知通道: {}", self.ws_url);
        let (ws_stream, response) = connect_async(self.connect_url()).await?;
        info!("[Notify] ✅ WebSocket 连接成功, 状态: {}", response.status());
        self.listener
            .on_connection_status_changed(true, "连接成功".to_string())
            .await;

        let (mut write, mut read) = ws_stream.split();
        let mut ticker = interval(self.ping_interval);
        // 第一次 tick 立即返回
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    write.send(WsMessage::Ping(vec![])).await?;
                }
                frame = read.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => self.dispatch(&text).await,
                    Some(Ok(WsMessage::Close(frame))) => {
                        warn!("[Notify] 👋 连接关闭: {:?}", frame);
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => return Ok(()),
                }
            }
        }
    }

    async fn dispatch(&self, text: &str) {
        match serde_json::from_str::<PushEvent>(text) {
            Ok(PushEvent::Notification(notification)) => {
                info!(
                    "[Notify] 🔔 新通知 id={} tipo={:?}",
                    notification.id, notification.kind
                );
                self.listener.on_new_notification(notification).await;
            }
            Ok(PushEvent::UnreadCount { total }) => {
                debug!("[Notify] 未读数: {}", total);
                self.listener.on_unread_count_changed(total).await;
            }
            Err(e) => {
                debug!("[Notify] 忽略未知帧: {} ({})", text, e);
            }
        }
    }
}

fn is_unauthorized_handshake(err: &WsError) -> bool {
    matches!(err, WsError::Http(response) if response.status().as_u16() == 401)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::notification::models::Notification;
    use crate::social::scope::ScreenScope;
    use async_trait::async_trait;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    enum Event {
        Connected(bool),
        Notification(i64),
        Unread(u32),
    }

    struct ChannelListener(mpsc::UnboundedSender<Event>);

    #[async_trait]
    impl NotificationListener for ChannelListener {
        async fn on_new_notification(&self, notification: Notification) {
            let _ = self.0.send(Event::Notification(notification.id));
        }
        async fn on_unread_count_changed(&self, total: u32) {
            let _ = self.0.send(Event::Unread(total));
        }
        async fn on_connection_status_changed(&self, connected: bool, _message: String) {
            let _ = self.0.send(Event::Connected(connected));
        }
        async fn on_session_expired(&self) {}
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn frames_reach_listener() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = server.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(WsMessage::Text(
                r#"{"evento":"notificacion","datos":{"id":9,"tipo":"seguidor","created_at":"2026-10-18T10:00:00Z"}}"#.to_string(),
            ))
            .await
            .unwrap();
            ws.send(WsMessage::Text("{\"evento\":\"desconocido\"}".to_string()))
                .await
                .unwrap();
            ws.send(WsMessage::Text(
                r#"{"evento":"no_leidas","datos":{"total":2}}"#.to_string(),
            ))
            .await
            .unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = NotificationStream::new(
            format!("ws://{}/ws/notificaciones", addr),
            "tok",
            Arc::new(ChannelListener(tx)),
        );
        let mut scope = ScreenScope::new("notifications");
        scope.spawn(stream.run());

        assert!(matches!(next_event(&mut rx).await, Event::Connected(true)));
        assert!(matches!(next_event(&mut rx).await, Event::Notification(9)));
        assert!(matches!(next_event(&mut rx).await, Event::Unread(2)));

        scope.shutdown().await;
    }
}
