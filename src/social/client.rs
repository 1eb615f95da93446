//! 校园社交客户端
//!
//! 持有配置、本地会话、认证后的 HTTP 客户端与后台任务（在线心跳、通知推送），
//! 并把动态管线与隐藏/举报/关注等动作串起来。任何调用返回 401 都会清除会话并回调
//! [`NotificationListener::on_session_expired`]。后台任务遇到 401 时通过共享的过期标记
//! 与会话库立即清除持久化会话，客户端在下一次调用时同步释放内存中的会话。

use crate::social::auth::{is_token_expired, AuthApi, LoginResponse, RegisterRequest};
use crate::social::comment::CommentApi;
use crate::social::config::ClientConfig;
use crate::social::document::DocumentApi;
use crate::social::error::{ApiError, ApiResult};
use crate::social::feed::{
    ActionOutcome, FeedContext, FeedLoader, LiveFeed, SuppressionAction, Transition,
};
use crate::social::follow::FollowApi;
use crate::social::http::ApiClient;
use crate::social::like::LikeApi;
use crate::social::notification::{
    EmptyNotificationListener, Notification, NotificationApi, NotificationListener,
    NotificationStream,
};
use crate::social::photo::{PhotoApi, PhotoUrlCache};
use crate::social::post::PostApi;
use crate::social::presence::PresenceHeartbeat;
use crate::social::report::{ReportApi, ReportOutcome};
use crate::social::scope::ScreenScope;
use crate::social::session::{Session, SessionStore};
use crate::social::user::{User, UserApi};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// 后台任务使用的监听器：转发所有回调，会话过期时先清除本地会话再通知上层
struct ExpiryRelay {
    inner: Arc<dyn NotificationListener>,
    store: SessionStore,
    expired: Arc<AtomicBool>,
}

impl ExpiryRelay {
    /// 同一会话只处理一次
    async fn expire(&self) {
        if self.expired.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.store.clear().await {
            warn!("[Client] 清除会话失败: {}", e);
        }
        self.inner.on_session_expired().await;
    }
}

#[async_trait]
impl NotificationListener for ExpiryRelay {
    async fn on_new_notification(&self, notification: Notification) {
        self.inner.on_new_notification(notification).await;
    }

    async fn on_unread_count_changed(&self, total: u32) {
        self.inner.on_unread_count_changed(total).await;
    }

    async fn on_connection_status_changed(&self, connected: bool, message: String) {
        self.inner
            .on_connection_status_changed(connected, message)
            .await;
    }

    async fn on_session_expired(&self) {
        warn!("[Client] 🔒 后台任务报告会话过期，清除本地会话");
        self.expire().await;
    }
}

pub struct CampusClient {
    config: ClientConfig,
    store: SessionStore,
    session: Option<Session>,
    api: ApiClient,
    listener: Arc<dyn NotificationListener>,
    presence: Option<PresenceHeartbeat>,
    notifications: Option<ScreenScope>,
    photo_cache: PhotoUrlCache,
    expired: Arc<AtomicBool>,
}

impl CampusClient {
    /// 打开本地会话库，初始为未登录状态
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let store = SessionStore::open(&config.session_db_url)
            .await
            .context("打开会话数据库失败")?;
        let api = ApiClient::anonymous(&config.api_base_url)?;
        Ok(Self {
            config,
            store,
            session: None,
            api,
            listener: Arc::new(EmptyNotificationListener),
            presence: None,
            notifications: None,
            photo_cache: PhotoUrlCache::default(),
            expired: Arc::new(AtomicBool::new(false)),
        })
    }

    /// 注册通知监听器；已登录时重启后台任务使新监听器生效
    pub fn set_notification_listener(&mut self, listener: Arc<dyn NotificationListener>) {
        self.listener = listener;
        if self.is_logged_in() {
            self.start_background();
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 已被后台任务判定过期的会话视为不存在
    pub fn session(&self) -> Option<&Session> {
        self.session
            .as_ref()
            .filter(|_| !self.expired.load(Ordering::SeqCst))
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_presence_running(&self) -> bool {
        self.presence.as_ref().is_some_and(PresenceHeartbeat::is_running)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let resp = AuthApi::new(self.api.clone())
            .login(email, password)
            .await
            .context("登录失败")?;
        self.establish(resp).await
    }

    pub async fn register(&mut self, req: &RegisterRequest) -> Result<User> {
        let resp = AuthApi::new(self.api.clone())
            .register(req)
            .await
            .context("注册失败")?;
        self.establish(resp).await
    }

    /// 从本地恢复会话
    ///
    /// token 已过期或服务器返回 401 时清除会话；网络不可用时沿用缓存的用户信息。
    pub async fn restore_session(&mut self) -> Result<Option<User>> {
        let Some(session) = self.store.load().await? else {
            return Ok(None);
        };

        if is_token_expired(&session.token, Utc::now()) {
            info!("[Client] ⏰ 本地 token 已过期，清除会话");
            self.store.clear().await?;
            return Ok(None);
        }

        let api = ApiClient::with_token(&self.config.api_base_url, &session.token)?;
        let user = match AuthApi::new(api).me().await {
            Ok(user) => user,
            Err(ApiError::Unauthorized) => {
                info!("[Client] 🔒 服务器拒绝本地 token，清除会话");
                self.store.clear().await?;
                return Ok(None);
            }
            Err(e) => {
                warn!("[Client] 无法校验会话，使用缓存的用户信息: {}", e);
                session.user
            }
        };

        let user = self
            .establish(LoginResponse {
                token: session.token,
                user,
            })
            .await?;
        Ok(Some(user))
    }

    /// 登出：停止后台任务并清除本地会话
    pub async fn logout(&mut self) -> Result<()> {
        self.stop_background().await;
        self.reset_session();
        self.store.clear().await?;
        info!("[Client] 👋 已登出");
        Ok(())
    }

    pub fn posts(&self) -> PostApi {
        PostApi::new(self.api.clone())
    }

    pub fn comments(&self) -> CommentApi {
        CommentApi::new(self.api.clone())
    }

    pub fn likes(&self) -> LikeApi {
        LikeApi::new(self.api.clone())
    }

    pub fn users(&self) -> UserApi {
        UserApi::new(self.api.clone())
    }

    pub fn follows(&self) -> FollowApi {
        FollowApi::new(self.api.clone())
    }

    pub fn reports(&self) -> ReportApi {
        ReportApi::new(self.api.clone())
    }

    pub fn photos(&self) -> PhotoApi {
        PhotoApi::new(self.api.clone()).with_batch_size(self.config.photo_batch_size)
    }

    pub fn documents(&self) -> DocumentApi {
        DocumentApi::new(self.api.clone())
    }

    pub fn notifications(&self) -> NotificationApi {
        NotificationApi::new(self.api.clone())
    }

    /// 为一个屏幕创建任务作用域，屏幕销毁时丢弃即可取消其全部任务
    pub fn open_screen(&self, name: &str) -> ScreenScope {
        ScreenScope::new(name)
    }

    /// 加载首页动态并组装渲染列表
    pub async fn load_feed(&mut self) -> Result<LiveFeed> {
        self.reap_expired().await;
        let viewer_id = self.current_user().map(|u| u.id);
        let loader = FeedLoader::new(self.posts(), self.follows(), self.reports());
        let sources = loader.load(viewer_id).await;
        if sources.unauthorized {
            self.expire_session().await;
            return Err(anyhow::Error::new(ApiError::Unauthorized).context("加载动态失败"));
        }

        match self
            .photos()
            .refresh_cache(&self.photo_cache, &sources.author_ids(), &self.config.storage_base_url)
            .await
        {
            Ok(cache) => self.photo_cache = cache,
            Err(ApiError::Unauthorized) => {
                self.expire_session().await;
                return Err(anyhow::Error::new(ApiError::Unauthorized).context("加载动态失败"));
            }
            Err(e) => warn!("[Client] 头像批量加载失败，使用动态自带头像: {}", e),
        }

        let ctx = FeedContext::new(&self.config.storage_base_url, &self.config.api_base_url)
            .with_photo_cache(self.photo_cache.clone());
        let feed = LiveFeed::new(sources.posts, viewer_id, sources.snapshot, ctx);
        info!("[Client] 📰 动态已组装: {} 条", feed.posts().len());
        Ok(feed)
    }

    /// 隐藏动态：立即本地移除，服务器失败不回滚
    pub async fn hide_post(&mut self, feed: &mut LiveFeed, post_id: i64) -> Result<Transition> {
        let transition = feed.begin(post_id, SuppressionAction::Hide);
        if transition == Transition::Ignored {
            return Ok(transition);
        }
        let result = self.reports().hide(post_id).await;
        feed.complete(post_id, outcome_of(&result, |_| false));
        self.check(result, "隐藏动态").await?;
        Ok(transition)
    }

    /// 标记不感兴趣：与隐藏相同的乐观语义
    pub async fn not_interested(&mut self, feed: &mut LiveFeed, post_id: i64) -> Result<Transition> {
        let transition = feed.begin(post_id, SuppressionAction::NotInterested);
        if transition == Transition::Ignored {
            return Ok(transition);
        }
        let result = self.reports().not_interested(post_id).await;
        feed.complete(post_id, outcome_of(&result, |_| false));
        self.check(result, "标记不感兴趣").await?;
        Ok(transition)
    }

    /// 举报动态：仅当服务器确认删除时本地移除
    pub async fn report_post(
        &mut self,
        feed: &mut LiveFeed,
        post_id: i64,
        reason: &str,
        details: Option<&str>,
    ) -> Result<ReportOutcome> {
        if feed.begin(post_id, SuppressionAction::Report) == Transition::Ignored {
            bail!("动态 {} 已有进行中的操作", post_id);
        }
        let result = self.reports().create(post_id, reason, details).await;
        feed.complete(post_id, outcome_of(&result, |o| o.eliminated));
        self.check(result, "举报动态").await
    }

    /// 关注：先更新本地集合，失败时回滚
    pub async fn follow_user(&mut self, feed: &mut LiveFeed, user_id: i64) -> Result<()> {
        if self.current_user().map(|u| u.id) == Some(user_id) {
            return Err(ApiError::Validation("No puedes seguirte a ti mismo".to_string()).into());
        }
        feed.set_following(user_id, true);
        let result = self.follows().follow(user_id).await;
        if result.is_err() {
            feed.set_following(user_id, false);
        }
        self.check(result, "关注用户").await
    }

    pub async fn unfollow_user(&mut self, feed: &mut LiveFeed, user_id: i64) -> Result<()> {
        feed.set_following(user_id, false);
        let result = self.follows().unfollow(user_id).await;
        if result.is_err() {
            feed.set_following(user_id, true);
        }
        self.check(result, "取消关注").await
    }

    /// 归类服务层结果；401 会清除会话
    pub async fn check<T>(&mut self, result: ApiResult<T>, operation: &str) -> Result<T> {
        self.reap_expired().await;
        match result {
            Err(ApiError::Unauthorized) => {
                self.expire_session().await;
                Err(anyhow::Error::new(ApiError::Unauthorized).context(format!("{}失败", operation)))
            }
            other => other.with_context(|| format!("{}失败", operation)),
        }
    }

    async fn establish(&mut self, resp: LoginResponse) -> Result<User> {
        self.stop_background().await;
        let session = Session {
            token: resp.token,
            user: resp.user,
        };
        self.api = ApiClient::with_token(&self.config.api_base_url, &session.token)?;
        self.store.save(&session).await?;
        let user = session.user.clone();
        self.session = Some(session);
        self.expired = Arc::new(AtomicBool::new(false));
        self.start_background();
        info!("[Client] ✅ 会话已建立: {} ({})", user.display_name(), user.id);
        Ok(user)
    }

    fn start_background(&mut self) {
        let Some(token) = self.session.as_ref().map(|s| s.token.clone()) else {
            return;
        };

        let relay: Arc<dyn NotificationListener> = Arc::new(self.relay());
        let mut presence = PresenceHeartbeat::new(self.users(), self.config.heartbeat_interval)
            .with_listener(relay.clone());
        presence.start();
        self.presence = Some(presence);

        let mut scope = ScreenScope::new("notifications");
        scope.spawn(NotificationStream::new(&self.config.ws_url, token, relay).run());
        self.notifications = Some(scope);
    }

    fn relay(&self) -> ExpiryRelay {
        ExpiryRelay {
            inner: self.listener.clone(),
            store: self.store.clone(),
            expired: self.expired.clone(),
        }
    }

    /// 释放已被后台任务判定过期的会话
    async fn reap_expired(&mut self) {
        if self.session.is_some() && self.expired.load(Ordering::SeqCst) {
            info!("[Client] 🧹 释放已过期的会话");
            self.stop_background().await;
            self.reset_session();
        }
    }

    async fn stop_background(&mut self) {
        if let Some(mut presence) = self.presence.take() {
            presence.stop().await;
        }
        if let Some(scope) = self.notifications.take() {
            scope.shutdown().await;
        }
    }

    fn reset_session(&mut self) {
        self.session = None;
        self.photo_cache = PhotoUrlCache::default();
        match ApiClient::anonymous(&self.config.api_base_url) {
            Ok(api) => self.api = api,
            Err(e) => warn!("[Client] 重建匿名客户端失败: {}", e),
        }
    }

    async fn expire_session(&mut self) {
        if self.session.is_none() {
            return;
        }
        warn!("[Client] 🔒 会话已过期，清除本地会话");
        self.stop_background().await;
        self.relay().expire().await;
        self.reset_session();
    }
}

fn outcome_of<T>(result: &ApiResult<T>, eliminated: impl FnOnce(&T) -> bool) -> ActionOutcome {
    match result {
        Ok(value) => ActionOutcome::Succeeded {
            eliminated: eliminated(value),
        },
        Err(_) => ActionOutcome::Failed,
    }
}

/// 把 anyhow 错误转换为面向用户的提示
pub fn user_message(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .map(ApiError::user_message)
        .unwrap_or_else(|| err.to_string())
}
