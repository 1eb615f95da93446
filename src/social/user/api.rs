//! 用户 HTTP API 客户端

use crate::social::error::{ApiError, ApiResult};
use crate::social::http::ApiClient;
use crate::social::user::models::{ActiveUser, ProfileUpdate, User};
use serde_json::Value;
use tracing::info;

/// 用户资料、搜索、在线状态
#[derive(Clone)]
pub struct UserApi {
    api: ApiClient,
}

impl UserApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 获取用户资料
    pub async fn profile(&self, user_id: i64) -> ApiResult<User> {
        self.api
            .get(&format!("/api/usuarios/{}", user_id), "用户资料")
            .await
    }

    /// 更新当前用户资料
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        if update.is_empty() {
            return Err(ApiError::Validation("No hay cambios que guardar".to_string()));
        }
        self.api
            .put_json("/api/usuarios/perfil", update, "更新资料")
            .await
    }

    /// 按名称搜索用户
    pub async fn search(&self, query: &str) -> ApiResult<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.api
            .get_with_query("/api/usuarios/buscar", &[("q", query)], "搜索用户")
            .await
    }

    /// 当前在线用户
    pub async fn active_users(&self) -> ApiResult<Vec<ActiveUser>> {
        let users: Vec<ActiveUser> = self.api.get("/api/usuarios/activos", "在线用户").await?;
        info!("[UserAPI] ✅ 在线用户数: {}", users.len());
        Ok(users)
    }

    /// 上报在线心跳
    pub async fn heartbeat(&self) -> ApiResult<()> {
        let _: Value = self
            .api
            .post_json("/api/usuarios/heartbeat", &serde_json::json!({}), "在线心跳")
            .await?;
        Ok(())
    }
}
