use crate::social::error::{ApiError, ApiResult};
use crate::social::http::ApiClient;
use crate::social::user::User;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(rename = "nombre_usuario")]
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "carrera", skip_serializing_if = "Option::is_none")]
    pub career: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(alias = "user", rename = "usuario")]
    pub user: User,
}

/// JWT 中客户端关心的声明
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// 用户 ID，兼容数字与字符串两种写法
    pub fn user_id(&self) -> Option<i64> {
        [&self.id, &self.sub]
            .into_iter()
            .flatten()
            .find_map(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// 解析 JWT payload（不验签，只用于读取过期时间）
pub fn decode_token_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// 无法解析的 token 视为未过期，交给服务器 401 判定
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    decode_token_claims(token)
        .and_then(|claims| claims.expires_at())
        .map(|exp| exp <= now)
        .unwrap_or(false)
}

/// 认证接口（`/api/auth/...`）
#[derive(Clone)]
pub struct AuthApi {
    api: ApiClient,
}

impl AuthApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Ingresa tu correo y contraseña".to_string(),
            ));
        }

        info!("🔐 正在登录...");
        debug!("   邮箱: {}", email);

        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.api.post_json("/api/auth/login", &req, "登录").await?;
        info!("✅ 登录成功，用户ID: {}", resp.user.id);
        Ok(resp)
    }

    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<LoginResponse> {
        if req.email.trim().is_empty() || req.username.trim().is_empty() {
            return Err(ApiError::Validation(
                "El correo y el nombre de usuario son obligatorios".to_string(),
            ));
        }
        if req.password.chars().count() < 6 {
            return Err(ApiError::Validation(
                "La contraseña debe tener al menos 6 caracteres".to_string(),
            ));
        }
        self.api.post_json("/api/auth/register", req, "注册").await
    }

    /// 当前登录用户，token 失效时返回 [`ApiError::Unauthorized`]
    pub async fn me(&self) -> ApiResult<User> {
        self.api.get("/api/auth/me", "当前用户").await
    }
}
