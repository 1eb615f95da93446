//! 服务层错误类型

use thiserror::Error;

/// 服务层统一错误
///
/// 服务层只负责把 HTTP 结果归类，是否弹窗或静默降级由调用方决定。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络或传输失败
    #[error("网络错误: {0}")]
    Network(#[from] reqwest::Error),

    /// 401：未登录或会话过期，调用方应跳转登录
    #[error("未认证或会话已过期")]
    Unauthorized,

    /// 本地参数校验失败，未发出任何请求
    #[error("参数校验失败: {0}")]
    Validation(String),

    /// 服务器按业务规则拒绝（如重复举报），消息原样透传
    #[error("服务器拒绝请求 ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 其他 HTTP 错误
    #[error("HTTP 错误 {status}: {body}")]
    Http { status: u16, body: String },

    /// 响应体无法解析
    #[error("反序列化响应失败: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// 面向用户的提示文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Unauthorized => "Tu sesión ha expirado, inicia sesión de nuevo".to_string(),
            _ => "Ocurrió un error, inténtalo de nuevo".to_string(),
        }
    }
}

/// 判断 anyhow 错误链中是否包含 401
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ApiError>())
        .any(ApiError::is_unauthorized)
}
