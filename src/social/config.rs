//! 客户端配置
//!
//! API 基础地址按主机名区分本地与生产环境，环境变量可以覆盖任意一项。

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// 本地开发后端地址
pub const LOCAL_API_BASE_URL: &str = "http://localhost:3000";
/// 生产环境后端地址
pub const PRODUCTION_API_BASE_URL: &str = "https://api.campusnet.app";
/// 公共对象存储桶地址（图片与文档）
pub const STORAGE_BASE_URL: &str = "https://storage.googleapis.com/campusnet-media";
/// 批量查询照片接口单次最多接受的用户 ID 数
pub const MAX_PHOTO_BATCH: usize = 50;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// REST API 基础地址
    pub api_base_url: String,
    /// 对象存储基础地址
    pub storage_base_url: String,
    /// 通知推送 WebSocket 地址
    pub ws_url: String,
    /// 本地会话数据库 URL，例如 `sqlite://campusnet.db?mode=rwc`
    pub session_db_url: String,
    /// 在线心跳间隔
    pub heartbeat_interval: Duration,
    /// 批量照片查询分片大小（不超过 [`MAX_PHOTO_BATCH`]）
    pub photo_batch_size: usize,
}

impl ClientConfig {
    /// 以指定 API 地址创建配置，其余项使用默认值
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            ws_url: ws_url_for(&api_base_url),
            api_base_url,
            storage_base_url: STORAGE_BASE_URL.to_string(),
            session_db_url: "sqlite://campusnet.db?mode=rwc".to_string(),
            heartbeat_interval: Duration::from_secs(60),
            photo_batch_size: MAX_PHOTO_BATCH,
        }
    }

    /// 根据当前主机名选择后端：本地主机连本地后端，其他一律连生产环境
    pub fn for_host(host: &str) -> Self {
        if is_local_host(host) {
            Self::new(LOCAL_API_BASE_URL)
        } else {
            Self::new(PRODUCTION_API_BASE_URL)
        }
    }

    /// 从环境变量加载配置
    ///
    /// `CAMPUSNET_HOST` 决定默认后端，`CAMPUSNET_API_URL` 等变量可覆盖单项。
    pub fn from_env() -> Self {
        let host = load_or("CAMPUSNET_HOST", "localhost".to_string());
        let mut config = Self::for_host(&host);

        if let Some(api) = var("CAMPUSNET_API_URL") {
            config = Self::new(api);
        }
        if let Some(storage) = var("CAMPUSNET_STORAGE_URL") {
            config.storage_base_url = storage.trim_end_matches('/').to_string();
        }
        if let Some(ws) = var("CAMPUSNET_WS_URL") {
            config.ws_url = ws;
        }
        if let Some(db) = var("CAMPUSNET_DB_URL") {
            config.session_db_url = db;
        }
        let secs: u64 = load_or("CAMPUSNET_HEARTBEAT_SECS", config.heartbeat_interval.as_secs());
        config.heartbeat_interval = Duration::from_secs(secs.max(1));
        config.photo_batch_size = config.photo_batch_size.clamp(1, MAX_PHOTO_BATCH);

        info!(
            "[Config] API: {}, 存储: {}, WS: {}",
            config.api_base_url, config.storage_base_url, config.ws_url
        );
        config
    }
}

fn is_local_host(host: &str) -> bool {
    let host = host.split(':').next().unwrap_or_default();
    matches!(host, "" | "localhost" | "127.0.0.1" | "0.0.0.0")
}

/// http(s)://host → ws(s)://host/ws/notificaciones
fn ws_url_for(api_base_url: &str) -> String {
    let base = if let Some(rest) = api_base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = api_base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        api_base_url.to_string()
    };
    format!("{}/ws/notificaciones", base)
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn load_or<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("[Config] {} 的值无效: {}，使用默认值 {}", key, raw, default);
            default
        }),
        None => {
            info!("[Config] 未设置 {}，使用默认值 {}", key, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_hosts_use_local_backend() {
        for host in ["localhost", "127.0.0.1", "localhost:4200", ""] {
            assert_eq!(ClientConfig::for_host(host).api_base_url, LOCAL_API_BASE_URL);
        }
    }

    #[test]
    fn other_hosts_use_production_backend() {
        let config = ClientConfig::for_host("campusnet.app");
        assert_eq!(config.api_base_url, PRODUCTION_API_BASE_URL);
        assert_eq!(config.ws_url, "wss://api.campusnet.app/ws/notificaciones");
    }

    #[test]
    fn new_trims_trailing_slash() {
        let config = ClientConfig::new("http://127.0.0.1:9000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.ws_url, "ws://127.0.0.1:9000/ws/notificaciones");
        assert_eq!(config.photo_batch_size, MAX_PHOTO_BATCH);
    }
}
