pub mod auth;
pub mod client;
pub mod comment;
pub mod config;
pub mod document;
pub mod error;
pub mod feed;
pub mod follow;
pub mod format;
pub mod http;
pub mod like;
pub mod notification;
pub mod photo;
pub mod post;
pub mod presence;
pub mod report;
pub mod scope;
pub mod session;
pub mod storage;
pub mod user;

// 重新导出客户端与配置
pub use client::CampusClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
