//! 动态模块

pub mod api;
pub mod models;

pub use api::PostApi;
pub use models::{PostDraft, RawPost, Visibility};
