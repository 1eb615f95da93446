pub mod social;

// 重新导出常用类型，方便外部使用
pub use social::{
    client::{user_message, CampusClient},
    config::ClientConfig,
    error::{is_unauthorized, ApiError, ApiResult},
    feed::{LiveFeed, PostView},
    notification::{EmptyNotificationListener, Notification, NotificationListener},
    session::Session,
    user::User,
};
