pub mod api;
pub mod listener;
pub mod models;
pub mod stream;

pub use api::NotificationApi;
pub use listener::{EmptyNotificationListener, NotificationListener};
pub use models::{Notification, NotificationKind, PushEvent};
pub use stream::NotificationStream;
