pub mod article;
pub mod notification;

pub use article::{ArticlePayload, NotificationRequest, NEW_ARTICLE_PREFIX, POSTS_PATH};
pub use notification::{NotificationEntry, NotificationType, UrlNotification, UrlNotificationMetadata};
