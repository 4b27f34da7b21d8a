//! Wire types of the Google Indexing API v3 `urlNotifications` resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "URL_UPDATED")]
    UrlUpdated,
    #[serde(rename = "URL_DELETED")]
    UrlDeleted,
    #[serde(rename = "URL_NOTIFICATION_TYPE_UNSPECIFIED")]
    #[serde(other)]
    Unspecified,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationType::UrlUpdated => "URL_UPDATED",
            NotificationType::UrlDeleted => "URL_DELETED",
            NotificationType::Unspecified => "URL_NOTIFICATION_TYPE_UNSPECIFIED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlNotification {
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

impl UrlNotification {
    pub fn updated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            notification_type: NotificationType::UrlUpdated,
        }
    }
}

/// One entry of `latestUpdate` / `latestRemove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotificationMetadata {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_update: Option<NotificationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_remove: Option<NotificationEntry>,
}
