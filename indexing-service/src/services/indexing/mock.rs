use super::{IndexingApi, IndexingError};
use crate::models::{NotificationEntry, UrlNotification, UrlNotificationMetadata};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

/// In-memory indexing API for tests and for running without Google
/// credentials. Every call is recorded.
#[derive(Default)]
pub struct MockIndexingClient {
    fail_publish: bool,
    omit_latest_update: bool,
    published: Mutex<Vec<UrlNotification>>,
    metadata_requests: Mutex<Vec<String>>,
}

impl MockIndexingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish fails with a 403 as if the service account lacked
    /// ownership of the site.
    pub fn failing_publish() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    /// Metadata responses come back without `latestUpdate`.
    pub fn without_latest_update() -> Self {
        Self {
            omit_latest_update: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<UrlNotification> {
        self.published
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn metadata_requests(&self) -> Vec<String> {
        self.metadata_requests
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn metadata_count(&self) -> usize {
        self.metadata_requests
            .lock()
            .map(|calls| calls.len())
            .unwrap_or(0)
    }

    fn record<T>(calls: &Mutex<Vec<T>>, value: T) {
        if let Ok(mut calls) = calls.lock() {
            calls.push(value);
        }
    }

    fn last_update_for(&self, url: &str) -> Option<NotificationEntry> {
        let published = self.published.lock().ok()?;
        published
            .iter()
            .rev()
            .find(|n| n.url == url)
            .map(|n| NotificationEntry {
                url: n.url.clone(),
                notification_type: n.notification_type,
                notify_time: Some(Utc::now()),
            })
    }
}

#[async_trait]
impl IndexingApi for MockIndexingClient {
    async fn publish(
        &self,
        notification: &UrlNotification,
    ) -> Result<UrlNotificationMetadata, IndexingError> {
        Self::record(&self.published, notification.clone());

        if self.fail_publish {
            return Err(IndexingError::Api {
                status: 403,
                message: "Permission denied. Failed to verify the URL ownership.".to_string(),
            });
        }

        tracing::info!(
            url = %notification.url,
            notification_type = %notification.notification_type,
            "[MOCK] URL notification would be published"
        );

        Ok(UrlNotificationMetadata {
            url: notification.url.clone(),
            latest_update: self.last_update_for(&notification.url),
            latest_remove: None,
        })
    }

    async fn get_metadata(&self, url: &str) -> Result<UrlNotificationMetadata, IndexingError> {
        Self::record(&self.metadata_requests, url.to_string());

        let latest_update = if self.omit_latest_update {
            None
        } else {
            self.last_update_for(url)
        };

        Ok(UrlNotificationMetadata {
            url: url.to_string(),
            latest_update,
            latest_remove: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
