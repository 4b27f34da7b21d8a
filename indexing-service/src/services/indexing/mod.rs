pub mod google;
pub mod mock;

use crate::models::{UrlNotification, UrlNotificationMetadata};
use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

pub use google::{GoogleIndexingClient, INDEXING_API_URL};
pub use mock::MockIndexingClient;

#[derive(Debug, Error)]
pub enum IndexingError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Indexing API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No update recorded for {0}")]
    MissingMetadata(String),
}

impl From<IndexingError> for AppError {
    fn from(err: IndexingError) -> Self {
        match err {
            IndexingError::Credentials(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// The two `urlNotifications` operations the notifier needs.
#[async_trait]
pub trait IndexingApi: Send + Sync {
    /// Submit a notification. The returned metadata is Google's acknowledgement.
    async fn publish(
        &self,
        notification: &UrlNotification,
    ) -> Result<UrlNotificationMetadata, IndexingError>;

    /// Latest known notification state for `url`.
    async fn get_metadata(&self, url: &str) -> Result<UrlNotificationMetadata, IndexingError>;

    fn name(&self) -> &'static str;
}
