use super::{IndexingApi, IndexingError};
use crate::config::GoogleConfig;
use crate::models::{UrlNotification, UrlNotificationMetadata};
use crate::services::credentials::{AccessTokenProvider, DEFAULT_TOKEN_TIMEOUT};
use crate::services::metrics::record_api_call;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const INDEXING_API_URL: &str = "https://indexing.googleapis.com/v3";

/// Client for the Google Indexing API, authenticated as a service account.
pub struct GoogleIndexingClient {
    client: Client,
    api_base_url: String,
    tokens: AccessTokenProvider,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    url_notification_metadata: UrlNotificationMetadata,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleIndexingClient {
    pub fn new(config: &GoogleConfig) -> Result<Self, IndexingError> {
        let credentials = config.credentials.as_ref().ok_or_else(|| {
            IndexingError::Credentials("GOOGLE_APPLICATION_CREDENTIALS is not configured".to_string())
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| IndexingError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        let tokens = AccessTokenProvider::new(
            credentials,
            client.clone(),
            config.request_timeout().unwrap_or(DEFAULT_TOKEN_TIMEOUT),
        )?;

        tracing::info!(
            client_email = %credentials.client_email,
            api_base_url = %config.api_base_url,
            "Google Indexing API client initialized"
        );

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, IndexingError> {
        let result = self.send(request).await;
        record_api_call(operation, if result.is_ok() { "ok" } else { "error" });
        result
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, IndexingError> {
        let access_token = self.tokens.access_token().await?;

        let response = request
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| {
                IndexingError::Connection(format!("Failed to connect to Indexing API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<GoogleErrorResponse>(&body) {
                Ok(parsed) => match parsed.error.status {
                    Some(code) => format!("{} ({})", parsed.error.message, code),
                    None => parsed.error.message,
                },
                Err(_) => body,
            };
            return Err(IndexingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            IndexingError::InvalidResponse(format!("Failed to parse Indexing API response: {}", e))
        })
    }
}

#[async_trait]
impl IndexingApi for GoogleIndexingClient {
    async fn publish(
        &self,
        notification: &UrlNotification,
    ) -> Result<UrlNotificationMetadata, IndexingError> {
        let url = format!("{}/urlNotifications:publish", self.api_base_url);
        let request = self.client.post(&url).json(notification);

        let response: PublishResponse = self.execute("publish", request).await?;

        tracing::debug!(
            url = %notification.url,
            notification_type = %notification.notification_type,
            "Published URL notification"
        );

        Ok(response.url_notification_metadata)
    }

    async fn get_metadata(&self, url: &str) -> Result<UrlNotificationMetadata, IndexingError> {
        let endpoint = format!("{}/urlNotifications/metadata", self.api_base_url);
        let request = self.client.get(&endpoint).query(&[("url", url)]);

        self.execute("get_metadata", request).await
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
