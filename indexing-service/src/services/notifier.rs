//! Turns one webhook body into one `URL_UPDATED` notification.

use super::indexing::{IndexingApi, IndexingError};
use crate::models::{NotificationRequest, UrlNotification, UrlNotificationMetadata};

pub const REJECTION_MESSAGE: &str = "no article should be indexed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The title did not announce an article; nothing was sent.
    Rejected,
    /// Google accepted the notification for `url`.
    Submitted {
        url: String,
        metadata: UrlNotificationMetadata,
    },
}

impl NotifyOutcome {
    pub fn message(&self) -> String {
        match self {
            NotifyOutcome::Rejected => REJECTION_MESSAGE.to_string(),
            NotifyOutcome::Submitted { url, .. } => format!(
                "Success send request to notify Google of new article, url: {}",
                url
            ),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotifyOutcome::Rejected => "rejected",
            NotifyOutcome::Submitted { .. } => "submitted",
        }
    }
}

/// Publish then read back metadata, strictly in that order. Both calls
/// are attempted once.
pub async fn notify_new_article(
    api: &dyn IndexingApi,
    body: &[u8],
) -> Result<NotifyOutcome, IndexingError> {
    let request = NotificationRequest::from_body(body);

    let Some(full_url) = request.article_url() else {
        tracing::info!(title = %request.payload.title, "Title does not announce a new article");
        return Ok(NotifyOutcome::Rejected);
    };

    let notification = UrlNotification::updated(full_url.clone());
    api.publish(&notification).await?;

    // Google does not promise the metadata reflects the publish above, so
    // it is only logged.
    let metadata = api.get_metadata(&full_url).await?;
    let latest = metadata
        .latest_update
        .as_ref()
        .ok_or_else(|| IndexingError::MissingMetadata(full_url.clone()))?;

    tracing::info!(
        notify_time = ?latest.notify_time,
        notification_type = %latest.notification_type,
        url = %latest.url,
        provider = api.name(),
        "Indexing notification submitted"
    );

    Ok(NotifyOutcome::Submitted {
        url: full_url,
        metadata,
    })
}
