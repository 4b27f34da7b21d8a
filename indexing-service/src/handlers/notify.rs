use crate::services::{notify_new_article, record_notification};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use service_core::error::AppError;

/// Webhook entry point. The body is read as raw bytes so that anything
/// unparseable falls through to the rejection message instead of a 4xx.
pub async fn notify(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let outcome = notify_new_article(state.indexing.as_ref(), &body)
        .await
        .map_err(|e| {
            record_notification("failed");
            tracing::error!(error = %e, provider = state.indexing.name(), "Failed to notify indexing API");
            AppError::from(e)
        })?;

    record_notification(outcome.label());

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        outcome.message(),
    ))
}
