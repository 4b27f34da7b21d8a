//! A stand-in for Google's OAuth token endpoint and the Indexing API,
//! served by axum on a random local port.

use axum::{
    body::Bytes,
    extract::{Form, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use indexing_service::config::GoogleConfig;
use indexing_service::services::credentials::AssertionClaims;
use indexing_service::services::ServiceAccountKey;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/test_private_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/test_public_key.pem");
pub const ACCESS_TOKEN: &str = "ya29.fake-access-token";
pub const CLIENT_EMAIL: &str = "indexer@blog-indexing.iam.gserviceaccount.com";

#[derive(Default)]
pub struct FakeGoogleState {
    pub token_uri: String,
    pub token_requests: AtomicUsize,
    pub assertion_claims: Mutex<Vec<AssertionClaims>>,
    pub published: Mutex<Vec<Value>>,
    pub metadata_queries: Mutex<Vec<String>>,
    pub reject_tokens: AtomicBool,
    pub stall_tokens: AtomicBool,
    pub deny_publish: AtomicBool,
}

pub struct FakeGoogle {
    pub base_url: String,
    pub state: Arc<FakeGoogleState>,
}

impl FakeGoogle {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Google listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(FakeGoogleState {
            token_uri: format!("{}/token", base_url),
            ..Default::default()
        });

        let router = Router::new()
            .route("/token", post(token))
            .fallback(indexing_api)
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self { base_url, state }
    }

    pub fn service_account_key(&self) -> ServiceAccountKey {
        let json = json!({
            "type": "service_account",
            "project_id": "blog-indexing",
            "private_key_id": "test-key-id",
            "private_key": PRIVATE_KEY,
            "client_email": CLIENT_EMAIL,
            "token_uri": self.state.token_uri,
        });
        ServiceAccountKey::from_json(&json.to_string()).expect("fixture key should parse")
    }

    pub fn google_config(&self) -> GoogleConfig {
        GoogleConfig {
            enabled: true,
            credentials: Some(self.service_account_key()),
            api_base_url: format!("{}/v3", self.base_url),
            request_timeout_secs: Some(5),
        }
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<Value> {
        self.state.published.lock().unwrap().clone()
    }

    pub fn metadata_queries(&self) -> Vec<String> {
        self.state.metadata_queries.lock().unwrap().clone()
    }
}

async fn token(
    State(state): State<Arc<FakeGoogleState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    if state.stall_tokens.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }

    if state.reject_tokens.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid JWT Signature." })),
        )
            .into_response();
    }

    if form.get("grant_type").map(String::as_str)
        != Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[state.token_uri.as_str()]);
    let decoding_key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();

    let claims = match form
        .get("assertion")
        .map(|assertion| decode::<AssertionClaims>(assertion, &decoding_key, &validation))
    {
        Some(Ok(data)) => data.claims,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_grant", "error_description": "Bad assertion" })),
            )
                .into_response();
        }
    };
    state.assertion_claims.lock().unwrap().push(claims);

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "expires_in": 3599,
        "token_type": "Bearer"
    }))
    .into_response()
}

fn google_error(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": code }
        })),
    )
        .into_response()
}

fn metadata_for(url: &str) -> Value {
    json!({
        "url": url,
        "latestUpdate": {
            "url": url,
            "type": "URL_UPDATED",
            "notifyTime": "2024-05-01T12:00:00.500Z"
        }
    })
}

async fn indexing_api(
    State(state): State<Arc<FakeGoogleState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let expected = format!("Bearer {}", ACCESS_TOKEN);
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return google_error(
            StatusCode::UNAUTHORIZED,
            "Request had invalid authentication credentials.",
            "UNAUTHENTICATED",
        );
    }

    match (method, uri.path()) {
        (Method::POST, "/v3/urlNotifications:publish") => {
            let notification: Value = match serde_json::from_slice(&body) {
                Ok(value) => value,
                Err(_) => {
                    return google_error(StatusCode::BAD_REQUEST, "Invalid JSON", "INVALID_ARGUMENT")
                }
            };
            state.published.lock().unwrap().push(notification.clone());

            if state.deny_publish.load(Ordering::SeqCst) {
                return google_error(
                    StatusCode::FORBIDDEN,
                    "Permission denied. Failed to verify the URL ownership.",
                    "PERMISSION_DENIED",
                );
            }

            let url = notification["url"].as_str().unwrap_or_default().to_string();
            Json(json!({ "urlNotificationMetadata": metadata_for(&url) })).into_response()
        }
        (Method::GET, "/v3/urlNotifications/metadata") => {
            let url = query.get("url").cloned().unwrap_or_default();
            state.metadata_queries.lock().unwrap().push(url.clone());
            Json(metadata_for(&url)).into_response()
        }
        _ => google_error(StatusCode::NOT_FOUND, "Not found", "NOT_FOUND"),
    }
}
