//! Cloudflare API capability and its reqwest-backed client.
//!
//! Tools talk to Cloudflare through [`CloudflareApi`] only, so the tool
//! layer can be exercised against a mock and the transport can be swapped
//! for the [`crate::direct`] fallback.

use std::future::Future;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::config::ApiToken;

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from Cloudflare API operations.
#[derive(Debug, thiserror::Error)]
pub enum CloudflareError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON in Cloudflare API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty response from Cloudflare API")]
    EmptyResponse,

    #[error("API token cannot be used in an Authorization header")]
    InvalidToken,

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = std::result::Result<T, CloudflareError>;

// ── Wire types ──────────────────────────────────────────────────────

/// One `{code, message}` entry of a Cloudflare response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// The `{success, result, errors, messages}` envelope every v4 endpoint returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<ApiMessage>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<ApiMessage>,
}

/// Cloudflare sends `null` for empty message lists on some endpoints.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ApiMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ApiMessage>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Envelope {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            ..Self::default()
        }
    }

    pub fn failed(errors: Vec<ApiMessage>) -> Self {
        Self {
            success: false,
            errors,
            ..Self::default()
        }
    }

    /// Every error as `code: message`, joined by `, `.
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "Unknown error".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Decode a response body, rejecting an empty one.
pub(crate) fn parse_envelope(body: &[u8]) -> ApiResult<Envelope> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CloudflareError::EmptyResponse);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Optional filters for `GET /zones`, forwarded as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneFilters {
    pub name: Option<String>,
    pub status: Option<String>,
    pub page: Option<Number>,
    pub per_page: Option<Number>,
    pub order: Option<String>,
    pub direction: Option<String>,
    pub match_: Option<String>,
}

impl ZoneFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Filters as `(key, value)` query pairs, in declaration order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let fields = [
            ("name", self.name.clone()),
            ("status", self.status.clone()),
            ("page", self.page.as_ref().map(Number::to_string)),
            ("per_page", self.per_page.as_ref().map(Number::to_string)),
            ("order", self.order.clone()),
            ("direction", self.direction.clone()),
            ("match", self.match_.clone()),
        ];
        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

/// `Bearer <token>`, flagged sensitive so it never shows up in debug output.
pub(crate) fn bearer_header(token: &ApiToken) -> ApiResult<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
        .map_err(|_| CloudflareError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

// ── Capability ──────────────────────────────────────────────────────

/// The three Cloudflare operations the tools depend on.
///
/// Implementations return the decoded envelope even when `success` is
/// false; only transport and decoding failures are errors.
pub trait CloudflareApi: Send + Sync + 'static {
    fn list_zones(&self, filters: &ZoneFilters) -> impl Future<Output = ApiResult<Envelope>> + Send;

    fn list_load_balancers(&self, zone_id: &str) -> impl Future<Output = ApiResult<Envelope>> + Send;

    fn verify_token(&self) -> impl Future<Output = ApiResult<Envelope>> + Send;
}

// ── Client ──────────────────────────────────────────────────────────

/// A minimal Cloudflare v4 API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client that sends `token` as a bearer credential on every request.
    pub fn new(token: &ApiToken, base_url: &str) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer_header(token)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("cloudflare-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<Q: Serialize + Sync + ?Sized>(&self, path: &str, query: Option<&Q>) -> ApiResult<Envelope> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("Response status {} ({} bytes)", status, body.len());

        // Cloudflare reports failures in the envelope, whatever the status.
        parse_envelope(&body)
    }
}

impl CloudflareApi for ApiClient {
    async fn list_zones(&self, filters: &ZoneFilters) -> ApiResult<Envelope> {
        self.get("/zones", Some(&filters.query_pairs())).await
    }

    async fn list_load_balancers(&self, zone_id: &str) -> ApiResult<Envelope> {
        self.get::<()>(&format!("/zones/{}/load_balancers", zone_id), None)
            .await
    }

    async fn verify_token(&self) -> ApiResult<Envelope> {
        self.get::<()>("/user/tokens/verify", None).await
    }
}

// ── MockCloudflare for testing ──────────────────────────────────────


// ── Tests ───────────────────────────────────────────────────────────
