//! Direct REST fallback for the Cloudflare capability.
//!
//! Issues raw JSON requests against the base URL with the bearer token
//! attached per request. A response counts as successful only when the
//! HTTP status is 200 and the body says `"success": true`.

use log::{debug, info};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use crate::client::{bearer_header, ApiMessage, ApiResult, CloudflareApi, CloudflareError, Envelope, ZoneFilters};
use crate::config::ApiToken;

/// Status and decoded body of a direct request.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectResponse {
    pub status: u16,
    pub data: Value,
}

impl DirectResponse {
    /// Fold the HTTP status into the Cloudflare envelope.
    pub fn into_envelope(self) -> ApiResult<Envelope> {
        let mut envelope: Envelope = serde_json::from_value(self.data)?;
        if self.status != 200 {
            envelope.success = false;
            if envelope.errors.is_empty() {
                envelope.errors.push(ApiMessage {
                    code: i64::from(self.status),
                    message: format!("HTTP status {}", self.status),
                });
            }
        }
        Ok(envelope)
    }
}

#[derive(Debug, Clone)]
pub struct DirectRequest {
    client: reqwest::Client,
    token: ApiToken,
    base_url: String,
}

impl DirectRequest {
    pub fn new(token: ApiToken, base_url: &str) -> ApiResult<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a request to `endpoint` (path relative to the base URL).
    pub async fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> ApiResult<DirectResponse> {
        let url = reqwest::Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| CloudflareError::InvalidUrl(e.to_string()))?;
        self.send(method, url, body).await
    }

    async fn send(&self, method: Method, url: reqwest::Url, body: Option<&Value>) -> ApiResult<DirectResponse> {
        info!("Making {} request to {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, bearer_header(&self.token)?)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CloudflareError::EmptyResponse);
        }
        let data: Value = serde_json::from_slice(&bytes)?;
        debug!("Response status: {}", status);
        debug!("Response data: {}", data);

        Ok(DirectResponse { status, data })
    }
}

impl CloudflareApi for DirectRequest {
    async fn list_zones(&self, filters: &ZoneFilters) -> ApiResult<Envelope> {
        let mut url = reqwest::Url::parse(&format!("{}/zones", self.base_url))
            .map_err(|e| CloudflareError::InvalidUrl(e.to_string()))?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.send(Method::GET, url, None).await?.into_envelope()
    }

    async fn list_load_balancers(&self, zone_id: &str) -> ApiResult<Envelope> {
        let response = self
            .request(Method::GET, &format!("/zones/{}/load_balancers", zone_id), None)
            .await?;
        response.into_envelope()
    }

    async fn verify_token(&self) -> ApiResult<Envelope> {
        let response = self.request(Method::GET, "/user/tokens/verify", None).await?;
        response.into_envelope()
    }
}
