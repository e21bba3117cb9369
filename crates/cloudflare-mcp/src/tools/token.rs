//! Token tools: a local masked view of the configured token, and a remote
//! verification through Cloudflare.

use log::{debug, info};
use mcp_adapter::{CallToolResult, ToolError};
use serde::Serialize;
use serde_json::Value;

use crate::client::CloudflareApi;
use crate::config::ApiToken;

#[derive(Debug, Serialize)]
struct TokenInfo {
    message: &'static str,
    token_length: usize,
    masked_token: String,
}

#[derive(Debug, PartialEq, Serialize)]
struct TokenStatus {
    status: Value,
    id: Value,
    permissions: Value,
}

/// `get_token`: length and masked form of the configured token. No remote call.
pub fn get_token(token: &ApiToken) -> Result<CallToolResult, ToolError> {
    if token.is_empty() {
        return Err(ToolError::internal("Cloudflare API token not configured"));
    }
    CallToolResult::json(&TokenInfo {
        message: "API token retrieved successfully",
        token_length: token.len(),
        masked_token: token.masked(),
    })
}

/// Field value, or `default` when absent, null, false or an empty string.
fn or_default(result: &Value, key: &str, default: Value) -> Value {
    match result.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => default,
        Some(Value::String(s)) if s.is_empty() => default,
        Some(value) => value.clone(),
    }
}

/// `verify_token`: ask Cloudflare whether the token is valid.
pub async fn verify_token<C: CloudflareApi>(api: &C) -> Result<CallToolResult, ToolError> {
    info!("Verifying API token...");

    let envelope = api
        .verify_token()
        .await
        .map_err(|e| ToolError::internal(format!("Failed to verify API token: {}", e)))?;
    debug!("Verification envelope success={}", envelope.success);

    if !envelope.success {
        return Err(ToolError::internal(format!(
            "API token verification failed: {}",
            envelope.error_summary()
        )));
    }

    let result = envelope
        .result
        .ok_or_else(|| ToolError::internal("Missing result in Cloudflare API response"))?;

    CallToolResult::json(&TokenStatus {
        status: or_default(&result, "status", Value::from("unknown")),
        id: or_default(&result, "id", Value::from("unknown")),
        permissions: or_default(&result, "permissions", Value::Array(Vec::new())),
    })
}
