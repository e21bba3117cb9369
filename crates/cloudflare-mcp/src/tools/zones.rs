//! `list_zones`: forward filters to `GET /zones` and return the result list.

use log::{debug, info};
use mcp_adapter::{CallToolResult, ToolError};
use serde_json::{Map, Number, Value};

use crate::client::{CloudflareApi, ZoneFilters};

/// Build zone filters from validated arguments.
///
/// Empty strings and zero page numbers are treated as not given. Other
/// numbers go to Cloudflare as written.
pub fn filters_from_args(args: &Map<String, Value>) -> ZoneFilters {
    ZoneFilters {
        name: non_empty_string(args, "name"),
        status: non_empty_string(args, "status"),
        page: non_zero_number(args, "page"),
        per_page: non_zero_number(args, "per_page"),
        order: non_empty_string(args, "order"),
        direction: non_empty_string(args, "direction"),
        match_: non_empty_string(args, "match"),
    }
}

fn non_empty_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_zero_number(args: &Map<String, Value>, key: &str) -> Option<Number> {
    match args.get(key) {
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.clone()),
        _ => None,
    }
}

pub async fn list_zones<C: CloudflareApi>(api: &C, filters: &ZoneFilters) -> Result<CallToolResult, ToolError> {
    info!("Listing zones...");
    debug!("Calling Cloudflare API to list zones with params: {:?}", filters);

    let envelope = api
        .list_zones(filters)
        .await
        .map_err(|e| ToolError::internal(format!("Failed to list zones: {}", e)))?;

    if !envelope.success {
        return Err(ToolError::internal(format!(
            "Failed to list zones: {}",
            envelope.error_summary()
        )));
    }

    CallToolResult::json(&envelope.result.unwrap_or_else(|| Value::Array(Vec::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockCloudflare;
    use crate::client::{ApiMessage, Envelope};
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_filters_forwarded_verbatim() {
        let filters = filters_from_args(&args(json!({
            "name": "example.com",
            "status": "active",
            "page": 2,
            "per_page": 50,
            "order": "name",
            "direction": "desc",
            "match": "all",
            "unrelated": true
        })));
        assert_eq!(
            filters,
            ZoneFilters {
                name: Some("example.com".to_string()),
                status: Some("active".to_string()),
                page: Some(Number::from(2)),
                per_page: Some(Number::from(50)),
                order: Some("name".to_string()),
                direction: Some("desc".to_string()),
                match_: Some("all".to_string()),
            }
        );
    }

    #[test]
    fn test_falsy_filters_dropped() {
        let filters = filters_from_args(&args(json!({"name": "", "page": 0, "per_page": 0.0})));
        assert!(filters.is_empty());
    }

    #[test]
    fn test_unusual_page_numbers_forwarded_as_written() {
        let filters = filters_from_args(&args(json!({"page": -1, "per_page": 2.5})));
        assert_eq!(
            filters.query_pairs(),
            vec![("page", "-1".to_string()), ("per_page", "2.5".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_filters_forwards_empty_and_returns_result_unchanged() {
        let zones = json!([
            {"id": "z1", "name": "example.com", "status": "active"},
            {"id": "z2", "name": "example.org", "status": "pending"}
        ]);
        let mock = MockCloudflare {
            zones: Some(Envelope::ok(zones.clone())),
            ..MockCloudflare::new()
        };

        let filters = filters_from_args(&Map::new());
        let result = list_zones(&mock, &filters).await.unwrap();

        let forwarded = mock.zone_filters.lock().unwrap().clone().unwrap();
        assert!(forwarded.is_empty());
        assert_eq!(result.joined_text(), serde_json::to_string_pretty(&zones).unwrap());
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let mock = MockCloudflare {
            zones: Some(Envelope::failed(vec![
                ApiMessage { code: 1003, message: "bad zone".to_string() },
                ApiMessage { code: 6003, message: "Invalid request headers".to_string() },
            ])),
            ..MockCloudflare::new()
        };
        let err = list_zones(&mock, &ZoneFilters::default()).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::internal("Failed to list zones: 1003: bad zone, 6003: Invalid request headers")
        );
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let mock = MockCloudflare {
            zones: None,
            ..MockCloudflare::new()
        };
        let err = list_zones(&mock, &ZoneFilters::default()).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::internal("Failed to list zones: Empty response from Cloudflare API")
        );
    }
}
