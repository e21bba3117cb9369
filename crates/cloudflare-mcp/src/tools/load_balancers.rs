//! `list_load_balancers`: fetch a zone's load balancers, then select and
//! project locally so only a bounded slice is serialized into the response.

use log::{debug, info};
use mcp_adapter::{CallToolResult, ToolError};
use serde_json::{Map, Value};

use crate::client::CloudflareApi;

/// Which load balancers to return.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Id(String),
    Name(String),
    /// `offset` entries skipped, then at most `limit` taken.
    Page { offset: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancerQuery {
    pub zone_id: String,
    pub selector: Selector,
    /// Fields to keep on each result; empty keeps everything.
    pub fields: Vec<String>,
}

impl LoadBalancerQuery {
    /// Parse validated arguments, enforcing that the request is bounded.
    pub fn from_args(args: &Map<String, Value>) -> Result<Self, ToolError> {
        let zone_id = non_empty_string(args, "zone_id")
            .ok_or_else(|| ToolError::invalid_params("Missing required parameter: zone_id"))?;
        validate_zone_id(&zone_id)?;

        let id = non_empty_string(args, "load_balancer_id");
        let name = non_empty_string(args, "load_balancer_name");
        let limit = args.get("limit").and_then(Value::as_f64).filter(|l| *l > 0.0);

        let selector = match (id, name, limit) {
            (Some(id), _, _) => Selector::Id(id),
            (None, Some(name), _) => Selector::Name(name),
            (None, None, Some(limit)) => Selector::Page {
                offset: args
                    .get("offset")
                    .and_then(Value::as_f64)
                    .filter(|o| *o > 0.0)
                    .map_or(0, |o| o as usize),
                limit: limit as usize,
            },
            (None, None, None) => {
                return Err(ToolError::invalid_params(
                    "At least one of the following parameters is required: load_balancer_id, load_balancer_name, or limit (with a value > 0)",
                ))
            }
        };

        let fields = args
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            zone_id,
            selector,
            fields,
        })
    }
}

fn non_empty_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Zone IDs are interpolated into the request path.
fn validate_zone_id(zone_id: &str) -> Result<(), ToolError> {
    if zone_id
        .chars()
        .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(ToolError::invalid_params(format!(
            "Invalid zone_id '{}': must not contain '/', '?', '#', '%' or whitespace",
            zone_id
        )));
    }
    Ok(())
}

/// Keep only `fields` that exist on `item`. Missing fields are omitted.
pub fn project(item: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return item.clone();
    }
    let mut projected = Map::new();
    if let Some(object) = item.as_object() {
        for field in fields {
            if let Some(value) = object.get(field) {
                projected.insert(field.clone(), value.clone());
            }
        }
    }
    Value::Object(projected)
}

fn find_by<'a>(items: &'a [Value], key: &str, wanted: &str) -> Option<&'a Value> {
    items
        .iter()
        .find(|item| item.get(key).and_then(Value::as_str) == Some(wanted))
}

/// Apply the selector and projection to a fetched list.
pub fn select(items: &[Value], query: &LoadBalancerQuery) -> Result<Value, ToolError> {
    match &query.selector {
        Selector::Id(id) => find_by(items, "id", id)
            .map(|lb| project(lb, &query.fields))
            .ok_or_else(|| ToolError::invalid_params(format!("Load balancer with ID {} not found", id))),
        Selector::Name(name) => find_by(items, "name", name)
            .map(|lb| project(lb, &query.fields))
            .ok_or_else(|| ToolError::invalid_params(format!("Load balancer with name {} not found", name))),
        Selector::Page { offset, limit } => Ok(Value::Array(
            items
                .iter()
                .skip(*offset)
                .take(*limit)
                .map(|lb| project(lb, &query.fields))
                .collect(),
        )),
    }
}

pub async fn list_load_balancers<C: CloudflareApi>(
    api: &C,
    query: &LoadBalancerQuery,
) -> Result<CallToolResult, ToolError> {
    info!("Listing load balancers for zone ID: {}", query.zone_id);

    let envelope = api
        .list_load_balancers(&query.zone_id)
        .await
        .map_err(|e| ToolError::internal(format!("Failed to list load balancers: {}", e)))?;

    if !envelope.success {
        return Err(ToolError::internal(format!(
            "Failed to list load balancers: {}",
            envelope.error_summary()
        )));
    }

    let items = match envelope.result {
        Some(Value::Array(items)) => items,
        None => Vec::new(),
        Some(_) => {
            return Err(ToolError::internal(
                "Failed to list load balancers: unexpected response format",
            ))
        }
    };
    debug!("Fetched {} load balancer(s), selecting {:?}", items.len(), query.selector);

    CallToolResult::json(&select(&items, query)?)
}
