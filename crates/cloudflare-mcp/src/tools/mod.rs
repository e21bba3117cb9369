//! Cloudflare tools exposed over MCP.
//!
//! Arguments are validated against the registry by the dispatcher, then
//! parsed once into a [`CloudflareCall`] so each handler gets typed input.

pub mod load_balancers;
pub mod token;
pub mod zones;

use mcp_adapter::{
    CallToolResult, FieldType, InputSchema, RegistryError, ToolDescriptor, ToolError, ToolRegistry, ToolSet,
};
use serde_json::{Map, Value};

use crate::client::{CloudflareApi, ZoneFilters};
use crate::config::ApiToken;
use load_balancers::LoadBalancerQuery;

pub const LIST_LOAD_BALANCERS: &str = "list_load_balancers";
pub const GET_TOKEN: &str = "get_token";
pub const VERIFY_TOKEN: &str = "verify_token";
pub const LIST_ZONES: &str = "list_zones";

/// Tool declarations, in the order `tools/list` reports them.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            LIST_LOAD_BALANCERS,
            "List Cloudflare load balancers for a specific zone. REQUIRES at least one of: load_balancer_id, load_balancer_name, or limit (with a value > 0) to prevent generating too large of a response. Use offset with limit for pagination.",
            InputSchema::new()
                .string("zone_id", "The ID of the zone to list load balancers for")
                .string("load_balancer_id", "ID of a specific load balancer to retrieve")
                .string("load_balancer_name", "Name of a specific load balancer to retrieve")
                .number(
                    "limit",
                    "Maximum number of load balancers to return (REQUIRED if load_balancer_id or load_balancer_name not provided)",
                )
                .number("offset", "Number of load balancers to skip (for pagination, works with limit)")
                .array_of(
                    "fields",
                    FieldType::String,
                    "Array of field names to include in the response (default: all fields)",
                )
                .required("zone_id"),
        ),
        ToolDescriptor::new(
            GET_TOKEN,
            "Get information about the Cloudflare API token being used",
            InputSchema::new(),
        ),
        ToolDescriptor::new(
            VERIFY_TOKEN,
            "Verify the Cloudflare API token with Cloudflare and report its status, ID and permissions",
            InputSchema::new(),
        ),
        ToolDescriptor::new(
            LIST_ZONES,
            "List Cloudflare zones in your account",
            InputSchema::new()
                .string("name", "Filter by zone name")
                .string("status", "Filter by zone status")
                .number("page", "Page number of paginated results")
                .number("per_page", "Number of zones per page")
                .string("order", "Field to order zones by")
                .string("direction", "Direction to order zones")
                .string("match", "Whether to match all search requirements or at least one"),
        ),
    ]
}

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CloudflareCall {
    ListZones(ZoneFilters),
    ListLoadBalancers(LoadBalancerQuery),
    GetToken,
    VerifyToken,
}

impl CloudflareCall {
    pub fn parse(name: &str, args: &Map<String, Value>) -> Result<Self, ToolError> {
        match name {
            LIST_ZONES => Ok(Self::ListZones(zones::filters_from_args(args))),
            LIST_LOAD_BALANCERS => Ok(Self::ListLoadBalancers(LoadBalancerQuery::from_args(args)?)),
            GET_TOKEN => Ok(Self::GetToken),
            VERIFY_TOKEN => Ok(Self::VerifyToken),
            _ => Err(ToolError::MethodNotFound(format!("Unknown tool: {}", name))),
        }
    }
}

/// The Cloudflare tool set, bound to one API capability and credential.
pub struct CloudflareTools<C> {
    api: C,
    token: ApiToken,
    registry: ToolRegistry,
}

impl<C: CloudflareApi> CloudflareTools<C> {
    pub fn new(api: C, token: ApiToken) -> Result<Self, RegistryError> {
        Ok(Self {
            api,
            token,
            registry: ToolRegistry::new(tool_descriptors())?,
        })
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    pub async fn execute(&self, call: CloudflareCall) -> Result<CallToolResult, ToolError> {
        match call {
            CloudflareCall::ListZones(filters) => zones::list_zones(&self.api, &filters).await,
            CloudflareCall::ListLoadBalancers(query) => load_balancers::list_load_balancers(&self.api, &query).await,
            CloudflareCall::GetToken => token::get_token(&self.token),
            CloudflareCall::VerifyToken => token::verify_token(&self.api).await,
        }
    }
}

impl<C: CloudflareApi> ToolSet for CloudflareTools<C> {
    fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    async fn call(&self, name: &str, arguments: Map<String, Value>) -> Result<CallToolResult, ToolError> {
        let call = CloudflareCall::parse(name, &arguments)?;
        self.execute(call).await
    }
}
