//! Cloudflare MCP Server
//!
//! Exposes a subset of the Cloudflare v4 API (zones, load balancers, API
//! token introspection) to AI assistants as MCP tools over stdio.

pub mod client;
pub mod config;
pub mod direct;
pub mod tools;

use mcp_adapter::{McpServer, RegistryError, ServerInfo};

pub use client::{ApiClient, CloudflareApi, CloudflareError, Envelope, ZoneFilters};
pub use config::{ApiToken, Config, ConfigError, Transport};
pub use direct::DirectRequest;
pub use tools::{CloudflareCall, CloudflareTools};

/// Server name
pub const SERVER_NAME: &str = "cloudflare-mcp";

/// Server version
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn server_info() -> ServerInfo {
    ServerInfo::new(SERVER_NAME, SERVER_VERSION).with_instructions(
        "Cloudflare MCP Server - read-only access to a Cloudflare account.\n\n\
         Available tools:\n\
         - list_zones: List zones, optionally filtered by name or status\n\
         - list_load_balancers: Load balancers of a zone (needs load_balancer_id, load_balancer_name or limit)\n\
         - get_token: Length and masked form of the configured API token\n\
         - verify_token: Check the API token with Cloudflare",
    )
}

/// Build the MCP server over any Cloudflare capability.
pub fn build_server<C: CloudflareApi>(api: C, token: ApiToken) -> Result<McpServer<CloudflareTools<C>>, RegistryError> {
    Ok(McpServer::new(server_info(), CloudflareTools::new(api, token)?))
}
