//! Cloudflare MCP Server - Entry Point
//!
//! Runs the MCP server over stdio for integration with Claude Desktop.

use anyhow::Result;
use argh::FromArgs;
use cloudflare_mcp::config::{API_TOKEN_ENV, DEFAULT_BASE_URL};
use cloudflare_mcp::{build_server, ApiClient, ApiToken, CloudflareApi, Config, DirectRequest, Transport};
use log::{error, info};

/// Cloudflare MCP Server - Expose Cloudflare zones, load balancers and API tokens to AI assistants
#[derive(FromArgs)]
struct Args {
    /// cloudflare API base URL (default: https://api.cloudflare.com/client/v4)
    #[argh(option, default = "String::from(DEFAULT_BASE_URL)")]
    base_url: String,

    /// how to reach Cloudflare: client or direct (default: client)
    #[argh(option, default = "Transport::Client")]
    transport: Transport,
}

async fn serve<C: CloudflareApi>(api: C, token: ApiToken) -> Result<()> {
    let server = build_server(api, token)?;
    server.run_stdio().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args: Args = argh::from_env();

    // Initialize logging to stderr (stdout is used for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match Config::from_env(&args.base_url, args.transport) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            error!("Please set {}", API_TOKEN_ENV);
            std::process::exit(1);
        }
    };

    info!("Starting Cloudflare MCP server");
    info!(
        "Initializing Cloudflare {} transport with API token (length: {} characters, {})",
        config.transport,
        config.api_token.len(),
        config.api_token.masked()
    );
    info!("Cloudflare API: {}", config.base_url);

    match config.transport {
        Transport::Client => {
            let api = ApiClient::new(&config.api_token, &config.base_url)?;
            serve(api, config.api_token).await
        }
        Transport::Direct => {
            let api = DirectRequest::new(config.api_token.clone(), &config.base_url)?;
            serve(api, config.api_token).await
        }
    }
}
