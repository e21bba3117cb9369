//! Hello World MCP Server - Entry Point

use anyhow::Result;
use argh::FromArgs;
use log::info;

/// Hello World MCP Server - a single greeting tool over stdio
#[derive(FromArgs)]
struct Args {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _args: Args = argh::from_env();

    // Initialize logging to stderr (stdout is used for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("Starting Hello World MCP server");

    let server = hello_world_mcp::build_server()?;
    server.run_stdio().await?;

    Ok(())
}
