//! Hello World MCP Server
//!
//! The smallest useful adapter: one `hello_world` tool with a canned reply.

use log::info;
use mcp_adapter::{
    CallToolResult, InputSchema, McpServer, RegistryError, ServerInfo, ToolDescriptor, ToolError, ToolRegistry,
    ToolSet,
};
use serde_json::{Map, Value};

/// Server name
pub const SERVER_NAME: &str = "hello-world-mcp";

/// Server version
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELLO_WORLD: &str = "hello_world";

pub fn greeting(name: &str) -> String {
    format!("Hello, {}! Welcome to the MCP world.", name)
}

pub struct HelloTools {
    registry: ToolRegistry,
}

impl HelloTools {
    pub fn new() -> Result<Self, RegistryError> {
        let registry = ToolRegistry::new(vec![ToolDescriptor::new(
            HELLO_WORLD,
            "Returns a greeting message",
            InputSchema::new().string("name", "Name to greet").required("name"),
        )])?;
        Ok(Self { registry })
    }
}

impl ToolSet for HelloTools {
    fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    async fn call(&self, name: &str, arguments: Map<String, Value>) -> Result<CallToolResult, ToolError> {
        match (name, arguments.get("name").and_then(Value::as_str)) {
            (HELLO_WORLD, Some(who)) => {
                info!("Greeting {}", who);
                Ok(CallToolResult::text(greeting(who)))
            }
            (HELLO_WORLD, None) => Err(ToolError::invalid_params(
                "Invalid arguments: expected { name: string }",
            )),
            _ => Err(ToolError::MethodNotFound(format!("Unknown tool: {}", name))),
        }
    }
}

pub fn build_server() -> Result<McpServer<HelloTools>, RegistryError> {
    Ok(McpServer::new(
        ServerInfo::new(SERVER_NAME, SERVER_VERSION),
        HelloTools::new()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_adapter::Dispatcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_hello_world_greets() {
        let dispatcher = Dispatcher::new(HelloTools::new().unwrap());
        let result = dispatcher.dispatch(HELLO_WORLD, &json!({"name": "Ada"})).await.unwrap();
        assert_eq!(result.joined_text(), "Hello, Ada! Welcome to the MCP world.");
    }

    #[tokio::test]
    async fn test_hello_world_requires_string_name() {
        let dispatcher = Dispatcher::new(HelloTools::new().unwrap());
        for args in [json!({}), json!({"name": 42}), json!(null)] {
            let err = dispatcher.dispatch(HELLO_WORLD, &args).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidParams(_)), "args: {}", args);
        }
    }

    #[tokio::test]
    async fn test_other_names_not_found() {
        let dispatcher = Dispatcher::new(HelloTools::new().unwrap());
        let err = dispatcher.dispatch("goodbye", &json!({"name": "Ada"})).await.unwrap_err();
        assert_eq!(err, ToolError::MethodNotFound("Unknown tool: goodbye".to_string()));
    }

    #[tokio::test]
    async fn test_stdio_round() {
        let server = build_server().unwrap();
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"hello_world\",\"arguments\":{\"name\":\"MCP\"}}}\n",
        );
        let mut output = Vec::new();
        server.run(input.as_bytes(), &mut output).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses[0]["result"]["tools"][0]["name"], "hello_world");
        assert_eq!(
            responses[0]["result"]["tools"][0]["inputSchema"]["properties"]["name"]["type"],
            "string"
        );
        assert_eq!(
            responses[1]["result"]["content"][0]["text"],
            "Hello, MCP! Welcome to the MCP world."
        );
    }
}
