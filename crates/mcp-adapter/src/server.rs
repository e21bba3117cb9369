//! Line-delimited JSON-RPC server loop.
//!
//! Requests are handled strictly one at a time: a request, including any
//! remote call its tool makes, completes before the next line is read.

use log::{debug, error, info, warn};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::dispatch::{Dispatcher, ToolSet};
use crate::error::{codes, McpError, ToolError};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};

/// Identity reported in the `initialize` handshake.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
}

impl ServerInfo {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }
}

pub struct McpServer<S> {
    info: ServerInfo,
    dispatcher: Dispatcher<S>,
}

impl<S: ToolSet> McpServer<S> {
    pub fn new(info: ServerInfo, tools: S) -> Self {
        Self {
            info,
            dispatcher: Dispatcher::new(tools),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Value {
        let mut result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version
            }
        });
        if let Some(instructions) = &self.info.instructions {
            result["instructions"] = json!(instructions);
        }
        result
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Value {
        json!({
            "tools": self.dispatcher.list_operations()
        })
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, params: Value) -> Result<Value, ToolError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::invalid_params("Missing tool name"))?;

        let arguments = match params.get("arguments") {
            None => json!({}),
            Some(args) => args.clone(),
        };

        let result = self.dispatcher.dispatch(name, &arguments).await?;
        serde_json::to_value(result)
            .map_err(|e| ToolError::internal(format!("Failed to encode tool result: {}", e)))
    }

    /// Handle a single JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Handling request: {}", request.method);

        if request.id.is_none() {
            // Notifications never get a response.
            debug!("Notification: {}", request.method);
            return None;
        }

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                codes::INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ));
        }

        match request.method.as_str() {
            "initialize" => {
                let result = self.handle_initialize();
                Some(JsonRpcResponse::success(request.id, result))
            }
            "tools/list" => {
                let result = self.handle_tools_list();
                Some(JsonRpcResponse::success(request.id, result))
            }
            "tools/call" => match self.handle_tools_call(request.params).await {
                Ok(result) => Some(JsonRpcResponse::success(request.id, result)),
                Err(e) => Some(JsonRpcResponse::from_tool_error(request.id, &e)),
            },
            "ping" => Some(JsonRpcResponse::success(request.id, json!({}))),
            _ => {
                warn!("Unknown method: {}", request.method);
                Some(JsonRpcResponse::error(
                    request.id,
                    codes::METHOD_NOT_FOUND,
                    &format!("Method not found: {}", request.method),
                ))
            }
        }
    }

    /// Handle one parsed line. Well-formed JSON that is not a request gets
    /// -32600, echoing its `id` when it has one.
    async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("Invalid request: {}", e);
                Some(JsonRpcResponse::error(id, codes::INVALID_REQUEST, "Invalid Request"))
            }
        }
    }

    /// Serve newline-delimited requests from `reader` until EOF.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            let response = match serde_json::from_str::<Value>(&line) {
                Ok(message) => self.handle_message(message).await,
                Err(e) => {
                    error!("Failed to parse request: {}", e);
                    Some(JsonRpcResponse::error(None, codes::PARSE_ERROR, "Parse error"))
                }
            };

            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                debug!("Sending: {}", response_json);
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Run the MCP server over stdio
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        info!("{} ready, listening on stdio...", self.info.name);
        self.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_tools::CountingTools;

    fn server() -> McpServer<CountingTools> {
        McpServer::new(
            ServerInfo::new("test-server", "0.0.1").with_instructions("Use echo."),
            CountingTools::new(),
        )
    }

    async fn exchange(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server().run(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(id)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let resp = server().handle_request(request(1, "initialize", json!({}))).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert_eq!(result["instructions"], "Use echo.");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_returns_registry() {
        let resp = server().handle_request(request(2, "tools/list", Value::Null)).await.unwrap();
        let tools = resp.result.unwrap()["tools"].clone();
        assert_eq!(tools.as_array().unwrap().len(), 3);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["text"]));
    }

    #[tokio::test]
    async fn test_tools_call_success_envelope() {
        let params = json!({"name": "echo", "arguments": {"text": "hello"}});
        let resp = server().handle_request(request(3, "tools/call", params)).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "hello");
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_method_not_found() {
        let params = json!({"name": "missing", "arguments": {}});
        let resp = server().handle_request(request(4, "tools/call", params)).await.unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, codes::METHOD_NOT_FOUND);
        assert_eq!(error.message, "Unknown tool: missing");
    }

    #[tokio::test]
    async fn test_tools_call_missing_arguments_defaults_to_empty_object() {
        let params = json!({"name": "fail"});
        let resp = server().handle_request(request(5, "tools/call", params)).await.unwrap();
        assert_eq!(resp.error.unwrap().message, "bad input");
    }

    #[tokio::test]
    async fn test_tools_call_null_arguments_rejected() {
        let params = json!({"name": "echo", "arguments": null});
        let resp = server().handle_request(request(6, "tools/call", params)).await.unwrap();
        assert_eq!(resp.error.unwrap().code, codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_missing_name() {
        let resp = server().handle_request(request(7, "tools/call", json!({}))).await.unwrap();
        assert_eq!(resp.error.unwrap().code, codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let req = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: "notifications/initialized".to_string(),
            params: Value::Null,
        };
        assert!(server().handle_request(req).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let resp = server().handle_request(request(8, "resources/list", Value::Null)).await.unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, codes::METHOD_NOT_FOUND);
        assert_eq!(error.message, "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut req = request(9, "ping", Value::Null);
        req.jsonrpc = "1.0".to_string();
        let resp = server().handle_request(req).await.unwrap();
        assert_eq!(resp.error.unwrap().code, codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_run_handles_lines_in_order() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "not json\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"echo\",\"arguments\":{\"text\":\"x\"}}}\n",
        );
        let responses = exchange(input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], codes::PARSE_ERROR);
        assert_eq!(responses[2]["id"], 2);
        assert_eq!(responses[2]["result"]["content"][0]["text"], "x");
    }

    #[tokio::test]
    async fn test_run_null_id_and_malformed_requests() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":7}\n",
            "[1, 2]\n",
        );
        let responses = exchange(input).await;
        assert_eq!(responses.len(), 3);

        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["result"], json!({}));

        assert_eq!(responses[1]["id"], 7);
        assert_eq!(responses[1]["error"]["code"], codes::INVALID_REQUEST);
        assert_eq!(responses[1]["error"]["message"], "Invalid Request");

        assert_eq!(responses[2]["id"], Value::Null);
        assert_eq!(responses[2]["error"]["code"], codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_run_empty_input_exits_cleanly() {
        assert!(exchange("").await.is_empty());
    }
}
