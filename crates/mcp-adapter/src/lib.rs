//! Shared MCP adapter layer
//!
//! Tool registry, argument validation and name-based dispatch, plus the
//! line-delimited JSON-RPC loop the adapter servers run over stdio.

pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod validation;

pub use dispatch::{Dispatcher, ToolSet};
pub use error::{McpError, ToolError};
pub use protocol::{CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolContent, PROTOCOL_VERSION};
pub use registry::{FieldType, InputSchema, RegistryError, ToolDescriptor, ToolRegistry};
pub use server::{McpServer, ServerInfo};
