//! Name-based tool dispatch.
//!
//! The dispatcher owns a [`ToolSet`] handed to it at construction: the
//! registry it validates against plus the typed handlers behind it.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::protocol::CallToolResult;
use crate::registry::{ToolDescriptor, ToolRegistry};
use crate::validation;

/// A server's tools: a fixed registry and the handlers behind it.
///
/// `call` only ever sees names present in the registry and arguments
/// that passed generic validation.
pub trait ToolSet: Send + Sync + 'static {
    fn registry(&self) -> &ToolRegistry;

    fn call(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> impl Future<Output = Result<CallToolResult, ToolError>> + Send;
}

pub struct Dispatcher<S> {
    tools: S,
}

impl<S: ToolSet> Dispatcher<S> {
    pub fn new(tools: S) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &S {
        &self.tools
    }

    /// All operations, in registry order.
    pub fn list_operations(&self) -> &[ToolDescriptor] {
        self.tools.registry().list()
    }

    /// Look up, validate and run one tool.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<CallToolResult, ToolError> {
        let Some(descriptor) = self.tools.registry().get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::MethodNotFound(format!("Unknown tool: {}", name)));
        };

        let args = validation::validate(descriptor, arguments).inspect_err(|e| {
            warn!("Rejected arguments for {}: {}", name, e);
        })?;

        debug!("Dispatching {} with {} argument(s)", name, args.len());

        let result = match AssertUnwindSafe(self.tools.call(name, args)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(ToolError::internal(format!(
                "Tool '{}' failed unexpectedly: {}",
                name,
                panic_message(panic.as_ref())
            ))),
        };

        match &result {
            Ok(_) => info!("Tool {} succeeded", name),
            Err(e) => warn!("Tool {} failed ({}): {}", name, e.code(), e),
        }
        result
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
