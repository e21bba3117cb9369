//! Generic argument validation against a tool's declared input schema.
//!
//! Only structural checks live here: object-ness, required keys and
//! declared JSON types. Tool-specific constraints belong to the tool's
//! own argument parsing.

use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::registry::ToolDescriptor;

/// Validate `arguments` for `descriptor`, returning the argument map.
///
/// Undeclared fields are passed through untouched. A `null` value on an
/// optional field is treated as absent.
pub fn validate(descriptor: &ToolDescriptor, arguments: &Value) -> Result<Map<String, Value>, ToolError> {
    let args = arguments
        .as_object()
        .ok_or_else(|| ToolError::invalid_params("Invalid arguments: expected an object"))?;

    let schema = &descriptor.input_schema;
    for field in &schema.required {
        if args.get(field).is_none_or(Value::is_null) {
            return Err(ToolError::invalid_params(format!(
                "Missing required parameter: {}",
                field
            )));
        }
    }

    for prop in &schema.properties {
        let Some(value) = args.get(&prop.name).filter(|v| !v.is_null()) else {
            continue;
        };
        if !prop.field_type.matches(value) {
            return Err(ToolError::invalid_params(format!(
                "Invalid type for parameter '{}': expected {}",
                prop.name, prop.field_type
            )));
        }
        if let (Some(items), Some(elements)) = (prop.items, value.as_array()) {
            if !elements.iter().all(|e| items.matches(e)) {
                return Err(ToolError::invalid_params(format!(
                    "Invalid type for parameter '{}': expected array of {}",
                    prop.name, items
                )));
            }
        }
    }

    Ok(args.clone())
}
