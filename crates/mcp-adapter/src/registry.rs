//! Static tool registry.
//!
//! Each server declares its tools once at startup; the registry is the
//! source of truth for both `tools/list` and argument validation.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Primitive JSON type a tool argument is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Whether `value` has this JSON type. No coercion.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
    /// Element type, for array fields.
    pub items: Option<FieldType>,
}

/// Input descriptor of a tool: ordered properties plus required names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    pub properties: Vec<Property>,
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn field(mut self, name: &str, field_type: FieldType, items: Option<FieldType>, description: &str) -> Self {
        self.properties.push(Property {
            name: name.to_string(),
            field_type,
            description: description.to_string(),
            items,
        });
        self
    }

    pub fn string(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::String, None, description)
    }

    pub fn number(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::Number, None, description)
    }

    pub fn object(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::Object, None, description)
    }

    pub fn array_of(self, name: &str, items: FieldType, description: &str) -> Self {
        self.field(name, FieldType::Array, Some(items), description)
    }

    /// Mark an already declared field as required.
    pub fn required(mut self, name: &str) -> Self {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Render as the JSON Schema object MCP clients expect.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for prop in &self.properties {
            let mut entry = json!({
                "type": prop.field_type.as_str(),
                "description": prop.description,
            });
            if let Some(items) = prop.items {
                entry["items"] = json!({ "type": items.as_str() });
            }
            properties.insert(prop.name.clone(), entry);
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

/// Tool definition for MCP
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, input_schema: InputSchema) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
    #[error("tool '{tool}' requires undeclared field '{field}'")]
    UndeclaredRequired { tool: String, field: String },
}

/// Immutable, ordered set of tool descriptors with unique names.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self, RegistryError> {
        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].iter().any(|t| t.name == tool.name) {
                return Err(RegistryError::DuplicateName(tool.name.clone()));
            }
            if let Some(field) = tool
                .input_schema
                .required
                .iter()
                .find(|r| tool.input_schema.property(r).is_none())
            {
                return Err(RegistryError::UndeclaredRequired {
                    tool: tool.name.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(Self { tools })
    }

    /// All tools in declaration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
