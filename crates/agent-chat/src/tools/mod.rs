//! Tool framework for agent-based execution
//!
//! Tools are named capabilities with a JSON argument schema. The schema is
//! advertised to the model and checked before a tool runs.

pub mod builtin;
pub mod registry;
pub mod router;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use llm_core::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,
    /// Output from the tool
    pub output: String,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// Create a failed result; the message is shown to the model as-is
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Text handed back to the model
    pub fn into_text(self) -> String {
        if self.success {
            self.output
        } else {
            self.error.unwrap_or(self.output)
        }
    }
}

/// Context provided to tools during execution
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Maximum output length (truncate if exceeded)
    pub max_output_len: usize,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            max_output_len: 20_000,
        }
    }
}

/// Schema for a tool parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterProperty {
    /// Parameter type (string, number, integer, boolean, array, object)
    #[serde(rename = "type")]
    pub param_type: String,
    /// Parameter description
    pub description: String,
    /// Enum values if applicable
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ParameterProperty {
    fn typed(param_type: &str, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.to_string(),
            description: description.into(),
            enum_values: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::typed("string", description)
    }

    /// Whether `value` has this property's JSON type
    fn accepts(&self, value: &Value) -> bool {
        let type_ok = match self.param_type.as_str() {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };

        match (&self.enum_values, value.as_str()) {
            (Some(allowed), Some(s)) => type_ok && allowed.iter().any(|a| a == s),
            _ => type_ok,
        }
    }
}

/// Schema describing tool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Type is always "object"
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Parameter properties, ordered by name
    pub properties: BTreeMap<String, ParameterProperty>,
    /// Required parameter names
    #[serde(default)]
    pub required: Vec<String>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, prop: ParameterProperty) -> Self {
        self.properties.insert(name.into(), prop);
        self
    }

    pub fn with_required(mut self, name: impl Into<String>, prop: ParameterProperty) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), prop);
        self.required.push(name);
        self
    }

    /// Check model-supplied arguments against the schema.
    ///
    /// `null` is treated as an empty argument object. Unknown keys are allowed.
    pub fn validate(&self, args: &Value) -> std::result::Result<(), String> {
        let empty = serde_json::Map::new();
        let map = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => return Err(format!("expected an object of arguments, got {}", other)),
        };

        for name in &self.required {
            match map.get(name) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required parameter '{}'", name));
                }
                Some(_) => {}
            }
        }

        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            if let Some(prop) = self.properties.get(name) {
                if !prop.accepts(value) {
                    return Err(format!(
                        "parameter '{}' must be a {}, got {}",
                        name, prop.param_type, value
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// The Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get a description of what the tool does
    fn description(&self) -> &str;

    /// Get the parameter schema
    fn parameters_schema(&self) -> ParameterSchema;

    /// Execute the tool with already-validated arguments
    async fn execute(&self, args: &Value, ctx: &ToolContext) -> Result<ToolResult>;

    /// Convert to a tool definition for the LLM
    fn to_definition(&self) -> ToolDefinition {
        let parameters = serde_json::to_value(self.parameters_schema()).unwrap_or_default();
        ToolDefinition::function(self.name(), self.description(), parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ParameterSchema {
        ParameterSchema::new()
            .with_required("expression", ParameterProperty::string("Expression"))
            .with_property("precision", ParameterProperty::typed("number", "Digits"))
    }

    #[test]
    fn test_validate_accepts_valid_args() {
        assert!(schema().validate(&json!({"expression": "1+1"})).is_ok());
        assert!(schema().validate(&json!({"expression": "1+1", "precision": 2})).is_ok());
        assert!(schema().validate(&json!({"expression": "1", "extra": true})).is_ok());
    }

    #[test]
    fn test_validate_missing_required() {
        let err = schema().validate(&json!({})).unwrap_err();
        assert_eq!(err, "missing required parameter 'expression'");
        assert!(schema().validate(&json!({"expression": null})).is_err());
        assert!(schema().validate(&Value::Null).is_err());
    }

    #[test]
    fn test_validate_type_mismatch() {
        let err = schema().validate(&json!({"expression": 42})).unwrap_err();
        assert!(err.contains("must be a string"));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let err = schema().validate(&json!("2+2")).unwrap_err();
        assert!(err.contains("expected an object"));
    }

    #[test]
    fn test_optional_only_schema_accepts_null() {
        let schema =
            ParameterSchema::new().with_property("timezone", ParameterProperty::string("Zone"));
        assert!(schema.validate(&Value::Null).is_ok());
        assert!(schema.validate(&json!({})).is_ok());
    }

    #[test]
    fn test_enum_values_checked() {
        let unit = ParameterProperty {
            enum_values: Some(vec!["c".into(), "f".into()]),
            ..ParameterProperty::string("Unit")
        };
        let schema = ParameterSchema::new().with_required("unit", unit);
        assert!(schema.validate(&json!({"unit": "c"})).is_ok());
        assert!(schema.validate(&json!({"unit": "k"})).is_err());
    }

    #[test]
    fn test_schema_serializes_as_json_schema() {
        let value = serde_json::to_value(schema()).unwrap();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["expression"]["type"], "string");
        assert_eq!(value["required"], json!(["expression"]));
        assert!(value["properties"]["expression"].get("enum").is_none());
    }

    #[test]
    fn test_tool_result_into_text() {
        assert_eq!(ToolResult::success("ok").into_text(), "ok");
        assert_eq!(ToolResult::error("bad").into_text(), "bad");
    }
}
