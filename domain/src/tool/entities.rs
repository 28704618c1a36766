//! Tool catalog entries.

use crate::conversation::message::CacheControl;
use serde::{Deserialize, Serialize};

/// A tool the model may call, with its JSON Schema input contract.
///
/// # Examples
///
/// ```
/// use prismatic_domain::tool::entities::{ToolDefinition, ToolParameter};
///
/// let tool = ToolDefinition::new("read_file", "Read a file")
///     .with_parameter(ToolParameter::new("path", "Path to read", true));
/// assert_eq!(tool.input_schema["required"][0], "path");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

/// A single named parameter used to build a tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Schema type: "string", "path", "number", "integer" or "boolean".
    pub param_type: String,
}

impl ToolDefinition {
    /// A tool taking no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
            cache_control: None,
        }
    }

    /// A tool with a pre-built schema (e.g. supplied by a tool host).
    pub fn with_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            cache_control: None,
        }
    }

    /// Add a parameter to the input schema.
    ///
    /// `path` parameters are exposed as strings; unknown types fall back to string.
    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        let schema_type = match param.param_type.as_str() {
            "number" => "number",
            "integer" => "integer",
            "boolean" => "boolean",
            _ => "string",
        };

        if let Some(properties) = self
            .input_schema
            .get_mut("properties")
            .and_then(|p| p.as_object_mut())
        {
            properties.insert(
                param.name.clone(),
                serde_json::json!({
                    "type": schema_type,
                    "description": param.description,
                }),
            );
        }
        if param.required
            && let Some(required) = self
                .input_schema
                .get_mut("required")
                .and_then(|r| r.as_array_mut())
        {
            required.push(serde_json::json!(param.name));
        }
        self
    }

    pub fn with_cache_control(mut self, marker: CacheControl) -> Self {
        self.cache_control = Some(marker);
        self
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_parameter_builds_schema() {
        let tool = ToolDefinition::new("grep_search", "Search file contents")
            .with_parameter(ToolParameter::new("pattern", "Regex", true))
            .with_parameter(ToolParameter::new("path", "Where", true).with_type("path"))
            .with_parameter(
                ToolParameter::new("context_lines", "Context", false).with_type("number"),
            );

        let schema = &tool.input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["pattern"]["type"], "string");
        assert_eq!(schema["properties"]["path"]["type"], "string");
        assert_eq!(schema["properties"]["context_lines"]["type"], "number");
        assert_eq!(schema["required"], serde_json::json!(["pattern", "path"]));
    }

    #[test]
    fn test_cache_control_skipped_when_unset() {
        let tool = ToolDefinition::new("read_file", "Read");
        let json = serde_json::to_value(&tool).unwrap();
        assert!(json.get("cache_control").is_none());

        let marked = tool.with_cache_control(CacheControl::Ephemeral);
        let json = serde_json::to_value(&marked).unwrap();
        assert_eq!(json["cache_control"]["type"], "ephemeral");
    }
}
