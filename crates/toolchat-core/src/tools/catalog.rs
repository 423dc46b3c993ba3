//! Tool catalog translation into the function-calling wire shape
//!
//! Every descriptor becomes
//! `{"type": "function", "function": {"name", "description", "parameters"}}`
//! with the input schema passed through untouched. The translation is
//! total and keeps catalog order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ToolDescriptor;

/// A tool in function-calling format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&ToolDescriptor> for FunctionTool {
    fn from(tool: &ToolDescriptor) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

/// Translate a whole catalog, preserving order
pub fn to_function_tools(tools: &[ToolDescriptor]) -> Vec<FunctionTool> {
    tools.iter().map(FunctionTool::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sql_tool() -> ToolDescriptor {
        ToolDescriptor::new("execute_sqlite", "Run SQL").with_schema(json!({
            "type": "object",
            "properties": { "sql": { "type": "string" } },
            "required": ["sql"]
        }))
    }

    #[test]
    fn test_wire_shape() {
        let out = to_function_tools(&[sql_tool()]);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!([{
                "type": "function",
                "function": {
                    "name": "execute_sqlite",
                    "description": "Run SQL",
                    "parameters": {
                        "type": "object",
                        "properties": { "sql": { "type": "string" } },
                        "required": ["sql"]
                    }
                }
            }])
        );
    }

    #[test]
    fn test_preserves_order_and_length() {
        let tools = vec![
            ToolDescriptor::new("calculate", "math"),
            sql_tool(),
            ToolDescriptor::new("weather", "forecast"),
        ];
        let names: Vec<_> = to_function_tools(&tools)
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(names, vec!["calculate", "execute_sqlite", "weather"]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(to_function_tools(&[]).is_empty());
    }

    #[test]
    fn test_malformed_schema_passes_through() {
        let odd = ToolDescriptor::new("odd", "").with_schema(json!("not a schema"));
        let out = to_function_tools(&[odd]);
        assert_eq!(out[0].function.parameters, json!("not a schema"));
        assert_eq!(out[0].function.description, "");
    }
}
