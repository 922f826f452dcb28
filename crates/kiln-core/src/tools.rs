//! Tool schema types shared between the tool registry and the model client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema describing one callable tool, as advertised to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (the key the model uses to call it).
    pub name: String,
    /// What the tool does, for the model's benefit.
    pub description: String,
    /// JSON schema for the tool's input object.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a definition with an empty object schema.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }
    }
}
