use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ModelError, ValidationError};

/// JSON Schema property definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Object schema handed to the model for structured generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        ObjectSchema {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: vec![],
        }
    }
}

impl ObjectSchema {
    /// Structural check on a generated value: it must be a JSON object and
    /// every required field must be present and non-null. Type and range
    /// checks happen at the typed parse that follows.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::NotAnObject(json_type_name(value).to_string()))?;
        for key in &self.required {
            match object.get(key) {
                Some(v) if !v.is_null() => {}
                _ => return Err(ValidationError::MissingField(key.clone())),
            }
        }
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Structured-generation boundary owned by the host runtime's model stack.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Asks the model for a JSON object conforming to `schema`. The returned
    /// value is raw model output; callers are responsible for validation.
    async fn generate_object(
        &self,
        prompt: &str,
        schema: &ObjectSchema,
    ) -> Result<Value, ModelError>;
}
