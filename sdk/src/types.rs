//! Tool input types

use serde::{Deserialize, Serialize};

/// Arguments of a single tool invocation.
///
/// Plan steps carry their input as a raw JSON value; `ToolInput` gives built-in
/// handlers typed access to its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ToolInput {
    /// Create an empty ToolInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Non-object values are kept under the `input` key.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self {
                params: map.clone(),
            },
            serde_json::Value::Null => Self::default(),
            other => Self::default().with_param("input", other.clone()),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Get a string parameter
    pub fn param_str(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))
    }

    /// Get an optional string parameter
    pub fn param_str_opt(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    /// Get an optional u64 parameter, rejecting values of the wrong type
    pub fn param_u64_opt(&self, key: &str) -> Result<Option<u64>, ToolError> {
        match self.params.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| ToolError::InvalidParameter(key.to_string())),
        }
    }

    /// Convert back into a JSON value
    pub fn into_value(self) -> serde_json::Value {
        serde_json::Value::Object(self.params)
    }
}

/// Tool-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
