//! Tool executor capability
//!
//! Backends that actually run named tools implement `ToolExecutor`. The engine
//! treats every tool as opaque: it passes the plan step's JSON input through
//! and keeps whatever text comes back.

use async_trait::async_trait;

use crate::errors::EngineError;

/// Executes tools that are not handled by the engine itself
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run `tool_name` with `input`, returning its raw textual output
    async fn call(&self, tool_name: &str, input: &serde_json::Value) -> Result<String, EngineError>;
}

/// Executor with no backends; every call fails with `ToolNotFound`
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExecutor;

#[async_trait]
impl ToolExecutor for NoopExecutor {
    async fn call(
        &self,
        tool_name: &str,
        _input: &serde_json::Value,
    ) -> Result<String, EngineError> {
        Err(EngineError::ToolNotFound(tool_name.to_string()))
    }
}
