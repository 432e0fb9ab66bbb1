//! Built-in trust tools
//!
//! These run inside the engine against the session's trust gate instead of
//! going through the `ToolExecutor`. Each returns its result as JSON text so
//! it can be verified and shown like any other step output.

use sdk::{EngineError, ToolInput};
use tracing::debug;

use super::BuiltInTool;
use crate::conductor::memory::SessionMemory;
use crate::trust::TrustGate;

/// Session state the built-ins run against
#[derive(Clone, Copy)]
pub struct BuiltInContext<'a> {
    pub gate: &'a TrustGate,
    pub memory: &'a SessionMemory,

    /// Identity trust is assessed from; may be empty
    pub origin: &'a str,
    pub default_dimension: &'a str,

    /// Graph depth used when a query does not name one
    pub max_depth: u32,
}

impl BuiltInTool {
    pub async fn run(
        &self,
        step_id: &str,
        input: &serde_json::Value,
        ctx: &BuiltInContext<'_>,
    ) -> Result<String, EngineError> {
        let input = ToolInput::from_value(input);
        let dimension = input
            .param_str_opt("dimension")
            .unwrap_or_else(|| ctx.default_dimension.to_string());

        match self {
            BuiltInTool::TrustGraphQuery => {
                let root = input.param_str("root")?;
                let max_depth = match input.param_u64_opt("max_depth")? {
                    Some(depth) => u32::try_from(depth).map_err(|_| {
                        EngineError::InvalidToolInput(format!("max_depth out of range: {depth}"))
                    })?,
                    None => ctx.max_depth,
                };
                debug!("Graph query from '{}' ({}, depth {})", root, dimension, max_depth);
                let edges = ctx.gate.query_graph(&root, &dimension, max_depth).await?;
                to_json(&edges)
            }
            BuiltInTool::TrustAssess => {
                let target = input.param_str("target")?;
                let origin = input
                    .param_str_opt("origin")
                    .unwrap_or_else(|| ctx.origin.to_string());
                if origin.is_empty() {
                    return Err(EngineError::InvalidToolInput(
                        "no origin identity to assess from".to_string(),
                    ));
                }
                let verification = ctx
                    .gate
                    .assess(&origin, &target, &dimension, step_id, ctx.memory)
                    .await?;
                to_json(&verification)
            }
            BuiltInTool::IdentityScores => {
                let identity = input.param_str("identity")?;
                let scores = ctx.gate.scores(&identity, ctx.memory).await?;
                to_json(&scores)
            }
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, EngineError> {
    serde_json::to_string(value).map_err(|e| EngineError::ToolError(e.to_string()))
}
