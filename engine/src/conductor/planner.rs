//! Conductor Planner
//!
//! Asks the reasoner which tools a user request needs and turns its answer
//! into a `Plan`. A text-only answer becomes a direct response.

use sdk::EngineError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::conductor::types::{Plan, PlanStep};
use crate::llm::{Message, Reasoner, ReasonerReply, ToolInvocation};
use crate::tools::ToolRegistry;

const PLANNER_PROMPT: &str = "You are Warden, an assistant that answers questions using tools. \
Data about people and organisations is identified by DIDs (did:<method>:<id>); \
any identity a tool returns will be trust-checked before it is shown.\n\
If the request needs tools, reply with the JSON plan only. Steps that do not \
depend on each other run in parallel; list the ids a step needs in \"depends_on\". \
Set \"requires_verification\" on steps whose output names identities.\n\
If no tool is needed, answer in plain text.";

pub struct Planner {
    reasoner: Arc<dyn Reasoner>,
    registry: Arc<ToolRegistry>,
}

impl Planner {
    pub fn new(reasoner: Arc<dyn Reasoner>, registry: Arc<ToolRegistry>) -> Self {
        Self { reasoner, registry }
    }

    /// Plan a user request against the conversation so far
    pub async fn plan(&self, user_text: &str, history: &[Message]) -> Result<Plan, EngineError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(PLANNER_PROMPT));
        messages.extend_from_slice(history);
        messages.push(Message::user(user_text));

        let specs = self.registry.specs();
        debug!(
            "Planning with '{}' ({} tools, {} history messages)",
            self.reasoner.name(),
            specs.len(),
            history.len()
        );
        let reply = self.reasoner.complete(&messages, Some(specs.as_slice())).await?;

        let plan = match reply {
            ReasonerReply::Text { content } => {
                debug!("Reasoner answered directly");
                Plan::direct(content)
            }
            ReasonerReply::ToolInvocations {
                invocations,
                reasoning,
            } => plan_from_invocations(invocations, reasoning, &self.registry),
        };

        info!(
            "Planned {} steps ({} need verification)",
            plan.steps.len(),
            plan.steps.iter().filter(|s| s.requires_verification).count()
        );
        Ok(plan)
    }
}

/// Build plan steps from reasoner invocations.
///
/// Explicit ids are claimed first, so a generated `step_<n>` never takes a
/// name another step asked for. A repeated id gets the step number appended
/// until it is unique. A step needs verification when the reasoner asks for
/// it or the catalog marks the tool as trust-sensitive.
pub(crate) fn plan_from_invocations(
    invocations: Vec<ToolInvocation>,
    reasoning: String,
    registry: &ToolRegistry,
) -> Plan {
    let mut used: HashSet<String> = HashSet::new();
    let explicit: Vec<Option<String>> = invocations
        .iter()
        .enumerate()
        .map(|(i, inv)| inv.id.as_deref().map(|id| claim_id(id, i, &mut used)))
        .collect();

    let steps = invocations
        .into_iter()
        .zip(explicit)
        .enumerate()
        .map(|(i, (inv, id))| {
            let id = id.unwrap_or_else(|| claim_id(&format!("step_{}", i + 1), i, &mut used));
            let requires_verification =
                inv.requires_verification || registry.is_trust_sensitive(&inv.tool);
            PlanStep {
                id,
                tool_name: inv.tool,
                input: inv.input,
                depends_on: inv.depends_on,
                requires_verification,
            }
        })
        .collect();

    Plan {
        steps,
        reasoning,
        direct_response: None,
    }
}

/// Reserve `base`, or `base_<n>` (repeated) if it is taken, for step `i`
fn claim_id(base: &str, i: usize, used: &mut HashSet<String>) -> String {
    let mut id = base.to_string();
    while !used.insert(id.clone()) {
        id = format!("{}_{}", id, i + 1);
    }
    id
}
