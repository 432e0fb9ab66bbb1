//! Conductor Executor
//!
//! Final stage of a turn. Either hands a follow-up plan back to the loop or
//! asks the reasoner to compose the answer from everything the turn has
//! verified so far, earlier passes included.

use sdk::EngineError;
use std::sync::Arc;
use tracing::{debug, info};

use crate::conductor::planner::plan_from_invocations;
use crate::conductor::types::{
    AgentOutput, StageOutcome, StepOutcome, TrustAnnotation, TurnEvidence, VerificationResult,
};
use crate::llm::{extract_balanced_json, extract_fenced_json, Message, Reasoner, ReasonerReply};
use crate::tools::ToolRegistry;

const COMPOSER_PROMPT: &str = "You are Warden. Answer the user's request from the tool results below. \
Keep every trust caveat visible in your answer. Do not repeat data marked as omitted.\n\
If the answer is an operation the user should approve, reply with JSON only: \
{\"action\": \"<what will be done>\", \"requires_confirmation\": true}. \
If more tool calls are needed, reply with a JSON plan. Otherwise answer in plain text.";

pub struct Executor {
    reasoner: Arc<dyn Reasoner>,
    registry: Arc<ToolRegistry>,
}

impl Executor {
    pub fn new(reasoner: Arc<dyn Reasoner>, registry: Arc<ToolRegistry>) -> Self {
        Self { reasoner, registry }
    }

    /// Turn the evidence into the turn's output, or a follow-up plan when
    /// the latest pass's `verification` failed and has one.
    pub(crate) async fn execute(
        &self,
        user_text: &str,
        history: &[Message],
        evidence: &TurnEvidence,
        verification: &VerificationResult,
    ) -> Result<StageOutcome, EngineError> {
        if !verification.overall_passed {
            if let Some(plan) = verification
                .follow_up_plan
                .as_ref()
                .filter(|p| !p.steps.is_empty())
            {
                info!("Verification failed, following up with {} steps", plan.steps.len());
                return Ok(StageOutcome::FollowUp(plan.clone()));
            }
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(COMPOSER_PROMPT));
        messages.extend_from_slice(history);
        messages.push(Message::user(compose_request(user_text, evidence)));

        let specs = self.registry.specs();
        let reply = self
            .reasoner
            .complete(&messages, Some(specs.as_slice()))
            .await?;

        let annotations = evidence.annotations();
        match reply {
            ReasonerReply::Text { content } => Ok(StageOutcome::Done(
                parse_action(&content, annotations.clone()).unwrap_or_else(|| {
                    AgentOutput::Response {
                        text: content,
                        annotations,
                    }
                }),
            )),
            ReasonerReply::ToolInvocations {
                invocations,
                reasoning,
            } => {
                debug!("Reasoner asked for {} more tool calls", invocations.len());
                Ok(StageOutcome::FollowUp(plan_from_invocations(
                    invocations,
                    reasoning,
                    &self.registry,
                )))
            }
        }
    }
}

/// Request text carrying the step results and their trust annotations
fn compose_request(user_text: &str, evidence: &TurnEvidence) -> String {
    let mut text = format!("Request: {user_text}\n\nTool results:\n");
    for result in &evidence.results {
        match (&result.outcome, evidence.is_omitted(&result.step_id)) {
            (_, true) => text.push_str(&format!(
                "- {} ({}): omitted, untrusted source\n",
                result.step_id, result.tool_name
            )),
            (StepOutcome::Output(out), false) => text.push_str(&format!(
                "- {} ({}): {}\n",
                result.step_id, result.tool_name, out
            )),
            (StepOutcome::Error(err), false) => text.push_str(&format!(
                "- {} ({}) failed: {}\n",
                result.step_id, result.tool_name, err
            )),
        }
    }

    let annotated: Vec<_> = evidence.all().filter(|v| v.caveat.is_some()).collect();
    if !annotated.is_empty() {
        text.push_str("\nTrust notes:\n");
        for v in annotated {
            text.push_str(&format!(
                "- {} ({}): {}\n",
                v.target,
                v.action,
                v.caveat.as_deref().unwrap_or_default()
            ));
        }
    }
    if !evidence.caveats.is_empty() {
        text.push_str("\nCaveats:\n");
        for caveat in &evidence.caveats {
            text.push_str(&format!("- {caveat}\n"));
        }
    }
    text
}

/// Read an `{"action": ...}` reply. The description comes from
/// `description` when present, else from `action`.
fn parse_action(content: &str, annotations: Vec<TrustAnnotation>) -> Option<AgentOutput> {
    let trimmed = content.trim();
    let json_str = if trimmed.starts_with('{') {
        trimmed
    } else {
        let fenced = extract_fenced_json(trimmed)?.trim();
        extract_balanced_json(fenced)?
    };

    let value: serde_json::Value = serde_json::from_str(json_str).ok()?;
    let action = value.get("action")?.as_str()?;
    let description = value
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or(action)
        .to_string();
    let requires_confirmation = value
        .get("requires_confirmation")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    Some(AgentOutput::Action {
        description,
        requires_confirmation,
        annotations,
    })
}
