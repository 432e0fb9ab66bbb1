//! Conductor Types
//!
//! Shared data model for one turn: plans, step results, verification output
//! and what the loop hands back to the caller.

use sdk::{Confidence, EngineError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::trust::PresentationAction;

/// Ordered tool-invocation steps produced for one user turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,

    #[serde(default)]
    pub reasoning: String,

    /// Set when the reasoner answered without selecting tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_response: Option<String>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self {
            steps,
            reasoning: String::new(),
            direct_response: None,
        }
    }

    /// Plan that answers directly with no tool steps
    pub fn direct(text: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            reasoning: String::new(),
            direct_response: Some(text.into()),
        }
    }

    /// Check that every step has a non-empty id no other step uses.
    ///
    /// Plans built by the planner always pass; this guards plans read from
    /// outside.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut seen = HashSet::new();
        for (i, step) in self.steps.iter().enumerate() {
            if step.id.trim().is_empty() {
                return Err(EngineError::InvalidPlan(format!("step {} has no id", i + 1)));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(EngineError::InvalidPlan(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
        }
        Ok(())
    }
}

/// A single tool invocation inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Unique within its plan
    pub id: String,
    pub tool_name: String,

    #[serde(default)]
    pub input: serde_json::Value,

    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub requires_verification: bool,
}

impl PlanStep {
    pub fn new(
        id: impl Into<String>,
        tool_name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            input,
            depends_on: Vec::new(),
            requires_verification: false,
        }
    }

    pub fn after(mut self, ids: &[&str]) -> Self {
        self.depends_on = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn verified(mut self) -> Self {
        self.requires_verification = true;
        self
    }
}

/// What a step produced; output and error never coexist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Output(String),
    Error(String),
}

/// Result of running one plan step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub tool_name: String,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Output(text) => Some(text),
            StepOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Output(_) => None,
            StepOutcome::Error(err) => Some(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Output(_))
    }
}

/// Trust decision for one identity referenced by one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepVerification {
    pub step_id: String,
    pub target: String,
    pub dimension: String,
    pub action: PresentationAction,
    pub confidence: Confidence,
    pub trust_weight: f64,
    pub path: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveat: Option<String>,
}

/// Outcome of the verify stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// False iff any verification was omitted
    pub overall_passed: bool,

    /// Every assessed reference, per step, in discovery order
    pub verifications: BTreeMap<String, Vec<StepVerification>>,

    pub caveats: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_plan: Option<Plan>,
}

impl VerificationResult {
    /// Nothing needed checking
    pub fn passed() -> Self {
        Self {
            overall_passed: true,
            verifications: BTreeMap::new(),
            caveats: Vec::new(),
            follow_up_plan: None,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &StepVerification> {
        self.verifications.values().flatten()
    }
}

/// Step results and trust decisions gathered over every pass of a turn.
///
/// A follow-up pass adds to what earlier passes found. A later result for a
/// step id replaces the earlier one, together with its verifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnEvidence {
    /// Latest result per step id, in first-seen order
    pub results: Vec<StepResult>,
    pub verifications: BTreeMap<String, Vec<StepVerification>>,

    /// Caveats of every pass, without repeats
    pub caveats: Vec<String>,
}

impl TurnEvidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one synthesize/verify pass into the evidence
    pub fn absorb(&mut self, results: Vec<StepResult>, verification: &VerificationResult) {
        for result in results {
            self.verifications.remove(&result.step_id);
            match self.results.iter_mut().find(|r| r.step_id == result.step_id) {
                Some(slot) => *slot = result,
                None => self.results.push(result),
            }
        }
        for (step_id, verifications) in &verification.verifications {
            self.verifications
                .insert(step_id.clone(), verifications.clone());
        }
        for caveat in &verification.caveats {
            if !self.caveats.contains(caveat) {
                self.caveats.push(caveat.clone());
            }
        }
    }

    /// Whether the output of `step_id` must be kept from the user
    pub fn is_omitted(&self, step_id: &str) -> bool {
        self.verifications
            .get(step_id)
            .is_some_and(|vs| vs.iter().any(|v| v.action == PresentationAction::Omit))
    }

    pub fn all(&self) -> impl Iterator<Item = &StepVerification> {
        self.verifications.values().flatten()
    }

    pub fn annotations(&self) -> Vec<TrustAnnotation> {
        self.all().map(TrustAnnotation::from).collect()
    }
}

/// Trust note attached to what the user sees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustAnnotation {
    pub step_id: String,
    pub target: String,
    pub action: PresentationAction,
    pub confidence: Confidence,
    pub trust_weight: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveat: Option<String>,
}

impl From<&StepVerification> for TrustAnnotation {
    fn from(v: &StepVerification) -> Self {
        Self {
            step_id: v.step_id.clone(),
            target: v.target.clone(),
            action: v.action,
            confidence: v.confidence,
            trust_weight: v.trust_weight,
            caveat: v.caveat.clone(),
        }
    }
}

/// What a turn hands back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentOutput {
    Response {
        text: String,
        annotations: Vec<TrustAnnotation>,
    },
    Action {
        description: String,
        requires_confirmation: bool,
        annotations: Vec<TrustAnnotation>,
    },
}

impl AgentOutput {
    /// Text recorded in history for this output
    pub fn text(&self) -> &str {
        match self {
            AgentOutput::Response { text, .. } => text,
            AgentOutput::Action { description, .. } => description,
        }
    }

    pub fn annotations(&self) -> &[TrustAnnotation] {
        match self {
            AgentOutput::Response { annotations, .. } => annotations,
            AgentOutput::Action { annotations, .. } => annotations,
        }
    }
}

/// Result of the execute stage, as seen by the loop
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StageOutcome {
    Done(AgentOutput),
    FollowUp(Plan),
}
