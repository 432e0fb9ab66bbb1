//! Verifier
//!
//! Trust-checks the identities that trust-sensitive steps surfaced, decides
//! whether the synthesis can be shown as is, and plans a deeper look when it
//! cannot.

use regex::Regex;
use sdk::Confidence;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::conductor::memory::SessionMemory;
use crate::conductor::types::{Plan, PlanStep, StepResult, StepVerification, VerificationResult};
use crate::llm::{extract_balanced_json, extract_fenced_json, Message, Reasoner, ReasonerReply};
use crate::tools::TRUST_GRAPH_QUERY;
use crate::trust::policy::NO_PATH_CAVEAT;
use crate::trust::{PresentationAction, TrustGate};

static IDENTITY_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Lexical DID token: `did:<method>:<method-specific-id>`
fn identity_pattern() -> &'static Regex {
    IDENTITY_PATTERN.get_or_init(|| {
        Regex::new(r"did:[a-z0-9]+:[A-Za-z0-9._:%-]+").expect("Invalid identity pattern")
    })
}

/// Identity references in `text`, deduplicated in first-seen order.
///
/// Trailing `.`, `:` and `-` are sentence punctuation, not part of the id.
pub fn extract_identities(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    identity_pattern()
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ':', '-']))
        .filter(|id| id.matches(':').count() >= 2)
        .filter(|id| seen.insert(id.to_string()))
        .map(String::from)
        .collect()
}

pub struct Verifier {
    gate: TrustGate,
    reasoner: Arc<dyn Reasoner>,
    default_dimension: String,
    follow_up_max_depth: u32,
}

impl Verifier {
    pub fn new(
        gate: TrustGate,
        reasoner: Arc<dyn Reasoner>,
        default_dimension: impl Into<String>,
        follow_up_max_depth: u32,
    ) -> Self {
        Self {
            gate,
            reasoner,
            default_dimension: default_dimension.into(),
            follow_up_max_depth,
        }
    }

    /// Verify the results of `plan` from the point of view of `origin`.
    ///
    /// With no trust-sensitive step, or no origin, this passes without any
    /// external call.
    pub async fn verify(
        &self,
        plan: &Plan,
        results: &[StepResult],
        origin: &str,
        memory: &SessionMemory,
    ) -> VerificationResult {
        let qualifying: Vec<&PlanStep> = plan
            .steps
            .iter()
            .filter(|s| s.requires_verification)
            .collect();

        if qualifying.is_empty() || origin.is_empty() {
            debug!(
                "Skipping verification ({} qualifying steps, origin set: {})",
                qualifying.len(),
                !origin.is_empty()
            );
            return VerificationResult::passed();
        }

        let mut verifications: BTreeMap<String, Vec<StepVerification>> = BTreeMap::new();
        for step in qualifying {
            let Some(output) = results
                .iter()
                .find(|r| r.step_id == step.id)
                .and_then(|r| r.output())
            else {
                continue;
            };

            let dimension = step
                .input
                .get("dimension")
                .and_then(|v| v.as_str())
                .unwrap_or(self.default_dimension.as_str());

            for target in extract_identities(output) {
                if target == origin {
                    continue;
                }
                let verification = match self
                    .gate
                    .assess(origin, &target, dimension, &step.id, memory)
                    .await
                {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("Trust lookup for {} failed: {}", target, e);
                        lookup_failed(&step.id, &target, dimension, &e.to_string())
                    }
                };
                verifications
                    .entry(step.id.clone())
                    .or_default()
                    .push(verification);
            }
        }

        let all: Vec<&StepVerification> = verifications.values().flatten().collect();
        let overall_passed = !all.iter().any(|v| v.action == PresentationAction::Omit);
        info!(
            "Verified {} references across {} steps (passed: {})",
            all.len(),
            verifications.len(),
            overall_passed
        );

        let caveats = if all.iter().all(|v| v.confidence == Confidence::High) {
            Vec::new()
        } else {
            self.caveats(plan, &all).await
        };

        let follow_up_plan = (!overall_passed).then(|| self.follow_up_plan(&all));

        VerificationResult {
            overall_passed,
            verifications,
            caveats,
            follow_up_plan,
        }
    }

    /// One deeper graph query per omitted reference, rooted at the first hop
    /// of its path.
    fn follow_up_plan(&self, verifications: &[&StepVerification]) -> Plan {
        let steps = verifications
            .iter()
            .filter(|v| v.action == PresentationAction::Omit)
            .enumerate()
            .map(|(n, v)| {
                let root = v.path.first().cloned().unwrap_or_default();
                PlanStep::new(
                    format!("followup_{}", n + 1),
                    TRUST_GRAPH_QUERY,
                    json!({
                        "root": root,
                        "dimension": v.dimension,
                        "max_depth": self.follow_up_max_depth,
                    }),
                )
                .verified()
            })
            .collect();

        Plan {
            steps,
            reasoning: "Looking deeper for trust evidence on omitted references".to_string(),
            direct_response: None,
        }
    }

    /// Ask the reasoner to phrase caveats; fall back to the raw ones.
    async fn caveats(&self, plan: &Plan, verifications: &[&StepVerification]) -> Vec<String> {
        let raw = raw_caveats(verifications);

        let mut summary = String::new();
        if !plan.reasoning.is_empty() {
            summary.push_str(&format!("Plan: {}\n", plan.reasoning));
        }
        for v in verifications {
            summary.push_str(&format!(
                "- step {}: {} on {} is {} confidence (weight {:.2}), action {}{}\n",
                v.step_id,
                v.target,
                v.dimension,
                v.confidence,
                v.trust_weight,
                v.action,
                v.caveat
                    .as_deref()
                    .map(|c| format!(": {c}"))
                    .unwrap_or_default()
            ));
        }

        let messages = vec![
            Message::system(
                "You summarize trust gaps for the user. Reply with a JSON array of short caveat strings and nothing else.",
            ),
            Message::user(summary),
        ];

        match self.reasoner.complete(&messages, None).await {
            Ok(ReasonerReply::Text { content }) => match parse_caveats(&content) {
                Some(caveats) => caveats,
                None => {
                    debug!("Unparseable caveat reply, using raw caveats");
                    raw
                }
            },
            Ok(ReasonerReply::ToolInvocations { .. }) => raw,
            Err(e) => {
                warn!("Caveat generation failed: {}", e);
                raw
            }
        }
    }
}

fn lookup_failed(step_id: &str, target: &str, dimension: &str, error: &str) -> StepVerification {
    StepVerification {
        step_id: step_id.to_string(),
        target: target.to_string(),
        dimension: dimension.to_string(),
        action: PresentationAction::Omit,
        confidence: Confidence::None,
        trust_weight: 0.0,
        path: Vec::new(),
        caveat: Some(format!("trust lookup failed ({error}); {NO_PATH_CAVEAT}")),
    }
}

/// Per-step caveat strings, without repeats
fn raw_caveats(verifications: &[&StepVerification]) -> Vec<String> {
    let mut seen = HashSet::new();
    verifications
        .iter()
        .filter_map(|v| v.caveat.clone())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Parse a caveat list, bare or under a `caveats` key. Empty lists count as
/// unparseable.
fn parse_caveats(content: &str) -> Option<Vec<String>> {
    let trimmed = content.trim();
    let mut candidates = vec![trimmed];
    if let Some(inner) = extract_fenced_json(trimmed) {
        candidates.push(inner.trim());
    }
    if let Some(pos) = trimmed.find(['[', '{']) {
        if let Some(json_str) = extract_balanced_json(&trimmed[pos..]) {
            candidates.push(json_str);
        }
    }

    candidates.into_iter().find_map(|candidate| {
        let value: serde_json::Value = serde_json::from_str(candidate).ok()?;
        let list = match value {
            serde_json::Value::Object(mut map) => map.remove("caveats")?,
            other => other,
        };
        let caveats: Vec<String> = serde_json::from_value(list).ok()?;
        (!caveats.is_empty()).then_some(caveats)
    })
}
