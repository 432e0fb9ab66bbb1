//! Agent Core
//!
//! The turn loop. Each iteration walks Planning, Synthesizing, Verifying and
//! Executing; the execute stage either finishes the turn or hands back a
//! follow-up plan, which the next iteration adopts without asking the
//! reasoner to plan again. Results and trust decisions of every pass are
//! kept, so the final answer is composed from all of them.
//!
//! # Limits
//!
//! - `agent.max_iterations` iterations per turn (default 10). Running out
//!   ends the turn with a fixed degraded answer and no trust annotations.
//!
//! History and tool-call records are only written when a turn reaches Done.
//! A turn that fails or is cancelled leaves them untouched; trust lookups it
//! already made stay cached.

use sdk::{EngineError, ToolExecutor, TrustOracle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::conductor::memory::{SessionMemory, ToolCallRecord};
use crate::conductor::types::{AgentOutput, Plan, StageOutcome, StepResult, TurnEvidence};
use crate::conductor::{Executor, Planner, Scheduler, Verifier};
use crate::config::Config;
use crate::llm::Reasoner;
use crate::tools::{BuiltInContext, ToolRegistry};
use crate::trust::TrustGate;

/// Answer given when follow-ups never converge
pub const DEGRADED_RESPONSE: &str = "I could not gather enough trusted evidence to answer this \
with confidence. Treat anything related to this request as unverified.";

/// Phases of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Synthesizing,
    Verifying,
    Executing,
    Done,
}

/// Drives turns for one session
pub struct AgentLoop {
    planner: Planner,
    scheduler: Scheduler,
    verifier: Verifier,
    executor: Executor,
    gate: TrustGate,
    memory: SessionMemory,

    /// Identity trust is assessed from; empty disables verification
    origin_identity: String,
    default_dimension: String,
    follow_up_max_depth: u32,
    max_iterations: usize,

    phase_trace: Vec<Phase>,
    iterations: usize,
}

impl AgentLoop {
    /// Create a loop with a fresh session
    pub fn new(
        config: &Config,
        reasoner: Arc<dyn Reasoner>,
        tool_executor: Arc<dyn ToolExecutor>,
        oracle: Arc<dyn TrustOracle>,
        registry: ToolRegistry,
    ) -> Self {
        let registry = Arc::new(registry);
        let gate = TrustGate::new(oracle);

        Self {
            planner: Planner::new(reasoner.clone(), registry.clone()),
            scheduler: Scheduler::new(registry.clone(), tool_executor),
            verifier: Verifier::new(
                gate.clone(),
                reasoner.clone(),
                config.trust.default_dimension.clone(),
                config.trust.follow_up_max_depth,
            ),
            executor: Executor::new(reasoner, registry),
            gate,
            memory: SessionMemory::new(&config.memory, config.trust.cache_ttl()),
            origin_identity: config.agent.origin_identity.clone(),
            default_dimension: config.trust.default_dimension.clone(),
            follow_up_max_depth: config.trust.follow_up_max_depth,
            max_iterations: config.agent.max_iterations,
            phase_trace: Vec::new(),
            iterations: 0,
        }
    }

    /// Replace the origin identity for later turns
    pub fn set_origin_identity(&mut self, origin: impl Into<String>) {
        self.origin_identity = origin.into();
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    /// Phases visited by the last turn, in order
    pub fn last_phase_trace(&self) -> &[Phase] {
        &self.phase_trace
    }

    /// Iterations used by the last turn
    pub fn last_iterations(&self) -> usize {
        self.iterations
    }

    /// Run one user turn to completion
    pub async fn run_turn(&mut self, user_text: &str) -> Result<AgentOutput, EngineError> {
        self.run_turn_with_cancel(user_text, &CancellationToken::new())
            .await
    }

    /// Run one user turn, stopping at the next phase boundary once `cancel`
    /// fires
    pub async fn run_turn_with_cancel(
        &mut self,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentOutput, EngineError> {
        self.phase_trace.clear();
        self.iterations = 0;
        info!(
            "Session {}: starting turn ({} chars)",
            self.memory.session_id(),
            user_text.len()
        );

        let history = self.memory.messages().to_vec();
        let mut pending: Option<Plan> = None;
        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut evidence = TurnEvidence::new();

        let output = loop {
            if self.iterations >= self.max_iterations {
                warn!(
                    "Turn did not converge after {} iterations, answering degraded",
                    self.iterations
                );
                break AgentOutput::Response {
                    text: DEGRADED_RESPONSE.to_string(),
                    annotations: Vec::new(),
                };
            }
            self.iterations += 1;
            debug!("Iteration {}/{}", self.iterations, self.max_iterations);

            self.enter(Phase::Planning, cancel)?;
            let mut plan = match pending.take() {
                Some(plan) => plan,
                None => self.planner.plan(user_text, &history).await?,
            };
            if let Some(text) = plan.direct_response.take() {
                break AgentOutput::Response {
                    text,
                    annotations: Vec::new(),
                };
            }

            self.enter(Phase::Synthesizing, cancel)?;
            let results = {
                let ctx = BuiltInContext {
                    gate: &self.gate,
                    memory: &self.memory,
                    origin: &self.origin_identity,
                    default_dimension: &self.default_dimension,
                    max_depth: self.follow_up_max_depth,
                };
                self.scheduler.synthesize(&plan, &ctx).await
            };
            tool_calls.extend(results.iter().map(record));

            self.enter(Phase::Verifying, cancel)?;
            let verification = self
                .verifier
                .verify(&plan, &results, &self.origin_identity, &self.memory)
                .await;
            evidence.absorb(results, &verification);

            self.enter(Phase::Executing, cancel)?;
            match self
                .executor
                .execute(user_text, &history, &evidence, &verification)
                .await?
            {
                StageOutcome::Done(output) => break output,
                StageOutcome::FollowUp(next) => pending = Some(next),
            }
        };

        self.enter(Phase::Done, cancel)?;
        self.memory.add_user(user_text);
        self.memory.add_assistant(output.text());
        for call in tool_calls {
            self.memory.record_tool_call(call);
        }
        self.memory.trim_history();

        info!(
            "Turn finished after {} iterations with {} annotations",
            self.iterations,
            output.annotations().len()
        );
        Ok(output)
    }

    fn enter(&mut self, phase: Phase, cancel: &CancellationToken) -> Result<(), EngineError> {
        if cancel.is_cancelled() {
            info!("Turn cancelled before {:?}", phase);
            return Err(EngineError::TurnCancelled);
        }
        self.phase_trace.push(phase);
        Ok(())
    }
}

fn record(result: &StepResult) -> ToolCallRecord {
    ToolCallRecord {
        step_id: result.step_id.clone(),
        tool_name: result.tool_name.clone(),
        succeeded: result.is_success(),
        duration_ms: result.duration_ms,
    }
}
