//! Test doubles shared by the unit tests

use async_trait::async_trait;
use sdk::{
    Confidence, EngineError, IdentityScores, ToolExecutor, TrustEdge, TrustOracle, TrustReport,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::llm::{LLMError, Message, Reasoner, ReasonerReply};
use crate::tools::ToolSpec;

/// Oracle answering from fixed tables; unknown targets have no path.
#[derive(Default)]
pub struct StaticOracle {
    reports: HashMap<String, TrustReport>,
    scores: HashMap<String, IdentityScores>,
    edges: HashMap<String, Vec<TrustEdge>>,
    failing: bool,
    assess_calls: AtomicUsize,
    score_calls: AtomicUsize,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-hop path to `target` with a weight matching `confidence`
    pub fn with_path(self, target: &str, confidence: Confidence) -> Self {
        let (depth, weight) = match confidence {
            Confidence::High => (1, 0.9),
            Confidence::Medium => (2, 0.6),
            Confidence::Low => (3, 0.3),
            Confidence::None => (0, 0.0),
        };
        let path = if confidence == Confidence::None {
            Vec::new()
        } else {
            vec![target.to_string()]
        };
        self.with_report(
            target,
            TrustReport {
                confidence,
                trust_weight: weight,
                path,
                depth,
            },
        )
    }

    pub fn with_report(mut self, target: &str, report: TrustReport) -> Self {
        self.reports.insert(target.to_string(), report);
        self
    }

    pub fn with_scores(mut self, scores: IdentityScores) -> Self {
        self.scores.insert(scores.identity.clone(), scores);
        self
    }

    pub fn with_edges(mut self, root: &str, edges: Vec<TrustEdge>) -> Self {
        self.edges.insert(root.to_string(), edges);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn assess_calls(&self) -> usize {
        self.assess_calls.load(Ordering::SeqCst)
    }

    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.failing {
            return Err(EngineError::TrustOracle("graph unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TrustOracle for StaticOracle {
    async fn assess(
        &self,
        _origin: &str,
        target: &str,
        _dimension: &str,
    ) -> Result<TrustReport, EngineError> {
        self.assess_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .reports
            .get(target)
            .cloned()
            .unwrap_or_else(TrustReport::no_path))
    }

    async fn read_scores(&self, identity: &str) -> Result<Option<IdentityScores>, EngineError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.scores.get(identity).cloned())
    }

    async fn query_graph(
        &self,
        root: &str,
        _dimension: &str,
        _max_depth: u32,
    ) -> Result<Vec<TrustEdge>, EngineError> {
        self.check()?;
        Ok(self.edges.get(root).cloned().unwrap_or_default())
    }
}

/// Reasoner replaying queued replies, then a fallback.
pub struct ScriptedReasoner {
    replies: Mutex<VecDeque<Result<ReasonerReply, LLMError>>>,
    fallback: ReasonerReply,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedReasoner {
    pub fn new(replies: Vec<ReasonerReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            fallback: ReasonerReply::text("done"),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fallback(mut self, reply: ReasonerReply) -> Self {
        self.fallback = reply;
        self
    }

    pub fn then_fail(self, err: LLMError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages of every call so far
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolSpec]>,
    ) -> Result<ReasonerReply, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Executor answering from a table, with optional per-tool delays.
#[derive(Default)]
pub struct TableExecutor {
    outputs: HashMap<String, Result<String, String>>,
    delays: HashMap<String, Duration>,
    order: Mutex<Vec<String>>,
}

impl TableExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, tool: &str, output: &str) -> Self {
        self.outputs.insert(tool.to_string(), Ok(output.to_string()));
        self
    }

    pub fn err(mut self, tool: &str, error: &str) -> Self {
        self.outputs.insert(tool.to_string(), Err(error.to_string()));
        self
    }

    pub fn delay(mut self, tool: &str, delay: Duration) -> Self {
        self.delays.insert(tool.to_string(), delay);
        self
    }

    /// Tools in the order their calls finished
    pub fn finished(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for TableExecutor {
    async fn call(
        &self,
        tool_name: &str,
        _input: &serde_json::Value,
    ) -> Result<String, EngineError> {
        if let Some(delay) = self.delays.get(tool_name) {
            tokio::time::sleep(*delay).await;
        }
        self.order.lock().unwrap().push(tool_name.to_string());
        match self.outputs.get(tool_name) {
            Some(Ok(out)) => Ok(out.clone()),
            Some(Err(e)) => Err(EngineError::ToolError(e.clone())),
            None => Err(EngineError::ToolNotFound(tool_name.to_string())),
        }
    }
}
