//! Shared doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sdk::{
    Confidence, EngineError, IdentityScores, ToolExecutor, TrustEdge, TrustOracle, TrustReport,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use warden_engine::config::Config;
use warden_engine::llm::{LLMError, Message, Reasoner, ReasonerReply};
use warden_engine::tools::ToolSpec;

pub const ME: &str = "did:key:me";

/// Default config with `origin` as the session identity
pub fn config(origin: &str) -> Config {
    let mut config = Config::default();
    config.agent.origin_identity = origin.to_string();
    config
}

/// Oracle answering from fixed tables
#[derive(Default)]
pub struct MockOracle {
    reports: HashMap<String, TrustReport>,
    scores: HashMap<String, IdentityScores>,
    edges: HashMap<String, Vec<TrustEdge>>,
    assess_calls: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence(self, target: &str, confidence: Confidence) -> Self {
        let (depth, weight, path) = match confidence {
            Confidence::High => (1, 0.9, vec![target.to_string()]),
            Confidence::Medium => (2, 0.6, vec![target.to_string()]),
            Confidence::Low => (3, 0.3, vec![target.to_string()]),
            Confidence::None => (0, 0.0, Vec::new()),
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

    pub fn assess_calls(&self) -> usize {
        self.assess_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrustOracle for MockOracle {
    async fn assess(
        &self,
        _origin: &str,
        target: &str,
        _dimension: &str,
    ) -> Result<TrustReport, EngineError> {
        self.assess_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .reports
            .get(target)
            .cloned()
            .unwrap_or_else(TrustReport::no_path))
    }

    async fn read_scores(&self, identity: &str) -> Result<Option<IdentityScores>, EngineError> {
        Ok(self.scores.get(identity).cloned())
    }

    async fn query_graph(
        &self,
        root: &str,
        _dimension: &str,
        _max_depth: u32,
    ) -> Result<Vec<TrustEdge>, EngineError> {
        Ok(self.edges.get(root).cloned().unwrap_or_default())
    }
}

/// Reasoner replaying queued replies, then repeating a fallback
pub struct MockReasoner {
    replies: Mutex<VecDeque<Result<ReasonerReply, LLMError>>>,
    fallback: ReasonerReply,
    calls: AtomicUsize,
}

impl MockReasoner {
    pub fn new(replies: Vec<ReasonerReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            fallback: ReasonerReply::text("done"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fallback(mut self, reply: ReasonerReply) -> Self {
        self.fallback = reply;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reasoner for MockReasoner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolSpec]>,
    ) -> Result<ReasonerReply, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Executor answering from a fixed tool → output table
#[derive(Default)]
pub struct MockExecutor {
    outputs: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, tool: &str, output: &str) -> Self {
        self.outputs.insert(tool.to_string(), output.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolExecutor for MockExecutor {
    async fn call(
        &self,
        tool_name: &str,
        _input: &serde_json::Value,
    ) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .get(tool_name)
            .cloned()
            .ok_or_else(|| EngineError::ToolNotFound(tool_name.to_string()))
    }
}
