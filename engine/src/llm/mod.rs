//! Reasoner Abstraction Layer
//!
//! The reasoner is the external step that turns a conversation into either a
//! set of tool invocations (a plan) or plain response text. The engine never
//! retries it and never inspects how it reaches its answer; the `Reasoner`
//! trait is the whole contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tools::ToolSpec;

pub mod ollama;

/// Result type for reasoner operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during reasoner calls
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LLMError> for sdk::errors::EngineError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::Timeout => sdk::errors::EngineError::ReasonerTimeout,
            other => sdk::errors::EngineError::Reasoner(other.to_string()),
        }
    }
}

/// Message in a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// One tool the reasoner wants run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Step id; assigned by the planner when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the tool to call
    #[serde(alias = "function")]
    pub tool: String,

    /// Tool input
    #[serde(default, alias = "arguments", alias = "args")]
    pub input: serde_json::Value,

    /// Ids of invocations whose results this one needs
    #[serde(default, alias = "dependencies")]
    pub depends_on: Vec<String>,

    /// Whether identities in this invocation's output must be trust-checked
    #[serde(default)]
    pub requires_verification: bool,
}

impl ToolInvocation {
    /// Create a new invocation with no id and no dependencies
    pub fn new(tool: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id: None,
            tool: tool.into(),
            input,
            depends_on: Vec::new(),
            requires_verification: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.depends_on = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn verified(mut self) -> Self {
        self.requires_verification = true;
        self
    }
}

/// Reply from a reasoner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReasonerReply {
    /// The reasoner selected tools to run
    ToolInvocations {
        invocations: Vec<ToolInvocation>,
        #[serde(default)]
        reasoning: String,
    },

    /// The reasoner answered with text only
    Text { content: String },
}

impl ReasonerReply {
    pub fn text(content: impl Into<String>) -> Self {
        ReasonerReply::Text {
            content: content.into(),
        }
    }

    pub fn invocations(invocations: Vec<ToolInvocation>) -> Self {
        ReasonerReply::ToolInvocations {
            invocations,
            reasoning: String::new(),
        }
    }
}

/// Reasoner trait that all backends must implement
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Returns the name of the backend (e.g., "ollama")
    fn name(&self) -> &str;

    /// Complete a conversation
    ///
    /// # Arguments
    /// * `messages` - Conversation history including the system prompt
    /// * `tools` - Tools the reasoner may select; `None` asks for text only
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ReasonerReply>;
}

/// Plan envelope some backends wrap their invocations in
#[derive(Debug, Deserialize)]
struct PlanEnvelope {
    steps: Vec<ToolInvocation>,
    #[serde(default)]
    reasoning: String,
}

/// Parse raw reasoner text into a reply.
///
/// Handles multiple output formats:
/// 1. A plan object: `{"steps": [...], "reasoning": "..."}`
/// 2. A bare array of invocations: `[{"tool": "...", "input": {...}}]`
/// 3. A single call: `{"function": "...", "arguments": {...}}`
///
/// Each may be raw, inside a markdown fence, or embedded in prose. Anything
/// else is plain text.
pub fn parse_reasoner_output(content: &str) -> ReasonerReply {
    let trimmed = content.trim();

    let mut candidates: Vec<&str> = vec![trimmed];
    if let Some(inner) = extract_fenced_json(trimmed) {
        candidates.push(inner.trim());
    }
    if let Some(pos) = trimmed.find(['{', '[']) {
        if let Some(json_str) = extract_balanced_json(&trimmed[pos..]) {
            candidates.push(json_str);
        }
    }

    for candidate in candidates {
        if let Some(reply) = try_parse_invocations(candidate) {
            return reply;
        }
    }

    ReasonerReply::text(trimmed)
}

/// Try each known plan shape against a JSON candidate.
fn try_parse_invocations(s: &str) -> Option<ReasonerReply> {
    let value: serde_json::Value = serde_json::from_str(s).ok()?;

    if value.get("steps").is_some() {
        let envelope: PlanEnvelope = serde_json::from_value(value).ok()?;
        if envelope.steps.is_empty() {
            return None;
        }
        return Some(ReasonerReply::ToolInvocations {
            invocations: envelope.steps,
            reasoning: envelope.reasoning,
        });
    }

    if value.is_array() {
        let invocations: Vec<ToolInvocation> = serde_json::from_value(value).ok()?;
        if invocations.is_empty() {
            return None;
        }
        return Some(ReasonerReply::invocations(invocations));
    }

    if value.get("function").is_some() || value.get("tool").is_some() {
        let invocation: ToolInvocation = serde_json::from_value(value).ok()?;
        if invocation.tool.is_empty() {
            return None;
        }
        return Some(ReasonerReply::invocations(vec![invocation]));
    }

    None
}

/// Extract the body of the first markdown code fence in the text.
///
/// Works even when there is trailing prose after the closing ```.
/// Returns `None` if no fenced block is found.
pub(crate) fn extract_fenced_json(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

/// Extract a balanced JSON object or array starting at position 0 of `s`.
///
/// Counts bracket depth, respecting string literals, to find the matching
/// close bracket.
pub(crate) fn extract_balanced_json(s: &str) -> Option<&str> {
    let (open, close) = match s.chars().next()? {
        '{' => ('{', '}'),
        '[' => ('[', ']'),
        _ => return None,
    };
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
