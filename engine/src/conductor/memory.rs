//! Session Memory
//!
//! Per-conversation state: message history, the trust and score caches, and
//! a ring of recent tool calls. Created when a conversation starts and dropped
//! with it.
//!
//! History and tool-call records are only changed through `&mut self`, by the
//! turn that owns the session. The caches take `&self` so built-in steps
//! running concurrently within one level can share them.

use sdk::IdentityScores;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::conductor::cache::TtlCache;
use crate::conductor::types::StepVerification;
use crate::config::MemoryConfig;
use crate::llm::{Message, MessageRole};

/// Cache key of a pairwise trust assessment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrustKey {
    pub origin: String,
    pub target: String,
    pub dimension: String,
}

impl TrustKey {
    pub fn new(origin: &str, target: &str, dimension: &str) -> Self {
        Self {
            origin: origin.to_string(),
            target: target.to_string(),
            dimension: dimension.to_string(),
        }
    }
}

/// One executed tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub step_id: String,
    pub tool_name: String,
    pub succeeded: bool,
    pub duration_ms: u64,
}

#[derive(Debug)]
pub struct SessionMemory {
    session_id: String,
    messages: Vec<Message>,
    max_history_messages: usize,
    tool_calls: VecDeque<ToolCallRecord>,
    max_tool_calls: usize,
    trust_cache: TtlCache<TrustKey, StepVerification>,
    score_cache: TtlCache<String, IdentityScores>,
}

impl SessionMemory {
    /// Create an empty session whose caches expire entries after `cache_ttl`
    pub fn new(config: &MemoryConfig, cache_ttl: Duration) -> Self {
        let session_id = Uuid::new_v4().to_string();
        debug!("Starting session {}", session_id);
        Self {
            session_id,
            messages: Vec::new(),
            max_history_messages: config.max_history_messages,
            tool_calls: VecDeque::new(),
            max_tool_calls: config.max_tool_calls,
            trust_cache: TtlCache::new(cache_ttl, config.max_cache_entries),
            score_cache: TtlCache::new(cache_ttl, config.max_cache_entries),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append a message without trimming
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a user message
    pub fn add_user(&mut self, content: &str) {
        self.push_message(Message::user(content));
    }

    /// Append an assistant message
    pub fn add_assistant(&mut self, content: &str) {
        self.push_message(Message::assistant(content));
    }

    /// Retrieve all retained messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Drop old messages down to the history bound.
    ///
    /// The first retained message is always user-authored: leading assistant
    /// or system messages left behind by the cut are dropped too.
    pub fn trim_history(&mut self) {
        let mut drop = self.messages.len().saturating_sub(self.max_history_messages);
        while drop < self.messages.len() && self.messages[drop].role != MessageRole::User {
            drop += 1;
        }
        if drop > 0 {
            debug!("Trimming {} messages from session history", drop);
            self.messages.drain(..drop);
        }
    }

    /// Record a finished tool call, dropping the oldest past the bound
    pub fn record_tool_call(&mut self, record: ToolCallRecord) {
        self.tool_calls.push_back(record);
        while self.tool_calls.len() > self.max_tool_calls {
            self.tool_calls.pop_front();
        }
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.tool_calls.iter()
    }

    pub fn trust_cache(&self) -> &TtlCache<TrustKey, StepVerification> {
        &self.trust_cache
    }

    pub fn score_cache(&self) -> &TtlCache<String, IdentityScores> {
        &self.score_cache
    }

    /// Clear history, tool calls and caches
    pub fn clear(&mut self) {
        self.messages.clear();
        self.tool_calls.clear();
        self.trust_cache.clear();
        self.score_cache.clear();
    }
}
