//! Ollama Reasoner
//!
//! Talks to a local Ollama server, typically at http://localhost:11434, over
//! its non-streaming `/api/chat` endpoint. The tool catalog is rendered into
//! a system message; the reply text goes through `parse_reasoner_output`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_reasoner_output, LLMError, Message, Reasoner, ReasonerReply, Result};
use crate::config::ReasonerConfig;
use crate::tools::ToolSpec;

/// Ollama reasoner configuration
#[derive(Debug, Clone)]
pub struct OllamaReasoner {
    /// Base URL for Ollama API (typically http://localhost:11434)
    base_url: String,

    /// Model name to use (e.g., "llama3.1:8b")
    model: String,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaReasoner {
    /// Create a new Ollama reasoner
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "llama3.1:8b")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }

    /// Build a reasoner from the `[reasoner]` config section
    pub fn from_config(config: &ReasonerConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Convert our Message format to Ollama's format, prepending the tool
    /// catalog when tools are offered.
    fn convert_messages(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Vec<OllamaMessage> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        if let Some(tools) = tools {
            out.push(OllamaMessage {
                role: "system".to_string(),
                content: render_tool_catalog(tools),
            });
        }
        out.extend(messages.iter().map(|msg| OllamaMessage {
            role: msg.role.to_string(),
            content: msg.content.clone(),
        }));
        out
    }
}

/// Render the tool catalog and the expected plan format as prompt text.
fn render_tool_catalog(tools: &[ToolSpec]) -> String {
    let mut text = String::from("Available tools:\n");
    for tool in tools {
        text.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }
    text.push_str(
        "\nTo use tools, reply with JSON only: {\"reasoning\": \"...\", \"steps\": \
         [{\"id\": \"step_1\", \"tool\": \"<name>\", \"input\": {...}, \"depends_on\": [], \
         \"requires_verification\": false}]}\nOtherwise reply with plain text.",
    );
    text
}

#[async_trait]
impl Reasoner for OllamaReasoner {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ReasonerReply> {
        let ollama_messages = self.convert_messages(messages, tools);

        tracing::debug!(
            "Ollama request: model={}, messages={}, total_chars={}",
            self.model,
            ollama_messages.len(),
            ollama_messages
                .iter()
                .map(|m| m.content.len())
                .sum::<usize>()
        );

        let request = OllamaRequest {
            model: self.model.clone(),
            messages: ollama_messages,
            stream: false,
        };

        let url = format!("{}/api/chat", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else if e.is_connect() {
                    LLMError::ProviderUnavailable(format!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.base_url
                    ))
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        tracing::info!(
            "Ollama response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::ProviderUnavailable(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("Failed to parse Ollama response: {}", e)))?;

        let content = ollama_response.message.content;
        if tools.is_none() {
            return Ok(ReasonerReply::text(content.trim()));
        }
        Ok(parse_reasoner_output(&content))
    }
}

/// Ollama API request format
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Ollama API response format
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}
