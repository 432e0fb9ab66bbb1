//! Warden Engine Library
//!
//! This library provides the core functionality of the Warden engine.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Reasoner abstraction layer
pub mod llm;

/// Agent loop core module
pub mod agent;

/// Conductor orchestration module
pub mod conductor;

/// Trust cache and presentation policy
pub mod trust;

/// Tool registry and built-in trust tools
pub mod tools;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

#[cfg(test)]
mod testing;

pub use agent::{AgentLoop, Phase};
pub use conductor::{AgentOutput, SessionMemory, TrustAnnotation};
