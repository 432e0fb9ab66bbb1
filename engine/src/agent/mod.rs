//! Agent Loop
//!
//! Runs user turns through the conductor stages and keeps the session's
//! memory up to date.

pub mod core;

pub use core::{AgentLoop, Phase, DEGRADED_RESPONSE};
