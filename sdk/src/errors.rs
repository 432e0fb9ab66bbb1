//! Error types and handling
//!
//! This module provides the error types used throughout the Warden engine.
//! All errors implement the `WardenErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Most failures inside a turn never surface as an `EngineError`: a failed tool
//! call is folded into its step result, and a missing trust path is a policy
//! outcome. The variants below cover what is left over.

use thiserror::Error;

/// Trait for Warden error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait WardenErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// identities, tool inputs, or backend addresses.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried by the caller. Non-recoverable
    /// errors typically require a configuration change.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, WardenErrorExt};
///
/// let error = EngineError::ToolNotFound("weather".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Config("bad ttl".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Reasoner errors
    #[error("Reasoner error: {0}")]
    Reasoner(String),

    #[error("Reasoner call timed out")]
    ReasonerTimeout,

    // Plan errors
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    // Tool errors
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    // Trust oracle errors
    #[error("Trust oracle error: {0}")]
    TrustOracle(String),

    // Turn lifecycle errors
    #[error("Turn cancelled")]
    TurnCancelled,

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WardenErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::Reasoner(_) => "Reasoner unavailable. Check the backend and your network",
            Self::ReasonerTimeout => "Reasoner took too long to respond. Try again",

            Self::InvalidPlan(_) => "The plan is malformed. Check its step ids",

            Self::ToolNotFound(_) => "The requested tool is not available",
            Self::ToolError(_) => "Tool operation failed",
            Self::InvalidToolInput(_) => "The tool was called with invalid arguments",

            Self::TrustOracle(_) => "Trust data is temporarily unavailable",

            Self::TurnCancelled => "The request was cancelled",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

impl From<crate::types::ToolError> for EngineError {
    fn from(err: crate::types::ToolError) -> Self {
        EngineError::InvalidToolInput(err.to_string())
    }
}
