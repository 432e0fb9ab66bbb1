//! Warden SDK
//!
//! Shared library providing the capability traits, value types and errors
//! used between the Warden engine and its backends.

/// Error types and handling
pub mod errors;

/// Tool executor capability
pub mod executor;

/// Trust oracle capability
pub mod trust;

/// Tool input types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, WardenErrorExt};
pub use executor::{NoopExecutor, ToolExecutor};
pub use trust::{Confidence, IdentityScores, TrustEdge, TrustOracle, TrustReport};
pub use types::{ToolError, ToolInput};
