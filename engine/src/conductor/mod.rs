//! Conductor System
//!
//! The stages of one turn: planning, dependency-level synthesis, trust
//! verification and composition, plus the session state they share.

pub mod cache;
pub mod executor;
pub mod memory;
pub mod planner;
pub mod scheduler;
pub mod types;
pub mod verifier;

pub use executor::Executor;
pub use memory::{SessionMemory, ToolCallRecord, TrustKey};
pub use planner::Planner;
pub use scheduler::{execution_levels, Scheduler};
pub use types::{
    AgentOutput, Plan, PlanStep, StepOutcome, StepResult, StepVerification, TrustAnnotation,
    TurnEvidence, VerificationResult,
};
pub use verifier::Verifier;
