//! Trust gating
//!
//! Cached trust assessments and the policy that decides how gated data is
//! presented.

pub mod gate;
pub mod policy;

pub use gate::TrustGate;
pub use policy::{map_confidence, PresentationAction};
