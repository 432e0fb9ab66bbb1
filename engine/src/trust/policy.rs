//! Presentation policy
//!
//! Turns the oracle's confidence into what the user gets to see. The mapping
//! is total and has no side effects.

use sdk::{Confidence, TrustReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether and how trust-gated data is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationAction {
    Present,
    PresentWithCaveat,
    Warn,
    Omit,
}

impl fmt::Display for PresentationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationAction::Present => write!(f, "present"),
            PresentationAction::PresentWithCaveat => write!(f, "present_with_caveat"),
            PresentationAction::Warn => write!(f, "warn"),
            PresentationAction::Omit => write!(f, "omit"),
        }
    }
}

pub const NO_PATH_CAVEAT: &str = "no trust path found; data omitted";

/// Map an oracle report to an action and its caveat text.
pub fn map_confidence(report: &TrustReport) -> (PresentationAction, Option<String>) {
    match report.confidence {
        Confidence::High => (PresentationAction::Present, None),
        Confidence::Medium => (
            PresentationAction::PresentWithCaveat,
            Some(format!(
                "path found ({} hops, weight {:.2}); may need independent verification",
                report.depth, report.trust_weight
            )),
        ),
        Confidence::Low => (
            PresentationAction::Warn,
            Some(format!(
                "weak path ({} hops, weight {:.2}); treat with caution",
                report.depth, report.trust_weight
            )),
        ),
        Confidence::None => (PresentationAction::Omit, Some(NO_PATH_CAVEAT.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(confidence: Confidence, depth: u32, weight: f64) -> TrustReport {
        TrustReport {
            confidence,
            trust_weight: weight,
            path: vec!["did:key:a".into()],
            depth,
        }
    }

    #[test]
    fn test_high_is_presented_without_caveat() {
        let (action, caveat) = map_confidence(&report(Confidence::High, 1, 0.95));
        assert_eq!(action, PresentationAction::Present);
        assert!(caveat.is_none());
    }

    #[test]
    fn test_medium_caveat_text() {
        let (action, caveat) = map_confidence(&report(Confidence::Medium, 2, 0.6));
        assert_eq!(action, PresentationAction::PresentWithCaveat);
        assert_eq!(
            caveat.as_deref(),
            Some("path found (2 hops, weight 0.60); may need independent verification")
        );
    }

    #[test]
    fn test_low_caveat_text() {
        let (action, caveat) = map_confidence(&report(Confidence::Low, 4, 0.126));
        assert_eq!(action, PresentationAction::Warn);
        assert_eq!(
            caveat.as_deref(),
            Some("weak path (4 hops, weight 0.13); treat with caution")
        );
    }

    #[test]
    fn test_none_is_omitted() {
        let (action, caveat) = map_confidence(&TrustReport::no_path());
        assert_eq!(action, PresentationAction::Omit);
        assert_eq!(caveat.as_deref(), Some(NO_PATH_CAVEAT));
    }

    #[test]
    fn test_mapping_is_deterministic() {
        for confidence in [
            Confidence::High,
            Confidence::Medium,
            Confidence::Low,
            Confidence::None,
        ] {
            let r = report(confidence, 3, 0.5);
            assert_eq!(map_confidence(&r), map_confidence(&r));
        }
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&PresentationAction::PresentWithCaveat).unwrap();
        assert_eq!(json, r#""present_with_caveat""#);
    }
}
