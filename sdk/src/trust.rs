//! Trust oracle capability and its value types
//!
//! The trust oracle walks the identity trust graph. Warden never computes
//! confidence itself; it only caches and interprets what the oracle reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::EngineError;

/// How well-substantiated a trust relationship is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
            Confidence::None => write!(f, "none"),
        }
    }
}

/// Raw result of a pairwise trust assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustReport {
    pub confidence: Confidence,

    /// Aggregate weight of the best path, 0.0 when no path exists
    pub trust_weight: f64,

    /// Identities along the best path, origin excluded
    pub path: Vec<String>,

    /// Number of hops in the best path
    pub depth: u32,
}

impl TrustReport {
    /// Report for a pair with no connecting path
    pub fn no_path() -> Self {
        Self {
            confidence: Confidence::None,
            trust_weight: 0.0,
            path: Vec::new(),
            depth: 0,
        }
    }
}

/// Per-identity reputation scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityScores {
    pub identity: String,

    /// Score per trust dimension
    pub scores: BTreeMap<String, f64>,

    pub tier: u8,
}

impl IdentityScores {
    /// The defined result for an identity with no record: no scores, tier zero
    pub fn empty(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            scores: BTreeMap::new(),
            tier: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.tier == 0
    }
}

/// A single attestation edge in the trust graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEdge {
    pub from: String,
    pub to: String,
    pub dimension: String,
    pub weight: f64,
}

/// Trust graph backend
#[async_trait]
pub trait TrustOracle: Send + Sync {
    /// Assess how much `origin` can trust `target` along `dimension`
    async fn assess(
        &self,
        origin: &str,
        target: &str,
        dimension: &str,
    ) -> Result<TrustReport, EngineError>;

    /// Read the score record of an identity, `None` if it has none
    async fn read_scores(&self, identity: &str) -> Result<Option<IdentityScores>, EngineError>;

    /// Edges reachable from `root` within `max_depth` hops
    async fn query_graph(
        &self,
        root: &str,
        dimension: &str,
        max_depth: u32,
    ) -> Result<Vec<TrustEdge>, EngineError>;
}
