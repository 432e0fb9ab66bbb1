//! Trust gate
//!
//! Memoized front of the `TrustOracle`. Every lookup goes through the session
//! caches first; the oracle is only called on a miss, and only successful
//! answers are stored.

use sdk::{EngineError, IdentityScores, TrustEdge, TrustOracle};
use std::sync::Arc;
use tracing::{debug, info};

use super::policy::map_confidence;
use crate::conductor::memory::{SessionMemory, TrustKey};
use crate::conductor::types::StepVerification;

#[derive(Clone)]
pub struct TrustGate {
    oracle: Arc<dyn TrustOracle>,
}

impl TrustGate {
    pub fn new(oracle: Arc<dyn TrustOracle>) -> Self {
        Self { oracle }
    }

    /// Assess `target` from `origin` along `dimension`.
    ///
    /// A cache hit is returned re-stamped with `step_id`. On a miss the
    /// oracle's report goes through the presentation policy and the result is
    /// cached with a fresh expiry.
    pub async fn assess(
        &self,
        origin: &str,
        target: &str,
        dimension: &str,
        step_id: &str,
        memory: &SessionMemory,
    ) -> Result<StepVerification, EngineError> {
        let key = TrustKey::new(origin, target, dimension);

        if let Some(mut cached) = memory.trust_cache().get(&key) {
            debug!("Trust cache hit: {} -> {} ({})", origin, target, dimension);
            cached.step_id = step_id.to_string();
            return Ok(cached);
        }

        let report = self.oracle.assess(origin, target, dimension).await?;
        let (action, caveat) = map_confidence(&report);
        info!(
            "Assessed {} -> {} ({}): {} / {}",
            origin, target, dimension, report.confidence, action
        );

        let verification = StepVerification {
            step_id: step_id.to_string(),
            target: target.to_string(),
            dimension: dimension.to_string(),
            action,
            confidence: report.confidence,
            trust_weight: report.trust_weight,
            path: report.path,
            caveat,
        };
        memory.trust_cache().insert(key, verification.clone());
        Ok(verification)
    }

    /// Score record of `identity`; an identity with no record gets the empty
    /// result, which is not cached.
    pub async fn scores(
        &self,
        identity: &str,
        memory: &SessionMemory,
    ) -> Result<IdentityScores, EngineError> {
        let key = identity.to_string();
        if let Some(cached) = memory.score_cache().get(&key) {
            debug!("Score cache hit: {}", identity);
            return Ok(cached);
        }

        match self.oracle.read_scores(identity).await? {
            Some(scores) => {
                memory.score_cache().insert(key, scores.clone());
                Ok(scores)
            }
            None => {
                debug!("No score record for {}", identity);
                Ok(IdentityScores::empty(identity))
            }
        }
    }

    /// Uncached graph walk used by the `trust_graph_query` built-in
    pub async fn query_graph(
        &self,
        root: &str,
        dimension: &str,
        max_depth: u32,
    ) -> Result<Vec<TrustEdge>, EngineError> {
        self.oracle.query_graph(root, dimension, max_depth).await
    }
}
