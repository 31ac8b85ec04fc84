//! The optional semantic oracle: an async
//! capability interface Clew calls with the full source and the
//! constraints gathered so far. Its absence is a valid configuration —
//! callers that don't install one get a no-op implementation, never a
//! null-checked special case threaded through the extraction pipeline.

use std::time::Duration;

use crate::model::{Constraint, ConstraintSet};

/// Outcome of an oracle call.
pub enum OracleOutcome {
    /// Zero or more candidate constraints. Each is still re-validated by
    /// the caller before being merged.
    Candidates(Vec<Constraint>),
    /// The oracle declined or could not produce anything useful this call.
    NoAdditionalData,
}

/// A best-effort, asynchronous collaborator that can enrich a
/// `ConstraintSet` with semantic constraints an AST-only recognizer can't
/// see. Failure or timeout downgrades to [`OracleOutcome::NoAdditionalData`],
/// never a pipeline error.
#[async_trait::async_trait]
pub trait SemanticOracle: Send + Sync {
    async fn enrich(
        &self,
        source: &str,
        gathered_so_far: &ConstraintSet,
        deadline: Duration,
    ) -> OracleOutcome;
}

/// The default, installed when no oracle is configured.
pub struct NoopOracle;

#[async_trait::async_trait]
impl SemanticOracle for NoopOracle {
    async fn enrich(
        &self,
        _source: &str,
        _gathered_so_far: &ConstraintSet,
        _deadline: Duration,
    ) -> OracleOutcome {
        OracleOutcome::NoAdditionalData
    }
}

/// Runs `oracle.enrich` under the given deadline, collapsing a timeout to
/// [`OracleOutcome::NoAdditionalData`] exactly like an oracle-reported
/// failure would.
pub async fn enrich_with_timeout(
    oracle: &dyn SemanticOracle,
    source: &str,
    gathered_so_far: &ConstraintSet,
    deadline: Duration,
) -> OracleOutcome {
    match tokio::time::timeout(deadline, oracle.enrich(source, gathered_so_far, deadline)).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => {
            tracing::debug!("semantic oracle timed out after {:?}", deadline);
            OracleOutcome::NoAdditionalData
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_oracle_never_adds_constraints() {
        let set = ConstraintSet::new("s");
        let outcome = NoopOracle.enrich("fn f() {}", &set, Duration::from_millis(10)).await;
        assert!(matches!(outcome, OracleOutcome::NoAdditionalData));
    }

    struct SlowOracle;

    #[async_trait::async_trait]
    impl SemanticOracle for SlowOracle {
        async fn enrich(
            &self,
            _source: &str,
            _gathered_so_far: &ConstraintSet,
            _deadline: Duration,
        ) -> OracleOutcome {
            tokio::time::sleep(Duration::from_secs(5)).await;
            OracleOutcome::Candidates(vec![])
        }
    }

    #[tokio::test]
    async fn oracle_timeout_downgrades_to_no_additional_data() {
        let set = ConstraintSet::new("s");
        let outcome =
            enrich_with_timeout(&SlowOracle, "src", &set, Duration::from_millis(5)).await;
        assert!(matches!(outcome, OracleOutcome::NoAdditionalData));
    }
}
