//! Braid — the constraint compiler. Takes a flat `Constraints[]`
//! and produces a `ConstraintIR` through five fixed phases: intake &
//! grouping, dependency graph, conflict resolution, per-artifact
//! compilation, finalization.

pub mod artifacts;
pub mod conflict;
pub mod diagnostics;
pub mod graph;

use std::time::Duration;

use crate::error::{AnankeError, Result};
use crate::model::{Constraint, ConstraintIR, Enforcement, Hole, HoleOrigin, HoleScale};
use crate::validator;

pub use conflict::{ConflictDecision, ConflictResolver};
pub use diagnostics::Diagnostics;

#[derive(Debug, Clone)]
pub struct BraidConfig {
    /// Deadline handed to the conflict-resolver oracle, mirroring Clew's
    /// semantic-oracle timeout.
    pub resolver_timeout: Duration,
}

impl Default for BraidConfig {
    fn default() -> Self {
        Self {
            resolver_timeout: Duration::from_secs(5),
        }
    }
}

/// Everything one `compile` call produces: the IR itself, the
/// diagnostics sidecar, and any holes left for a downstream refiner.
#[derive(Debug, Clone)]
pub struct BraidOutput {
    pub ir: ConstraintIR,
    pub diagnostics: Diagnostics,
    pub holes: Vec<Hole>,
}

pub struct Braid {
    config: BraidConfig,
    resolver: Option<Box<dyn ConflictResolver>>,
}

impl Braid {
    pub fn new(config: BraidConfig) -> Self {
        Self { config, resolver: None }
    }

    pub fn set_conflict_resolver(&mut self, resolver: Option<Box<dyn ConflictResolver>>) {
        self.resolver = resolver;
    }

    /// Runs the full five-phase compile pipeline. Empty input
    /// yields an empty IR with `priority = 0` and no error; an
    /// input that is non-empty but wholly invalid is `InvalidConstraint`.
    pub async fn compile(&self, constraints: Vec<Constraint>) -> Result<BraidOutput> {
        if constraints.is_empty() {
            return Ok(BraidOutput {
                ir: ConstraintIR::empty("empty"),
                diagnostics: Diagnostics::default(),
                holes: Vec::new(),
            });
        }

        let mut diagnostics = Diagnostics::default();

        // Phase 1: intake & grouping.
        let mut valid = Vec::with_capacity(constraints.len());
        for c in constraints {
            match validator::validate_constraint(&c) {
                Ok(()) => valid.push(c),
                Err(failure) => diagnostics.record_dropped(c.id, failure.to_string()),
            }
        }
        if valid.is_empty() {
            return Err(AnankeError::InvalidConstraint);
        }

        // Phase 2: dependency graph, cycles broken deterministically.
        let ordering = graph::topological_order(&valid);
        diagnostics.record_broken_edges(ordering.broken_edges.clone());

        // Phase 3: conflict detection & resolution.
        let (survivors, conflict_records) =
            conflict::resolve_conflicts(valid, self.resolver.as_deref(), self.config.resolver_timeout).await;
        let surviving_ids: std::collections::HashSet<u64> = survivors.iter().map(|c| c.id).collect();
        diagnostics.record_conflicts(conflict_records);

        // A survivor whose declared dependency didn't survive is
        // under-determined: its compiled meaning depends on a constraint
        // Braid could not keep. Emit a Hole rather than silently
        // pretending the dependency was satisfied.
        let mut holes = Vec::new();
        let mut next_hole_id = 1u64;
        for c in &survivors {
            for &dep in &c.depends_on {
                if ordering.order.contains(&dep) && !surviving_ids.contains(&dep) {
                    holes.push(Hole::new(next_hole_id, HoleScale::Statement, HoleOrigin::UnresolvedConflict, c.name.clone()));
                    next_hole_id += 1;
                    break;
                }
            }
        }

        // Phase 4: per-artifact compilation, bucketed by enforcement.
        let syntactic: Vec<Constraint> = survivors.iter().filter(|c| c.enforcement == Enforcement::Syntactic).cloned().collect();
        let structural: Vec<Constraint> = survivors.iter().filter(|c| c.enforcement == Enforcement::Structural).cloned().collect();
        let semantic: Vec<Constraint> = survivors.iter().filter(|c| c.enforcement == Enforcement::Semantic).cloned().collect();
        let mask_bucket: Vec<Constraint> = survivors
            .iter()
            .filter(|c| matches!(c.enforcement, Enforcement::Performance | Enforcement::Security))
            .cloned()
            .collect();

        let grammar = artifacts::grammar::compile_grammar(&syntactic);
        let json_schema = artifacts::schema::compile_schema(&structural);
        let regex_patterns = artifacts::regex::compile_regex_patterns(&semantic);
        let token_mask_outcome = artifacts::token_mask::compile_token_masks(&mask_bucket);
        diagnostics.record_token_overlaps(token_mask_outcome.forced_forbidden);

        let priority = survivors.iter().map(|c| c.priority.as_ordinal()).max().unwrap_or(0);

        let ir = ConstraintIR {
            name: "compiled".to_string(),
            json_schema,
            grammar,
            regex_patterns,
            token_masks: token_mask_outcome.masks,
            priority,
        };

        // Phase 5: finalization — re-check the invariants Braid itself
        // must uphold; a violation here is always a Braid bug.
        if let Err(violation) = ir.check_invariants() {
            return Err(AnankeError::CompilerInvariantViolation(violation));
        }

        Ok(BraidOutput { ir, diagnostics, holes })
    }
}

impl Default for Braid {
    fn default() -> Self {
        Self::new(BraidConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Priority, Severity};

    fn syntactic(id: u64, name: &str) -> Constraint {
        Constraint::new(id, name, "d", ConstraintKind::Syntactic, Enforcement::Syntactic)
    }

    #[tokio::test]
    async fn empty_input_yields_empty_ir_never_an_error() {
        let braid = Braid::default();
        let output = braid.compile(vec![]).await.unwrap();
        assert!(output.ir.grammar.is_none());
        assert!(output.ir.json_schema.is_none());
        assert!(output.ir.regex_patterns.is_empty());
        assert!(output.ir.token_masks.is_none());
        assert_eq!(output.ir.priority, 0);
    }

    #[tokio::test]
    async fn wholly_invalid_input_is_an_error() {
        let mut bad = syntactic(1, "x");
        bad.name = "".to_string();
        let braid = Braid::default();
        let err = braid.compile(vec![bad]).await.unwrap_err();
        assert!(matches!(err, AnankeError::InvalidConstraint));
    }

    #[tokio::test]
    async fn invalid_mixed_with_valid_drops_only_the_invalid_one() {
        let mut bad = syntactic(1, "x");
        bad.name = "".to_string();
        let good = syntactic(2, "use_camel_case");
        let braid = Braid::default();
        let output = braid.compile(vec![bad, good]).await.unwrap();
        assert!(output.ir.grammar.is_some());
        assert_eq!(output.diagnostics.events.len(), 1);
    }

    #[tokio::test]
    async fn single_syntactic_constraint_compiles_to_a_grammar() {
        let mut c = syntactic(1, "use_camel_case");
        c.priority = Priority::High;
        c.severity = Severity::Error;
        let braid = Braid::default();
        let output = braid.compile(vec![c]).await.unwrap();
        assert!(output.ir.grammar.is_some());
        assert_eq!(output.ir.priority, Priority::High.as_ordinal());
    }

    #[tokio::test]
    async fn dependency_on_a_disabled_constraint_leaves_a_hole() {
        let mut upstream = Constraint::new(
            1,
            "token_rule_1",
            "allow token 5 during generation",
            ConstraintKind::Security,
            Enforcement::Security,
        );
        upstream.priority = Priority::Low;
        let mut conflicting = Constraint::new(
            2,
            "token_rule_2",
            "forbid token 5 during generation",
            ConstraintKind::Security,
            Enforcement::Security,
        );
        conflicting.priority = Priority::High;

        let mut dependent = syntactic(3, "depends_on_upstream");
        dependent.depends_on = vec![1];

        let braid = Braid::default();
        let output = braid.compile(vec![upstream, conflicting, dependent]).await.unwrap();
        assert_eq!(output.holes.len(), 1);
        assert_eq!(output.holes[0].provenance, "depends_on_upstream");
    }
}
