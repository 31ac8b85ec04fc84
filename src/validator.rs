//! The constraint validator. A pure helper shared by Clew (which
//! applies it before returning a `ConstraintSet`) and Braid (which applies
//! it again at intake, since a `ConstraintSet` may also arrive from
//! user-defined JSON that never passed through Clew).

use crate::model::{Constraint, ConstraintSet};

/// Why a constraint failed validation. Carried into diagnostics rather
/// than surfaced as an error — a single invalid constraint is a
/// partial-quality event, not a pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    EmptyName,
    EmptyDescription,
    ConfidenceOutOfRange,
    IncompatibleEnforcement,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::EmptyName => write!(f, "name is empty"),
            ValidationFailure::EmptyDescription => write!(f, "description is empty"),
            ValidationFailure::ConfidenceOutOfRange => {
                write!(f, "confidence is outside [0.0, 1.0]")
            }
            ValidationFailure::IncompatibleEnforcement => {
                write!(f, "enforcement is incompatible with kind")
            }
        }
    }
}

/// Validate a single constraint against its declared invariants. Returns the
/// first failure found; a constraint can fail more than one check but
/// callers only need to know it's invalid, not every reason.
pub fn validate_constraint(constraint: &Constraint) -> Result<(), ValidationFailure> {
    if constraint.name.trim().is_empty() {
        return Err(ValidationFailure::EmptyName);
    }
    if constraint.description.trim().is_empty() {
        return Err(ValidationFailure::EmptyDescription);
    }
    if !(0.0..=1.0).contains(&constraint.confidence) {
        return Err(ValidationFailure::ConfidenceOutOfRange);
    }
    if !constraint.kind.is_compatible_with(constraint.enforcement) {
        return Err(ValidationFailure::IncompatibleEnforcement);
    }
    Ok(())
}

pub fn is_valid(constraint: &Constraint) -> bool {
    validate_constraint(constraint).is_ok()
}

/// Removes every invalid constraint from `set` in place, returning the
/// count removed. Never removes a constraint that passes
/// `validate_constraint` (checked by `validator_monotonicity` below).
pub fn remove_invalid(set: &mut ConstraintSet) -> usize {
    let before = set.constraints.len();
    set.constraints.retain(|c| is_valid(c));
    before - set.constraints.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement};

    fn valid_constraint() -> Constraint {
        Constraint::new(
            1,
            "valid_name",
            "a description",
            ConstraintKind::Syntactic,
            Enforcement::Syntactic,
        )
    }

    #[test]
    fn rejects_empty_name() {
        let mut c = valid_constraint();
        c.name = "".to_string();
        assert_eq!(validate_constraint(&c), Err(ValidationFailure::EmptyName));
    }

    #[test]
    fn rejects_empty_description() {
        let mut c = valid_constraint();
        c.description = "  ".to_string();
        assert_eq!(
            validate_constraint(&c),
            Err(ValidationFailure::EmptyDescription)
        );
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let mut c = valid_constraint();
        c.confidence = 1.5;
        assert_eq!(
            validate_constraint(&c),
            Err(ValidationFailure::ConfidenceOutOfRange)
        );
        c.confidence = -0.1;
        assert_eq!(
            validate_constraint(&c),
            Err(ValidationFailure::ConfidenceOutOfRange)
        );
    }

    #[test]
    fn rejects_incompatible_kind_enforcement() {
        let mut c = valid_constraint();
        c.enforcement = Enforcement::Security;
        assert_eq!(
            validate_constraint(&c),
            Err(ValidationFailure::IncompatibleEnforcement)
        );
    }

    #[test]
    fn remove_invalid_is_monotone() {
        let mut set = ConstraintSet::new("s");
        set.push(valid_constraint());
        let mut bad = valid_constraint();
        bad.id = 2;
        bad.name = "".to_string();
        set.push(bad);

        let removed = remove_invalid(&mut set);
        assert_eq!(removed, 1);
        assert_eq!(set.len(), 1);
        assert!(set.constraints.iter().all(is_valid));
    }
}
