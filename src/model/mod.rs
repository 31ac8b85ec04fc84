//! The shared data model: `Constraint`, `ConstraintSet`,
//! `ConstraintIR`, and `Hole`. Carried between Clew and Braid by value.

mod constraint;
mod hole;
mod ir;

pub use constraint::{
    ordered_confidence, Constraint, ConstraintKind, ConstraintSet, ConstraintSource, Enforcement,
    Priority, Severity,
};
pub use hole::{Hole, HoleOrigin, HoleScale};
pub use ir::{ConstraintIR, Grammar, GrammarRule, JsonSchema, RegexPattern, Symbol, TokenMaskRules};
