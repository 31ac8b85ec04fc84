//! `Hole` — a typed placeholder Braid emits when a constraint is
//! under-determined. The downstream consumer decides how to fill a
//! hole; this crate only produces and round-trips the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The granularity at which a hole sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleScale {
    Expression,
    Statement,
    Block,
    Function,
    Module,
    Specification,
}

/// Where an under-determination came from, kept distinct from
/// `ConstraintSource` because a hole's origin describes *why Braid
/// couldn't finish compiling*, not how the constraint was mined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleOrigin {
    /// A structural constraint had no extractable property shape.
    UnderspecifiedSchema,
    /// A syntactic constraint named a production but supplied no
    /// terminals to expand it with.
    UnderspecifiedGrammar,
    /// The conflict resolver could not decide and left the loser
    /// unresolved rather than silently disabling it.
    UnresolvedConflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    pub id: u64,
    pub scale: HoleScale,
    pub origin: HoleOrigin,
    /// Free-text hint for a resolution strategy a downstream refiner might
    /// use (e.g. "decompose", "retry_alternate"); this crate does not
    /// interpret the string, only carries it.
    pub resolution_strategy: String,
    pub confidence: f64,
    pub location: Option<String>,
    /// Provenance of the constraint that produced this hole (its name),
    /// for round-trip tooling to trace back to the source constraint.
    pub provenance: String,
    pub current_fill: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Hole {
    pub fn new(id: u64, scale: HoleScale, origin: HoleOrigin, provenance: impl Into<String>) -> Self {
        Self {
            id,
            scale,
            origin,
            resolution_strategy: "decompose".to_string(),
            confidence: 0.0,
            location: None,
            provenance: provenance.into(),
            current_fill: None,
            created_at: Utc::now(),
        }
    }
}
