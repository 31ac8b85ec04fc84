//! The `Constraint` atom and the `ConstraintSet` that owns a run of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What family of property a constraint expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Syntactic,
    TypeSafety,
    Semantic,
    Architectural,
    Operational,
    Security,
}

/// Which artifact family a constraint feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    Syntactic,
    Structural,
    Semantic,
    Performance,
    Security,
}

impl ConstraintKind {
    /// Enforcement values permitted for this kind. `TypeSafety` is the
    /// one kind with two permitted branches;
    /// Braid's conflict-resolution phase breaks the tie (see DESIGN.md).
    pub fn permitted_enforcements(self) -> &'static [Enforcement] {
        match self {
            ConstraintKind::Syntactic => &[Enforcement::Syntactic],
            ConstraintKind::TypeSafety => &[Enforcement::Structural, Enforcement::Semantic],
            ConstraintKind::Semantic => &[Enforcement::Semantic],
            ConstraintKind::Architectural => &[Enforcement::Structural],
            ConstraintKind::Operational => &[Enforcement::Performance],
            ConstraintKind::Security => &[Enforcement::Security],
        }
    }

    pub fn is_compatible_with(self, enforcement: Enforcement) -> bool {
        self.permitted_enforcements().contains(&enforcement)
    }
}

/// Scheduling weight. Declaration order fixes the ordinal values
/// (`low(0) .. critical(3)`) so `#[derive(Ord)]` gives the right
/// comparison for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_ordinal(self) -> u32 {
        self as u32
    }
}

/// Affects reporting only, never compilation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// How a constraint was derived, with per-variant provenance payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintSource {
    AstPattern,
    TypeSystem,
    ControlFlow,
    DataFlow,
    TestMining { file: String, line: u32 },
    Documentation,
    Telemetry { metric: String, threshold: f64 },
    UserDefined,
    LlmAnalysis {
        provider: String,
        prompt: String,
        confidence: f64,
    },
}

/// A discrete, provenance-tagged property the target code must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub kind: ConstraintKind,
    pub source: ConstraintSource,
    pub enforcement: Enforcement,
    pub priority: Priority,
    pub severity: Severity,
    pub confidence: f64,
    pub frequency: u32,
    pub origin_file: Option<String>,
    pub origin_line: Option<u32>,
    pub created_at: DateTime<Utc>,
    /// Ids of constraints this one depends on. Empty for
    /// most recognizer output; populated by recognizers that know a
    /// constraint only makes sense alongside another (e.g. a type-check
    /// assertion that depends on the existence-check it refines).
    #[serde(default)]
    pub depends_on: Vec<u64>,
}

impl Constraint {
    /// Builder-style constructor for the common case (no dependencies,
    /// `created_at` set to now). Recognizers call this and then adjust
    /// individual fields rather than fill out the struct literal by hand.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ConstraintKind,
        enforcement: Enforcement,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            kind,
            source: ConstraintSource::AstPattern,
            enforcement,
            priority: Priority::Medium,
            severity: Severity::Warning,
            confidence: 1.0,
            frequency: 1,
            origin_file: None,
            origin_line: None,
            created_at: Utc::now(),
            depends_on: vec![],
        }
    }

    pub fn with_source(mut self, source: ConstraintSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_origin(mut self, file: impl Into<String>, line: u32) -> Self {
        self.origin_file = Some(file.into());
        self.origin_line = Some(line);
        self
    }

    /// The `(priority, confidence, id)` tie-break triple used throughout
    /// Braid's ordering and conflict-resolution phases. Higher wins; ties
    /// fall through to the next component in order.
    pub fn tie_break_key(&self) -> (Priority, ordered_confidence::OrderedF64, u64) {
        (
            self.priority,
            ordered_confidence::OrderedF64(self.confidence),
            self.id,
        )
    }
}

/// A total-ordering wrapper over `f64` confidence scores. Confidence is
/// always validated into `[0.0, 1.0]` before this is constructed, so NaN
/// never appears in practice; the `Ord` impl treats NaN as smaller than
/// everything, which keeps tie-break sorts total instead of panicking.
pub mod ordered_confidence {
    use std::cmp::Ordering;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct OrderedF64(pub f64);

    impl Eq for OrderedF64 {}

    impl PartialOrd for OrderedF64 {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for OrderedF64 {
        fn cmp(&self, other: &Self) -> Ordering {
            self.0.partial_cmp(&other.0).unwrap_or(Ordering::Less)
        }
    }
}

/// An owned, ordered collection of [`Constraint`]s produced by one Clew
/// invocation. Dropping a `ConstraintSet` drops every string any of its
/// constraints own, in one step — Rust's ownership model gives this for
/// free, which is the natural translation of the source's arena-per-set
/// discipline (see DESIGN.md's Open Question notes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub name: String,
    pub constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Recognizer output order is deterministic for a fixed dispatch table;
    /// `extend` preserves the order recognizers ran in.
    pub fn extend(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }
}

impl IntoIterator for ConstraintSet {
    type Item = Constraint;
    type IntoIter = std::vec::IntoIter<Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.into_iter()
    }
}
