//! The diagnostics sidecar: every dropped constraint, broken dependency
//! edge, resolved conflict, and forced token-mask overlap is recorded
//! here instead of failing the call. Exposed across the FFI boundary as
//! a flat, readable array.

use serde::{Deserialize, Serialize};

use super::conflict::ConflictRecord;
use super::graph::BrokenEdge;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    ConstraintDropped { id: u64, reason: String },
    DependencyCycleBroken { from: u64, to: u64 },
    ConflictResolved { winner_id: u64, loser_id: u64, reason: String },
    TokenOverlapForced { token_id: u32 },
    OracleTimedOut { stage: String },
}

impl std::fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticEvent::ConstraintDropped { id, reason } => {
                write!(f, "constraint {id} dropped: {reason}")
            }
            DiagnosticEvent::DependencyCycleBroken { from, to } => {
                write!(f, "dependency edge {from} -> {to} broken to resolve a cycle")
            }
            DiagnosticEvent::ConflictResolved { winner_id, loser_id, reason } => {
                write!(f, "conflict between {winner_id} and {loser_id} resolved in favor of {winner_id}: {reason}")
            }
            DiagnosticEvent::TokenOverlapForced { token_id } => {
                write!(f, "token {token_id} appeared in both allowed and forbidden sets; forbidden won")
            }
            DiagnosticEvent::OracleTimedOut { stage } => {
                write!(f, "{stage} oracle timed out; fell back to no additional data")
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub events: Vec<DiagnosticEvent>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn record_dropped(&mut self, id: u64, reason: impl Into<String>) {
        self.events.push(DiagnosticEvent::ConstraintDropped { id, reason: reason.into() });
    }

    pub fn record_broken_edges(&mut self, edges: impl IntoIterator<Item = BrokenEdge>) {
        self.events.extend(edges.into_iter().map(|e| DiagnosticEvent::DependencyCycleBroken { from: e.from, to: e.to }));
    }

    pub fn record_conflicts(&mut self, records: impl IntoIterator<Item = ConflictRecord>) {
        self.events.extend(records.into_iter().map(|r| DiagnosticEvent::ConflictResolved {
            winner_id: r.winner_id,
            loser_id: r.loser_id,
            reason: r.reason,
        }));
    }

    pub fn record_token_overlaps(&mut self, ids: impl IntoIterator<Item = u32>) {
        self.events.extend(ids.into_iter().map(|token_id| DiagnosticEvent::TokenOverlapForced { token_id }));
    }

    pub fn record_oracle_timeout(&mut self, stage: impl Into<String>) {
        self.events.push(DiagnosticEvent::OracleTimedOut { stage: stage.into() });
    }

    /// The readable-array encoding the FFI boundary hands back.
    pub fn as_readable_lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_lines_mirror_event_count() {
        let mut d = Diagnostics::default();
        d.record_dropped(1, "empty name");
        d.record_broken_edges(vec![BrokenEdge { from: 2, to: 3 }]);
        assert_eq!(d.events.len(), 2);
        assert_eq!(d.as_readable_lines().len(), 2);
    }
}
