//! Conflict detection and resolution. Two constraints
//! conflict when their semantic extents contradict — the clearest case
//! being a token-mask constraint that requires a token id while another
//! forbids the same id; more generally, any pair of constraints that
//! name the same subject with opposite polarity cues ("must" vs "must
//! not"/"never").

use std::time::Duration;

use crate::model::{Constraint, Priority};

/// What an installed resolver decided for a tied pair.
#[derive(Debug, Clone)]
pub enum ConflictDecision {
    DisableA,
    DisableB,
    Merge,
    ModifyA(Box<Constraint>),
    ModifyB(Box<Constraint>),
}

/// The oracle consulted only when priority and confidence both tie. Its
/// absence is a valid configuration — Braid falls back straight to the
/// next tie-break rule (earlier `created_at` wins) without it.
#[async_trait::async_trait]
pub trait ConflictResolver: Send + Sync {
    async fn resolve(&self, a: &Constraint, b: &Constraint, deadline: Duration) -> Option<ConflictDecision>;
}

/// A record of one resolved conflict, destined for the diagnostics
/// sidecar.
#[derive(Debug, Clone)]
pub struct ConflictRecord {
    pub winner_id: u64,
    pub loser_id: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
    Require,
    Forbid,
}

/// Best-effort extraction of a `(token id, polarity)` pair from a
/// constraint's description — this is how token-id-level conflicts get
/// discovered, since the JSON input has no dedicated token-id field.
/// Also used by [`super::artifacts::token_mask`]
/// to populate the actual mask sets in phase 4.
pub(crate) fn token_reference(text: &str) -> Option<(u32, Polarity)> {
    use std::sync::OnceLock;
    static TOKEN_ID: OnceLock<regex::Regex> = OnceLock::new();
    let re = TOKEN_ID.get_or_init(|| regex::Regex::new(r"(?i)token(?:\s*id)?\s*(\d+)").unwrap());
    let id: u32 = re.captures(text)?.get(1)?.as_str().parse().ok()?;

    let lower = text.to_ascii_lowercase();
    let forbids = ["forbid", "disallow", "forbidden", "must not", "never allow", "deny"]
        .iter()
        .any(|kw| lower.contains(kw));
    let requires = ["require", "allow", "permit", "must use", "always allow"]
        .iter()
        .any(|kw| lower.contains(kw));

    match (requires, forbids) {
        (true, false) => Some((id, Polarity::Require)),
        (false, true) => Some((id, Polarity::Forbid)),
        _ => None,
    }
}

/// A looser, name-keyed contradiction check for constraints that don't
/// reference a token id: two constraints with the same `name` where one
/// description reads as prescriptive ("must", "always") and the other
/// as prohibitive ("must not", "never") are treated as conflicting.
fn has_prohibitive_cue(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("must not") || lower.contains("never") || lower.contains("forbid") || lower.contains("disallow")
}

fn has_prescriptive_cue(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    (lower.contains("must") || lower.contains("always") || lower.contains("require"))
        && !has_prohibitive_cue(text)
}

fn conflicts(a: &Constraint, b: &Constraint) -> Option<&'static str> {
    if let (Some((id_a, pol_a)), Some((id_b, pol_b))) =
        (token_reference(&a.description), token_reference(&b.description))
    {
        if id_a == id_b && pol_a != pol_b {
            return Some("same token id required by one constraint and forbidden by another");
        }
    }
    if a.name == b.name && has_prescriptive_cue(&a.description) && has_prohibitive_cue(&b.description) {
        return Some("same constraint name asserted and prohibited");
    }
    if a.name == b.name && has_prohibitive_cue(&a.description) && has_prescriptive_cue(&b.description) {
        return Some("same constraint name asserted and prohibited");
    }
    None
}

/// Resolves every detected conflict in `constraints`, consulting
/// `resolver` only on an exact priority/confidence tie.
/// Returns the surviving constraints (losers removed) and one
/// [`ConflictRecord`] per resolved pair. `Merge` decisions keep both
/// sides — the actual merge happens per-artifact in phase 4 — but are
/// still logged so the sidecar reflects that a conflict was seen.
pub async fn resolve_conflicts(
    mut constraints: Vec<Constraint>,
    resolver: Option<&(dyn ConflictResolver)>,
    oracle_deadline: Duration,
) -> (Vec<Constraint>, Vec<ConflictRecord>) {
    let mut records = Vec::new();
    let mut disabled: std::collections::HashSet<u64> = std::collections::HashSet::new();

    let len = constraints.len();
    for i in 0..len {
        if disabled.contains(&constraints[i].id) {
            continue;
        }
        for j in (i + 1)..len {
            if disabled.contains(&constraints[j].id) {
                continue;
            }
            let Some(reason) = conflicts(&constraints[i], &constraints[j]) else {
                continue;
            };

            let (a, b) = (&constraints[i], &constraints[j]);
            let decision = decide(a, b, resolver, oracle_deadline).await;
            match decision {
                Decision::KeepA(why) => {
                    disabled.insert(b.id);
                    records.push(ConflictRecord { winner_id: a.id, loser_id: b.id, reason: format!("{reason}: {why}") });
                }
                Decision::KeepB(why) => {
                    disabled.insert(a.id);
                    records.push(ConflictRecord { winner_id: b.id, loser_id: a.id, reason: format!("{reason}: {why}") });
                }
                Decision::Merge => {
                    records.push(ConflictRecord {
                        winner_id: a.id,
                        loser_id: b.id,
                        reason: format!("{reason}: merged by alternation"),
                    });
                }
            }
        }
    }

    constraints.retain(|c| !disabled.contains(&c.id));
    (constraints, records)
}

enum Decision {
    KeepA(&'static str),
    KeepB(&'static str),
    Merge,
}

async fn decide(
    a: &Constraint,
    b: &Constraint,
    resolver: Option<&(dyn ConflictResolver)>,
    oracle_deadline: Duration,
) -> Decision {
    if a.priority != b.priority {
        return if a.priority > b.priority {
            Decision::KeepA("higher priority")
        } else {
            Decision::KeepB("higher priority")
        };
    }
    if a.confidence != b.confidence {
        return if a.confidence > b.confidence {
            Decision::KeepA("higher confidence")
        } else {
            Decision::KeepB("higher confidence")
        };
    }

    if let Some(resolver) = resolver {
        let decision = tokio::time::timeout(oracle_deadline, resolver.resolve(a, b, oracle_deadline)).await;
        match decision {
            Ok(Some(ConflictDecision::DisableA)) => return Decision::KeepB("conflict resolver"),
            Ok(Some(ConflictDecision::DisableB)) => return Decision::KeepA("conflict resolver"),
            Ok(Some(ConflictDecision::Merge)) => return Decision::Merge,
            Ok(Some(ConflictDecision::ModifyA(_))) => return Decision::KeepA("conflict resolver (modified)"),
            Ok(Some(ConflictDecision::ModifyB(_))) => return Decision::KeepB("conflict resolver (modified)"),
            Ok(None) | Err(_) => {
                tracing::debug!("conflict resolver declined or timed out, falling back to rule 4");
            }
        }
    }

    if a.created_at != b.created_at {
        return if a.created_at < b.created_at {
            Decision::KeepA("earlier created_at")
        } else {
            Decision::KeepB("earlier created_at")
        };
    }
    // Fully tied: break by id so the outcome is still deterministic.
    if a.id <= b.id {
        Decision::KeepA("tie-break by id")
    } else {
        Decision::KeepB("tie-break by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement, Severity};

    fn token_constraint(id: u64, token: u32, priority: Priority, confidence: f64, require: bool) -> Constraint {
        let verb = if require { "allow" } else { "forbid" };
        Constraint::new(
            id,
            format!("token_rule_{id}"),
            format!("{verb} token {token} during generation"),
            ConstraintKind::Security,
            Enforcement::Security,
        )
        .with_priority(priority)
        .with_confidence(confidence)
        .with_severity(Severity::Error)
    }

    #[tokio::test]
    async fn higher_priority_wins_token_conflict() {
        let a = token_constraint(1, 42, Priority::Low, 0.9, true);
        let b = token_constraint(2, 42, Priority::High, 0.5, false);
        let (survivors, records) = resolve_conflicts(vec![a, b], None, Duration::from_millis(50)).await;
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].winner_id, 2);
        assert_eq!(records[0].loser_id, 1);
    }

    #[tokio::test]
    async fn equal_priority_breaks_on_confidence() {
        let a = token_constraint(1, 42, Priority::Medium, 0.7, true);
        let b = token_constraint(2, 42, Priority::Medium, 0.9, false);
        let (survivors, _records) = resolve_conflicts(vec![a, b], None, Duration::from_millis(50)).await;
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, 2);
    }

    #[tokio::test]
    async fn non_conflicting_constraints_all_survive() {
        let a = token_constraint(1, 42, Priority::Medium, 0.7, true);
        let b = token_constraint(2, 7, Priority::Medium, 0.9, false);
        let (survivors, records) = resolve_conflicts(vec![a, b], None, Duration::from_millis(50)).await;
        assert_eq!(survivors.len(), 2);
        assert!(records.is_empty());
    }
}
