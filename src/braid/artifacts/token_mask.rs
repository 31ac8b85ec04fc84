//! Performance/security → token masks. Constraints that
//! reference a token id populate `allowed_tokens`/`forbidden_tokens`; if
//! the two sets still overlap after conflict resolution, the overlap is
//! stripped from `allowed_tokens` (forbidden wins) and reported back to
//! the caller so it lands in the diagnostics sidecar.

use crate::braid::conflict::{token_reference, Polarity};
use crate::model::{Constraint, TokenMaskRules};

/// Ids present in both `allowed_tokens` and `forbidden_tokens` before the
/// forbidden-wins rule was applied.
pub struct TokenMaskOutcome {
    pub masks: Option<TokenMaskRules>,
    pub forced_forbidden: Vec<u32>,
}

pub fn compile_token_masks(constraints: &[Constraint]) -> TokenMaskOutcome {
    let mut allowed: Vec<u32> = Vec::new();
    let mut forbidden: Vec<u32> = Vec::new();

    for c in constraints {
        if let Some((id, polarity)) = token_reference(&c.description) {
            match polarity {
                Polarity::Require => allowed.push(id),
                Polarity::Forbid => forbidden.push(id),
            }
        }
    }

    allowed.sort_unstable();
    allowed.dedup();
    forbidden.sort_unstable();
    forbidden.dedup();

    let forced_forbidden: Vec<u32> = allowed.iter().copied().filter(|id| forbidden.contains(id)).collect();
    if !forced_forbidden.is_empty() {
        allowed.retain(|id| !forced_forbidden.contains(id));
    }

    if allowed.is_empty() && forbidden.is_empty() {
        return TokenMaskOutcome { masks: None, forced_forbidden };
    }

    TokenMaskOutcome {
        masks: Some(TokenMaskRules {
            allowed_tokens: if allowed.is_empty() { None } else { Some(allowed) },
            forbidden_tokens: if forbidden.is_empty() { None } else { Some(forbidden) },
        }),
        forced_forbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement};

    fn rule(id: u64, token: u32, require: bool) -> Constraint {
        let verb = if require { "allow" } else { "forbid" };
        Constraint::new(
            id,
            format!("rule_{id}"),
            format!("{verb} token {token} during generation"),
            ConstraintKind::Security,
            Enforcement::Security,
        )
    }

    #[test]
    fn empty_input_yields_no_masks() {
        let outcome = compile_token_masks(&[]);
        assert!(outcome.masks.is_none());
    }

    #[test]
    fn forbidden_wins_on_overlap() {
        let constraints = vec![rule(1, 42, true), rule(2, 42, false)];
        let outcome = compile_token_masks(&constraints);
        let masks = outcome.masks.unwrap();
        assert!(masks.is_disjoint());
        assert_eq!(masks.forbidden_tokens, Some(vec![42]));
        assert_eq!(masks.allowed_tokens, None);
        assert_eq!(outcome.forced_forbidden, vec![42]);
    }

    #[test]
    fn disjoint_sets_pass_through_untouched() {
        let constraints = vec![rule(1, 1, true), rule(2, 2, false)];
        let outcome = compile_token_masks(&constraints);
        let masks = outcome.masks.unwrap();
        assert!(masks.is_disjoint());
        assert!(outcome.forced_forbidden.is_empty());
    }
}
