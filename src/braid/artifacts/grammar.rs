//! Syntactic → grammar. Productions are synthesized from
//! constraints bucketed under `Enforcement::Syntactic`; every constraint
//! contributes one alternative under the fixed start symbol `program`.

use crate::model::{Constraint, Grammar, GrammarRule, Symbol};

const START_SYMBOL: &str = "program";

/// `None` when there are no syntactic constraints — an absent grammar,
/// not an empty one, matching the rule that empty input yields all
/// optional artifacts absent.
pub fn compile_grammar(constraints: &[Constraint]) -> Option<Grammar> {
    if constraints.is_empty() {
        return None;
    }
    let mut rules = Vec::with_capacity(constraints.len());
    for c in constraints {
        rules.push(GrammarRule {
            lhs: START_SYMBOL.to_string(),
            rhs: vec![Symbol::Terminal(c.name.clone())],
        });
    }
    Some(Grammar {
        start_symbol: START_SYMBOL.to_string(),
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement};

    #[test]
    fn empty_input_yields_no_grammar() {
        assert!(compile_grammar(&[]).is_none());
    }

    #[test]
    fn each_constraint_becomes_an_alternative_under_program() {
        let constraints = vec![
            Constraint::new(1, "use_camel_case", "d", ConstraintKind::Syntactic, Enforcement::Syntactic),
            Constraint::new(2, "no_tabs", "d", ConstraintKind::Syntactic, Enforcement::Syntactic),
        ];
        let grammar = compile_grammar(&constraints).unwrap();
        assert!(grammar.is_well_formed());
        assert_eq!(grammar.rules.len(), 2);
        assert!(grammar.rules.iter().all(|r| r.lhs == START_SYMBOL));
    }
}
