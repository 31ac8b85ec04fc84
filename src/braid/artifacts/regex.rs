//! Semantic → regex patterns. Each semantic constraint
//! compiles to one `{pattern, flags}` entry; output order is stable
//! (priority desc, then id asc), matching Braid's tie-break convention.

use crate::model::{Constraint, RegexPattern};

fn escape(text: &str) -> String {
    regex::escape(text)
}

pub fn compile_regex_patterns(constraints: &[Constraint]) -> Vec<RegexPattern> {
    let mut ordered: Vec<&Constraint> = constraints.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));

    ordered
        .into_iter()
        .map(|c| RegexPattern {
            pattern: format!(r"\b{}\b", escape(&c.name)),
            flags: String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement, Priority};

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(compile_regex_patterns(&[]).is_empty());
    }

    #[test]
    fn ordered_by_priority_desc_then_id_asc() {
        let low = Constraint::new(2, "b", "d", ConstraintKind::Semantic, Enforcement::Semantic)
            .with_priority(Priority::Low);
        let high = Constraint::new(1, "a", "d", ConstraintKind::Semantic, Enforcement::Semantic)
            .with_priority(Priority::High);
        let patterns = compile_regex_patterns(&[low, high]);
        assert!(patterns[0].pattern.contains('a'));
        assert!(patterns[1].pattern.contains('b'));
    }
}
