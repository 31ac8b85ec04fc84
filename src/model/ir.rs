//! `ConstraintIR` — the compiled artifact Braid produces, and its
//! sub-artifacts. The `#[repr(C)]` wire structs for crossing the FFI
//! boundary live in [`crate::ffi`], not here — this module is the
//! in-process value.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonSchema {
    pub schema_type: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub additional_properties: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrammarRule {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

/// A production symbol is either a literal terminal or a reference to
/// another non-terminal. Modeled as an explicit sum type rather than a
/// bare `String` with an implicit convention, so Braid and the FFI
/// encoder can't disagree about which symbols are terminals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
}

impl Symbol {
    /// The wire text for a symbol, matching the flat `rhs: [string, ...]`
    /// shape — terminals and non-terminal references both
    /// serialize to plain strings at the JSON boundary; only the in-memory
    /// `Grammar` keeps the distinction.
    pub fn as_wire_str(&self) -> &str {
        match self {
            Symbol::Terminal(s) => s,
            Symbol::NonTerminal(s) => s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    pub rules: Vec<GrammarRule>,
}

impl Grammar {
    /// True if every non-terminal reference in `rules` names a production
    /// with that `lhs`, and `start_symbol` itself names one.
    pub fn is_well_formed(&self) -> bool {
        let lhs_names: std::collections::HashSet<&str> =
            self.rules.iter().map(|r| r.lhs.as_str()).collect();
        if !lhs_names.contains(self.start_symbol.as_str()) {
            return false;
        }
        self.rules.iter().all(|rule| {
            rule.rhs.iter().all(|sym| match sym {
                Symbol::Terminal(_) => true,
                Symbol::NonTerminal(name) => lhs_names.contains(name.as_str()),
            })
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegexPattern {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TokenMaskRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_tokens: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forbidden_tokens: Option<Vec<u32>>,
}

impl TokenMaskRules {
    /// True unless both sets are present and share at least one id.
    pub fn is_disjoint(&self) -> bool {
        match (&self.allowed_tokens, &self.forbidden_tokens) {
            (Some(allowed), Some(forbidden)) => {
                let forbidden_set: std::collections::HashSet<u32> =
                    forbidden.iter().copied().collect();
                !allowed.iter().any(|t| forbidden_set.contains(t))
            }
            _ => true,
        }
    }
}

/// The compiled artifact produced by Braid: any combination of a JSON
/// schema, a grammar, regex patterns, and token masks, plus the set's
/// overall scheduling priority.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConstraintIR {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<Grammar>,

    #[serde(default)]
    pub regex_patterns: Vec<RegexPattern>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_masks: Option<TokenMaskRules>,

    #[serde(default)]
    pub priority: u32,
}

impl ConstraintIR {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check the invariants that must hold for any IR Braid hands
    /// back. A violation here, post-compile, means Braid has a bug
    /// (`CompilerInvariantViolation`), not that the input was bad.
    pub fn check_invariants(&self) -> Result<(), String> {
        if let Some(masks) = &self.token_masks {
            if !masks.is_disjoint() {
                return Err("token_masks: allowed and forbidden sets intersect".to_string());
            }
        }
        if let Some(grammar) = &self.grammar {
            if !grammar.is_well_formed() {
                return Err(format!(
                    "grammar: start symbol '{}' does not name a production, or a rule references an unknown non-terminal",
                    grammar.start_symbol
                ));
            }
        }
        if let Some(schema) = &self.json_schema {
            let keys: std::collections::HashSet<&str> =
                schema.properties.keys().map(|s| s.as_str()).collect();
            if !schema.required.iter().all(|r| keys.contains(r.as_str())) {
                return Err("json_schema: required list is not a subset of properties".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_well_formed_requires_start_symbol_defined() {
        let grammar = Grammar {
            start_symbol: "program".to_string(),
            rules: vec![GrammarRule {
                lhs: "program".to_string(),
                rhs: vec![Symbol::Terminal("fn".to_string())],
            }],
        };
        assert!(grammar.is_well_formed());

        let bad = Grammar {
            start_symbol: "missing".to_string(),
            rules: grammar.rules,
        };
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn token_masks_disjointness() {
        let masks = TokenMaskRules {
            allowed_tokens: Some(vec![1, 2, 3]),
            forbidden_tokens: Some(vec![4, 5]),
        };
        assert!(masks.is_disjoint());

        let overlapping = TokenMaskRules {
            allowed_tokens: Some(vec![1, 2, 3]),
            forbidden_tokens: Some(vec![3, 5]),
        };
        assert!(!overlapping.is_disjoint());
    }

    #[test]
    fn required_subset_of_properties() {
        let mut properties = HashMap::new();
        properties.insert("id".to_string(), serde_json::json!({"type": "integer"}));
        let schema = JsonSchema {
            schema_type: "object".to_string(),
            properties,
            required: vec!["id".to_string()],
            additional_properties: false,
        };
        let ir = ConstraintIR {
            json_schema: Some(schema),
            ..ConstraintIR::empty("t")
        };
        assert!(ir.check_invariants().is_ok());
    }
}
