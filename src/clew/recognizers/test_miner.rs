//! Test-assertion miner: parses test files named by convention
//! and extracts assertions as `Constraint`s. A malformed assertion is
//! silently skipped — the miner never aborts a file over one bad match.

use regex::Regex;
use std::sync::OnceLock;

use super::IdAllocator;
use crate::clew::language::Language;
use crate::model::{Constraint, ConstraintKind, ConstraintSource, Enforcement, Priority, Severity};

/// Which assertion family a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionFamily {
    Equality,
    TypeCheck,
    ErrorExpected,
    PropertyCheck,
    RegexMatch,
    Membership,
    Truthiness,
    Nullity,
    Comparison,
}

impl AssertionFamily {
    fn label(self) -> &'static str {
        match self {
            AssertionFamily::Equality => "equality",
            AssertionFamily::TypeCheck => "type_check",
            AssertionFamily::ErrorExpected => "error_expected",
            AssertionFamily::PropertyCheck => "property_check",
            AssertionFamily::RegexMatch => "regex_match",
            AssertionFamily::Membership => "membership",
            AssertionFamily::Truthiness => "truthiness",
            AssertionFamily::Nullity => "nullity",
            AssertionFamily::Comparison => "comparison",
        }
    }
}

/// True if `filename` matches one of the recognized test-file conventions:
/// `*.test.*`, `*_test.*`, `test_*.py`.
pub fn looks_like_test_file(filename: &str) -> bool {
    let stem_has_test_segment = filename.split('.').count() >= 2
        && (filename.contains(".test.") || filename.contains("_test."));
    let python_prefix = filename
        .rsplit('/')
        .next()
        .map(|base| base.starts_with("test_") && base.ends_with(".py"))
        .unwrap_or(false);
    stem_has_test_segment || python_prefix
}

struct AssertionPattern {
    regex: &'static str,
    subject_group: usize,
    expected_group: Option<usize>,
    family: AssertionFamily,
}

fn jest_patterns() -> &'static [AssertionPattern] {
    &[
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toBe\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Equality,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toEqual\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Equality,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toThrow\(([^)]*)\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::ErrorExpected,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toMatch\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::RegexMatch,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toContain\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Membership,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toBeInstanceOf\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::TypeCheck,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.(?:toBeTruthy|toBeFalsy)\(\s*\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::Truthiness,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.(?:toBeNull|toBeDefined|toBeUndefined)\(\s*\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::Nullity,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.(?:toBeGreaterThan|toBeLessThan|toBeGreaterThanOrEqual|toBeLessThanOrEqual)\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Comparison,
        },
        AssertionPattern {
            regex: r"expect\(\s*([^()]+?)\s*\)\.toHaveProperty\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::PropertyCheck,
        },
    ]
}

fn rust_patterns() -> &'static [AssertionPattern] {
    &[
        AssertionPattern {
            regex: r"assert_eq!\(\s*([^,]+?)\s*,\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Equality,
        },
        AssertionPattern {
            regex: r"assert_ne!\(\s*([^,]+?)\s*,\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Comparison,
        },
        AssertionPattern {
            regex: r"(\w+)\([^)]*\)\.unwrap_err\(\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::ErrorExpected,
        },
        AssertionPattern {
            regex: r"assert!\(\s*([^,)]+?)\.is_none\(\)\s*\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::Nullity,
        },
        AssertionPattern {
            regex: r"assert!\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::Truthiness,
        },
    ]
}

fn pytest_patterns() -> &'static [AssertionPattern] {
    &[
        AssertionPattern {
            regex: r"assert\s+([^=\n]+?)\s*==\s*(.+)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Equality,
        },
        AssertionPattern {
            regex: r"assert\s+isinstance\(\s*([^,]+?)\s*,\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::TypeCheck,
        },
        AssertionPattern {
            regex: r"assert\s+(.+?)\s+in\s+(.+)",
            subject_group: 1,
            expected_group: Some(2),
            family: AssertionFamily::Membership,
        },
        AssertionPattern {
            regex: r"assert\s+(.+?)\s+is\s+None",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::Nullity,
        },
        AssertionPattern {
            regex: r"with\s+pytest\.raises\(\s*(.+?)\s*\)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::ErrorExpected,
        },
        AssertionPattern {
            regex: r"assert\s+(.+)",
            subject_group: 1,
            expected_group: None,
            family: AssertionFamily::Truthiness,
        },
    ]
}

fn patterns_for(language: Language) -> &'static [AssertionPattern] {
    match language {
        Language::TypeScript | Language::JavaScript => jest_patterns(),
        Language::Rust => rust_patterns(),
        Language::Python => pytest_patterns(),
    }
}

/// Best-effort function-under-test name: the leading identifier of the
/// subject expression (e.g. `validateEmail` out of `validateEmail('x@y.z')`).
fn extract_function_name(subject: &str) -> Option<String> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^[\w.]*?(\w+)\s*\(").unwrap());
    re.captures(subject.trim())
        .map(|c| c[1].to_string())
        .or_else(|| {
            static BARE_IDENT: OnceLock<Regex> = OnceLock::new();
            BARE_IDENT
                .get_or_init(|| Regex::new(r"^(\w+)").unwrap())
                .captures(subject.trim())
                .map(|c| c[1].to_string())
        })
}

fn line_of(source: &str, byte_offset: usize) -> u32 {
    source[..byte_offset].matches('\n').count() as u32 + 1
}

/// Mines every supported assertion family out of `source`, assuming
/// `source` is the content of a file recognized as a test file. One
/// `Constraint` per matched assertion.
pub fn mine_assertions(source: &str, language: Language, file: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
    let mut out = Vec::new();
    for pattern in patterns_for(language) {
        let Ok(re) = Regex::new(pattern.regex) else {
            // A malformed pattern is a miner bug, not a file problem — skip
            // it rather than panic, matching "a malformed assertion is
            // silently skipped" at the pattern-compilation granularity too.
            continue;
        };
        for caps in re.captures_iter(source) {
            let Some(subject_match) = caps.get(pattern.subject_group) else {
                continue;
            };
            let subject = subject_match.as_str().trim();
            if subject.is_empty() {
                continue;
            }
            let Some(fn_name) = extract_function_name(subject) else {
                continue;
            };
            let expected = pattern
                .expected_group
                .and_then(|g| caps.get(g))
                .map(|m| m.as_str().trim().to_string());
            let line = line_of(source, caps.get(0).unwrap().start());

            let kind = if pattern.family == AssertionFamily::TypeCheck {
                ConstraintKind::TypeSafety
            } else {
                ConstraintKind::Semantic
            };
            let enforcement = if pattern.family == AssertionFamily::TypeCheck {
                Enforcement::Structural
            } else {
                Enforcement::Semantic
            };

            let description = match &expected {
                Some(expected) => format!(
                    "`{}` is exercised by a {} assertion expecting `{}`",
                    fn_name,
                    pattern.family.label(),
                    expected
                ),
                None => format!(
                    "`{}` is exercised by a {} assertion",
                    fn_name,
                    pattern.family.label()
                ),
            };

            let confidence = 0.85 + 0.10 * (pattern.family == AssertionFamily::Equality) as u8 as f64;
            out.push(
                Constraint::new(
                    next_id.alloc(),
                    format!("{}_{}", pattern.family.label(), fn_name),
                    description,
                    kind,
                    enforcement,
                )
                .with_source(ConstraintSource::TestMining {
                    file: file.to_string(),
                    line,
                })
                .with_priority(Priority::High)
                .with_severity(Severity::Error)
                .with_confidence(confidence.min(0.95)),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_test_file_naming_conventions() {
        assert!(looks_like_test_file("validateEmail.test.ts"));
        assert!(looks_like_test_file("user_test.py"));
        assert!(looks_like_test_file("test_user.py"));
        assert!(!looks_like_test_file("user.rs"));
        assert!(!looks_like_test_file("validateEmail.spec.ts"));
    }

    #[test]
    fn mines_jest_equality_assertion_with_a_validated_subject() {
        let src = "test('valid email', () => {\n  expect(validateEmail('x@y.z')).toBe(true);\n});\n";
        let mut ids = IdAllocator::new();
        let out = mine_assertions(src, Language::TypeScript, "validateEmail.test.ts", &mut ids);
        assert!(!out.is_empty());
        let hit = out.iter().find(|c| c.name.contains("validateEmail")).expect("constraint for validateEmail");
        assert_eq!(hit.kind, ConstraintKind::Semantic);
        assert!(hit.confidence >= 0.85);
        match &hit.source {
            ConstraintSource::TestMining { file, .. } => assert_eq!(file, "validateEmail.test.ts"),
            other => panic!("expected TestMining source, got {:?}", other),
        }
    }

    #[test]
    fn mines_rust_assert_eq() {
        let src = "#[test]\nfn adds() {\n    assert_eq!(add(2, 2), 4);\n}\n";
        let mut ids = IdAllocator::new();
        let out = mine_assertions(src, Language::Rust, "math_test.rs", &mut ids);
        assert!(out.iter().any(|c| c.name.contains("add")));
    }

    #[test]
    fn mines_pytest_isinstance_as_type_check() {
        let src = "def test_kind():\n    assert isinstance(make_user(), User)\n";
        let mut ids = IdAllocator::new();
        let out = mine_assertions(src, Language::Python, "test_kind.py", &mut ids);
        let hit = out.iter().find(|c| c.kind == ConstraintKind::TypeSafety);
        assert!(hit.is_some());
    }
}
