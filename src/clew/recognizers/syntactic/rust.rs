//! Rust syntactic recognizers: async handlers, `Result`-returning
//! functions, serde derives, and `.unwrap()` calls.

use super::{line_of, StaticRegex};
use crate::clew::recognizers::{IdAllocator, Recognizer};
use crate::model::{Constraint, ConstraintKind, ConstraintSource, Enforcement, Priority, Severity};

static ASYNC_FN: StaticRegex = StaticRegex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?async\s+fn\s+(\w+)");
static RESULT_RETURN: StaticRegex =
    StaticRegex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?fn\s+(\w+)[^{]*->\s*(?:anyhow::)?Result<");
static SERDE_DERIVE: StaticRegex =
    StaticRegex::new(r"(?m)#\[derive\([^)]*\b(Serialize|Deserialize)\b[^)]*\)\]\s*\n\s*(?:pub\s+)?struct\s+(\w+)");
static UNWRAP_CALL: StaticRegex = StaticRegex::new(r"\.unwrap\(\)");

pub struct AsyncFnRecognizer;

impl Recognizer for AsyncFnRecognizer {
    fn name(&self) -> &'static str {
        "rust.async_fn"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        ASYNC_FN
            .get()
            .captures_iter(source)
            .map(|caps| {
                let fn_name = &caps[1];
                let line = line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("async_fn_{}", fn_name),
                    format!("`{}` is declared `async` and must remain awaitable", fn_name),
                    ConstraintKind::Syntactic,
                    Enforcement::Syntactic,
                )
                .with_source(ConstraintSource::AstPattern)
                .with_priority(Priority::Medium)
                .with_severity(Severity::Info)
                .with_confidence(1.0)
                .with_origin("<source>", line)
            })
            .collect()
    }
}

pub struct ResultReturnRecognizer;

impl Recognizer for ResultReturnRecognizer {
    fn name(&self) -> &'static str {
        "rust.result_return"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        RESULT_RETURN
            .get()
            .captures_iter(source)
            .map(|caps| {
                let fn_name = &caps[1];
                let line = line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("result_return_{}", fn_name),
                    format!(
                        "`{}` returns `Result` and callers must handle the `Err` branch explicitly",
                        fn_name
                    ),
                    ConstraintKind::TypeSafety,
                    Enforcement::Structural,
                )
                .with_source(ConstraintSource::AstPattern)
                .with_priority(Priority::High)
                .with_severity(Severity::Error)
                .with_confidence(1.0)
                .with_origin("<source>", line)
            })
            .collect()
    }
}

pub struct SerdeDeriveRecognizer;

impl Recognizer for SerdeDeriveRecognizer {
    fn name(&self) -> &'static str {
        "rust.serde_derive"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        SERDE_DERIVE
            .get()
            .captures_iter(source)
            .map(|caps| {
                let struct_name = &caps[2];
                let line = line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("serde_shape_{}", struct_name),
                    format!(
                        "`{}` derives serde and its field shape is part of the wire contract",
                        struct_name
                    ),
                    ConstraintKind::TypeSafety,
                    Enforcement::Structural,
                )
                .with_source(ConstraintSource::AstPattern)
                .with_priority(Priority::Medium)
                .with_severity(Severity::Warning)
                .with_confidence(0.9)
                .with_origin("<source>", line)
            })
            .collect()
    }
}

/// Fuzzy recognizer: `.unwrap()` is a style signal, not a hard rule, so it
/// gets a confidence below 1.0, in the [0.5, 0.95] band fuzzy recognizers
/// use.
pub struct UnwrapUsageRecognizer;

impl Recognizer for UnwrapUsageRecognizer {
    fn name(&self) -> &'static str {
        "rust.unwrap_usage"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        let count = UNWRAP_CALL.get().find_iter(source).count();
        if count == 0 {
            return vec![];
        }
        let line = UNWRAP_CALL
            .get()
            .find(source)
            .map(|m| line_of(source, m.start()))
            .unwrap_or(1);
        let mut c = Constraint::new(
            next_id.alloc(),
            "avoid_unwrap_in_library_code",
            "non-test code calls `.unwrap()`; prefer propagating the error with `?`",
            ConstraintKind::Semantic,
            Enforcement::Semantic,
        )
        .with_source(ConstraintSource::AstPattern)
        .with_priority(Priority::Low)
        .with_severity(Severity::Hint)
        .with_confidence(0.6)
        .with_origin("<source>", line);
        c.frequency = count as u32;
        vec![c]
    }
}
