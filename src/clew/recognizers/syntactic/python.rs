//! Python syntactic recognizers.

use super::{line_of, StaticRegex};
use crate::clew::recognizers::{IdAllocator, Recognizer};
use crate::model::{Constraint, ConstraintKind, ConstraintSource, Enforcement, Priority, Severity};

static ASYNC_DEF: StaticRegex = StaticRegex::new(r"(?m)^\s*async\s+def\s+(\w+)\s*\(");
static TYPE_HINT_RETURN: StaticRegex = StaticRegex::new(r"(?m)^\s*def\s+(\w+)\s*\([^)]*\)\s*->\s*([\w\[\], \.]+)\s*:");
static TRY_EXCEPT: StaticRegex = StaticRegex::new(r"(?m)^\s*try\s*:");

pub struct AsyncDefRecognizer;

impl Recognizer for AsyncDefRecognizer {
    fn name(&self) -> &'static str {
        "python.async_def"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        ASYNC_DEF
            .get()
            .captures_iter(source)
            .map(|caps| {
                let fn_name = &caps[1];
                let line = line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("async_def_{}", fn_name),
                    format!("`{}` is declared `async def` and must be awaited by callers", fn_name),
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

pub struct TypeHintRecognizer;

impl Recognizer for TypeHintRecognizer {
    fn name(&self) -> &'static str {
        "python.type_hint"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        TYPE_HINT_RETURN
            .get()
            .captures_iter(source)
            .map(|caps| {
                let fn_name = &caps[1];
                let ret_type = caps[2].trim();
                let line = line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("return_type_{}", fn_name),
                    format!("`{}` is annotated to return `{}`", fn_name, ret_type),
                    ConstraintKind::TypeSafety,
                    Enforcement::Structural,
                )
                .with_source(ConstraintSource::AstPattern)
                .with_priority(Priority::Medium)
                .with_severity(Severity::Warning)
                .with_confidence(0.95)
                .with_origin("<source>", line)
            })
            .collect()
    }
}

pub struct TryExceptRecognizer;

impl Recognizer for TryExceptRecognizer {
    fn name(&self) -> &'static str {
        "python.try_except"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        let count = TRY_EXCEPT.get().find_iter(source).count();
        if count == 0 {
            return vec![];
        }
        let line = TRY_EXCEPT
            .get()
            .find(source)
            .map(|m| line_of(source, m.start()))
            .unwrap_or(1);
        let mut c = Constraint::new(
            next_id.alloc(),
            "explicit_exception_handling",
            "source uses try/except; exceptions raised in this region are expected to be caught",
            ConstraintKind::Semantic,
            Enforcement::Semantic,
        )
        .with_source(ConstraintSource::ControlFlow)
        .with_priority(Priority::Medium)
        .with_severity(Severity::Warning)
        .with_confidence(0.85)
        .with_origin("<source>", line);
        c.frequency = count as u32;
        vec![c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_async_def() {
        let src = "async def fetch(id):\n    return await db.get(id)\n";
        let mut ids = IdAllocator::new();
        let out = AsyncDefRecognizer.recognize(src, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "async_def_fetch");
    }

    #[test]
    fn recognizes_return_type_hint() {
        let src = "def validate_email(email: str) -> bool:\n    return '@' in email\n";
        let mut ids = IdAllocator::new();
        let out = TypeHintRecognizer.recognize(src, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "return_type_validate_email");
    }

    #[test]
    fn recognizes_try_except() {
        let src = "try:\n    risky()\nexcept ValueError:\n    pass\n";
        let mut ids = IdAllocator::new();
        let out = TryExceptRecognizer.recognize(src, &mut ids);
        assert_eq!(out.len(), 1);
    }
}
