//! TypeScript/JavaScript syntactic recognizers.

use super::StaticRegex;
use crate::clew::recognizers::{IdAllocator, Recognizer};
use crate::model::{Constraint, ConstraintKind, ConstraintSource, Enforcement, Priority, Severity};

static ASYNC_FUNCTION: StaticRegex = StaticRegex::new(
    r"(?m)(?:async\s+function\s+(\w+)|const\s+(\w+)\s*=\s*async\s*\()",
);
static TYPE_ANNOTATION: StaticRegex =
    StaticRegex::new(r"(?m)^\s*(?:export\s+)?(?:interface|type)\s+(\w+)");
static TRY_CATCH: StaticRegex = StaticRegex::new(r"\btry\s*\{");

pub struct AsyncFunctionRecognizer;

impl Recognizer for AsyncFunctionRecognizer {
    fn name(&self) -> &'static str {
        "typescript.async_function"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        ASYNC_FUNCTION
            .get()
            .captures_iter(source)
            .map(|caps| {
                let fn_name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or("anonymous");
                let line = super::line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("async_function_{}", fn_name),
                    format!("`{}` is declared async and returns a Promise", fn_name),
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

pub struct TypeAnnotationRecognizer;

impl Recognizer for TypeAnnotationRecognizer {
    fn name(&self) -> &'static str {
        "typescript.type_annotation"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        TYPE_ANNOTATION
            .get()
            .captures_iter(source)
            .map(|caps| {
                let type_name = &caps[1];
                let line = super::line_of(source, caps.get(0).unwrap().start());
                Constraint::new(
                    next_id.alloc(),
                    format!("type_shape_{}", type_name),
                    format!("`{}` is a named type and its shape is part of the type contract", type_name),
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

pub struct TryCatchRecognizer;

impl Recognizer for TryCatchRecognizer {
    fn name(&self) -> &'static str {
        "typescript.try_catch"
    }

    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
        let count = TRY_CATCH.get().find_iter(source).count();
        if count == 0 {
            return vec![];
        }
        let line = TRY_CATCH
            .get()
            .find(source)
            .map(|m| super::line_of(source, m.start()))
            .unwrap_or(1);
        let mut c = Constraint::new(
            next_id.alloc(),
            "explicit_error_handling",
            "source uses try/catch; exceptions are expected to be handled, not propagated silently",
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
    fn recognizes_async_function_declaration() {
        let src = "async function loadUser(id) { return await db.get(id); }";
        let mut ids = IdAllocator::new();
        let out = AsyncFunctionRecognizer.recognize(src, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "async_function_loadUser");
    }

    #[test]
    fn recognizes_interface_declaration() {
        let src = "export interface User {\n  id: number;\n  email: string;\n}";
        let mut ids = IdAllocator::new();
        let out = TypeAnnotationRecognizer.recognize(src, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "type_shape_User");
    }

    #[test]
    fn recognizes_try_catch() {
        let src = "try { risky(); } catch (e) { console.error(e); }";
        let mut ids = IdAllocator::new();
        let out = TryCatchRecognizer.recognize(src, &mut ids);
        assert_eq!(out.len(), 1);
    }
}
