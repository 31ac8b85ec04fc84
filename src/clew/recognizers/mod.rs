//! Recognizers: pure `fn(source) -> Vec<Constraint>` units Clew runs in
//! sequence for a given language (§4.1). A recognizer never executes the
//! source and never fails outright — a parse hiccup in one region just
//! means it emits nothing for that region (§4.1 "key algorithms").

pub mod doc_scanner;
pub mod syntactic;
pub mod test_miner;

use crate::model::Constraint;

use super::language::Language;

/// A pure extraction unit. Implementors must not execute the source or
/// mutate shared state beyond returning their findings.
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &'static str;
    fn recognize(&self, source: &str, next_id: &mut IdAllocator) -> Vec<Constraint>;
}

/// Hands out stable, increasing ids within one extraction call, shared
/// across every recognizer in the dispatch set so constraints from the
/// same `ConstraintSet` never collide.
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn alloc(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Language dispatch (§4.1 step 1): the set of syntactic recognizers run
/// for a given language. Order here is the deterministic recognizer
/// output order §5 requires.
pub fn dispatch_syntactic(language: Language) -> Vec<Box<dyn Recognizer>> {
    match language {
        Language::Rust => vec![
            Box::new(syntactic::rust::AsyncFnRecognizer),
            Box::new(syntactic::rust::ResultReturnRecognizer),
            Box::new(syntactic::rust::SerdeDeriveRecognizer),
            Box::new(syntactic::rust::UnwrapUsageRecognizer),
        ],
        Language::TypeScript | Language::JavaScript => vec![
            Box::new(syntactic::typescript::AsyncFunctionRecognizer),
            Box::new(syntactic::typescript::TypeAnnotationRecognizer),
            Box::new(syntactic::typescript::TryCatchRecognizer),
        ],
        Language::Python => vec![
            Box::new(syntactic::python::AsyncDefRecognizer),
            Box::new(syntactic::python::TypeHintRecognizer),
            Box::new(syntactic::python::TryExceptRecognizer),
        ],
    }
}
