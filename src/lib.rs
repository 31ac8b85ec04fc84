//! Ananke core: the constraint extraction and compilation pipeline.
//!
//! Ananke turns source code (and/or user-supplied constraint records)
//! into a compiled `ConstraintIR` that a downstream constrained-decoding
//! inference engine consumes to guarantee emitted code cannot violate
//! the constraints it was compiled from.
//!
//! ```text
//! source text, language tag
//!         │
//!         ▼
//!    ┌─────────┐
//!    │  Clew   │   parsers + pattern recognizers → Constraint records
//!    └────┬────┘
//!         │ ConstraintSet
//!         ▼
//!    ┌─────────┐
//!    │  Braid  │   dependency graph → conflict resolution → artifacts
//!    └────┬────┘
//!         │ ConstraintIR (+ diagnostics, holes)
//!         ▼
//!    ┌─────────┐
//!    │   FFI   │   stable C-ABI encoding
//!    └─────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> ananke_core::error::Result<()> {
//! let ir = ananke_core::pipeline::run("async fn f() {}", "rust").await?;
//! println!("compiled priority: {}", ir.priority);
//! # Ok(())
//! # }
//! ```

pub mod braid;
pub mod clew;
pub mod error;
pub mod ffi;
pub mod model;
pub mod ring_queue;
pub mod validator;

pub use braid::{Braid, BraidConfig, BraidOutput};
pub use clew::{Clew, ClewConfig};
pub use error::{AnankeError, Result};
pub use model::{Constraint, ConstraintIR, ConstraintSet};

/// Schema/wire-format version reported by `ffi::version()` and usable
/// in-process by embedders that want to assert compatibility without
/// crossing the FFI boundary.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Installs a `tracing` subscriber reading `RUST_LOG` (default `info`).
/// This crate otherwise only emits events — it never installs a
/// subscriber on its own, since embedding applications own that
/// decision.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Convenience wrapper for the common case: extract with a default
/// `Clew`, then compile with a default `Braid`, returning just the IR.
/// Embedders that need diagnostics, holes, or custom oracles should
/// drive `Clew`/`Braid` directly instead.
pub mod pipeline {
    use crate::braid::Braid;
    use crate::clew::Clew;
    use crate::error::Result;
    use crate::model::ConstraintIR;

    pub async fn run(source: &str, language: &str) -> Result<ConstraintIR> {
        let clew = Clew::default();
        let set = clew.extract_from_code(source, language).await?;
        let braid = Braid::default();
        let output = braid.compile(set.constraints).await?;
        Ok(output.ir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pipeline_round_trips_a_simple_rust_snippet() {
        let ir = pipeline::run("pub async fn fetch() -> Result<(), ()> { Ok(()) }", "rust")
            .await
            .unwrap();
        assert!(ir.grammar.is_some());
    }

    #[tokio::test]
    async fn pipeline_rejects_unknown_language() {
        let err = pipeline::run("x", "cobol").await.unwrap_err();
        assert!(matches!(err, AnankeError::UnsupportedLanguage(_)));
    }
}
