//! Error taxonomy for the Ananke core pipeline.
//!
//! Mirrors the categories the design calls out: input errors, resource
//! errors, and internal (bug) errors. Partial-quality events — a dropped
//! constraint, an auto-resolved conflict, an oracle timeout — are *not*
//! represented here; they are diagnostics (see `braid::diagnostics`) and
//! never fail a call.

use thiserror::Error;

/// The crate-wide error type. Every public entry point returns
/// `Result<T, AnankeError>`; `anyhow` is used only for internal narration
/// (e.g. `.context(...)`) before being folded back into a concrete variant.
#[derive(Debug, Error)]
pub enum AnankeError {
    /// Clew was asked to extract from a language tag it has no recognizer
    /// set for.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The JSON handed to `compile_constraints` could not be parsed, or did
    /// not match either accepted top-level shape.
    #[error("malformed constraint JSON: {0}")]
    MalformedJson(String),

    /// Every constraint in the input set failed validation; compilation
    /// cannot proceed (phase 1 of Braid).
    #[error("no valid constraints in input set")]
    InvalidConstraint,

    /// An FFI entry point received a null pointer where one is required.
    #[error("null pointer passed across FFI boundary")]
    NullPointer,

    /// A caller-provided allocator (or the library's own) failed to
    /// allocate.
    #[error("allocation failure")]
    AllocationFailure,

    /// A host-provided cancellation token fired between phases.
    #[error("operation cancelled")]
    Cancelled,

    /// Braid produced an IR that violates its own invariants. This is
    /// always a bug in Braid, never caller error.
    #[error("compiler invariant violation: {0}")]
    CompilerInvariantViolation(String),

    /// Passthrough for lower-level failures that don't have a more
    /// specific taxonomy slot (e.g. a poisoned lock).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable numeric status codes for the FFI boundary. Never returned
/// from ordinary Rust APIs — only from the `extern "C"` entry points in
/// [`crate::ffi`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success = 0,
    NullPointer = 1,
    AllocationFailure = 2,
    InvalidInput = 3,
    ExtractionFailed = 4,
    CompilationFailed = 5,
    Cancelled = 6,
}

impl AnankeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnankeError::NullPointer => StatusCode::NullPointer,
            AnankeError::AllocationFailure => StatusCode::AllocationFailure,
            AnankeError::UnsupportedLanguage(_) | AnankeError::MalformedJson(_) => {
                StatusCode::InvalidInput
            }
            AnankeError::InvalidConstraint => StatusCode::InvalidInput,
            AnankeError::Cancelled => StatusCode::Cancelled,
            AnankeError::CompilerInvariantViolation(_) => StatusCode::CompilationFailed,
            AnankeError::Other(_) => StatusCode::ExtractionFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnankeError>;
