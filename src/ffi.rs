//! The stable C-ABI boundary: presents a `ConstraintIR` to a
//! process-external consumer with explicit, symmetric ownership. Every
//! non-null pointer inside a handle was allocated by this library and
//! must be freed exactly once, only through [`free_constraint_ir`].

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::slice;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{AnankeError, StatusCode};
use crate::model::{Constraint, ConstraintIR, ConstraintKind, ConstraintSource, Priority, Severity};

fn runtime() -> &'static tokio::runtime::Runtime {
    static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("failed to start the Ananke FFI runtime")
    })
}

/// C-compatible `TokenMaskRules`.
#[repr(C)]
#[derive(Debug)]
pub struct TokenMaskRulesHandle {
    pub allowed_tokens: *mut u32,
    pub allowed_tokens_len: usize,
    pub forbidden_tokens: *mut u32,
    pub forbidden_tokens_len: usize,
}

/// C-compatible `ConstraintIR`, with the diagnostics sidecar folded in
/// as a parallel string array — readers that only care about the IR
/// itself can ignore `diagnostics`/`diagnostics_len`.
#[repr(C)]
#[derive(Debug)]
pub struct ConstraintIrHandle {
    pub name: *mut c_char,
    pub json_schema: *mut c_char,
    pub grammar: *mut c_char,
    pub regex_patterns: *mut *mut c_char,
    pub regex_patterns_len: usize,
    pub token_masks: *mut TokenMaskRulesHandle,
    pub priority: u32,
    pub diagnostics: *mut *mut c_char,
    pub diagnostics_len: usize,
}

fn cstring_or_null(s: Option<String>) -> *mut c_char {
    match s {
        Some(s) => CString::new(s).unwrap_or_default().into_raw(),
        None => ptr::null_mut(),
    }
}

fn string_array(items: Vec<String>) -> (*mut *mut c_char, usize) {
    if items.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let raw: Vec<*mut c_char> = items
        .into_iter()
        .map(|s| CString::new(s).unwrap_or_default().into_raw())
        .collect();
    let len = raw.len();
    (Box::into_raw(raw.into_boxed_slice()) as *mut *mut c_char, len)
}

/// `pattern` or `pattern|FLAGS:flags`.
fn encode_regex_pattern(p: &crate::model::RegexPattern) -> String {
    if p.flags.is_empty() {
        p.pattern.clone()
    } else {
        format!("{}|FLAGS:{}", p.pattern, p.flags)
    }
}

fn build_handle(ir: &ConstraintIR, diagnostics: &[String]) -> *mut ConstraintIrHandle {
    let json_schema = ir.json_schema.as_ref().map(|s| serde_json::to_string(s).unwrap_or_default());
    let grammar = ir.grammar.as_ref().map(|g| serde_json::to_string(g).unwrap_or_default());
    let (regex_patterns, regex_patterns_len) =
        string_array(ir.regex_patterns.iter().map(encode_regex_pattern).collect());

    let token_masks = ir.token_masks.as_ref().map(|masks| {
        let (allowed, allowed_len) = owned_u32_array(masks.allowed_tokens.clone());
        let (forbidden, forbidden_len) = owned_u32_array(masks.forbidden_tokens.clone());
        Box::into_raw(Box::new(TokenMaskRulesHandle {
            allowed_tokens: allowed,
            allowed_tokens_len: allowed_len,
            forbidden_tokens: forbidden,
            forbidden_tokens_len: forbidden_len,
        }))
    });

    let (diagnostics_ptr, diagnostics_len) = string_array(diagnostics.to_vec());

    Box::into_raw(Box::new(ConstraintIrHandle {
        name: CString::new(ir.name.clone()).unwrap_or_default().into_raw(),
        json_schema: cstring_or_null(json_schema),
        grammar: cstring_or_null(grammar),
        regex_patterns,
        regex_patterns_len,
        token_masks: token_masks.unwrap_or(ptr::null_mut()),
        priority: ir.priority,
        diagnostics: diagnostics_ptr,
        diagnostics_len,
    }))
}

fn owned_u32_array(v: Option<Vec<u32>>) -> (*mut u32, usize) {
    match v {
        Some(v) if !v.is_empty() => {
            let len = v.len();
            (Box::into_raw(v.into_boxed_slice()) as *mut u32, len)
        }
        _ => (ptr::null_mut(), 0),
    }
}

/// One-time process initialization. Idempotent: installs nothing
/// beyond the lazily-started runtime, so calling it more than once is
/// harmless.
#[no_mangle]
pub extern "C" fn ananke_init() -> StatusCode {
    let _ = runtime();
    StatusCode::Success
}

/// One-time teardown. The runtime and any cached state are process-owned
/// and released at process exit; this is a no-op reserved for future
/// use, kept so the ABI is symmetric with `ananke_init`.
#[no_mangle]
pub extern "C" fn ananke_deinit() {}

/// `version() -> static_cstr`.
#[no_mangle]
pub extern "C" fn ananke_version() -> *const c_char {
    static VERSION: OnceLock<CString> = OnceLock::new();
    VERSION
        .get_or_init(|| CString::new(crate::SCHEMA_VERSION).expect("version string has no interior nul"))
        .as_ptr()
}

/// Runs Clew → Braid → export for `(source, language)`.
///
/// # Safety
/// `source`, `language`, and `out_handle` must be valid, non-null
/// pointers; `source`/`language` must point to null-terminated UTF-8.
#[no_mangle]
pub unsafe extern "C" fn ananke_extract_constraints(
    source: *const c_char,
    language: *const c_char,
    out_handle: *mut *mut ConstraintIrHandle,
) -> StatusCode {
    if source.is_null() || language.is_null() || out_handle.is_null() {
        return StatusCode::NullPointer;
    }
    *out_handle = ptr::null_mut();

    let source = match CStr::from_ptr(source).to_str() {
        Ok(s) => s,
        Err(_) => return StatusCode::InvalidInput,
    };
    let language = match CStr::from_ptr(language).to_str() {
        Ok(s) => s,
        Err(_) => return StatusCode::InvalidInput,
    };

    match runtime().block_on(crate::pipeline::run(source, language)) {
        Ok(ir) => {
            *out_handle = build_handle(&ir, &[]);
            StatusCode::Success
        }
        Err(err) => {
            tracing::warn!(error = %err, "extract_constraints failed");
            err.status_code()
        }
    }
}

#[derive(Deserialize)]
struct RawConstraint {
    #[serde(default)]
    id: u64,
    kind: ConstraintKind,
    name: String,
    description: String,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintsInput {
    Bare(Vec<RawConstraint>),
    Wrapped { constraints: Vec<RawConstraint> },
}

fn into_constraint(raw: RawConstraint) -> Constraint {
    // type_safety permits either structural or semantic enforcement; the
    // input shape carries no field to disambiguate, so the first
    // permitted branch is chosen here and the conflict-resolution phase
    // is left to break ties by priority/confidence if the
    // constraint participates in one (see DESIGN.md).
    let enforcement = raw.kind.permitted_enforcements()[0];
    Constraint::new(raw.id, raw.name, raw.description, raw.kind, enforcement)
        .with_source(ConstraintSource::UserDefined)
        .with_priority(raw.priority.unwrap_or(Priority::Medium))
        .with_severity(raw.severity.unwrap_or(Severity::Warning))
        .with_confidence(raw.confidence.unwrap_or(1.0))
}

fn parse_constraints_json(text: &str) -> Result<Vec<Constraint>, AnankeError> {
    let input: ConstraintsInput =
        serde_json::from_str(text).map_err(|e| AnankeError::MalformedJson(e.to_string()))?;
    let raw = match input {
        ConstraintsInput::Bare(v) => v,
        ConstraintsInput::Wrapped { constraints } => constraints,
    };
    Ok(raw.into_iter().map(into_constraint).collect())
}

/// Parses a constraint JSON array (or `{"constraints": [...]}`
/// wrapper) and runs Braid → export.
///
/// # Safety
/// `constraints_json` and `out_handle` must be valid, non-null
/// pointers; `constraints_json` must point to null-terminated UTF-8.
#[no_mangle]
pub unsafe extern "C" fn ananke_compile_constraints(
    constraints_json: *const c_char,
    out_handle: *mut *mut ConstraintIrHandle,
) -> StatusCode {
    if constraints_json.is_null() || out_handle.is_null() {
        return StatusCode::NullPointer;
    }
    *out_handle = ptr::null_mut();

    let text = match CStr::from_ptr(constraints_json).to_str() {
        Ok(s) => s,
        Err(_) => return StatusCode::InvalidInput,
    };

    let constraints = match parse_constraints_json(text) {
        Ok(c) => c,
        Err(err) => return err.status_code(),
    };

    let braid = crate::braid::Braid::default();
    match runtime().block_on(braid.compile(constraints)) {
        Ok(output) => {
            *out_handle = build_handle(&output.ir, &output.diagnostics.as_readable_lines());
            StatusCode::Success
        }
        Err(err) => {
            tracing::warn!(error = %err, "compile_constraints failed");
            err.status_code()
        }
    }
}

/// Deep-frees every allocation reachable from `handle`.
///
/// # Safety
/// `handle` must either be null or have been returned by
/// [`ananke_extract_constraints`]/[`ananke_compile_constraints`], and
/// must not have been freed already.
#[no_mangle]
pub unsafe extern "C" fn ananke_free_constraint_ir(handle: *mut ConstraintIrHandle) {
    if handle.is_null() {
        return;
    }
    let handle = Box::from_raw(handle);

    if !handle.name.is_null() {
        let _ = CString::from_raw(handle.name);
    }
    if !handle.json_schema.is_null() {
        let _ = CString::from_raw(handle.json_schema);
    }
    if !handle.grammar.is_null() {
        let _ = CString::from_raw(handle.grammar);
    }
    free_string_array(handle.regex_patterns, handle.regex_patterns_len);
    free_string_array(handle.diagnostics, handle.diagnostics_len);

    if !handle.token_masks.is_null() {
        let masks = Box::from_raw(handle.token_masks);
        if !masks.allowed_tokens.is_null() {
            let _ = Box::from_raw(slice::from_raw_parts_mut(masks.allowed_tokens, masks.allowed_tokens_len));
        }
        if !masks.forbidden_tokens.is_null() {
            let _ = Box::from_raw(slice::from_raw_parts_mut(masks.forbidden_tokens, masks.forbidden_tokens_len));
        }
    }
}

unsafe fn free_string_array(ptr: *mut *mut c_char, len: usize) {
    if ptr.is_null() {
        return;
    }
    let items = Box::from_raw(slice::from_raw_parts_mut(ptr, len));
    for item in items.iter() {
        if !item.is_null() {
            let _ = CString::from_raw(*item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_a_stable_non_null_cstr() {
        let v = ananke_version();
        assert!(!v.is_null());
        let s = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(s, crate::SCHEMA_VERSION);
    }

    #[test]
    fn extract_and_free_round_trips_without_crashing() {
        unsafe {
            let source = CString::new("pub async fn f() {}").unwrap();
            let language = CString::new("rust").unwrap();
            let mut handle: *mut ConstraintIrHandle = ptr::null_mut();
            let status = ananke_extract_constraints(source.as_ptr(), language.as_ptr(), &mut handle);
            assert_eq!(status, StatusCode::Success);
            assert!(!handle.is_null());
            assert!(!(*handle).name.is_null());
            ananke_free_constraint_ir(handle);
        }
    }

    #[test]
    fn null_pointer_arguments_are_rejected() {
        unsafe {
            let mut handle: *mut ConstraintIrHandle = ptr::null_mut();
            let status = ananke_extract_constraints(ptr::null(), ptr::null(), &mut handle);
            assert_eq!(status, StatusCode::NullPointer);
        }
    }

    #[test]
    fn compile_parses_bare_array_input() {
        unsafe {
            let json = CString::new(
                r#"[{"id":1,"kind":"syntactic","name":"use_camelCase","description":"Functions must use camelCase naming","severity":"error","priority":"high"}]"#,
            )
            .unwrap();
            let mut handle: *mut ConstraintIrHandle = ptr::null_mut();
            let status = ananke_compile_constraints(json.as_ptr(), &mut handle);
            assert_eq!(status, StatusCode::Success);
            assert!(!handle.is_null());
            assert_eq!((*handle).priority, Priority::High.as_ordinal());
            ananke_free_constraint_ir(handle);
        }
    }

    #[test]
    fn compile_rejects_malformed_json() {
        unsafe {
            let json = CString::new("not json").unwrap();
            let mut handle: *mut ConstraintIrHandle = ptr::null_mut();
            let status = ananke_compile_constraints(json.as_ptr(), &mut handle);
            assert_eq!(status, StatusCode::InvalidInput);
            assert!(handle.is_null());
        }
    }
}
