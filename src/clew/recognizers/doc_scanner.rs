//! Comment/docstring scanner: extracts constraints tagged
//! `source = documentation` by matching natural-language cues in comments
//! — modal phrases ("must", "never"), and numeric thresholds/ranges/units.

use regex::Regex;
use std::sync::OnceLock;

use super::IdAllocator;
use crate::model::{Constraint, ConstraintKind, ConstraintSource, Enforcement, Priority, Severity};

/// Pulls `//`, `///`, `#`, and `"""..."""`/`'''...'''` comment bodies out
/// of `source`, language-agnostically — comment syntax overlaps enough
/// across the recognized languages (Rust/TS/JS share `//`, Python uses
/// `#` and triple-quoted strings) that one scan covers all of them well
/// enough for a best-effort documentation signal.
fn comment_bodies(source: &str) -> Vec<(String, u32)> {
    static LINE_COMMENT: OnceLock<Regex> = OnceLock::new();
    static BLOCK_COMMENT: OnceLock<Regex> = OnceLock::new();
    static DOCSTRING: OnceLock<Regex> = OnceLock::new();

    let line_re = LINE_COMMENT.get_or_init(|| Regex::new(r"(?m)(?://|#)\s?(.*)$").unwrap());
    let block_re =
        BLOCK_COMMENT.get_or_init(|| Regex::new(r"(?s)/\*(.*?)\*/").unwrap());
    let doc_re =
        DOCSTRING.get_or_init(|| Regex::new(r#"(?s)(?:"""|''')(.*?)(?:"""|''')"#).unwrap());

    let mut out = Vec::new();
    for caps in line_re.captures_iter(source) {
        let body = caps[1].to_string();
        if !body.trim().is_empty() {
            let line = line_of(source, caps.get(0).unwrap().start());
            out.push((body, line));
        }
    }
    for caps in block_re.captures_iter(source) {
        let start_line = line_of(source, caps.get(0).unwrap().start());
        for (i, raw_line) in caps[1].lines().enumerate() {
            let trimmed = raw_line.trim_start_matches('*').trim();
            if !trimmed.is_empty() {
                out.push((trimmed.to_string(), start_line + i as u32));
            }
        }
    }
    for caps in doc_re.captures_iter(source) {
        let start_line = line_of(source, caps.get(0).unwrap().start());
        for (i, raw_line) in caps[1].lines().enumerate() {
            let trimmed = raw_line.trim();
            if !trimmed.is_empty() {
                out.push((trimmed.to_string(), start_line + i as u32));
            }
        }
    }
    out
}

fn line_of(source: &str, byte_offset: usize) -> u32 {
    source[..byte_offset].matches('\n').count() as u32 + 1
}

struct Cue {
    regex: &'static str,
    severity: Severity,
}

fn cues() -> &'static [Cue] {
    &[
        Cue { regex: r"(?i)\bmust\s+(?:not\s+)?\w+", severity: Severity::Error },
        Cue { regex: r"(?i)\bnever\s+\w+", severity: Severity::Error },
        Cue { regex: r"(?i)\balways\s+\w+", severity: Severity::Warning },
        Cue { regex: r"(?i)\brequired\b", severity: Severity::Warning },
        Cue { regex: r"(?i)\b\d+(?:\.\d+)?\s?(?:ms|seconds?|minutes?|bytes?|kb|mb|gb|%)\b", severity: Severity::Info },
        Cue { regex: r"(?i)\bbetween\s+\d+\s+and\s+\d+\b", severity: Severity::Info },
    ]
}

/// Scans `source` for threshold phrases in its comments and emits one
/// `Constraint` per cue hit, carrying the matched phrase as the
/// description seed.
pub fn scan_documentation(source: &str, next_id: &mut IdAllocator) -> Vec<Constraint> {
    let mut out = Vec::new();
    let bodies = comment_bodies(source);
    for cue in cues() {
        let Ok(re) = Regex::new(cue.regex) else { continue };
        for (body, line) in &bodies {
            if let Some(m) = re.find(body) {
                let phrase = m.as_str().trim();
                if phrase.is_empty() {
                    continue;
                }
                out.push(
                    Constraint::new(
                        next_id.alloc(),
                        format!("doc_cue_{}", slugify(phrase)),
                        format!("comment states: \"{}\"", body.trim()),
                        ConstraintKind::Semantic,
                        Enforcement::Semantic,
                    )
                    .with_source(ConstraintSource::Documentation)
                    .with_priority(Priority::Low)
                    .with_severity(cue.severity)
                    .with_confidence(0.55)
                    .with_origin("<source>", *line),
                );
            }
        }
    }
    out
}

fn slugify(phrase: &str) -> String {
    phrase
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .chars()
        .take(40)
        .collect()
}
