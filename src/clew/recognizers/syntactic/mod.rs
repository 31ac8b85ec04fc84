pub mod python;
pub mod rust;
pub mod typescript;

use once_cell_lite::OnceRegex;

/// A tiny `Regex` memoization helper so each recognizer compiles its
/// pattern once per process rather than once per `recognize` call,
/// without pulling in `once_cell`/`lazy_static` for a single use site per
/// recognizer. Kept private to `syntactic` since recognizers are the only
/// callers that re-run a fixed pattern across many invocations.
mod once_cell_lite {
    use regex::Regex;
    use std::sync::OnceLock;

    pub struct OnceRegex {
        cell: OnceLock<Regex>,
        pattern: &'static str,
    }

    impl OnceRegex {
        pub const fn new(pattern: &'static str) -> Self {
            Self {
                cell: OnceLock::new(),
                pattern,
            }
        }

        pub fn get(&self) -> &Regex {
            self.cell
                .get_or_init(|| Regex::new(self.pattern).expect("static recognizer pattern"))
        }
    }
}

pub(super) use once_cell_lite::OnceRegex as StaticRegex;

/// 1-based line number of a byte offset into `source`, used by every
/// recognizer to attach `origin_line` to what it finds.
pub(super) fn line_of(source: &str, byte_offset: usize) -> u32 {
    source[..byte_offset].matches('\n').count() as u32 + 1
}
