//! Language dispatch table.

use std::fmt;

/// A recognized source language. The set is open for extension —
/// adding a language means adding a variant here and a recognizer set in
/// [`super::recognizers::dispatch`], nothing else needs to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
}

impl Language {
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Some(Language::TypeScript),
            "javascript" | "js" => Some(Language::JavaScript),
            "python" | "py" => Some(Language::Python),
            "rust" | "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }

}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_case_insensitively() {
        assert_eq!(Language::parse_tag("TypeScript"), Some(Language::TypeScript));
        assert_eq!(Language::parse_tag("python"), Some(Language::Python));
        assert_eq!(Language::parse_tag("rust"), Some(Language::Rust));
    }

    #[test]
    fn rejects_unknown_tags() {
        assert_eq!(Language::parse_tag("cobol"), None);
    }
}
