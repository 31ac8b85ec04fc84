//! Clew — the extraction engine. Produces a `ConstraintSet` from
//! `(source, language)` without ever executing the source.

pub mod cache;
pub mod language;
pub mod oracle;
pub mod recognizers;

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{AnankeError, Result};
use crate::model::ConstraintSet;
use crate::validator;

pub use language::Language;
pub use oracle::{NoopOracle, OracleOutcome, SemanticOracle};
use recognizers::{doc_scanner, test_miner, IdAllocator};

/// In-process configuration. No file/env loading belongs here — callers
/// that embed this crate construct a `ClewConfig` directly.
#[derive(Debug, Clone)]
pub struct ClewConfig {
    /// How long to wait on the semantic oracle before downgrading to "no
    /// additional data".
    pub oracle_timeout: Duration,
    /// Capacity of the extraction fingerprint cache.
    pub cache_capacity: NonZeroUsize,
    /// Whether recognizer output is memoized at all.
    pub enable_cache: bool,
}

impl Default for ClewConfig {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_secs(5),
            cache_capacity: NonZeroUsize::new(256).unwrap(),
            enable_cache: true,
        }
    }
}

/// The extraction engine. Holds the optional oracle and the process-local
/// fingerprint cache; everything else it does is a pure function of its
/// input.
pub struct Clew {
    config: ClewConfig,
    oracle: Box<dyn SemanticOracle>,
    oracle_identity: String,
    cache: Mutex<cache::ExtractionCache>,
}

impl Clew {
    pub fn new(config: ClewConfig) -> Self {
        let cache = cache::ExtractionCache::new(config.cache_capacity);
        Self {
            config,
            oracle: Box::new(NoopOracle),
            oracle_identity: "none".to_string(),
            cache: Mutex::new(cache),
        }
    }

    /// Installs (or removes, with `None`) the optional semantic oracle.
    /// `identity` is folded into the cache fingerprint so
    /// swapping oracles doesn't serve stale oracle-enriched results.
    pub fn set_semantic_oracle(
        &mut self,
        oracle: Option<(Box<dyn SemanticOracle>, String)>,
    ) {
        match oracle {
            Some((oracle, identity)) => {
                self.oracle = oracle;
                self.oracle_identity = identity;
            }
            None => {
                self.oracle = Box::new(NoopOracle);
                self.oracle_identity = "none".to_string();
            }
        }
    }

    /// Runs the full Clew pipeline: language dispatch, syntactic
    /// recognizers, test-assertion miner, doc-cue scanner, then the
    /// optional oracle, then the validator. Empty source returns an empty
    /// set, never an error.
    pub async fn extract_from_code(&self, source: &str, language_tag: &str) -> Result<ConstraintSet> {
        let language = Language::parse_tag(language_tag)
            .ok_or_else(|| AnankeError::UnsupportedLanguage(language_tag.to_string()))?;

        if source.is_empty() {
            return Ok(ConstraintSet::new(language_tag));
        }

        if self.config.enable_cache {
            let mut cache = self.cache.lock().expect("extraction cache lock poisoned");
            if let Some(hit) = cache.get(source.as_bytes(), language.tag(), &self.oracle_identity) {
                return Ok(hit.clone());
            }
        }

        let mut set = ConstraintSet::new(language_tag);
        let mut ids = IdAllocator::new();

        for recognizer in recognizers::dispatch_syntactic(language) {
            set.extend(recognizer.recognize(source, &mut ids));
        }

        set.extend(test_miner::mine_assertions(source, language, "<source>", &mut ids));
        set.extend(doc_scanner::scan_documentation(source, &mut ids));

        if let OracleOutcome::Candidates(candidates) =
            oracle::enrich_with_timeout(self.oracle.as_ref(), source, &set, self.config.oracle_timeout)
                .await
        {
            set.extend(candidates.into_iter().filter(|c| validator::is_valid(c)));
        }

        validator::remove_invalid(&mut set);

        if self.config.enable_cache {
            let mut cache = self.cache.lock().expect("extraction cache lock poisoned");
            cache.put(source.as_bytes(), language.tag(), &self.oracle_identity, set.clone());
        }

        Ok(set)
    }

    /// Extracts from a file whose path/name is known, additionally
    /// running the test-assertion miner only when the name matches a test
    /// convention — the syntactic/doc recognizers still run
    /// unconditionally, since a test file is still valid source.
    pub async fn extract_from_file(
        &self,
        source: &str,
        language_tag: &str,
        filename: &str,
    ) -> Result<ConstraintSet> {
        let mut set = self.extract_from_code(source, language_tag).await?;
        if test_miner::looks_like_test_file(filename) {
            let language = Language::parse_tag(language_tag)
                .ok_or_else(|| AnankeError::UnsupportedLanguage(language_tag.to_string()))?;
            let mut ids = IdAllocator::new();
            // Re-anchor ids past whatever extract_from_code already used so
            // file-aware mining never collides with the cached set's ids.
            for _ in 0..set.len() {
                ids.alloc();
            }
            let mined = test_miner::mine_assertions(source, language, filename, &mut ids);
            set.extend(mined.into_iter().filter(|c| validator::is_valid(c)));
        }
        Ok(set)
    }
}

impl Default for Clew {
    fn default() -> Self {
        Self::new(ClewConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_source_yields_empty_set_never_error() {
        let clew = Clew::default();
        let set = clew.extract_from_code("", "typescript").await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn unknown_language_is_an_error() {
        let clew = Clew::default();
        let err = clew.extract_from_code("x", "cobol").await.unwrap_err();
        assert!(matches!(err, AnankeError::UnsupportedLanguage(_)));
    }

    #[tokio::test]
    async fn extraction_is_deterministic_across_repeated_calls() {
        let clew = Clew::default();
        let src = "pub async fn fetch(id: u64) -> Result<User> { todo!() }";
        let first = clew.extract_from_code(src, "rust").await.unwrap();
        let second = clew.extract_from_code(src, "rust").await.unwrap();
        let first_names: Vec<_> = first.iter().map(|c| c.name.clone()).collect();
        let second_names: Vec<_> = second.iter().map(|c| c.name.clone()).collect();
        assert_eq!(first_names, second_names);
    }

    #[tokio::test]
    async fn all_returned_constraints_pass_the_validator() {
        let clew = Clew::default();
        let src = "pub async fn fetch(id: u64) -> Result<User> { todo!() }\n// must never leak secrets\n";
        let set = clew.extract_from_code(src, "rust").await.unwrap();
        assert!(!set.is_empty());
        for c in set.iter() {
            assert!(crate::validator::is_valid(c));
        }
    }
}
