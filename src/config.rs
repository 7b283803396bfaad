use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::words::CaseFolding;

pub const CACHE_DIR_VAR: &str = "LEMMA_TRANSLATE_CACHE_DIR";
pub const LEXICON_DIR_VAR: &str = "LEMMA_TRANSLATE_LEXICON_DIR";
pub const DEFAULT_CACHE_DIR: &str = "data/trans_cache";

/// What a remote backend does when a single word's lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The whole batch fails with the word's error.
    #[default]
    Abort,
    /// The word gets no translations and counts as not translated.
    RecordEmpty,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::RecordEmpty => "record_empty",
        }
    }
}

/// Runtime settings for a `Translator`.
///
/// Environment variables:
/// - `LEMMA_TRANSLATE_CACHE_DIR`: result cache root (default `data/trans_cache`)
/// - `LEMMA_TRANSLATE_LEXICON_DIR`: directory of `<src>-<dst>.tsv` lexicons (optional)
/// - `YANDEX_API_KEY`: read by `YandexClient::from_env`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub cache_dir: PathBuf,
    pub lexicon_dir: Option<PathBuf>,
    pub case_folding: CaseFolding,
    pub on_error: FailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            lexicon_dir: None,
            case_folding: CaseFolding::default(),
            on_error: FailurePolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            var(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            cache_dir: non_empty(CACHE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            lexicon_dir: non_empty(LEXICON_DIR_VAR).map(PathBuf::from),
            ..defaults
        }
    }
}
