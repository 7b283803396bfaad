//! Mode parsing and multi-backend aggregation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::backends::{Backend, LookupResult, translations_w2w, translations_yandex};
use crate::cache::CacheStore;
use crate::config::FailurePolicy;
use crate::error::{ConfigError, TranslateError};
use crate::lexicon::LexiconSource;
use crate::words::{CaseFolding, unique_words};
use crate::yandex::DictionaryService;

pub const MODE_SEPARATOR: char = '+';

/// Which backends to run: one, or several concatenated in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single(Backend),
    Composite(Vec<Backend>),
}

impl Mode {
    pub fn backends(&self) -> &[Backend] {
        match self {
            Mode::Single(backend) => std::slice::from_ref(backend),
            Mode::Composite(backends) => backends,
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(backend) = s.parse::<Backend>() {
            return Ok(Mode::Single(backend));
        }
        if !s.contains(MODE_SEPARATOR) {
            return Err(ConfigError::UnknownMode(s.to_string()));
        }
        s.split(MODE_SEPARATOR)
            .map(|member| {
                member.parse::<Backend>().map_err(|_| ConfigError::UnknownMember {
                    mode: s.to_string(),
                    member: member.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Mode::Composite)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.backends().iter().map(|b| b.as_str()).collect();
        f.write_str(&names.join("+"))
    }
}

/// Dispatches word batches to the configured backends and merges the results.
///
/// Backends the translator was built without are rejected when a mode that
/// needs them is validated, before any lookup runs.
pub struct Translator<L, S, C> {
    lexicons: Option<L>,
    dictionary: Option<S>,
    cache: C,
    case_folding: CaseFolding,
    on_error: FailurePolicy,
}

impl<L, S, C> Translator<L, S, C>
where
    L: LexiconSource,
    S: DictionaryService,
    C: CacheStore,
{
    pub fn new(cache: C) -> Self {
        Self {
            lexicons: None,
            dictionary: None,
            cache,
            case_folding: CaseFolding::default(),
            on_error: FailurePolicy::default(),
        }
    }

    pub fn with_lexicons(mut self, lexicons: L) -> Self {
        self.lexicons = Some(lexicons);
        self
    }

    pub fn with_dictionary(mut self, dictionary: S) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn case_folding(mut self, case_folding: CaseFolding) -> Self {
        self.case_folding = case_folding;
        self
    }

    pub fn on_error(mut self, on_error: FailurePolicy) -> Self {
        self.on_error = on_error;
        self
    }

    /// Translates `words` with the backends named by `mode` (`"w2w"`,
    /// `"yandex+yandex_syns"`, ...).
    ///
    /// A single backend's translations are lowercased. A composite mode runs
    /// each member through that same single-backend path and concatenates the
    /// per-word results in member order; its counters are plain sums, so a
    /// word missed by two members counts twice in `not_translated`.
    pub async fn translations<I, W>(
        &self,
        words: I,
        mode: &str,
        src: &str,
        dst: &str,
    ) -> Result<LookupResult, TranslateError>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mode: Mode = mode.parse()?;
        self.translate_with(words, &mode, src, dst).await
    }

    pub async fn translate_with<I, W>(
        &self,
        words: I,
        mode: &Mode,
        src: &str,
        dst: &str,
    ) -> Result<LookupResult, TranslateError>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        self.ensure_available(mode)?;
        info!(mode = %mode, src, dst, "getting translations");

        let words = unique_words(words, self.case_folding);

        match mode {
            Mode::Single(backend) => self.single(*backend, &words, src, dst).await,
            Mode::Composite(backends) => {
                let mut merged = LookupResult::default();
                for backend in backends {
                    let result = self.single(*backend, &words, src, dst).await?;
                    merged.total_queries += result.total_queries;
                    merged.not_translated += result.not_translated;
                    for (word, translations) in result.translations {
                        merged.translations.entry(word).or_default().extend(translations);
                    }
                }
                debug!(
                    mode = %mode,
                    total_queries = merged.total_queries,
                    not_translated = merged.not_translated,
                    "composite translations merged"
                );
                Ok(merged)
            }
        }
    }

    async fn single(
        &self,
        backend: Backend,
        words: &BTreeSet<String>,
        src: &str,
        dst: &str,
    ) -> Result<LookupResult, TranslateError> {
        let result = match backend {
            Backend::W2w => {
                let lexicons = self.lexicons.as_ref().ok_or(unavailable(backend))?;
                translations_w2w(lexicons, &self.cache, words, src, dst).await?
            }
            Backend::Yandex | Backend::YandexSyns => {
                let dictionary = self.dictionary.as_ref().ok_or(unavailable(backend))?;
                let synonyms = backend == Backend::YandexSyns;
                translations_yandex(dictionary, &self.cache, words, src, dst, synonyms, self.on_error)
                    .await?
            }
        };
        Ok(result.lowercased())
    }

    fn ensure_available(&self, mode: &Mode) -> Result<(), ConfigError> {
        for &backend in mode.backends() {
            let configured = if backend.is_remote() {
                self.dictionary.is_some()
            } else {
                self.lexicons.is_some()
            };
            if !configured {
                return Err(unavailable(backend));
            }
        }
        Ok(())
    }
}

fn unavailable(backend: Backend) -> ConfigError {
    let hint = if backend.is_remote() {
        "set YANDEX_API_KEY"
    } else {
        "set LEMMA_TRANSLATE_LEXICON_DIR or pass --lexicon-dir"
    };
    ConfigError::BackendUnavailable { backend, hint }
}
