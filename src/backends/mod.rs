//! Translation backends. Each takes a deduplicated word set and a language
//! pair and returns a `LookupResult`, memoized through a `CacheStore`.

mod w2w;
mod yandex;

pub use w2w::translations_w2w;
pub use yandex::{request_yandex, translations_yandex};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Word -> translations, with coverage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub translations: BTreeMap<String, Vec<String>>,
    /// Queries issued: one per unique word, summed across composite members.
    pub total_queries: usize,
    /// Words for which no translation was found.
    pub not_translated: usize,
}

impl LookupResult {
    pub(crate) fn lowercased(mut self) -> Self {
        for translations in self.translations.values_mut() {
            for t in translations.iter_mut() {
                *t = t.to_lowercase();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    W2w,
    Yandex,
    YandexSyns,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::W2w, Backend::Yandex, Backend::YandexSyns];

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::W2w => "w2w",
            Backend::Yandex => "yandex",
            Backend::YandexSyns => "yandex_syns",
        }
    }

    /// Function identity used in cache keys.
    pub(crate) fn cache_function(self) -> &'static str {
        match self {
            Backend::W2w => "translations_w2w",
            Backend::Yandex => "translations_yandex",
            Backend::YandexSyns => "translations_yandex_syns",
        }
    }

    pub fn is_remote(self) -> bool {
        matches!(self, Backend::Yandex | Backend::YandexSyns)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend '{0}'")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}
