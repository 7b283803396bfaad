//! Word-level translation lookup across a bilingual lexicon and the Yandex
//! Dictionary API, with every backend result memoized in a persistent cache.

pub mod aggregate;
pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod words;
pub mod yandex;

pub const USER_AGENT: &str = concat!("lemma-translate/", env!("CARGO_PKG_VERSION"));

pub use aggregate::{Mode, Translator};
pub use backends::{Backend, LookupResult};
pub use cache::{CacheKey, CacheStore, DiskCache, MemoryCache};
pub use config::{FailurePolicy, Settings};
pub use error::{ConfigError, TranslateError};
pub use lexicon::{Lexicon, LexiconDir, LexiconSource};
pub use words::CaseFolding;
pub use yandex::{DictionaryService, YandexClient};
