use crate::backends::Backend;
use crate::lexicon::LexiconError;
use crate::yandex::YandexError;

/// Invalid translator setup, reported before any lookup runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Incorrect mode: '{0}'. Expected one of w2w, yandex, yandex_syns, or a '+'-joined list of them")]
    UnknownMode(String),

    #[error("Incorrect mode: '{mode}' ('{member}' is not one of w2w, yandex, yandex_syns)")]
    UnknownMember { mode: String, member: String },

    #[error("Backend '{backend}' is not configured: {hint}")]
    BackendUnavailable {
        backend: Backend,
        hint: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Dictionary(#[from] YandexError),
}
