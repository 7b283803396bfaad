use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How raw input words are normalized before deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// Keep words exactly as given; `Run` and `run` are distinct.
    #[default]
    Preserve,
    /// Fold every word to lowercase, so `Run` and `run` are one lemma.
    Lower,
}

impl CaseFolding {
    pub fn apply(self, word: &str) -> String {
        match self {
            CaseFolding::Lower => word.to_lowercase(),
            CaseFolding::Preserve => word.to_string(),
        }
    }
}

/// Normalizes and deduplicates words. The sorted set doubles as the
/// order-independent cache argument for every backend.
pub fn unique_words<I, S>(words: I, folding: CaseFolding) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| folding.apply(w.as_ref()))
        .collect()
}
