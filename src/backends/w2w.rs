use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{Backend, LookupResult};
use crate::cache::{CacheKey, CacheStore, memoize};
use crate::lexicon::{Lexicon, LexiconError, LexiconSource};

/// Looks every word up in the `(src, dst)` lexicon. Missing entries become
/// empty translation sets and count as not translated; they never fail the batch.
pub async fn translations_w2w<L: LexiconSource>(
    lexicons: &L,
    cache: &impl CacheStore,
    words: &BTreeSet<String>,
    src: &str,
    dst: &str,
) -> Result<LookupResult, LexiconError> {
    let key = CacheKey::new(Backend::W2w.cache_function())
        .words(words)
        .arg(src)
        .arg(dst);

    memoize(cache, &key, || async {
        let lexicon = lexicons.open(src, dst)?;
        let mut translations = BTreeMap::new();
        let mut not_translated = 0;

        for word in words {
            let found = lexicon.lookup(word).unwrap_or_else(|| {
                not_translated += 1;
                Vec::new()
            });
            translations.insert(word.clone(), found);
        }

        debug!(src, dst, words = words.len(), not_translated, "lexicon batch complete");
        Ok::<_, LexiconError>(LookupResult {
            translations,
            total_queries: words.len(),
            not_translated,
        })
    })
    .await
}
