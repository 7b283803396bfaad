use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error, warn};

use super::{Backend, LookupResult};
use crate::cache::{CacheKey, CacheStore, memoize, memoize_when};
use crate::config::FailurePolicy;
use crate::yandex::entries::extract_translations;
use crate::yandex::{DictionaryService, YandexError};

const REQUEST_FUNCTION: &str = "yandex_request";

/// Fetches the raw lookup response for one word, memoized per `(word, lang)`.
/// Error-coded responses surface as errors and are never stored.
pub async fn request_yandex<S: DictionaryService>(
    service: &S,
    cache: &impl CacheStore,
    word: &str,
    lang: &str,
) -> Result<String, YandexError> {
    let key = CacheKey::new(REQUEST_FUNCTION).arg(word).arg(lang);
    memoize(cache, &key, || service.lookup(word, lang)).await
}

/// One dictionary request per unique word, flattened into translation sets.
/// With `synonyms`, each translation is followed by its synonyms.
///
/// Under `FailurePolicy::Abort` the first failing word fails the whole batch
/// and no partial result is returned or cached. Under
/// `FailurePolicy::RecordEmpty` a batch with recovered failures is returned
/// but not cached.
pub async fn translations_yandex<S: DictionaryService>(
    service: &S,
    cache: &impl CacheStore,
    words: &BTreeSet<String>,
    src: &str,
    dst: &str,
    synonyms: bool,
    policy: FailurePolicy,
) -> Result<LookupResult, YandexError> {
    let backend = if synonyms {
        Backend::YandexSyns
    } else {
        Backend::Yandex
    };
    let key = CacheKey::new(backend.cache_function())
        .words(words)
        .arg(src)
        .arg(dst)
        .arg(policy.as_str());
    let lang = format!("{src}-{dst}");

    memoize_when(cache, &key, || async {
        let mut translations = BTreeMap::new();
        let mut not_translated = 0;
        let mut recovered = 0;

        for word in words {
            let found = match lookup_word(service, cache, word, &lang, synonyms).await {
                Ok(found) => found,
                Err(e) if policy == FailurePolicy::RecordEmpty => {
                    warn!(word = %word, lang = %lang, error = %e, "lookup failed, recording no translations");
                    recovered += 1;
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            if found.is_empty() {
                not_translated += 1;
            }
            translations.insert(word.clone(), found);
        }

        debug!(backend = %backend, lang = %lang, words = words.len(), not_translated, recovered, "dictionary batch complete");
        let result = LookupResult {
            translations,
            total_queries: words.len(),
            not_translated,
        };
        Ok((result, recovered == 0))
    })
    .await
}

async fn lookup_word<S: DictionaryService>(
    service: &S,
    cache: &impl CacheStore,
    word: &str,
    lang: &str,
    synonyms: bool,
) -> Result<Vec<String>, YandexError> {
    let body = request_yandex(service, cache, word, lang).await?;
    extract_translations(&body, synonyms).map_err(|e| {
        error!(word, lang, response = %body, error = %e, "unexpected dictionary response");
        YandexError::Malformed {
            word: word.to_string(),
            lang: lang.to_string(),
            reason: e.to_string(),
            body,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mocks::{MockDictionary, entry, entry_with_syns};
    use crate::cache::MemoryCache;
    use crate::words::{CaseFolding, unique_words};
    use std::sync::Mutex;

    /// Answers 503 on the first request, then a normal article.
    struct FlakyDictionary {
        calls: Mutex<usize>,
    }

    impl DictionaryService for FlakyDictionary {
        async fn lookup(&self, word: &str, lang: &str) -> Result<String, YandexError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                return Err(YandexError::Status {
                    word: word.to_string(),
                    lang: lang.to_string(),
                    code: 503,
                    body: "Service Unavailable".to_string(),
                });
            }
            Ok(r#"{"def":[{"tr":[{"text":"perro"}]}]}"#.to_string())
        }
    }

    fn dictionary() -> MockDictionary {
        MockDictionary::new(&[
            ("dog", entry(&["Perro", "can"])),
            (
                "run",
                entry_with_syns(&[("correr", vec!["huir"]), ("carrera", vec![])]),
            ),
        ])
    }

    #[tokio::test]
    async fn flattens_translations_and_counts_empty_words() {
        let service = dictionary();
        let cache = MemoryCache::new();
        let words = unique_words(["dog", "run", "zzz"], CaseFolding::Lower);

        let result = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(result.translations["dog"], vec!["Perro", "can"]);
        assert_eq!(result.translations["run"], vec!["correr", "carrera"]);
        assert!(result.translations["zzz"].is_empty());
        assert_eq!(result.total_queries, 3);
        assert_eq!(result.not_translated, 1);
        assert_eq!(service.query_count(), 3);
    }

    #[tokio::test]
    async fn synonyms_are_appended_after_their_translation() {
        let service = dictionary();
        let cache = MemoryCache::new();
        let words = unique_words(["run"], CaseFolding::Lower);

        let result = translations_yandex(&service, &cache, &words, "en", "es", true, FailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(result.translations["run"], vec!["correr", "huir", "carrera"]);
    }

    #[tokio::test]
    async fn passes_language_pair_to_service() {
        let service = dictionary();
        let cache = MemoryCache::new();
        let words = unique_words(["dog"], CaseFolding::Lower);

        translations_yandex(&service, &cache, &words, "en", "ru", false, FailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(
            *service.queries.lock().unwrap(),
            vec![("dog".to_string(), "en-ru".to_string())]
        );
    }

    #[tokio::test]
    async fn repeated_call_issues_no_new_requests() {
        let service = dictionary();
        let cache = MemoryCache::new();
        let words = unique_words(["dog", "run"], CaseFolding::Lower);

        let first = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
            .await
            .unwrap();
        let second = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(service.query_count(), 2);
    }

    #[tokio::test]
    async fn plain_and_synonym_variants_share_raw_responses() {
        let service = dictionary();
        let cache = MemoryCache::new();
        let words = unique_words(["dog", "run"], CaseFolding::Lower);

        translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
            .await
            .unwrap();
        let syns = translations_yandex(&service, &cache, &words, "en", "es", true, FailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(syns.translations["run"], vec!["correr", "huir", "carrera"]);
        assert_eq!(service.query_count(), 2);
    }

    #[tokio::test]
    async fn error_code_for_one_word_fails_the_batch() {
        let service = MockDictionary::new(&[
            ("dog", entry(&["perro"])),
            ("bad", serde_json::json!({"code": 501, "message": "Invalid"})),
        ]);
        let cache = MemoryCache::new();
        let words = unique_words(["dog", "bad", "run"], CaseFolding::Lower);

        let err = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
            .await
            .unwrap_err();

        match err {
            YandexError::Api { word, lang, body } => {
                assert_eq!(word, "bad");
                assert_eq!(lang, "en-es");
                assert!(body.contains("501"));
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_batch_is_not_cached() {
        let service = MockDictionary::new(&[("bad", serde_json::json!({"code": 401}))]);
        let cache = MemoryCache::new();
        let words = unique_words(["bad"], CaseFolding::Lower);

        for _ in 0..2 {
            translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
                .await
                .unwrap_err();
        }

        assert_eq!(service.query_count(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn malformed_response_is_fatal() {
        let service = MockDictionary::new(&[("odd", serde_json::json!({"head": {}}))]);
        let cache = MemoryCache::new();
        let words = unique_words(["odd"], CaseFolding::Lower);

        let err = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort)
            .await
            .unwrap_err();

        match err {
            YandexError::Malformed { word, body, .. } => {
                assert_eq!(word, "odd");
                assert!(body.contains("head"));
            }
            other => panic!("expected Malformed error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn record_empty_policy_keeps_the_rest_of_the_batch() {
        let service = MockDictionary::new(&[
            ("dog", entry(&["perro"])),
            ("bad", serde_json::json!({"code": 501})),
        ]);
        let cache = MemoryCache::new();
        let words = unique_words(["dog", "bad"], CaseFolding::Lower);

        let result = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::RecordEmpty)
            .await
            .unwrap();

        assert_eq!(result.translations["dog"], vec!["perro"]);
        assert!(result.translations["bad"].is_empty());
        assert_eq!(result.total_queries, 2);
        assert_eq!(result.not_translated, 1);
    }

    #[tokio::test]
    async fn recovered_failures_are_retried_on_the_next_call() {
        let service = FlakyDictionary { calls: Mutex::new(0) };
        let cache = MemoryCache::new();
        let words = unique_words(["dog"], CaseFolding::Preserve);

        let first = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::RecordEmpty)
            .await
            .unwrap();
        assert!(first.translations["dog"].is_empty());
        assert_eq!(first.not_translated, 1);

        let second = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::RecordEmpty)
            .await
            .unwrap();
        assert_eq!(second.translations["dog"], vec!["perro"]);
        assert_eq!(second.not_translated, 0);

        let third = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::RecordEmpty)
            .await
            .unwrap();
        assert_eq!(third, second);
        assert_eq!(*service.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn policy_is_part_of_the_cache_key() {
        let service = MockDictionary::new(&[("bad", serde_json::json!({"code": 501}))]);
        let cache = MemoryCache::new();
        let words = unique_words(["bad"], CaseFolding::Lower);

        translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::RecordEmpty)
            .await
            .unwrap();
        let strict = translations_yandex(&service, &cache, &words, "en", "es", false, FailurePolicy::Abort).await;

        assert!(strict.is_err());
    }
}
