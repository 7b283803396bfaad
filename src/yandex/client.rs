use std::env;

use reqwest::Client;
use tracing::{debug, error, warn};

pub const API_KEY_VAR: &str = "YANDEX_API_KEY";
const API_BASE: &str = "https://dictionary.yandex.net/api/v1/dicservice.json/lookup";

#[derive(Debug, thiserror::Error)]
pub enum YandexError {
    #[error("YANDEX_API_KEY not set. Get one at https://yandex.com/dev/dictionary/")]
    ApiKeyNotSet,

    #[error("Error while translating '{word}' ({lang}): {body}")]
    Api {
        word: String,
        lang: String,
        body: String,
    },

    #[error("Unexpected response while translating '{word}' ({lang}): {reason}")]
    Malformed {
        word: String,
        lang: String,
        body: String,
        reason: String,
    },

    #[error("HTTP {code} while translating '{word}' ({lang}): {body}")]
    Status {
        word: String,
        lang: String,
        code: u16,
        body: String,
    },

    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Single-word dictionary lookup returning the raw JSON response text.
/// Implemented by `YandexClient` for production; mock implementations used in tests.
#[allow(async_fn_in_trait)]
pub trait DictionaryService {
    async fn lookup(&self, word: &str, lang: &str) -> Result<String, YandexError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct YandexClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl YandexClient {
    pub fn new(http: Client, api_key: &str) -> Result<Self, YandexError> {
        Self::with_base_url(http, api_key, API_BASE)
    }

    pub fn from_env(http: Client) -> Result<Self, YandexError> {
        let api_key = env::var(API_KEY_VAR).map_err(|_| YandexError::ApiKeyNotSet)?;
        Self::new(http, &api_key)
    }

    /// Points the client at another lookup endpoint (a mirror, or a mock server).
    pub fn with_base_url(http: Client, api_key: &str, base_url: &str) -> Result<Self, YandexError> {
        if api_key.trim().is_empty() {
            return Err(YandexError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url: base_url.to_string(),
        })
    }

    fn request_url(&self, word: &str, lang: &str) -> Result<url::Url, YandexError> {
        let url = url::Url::parse_with_params(
            &self.base_url,
            [("key", self.api_key.0.as_str()), ("lang", lang), ("text", word)],
        )?;
        Ok(url)
    }
}

impl DictionaryService for YandexClient {
    async fn lookup(&self, word: &str, lang: &str) -> Result<String, YandexError> {
        let url = self.request_url(word, lang)?;

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = serde_json::from_str::<serde_json::Value>(&body);
        if let Ok(value) = &parsed
            && value.get("code").is_some()
        {
            warn!(word, lang, %status, "dictionary API returned an error code");
            return Err(YandexError::Api {
                word: word.to_string(),
                lang: lang.to_string(),
                body,
            });
        }

        if !status.is_success() {
            warn!(word, lang, %status, "dictionary API error (no structured body)");
            return Err(YandexError::Status {
                word: word.to_string(),
                lang: lang.to_string(),
                code: status.as_u16(),
                body,
            });
        }

        if let Err(e) = parsed {
            error!(word, lang, response = %body, error = %e, "unexpected dictionary response");
            return Err(YandexError::Malformed {
                word: word.to_string(),
                lang: lang.to_string(),
                body,
                reason: e.to_string(),
            });
        }

        debug!(word, lang, bytes = body.len(), "dictionary lookup complete");
        Ok(body)
    }
}
