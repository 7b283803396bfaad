use serde::Deserialize;

/// Successful body of `GET /dicservice.json/lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    pub def: Vec<Definition>,
}

/// One dictionary article (a headword with a part of speech).
#[derive(Debug, Deserialize)]
pub struct Definition {
    pub tr: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
pub struct Translation {
    pub text: String,
    #[serde(default)]
    pub syn: Vec<Synonym>,
}

#[derive(Debug, Deserialize)]
pub struct Synonym {
    pub text: String,
}
