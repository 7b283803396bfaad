//! Yandex Dictionary API: HTTP client, wire types and entry flattening.

pub mod client;
pub mod entries;
pub mod types;

pub use client::{DictionaryService, YandexClient, YandexError};
