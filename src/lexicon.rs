//! Bilingual lexicons backing the `w2w` backend.
//!
//! A lexicon is an in-memory word -> translations table for one language pair.
//! `LexiconDir` loads them from tab-separated files:
//! ```text
//! # en-es
//! dog	perro	can
//! house	casa	hogar
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("no lexicon for {src}-{dst} (looked in {path})")]
    Unavailable {
        src: String,
        dst: String,
        path: PathBuf,
    },

    #[error("invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Word lookup for a single language pair.
pub trait Lexicon {
    /// Returns `None` when the word has no entry.
    fn lookup(&self, word: &str) -> Option<Vec<String>>;
}

/// Opens the lexicon for a `(src, dst)` language pair.
pub trait LexiconSource {
    type Lexicon: Lexicon;

    fn open(&self, src: &str, dst: &str) -> Result<Self::Lexicon, LexiconError>;
}

#[derive(Debug, Default, Clone)]
pub struct TsvLexicon {
    entries: HashMap<String, Vec<String>>,
}

impl TsvLexicon {
    pub fn parse(content: &str) -> Self {
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let Some(word) = fields.next().map(str::trim).filter(|w| !w.is_empty()) else {
                continue;
            };
            let translations = fields
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            entries.entry(word.to_string()).or_default().extend(translations);
        }
        Self { entries }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Lexicon for TsvLexicon {
    fn lookup(&self, word: &str) -> Option<Vec<String>> {
        self.entries.get(word).cloned()
    }
}

/// Directory of `<src>-<dst>.tsv` lexicon files.
#[derive(Debug, Clone)]
pub struct LexiconDir {
    root: PathBuf,
}

impl LexiconDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, src: &str, dst: &str) -> Result<PathBuf, LexiconError> {
        validate_language(src)?;
        validate_language(dst)?;
        Ok(self.root.join(format!("{src}-{dst}.tsv")))
    }
}

/// Language codes become part of a file name: ASCII letters, digits, `-`
/// and `_` only.
fn validate_language(code: &str) -> Result<(), LexiconError> {
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LexiconError::InvalidLanguage(code.to_string()))
    }
}

impl LexiconSource for LexiconDir {
    type Lexicon = TsvLexicon;

    fn open(&self, src: &str, dst: &str) -> Result<TsvLexicon, LexiconError> {
        let path = self.path_for(src, dst)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LexiconError::Unavailable {
                    src: src.to_string(),
                    dst: dst.to_string(),
                    path,
                });
            }
            Err(source) => return Err(LexiconError::Io { path, source }),
        };
        let lexicon = TsvLexicon::parse(&content);
        debug!(path = %path.display(), entries = lexicon.len(), "lexicon loaded");
        Ok(lexicon)
    }
}
