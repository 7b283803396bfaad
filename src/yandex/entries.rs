use super::types::LookupResponse;

/// Flattens a lookup response into translation strings, in article order.
/// With `synonyms`, each translation is followed by its nested synonyms.
pub fn extract_translations(body: &str, synonyms: bool) -> Result<Vec<String>, serde_json::Error> {
    let response: LookupResponse = serde_json::from_str(body)?;

    let mut translations = Vec::new();
    for definition in response.def {
        for tr in definition.tr {
            translations.push(tr.text);
            if synonyms {
                translations.extend(tr.syn.into_iter().map(|s| s.text));
            }
        }
    }
    Ok(translations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "head": {},
        "def": [
            {
                "text": "run",
                "pos": "verb",
                "tr": [
                    {"text": "correr", "syn": [{"text": "huir"}, {"text": "ejecutar"}]},
                    {"text": "Dirigir"}
                ]
            },
            {
                "text": "run",
                "pos": "noun",
                "tr": [{"text": "carrera", "syn": [{"text": "recorrido"}]}]
            }
        ]
    }"#;

    #[test]
    fn flattens_translations_across_articles() {
        let trs = extract_translations(BODY, false).unwrap();
        assert_eq!(trs, vec!["correr", "Dirigir", "carrera"]);
    }

    #[test]
    fn synonyms_follow_their_translation() {
        let trs = extract_translations(BODY, true).unwrap();
        assert_eq!(
            trs,
            vec!["correr", "huir", "ejecutar", "Dirigir", "carrera", "recorrido"]
        );
    }

    #[test]
    fn empty_def_yields_no_translations() {
        let trs = extract_translations(r#"{"head": {}, "def": []}"#, true).unwrap();
        assert!(trs.is_empty());
    }

    #[test]
    fn missing_def_is_an_error() {
        assert!(extract_translations(r#"{"head": {}}"#, false).is_err());
    }

    #[test]
    fn article_without_tr_is_an_error() {
        assert!(extract_translations(r#"{"def": [{"text": "run"}]}"#, false).is_err());
    }

    #[test]
    fn non_json_is_an_error() {
        assert!(extract_translations("<html>oops</html>", false).is_err());
    }
}
