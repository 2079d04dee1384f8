//! # Classificador por Gazetteer
//!
//! Um [`Classifier`] offline, baseado em listas de palavras conhecidas
//! (gazetteers) e em uma regra de título. Serve para rodar o serviço e os
//! testes sem um runtime de rede neural, produzindo predições no mesmo formato
//! fragmentado de um modelo BERT/RoBERTa.
//!
//! ## Formato do `gazetteer.json`
//!
//! ```json
//! {
//!   "entities": { "PERSON_LASTNAME": ["Smith", "Jones"], "LOCATION": ["Amsterdam"] },
//!   "title_rule": { "titles": ["mr", "dr"], "label": "PERSON_LASTNAME" }
//! }
//! ```
//!
//! A regra de título marca a palavra capitalizada que segue um título
//! ("Dr. Silva" → "Silva"), mesmo fora das listas.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::decode::TokenizationScheme;
use crate::error::Result;
use crate::prediction::{Classifier, TokenPrediction, NON_ENTITY};
use crate::tokenizer::{tokenize_words, Word, DEFAULT_MAX_PIECE_CHARS};

/// Regra "título + Nome Capitalizado".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRule {
    /// Títulos em minúsculas, sem ponto (ex: "mr", "dr").
    pub titles: Vec<String>,
    /// Rótulo atribuído à palavra seguinte.
    pub label: String,
}

/// Conteúdo do `gazetteer.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GazetteerFile {
    #[serde(default)]
    pub entities: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub title_rule: Option<TitleRule>,
}

/// Classificador determinístico por listas de palavras.
#[derive(Debug, Clone)]
pub struct GazetteerClassifier {
    scheme: TokenizationScheme,
    max_piece_chars: usize,
    /// Palavra em minúsculas → rótulo.
    entries: HashMap<String, String>,
    title_rule: Option<TitleRule>,
}

impl GazetteerClassifier {
    pub fn new(scheme: TokenizationScheme) -> Self {
        Self {
            scheme,
            max_piece_chars: DEFAULT_MAX_PIECE_CHARS,
            entries: HashMap::new(),
            title_rule: None,
        }
    }

    /// Carrega o `gazetteer.json` do modelo configurado.
    pub fn load(config: &Config) -> Result<Self> {
        let classifier = Self::from_file(&config.gazetteer_path(), config.scheme)?;
        debug!(
            language = %config.language,
            entries = classifier.entries.len(),
            "gazetteer carregado"
        );
        Ok(classifier)
    }

    pub fn from_file(path: &Path, scheme: TokenizationScheme) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let file: GazetteerFile = serde_json::from_str(&raw)?;
        Ok(Self::from_gazetteer(file, scheme))
    }

    pub fn from_gazetteer(file: GazetteerFile, scheme: TokenizationScheme) -> Self {
        let mut classifier = Self::new(scheme);
        for (label, names) in &file.entities {
            for name in names {
                classifier.add(label, name);
            }
        }
        classifier.title_rule = file.title_rule;
        classifier
    }

    /// Tamanho máximo dos fragmentos gerados.
    pub fn with_max_piece_chars(mut self, max_piece_chars: usize) -> Self {
        self.max_piece_chars = max_piece_chars.max(1);
        self
    }

    pub fn with_title_rule(mut self, rule: TitleRule) -> Self {
        self.title_rule = Some(rule);
        self
    }

    /// Adiciona um nome. Nomes compostos são registrados palavra a palavra.
    ///
    /// Se a palavra já existe com outro rótulo, o primeiro rótulo é mantido.
    pub fn add(&mut self, label: &str, name: &str) {
        for part in name.split_whitespace() {
            self.entries
                .entry(part.to_lowercase())
                .or_insert_with(|| label.to_string());
        }
    }

    pub fn scheme(&self) -> TokenizationScheme {
        self.scheme
    }

    /// Rótulo de cada palavra (na ordem de `words`).
    fn label_words(&self, words: &[Word]) -> Vec<String> {
        let mut labels: Vec<String> = words
            .iter()
            .map(|w| {
                self.entries
                    .get(&w.text.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| NON_ENTITY.to_string())
            })
            .collect();

        if let Some(rule) = &self.title_rule {
            for i in 0..words.len() {
                if !rule.titles.contains(&words[i].text.to_lowercase()) {
                    continue;
                }
                // Pula o ponto de abreviação ("Dr." → "Dr", ".")
                let mut next = i + 1;
                if words.get(next).map(|w| w.text == ".").unwrap_or(false) {
                    next += 1;
                }
                let Some(candidate) = words.get(next) else {
                    continue;
                };
                let capitalized = candidate
                    .text
                    .chars()
                    .next()
                    .map(char::is_uppercase)
                    .unwrap_or(false);
                if capitalized && labels[next] == NON_ENTITY {
                    labels[next] = rule.label.clone();
                }
            }
        }
        labels
    }
}

impl Classifier for GazetteerClassifier {
    fn classify(&self, text: &str) -> Result<Vec<TokenPrediction>> {
        let words = tokenize_words(text, self.scheme, self.max_piece_chars);
        let labels = self.label_words(&words);

        let predictions = words
            .iter()
            .zip(labels)
            .flat_map(|(word, label)| {
                word.pieces
                    .iter()
                    .map(move |p| TokenPrediction::new(p.text.clone(), p.start, p.end, label.clone()))
            })
            .collect();
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn classifier(scheme: TokenizationScheme) -> GazetteerClassifier {
        let mut c = GazetteerClassifier::new(scheme);
        c.add("PERSON_LASTNAME", "Johnson");
        c.add("LOCATION", "New York");
        c
    }

    #[test]
    fn test_gazetteer_labels_all_fragments() {
        let c = classifier(TokenizationScheme::WordPiece);
        let preds = c.classify("Mrs Johnson").unwrap();
        let johnson: Vec<&TokenPrediction> = preds.iter().filter(|p| p.start >= 4).collect();
        assert_eq!(johnson.len(), 2);
        assert!(johnson.iter().all(|p| p.entity == "PERSON_LASTNAME"));
        assert_eq!(preds[0].entity, NON_ENTITY);
    }

    #[test]
    fn test_round_trip_through_decode() {
        let c = classifier(TokenizationScheme::ByteLevelBpe);
        let preds = c.classify("She moved to New York with Johnson.").unwrap();
        let merged = decode(&preds, c.scheme());
        let entities: Vec<(&str, &str)> = merged
            .iter()
            .filter(|m| m.is_entity())
            .map(|m| (m.word.as_str(), m.entity.as_str()))
            .collect();
        assert_eq!(
            entities,
            vec![("New", "LOCATION"), ("York", "LOCATION"), ("Johnson.", "PERSON_LASTNAME")]
        );
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let c = classifier(TokenizationScheme::WordPiece);
        let preds = c.classify("JOHNSON").unwrap();
        assert!(preds.iter().all(|p| p.entity == "PERSON_LASTNAME"));
    }

    #[test]
    fn test_title_rule() {
        let c = GazetteerClassifier::new(TokenizationScheme::WordPiece).with_title_rule(TitleRule {
            titles: vec!["dr".into(), "mr".into()],
            label: "PERSON_LASTNAME".into(),
        });
        let preds = c.classify("Dr. Smith met mr jones").unwrap();
        let merged = decode(&preds, c.scheme());
        let found: Vec<&str> = merged
            .iter()
            .filter(|m| m.is_entity())
            .map(|m| m.word.as_str())
            .collect();
        // "jones" não é capitalizado
        assert_eq!(found, vec!["Smith"]);
    }

    #[test]
    fn test_piece_size() {
        let c = classifier(TokenizationScheme::WordPiece).with_max_piece_chars(2);
        let preds = c.classify("Johnson").unwrap();
        let pieces: Vec<&str> = preds.iter().map(|p| p.word.as_str()).collect();
        assert_eq!(pieces, vec!["Jo", "##hn", "##so", "##n"]);
        assert_eq!(decode(&preds, c.scheme())[0].word, "Johnson");
    }

    #[test]
    fn test_first_label_kept() {
        let mut c = GazetteerClassifier::new(TokenizationScheme::WordPiece);
        c.add("PERSON_FIRSTNAME", "Jordan");
        c.add("LOCATION", "Jordan");
        let preds = c.classify("Jordan").unwrap();
        assert_eq!(preds[0].entity, "PERSON_FIRSTNAME");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gazetteer.json");
        fs::write(
            &path,
            r#"{"entities": {"LOCATION": ["Utrecht"]}, "title_rule": {"titles": ["dr"], "label": "PERSON"}}"#,
        )
        .unwrap();
        let c = GazetteerClassifier::from_file(&path, TokenizationScheme::WordPiece).unwrap();
        let merged = decode(&c.classify("Dr Bakker in Utrecht").unwrap(), c.scheme());
        let found: Vec<(&str, &str)> = merged
            .iter()
            .filter(|m| m.is_entity())
            .map(|m| (m.word.as_str(), m.entity.as_str()))
            .collect();
        assert_eq!(found, vec![("Bakker", "PERSON"), ("Utrecht", "LOCATION")]);
    }
}
