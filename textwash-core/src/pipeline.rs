//! # Pipeline de Anonimização
//!
//! Orquestra os estágios do núcleo:
//!
//! 1. **Classificação**: o [`Classifier`] externo rotula os fragmentos.
//! 2. **Decodificação** ([`crate::decode`]): fragmentos viram palavras inteiras.
//! 3. **Filtro** ([`crate::filter`]): sobram só entidades alfanuméricas com mais de um caractere.
//! 4. **Mapeamento** ([`crate::mapping`]): cada palavra ganha seu substituto.
//! 5. **Substituição** ([`crate::substitution`]): aplicação segura no texto.
//! 6. **Heurísticas** ([`crate::heuristics`]): números, pronomes e títulos (exceto no modo redact).
//!
//! Nenhum estado é compartilhado entre chamadas: contadores e mapeamento são
//! criados a cada anonimização.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decode::{decode, TokenizationScheme};
use crate::error::Result;
use crate::filter::filter_entities;
use crate::heuristics::apply_heuristics;
use crate::mapping::{build_mapping, DuplicatePolicy, ReplacementMapping, Strategy};
use crate::prediction::{Classifier, MergedEntity};
use crate::substitution::substitute;

/// Opções de uma chamada de anonimização.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizeOptions {
    /// Tipos a anonimizar. `None` = todos; lista vazia = nenhum.
    #[serde(default)]
    pub selected_entities: Option<Vec<String>>,
    #[serde(default)]
    pub strategy: Strategy,
    /// Incluir o mapeamento no resultado.
    #[serde(default)]
    pub return_mapping: bool,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl AnonymizeOptions {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_selected_entities(mut self, selected: Option<Vec<String>>) -> Self {
        self.selected_entities = selected;
        self
    }

    pub fn with_mapping(mut self) -> Self {
        self.return_mapping = true;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Texto anonimizado e, se pedido, o mapeamento usado.
///
/// O mapeamento é a "chave" para auditar ou reverter a transformação. A
/// reversão não é garantida se o texto original já continha um substituto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizationResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<ReplacementMapping>,
}

/// Anonimiza `text` a partir de entidades já filtradas (estágios 4 a 6).
pub fn anonymize_with_entities(
    text: &str,
    entities: &[MergedEntity],
    options: &AnonymizeOptions,
) -> Result<AnonymizationResult> {
    let mapping = build_mapping(
        entities,
        options.selected_entities.as_deref(),
        options.strategy,
        options.duplicate_policy,
    );
    debug!(words = mapping.len(), strategy = options.strategy.name(), "mapeamento construído");

    let mut anonymized = substitute(text, &mapping)?;
    if options.strategy != Strategy::Redact {
        anonymized = apply_heuristics(&anonymized);
    }

    Ok(AnonymizationResult {
        text: anonymized,
        mapping: options.return_mapping.then_some(mapping),
    })
}

/// O anonimizador: um classificador mais o esquema de tokenização do seu modelo.
///
/// É `Send + Sync` sempre que o classificador for, e pode ser compartilhado
/// entre threads (ex: atrás de um `Arc` no servidor).
pub struct Anonymizer<C> {
    classifier: C,
    scheme: TokenizationScheme,
}

impl<C: Classifier> Anonymizer<C> {
    pub fn new(classifier: C, scheme: TokenizationScheme) -> Self {
        Self { classifier, scheme }
    }

    pub fn scheme(&self) -> TokenizationScheme {
        self.scheme
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classifica, decodifica e filtra. Erros do classificador sobem sem alteração.
    pub fn analyze(&self, text: &str) -> Result<Vec<MergedEntity>> {
        let predictions = self.classifier.classify(text)?;
        let merged = decode(&predictions, self.scheme);
        let entities = filter_entities(merged);
        debug!(
            predictions = predictions.len(),
            entities = entities.len(),
            scheme = self.scheme.model_family(),
            "análise concluída"
        );
        Ok(entities)
    }

    /// Pipeline completo: análise seguida de mapeamento, substituição e heurísticas.
    pub fn anonymize(&self, text: &str, options: &AnonymizeOptions) -> Result<AnonymizationResult> {
        let entities = self.analyze(text)?;
        anonymize_with_entities(text, &entities, options)
    }
}

impl<C: Classifier + Sync> Anonymizer<C> {
    /// Anonimiza vários textos em paralelo (Rayon). Cada texto tem seus próprios contadores.
    ///
    /// Falha no primeiro erro encontrado.
    pub fn anonymize_batch(
        &self,
        texts: &[String],
        options: &AnonymizeOptions,
    ) -> Result<Vec<AnonymizationResult>> {
        texts
            .par_iter()
            .map(|text| self.anonymize(text, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mapping::REDACTED;
    use crate::prediction::TokenPrediction;
    use crate::rule_based::{GazetteerClassifier, TitleRule};

    fn entity(word: &str, entity: &str) -> MergedEntity {
        MergedEntity {
            word: word.to_string(),
            start: 0,
            end: 0,
            entity: entity.to_string(),
        }
    }

    fn people_classifier(scheme: TokenizationScheme) -> GazetteerClassifier {
        let mut c = GazetteerClassifier::new(scheme);
        c.add("PERSON", "Smith");
        c.add("PERSON", "Jones");
        c.add("PERSON", "Ann");
        c.add("PERSON", "Anna");
        c.add("LOCATION", "Amsterdam");
        c
    }

    #[test]
    fn test_end_to_end_standard() {
        let text = "Dr. Smith called Mr. Jones on the 5th at 1990";
        let entities = vec![entity("Smith", "PERSON"), entity("Jones", "PERSON")];
        let result =
            anonymize_with_entities(text, &entities, &AnonymizeOptions::default()).unwrap();
        assert_eq!(
            result.text,
            "TITLE. PERSON_1 called MR/MS. PERSON_2 on the NUMERIC_1th at NUMERIC_2"
        );
        assert!(result.mapping.is_none());
    }

    #[test]
    fn test_end_to_end_with_classifier() {
        for scheme in [TokenizationScheme::WordPiece, TokenizationScheme::ByteLevelBpe] {
            let anonymizer = Anonymizer::new(people_classifier(scheme), scheme);
            let result = anonymizer
                .anonymize(
                    "Dr. Smith called Mr. Jones on the 5th at 1990",
                    &AnonymizeOptions::default().with_mapping(),
                )
                .unwrap();
            assert_eq!(
                result.text,
                "TITLE. PERSON_1 called MR/MS. PERSON_2 on the NUMERIC_1th at NUMERIC_2"
            );
            let mapping = result.mapping.unwrap();
            assert_eq!(mapping.get("Smith"), Some("PERSON_1"));
            assert_eq!(mapping.get("Jones"), Some("PERSON_2"));
        }
    }

    #[test]
    fn test_no_entities_only_heuristics() {
        let anonymizer = Anonymizer::new(people_classifier(TokenizationScheme::WordPiece), TokenizationScheme::WordPiece);
        let text = "nothing to see here";
        let result = anonymizer.anonymize(text, &AnonymizeOptions::default()).unwrap();
        assert_eq!(result.text, text);

        let result = anonymizer
            .anonymize("she paid 40 euros", &AnonymizeOptions::default())
            .unwrap();
        assert_eq!(result.text, "PRONOUN paid NUMERIC_1 euros");
    }

    #[test]
    fn test_redact_skips_heuristics_and_is_idempotent() {
        let anonymizer = Anonymizer::new(people_classifier(TokenizationScheme::WordPiece), TokenizationScheme::WordPiece);
        let options = AnonymizeOptions::new(Strategy::Redact);
        let once = anonymizer
            .anonymize("Smith met Anna in Amsterdam in 2020, he said", &options)
            .unwrap();
        assert_eq!(
            once.text,
            format!("{r} met {r} in {r} in 2020, he said", r = REDACTED)
        );
        let twice = anonymizer.anonymize(&once.text, &options).unwrap();
        assert_eq!(twice.text, once.text);
    }

    #[test]
    fn test_selected_entities() {
        let anonymizer = Anonymizer::new(people_classifier(TokenizationScheme::WordPiece), TokenizationScheme::WordPiece);
        let options = AnonymizeOptions::default()
            .with_selected_entities(Some(vec!["LOCATION".to_string()]))
            .with_mapping();
        let result = anonymizer.anonymize("Anna lives in Amsterdam", &options).unwrap();
        assert_eq!(result.text, "Anna lives in LOCATION_1");
        assert_eq!(result.mapping.unwrap().len(), 1);

        let options = AnonymizeOptions::default().with_selected_entities(Some(vec![]));
        let result = anonymizer.anonymize("Anna lives in Amsterdam", &options).unwrap();
        assert_eq!(result.text, "Anna lives in Amsterdam");
    }

    #[test]
    fn test_longest_match_end_to_end() {
        let anonymizer = Anonymizer::new(people_classifier(TokenizationScheme::WordPiece), TokenizationScheme::WordPiece);
        let result = anonymizer
            .anonymize("Ann and Anna", &AnonymizeOptions::default())
            .unwrap();
        assert_eq!(result.text, "PERSON_1 and PERSON_2");
    }

    #[test]
    fn test_classifier_error_propagates() {
        let failing = |_: &str| -> Result<Vec<TokenPrediction>> {
            Err(Error::Classifier("modelo indisponível".into()))
        };
        let anonymizer = Anonymizer::new(failing, TokenizationScheme::WordPiece);
        assert!(matches!(anonymizer.analyze("x"), Err(Error::Classifier(_))));
        assert!(anonymizer.anonymize("x", &AnonymizeOptions::default()).is_err());
    }

    #[test]
    fn test_analyze_filters_and_keeps_order() {
        let classifier = |_: &str| -> Result<Vec<TokenPrediction>> {
            Ok(vec![
                TokenPrediction::new("Jan", 0, 3, "PERSON_FIRSTNAME"),
                TokenPrediction::new("##ssen", 3, 7, "PERSON_FIRSTNAME"),
                TokenPrediction::new("woont", 8, 13, "NONE"),
                TokenPrediction::new("in", 14, 16, "NONE"),
                TokenPrediction::new("X", 17, 18, "LOCATION"),
                TokenPrediction::new("Delft", 19, 24, "LOCATION"),
            ])
        };
        let anonymizer = Anonymizer::new(classifier, TokenizationScheme::WordPiece);
        let entities = anonymizer.analyze("Janssen woont in X Delft").unwrap();
        let words: Vec<&str> = entities.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["Janssen", "Delft"]);
    }

    #[test]
    fn test_batch_counters_are_independent() {
        let anonymizer = Anonymizer::new(people_classifier(TokenizationScheme::ByteLevelBpe), TokenizationScheme::ByteLevelBpe);
        let texts = vec!["Jones and Smith".to_string(), "Smith and Jones".to_string()];
        let results = anonymizer
            .anonymize_batch(&texts, &AnonymizeOptions::default())
            .unwrap();
        assert_eq!(results[0].text, "PERSON_1 and PERSON_2");
        assert_eq!(results[1].text, "PERSON_1 and PERSON_2");
    }

    #[test]
    fn test_title_rule_classifier() {
        let classifier = GazetteerClassifier::new(TokenizationScheme::WordPiece).with_title_rule(TitleRule {
            titles: vec!["dr".into()],
            label: "PERSON".into(),
        });
        let anonymizer = Anonymizer::new(classifier, TokenizationScheme::WordPiece);
        let result = anonymizer
            .anonymize("Dr. Bakker", &AnonymizeOptions::default())
            .unwrap();
        assert_eq!(result.text, "TITLE. PERSON_1");
    }
}
