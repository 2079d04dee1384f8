//! # Decodificação — Fusão de Sub-palavras em Palavras Inteiras
//!
//! Tokenizadores de modelos Transformer quebram palavras raras em fragmentos.
//! O classificador devolve um rótulo por fragmento, então antes de anonimizar
//! é preciso remontar as palavras originais.
//!
//! ## Esquemas de Tokenização
//!
//! | Esquema        | Família | Marca                  | Exemplo                  |
//! |----------------|---------|------------------------|--------------------------|
//! | `WordPiece`    | BERT    | `##` = continuação     | `John`, `##son`          |
//! | `ByteLevelBpe` | RoBERTa | `Ġ` = início de palavra| `ĠJohn`, `son`           |
//!
//! O esquema é escolhido uma vez por chamada por quem conhece o modelo; ele
//! não é inferido do texto.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use textwash_core::decode::{decode, TokenizationScheme};
//! use textwash_core::TokenPrediction;
//!
//! let preds = vec![
//!     TokenPrediction::new("John", 0, 4, "PERSON"),
//!     TokenPrediction::new("##son", 4, 7, "PERSON"),
//! ];
//! let merged = decode(&preds, TokenizationScheme::WordPiece);
//! assert_eq!(merged[0].word, "Johnson");
//! ```

use serde::{Deserialize, Serialize};

use crate::prediction::{MergedEntity, TokenPrediction};

/// Marca de continuação do WordPiece.
pub const WORDPIECE_CONTINUATION: &str = "##";

/// Marca de início de palavra do BPE em nível de byte (espaço codificado).
pub const BPE_WORD_START: char = 'Ġ';

/// Convenção usada pelo tokenizador para separar palavras de fragmentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizationScheme {
    /// **WordPiece** (BERT): fragmentos que continuam uma palavra começam com `##`.
    WordPiece,
    /// **BPE em nível de byte** (RoBERTa): fragmentos que iniciam palavra começam com `Ġ`;
    /// todo o resto é continuação.
    ByteLevelBpe,
}

impl TokenizationScheme {
    /// O fragmento continua a palavra anterior?
    pub fn continues(&self, fragment: &TokenPrediction) -> bool {
        match self {
            TokenizationScheme::WordPiece => fragment.word.starts_with(WORDPIECE_CONTINUATION),
            TokenizationScheme::ByteLevelBpe => !fragment.word.starts_with(BPE_WORD_START),
        }
    }

    /// Anexa o fragmento à entidade anterior, estendendo o `end`.
    ///
    /// O rótulo da entidade anterior é mantido.
    pub fn merge(&self, prev: &mut MergedEntity, fragment: &TokenPrediction) {
        match self {
            TokenizationScheme::WordPiece => {
                let piece = fragment
                    .word
                    .strip_prefix(WORDPIECE_CONTINUATION)
                    .unwrap_or(&fragment.word);
                prev.word.push_str(piece);
            }
            TokenizationScheme::ByteLevelBpe => prev.word.push_str(&fragment.word),
        }
        prev.end = fragment.end;
    }

    /// Limpeza final depois de todas as fusões.
    fn finish(&self, entity: &mut MergedEntity) {
        if let TokenizationScheme::ByteLevelBpe = self {
            if let Some(rest) = entity.word.strip_prefix(BPE_WORD_START) {
                entity.word = rest.to_string();
            }
        }
    }

    /// Nome da família de modelos associada (ex: "bert").
    pub fn model_family(&self) -> &'static str {
        match self {
            TokenizationScheme::WordPiece => "bert",
            TokenizationScheme::ByteLevelBpe => "roberta",
        }
    }
}

/// Reconstrói palavras inteiras a partir das predições por fragmento.
///
/// Um fragmento de continuação que chega sem entidade anterior (primeiro da
/// lista) abre uma nova entidade.
pub fn decode(predictions: &[TokenPrediction], scheme: TokenizationScheme) -> Vec<MergedEntity> {
    let mut entities: Vec<MergedEntity> = Vec::with_capacity(predictions.len());

    for fragment in predictions {
        match entities.last_mut() {
            Some(prev) if scheme.continues(fragment) => scheme.merge(prev, fragment),
            _ => entities.push(MergedEntity::from(fragment)),
        }
    }

    for entity in &mut entities {
        scheme.finish(entity);
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(word: &str, start: usize, end: usize, entity: &str) -> TokenPrediction {
        TokenPrediction::new(word, start, end, entity)
    }

    #[test]
    fn test_wordpiece_merge() {
        let preds = vec![p("John", 0, 4, "PERSON"), p("##son", 4, 7, "PERSON")];
        let merged = decode(&preds, TokenizationScheme::WordPiece);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].word, "Johnson");
        assert_eq!(merged[0].entity, "PERSON");
        assert_eq!((merged[0].start, merged[0].end), (0, 7));
    }

    #[test]
    fn test_bpe_merge_then_strip_marker() {
        let preds = vec![p("ĠJohn", 1, 5, "PERSON"), p("son", 5, 8, "PERSON")];
        let merged = decode(&preds, TokenizationScheme::ByteLevelBpe);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].word, "Johnson");
        assert_eq!((merged[0].start, merged[0].end), (1, 8));
    }

    #[test]
    fn test_bpe_strips_only_one_marker() {
        let preds = vec![p("ĠĠx", 0, 1, "NONE")];
        let merged = decode(&preds, TokenizationScheme::ByteLevelBpe);
        assert_eq!(merged[0].word, "Ġx");
    }

    #[test]
    fn test_leading_continuation_starts_entity() {
        let merged = decode(&[p("##ab", 0, 2, "NONE")], TokenizationScheme::WordPiece);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].word, "##ab");

        // Primeira palavra de um texto RoBERTa não tem `Ġ`
        let merged = decode(
            &[p("Hello", 0, 5, "NONE"), p("ĠAnna", 5, 10, "PERSON")],
            TokenizationScheme::ByteLevelBpe,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].word, "Hello");
        assert_eq!(merged[1].word, "Anna");
    }

    #[test]
    fn test_label_fixed_by_first_fragment() {
        let preds = vec![p("Ams", 0, 3, "LOCATION"), p("##terdam", 3, 9, "NONE")];
        let merged = decode(&preds, TokenizationScheme::WordPiece);
        assert_eq!(merged[0].word, "Amsterdam");
        assert_eq!(merged[0].entity, "LOCATION");
    }

    #[test]
    fn test_bpe_punctuation_glues_to_previous_word() {
        let preds = vec![p("Dr", 0, 2, "NONE"), p(".", 2, 3, "NONE"), p("ĠSmith", 3, 9, "PERSON")];
        let merged = decode(&preds, TokenizationScheme::ByteLevelBpe);
        let words: Vec<&str> = merged.iter().map(|m| m.word.as_str()).collect();
        assert_eq!(words, vec!["Dr.", "Smith"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(decode(&[], TokenizationScheme::WordPiece).is_empty());
    }
}
