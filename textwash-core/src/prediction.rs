//! # Predições do Classificador e Entidades Reconstruídas
//!
//! O classificador NER externo devolve uma lista de fragmentos (sub-palavras),
//! cada um com seu rótulo. Este módulo define:
//!
//! - [`TokenPrediction`]: a saída crua do classificador, imutável.
//! - [`MergedEntity`]: uma palavra inteira reconstruída pelo [`crate::decode`].
//! - [`Classifier`]: a fronteira com o modelo (carregamento e cache ficam fora do núcleo).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rótulo usado pelo classificador para "não é entidade".
pub const NON_ENTITY: &str = "NONE";

/// Uma unidade crua produzida pelo classificador.
///
/// `start` e `end` são offsets de **caractere** no texto original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPrediction {
    /// Texto do fragmento, possivelmente com marcadores do tokenizador (ex: "##son", "ĠJohn").
    pub word: String,
    pub start: usize,
    pub end: usize,
    /// Rótulo da entidade (ex: "PERSON_FIRSTNAME"), ou `"NONE"`.
    pub entity: String,
}

impl TokenPrediction {
    pub fn new(word: impl Into<String>, start: usize, end: usize, entity: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            start,
            end,
            entity: entity.into(),
        }
    }
}

/// Uma palavra inteira reconstruída a partir de um ou mais fragmentos.
///
/// O intervalo `start..end` só cresce durante a fusão; o rótulo `entity`
/// vem do primeiro fragmento e nunca muda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedEntity {
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub entity: String,
}

impl MergedEntity {
    /// Verdadeiro se o rótulo não é o rótulo neutro.
    pub fn is_entity(&self) -> bool {
        self.entity != NON_ENTITY
    }
}

impl From<&TokenPrediction> for MergedEntity {
    fn from(fragment: &TokenPrediction) -> Self {
        Self {
            word: fragment.word.clone(),
            start: fragment.start,
            end: fragment.end,
            entity: fragment.entity.clone(),
        }
    }
}

/// Capacidade de classificar um texto em fragmentos rotulados.
///
/// Implementações devem devolver as predições da esquerda para a direita.
/// Qualquer erro é propagado sem retentativa pelo [`crate::Anonymizer`].
pub trait Classifier {
    fn classify(&self, text: &str) -> Result<Vec<TokenPrediction>>;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Result<Vec<TokenPrediction>>,
{
    fn classify(&self, text: &str) -> Result<Vec<TokenPrediction>> {
        self(text)
    }
}
