//! # Construção do Mapeamento de Substituição
//!
//! A partir das entidades filtradas, decide o que cada palavra vira no texto
//! anonimizado:
//!
//! - **Standard**: numeração independente por tipo (`PERSON_1`, `PERSON_2`, `LOCATION_1`...).
//! - **Redact**: tudo vira `[REDACTED]`.
//!
//! Os contadores vivem em um [`TypeCounters`] criado a cada chamada, então duas
//! anonimizações concorrentes nunca compartilham numeração.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::prediction::MergedEntity;

/// Texto usado no lugar de toda entidade no modo redact.
pub const REDACTED: &str = "[REDACTED]";

/// Estratégia de anonimização.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Substitui por `TIPO_n`, numerado por tipo em ordem de aparição.
    #[default]
    Standard,
    /// Substitui por `[REDACTED]` e desliga as heurísticas.
    Redact,
}

impl Strategy {
    /// Interpreta o nome vindo de fora. Valores desconhecidos caem em `Standard`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "redact" => Strategy::Redact,
            _ => Strategy::Standard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Standard => "standard",
            Strategy::Redact => "redact",
        }
    }
}

/// O que fazer quando a mesma palavra aparece com dois tipos diferentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// O último tipo visto sobrescreve (comportamento histórico).
    #[default]
    LastWins,
    /// O primeiro tipo visto é mantido.
    FirstWins,
}

/// Mapeamento palavra original → substituto, em ordem de inserção.
///
/// Serializa como um objeto JSON (`{"Smith": "PERSON_1"}`) preservando a ordem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMapping {
    entries: Vec<(String, String)>,
    /// Palavra → posição em `entries`.
    index: HashMap<String, usize>,
}

impl ReplacementMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere ou substitui o valor de `word`, mantendo a posição original.
    pub fn insert(&mut self, word: impl Into<String>, replacement: impl Into<String>) {
        let word = word.into();
        let replacement = replacement.into();
        match self.index.get(&word) {
            Some(&pos) => self.entries[pos].1 = replacement,
            None => {
                self.index.insert(word.clone(), self.entries.len());
                self.entries.push((word, replacement));
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.index
            .get(word)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(w, r)| (w.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ReplacementMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, replacement) in &self.entries {
            map.serialize_entry(word, replacement)?;
        }
        map.end()
    }
}

/// Contadores por tipo de entidade, válidos para uma única chamada.
#[derive(Debug, Default)]
pub struct TypeCounters {
    next: HashMap<String, usize>,
}

impl TypeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devolve o próximo rótulo numerado para o tipo (`PERSON_1`, `PERSON_2`...).
    pub fn next_label(&mut self, entity_type: &str) -> String {
        let counter = self.next.entry(entity_type.to_string()).or_insert(1);
        let label = format!("{}_{}", entity_type, counter);
        *counter += 1;
        label
    }
}

/// Tabela palavra → tipo com ordem de primeira aparição.
fn collapse_types(entities: &[MergedEntity], policy: DuplicatePolicy) -> Vec<(&str, &str)> {
    let mut table: Vec<(&str, &str)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entity in entities {
        match index.get(entity.word.as_str()) {
            Some(&pos) => {
                if policy == DuplicatePolicy::LastWins {
                    table[pos].1 = entity.entity.as_str();
                }
            }
            None => {
                index.insert(entity.word.as_str(), table.len());
                table.push((entity.word.as_str(), entity.entity.as_str()));
            }
        }
    }
    table
}

/// Constrói o mapeamento de substituição.
///
/// `selected`: `None` mantém todos os tipos; `Some(&[])` descarta tudo.
pub fn build_mapping(
    entities: &[MergedEntity],
    selected: Option<&[String]>,
    strategy: Strategy,
    policy: DuplicatePolicy,
) -> ReplacementMapping {
    let mut counters = TypeCounters::new();
    let mut mapping = ReplacementMapping::new();

    for (word, entity_type) in collapse_types(entities, policy) {
        if let Some(allowed) = selected {
            if !allowed.iter().any(|t| t == entity_type) {
                continue;
            }
        }
        let replacement = match strategy {
            Strategy::Redact => REDACTED.to_string(),
            Strategy::Standard => counters.next_label(entity_type),
        };
        mapping.insert(word, replacement);
    }
    mapping
}
