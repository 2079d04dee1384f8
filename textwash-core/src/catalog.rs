//! Catálogo de tipos de entidade que um modelo consegue detectar.
//!
//! Lido do `config.json` do modelo (`id2label`), sem os rótulos genéricos.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Rótulos que não representam um tipo de entidade.
pub const GENERIC_LABELS: &[&str] = &["NONE", "PAD", "O"];

#[derive(Debug, Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

/// Tipos de entidade suportados pelo modelo em `model_dir`, em ordem alfabética.
///
/// Sem `config.json` a lista é vazia.
pub fn available_entities(model_dir: &Path) -> Result<Vec<String>> {
    let config_path = model_dir.join("config.json");
    if !config_path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(&config_path)?;
    let config: ModelConfig = serde_json::from_str(&raw)?;
    let labels: BTreeSet<String> = config
        .id2label
        .into_values()
        .filter(|label| !GENERIC_LABELS.contains(&label.as_str()))
        .collect();
    Ok(labels.into_iter().collect())
}
