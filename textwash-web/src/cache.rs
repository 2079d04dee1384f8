//! Cache de anonimizadores por idioma.
//!
//! Cada modelo é carregado na primeira requisição daquele idioma e reaproveitado
//! depois, compartilhado entre as tasks via `Arc`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use textwash_core::rule_based::GazetteerClassifier;
use textwash_core::{Anonymizer, Config, Language};
use tracing::info;

pub type SharedAnonymizer = Arc<Anonymizer<GazetteerClassifier>>;

pub struct ModelCache {
    data_dir: PathBuf,
    models: RwLock<HashMap<Language, SharedAnonymizer>>,
}

impl ModelCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Configuração do idioma (falha se o modelo não existe).
    pub fn config(&self, language: Language) -> textwash_core::Result<Config> {
        Config::new(language, &self.data_dir)
    }

    /// Devolve o anonimizador do idioma, carregando-o se necessário.
    pub fn get(&self, language: Language) -> textwash_core::Result<SharedAnonymizer> {
        if let Some(found) = self
            .models
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&language)
        {
            return Ok(Arc::clone(found));
        }

        info!("Carregando modelo para {}...", language);
        let config = self.config(language)?;
        let classifier = GazetteerClassifier::load(&config)?;
        let anonymizer = Arc::new(Anonymizer::new(classifier, config.scheme));

        let mut models = self
            .models
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Outra requisição pode ter carregado o mesmo idioma enquanto isso
        let entry = models.entry(language).or_insert(anonymizer);
        Ok(Arc::clone(entry))
    }

    #[cfg(test)]
    pub fn is_loaded(&self, language: Language) -> bool {
        self.models
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let nl = dir.path().join("nl");
        std::fs::create_dir(&nl).unwrap();
        std::fs::write(nl.join("gazetteer.json"), r#"{"entities": {"LOCATION": ["Delft"]}}"#).unwrap();

        let cache = ModelCache::new(dir.path());
        assert!(!cache.is_loaded(Language::Nl));
        let first = cache.get(Language::Nl).unwrap();
        let second = cache.get(Language::Nl).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.scheme(), Language::Nl.scheme());
    }

    #[test]
    fn test_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path());
        assert!(matches!(
            cache.get(Language::En),
            Err(textwash_core::Error::ModelNotFound(_))
        ));
        assert!(!cache.is_loaded(Language::En));
    }
}
