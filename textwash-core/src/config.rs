//! # Configuração por Idioma
//!
//! Cada idioma tem seu próprio modelo em `<data_dir>/<código>` e usa a família
//! de tokenizador correspondente:
//!
//! | Idioma | Modelo  | Esquema          |
//! |--------|---------|------------------|
//! | `nl`   | BERT    | `WordPiece`      |
//! | `en`   | RoBERTa | `ByteLevelBpe`   |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::TokenizationScheme;
use crate::error::{Error, Result};

/// Idiomas suportados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Nl,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Nl => "nl",
        }
    }

    /// Esquema de tokenização do modelo deste idioma.
    pub fn scheme(&self) -> TokenizationScheme {
        match self {
            Language::Nl => TokenizationScheme::WordPiece,
            Language::En => TokenizationScheme::ByteLevelBpe,
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(Language::En),
            "nl" => Ok(Language::Nl),
            other => Err(Error::InvalidLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Configuração resolvida para um idioma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub language: Language,
    /// Diretório do modelo (`<data_dir>/<código>`).
    pub model_dir: PathBuf,
    pub scheme: TokenizationScheme,
}

impl Config {
    /// Resolve os caminhos e verifica que o modelo existe.
    pub fn new(language: Language, data_dir: impl AsRef<Path>) -> Result<Self> {
        let model_dir = data_dir.as_ref().join(language.code());
        if !model_dir.is_dir() {
            return Err(Error::ModelNotFound(model_dir));
        }
        Ok(Self {
            language,
            model_dir,
            scheme: language.scheme(),
        })
    }

    /// Atalho a partir do código do idioma (ex: "nl").
    pub fn from_code(code: &str, data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(code.parse()?, data_dir)
    }

    /// `config.json` do modelo (mapa `id2label`).
    pub fn model_config_path(&self) -> PathBuf {
        self.model_dir.join("config.json")
    }

    /// `gazetteer.json` usado pelo [`crate::rule_based::GazetteerClassifier`].
    pub fn gazetteer_path(&self) -> PathBuf {
        self.model_dir.join("gazetteer.json")
    }
}
