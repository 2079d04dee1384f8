//! Tipos de erro do núcleo de anonimização.
//!
//! O núcleo não tenta se recuperar de nenhuma falha: tudo sobe para quem chamou.

use std::path::PathBuf;

use thiserror::Error;

/// Erro principal do `textwash-core`.
#[derive(Debug, Error)]
pub enum Error {
    /// O classificador externo falhou. A mensagem é repassada sem alteração.
    #[error("Falha no classificador: {0}")]
    Classifier(String),

    /// Idioma fora da lista suportada (`en`, `nl`).
    #[error("Idioma inválido '{0}'")]
    InvalidLanguage(String),

    /// Diretório do modelo não existe.
    #[error("Modelo não encontrado em {}", .0.display())]
    ModelNotFound(PathBuf),

    /// O autômato de substituição não pôde ser construído.
    #[error("Falha ao montar o autômato de substituição: {0}")]
    Matcher(#[from] aho_corasick::BuildError),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
