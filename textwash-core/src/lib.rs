//! # textwash-core — Anonimização de PII sobre Predições de NER
//!
//! Este crate transforma a saída ruidosa de um classificador NER (rótulos por
//! sub-palavra) em um texto anonimizado, de forma determinística e segura.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em linha reta, cada estágio em seu módulo:
//!
//! 1.  **Entrada**: Texto bruto e um [`Classifier`] (modelo externo ou [`rule_based::GazetteerClassifier`]).
//! 2.  **Decodificação** ([`decode`]): fragmentos `##son` / `Ġjohn` viram palavras inteiras.
//! 3.  **Filtro** ([`filter`]): descarta não-entidades, letras soltas e pontuação.
//! 4.  **Mapeamento** ([`mapping`]): `Smith` → `PERSON_1`, ou `[REDACTED]`.
//! 5.  **Substituição** ([`substitution`]): palavra inteira, mais longa primeiro.
//! 6.  **Heurísticas** ([`heuristics`]): `1990` → `NUMERIC_1`, `Dr` → `TITLE`.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use textwash_core::{AnonymizeOptions, Anonymizer, TokenizationScheme};
//! use textwash_core::rule_based::GazetteerClassifier;
//!
//! let mut classifier = GazetteerClassifier::new(TokenizationScheme::ByteLevelBpe);
//! classifier.add("PERSON", "Smith");
//!
//! let anonymizer = Anonymizer::new(classifier, TokenizationScheme::ByteLevelBpe);
//! let result = anonymizer
//!     .anonymize("Dr. Smith was born in 1990", &AnonymizeOptions::default())
//!     .unwrap();
//! assert_eq!(result.text, "TITLE. PERSON_1 was born in NUMERIC_1");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador ([`Anonymizer`]).
//! - [`config`]: Idioma, diretório do modelo e esquema de tokenização.
//! - [`catalog`]: Tipos de entidade suportados por um modelo.

pub mod catalog;
pub mod config;
pub mod decode;
pub mod error;
pub mod filter;
pub mod heuristics;
pub mod mapping;
pub mod pipeline;
pub mod prediction;
pub mod rule_based;
pub mod substitution;
pub mod tokenizer;

pub use config::{Config, Language};
pub use decode::TokenizationScheme;
pub use error::{Error, Result};
pub use mapping::{DuplicatePolicy, ReplacementMapping, Strategy};
pub use pipeline::{AnonymizationResult, AnonymizeOptions, Anonymizer};
pub use prediction::{Classifier, MergedEntity, TokenPrediction};
