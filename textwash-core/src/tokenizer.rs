//! # Tokenizador de Sub-palavras
//!
//! Divide o texto em palavras e cada palavra em fragmentos, imitando a saída de
//! tokenizadores Transformer para o [`crate::rule_based::GazetteerClassifier`].
//!
//! ## Marcação por Esquema
//!
//! - **WordPiece**: primeiro fragmento cru, os seguintes com `##` (`"Johnson"` → `"John"`, `"##son"`).
//! - **ByteLevelBpe**: primeiro fragmento com `Ġ` se a palavra vier depois de um
//!   espaço; os seguintes crus (`" Johnson"` → `"ĠJohn"`, `"son"`). Pontuação colada
//!   à palavra anterior não recebe `Ġ`, como no tokenizador real.
//!
//! Todos os offsets são de **caractere**, não de byte.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use textwash_core::decode::TokenizationScheme;
//! use textwash_core::tokenizer::tokenize_words;
//!
//! let words = tokenize_words("Ann Johnson", TokenizationScheme::WordPiece, 4);
//! let pieces: Vec<&str> = words[1].pieces.iter().map(|p| p.text.as_str()).collect();
//! assert_eq!(pieces, vec!["John", "##son"]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::decode::{TokenizationScheme, BPE_WORD_START, WORDPIECE_CONTINUATION};

/// Tamanho padrão (em caracteres) de cada fragmento.
pub const DEFAULT_MAX_PIECE_CHARS: usize = 4;

/// Um fragmento de palavra, já com o marcador do esquema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Uma palavra do texto original e seus fragmentos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Texto da palavra sem marcadores.
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// A palavra vem logo depois de espaço em branco.
    pub after_space: bool,
    pub pieces: Vec<Piece>,
}

/// Segmenta o texto em palavras (limites Unicode) e fragmenta cada palavra.
///
/// Espaços em branco não geram palavras. `max_piece_chars` igual a zero é tratado como 1.
pub fn tokenize_words(text: &str, scheme: TokenizationScheme, max_piece_chars: usize) -> Vec<Word> {
    let max_piece_chars = max_piece_chars.max(1);
    let mut words = Vec::new();
    let mut char_pos = 0;
    let mut after_space = false;

    for segment in text.split_word_bounds() {
        let len = segment.chars().count();
        if segment.chars().all(char::is_whitespace) {
            after_space = true;
            char_pos += len;
            continue;
        }

        let pieces = split_pieces(segment, char_pos, scheme, max_piece_chars, after_space);
        words.push(Word {
            text: segment.to_string(),
            start: char_pos,
            end: char_pos + len,
            after_space,
            pieces,
        });
        after_space = false;
        char_pos += len;
    }
    words
}

fn split_pieces(
    word: &str,
    start: usize,
    scheme: TokenizationScheme,
    max_piece_chars: usize,
    after_space: bool,
) -> Vec<Piece> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_piece_chars)
        .enumerate()
        .map(|(i, chunk)| {
            let raw: String = chunk.iter().collect();
            let piece_start = start + i * max_piece_chars;
            let text = match (scheme, i) {
                (TokenizationScheme::WordPiece, 0) => raw,
                (TokenizationScheme::WordPiece, _) => format!("{}{}", WORDPIECE_CONTINUATION, raw),
                (TokenizationScheme::ByteLevelBpe, 0) if after_space => format!("{}{}", BPE_WORD_START, raw),
                (TokenizationScheme::ByteLevelBpe, _) => raw,
            };
            Piece {
                text,
                start: piece_start,
                end: piece_start + chunk.len(),
            }
        })
        .collect()
}
