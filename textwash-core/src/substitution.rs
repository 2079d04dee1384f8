//! # Motor de Substituição
//!
//! Aplica o [`ReplacementMapping`] ao texto original.
//!
//! ## Garantias
//!
//! 1. **Palavra inteira**: `Ann` nunca casa dentro de `Annual`.
//! 2. **Maior primeiro**: com `Ann` e `Anna` no mapeamento, `Anna` tem prioridade,
//!    então nunca aparece algo como `PERSON_1a`.
//! 3. **Global**: todas as ocorrências são substituídas.
//!
//! Todas as palavras entram em um único autômato Aho-Corasick. Cada ocorrência
//! candidata só vale se tiver fronteira de palavra nos dois lados (como `\b`);
//! na posição válida mais à esquerda vence a palavra mais longa. A saída é
//! montada em uma única passada, então um substituto já inserido nunca é
//! reescrito por outra entrada.

use std::cmp::Reverse;

use aho_corasick::AhoCorasick;

use crate::error::Result;
use crate::mapping::ReplacementMapping;

/// Ordem de aplicação: mais longa primeiro (em caracteres), empate lexicográfico.
pub fn replacement_order(mapping: &ReplacementMapping) -> Vec<&str> {
    let mut words: Vec<&str> = mapping.iter().map(|(w, _)| w).filter(|w| !w.is_empty()).collect();
    words.sort_by_cached_key(|w| (Reverse(w.chars().count()), *w));
    words
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Fronteira de palavra no offset `at`, com a mesma regra do `\b`.
fn is_boundary(text: &str, at: usize) -> bool {
    let before = text[..at].chars().next_back().map(is_word_char).unwrap_or(false);
    let after = text[at..].chars().next().map(is_word_char).unwrap_or(false);
    before != after
}

/// Substitui cada palavra mapeada (como palavra inteira) pelo seu substituto.
pub fn substitute(text: &str, mapping: &ReplacementMapping) -> Result<String> {
    let words = replacement_order(mapping);
    if words.is_empty() {
        return Ok(text.to_string());
    }
    let matcher = AhoCorasick::new(&words)?;

    // Todas as ocorrências com fronteira nos dois lados: início crescente, mais longa antes
    let mut candidates: Vec<(usize, usize, usize)> = matcher
        .find_overlapping_iter(text)
        .filter(|m| is_boundary(text, m.start()) && is_boundary(text, m.end()))
        .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
        .collect();
    candidates.sort_unstable_by_key(|&(start, end, _)| (start, Reverse(end)));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end, pattern) in candidates {
        if start < cursor {
            continue;
        }
        let word = words[pattern];
        out.push_str(&text[cursor..start]);
        out.push_str(mapping.get(word).unwrap_or(word));
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}
