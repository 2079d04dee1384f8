//! # Heurísticas de Pós-processamento
//!
//! O modelo costuma deixar passar números e pronomes/títulos. Duas passadas
//! determinísticas cobrem esses casos, sempre **depois** da substituição das
//! entidades e nunca no modo redact:
//!
//! 1. **Números**: cada sequência máxima de dígitos vira `NUMERIC_n`.
//! 2. **Pronomes e títulos**: vocabulário fixo, sem diferenciar maiúsculas.
//!
//! ## Exemplo
//!
//! ```rust
//! use textwash_core::heuristics::apply_heuristics;
//!
//! let out = apply_heuristics("Mr. X paid 12 and 123");
//! assert_eq!(out, "MR/MS. X paid NUMERIC_1 and NUMERIC_2");
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Marcador para pronomes pessoais com gênero.
pub const PRONOUN_MARKER: &str = "PRONOUN";
/// Marcador para pronomes de tratamento (Mr, Mrs, Ms, Miss).
pub const HONORIFIC_MARKER: &str = "MR/MS";
/// Marcador para títulos acadêmicos/profissionais.
pub const TITLE_MARKER: &str = "TITLE";

/// Vocabulário fixo (em minúsculas) e seu marcador.
///
/// Nenhuma entrada é substring de outra como palavra inteira, então a ordem não importa.
pub const PRONOUNS_AND_TITLES: &[(&str, &str)] = &[
    ("he", PRONOUN_MARKER),
    ("she", PRONOUN_MARKER),
    ("him", PRONOUN_MARKER),
    ("his", PRONOUN_MARKER),
    ("her", PRONOUN_MARKER),
    ("hers", PRONOUN_MARKER),
    ("himself", PRONOUN_MARKER),
    ("herself", PRONOUN_MARKER),
    ("mr", HONORIFIC_MARKER),
    ("mrs", HONORIFIC_MARKER),
    ("ms", HONORIFIC_MARKER),
    ("miss", HONORIFIC_MARKER),
    ("dr", TITLE_MARKER),
    ("prof", TITLE_MARKER),
];

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Marcadores inseridos pela substituição (`PERSON_1`, `PERSON_FIRSTNAME_12`).
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Z_]*_\d+\b").unwrap());

static PRONOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<&str> = PRONOUNS_AND_TITLES.iter().map(|(w, _)| *w).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).unwrap()
});

/// Uma sequência de dígitos candidata: offset de byte e texto.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DigitRun<'a> {
    start: usize,
    end: usize,
    digits: &'a str,
}

/// Sequências máximas de dígitos, exceto as que pertencem a um marcador já
/// inserido (o `1` de `PERSON_1`). Dígitos colados a letras do texto original
/// (`B12`) continuam sendo candidatos.
fn numeric_runs(text: &str) -> Vec<DigitRun<'_>> {
    let mut protected = PLACEHOLDER_RE.find_iter(text).peekable();
    DIGIT_RUN_RE
        .find_iter(text)
        .filter(|m| {
            // Ambos os iteradores avançam em ordem de offset
            while protected.next_if(|p| p.end() <= m.start()).is_some() {}
            !protected
                .peek()
                .map(|p| p.start() <= m.start() && m.end() <= p.end())
                .unwrap_or(false)
        })
        .map(|m| DigitRun {
            start: m.start(),
            end: m.end(),
            digits: m.as_str(),
        })
        .collect()
}

/// Compara duas sequências de dígitos pelo valor numérico, sem limite de tamanho.
fn cmp_numeric(a: &str, b: &str) -> std::cmp::Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// `NUMERIC_n` de cada sequência distinta, numerado pela primeira aparição.
fn assign_placeholders<'a>(runs: &[DigitRun<'a>]) -> HashMap<&'a str, String> {
    let mut assigned: HashMap<&str, String> = HashMap::new();
    for run in runs {
        let next = assigned.len() + 1;
        assigned
            .entry(run.digits)
            .or_insert_with(|| format!("NUMERIC_{}", next));
    }
    assigned
}

/// Atribui `NUMERIC_n` às sequências distintas, na ordem da primeira aparição.
///
/// A lista devolvida vem ordenada do maior valor para o menor (`123` antes de
/// `12`). [`replace_numerics`] troca apenas sequências inteiras, então essa
/// ordem nunca muda o resultado.
pub fn numeric_placeholders(text: &str) -> Vec<(String, String)> {
    let mut placeholders: Vec<(String, String)> = assign_placeholders(&numeric_runs(text))
        .into_iter()
        .map(|(digits, placeholder)| (digits.to_string(), placeholder))
        .collect();
    placeholders.sort_by(|a, b| cmp_numeric(&b.0, &a.0).then_with(|| b.0.cmp(&a.0)));
    placeholders
}

/// Substitui cada sequência numérica isolada pelo seu `NUMERIC_n`.
///
/// Cada substituição casa a sequência inteira, nunca um pedaço de uma
/// sequência maior. Se a sequência estiver colada a um caractere anterior
/// que não é espaço, um espaço é inserido antes do marcador.
pub fn replace_numerics(text: &str) -> String {
    let runs = numeric_runs(text);
    if runs.is_empty() {
        return text.to_string();
    }
    let placeholders = assign_placeholders(&runs);

    let mut out = String::with_capacity(text.len() + runs.len() * 10);
    let mut cursor = 0;
    for run in &runs {
        out.push_str(&text[cursor..run.start]);
        let glued = text[..run.start]
            .chars()
            .next_back()
            .map(|c| !c.is_whitespace())
            .unwrap_or(false);
        if glued {
            out.push(' ');
        }
        if let Some(placeholder) = placeholders.get(run.digits) {
            out.push_str(placeholder);
        }
        cursor = run.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Substitui pronomes e títulos do vocabulário fixo pelo marcador correspondente.
pub fn replace_pronouns_and_titles(text: &str) -> String {
    let lookup: HashMap<&str, &str> = PRONOUNS_AND_TITLES.iter().copied().collect();
    PRONOUN_RE
        .replace_all(text, |caps: &Captures| {
            let found = &caps[0];
            lookup
                .get(found.to_lowercase().as_str())
                .copied()
                .unwrap_or(found)
                .to_string()
        })
        .into_owned()
}

/// Passada numérica seguida da passada de pronomes/títulos.
pub fn apply_heuristics(text: &str) -> String {
    replace_pronouns_and_titles(&replace_numerics(text))
}
