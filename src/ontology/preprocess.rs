//! Text cleanup for batch population (dataset rows, reports, free text dumps).

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));
static KILOMETERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)km").expect("Invalid regex"));
static METERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)m").expect("Invalid regex"));
static LITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)l").expect("Invalid regex"));
static STRAY_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,?!;:]").expect("Invalid regex"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.?!]+(\s+|$)").expect("Invalid regex"));

/// Collapse whitespace, expand `km` / `m` / `l` unit suffixes on numbers and
/// blank out symbols other than sentence punctuation.
pub fn clean_text(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text, " ");
    let text = KILOMETERS.replace_all(&text, "${1} kilometers");
    let text = METERS.replace_all(&text, "${1} meters");
    let text = LITERS.replace_all(&text, "${1} liters");
    let text = STRAY_SYMBOLS.replace_all(&text, " ");
    text.trim().to_string()
}

/// Split on `.`, `?` or `!` followed by whitespace or the end of the text.
/// The terminating punctuation stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in SENTENCE_END.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        push_trimmed(&mut sentences, &text[last..end]);
        last = m.end();
    }
    push_trimmed(&mut sentences, &text[last..]);
    sentences
}

/// Clean every text, drop the ones that end up empty, split the rest into
/// sentences.
pub fn prepare_sentences<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    let sentences: Vec<String> = texts
        .iter()
        .map(|t| clean_text(t.as_ref()))
        .filter(|t| !t.is_empty())
        .flat_map(|t| split_sentences(&t))
        .collect();
    info!(texts = texts.len(), sentences = sentences.len(), "prepared sentences");
    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}
