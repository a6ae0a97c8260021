//! Lexicon-based sentiment scoring.
//!
//! Every token found in the positive list adds one, every token found in the
//! negative list subtracts one, and the sum is divided by the total number of
//! tokens. No model, no weighting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::lexicon::{self, Lexicon};

static TOKEN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}']+").expect("token separator pattern"));

/// Result of scoring a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub score: f64,
    pub positive: usize,
    pub negative: usize,
    pub tokens: usize,
}

/// Lowercase words. Apostrophes inside a word are kept ("don't", "don’t"),
/// everything else that is not a letter or digit separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowercase_text = lexicon::fold_text(text);
    TOKEN_SEPARATOR
        .split(&lowercase_text)
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scores `corpus`. Returns `None` when it contains no tokens at all.
pub fn score(corpus: &str, lexicon: &Lexicon) -> Option<SentimentScore> {
    let words = tokenize(corpus);
    if words.is_empty() {
        return None;
    }

    let mut positive = 0;
    let mut negative = 0;
    for word in &words {
        match lexicon.polarity(word) {
            1 => positive += 1,
            -1 => negative += 1,
            _ => {}
        }
    }

    let score = (positive as f64 - negative as f64) / words.len() as f64;

    tracing::debug!(
        tokens = words.len(),
        positive,
        negative,
        score,
        "sentiment scored"
    );

    Some(SentimentScore {
        score,
        positive,
        negative,
        tokens: words.len(),
    })
}
