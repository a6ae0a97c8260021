//! Fixed word lists used by keyword filtering and sentiment scoring.
//!
//! The lists are plain static data. `Lexicon` turns them into lookup sets and
//! lets callers extend them without touching the pipeline.

use std::collections::HashSet;
use thiserror::Error;

/// Common pronouns, articles, conjunctions and prepositions.
/// A keyword containing any of these words is dropped.
pub const STOPWORDS: &[&str] = &[
    "i", "me", "my", "we", "our", "us", "you", "your", "he", "she", "it", "they", "them", "the",
    "a", "an", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "is", "are",
];

/// Terms never reported as keywords on their own.
pub const NEGATIVE_TERMS: &[&str] = &[
    "bad",
    "awful",
    "disgusting",
    "slow",
    "unfriendly",
    "terrible",
    "sappy",
    "experience",
];

pub const POSITIVE_WORDS: &[&str] = &["good", "great", "awesome", "delicious", "friendly", "fantastic"];

pub const NEGATIVE_WORDS: &[&str] = &["bad", "awful", "disgusting", "slow", "unfriendly", "terrible"];

/// Leading determiners stripped from extracted phrases.
pub const DETERMINERS: &[&str] = &["the", "a", "an"];

#[derive(Debug, Error, PartialEq)]
pub enum LexiconError {
    #[error("'{0}' cannot be both a positive and a negative sentiment word")]
    Conflict(String),
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
    negative_terms: HashSet<String>,
    positive_words: HashSet<String>,
    negative_words: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            stopwords: to_set(STOPWORDS),
            negative_terms: to_set(NEGATIVE_TERMS),
            positive_words: to_set(POSITIVE_WORDS),
            negative_words: to_set(NEGATIVE_WORDS),
        }
    }
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

impl Lexicon {
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn with_negative_terms<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.negative_terms
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Extends both sentiment lists. Fails if a word would end up in both.
    pub fn with_sentiment_words<P, N, S>(mut self, positive: P, negative: N) -> Result<Self, LexiconError>
    where
        P: IntoIterator<Item = S>,
        N: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.positive_words
            .extend(positive.into_iter().map(|w| w.as_ref().to_lowercase()));
        self.negative_words
            .extend(negative.into_iter().map(|w| w.as_ref().to_lowercase()));

        if let Some(word) = self.positive_words.intersection(&self.negative_words).next() {
            return Err(LexiconError::Conflict(word.clone()));
        }
        Ok(self)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn is_negative_term(&self, phrase: &str) -> bool {
        self.negative_terms.contains(phrase)
    }

    /// +1 for a positive word, -1 for a negative word, 0 otherwise.
    pub fn polarity(&self, word: &str) -> i32 {
        if self.positive_words.contains(word) {
            1
        } else if self.negative_words.contains(word) {
            -1
        } else {
            0
        }
    }
}

pub fn is_determiner(word: &str) -> bool {
    DETERMINERS.contains(&word)
}

/// Lowercases and folds typographic apostrophes (’ ‘) to `'`, so "don’t"
/// and "don't" tokenize the same way.
pub fn fold_text(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}
