//! Keyword extraction from review text.
//!
//! Phrases are found by a small rule-based chunker: clauses are cut at
//! punctuation, then at function words (prepositions, pronouns, auxiliaries,
//! adverbs). What remains between cuts is a candidate noun phrase. Two
//! strategies sit behind [`PhraseExtractor`]: full noun phrases, and the head
//! noun of each phrase as a fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::lexicon::{self, Lexicon};

/// Longest phrase, in words, kept as a keyword.
pub const MAX_KEYWORD_WORDS: usize = 3;

static CLAUSE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}'\s-]+").expect("clause separator pattern"));

// Words that end a chunk and are not part of any phrase.
static BREAK_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        // prepositions
        "of", "in", "on", "at", "to", "for", "with", "from", "by", "about", "into", "over",
        "under", "near", "behind", "after", "before", "during", "through", "around", "without",
        "between", "across", "inside", "outside", "up", "down", "off", "out", "than", "like",
        // conjunctions
        "and", "or", "but", "so", "because", "while", "although", "though", "if", "when",
        "where", "then", "yet", "nor", "as",
        // pronouns and non-article determiners
        "i", "me", "my", "mine", "we", "us", "our", "you", "your", "he", "him", "his", "she",
        "her", "it", "its", "it's", "they", "them", "their", "this", "that", "these", "those",
        "who", "which", "what", "there", "here", "everyone", "everything", "something",
        "nothing", "some", "any", "every", "all", "each", "both", "other", "another",
        // auxiliaries and common verbs
        "is", "are", "was", "were", "be", "been", "being", "am", "has", "have", "had", "do",
        "does", "did", "will", "would", "can", "could", "should", "may", "might", "must",
        "shall", "get", "got", "go", "went", "come", "came", "make", "made", "love", "loved",
        "liked", "recommend", "recommended", "order", "ordered", "try", "tried", "feel",
        "felt", "feels", "seem", "seemed", "seems", "look", "looks", "looked", "taste",
        "tasted", "tastes", "take", "took", "visit", "visited", "enjoy", "enjoyed", "wait",
        "waited", "served", "say", "said", "says", "isn't", "wasn't", "aren't", "weren't",
        "don't", "didn't", "doesn't", "won't", "can't", "i'm", "we're", "they're", "you're",
        // adverbs and negations
        "not", "no", "never", "very", "really", "too", "quite", "also", "just", "even",
        "always", "again", "still", "pretty", "much", "many", "more", "most", "lot", "lots",
        "well", "only", "ever", "soon", "now", "definitely", "absolutely", "extremely",
        "highly", "super",
    ]
    .into_iter()
    .collect()
});

// Adjectives dropped from the end of a chunk; a chunk of only adjectives has
// no head noun and is discarded.
static ADJECTIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "nice", "amazing", "excellent", "wonderful", "perfect", "beautiful", "lovely", "cozy",
        "clean", "dirty", "cheap", "expensive", "pricey", "overpriced", "reasonable", "fresh",
        "hot", "cold", "warm", "small", "big", "large", "huge", "tiny", "new", "old", "best",
        "worst", "better", "worse", "tasty", "yummy", "busy", "quiet", "loud", "crowded",
        "rude", "cute", "long", "short", "quick", "fast", "helpful", "attentive", "bland",
        "spicy", "sweet", "sappy", "okay", "ok", "fine", "horrible", "incredible",
    ]
    .into_iter()
    .chain(lexicon::POSITIVE_WORDS.iter().copied())
    .chain(lexicon::NEGATIVE_WORDS.iter().copied())
    .collect()
});

fn is_adjective(word: &str) -> bool {
    ADJECTIVES.contains(word)
}

fn is_break_word(word: &str) -> bool {
    if BREAK_WORDS.contains(word) {
        return true;
    }
    // -ly adverbs ("quickly"), unless a known adjective ("friendly")
    word.len() > 3 && word.ends_with("ly") && !is_adjective(word)
}

/// A run of words with no function word inside. May start with a determiner.
#[derive(Debug, Clone, PartialEq)]
struct Chunk {
    words: Vec<String>,
}

impl Chunk {
    fn phrase(&self) -> String {
        self.words.join(" ")
    }

    fn head(&self) -> Option<&str> {
        self.words.last().map(String::as_str)
    }
}

fn flush(current: &mut Vec<String>, chunks: &mut Vec<Chunk>) {
    let mut words = std::mem::take(current);
    while words.last().is_some_and(|w| is_adjective(w)) {
        words.pop();
    }
    if words.iter().any(|w| !lexicon::is_determiner(w)) {
        chunks.push(Chunk { words });
    }
}

fn chunk(corpus: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let lowercase_text = lexicon::fold_text(corpus);

    for clause in CLAUSE_SEPARATOR.split(&lowercase_text) {
        let mut current: Vec<String> = Vec::new();
        for raw in clause.split_whitespace() {
            let word = raw.trim_matches(|c: char| c == '\'' || c == '-');
            if word.is_empty() {
                continue;
            }
            if lexicon::is_determiner(word) {
                flush(&mut current, &mut chunks);
                current.push(word.to_string());
            } else if is_break_word(word) {
                flush(&mut current, &mut chunks);
            } else {
                current.push(word.to_string());
            }
        }
        flush(&mut current, &mut chunks);
    }

    chunks
}

/// Produces raw candidate phrases from a corpus.
pub trait PhraseExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this extractor can run in the current configuration.
    fn is_available(&self) -> bool;

    fn extract(&self, corpus: &str) -> Vec<String>;
}

/// Emits whole noun phrases, determiner included ("the food", "great view").
#[derive(Debug, Clone)]
pub struct NounPhraseExtractor {
    enabled: bool,
}

impl NounPhraseExtractor {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for NounPhraseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseExtractor for NounPhraseExtractor {
    fn name(&self) -> &'static str {
        "noun-phrases"
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    fn extract(&self, corpus: &str) -> Vec<String> {
        chunk(corpus).iter().map(Chunk::phrase).collect()
    }
}

/// Emits the head noun of each phrase only.
#[derive(Debug, Clone, Default)]
pub struct NounExtractor;

impl PhraseExtractor for NounExtractor {
    fn name(&self) -> &'static str {
        "nouns"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extract(&self, corpus: &str) -> Vec<String> {
        chunk(corpus)
            .iter()
            .filter_map(|c| c.head().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorKind {
    #[default]
    Phrases,
    Nouns,
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phrases" | "noun-phrases" => Ok(ExtractorKind::Phrases),
            "nouns" => Ok(ExtractorKind::Nouns),
            other => Err(format!("unknown keyword extractor '{}'", other)),
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorKind::Phrases => write!(f, "phrases"),
            ExtractorKind::Nouns => write!(f, "nouns"),
        }
    }
}

/// Picks the first available extractor: noun phrases when preferred and
/// enabled, single nouns otherwise.
pub fn select_extractor(preferred: ExtractorKind) -> Box<dyn PhraseExtractor> {
    let phrases = match preferred {
        ExtractorKind::Phrases => NounPhraseExtractor::new(),
        ExtractorKind::Nouns => NounPhraseExtractor::disabled(),
    };
    let candidates: Vec<Box<dyn PhraseExtractor>> = vec![Box::new(phrases), Box::new(NounExtractor)];

    let selected = candidates
        .into_iter()
        .find(|e| e.is_available())
        .unwrap_or_else(|| Box::new(NounExtractor));

    tracing::info!(extractor = selected.name(), "keyword extractor selected");
    selected
}

/// Lowercases, collapses whitespace and strips one leading determiner.
pub fn normalize_phrase(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();
    if words.first().is_some_and(|w| lexicon::is_determiner(w)) {
        words.remove(0);
    }
    words.join(" ")
}

/// 1 to 3 words, not a negative term, no stopword inside.
pub fn keep_phrase(phrase: &str, lexicon: &Lexicon) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_KEYWORD_WORDS {
        return false;
    }
    if lexicon.is_negative_term(phrase) {
        return false;
    }
    !words.iter().any(|w| lexicon.is_stopword(w))
}

pub fn extract_keywords(corpus: &str, extractor: &dyn PhraseExtractor, lexicon: &Lexicon) -> BTreeSet<String> {
    let candidates = extractor.extract(corpus);
    let candidate_count = candidates.len();

    let keywords: BTreeSet<String> = candidates
        .iter()
        .map(|raw| normalize_phrase(raw))
        .filter(|phrase| keep_phrase(phrase, lexicon))
        .collect();

    tracing::debug!(
        extractor = extractor.name(),
        candidates = candidate_count,
        kept = keywords.len(),
        "keywords extracted"
    );
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_chunker_phrases() {
        let phrases = NounPhraseExtractor::new().extract("The food was great and friendly. Great view of the park.");
        assert_eq!(phrases, vec!["the food", "great view", "the park"]);
    }

    #[test]
    fn test_positive_review_keywords() {
        let keywords = extract_keywords(
            "The food was great and friendly. Great view of the park.",
            &NounPhraseExtractor::new(),
            &Lexicon::default(),
        );
        assert_eq!(keywords, set(&["food", "great view", "park"]));
    }

    #[test]
    fn test_negative_review_keywords() {
        let lex = Lexicon::default();
        let phrases = extract_keywords("Terrible, slow, unfriendly service.", &NounPhraseExtractor::new(), &lex);
        assert_eq!(phrases, set(&["unfriendly service"]));

        let nouns = extract_keywords("Terrible, slow, unfriendly service.", &NounExtractor, &lex);
        assert_eq!(nouns, set(&["service"]));
    }

    #[test]
    fn test_curly_apostrophes_do_not_split_contractions() {
        let lex = Lexicon::default();
        let extractor = NounPhraseExtractor::new();
        let curly = extract_keywords("It\u{2019}s a great place. I don\u{2019}t like the fries.", &extractor, &lex);
        let ascii = extract_keywords("It's a great place. I don't like the fries.", &extractor, &lex);
        assert_eq!(curly, set(&["fries", "great place"]));
        assert_eq!(curly, ascii);
    }

    #[test]
    fn test_noun_fallback_heads() {
        let nouns = NounExtractor.extract("A cozy patio with the best tacos in town");
        assert_eq!(nouns, vec!["patio", "tacos", "town"]);
    }

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("  The   Food "), "food");
        assert_eq!(normalize_phrase("an espresso bar"), "espresso bar");
        // only one determiner is stripped
        assert_eq!(normalize_phrase("the the food"), "the food");
        assert_eq!(normalize_phrase("the"), "");
    }

    #[test]
    fn test_keep_phrase_rules() {
        let lex = Lexicon::default();
        assert!(keep_phrase("park", &lex));
        assert!(keep_phrase("wood fired pizza", &lex));
        assert!(!keep_phrase("wood fired pizza oven", &lex));
        assert!(!keep_phrase("", &lex));
        assert!(!keep_phrase("experience", &lex));
        assert!(keep_phrase("great experience", &lex));
        assert!(!keep_phrase("the food", &lex));
        assert!(!keep_phrase("fish and chips", &lex));
    }

    #[test]
    fn test_no_stopword_or_negative_term_survives() {
        let lex = Lexicon::default();
        let corpus = "We loved our table by the window! The staff is slow, the experience awful. \
                      A sappy song on repeat; my burger with them fries was bad. An experience.";
        for extractor in [&NounPhraseExtractor::new() as &dyn PhraseExtractor, &NounExtractor] {
            let keywords = extract_keywords(corpus, extractor, &lex);
            assert!(!keywords.is_empty());
            for keyword in &keywords {
                let words: Vec<&str> = keyword.split_whitespace().collect();
                assert!((1..=MAX_KEYWORD_WORDS).contains(&words.len()), "{}", keyword);
                assert!(!lex.is_negative_term(keyword), "{}", keyword);
                assert!(words.iter().all(|w| !lex.is_stopword(w)), "{}", keyword);
            }
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let lex = Lexicon::default();
        let corpus = "Great coffee. The barista was friendly. Great coffee again, the pastries too.";
        let extractor = NounPhraseExtractor::new();
        let first = extract_keywords(corpus, &extractor, &lex);
        let second = extract_keywords(corpus, &extractor, &lex);
        assert_eq!(first, second);
        assert_eq!(first.iter().filter(|k| k.as_str() == "great coffee").count(), 1);
    }

    #[test]
    fn test_select_extractor_fallback() {
        assert_eq!(select_extractor(ExtractorKind::Phrases).name(), "noun-phrases");
        assert_eq!(select_extractor(ExtractorKind::Nouns).name(), "nouns");
    }

    #[test]
    fn test_extractor_kind_parse() {
        assert_eq!("Phrases".parse::<ExtractorKind>(), Ok(ExtractorKind::Phrases));
        assert_eq!("nouns".parse::<ExtractorKind>(), Ok(ExtractorKind::Nouns));
        assert!("verbs".parse::<ExtractorKind>().is_err());
    }
}
