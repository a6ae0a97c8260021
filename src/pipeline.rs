//! The liked-place analysis run.
//!
//! One like event is handled end to end: fetch the place's reviews, extract
//! keywords and sentiment, merge the place analysis, then bump the user's
//! keyword counts. Failures end the run and are logged, never raised. Nothing
//! is retried and a finished analysis write is not undone if the profile
//! update fails afterwards.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{AnalysisError, Stage};
use crate::keywords::{self, PhraseExtractor};
use crate::lexicon::Lexicon;
use crate::models::{AnalysisUpdate, LikeEvent};
use crate::sentiment;
use crate::store::DocumentStore;

/// Separator placed between review texts when building the corpus.
pub const REVIEW_SEPARATOR: &str = ". ";

const TOP_KEYWORDS_LOGGED: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub reviews: usize,
    pub keywords: BTreeSet<String>,
    pub sentiment: f64,
    /// Distinct keywords in the user's profile after the update.
    pub profile_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The place has no reviews; nothing was written.
    NoReviews,
    Analyzed(AnalysisReport),
    Failed { stage: Stage, reason: String },
}

pub fn build_corpus<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().collect::<Vec<_>>().join(REVIEW_SEPARATOR)
}

/// Handles one like event. Always returns; errors are logged and reported
/// in the outcome.
pub async fn analyze_liked_place(
    store: &dyn DocumentStore,
    extractor: &dyn PhraseExtractor,
    lexicon: &Lexicon,
    event: &LikeEvent,
) -> PipelineOutcome {
    match try_analyze(store, extractor, lexicon, event).await {
        Ok(Some(report)) => {
            tracing::info!(
                event_id = %event.event_id,
                user_id = %event.user_id,
                place_id = %event.place_id,
                reviews = report.reviews,
                keywords = report.keywords.len(),
                sentiment = report.sentiment,
                "liked place analyzed"
            );
            PipelineOutcome::Analyzed(report)
        }
        Ok(None) => {
            tracing::info!(
                event_id = %event.event_id,
                place_id = %event.place_id,
                "no reviews found for liked place, skipping"
            );
            PipelineOutcome::NoReviews
        }
        Err(e) => {
            tracing::error!(
                event_id = %event.event_id,
                user_id = %event.user_id,
                place_id = %event.place_id,
                stage = %e.stage(),
                error = %e,
                "liked place analysis failed"
            );
            PipelineOutcome::Failed {
                stage: e.stage(),
                reason: e.to_string(),
            }
        }
    }
}

/// The fallible run. `Ok(None)` means the place had no reviews.
pub async fn try_analyze(
    store: &dyn DocumentStore,
    extractor: &dyn PhraseExtractor,
    lexicon: &Lexicon,
    event: &LikeEvent,
) -> Result<Option<AnalysisReport>, AnalysisError> {
    // 1. Fetch
    let reviews = store
        .fetch_reviews(&event.place_id)
        .await
        .map_err(AnalysisError::Fetch)?;
    if reviews.is_empty() {
        return Ok(None);
    }

    // 2. Concatenate
    let corpus = build_corpus(reviews.iter().map(|r| r.text.as_str()));

    // 3. Keywords, 4. Sentiment
    let keywords = keywords::extract_keywords(&corpus, extractor, lexicon);
    let sentiment = sentiment::score(&corpus, lexicon).ok_or(AnalysisError::EmptyCorpus)?;

    // 5. Persist analysis
    let update = AnalysisUpdate {
        keywords,
        sentiment: sentiment.score,
    };
    store
        .merge_analysis(&event.place_id, &update)
        .await
        .map_err(AnalysisError::WriteAnalysis)?;

    // 6. Update the user's keyword counts
    let profile = store
        .increment_keywords(&event.user_id, &update.keywords)
        .await
        .map_err(AnalysisError::UpdateProfile)?;
    tracing::debug!(
        user_id = %event.user_id,
        top = ?profile.top_keywords(TOP_KEYWORDS_LOGGED),
        "keyword profile updated"
    );

    Ok(Some(AnalysisReport {
        reviews: reviews.len(),
        keywords: update.keywords,
        sentiment: update.sentiment,
        profile_size: profile.keywords.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{NounExtractor, NounPhraseExtractor};
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    async fn run(store: &MemoryStore, user: &str, place: &str) -> PipelineOutcome {
        analyze_liked_place(
            store,
            &NounPhraseExtractor::new(),
            &Lexicon::default(),
            &LikeEvent::new(user, place),
        )
        .await
    }

    #[test]
    fn test_build_corpus() {
        assert_eq!(build_corpus(["Good", "Great view"]), "Good. Great view");
        assert_eq!(build_corpus(["Only one"]), "Only one");
    }

    #[tokio::test]
    async fn test_no_reviews_no_writes() {
        let store = MemoryStore::new();
        let outcome = run(&store, "u1", "empty-place").await;
        assert_eq!(outcome, PipelineOutcome::NoReviews);
        assert_eq!(store.write_count(), 0);
        assert!(store.fetch_analysis("empty-place").await.unwrap().is_none());
        assert!(store.fetch_profile("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_analyzes_and_persists() {
        let store = MemoryStore::new();
        store.add_review("p1", "The food was great and friendly").await;
        store.add_review("p1", "Great view of the park.").await;

        let outcome = run(&store, "u1", "p1").await;
        let PipelineOutcome::Analyzed(report) = outcome else {
            panic!("expected the place to be analyzed");
        };
        assert_eq!(report.reviews, 2);
        assert_eq!(report.keywords, set(&["food", "great view", "park"]));
        assert!((report.sentiment - 3.0 / 11.0).abs() < 1e-12);
        assert_eq!(report.profile_size, 3);

        let analysis = store.fetch_analysis("p1").await.unwrap().unwrap();
        assert_eq!(analysis.keywords, report.keywords);
        assert_eq!(analysis.sentiment, report.sentiment);

        let profile = store.fetch_profile("u1").await.unwrap().unwrap();
        assert!(profile.keywords.values().all(|&count| count == 1));
    }

    #[tokio::test]
    async fn test_profile_accumulates_across_likes() {
        let store = MemoryStore::new();
        store.add_review("p-ab", "Tacos. Churros.").await;
        store.add_review("p-bc", "Churros. Horchata.").await;

        let extractor = NounExtractor;
        let lexicon = Lexicon::default();
        analyze_liked_place(&store, &extractor, &lexicon, &LikeEvent::new("u1", "p-ab")).await;
        analyze_liked_place(&store, &extractor, &lexicon, &LikeEvent::new("u1", "p-bc")).await;

        let profile = store.fetch_profile("u1").await.unwrap().unwrap();
        let expected: BTreeMap<String, i64> = [("tacos", 1), ("churros", 2), ("horchata", 1)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        assert_eq!(profile.keywords, expected);
    }

    #[tokio::test]
    async fn test_duplicate_keyword_counts_once_per_run() {
        let store = MemoryStore::new();
        store.add_review("p1", "Great coffee").await;
        store.add_review("p1", "Great coffee, honestly").await;

        run(&store, "u1", "p1").await;
        let profile = store.fetch_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.keywords.get("great coffee"), Some(&1));
    }

    #[tokio::test]
    async fn test_rerun_overwrites_analysis_and_adds_counts() {
        let store = MemoryStore::new();
        store.add_review("p1", "Fresh bagels").await;

        let first = run(&store, "u1", "p1").await;
        let second = run(&store, "u1", "p1").await;
        let (PipelineOutcome::Analyzed(a), PipelineOutcome::Analyzed(b)) = (first, second) else {
            panic!("both runs should analyze");
        };
        assert_eq!(a.keywords, b.keywords);

        let profile = store.fetch_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.keywords.get("fresh bagels"), Some(&2));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.add_review("p1", "Good pizza").await;
        store.fail_reads(true);

        let outcome = run(&store, "u1", "p1").await;
        assert!(matches!(outcome, PipelineOutcome::Failed { stage: Stage::FetchReviews, .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_writes_nothing() {
        let store = MemoryStore::new();
        store.add_review("p1", "").await;
        store.add_review("p1", "!!!").await;

        let outcome = run(&store, "u1", "p1").await;
        assert!(matches!(outcome, PipelineOutcome::Failed { stage: Stage::Extract, .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_write_failure_skips_profile() {
        let store = MemoryStore::new();
        store.add_review("p1", "Good pizza").await;
        store.fail_analysis_writes(true);

        let outcome = run(&store, "u1", "p1").await;
        assert!(matches!(outcome, PipelineOutcome::Failed { stage: Stage::WriteAnalysis, .. }));
        assert!(store.fetch_profile("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_failure_keeps_analysis() {
        let store = MemoryStore::new();
        store.add_review("p1", "Good pizza").await;
        store.fail_profile_writes(true);

        let outcome = run(&store, "u1", "p1").await;
        assert!(matches!(outcome, PipelineOutcome::Failed { stage: Stage::UpdateProfile, .. }));
        assert!(store.fetch_analysis("p1").await.unwrap().is_some());
        assert!(store.fetch_profile("u1").await.unwrap().is_none());
    }
}
