//! Document store seam for the pipeline.
//!
//! `DocumentStore` is the only way the pipeline touches persistent data.
//! `PgDocumentStore` (see `pg_store`) backs production; `MemoryStore` backs
//! tests and local dry runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{AnalysisUpdate, PlaceAnalysis, Review, UserKeywordProfile};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All reviews of a place, in store order. Empty when the place has none.
    async fn fetch_reviews(&self, place_id: &str) -> StoreResult<Vec<Review>>;

    /// Creates or merges the place's latest analysis. Only keywords,
    /// sentiment and the update timestamp are written.
    async fn merge_analysis(&self, place_id: &str, update: &AnalysisUpdate) -> StoreResult<()>;

    /// Adds one to the user's count for each keyword, atomically with
    /// respect to other increments for the same user. Returns the profile
    /// as stored after the update.
    async fn increment_keywords(
        &self,
        user_id: &str,
        keywords: &BTreeSet<String>,
    ) -> StoreResult<UserKeywordProfile>;

    async fn fetch_analysis(&self, place_id: &str) -> StoreResult<Option<PlaceAnalysis>>;

    async fn fetch_profile(&self, user_id: &str) -> StoreResult<Option<UserKeywordProfile>>;
}

#[derive(Default)]
struct Collections {
    reviews: HashMap<String, Vec<Review>>,
    analyses: HashMap<String, PlaceAnalysis>,
    profiles: HashMap<String, UserKeywordProfile>,
}

/// In-process store with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
    fail_reads: AtomicBool,
    fail_analysis_writes: AtomicBool,
    fail_profile_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_review(&self, place_id: &str, text: &str) {
        self.data
            .write()
            .await
            .reviews
            .entry(place_id.to_string())
            .or_default()
            .push(Review::new(text));
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_analysis_writes(&self, fail: bool) {
        self.fail_analysis_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes of either kind so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {} failure", what))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_reviews(&self, place_id: &str) -> StoreResult<Vec<Review>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(self
            .data
            .read()
            .await
            .reviews
            .get(place_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn merge_analysis(&self, place_id: &str, update: &AnalysisUpdate) -> StoreResult<()> {
        if self.fail_analysis_writes.load(Ordering::SeqCst) {
            return Err(injected("analysis write"));
        }
        let mut data = self.data.write().await;
        let now = Utc::now();
        data.analyses
            .entry(place_id.to_string())
            .and_modify(|a| {
                a.keywords = update.keywords.clone();
                a.sentiment = update.sentiment;
                a.updated_at = now;
            })
            .or_insert_with(|| PlaceAnalysis {
                place_id: place_id.to_string(),
                keywords: update.keywords.clone(),
                sentiment: update.sentiment,
                updated_at: now,
            });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn increment_keywords(
        &self,
        user_id: &str,
        keywords: &BTreeSet<String>,
    ) -> StoreResult<UserKeywordProfile> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(injected("profile write"));
        }
        // the write lock spans the whole read-modify-write
        let mut data = self.data.write().await;
        let now = Utc::now();
        let profile = data
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserKeywordProfile {
                user_id: user_id.to_string(),
                keywords: BTreeMap::new(),
                last_updated: now,
            });
        profile.record(keywords);
        profile.last_updated = now;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(profile.clone())
    }

    async fn fetch_analysis(&self, place_id: &str) -> StoreResult<Option<PlaceAnalysis>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(self.data.read().await.analyses.get(place_id).cloned())
    }

    async fn fetch_profile(&self, user_id: &str) -> StoreResult<Option<UserKeywordProfile>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(self.data.read().await.profiles.get(user_id).cloned())
    }
}
