//! Records read and written by the liked-place pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// One review of a place. Only the text is consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub text: String,
}

impl Review {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Fired when a user likes a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEvent {
    /// Correlation id for logs. Assigned on enqueue when the producer leaves it out.
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,
    pub user_id: String,
    pub place_id: String,
}

impl LikeEvent {
    pub fn new(user_id: impl Into<String>, place_id: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id: user_id.into(),
            place_id: place_id.into(),
        }
    }
}

/// Fields merged into a place's latest analysis. The store stamps `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisUpdate {
    pub keywords: BTreeSet<String>,
    pub sentiment: f64,
}

/// The latest analysis stored for a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnalysis {
    pub place_id: String,
    pub keywords: BTreeSet<String>,
    pub sentiment: f64,
    pub updated_at: DateTime<Utc>,
}

/// Cumulative keyword counts for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserKeywordProfile {
    pub user_id: String,
    pub keywords: BTreeMap<String, i64>,
    pub last_updated: DateTime<Utc>,
}

impl UserKeywordProfile {
    /// Adds one to every keyword, creating missing entries at 1.
    pub fn record<'a, I>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for keyword in keywords {
            *self.keywords.entry(keyword.clone()).or_insert(0) += 1;
        }
    }

    /// Keywords by count, highest first; ties broken alphabetically.
    /// Read side for recommendation consumers; the pipeline logs it after
    /// each profile update.
    pub fn top_keywords(&self, n: usize) -> Vec<(&str, i64)> {
        let mut ranked: Vec<(&str, i64)> = self
            .keywords
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }
}
