//! Postgres-backed `DocumentStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, Row};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::StoreResult;
use crate::models::{AnalysisUpdate, PlaceAnalysis, Review, UserKeywordProfile};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch_reviews(&self, place_id: &str) -> StoreResult<Vec<Review>> {
        let reviews: Vec<Review> = sqlx::query_as(
            r#"SELECT text FROM place_reviews
               WHERE place_id = $1 AND text IS NOT NULL
               ORDER BY created_at"#,
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn merge_analysis(&self, place_id: &str, update: &AnalysisUpdate) -> StoreResult<()> {
        let keywords = serde_json::to_value(&update.keywords)?;

        sqlx::query(
            r#"
            INSERT INTO place_analyses (place_id, keywords, sentiment, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (place_id) DO UPDATE SET
                keywords = EXCLUDED.keywords,
                sentiment = EXCLUDED.sentiment,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(place_id)
        .bind(&keywords)
        .bind(update.sentiment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment_keywords(
        &self,
        user_id: &str,
        keywords: &BTreeSet<String>,
    ) -> StoreResult<UserKeywordProfile> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO user_keyword_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // Row lock: concurrent likes by the same user queue up here.
        let row = sqlx::query("SELECT keywords FROM user_keyword_profiles WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let current: serde_json::Value = row.try_get("keywords")?;

        let mut profile = UserKeywordProfile {
            user_id: user_id.to_string(),
            keywords: serde_json::from_value::<BTreeMap<String, i64>>(current)?,
            last_updated: Utc::now(),
        };
        profile.record(keywords);

        let row = sqlx::query(
            r#"UPDATE user_keyword_profiles
               SET keywords = $2, last_updated = NOW()
               WHERE user_id = $1
               RETURNING last_updated"#,
        )
        .bind(user_id)
        .bind(serde_json::to_value(&profile.keywords)?)
        .fetch_one(&mut *tx)
        .await?;
        profile.last_updated = row.try_get::<DateTime<Utc>, _>("last_updated")?;

        tx.commit().await?;
        Ok(profile)
    }

    async fn fetch_analysis(&self, place_id: &str) -> StoreResult<Option<PlaceAnalysis>> {
        let row = sqlx::query(
            "SELECT place_id, keywords, sentiment, updated_at FROM place_analyses WHERE place_id = $1",
        )
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let keywords: serde_json::Value = row.try_get("keywords")?;
        Ok(Some(PlaceAnalysis {
            place_id: row.try_get("place_id")?,
            keywords: serde_json::from_value(keywords)?,
            sentiment: row.try_get("sentiment")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn fetch_profile(&self, user_id: &str) -> StoreResult<Option<UserKeywordProfile>> {
        let row = sqlx::query(
            "SELECT user_id, keywords, last_updated FROM user_keyword_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let keywords: serde_json::Value = row.try_get("keywords")?;
        Ok(Some(UserKeywordProfile {
            user_id: row.try_get("user_id")?,
            keywords: serde_json::from_value(keywords)?,
            last_updated: row.try_get("last_updated")?,
        }))
    }
}
