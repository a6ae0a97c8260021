use sqlx::postgres::PgPool;
use anyhow::Result;

pub async fn init_db(pool: &PgPool) -> Result<()> {
    // 1. Reviews (read only for the pipeline, owned by the app)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS place_reviews (
            id VARCHAR PRIMARY KEY,
            place_id VARCHAR NOT NULL,
            text TEXT,
            created_at TIMESTAMPTZ DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_place_reviews_place_id ON place_reviews (place_id);")
        .execute(pool)
        .await?;

    // 2. Latest analysis per place
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS place_analyses (
            place_id VARCHAR PRIMARY KEY,
            keywords JSONB NOT NULL DEFAULT '[]'::jsonb,
            sentiment DOUBLE PRECISION NOT NULL DEFAULT 0,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // 3. Keyword profile per user
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_keyword_profiles (
            user_id VARCHAR PRIMARY KEY,
            keywords JSONB NOT NULL DEFAULT '{}'::jsonb,
            last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("database schema ready");
    Ok(())
}
