use anyhow::Context;
use dotenv::dotenv;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;

use review_insights::config::Config;
use review_insights::keywords::select_extractor;
use review_insights::lexicon::Lexicon;
use review_insights::pg_store::PgDocumentStore;
use review_insights::queue::LikeQueue;
use review_insights::worker::{self, WorkerState};
use review_insights::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    // Pooled connections (Supabase pgbouncer) reject cached prepared statements
    let opts = PgConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .statement_cache_capacity(0);
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(opts)
        .await
        .context("Failed to connect to Postgres")?;

    db::init_db(&pool).await?;

    let queue = LikeQueue::connect(&config.redis_url, &config.like_queue_key)
        .await
        .context("Failed to connect to Redis")?;

    let state = Arc::new(WorkerState {
        source: Arc::new(queue),
        store: Arc::new(PgDocumentStore::new(pool)),
        extractor: select_extractor(config.extractor),
        lexicon: Lexicon::default(),
        poll_interval: config.poll_interval,
        error_backoff: config.error_backoff,
    });

    worker::start_worker(state).await;
    Ok(())
}
