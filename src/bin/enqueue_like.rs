//! Pushes one like event onto the queue, as the app does when a user likes a place.
//!
//! Usage: enqueue_like <user_id> <place_id>

use anyhow::Result;
use dotenv::dotenv;

use review_insights::config::{self, DEFAULT_LIKE_QUEUE_KEY, DEFAULT_REDIS_URL};
use review_insights::models::LikeEvent;
use review_insights::queue::{self, LikeQueue};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(user_id), Some(place_id)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: enqueue_like <user_id> <place_id>");
    };
    let event = LikeEvent::new(user_id, place_id);
    queue::validate_event(&event)?;

    let redis_url = config::var("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
    let key = config::var("LIKE_QUEUE_KEY").unwrap_or_else(|| DEFAULT_LIKE_QUEUE_KEY.to_string());

    let like_queue = LikeQueue::connect(&redis_url, &key).await?;
    like_queue.push(&event).await?;

    println!("Queued like {} ({} -> {}) on {}", event.event_id, event.user_id, event.place_id, key);
    Ok(())
}
