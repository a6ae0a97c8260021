use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::keywords::PhraseExtractor;
use crate::lexicon::Lexicon;
use crate::models::LikeEvent;
use crate::pipeline::{self, PipelineOutcome};
use crate::queue::LikeSource;
use crate::store::DocumentStore;

pub struct WorkerState {
    pub source: Arc<dyn LikeSource>,
    pub store: Arc<dyn DocumentStore>,
    pub extractor: Box<dyn PhraseExtractor>,
    pub lexicon: Lexicon,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
}

/// Polls the like source until Ctrl-C.
pub async fn start_worker(state: Arc<WorkerState>) {
    run_until(&state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await;
}

/// Polls until `shutdown` resolves. Shutdown is only observed while waiting
/// for an event or sleeping; a popped event always runs to completion.
pub async fn run_until<S>(state: &WorkerState, shutdown: S)
where
    S: Future<Output = ()>,
{
    tracing::info!(source = %state.source.name(), "worker started, polling like events");
    tokio::pin!(shutdown);

    loop {
        let next = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            next = state.source.next_event() => next,
        };

        let pause = match next {
            Ok(Some(event)) => {
                tracing::debug!(event_id = %event.event_id, user_id = %event.user_id, place_id = %event.place_id, "picked up like event");
                process_event(state, &event).await;
                continue;
            }
            // Queue empty, back off
            Ok(None) => state.poll_interval,
            Err(e) => {
                tracing::error!(error = %e, "error while polling like events");
                state.error_backoff
            }
        };

        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = sleep(pause) => {}
        }
    }

    tracing::info!("shutdown requested, worker stopped");
}

/// Runs the pipeline for one event. The outcome is already logged by the
/// pipeline; failures are not requeued.
pub async fn process_event(state: &WorkerState, event: &LikeEvent) -> PipelineOutcome {
    pipeline::analyze_liked_place(
        state.store.as_ref(),
        state.extractor.as_ref(),
        &state.lexicon,
        event,
    )
    .await
}
