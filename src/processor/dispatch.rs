//! Dispatch — explicit queue handoff between task creation and background
//! execution.
//!
//! The creation handler enqueues a `DispatchJob` once the task row (and its
//! initial log) are persisted; a worker loop consumes the queue and spawns
//! one independent execution per job. This decouples execution lifetime
//! from the HTTP request — a client disconnect never cancels a scheduled
//! run — and makes shutdown explicit: dropping every `Dispatcher` clone
//! closes the channel and stops the loop. There is no cancel, pause, or
//! timeout for a running execution; a process crash abandons in-flight
//! runs, leaving their tasks IN_PROGRESS.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::processor::registry::ProcessorRegistry;
use crate::processor::runner::{ProcessorContext, execute};
use crate::processor::state::TaskLocks;
use crate::store::Database;

/// One unit of scheduled background work.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub task_id: i64,
    pub kind: String,
}

/// Sending half of the dispatch queue, held by the HTTP state.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<DispatchJob>,
}

impl Dispatcher {
    /// Enqueue a job. Returns false if the worker has shut down.
    pub fn enqueue(&self, job: DispatchJob) -> bool {
        let task_id = job.task_id;
        if self.tx.send(job).is_err() {
            tracing::error!(task_id, "Dispatch worker is gone; job dropped");
            return false;
        }
        true
    }
}

/// Spawn the dispatch worker loop.
///
/// Each consumed job gets its own spawned tokio task and its own
/// `ProcessorContext` (fresh store handle), so a long timeline never
/// blocks the queue and never borrows request-scoped state.
pub fn spawn_worker(
    store: Arc<dyn Database>,
    locks: Arc<TaskLocks>,
    registry: Arc<ProcessorRegistry>,
) -> (Dispatcher, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<DispatchJob>();

    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let Some(processor) = registry.by_kind(&job.kind) else {
                tracing::warn!(
                    task_id = job.task_id,
                    kind = %job.kind,
                    "No processor registered for dispatch job"
                );
                continue;
            };

            let ctx = ProcessorContext::new(Arc::clone(&store), Arc::clone(&locks), job.task_id);
            tracing::info!(task_id = job.task_id, kind = %job.kind, "Starting background execution");
            tokio::spawn(async move {
                execute(processor.as_ref(), &ctx).await;
            });
        }
        tracing::info!("Dispatch worker stopped");
    });

    (Dispatcher { tx }, handle)
}
