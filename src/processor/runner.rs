//! Task processor contract — polymorphic execution with a single failure
//! boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProcessorError;
use crate::processor::logger::TaskLogger;
use crate::processor::state::{TaskLocks, TaskMutator};
use crate::store::Database;

/// Everything a processor needs to act on its bound task.
///
/// Holds its own store handle — an execution's lifetime outlives the
/// request that created the task.
pub struct ProcessorContext {
    pub task_id: i64,
    pub logger: TaskLogger,
    pub mutator: TaskMutator,
}

impl ProcessorContext {
    pub fn new(store: Arc<dyn Database>, locks: Arc<TaskLocks>, task_id: i64) -> Self {
        Self {
            task_id,
            logger: TaskLogger::new(Arc::clone(&store), task_id),
            mutator: TaskMutator::new(store, locks, task_id),
        }
    }
}

/// A task type's execution timeline.
///
/// Implementations script the sleeps, progress updates, and log writes for
/// one kind of task. `process()` may suspend at any point; state mutations
/// between suspensions are independent writes — no transaction spans a
/// whole timeline.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Stable identifier carried on dispatch jobs.
    fn kind(&self) -> &'static str;

    /// Title prefix that marks a task for this processor.
    fn title_prefix(&self) -> &'static str;

    /// Processor-specific work.
    async fn process(&self, ctx: &ProcessorContext) -> Result<(), ProcessorError>;
}

/// Run a processor to completion.
///
/// Any failure inside `process()` is caught exactly once here: an ERROR
/// log entry is appended and the task transitions to FAILED. Nothing is
/// retried or re-thrown — a failed background execution is only
/// discoverable through the task's status and logs.
pub async fn execute(processor: &dyn TaskProcessor, ctx: &ProcessorContext) {
    if let Err(e) = processor.process(ctx).await {
        tracing::warn!(
            task_id = ctx.task_id,
            kind = processor.kind(),
            error = %e,
            "Task execution failed"
        );
        if let Err(log_err) = ctx
            .logger
            .error(&format!("Task execution failed: {e}"))
            .await
        {
            tracing::error!(task_id = ctx.task_id, error = %log_err, "Failed to record failure log");
        }
        if let Err(fail_err) = ctx.mutator.fail().await {
            tracing::error!(task_id = ctx.task_id, error = %fail_err, "Failed to mark task failed");
        }
    }
}
