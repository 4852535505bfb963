//! State mutator — progress/status transitions under per-task advisory locks.
//!
//! The store itself has no optimistic-concurrency check, so every mutation
//! of a task row (background timeline writes and foreground edits alike)
//! goes through the same `TaskLocks` map to avoid lost updates on a single
//! row. Last-write-wins still applies between whole mutations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::DatabaseError;
use crate::store::Database;
use crate::tasks::model::TaskStatus;

/// Map from task id to an advisory mutex held for the duration of one
/// mutation.
#[derive(Default)]
pub struct TaskLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl TaskLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a task id, creating it on first use.
    pub async fn acquire(&self, task_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(task_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Applies progress/status transitions to one task.
///
/// All mutations tolerate the task having been deleted mid-execution:
/// a missing row is a silent no-op, never an error.
#[derive(Clone)]
pub struct TaskMutator {
    store: Arc<dyn Database>,
    locks: Arc<TaskLocks>,
    task_id: i64,
}

impl TaskMutator {
    pub fn new(store: Arc<dyn Database>, locks: Arc<TaskLocks>, task_id: i64) -> Self {
        Self {
            store,
            locks,
            task_id,
        }
    }

    /// Set progress and optionally status. No-op on a missing task, and on
    /// a task already in a terminal state.
    pub async fn update_progress(
        &self,
        progress: f64,
        status: Option<TaskStatus>,
    ) -> Result<(), DatabaseError> {
        let _guard = self.locks.acquire(self.task_id).await;
        let Some(mut task) = self.store.get_task(self.task_id).await? else {
            return Ok(());
        };
        if task.status.is_terminal() {
            return Ok(());
        }
        task.progress = progress;
        if let Some(status) = status {
            task.status = status;
        }
        self.store.save_task(&task).await
    }

    /// Mark the task completed: status=COMPLETED, progress=100.
    /// `completed_at` is set exactly once — repeated calls keep the first
    /// timestamp.
    pub async fn complete(&self) -> Result<(), DatabaseError> {
        let _guard = self.locks.acquire(self.task_id).await;
        let Some(mut task) = self.store.get_task(self.task_id).await? else {
            return Ok(());
        };
        task.status = TaskStatus::Completed;
        task.progress = 100.0;
        if task.completed_at.is_none() {
            task.completed_at = Some(Utc::now());
        }
        self.store.save_task(&task).await
    }

    /// Mark the task failed: status=FAILED, progress left as-is.
    pub async fn fail(&self) -> Result<(), DatabaseError> {
        let _guard = self.locks.acquire(self.task_id).await;
        let Some(mut task) = self.store.get_task(self.task_id).await? else {
            return Ok(());
        };
        task.status = TaskStatus::Failed;
        if task.completed_at.is_none() {
            task.completed_at = Some(Utc::now());
        }
        self.store.save_task(&task).await
    }
}
