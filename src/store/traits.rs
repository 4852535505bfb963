//! Unified `Database` trait — single async interface for all persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::instances::model::{Instance, InstanceStatus, NewInstance};
use crate::tasks::model::{NewTask, Task, TaskLog};

/// Backend-agnostic database trait covering tasks, logs, and instances.
///
/// Background executions hold their own `Arc<dyn Database>` clone — their
/// lifetime outlives the request that created the task.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Tasks ───────────────────────────────────────────────────────

    /// Insert a new task row. Returns the stored task (no instances linked
    /// yet).
    async fn create_task(&self, new: &NewTask) -> Result<Task, DatabaseError>;

    /// Get a task by id, with its linked instances.
    async fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError>;

    /// List all tasks, with linked instances.
    async fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError>;

    /// Persist a task's mutable fields (title, description, type, status,
    /// progress, completed_at).
    async fn save_task(&self, task: &Task) -> Result<(), DatabaseError>;

    /// Delete a task, cascading its logs and instance links. Linked
    /// instances are untouched. Returns false if no such task existed.
    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Replace the set of instances linked to a task.
    async fn replace_task_instances(
        &self,
        task_id: i64,
        instance_ids: &[i64],
    ) -> Result<(), DatabaseError>;

    // ── Task logs ───────────────────────────────────────────────────

    /// Append one log row for a task.
    async fn append_log(
        &self,
        task_id: i64,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), DatabaseError>;

    /// Get a task's logs in chronological order.
    async fn logs_for_task(&self, task_id: i64) -> Result<Vec<TaskLog>, DatabaseError>;

    // ── Instances ───────────────────────────────────────────────────

    /// Insert a new instance. Returns the stored instance.
    async fn create_instance(&self, new: &NewInstance) -> Result<Instance, DatabaseError>;

    /// Get an instance by id.
    async fn get_instance(&self, id: i64) -> Result<Option<Instance>, DatabaseError>;

    /// List all instances.
    async fn list_instances(&self) -> Result<Vec<Instance>, DatabaseError>;

    /// Fetch the subset of the given ids that exist.
    async fn find_instances(&self, ids: &[i64]) -> Result<Vec<Instance>, DatabaseError>;

    /// Persist an instance's mutable fields.
    async fn save_instance(&self, instance: &Instance) -> Result<(), DatabaseError>;

    /// Set an instance's status and refresh its heartbeat. Returns the
    /// updated instance, or None if it does not exist.
    async fn update_instance_status(
        &self,
        id: i64,
        status: InstanceStatus,
        heartbeat: DateTime<Utc>,
    ) -> Result<Option<Instance>, DatabaseError>;
}
