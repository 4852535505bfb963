//! Task data model — tasks, logs, and request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::instances::model::Instance;
use crate::timefmt;

/// Lifecycle status of a task.
///
/// Serialized as human-readable snake_case strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    /// COMPLETED and FAILED are terminal — the background core never
    /// transitions out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// A trackable unit of work with status, progress, and a log trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID, generated on create.
    pub id: i64,
    /// Short title. A registered processor prefix (e.g. `TEST-`) marks the
    /// task for background execution.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Free-form task type (`normal`, `deploy`, ...).
    #[serde(rename = "type")]
    pub task_type: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Completion percentage, 0.0–100.0.
    pub progress: f64,
    /// Set at creation, immutable afterwards.
    #[serde(rename = "createdAt", with = "timefmt::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Set exactly once when the task reaches COMPLETED or FAILED.
    #[serde(
        rename = "completedAt",
        with = "timefmt::opt_timestamp",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub completed_at: Option<DateTime<Utc>>,
    /// Instances linked to this task (many-to-many, order irrelevant).
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// Fields for a task row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub task_type: String,
    pub status: TaskStatus,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Build a new task row with default status and progress.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            task_type: task_type.into(),
            status: TaskStatus::Pending,
            progress: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// An immutable, timestamped log line attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLog {
    #[serde(skip_serializing, default)]
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub task_id: i64,
    #[serde(with = "timefmt::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Reference to an instance by id inside a task payload.
///
/// Clients send full instance objects here; only the id matters for
/// linking, everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceRef {
    pub id: i64,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub instances: Vec<InstanceRef>,
}

impl CreateTask {
    /// Field-level validation, surfaced as a structured error list.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if self.task_type.trim().is_empty() {
            errors.push(FieldError::new("type", "must not be empty"));
        }
        errors
    }
}

/// Body of `PUT /api/tasks/{id}` — all fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub progress: Option<f64>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub instances: Option<Vec<InstanceRef>>,
}

impl UpdateTask {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(ref title) = self.title
            && title.trim().is_empty()
        {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if let Some(progress) = self.progress
            && !(0.0..=100.0).contains(&progress)
        {
            errors.push(FieldError::new("progress", "must be between 0 and 100"));
        }
        errors
    }
}

/// One entry in a validation error list.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_task() -> Task {
        Task {
            id: 7,
            title: "TEST-smoke".into(),
            description: "d".into(),
            task_type: "normal".into(),
            status: TaskStatus::InProgress,
            progress: 0.0,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            completed_at: None,
            instances: Vec::new(),
        }
    }

    #[test]
    fn status_serde_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Failed);
    }

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn task_serializes_api_field_names() {
        let json = serde_json::to_value(make_task()).unwrap();
        assert_eq!(json["type"], "normal");
        assert_eq!(json["createdAt"], "2026-03-01 09:00:00");
        assert_eq!(json["status"], "in_progress");
        // completed_at is omitted while null
        assert!(json.get("completedAt").is_none());
    }

    #[test]
    fn task_serializes_completed_at_when_set() {
        let mut task = make_task();
        task.status = TaskStatus::Completed;
        task.progress = 100.0;
        task.completed_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 15).unwrap());

        let json = serde_json::to_value(task).unwrap();
        assert_eq!(json["completedAt"], "2026-03-01 09:00:15");
    }

    #[test]
    fn new_task_defaults() {
        let new = NewTask::new("TEST-x", "desc", "normal");
        assert_eq!(new.status, TaskStatus::Pending);
        assert_eq!(new.progress, 0.0);
    }

    #[test]
    fn create_task_ignores_extra_instance_fields() {
        let body = serde_json::json!({
            "title": "TEST-smoke",
            "description": "d",
            "type": "normal",
            "instances": [{"id": 3, "name": "web-1", "ip": "10.0.0.1", "region": "us-east",
                           "status": "running", "specification": "4c8g", "cpuType": "x86"}]
        });
        let create: CreateTask = serde_json::from_value(body).unwrap();
        assert_eq!(create.instances.len(), 1);
        assert_eq!(create.instances[0].id, 3);
    }

    #[test]
    fn create_task_validation() {
        let create = CreateTask {
            title: "  ".into(),
            description: "d".into(),
            task_type: "normal".into(),
            instances: Vec::new(),
        };
        let errors = create.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn update_task_rejects_out_of_range_progress() {
        let update = UpdateTask {
            progress: Some(150.0),
            ..Default::default()
        };
        let errors = update.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "progress");
    }

    #[test]
    fn task_log_hides_row_ids() {
        let log = TaskLog {
            id: 1,
            task_id: 7,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            message: "[INFO] Task-7 - created".into(),
        };
        let json = serde_json::to_value(log).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("task_id").is_none());
        assert_eq!(json["timestamp"], "2026-03-01 09:00:00");
    }
}
