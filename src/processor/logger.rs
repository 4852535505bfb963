//! Log sink — appends leveled, timestamped log rows tied to a task.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::error::DatabaseError;
use crate::store::Database;

/// Severity tag carried in each log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

/// Appends log rows for one task.
///
/// Each line is formatted as `[LEVEL] Task-<task_id> - <message>` and
/// written durably; persistence failures propagate to the caller.
#[derive(Clone)]
pub struct TaskLogger {
    store: Arc<dyn Database>,
    task_id: i64,
}

impl TaskLogger {
    pub fn new(store: Arc<dyn Database>, task_id: i64) -> Self {
        Self { store, task_id }
    }

    pub async fn info(&self, message: &str) -> Result<(), DatabaseError> {
        self.log(LogLevel::Info, message).await
    }

    pub async fn error(&self, message: &str) -> Result<(), DatabaseError> {
        self.log(LogLevel::Error, message).await
    }

    pub async fn debug(&self, message: &str) -> Result<(), DatabaseError> {
        self.log(LogLevel::Debug, message).await
    }

    async fn log(&self, level: LogLevel, message: &str) -> Result<(), DatabaseError> {
        let line = format!("[{level}] Task-{} - {message}", self.task_id);
        self.store.append_log(self.task_id, Utc::now(), &line).await
    }
}
