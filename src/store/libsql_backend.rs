//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Timestamps are written as
//! RFC 3339 and parsed leniently on the way out.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::DatabaseError;
use crate::instances::model::{Instance, InstanceStatus, NewInstance};
use crate::store::migrations;
use crate::store::traits::Database;
use crate::tasks::model::{NewTask, Task, TaskLog, TaskStatus};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Fetch the instances linked to a task.
    async fn instances_for_task(&self, task_id: i64) -> Result<Vec<Instance>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT i.id, i.name, i.ip, i.region, i.status, i.specification,
                        i.cpu_type, i.last_heartbeat
                 FROM instances i
                 JOIN task_instances ti ON ti.instance_id = i.id
                 WHERE ti.task_id = ?1
                 ORDER BY i.id",
                params![task_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query task instances: {e}")))?;

        let mut instances = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read instance row: {e}")))?
        {
            instances.push(
                row_to_instance(&row)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map instance: {e}")))?,
            );
        }
        Ok(instances)
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn task_status_to_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Failed => "failed",
    }
}

fn str_to_task_status(s: &str) -> TaskStatus {
    match s {
        "in_progress" => TaskStatus::InProgress,
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        _ => TaskStatus::Pending,
    }
}

fn instance_status_to_str(status: InstanceStatus) -> &'static str {
    match status {
        InstanceStatus::Running => "running",
        InstanceStatus::Stopped => "stopped",
        InstanceStatus::Maintenance => "maintenance",
    }
}

fn str_to_instance_status(s: &str) -> InstanceStatus {
    match s {
        "stopped" => InstanceStatus::Stopped,
        "maintenance" => InstanceStatus::Maintenance,
        _ => InstanceStatus::Running,
    }
}

/// Map a libsql row to a Task (instances filled in separately).
///
/// Column order: 0:id, 1:title, 2:description, 3:task_type, 4:status,
/// 5:progress, 6:created_at, 7:completed_at
fn row_to_task(row: &libsql::Row) -> Result<Task, libsql::Error> {
    let status_str: String = row.get(4)?;
    let created_str: String = row.get(6)?;
    let completed_str: Option<String> = row.get::<String>(7).ok();

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        task_type: row.get(3)?,
        status: str_to_task_status(&status_str),
        progress: row.get(5)?,
        created_at: parse_datetime(&created_str),
        completed_at: completed_str.map(|s| parse_datetime(&s)),
        instances: Vec::new(),
    })
}

/// Map a libsql row to an Instance.
///
/// Column order: 0:id, 1:name, 2:ip, 3:region, 4:status, 5:specification,
/// 6:cpu_type, 7:last_heartbeat
fn row_to_instance(row: &libsql::Row) -> Result<Instance, libsql::Error> {
    let status_str: String = row.get(4)?;
    let heartbeat_str: Option<String> = row.get::<String>(7).ok();

    Ok(Instance {
        id: row.get(0)?,
        name: row.get(1)?,
        ip: row.get(2)?,
        region: row.get(3)?,
        status: str_to_instance_status(&status_str),
        specification: row.get(5)?,
        cpu_type: row.get(6)?,
        last_heartbeat: heartbeat_str.map(|s| parse_datetime(&s)),
    })
}

const TASK_COLUMNS: &str =
    "id, title, description, task_type, status, progress, created_at, completed_at";

const INSTANCE_COLUMNS: &str =
    "id, name, ip, region, status, specification, cpu_type, last_heartbeat";

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Tasks ───────────────────────────────────────────────────────

    async fn create_task(&self, new: &NewTask) -> Result<Task, DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO tasks (title, description, task_type, status, progress, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.title.as_str(),
                    new.description.as_str(),
                    new.task_type.as_str(),
                    task_status_to_str(new.status),
                    new.progress,
                    new.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to insert task: {e}")))?;

        let id = self.conn().last_insert_rowid();
        Ok(Task {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            task_type: new.task_type.clone(),
            status: new.status,
            progress: new.progress,
            created_at: new.created_at,
            completed_at: None,
            instances: Vec::new(),
        })
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query task: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read task row: {e}")))?;

        match row {
            Some(row) => {
                let mut task = row_to_task(&row)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map task: {e}")))?;
                task.instances = self.instances_for_task(task.id).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query tasks: {e}")))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read task row: {e}")))?
        {
            tasks.push(
                row_to_task(&row)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map task: {e}")))?,
            );
        }

        for task in &mut tasks {
            task.instances = self.instances_for_task(task.id).await?;
        }
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE tasks
                 SET title = ?1, description = ?2, task_type = ?3, status = ?4,
                     progress = ?5, completed_at = ?6
                 WHERE id = ?7",
                params![
                    task.title.as_str(),
                    task.description.as_str(),
                    task.task_type.as_str(),
                    task_status_to_str(task.status),
                    task.progress,
                    task.completed_at.map(|dt| dt.to_rfc3339()),
                    task.id,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to save task: {e}")))?;
        Ok(())
    }

    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        // Explicit cascade — foreign_keys pragma is off by default in SQLite.
        self.conn()
            .execute("DELETE FROM task_logs WHERE task_id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to delete task logs: {e}")))?;
        self.conn()
            .execute("DELETE FROM task_instances WHERE task_id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to delete task links: {e}")))?;

        let affected = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to delete task: {e}")))?;
        Ok(affected > 0)
    }

    async fn replace_task_instances(
        &self,
        task_id: i64,
        instance_ids: &[i64],
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "DELETE FROM task_instances WHERE task_id = ?1",
                params![task_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to clear task links: {e}")))?;

        for instance_id in instance_ids {
            self.conn()
                .execute(
                    "INSERT OR IGNORE INTO task_instances (task_id, instance_id) VALUES (?1, ?2)",
                    params![task_id, *instance_id],
                )
                .await
                .map_err(|e| DatabaseError::Query(format!("Failed to link instance: {e}")))?;
        }
        Ok(())
    }

    // ── Task logs ───────────────────────────────────────────────────

    async fn append_log(
        &self,
        task_id: i64,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO task_logs (task_id, timestamp, message) VALUES (?1, ?2, ?3)",
                params![task_id, timestamp.to_rfc3339(), message],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to append log: {e}")))?;
        Ok(())
    }

    async fn logs_for_task(&self, task_id: i64) -> Result<Vec<TaskLog>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, task_id, timestamp, message FROM task_logs
                 WHERE task_id = ?1 ORDER BY timestamp, id",
                params![task_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query logs: {e}")))?;

        let mut logs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read log row: {e}")))?
        {
            let timestamp_str: String = row
                .get(2)
                .map_err(|e| DatabaseError::Query(format!("Failed to map log: {e}")))?;
            logs.push(TaskLog {
                id: row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map log: {e}")))?,
                task_id: row
                    .get(1)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map log: {e}")))?,
                timestamp: parse_datetime(&timestamp_str),
                message: row
                    .get(3)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map log: {e}")))?,
            });
        }
        Ok(logs)
    }

    // ── Instances ───────────────────────────────────────────────────

    async fn create_instance(&self, new: &NewInstance) -> Result<Instance, DatabaseError> {
        let heartbeat = new.last_heartbeat.unwrap_or_else(Utc::now);
        self.conn()
            .execute(
                "INSERT INTO instances (name, ip, region, status, specification, cpu_type, last_heartbeat)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.name.as_str(),
                    new.ip.as_str(),
                    new.region.as_str(),
                    instance_status_to_str(new.status),
                    new.specification.as_str(),
                    new.cpu_type.as_str(),
                    heartbeat.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to insert instance: {e}")))?;

        let id = self.conn().last_insert_rowid();
        Ok(Instance {
            id,
            name: new.name.clone(),
            ip: new.ip.clone(),
            region: new.region.clone(),
            status: new.status,
            specification: new.specification.clone(),
            cpu_type: new.cpu_type.clone(),
            last_heartbeat: Some(heartbeat),
        })
    }

    async fn get_instance(&self, id: i64) -> Result<Option<Instance>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {INSTANCE_COLUMNS} FROM instances WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query instance: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read instance row: {e}")))?;

        match row {
            Some(row) => Ok(Some(row_to_instance(&row).map_err(|e| {
                DatabaseError::Query(format!("Failed to map instance: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {INSTANCE_COLUMNS} FROM instances ORDER BY id"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query instances: {e}")))?;

        let mut instances = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read instance row: {e}")))?
        {
            instances.push(
                row_to_instance(&row)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map instance: {e}")))?,
            );
        }
        Ok(instances)
    }

    async fn find_instances(&self, ids: &[i64]) -> Result<Vec<Instance>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Inlined id list — integers only, never string input.
        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {INSTANCE_COLUMNS} FROM instances WHERE id IN ({id_list})");
        let mut rows = self
            .conn()
            .query(&sql, ())
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to query instances: {e}")))?;

        let mut instances = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read instance row: {e}")))?
        {
            instances.push(
                row_to_instance(&row)
                    .map_err(|e| DatabaseError::Query(format!("Failed to map instance: {e}")))?,
            );
        }
        Ok(instances)
    }

    async fn save_instance(&self, instance: &Instance) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE instances
                 SET name = ?1, ip = ?2, region = ?3, status = ?4,
                     specification = ?5, cpu_type = ?6, last_heartbeat = ?7
                 WHERE id = ?8",
                params![
                    instance.name.as_str(),
                    instance.ip.as_str(),
                    instance.region.as_str(),
                    instance_status_to_str(instance.status),
                    instance.specification.as_str(),
                    instance.cpu_type.as_str(),
                    instance.last_heartbeat.map(|dt| dt.to_rfc3339()),
                    instance.id,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to save instance: {e}")))?;
        Ok(())
    }

    async fn update_instance_status(
        &self,
        id: i64,
        status: InstanceStatus,
        heartbeat: DateTime<Utc>,
    ) -> Result<Option<Instance>, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE instances SET status = ?1, last_heartbeat = ?2 WHERE id = ?3",
                params![
                    instance_status_to_str(status),
                    heartbeat.to_rfc3339(),
                    id
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to update instance status: {e}")))?;

        if affected == 0 {
            return Ok(None);
        }
        self.get_instance(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances::model::NewInstance;

    async fn backend() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn new_instance(name: &str) -> NewInstance {
        NewInstance {
            name: name.into(),
            ip: "10.0.0.1".into(),
            region: "us-east".into(),
            status: InstanceStatus::Running,
            specification: "4c8g".into(),
            cpu_type: "x86".into(),
            last_heartbeat: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_task() {
        let db = backend().await;
        let created = db
            .create_task(&NewTask::new("TEST-smoke", "d", "normal"))
            .await
            .unwrap();
        assert!(created.id > 0);

        let fetched = db.get_task(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "TEST-smoke");
        assert_eq!(fetched.status, TaskStatus::Pending);
        assert_eq!(fetched.progress, 0.0);
        assert!(fetched.completed_at.is_none());
        assert!(fetched.instances.is_empty());
    }

    #[tokio::test]
    async fn get_missing_task_returns_none() {
        let db = backend().await;
        assert!(db.get_task(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_task_persists_mutations() {
        let db = backend().await;
        let mut task = db
            .create_task(&NewTask::new("TEST-x", "d", "normal"))
            .await
            .unwrap();

        task.status = TaskStatus::Completed;
        task.progress = 100.0;
        task.completed_at = Some(Utc::now());
        db.save_task(&task).await.unwrap();

        let fetched = db.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TaskStatus::Completed);
        assert_eq!(fetched.progress, 100.0);
        assert!(fetched.completed_at.is_some());
    }

    #[tokio::test]
    async fn task_instance_links() {
        let db = backend().await;
        let a = db.create_instance(&new_instance("web-1")).await.unwrap();
        let b = db.create_instance(&new_instance("web-2")).await.unwrap();
        let task = db
            .create_task(&NewTask::new("deploy web", "d", "deploy"))
            .await
            .unwrap();

        db.replace_task_instances(task.id, &[a.id, b.id])
            .await
            .unwrap();
        let fetched = db.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.instances.len(), 2);

        db.replace_task_instances(task.id, &[b.id]).await.unwrap();
        let fetched = db.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.instances.len(), 1);
        assert_eq!(fetched.instances[0].id, b.id);
    }

    #[tokio::test]
    async fn delete_task_cascades_logs_and_links_but_keeps_instances() {
        let db = backend().await;
        let instance = db.create_instance(&new_instance("web-1")).await.unwrap();
        let task = db
            .create_task(&NewTask::new("TEST-x", "d", "normal"))
            .await
            .unwrap();
        db.replace_task_instances(task.id, &[instance.id])
            .await
            .unwrap();
        db.append_log(task.id, Utc::now(), "[INFO] Task-1 - created")
            .await
            .unwrap();

        assert!(db.delete_task(task.id).await.unwrap());
        assert!(db.get_task(task.id).await.unwrap().is_none());
        assert!(db.logs_for_task(task.id).await.unwrap().is_empty());
        // The instance survives.
        assert!(db.get_instance(instance.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_missing_task_returns_false() {
        let db = backend().await;
        assert!(!db.delete_task(42).await.unwrap());
    }

    #[tokio::test]
    async fn logs_come_back_in_chronological_order() {
        let db = backend().await;
        let task = db
            .create_task(&NewTask::new("TEST-x", "d", "normal"))
            .await
            .unwrap();

        let base = Utc::now();
        db.append_log(task.id, base + chrono::Duration::seconds(2), "third")
            .await
            .unwrap();
        db.append_log(task.id, base, "first").await.unwrap();
        db.append_log(task.id, base + chrono::Duration::seconds(1), "second")
            .await
            .unwrap();

        let logs = db.logs_for_task(task.id).await.unwrap();
        let messages: Vec<&str> = logs.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn instance_crud() {
        let db = backend().await;
        let created = db.create_instance(&new_instance("web-1")).await.unwrap();
        assert!(created.id > 0);
        assert!(created.last_heartbeat.is_some());

        let mut fetched = db.get_instance(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "web-1");

        fetched.region = "eu-west".into();
        db.save_instance(&fetched).await.unwrap();
        let fetched = db.get_instance(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.region, "eu-west");

        assert_eq!(db.list_instances().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_instances_returns_existing_subset() {
        let db = backend().await;
        let a = db.create_instance(&new_instance("web-1")).await.unwrap();

        let found = db.find_instances(&[a.id, 9999]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);

        assert!(db.find_instances(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_file_backend_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/opstrack.db");

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let task = db
            .create_task(&NewTask::new("TEST-x", "d", "normal"))
            .await
            .unwrap();
        assert!(db.get_task(task.id).await.unwrap().is_some());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn update_instance_status_refreshes_heartbeat() {
        let db = backend().await;
        let created = db.create_instance(&new_instance("web-1")).await.unwrap();
        let heartbeat = Utc::now() + chrono::Duration::seconds(30);

        let updated = db
            .update_instance_status(created.id, InstanceStatus::Maintenance, heartbeat)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, InstanceStatus::Maintenance);
        assert_eq!(
            updated.last_heartbeat.unwrap().timestamp(),
            heartbeat.timestamp()
        );

        assert!(
            db.update_instance_status(9999, InstanceStatus::Stopped, Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }
}
