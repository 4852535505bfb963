//! Simulation processor — scripted two-phase progress timeline for tasks
//! created with the `TEST-` title prefix.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProcessorError;
use crate::processor::runner::{ProcessorContext, TaskProcessor};
use crate::tasks::model::TaskStatus;

/// Phase durations for the simulation timeline.
#[derive(Debug, Clone)]
pub struct SimulationTimings {
    /// Sleep before the task reaches 50% progress.
    pub first_phase: Duration,
    /// Sleep before the task completes.
    pub second_phase: Duration,
}

impl Default for SimulationTimings {
    fn default() -> Self {
        Self {
            first_phase: Duration::from_secs(10),
            second_phase: Duration::from_secs(5),
        }
    }
}

/// Simulated task execution: wait, report 50%, wait, complete.
pub struct SimulationProcessor {
    timings: SimulationTimings,
}

impl SimulationProcessor {
    pub fn new() -> Self {
        Self {
            timings: SimulationTimings::default(),
        }
    }

    /// Override the phase durations (tests shrink them to milliseconds).
    pub fn with_timings(timings: SimulationTimings) -> Self {
        Self { timings }
    }
}

impl Default for SimulationProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskProcessor for SimulationProcessor {
    fn kind(&self) -> &'static str {
        "simulation"
    }

    fn title_prefix(&self) -> &'static str {
        "TEST-"
    }

    async fn process(&self, ctx: &ProcessorContext) -> Result<(), ProcessorError> {
        tokio::time::sleep(self.timings.first_phase).await;

        ctx.mutator
            .update_progress(50.0, Some(TaskStatus::InProgress))
            .await?;
        ctx.logger
            .info("Test task in progress, current progress: 50%")
            .await?;

        tokio::time::sleep(self.timings.second_phase).await;

        ctx.mutator.complete().await?;
        ctx.logger
            .info("Test task completed, progress: 100%")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::processor::runner::execute;
    use crate::processor::state::TaskLocks;
    use crate::store::{Database, LibSqlBackend};
    use crate::tasks::model::NewTask;

    fn fast_timings() -> SimulationTimings {
        SimulationTimings {
            first_phase: Duration::from_millis(60),
            second_phase: Duration::from_millis(60),
        }
    }

    async fn setup() -> (Arc<dyn Database>, Arc<TaskLocks>, i64) {
        let store: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let mut new = NewTask::new("TEST-smoke", "d", "normal");
        new.status = TaskStatus::InProgress;
        let task = store.create_task(&new).await.unwrap();
        (store, Arc::new(TaskLocks::new()), task.id)
    }

    #[tokio::test]
    async fn timeline_runs_to_completion() {
        let (store, locks, task_id) = setup().await;
        let ctx = ProcessorContext::new(Arc::clone(&store), locks, task_id);

        let processor = SimulationProcessor::with_timings(fast_timings());
        execute(&processor, &ctx).await;

        let task = store.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100.0);
        assert!(task.completed_at.is_some());

        let logs = store.logs_for_task(task_id).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs[0].message.contains("50%"));
        assert!(logs[1].message.contains("100%"));
    }

    #[tokio::test]
    async fn midpoint_shows_half_progress() {
        let (store, locks, task_id) = setup().await;
        let ctx = ProcessorContext::new(Arc::clone(&store), locks, task_id);

        let handle = tokio::spawn(async move {
            let processor = SimulationProcessor::with_timings(SimulationTimings {
                first_phase: Duration::from_millis(50),
                second_phase: Duration::from_millis(200),
            });
            execute(&processor, &ctx).await;
        });

        // Land between the two phases.
        tokio::time::sleep(Duration::from_millis(130)).await;
        let task = store.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.progress, 50.0);
        assert!(task.completed_at.is_none());

        handle.await.unwrap();
        let task = store.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn survives_task_deleted_mid_timeline() {
        let (store, locks, task_id) = setup().await;
        let ctx = ProcessorContext::new(Arc::clone(&store), locks, task_id);

        store.delete_task(task_id).await.unwrap();

        let processor = SimulationProcessor::with_timings(fast_timings());
        execute(&processor, &ctx).await;

        // Task stays gone; the run was a silent no-op apart from log rows.
        assert!(store.get_task(task_id).await.unwrap().is_none());
    }
}
