//! Deployment processor — staged rollout timeline for tasks created with
//! the `DEPLOY-` title prefix.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProcessorError;
use crate::processor::runner::{ProcessorContext, TaskProcessor};
use crate::tasks::model::TaskStatus;

/// Phase durations for the deployment timeline.
#[derive(Debug, Clone)]
pub struct DeployTimings {
    pub prepare: Duration,
    pub rollout: Duration,
    pub verify: Duration,
}

impl Default for DeployTimings {
    fn default() -> Self {
        Self {
            prepare: Duration::from_secs(5),
            rollout: Duration::from_secs(10),
            verify: Duration::from_secs(5),
        }
    }
}

/// Simulated deployment: prepare, roll out, verify, complete.
pub struct DeployProcessor {
    timings: DeployTimings,
}

impl DeployProcessor {
    pub fn new() -> Self {
        Self {
            timings: DeployTimings::default(),
        }
    }

    pub fn with_timings(timings: DeployTimings) -> Self {
        Self { timings }
    }
}

impl Default for DeployProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskProcessor for DeployProcessor {
    fn kind(&self) -> &'static str {
        "deploy"
    }

    fn title_prefix(&self) -> &'static str {
        "DEPLOY-"
    }

    async fn process(&self, ctx: &ProcessorContext) -> Result<(), ProcessorError> {
        tokio::time::sleep(self.timings.prepare).await;

        ctx.mutator
            .update_progress(25.0, Some(TaskStatus::InProgress))
            .await?;
        ctx.logger
            .info("Deployment prepared, progress: 25%")
            .await?;

        tokio::time::sleep(self.timings.rollout).await;

        ctx.mutator.update_progress(75.0, None).await?;
        ctx.logger
            .info("Rollout finished, progress: 75%")
            .await?;

        tokio::time::sleep(self.timings.verify).await;

        ctx.mutator.complete().await?;
        ctx.logger
            .info("Deployment completed, progress: 100%")
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

    #[tokio::test]
    async fn timeline_runs_to_completion() {
        let store: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let mut new = NewTask::new("DEPLOY-web", "d", "deploy");
        new.status = TaskStatus::InProgress;
        let task = store.create_task(&new).await.unwrap();

        let ctx = ProcessorContext::new(Arc::clone(&store), Arc::new(TaskLocks::new()), task.id);
        let processor = DeployProcessor::with_timings(DeployTimings {
            prepare: Duration::from_millis(20),
            rollout: Duration::from_millis(20),
            verify: Duration::from_millis(20),
        });
        execute(&processor, &ctx).await;

        let task = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100.0);

        let logs = store.logs_for_task(task.id).await.unwrap();
        assert_eq!(logs.len(), 3);
        assert!(logs[0].message.contains("25%"));
        assert!(logs[1].message.contains("75%"));
        assert!(logs[2].message.contains("100%"));
    }
}
