use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::Result;

/// Result of one per-service operation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "detail")]
pub enum TaskOutcome<T> {
    Succeeded(T),
    Failed(String),
    /// Never launched because the batch was interrupted.
    Skipped,
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded(_))
    }
}

/// Bounded-concurrency executor for independent per-service operations.
///
/// Outcomes are keyed by service name; failures are collected rather than
/// short-circuiting the batch.
pub struct TaskRunner {
    jobs: usize,
    interrupted: Arc<AtomicBool>,
}

impl TaskRunner {
    pub fn new(jobs: usize) -> Self {
        Self {
            jobs: jobs.max(1),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Flag that stops new launches once set. In-flight operations run to completion.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub async fn run<T, F, Fut>(&self, tasks: Vec<(String, F)>) -> BTreeMap<String, TaskOutcome<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut set = JoinSet::new();
        let mut names = HashMap::new();
        let mut outcomes = BTreeMap::new();

        let mut pending = tasks.into_iter();
        while let Some((name, task)) = pending.next() {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                outcomes.insert(name, TaskOutcome::Skipped);
                continue;
            };
            if self.interrupted.load(Ordering::SeqCst) {
                tracing::warn!("interrupted, not launching remaining tasks");
                outcomes.insert(name, TaskOutcome::Skipped);
                for (rest, _) in pending.by_ref() {
                    outcomes.insert(rest, TaskOutcome::Skipped);
                }
                break;
            }

            let task_name = name.clone();
            let handle = set.spawn(async move {
                let _permit = permit;
                tracing::debug!("running task for {task_name}");
                task().await
            });
            names.insert(handle.id(), name);
        }

        while let Some(joined) = set.join_next_with_id().await {
            let (name, outcome) = match joined {
                Ok((id, Ok(value))) => (names.remove(&id), TaskOutcome::Succeeded(value)),
                Ok((id, Err(e))) => (names.remove(&id), TaskOutcome::Failed(e.to_string())),
                Err(e) => (
                    names.remove(&e.id()),
                    TaskOutcome::Failed(format!("task aborted: {e}")),
                ),
            };
            if let Some(name) = name {
                outcomes.insert(name, outcome);
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NexusError;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn fifty_tasks_with_ceiling_of_four() {
        let runner = TaskRunner::new(4);
        let invocations = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let invocations = Arc::clone(&invocations);
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                let name = format!("service-{i:02}");
                (name, move || async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5 + (i % 3) as u64)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, NexusError>(i)
                })
            })
            .collect();

        let outcomes = runner.run(tasks).await;
        assert_eq!(outcomes.len(), 50);
        assert_eq!(invocations.load(Ordering::SeqCst), 50);
        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(outcomes["service-07"], TaskOutcome::Succeeded(7));
        assert!(outcomes.values().all(TaskOutcome::is_success));
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let runner = TaskRunner::new(2);
        let tasks: Vec<_> = ["alpha", "beta", "gamma", "delta"]
            .into_iter()
            .map(|name| {
                let owned = name.to_string();
                (owned.clone(), move || async move {
                    if owned == "beta" || owned == "delta" {
                        Err(NexusError::ExternalTool {
                            tool: "docker compose".into(),
                            message: format!("{owned}: invalid interpolation"),
                        })
                    } else {
                        Ok(())
                    }
                })
            })
            .collect();

        let outcomes = runner.run(tasks).await;
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes["alpha"].is_success());
        assert!(outcomes["gamma"].is_success());
        assert_eq!(
            outcomes["beta"],
            TaskOutcome::Failed("docker compose failed: beta: invalid interpolation".into())
        );
        assert!(matches!(outcomes["delta"], TaskOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn interrupted_runner_skips_unlaunched_tasks() {
        let runner = TaskRunner::new(1);
        let handle = runner.interrupt_handle();

        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let handle = Arc::clone(&handle);
                (format!("svc-{i}"), move || async move {
                    handle.store(true, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok::<_, NexusError>(i)
                })
            })
            .collect();

        let outcomes = runner.run(tasks).await;
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes["svc-0"], TaskOutcome::Succeeded(0));
        for i in 1..5 {
            assert_eq!(outcomes[&format!("svc-{i}")], TaskOutcome::Skipped);
        }
    }

    #[tokio::test]
    async fn zero_jobs_is_clamped_to_one() {
        let runner = TaskRunner::new(0);
        assert_eq!(runner.jobs(), 1);
        let outcomes = runner
            .run(vec![("only".to_string(), || async { Ok::<_, NexusError>("done") })])
            .await;
        assert_eq!(outcomes["only"], TaskOutcome::Succeeded("done"));
    }
}
