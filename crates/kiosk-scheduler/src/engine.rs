use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    schedule::{next_delay, validate},
    types::{Schedule, TaskInfo},
};

/// Owns the shutdown signal for every repeater spawned through its handles.
pub struct SchedulerEngine {
    handle: SchedulerHandle,
    shutdown_tx: watch::Sender<bool>,
}

impl SchedulerEngine {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            handle: SchedulerHandle {
                tasks: Arc::new(DashMap::new()),
                shutdown: shutdown_rx,
            },
            shutdown_tx,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Stop every repeater at its next sleep.
    pub fn shutdown(&self) {
        info!("scheduler engine shutting down");
        let _ = self.shutdown_tx.send(true);
    }
}

impl Default for SchedulerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle used to install repeaters and inspect them.
#[derive(Clone)]
pub struct SchedulerHandle {
    tasks: Arc<DashMap<String, TaskInfo>>,
    shutdown: watch::Receiver<bool>,
}

impl SchedulerHandle {
    /// Install an independent repeater.
    ///
    /// The first run happens after `first_after`; each following run waits the
    /// schedule's delay after the previous run completed.
    pub fn spawn_repeating<F, Fut>(
        &self,
        name: &str,
        schedule: Schedule,
        first_after: Duration,
        mut task: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        validate(&schedule)?;
        self.tasks.insert(
            name.to_string(),
            TaskInfo {
                name: name.to_string(),
                schedule: schedule.clone(),
                run_count: 0,
                last_run: None,
            },
        );
        info!(task = %name, ?schedule, "repeater installed");

        let tasks = Arc::clone(&self.tasks);
        let mut shutdown = self.shutdown.clone();
        let name = name.to_string();
        Ok(tokio::spawn(async move {
            let mut delay = first_after;
            while sleep_or_shutdown(delay, &mut shutdown).await {
                debug!(task = %name, "running");
                task().await;
                if let Some(mut info) = tasks.get_mut(&name) {
                    info.run_count += 1;
                    info.last_run = Some(Utc::now());
                }
                delay = next_delay(&schedule);
            }
            debug!(task = %name, "repeater stopped");
        }))
    }

    /// Run `fut` once after `delay`, unless the engine shuts down first.
    pub fn spawn_after<Fut>(&self, name: &str, delay: Duration, fut: Fut) -> JoinHandle<()>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            if sleep_or_shutdown(delay, &mut shutdown).await {
                debug!(task = %name, "delayed run");
                fut.await;
            }
        })
    }

    /// Run a self-timed loop until the engine shuts down.
    pub fn spawn_until_shutdown<Fut>(&self, name: &str, fut: Fut) -> JoinHandle<()>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            let stopped = async move {
                if shutdown.wait_for(|stop| *stop).await.is_err() {
                    // Engine dropped without signalling; run until the loop ends.
                    std::future::pending::<()>().await;
                }
            };
            tokio::select! {
                _ = fut => debug!(task = %name, "finished"),
                _ = stopped => debug!(task = %name, "stopped"),
            }
        })
    }

    /// All installed repeaters ordered by name.
    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        let mut tasks: Vec<TaskInfo> = self.tasks.iter().map(|e| e.value().clone()).collect();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        tasks
    }
}

/// Sleep for `delay`. Returns false if shutdown was signalled first.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return false,
                Ok(()) => continue,
                Err(_) => {
                    // Engine dropped without signalling; keep running on the timer alone.
                    warn!("scheduler shutdown channel closed");
                    (&mut sleep).await;
                    return true;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn repeater_runs_after_first_delay_then_on_schedule() {
        let engine = SchedulerEngine::new();
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        engine
            .handle()
            .spawn_repeating("count", Schedule::every(10), Duration::from_secs(5), move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        let info = engine.handle().list_tasks();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].run_count, 3);
        assert!(info[0].last_run.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_repeaters() {
        let engine = SchedulerEngine::new();
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let join = engine
            .handle()
            .spawn_repeating("stop-me", Schedule::every(1), Duration::ZERO, move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        engine.shutdown();
        join.await.unwrap();
        let seen = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_schedule_is_rejected() {
        let engine = SchedulerEngine::new();
        let result = engine
            .handle()
            .spawn_repeating("spin", Schedule::every(0), Duration::ZERO, || async {});
        assert!(result.is_err());
        assert!(engine.handle().list_tasks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_after_fires_once() {
        let engine = SchedulerEngine::new();
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let join = engine.handle().spawn_after("once", Duration::from_secs(3), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        join.await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn self_timed_loop_stops_on_shutdown() {
        let engine = SchedulerEngine::new();
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let join = engine.handle().spawn_until_shutdown("loop", async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        engine.shutdown();
        join.await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
