//! Background tasks
//!
//! - [`TaskKind::Warmup`] - runs once at startup (import directory scan)
//! - [`TaskKind::Periodic`] - runs on an interval until shutdown (due request sweep)
//!
//! A panicking task is logged and does not take the server down.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Warmup,
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskKind::Warmup => "warmup",
            TaskKind::Periodic => "periodic",
        })
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

fn describe_panic(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast::<String>()
        .map(|s| *s)
        .or_else(|p| p.downcast::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|_| "non-string panic payload".to_string())
}

/// Runs `future`; logs a panic and returns `false`
async fn guarded<F: Future<Output = ()>>(name: &str, future: F) -> bool {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(task = name, panic = %describe_panic(payload), "Background task panicked");
            false
        }
    }
}

/// Registered background tasks
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.spawn_periodic("due_sweep", Duration::from_secs(60), move || {
///     let lifecycle = lifecycle.clone();
///     async move { let _ = lifecycle.sweep_due(today()).await; }
/// });
/// tasks.shutdown().await;
/// ```
#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// For tasks that watch for shutdown themselves
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            if guarded(name, future).await && kind == TaskKind::Periodic && !token.is_cancelled() {
                tracing::warn!(task = name, "Periodic task returned before shutdown");
            }
        });
        tracing::debug!(task = name, %kind, "Background task started");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    /// Calls `tick` every `interval`, first call immediately, until shutdown
    ///
    /// A panic only loses that one tick.
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, interval: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        self.spawn(name, TaskKind::Periodic, async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        guarded(name, tick()).await;
                    }
                }
            }
            tracing::debug!(task = name, "Periodic task stopped");
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn log_summary(&self) {
        let periodic = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Periodic)
            .count();
        tracing::info!(
            total = self.tasks.len(),
            periodic,
            warmup = self.tasks.len() - periodic,
            "Background tasks registered"
        );
    }

    /// Number of periodic tasks that have stopped; 0 while healthy
    pub fn check_health(&self) -> usize {
        let dead: Vec<&str> = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Periodic && t.handle.is_finished())
            .map(|t| t.name)
            .collect();
        if !dead.is_empty() {
            tracing::error!(tasks = ?dead, "Periodic tasks are no longer running");
        }
        dead.len()
    }

    /// Signals shutdown and waits for every task
    pub async fn shutdown(self) {
        tracing::info!(count = self.tasks.len(), "Stopping background tasks");
        self.shutdown.cancel();

        for task in self.tasks {
            if let Err(e) = task.handle.await
                && !e.is_cancelled()
            {
                tracing::error!(task = task.name, error = ?e, "Background task failed to join");
            }
        }
        tracing::info!("Background tasks stopped");
    }
}
