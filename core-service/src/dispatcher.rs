//! Background dispatcher
//!
//! Owns the worker runtime that every facade operation runs on. Dispatch
//! never blocks the caller; the result arrives through the operation's
//! [`Completion`] on a worker thread.
//!
//! Shutdown is two-phase: new dispatches are refused first, then in-flight
//! tasks are awaited before the runtime is released.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::completion::{Completion, Outcome};
use crate::error::{CoreError, Failure, Result};

pub const WORKER_THREAD_NAME: &str = "medialib-worker";

pub struct Dispatcher {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    tracker: TaskTracker,
    accepting: RwLock<bool>,
}

impl Dispatcher {
    pub fn new(worker_threads: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()
            .map_err(|e| {
                CoreError::InitializationFailed(format!("Failed to start worker pool: {}", e))
            })?;

        info!(worker_threads, "Worker pool started");
        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            tracker: TaskTracker::new(),
            accepting: RwLock::new(true),
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn is_accepting(&self) -> bool {
        *self.accepting.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of operations still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Run `work` on the pool and deliver its outcome to `completion`.
    ///
    /// After shutdown has begun this returns [`CoreError::ShuttingDown`] and
    /// drops `completion` without invoking it. A panic inside `work` is
    /// delivered as an internal failure.
    pub fn dispatch<T, Fut>(
        &self,
        operation: &'static str,
        work: Fut,
        completion: Completion<T>,
    ) -> Result<()>
    where
        T: Send + 'static,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let accepting = self.accepting.read().unwrap_or_else(PoisonError::into_inner);
        if !*accepting {
            debug!(operation, "Dispatch refused during shutdown");
            return Err(CoreError::ShuttingDown);
        }

        self.tracker.spawn_on(
            async move {
                let outcome = AssertUnwindSafe(work)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(Failure::internal(format!(
                            "{} panicked: {}",
                            operation,
                            panic_message(panic.as_ref())
                        )))
                    });
                match &outcome {
                    Ok(_) => debug!(operation, "Operation complete"),
                    Err(failure) => {
                        warn!(operation, code = ?failure.code, message = %failure.message, "Operation failed")
                    }
                }
                completion.complete(outcome);
            },
            &self.handle,
        );
        Ok(())
    }

    /// Refuse new work and wait for in-flight operations.
    pub async fn drain(&self) {
        {
            let mut accepting = self.accepting.write().unwrap_or_else(PoisonError::into_inner);
            *accepting = false;
        }
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "Waiting for in-flight operations");
        }
        self.tracker.wait().await;
    }

    /// Drain, then release the worker threads.
    ///
    /// Must not be awaited from inside a dispatched operation.
    pub async fn shutdown(&self) {
        self.drain().await;
        self.release_runtime();
        info!("Worker pool stopped");
    }

    fn release_runtime(&self) {
        let runtime = self
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which panics inside another runtime.
        self.release_runtime();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureCode;
    use std::time::Duration;

    async fn explode(message: &'static str) -> Outcome<u32> {
        panic!("{}", message)
    }

    #[tokio::test]
    async fn test_runs_on_named_worker_threads() {
        let dispatcher = Dispatcher::new(2).unwrap();
        let (done, rx) = Completion::channel();

        dispatcher
            .dispatch(
                "thread_name",
                async { Ok::<_, Failure>(std::thread::current().name().map(str::to_string)) },
                done,
            )
            .unwrap();

        let name = rx.await.unwrap().unwrap();
        assert_eq!(name.as_deref(), Some(WORKER_THREAD_NAME));
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_failure() {
        let dispatcher = Dispatcher::new(1).unwrap();
        let (done, rx) = Completion::<u32>::channel();

        dispatcher
            .dispatch("explode", explode("boom"), done)
            .unwrap();

        let failure = rx.await.unwrap().unwrap_err();
        assert_eq!(failure.code, FailureCode::Internal);
        assert!(failure.message.contains("boom"));
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_other_operations() {
        let dispatcher = Dispatcher::new(2).unwrap();
        let (bad, bad_rx) = Completion::<u32>::channel();
        let (good, good_rx) = Completion::<u32>::channel();

        dispatcher
            .dispatch("bad", explode("bad input"), bad)
            .unwrap();
        dispatcher
            .dispatch("good", async { Ok::<_, Failure>(5) }, good)
            .unwrap();

        assert!(bad_rx.await.unwrap().is_err());
        assert_eq!(good_rx.await.unwrap().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_refuses() {
        let dispatcher = Dispatcher::new(1).unwrap();
        let (slow, slow_rx) = Completion::<&'static str>::channel();

        dispatcher
            .dispatch(
                "slow",
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, Failure>("finished")
                },
                slow,
            )
            .unwrap();

        dispatcher.shutdown().await;
        assert_eq!(slow_rx.await.unwrap().unwrap(), "finished");
        assert_eq!(dispatcher.in_flight(), 0);

        let (late, late_rx) = Completion::<u32>::channel();
        let refused = dispatcher.dispatch("late", async { Ok::<_, Failure>(1) }, late);
        assert!(matches!(refused, Err(CoreError::ShuttingDown)));
        assert!(late_rx.await.is_err());
    }
}
