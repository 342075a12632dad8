//! Single-fire completions
//!
//! Every dispatched operation resolves through exactly one [`Completion`].
//! `complete` takes the completion by value, so a second delivery does not
//! compile.

use tokio::sync::oneshot;

use crate::error::Failure;

/// What a completion receives.
pub type Outcome<T> = std::result::Result<T, Failure>;

type Deliver<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

pub struct Completion<T> {
    deliver: Deliver<T>,
}

impl<T: Send + 'static> Completion<T> {
    /// Wrap a host callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        Self {
            deliver: Box::new(callback),
        }
    }

    /// A completion paired with a receiver that resolves once it fires.
    ///
    /// The receiver yields `Err(RecvError)` only if the completion was
    /// dropped without firing, which happens when dispatch is refused.
    pub fn channel() -> (Self, oneshot::Receiver<Outcome<T>>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self::new(move |outcome| {
            let _ = tx.send(outcome);
        });
        (completion, rx)
    }

    pub fn complete(self, outcome: Outcome<T>) {
        (self.deliver)(outcome)
    }

    /// Convert the delivered value before it reaches the callback.
    pub fn map<U, F>(self, convert: F) -> Completion<U>
    where
        U: Send + 'static,
        F: FnOnce(U) -> T + Send + 'static,
    {
        Completion::new(move |outcome: Outcome<U>| self.complete(outcome.map(convert)))
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callback_receives_outcome_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let completion = Completion::new(move |outcome: Outcome<u32>| {
            assert_eq!(outcome.unwrap(), 7);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        completion.complete(Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_channel_delivers_failure() {
        let (completion, rx) = Completion::<()>::channel();
        completion.complete(Err(Failure::new(FailureCode::NotFound, "missing")));

        let outcome = rx.await.unwrap();
        assert_eq!(outcome.unwrap_err().code, FailureCode::NotFound);
    }

    #[tokio::test]
    async fn test_dropped_completion_closes_channel() {
        let (completion, rx) = Completion::<()>::channel();
        drop(completion);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_map_converts_value() {
        let (completion, rx) = Completion::<String>::channel();
        let numeric = completion.map(|n: u32| format!("#{n}"));
        numeric.complete(Ok(3));
        assert_eq!(rx.await.unwrap().unwrap(), "#3");
    }
}
