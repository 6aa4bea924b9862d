//! Values the host hands to every dispatch: environment bindings and the
//! per-request execution context

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::task::JoinSet;

/// Read-only bindings shared by every request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Env(Map<String, Value>);

impl Env {
    pub const fn new(bindings: Map<String, Value>) -> Self {
        Self(bindings)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lifecycle handle for one request
///
/// Work registered with [`wait_until`](Self::wait_until) keeps running after
/// the response is produced; the host awaits it with
/// [`settle`](Self::settle). Clones share the same task set.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `future` in the background, past the end of the response
    ///
    /// Must be called from within a tokio runtime.
    pub fn wait_until<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .spawn(future);
    }

    /// Background tasks not yet settled
    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Await every background task registered so far
    ///
    /// Returns how many of them failed (panicked or were aborted).
    pub async fn settle(&self) -> usize {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        let mut failed = 0;
        while let Some(result) = tasks.join_next().await {
            if result.is_err() {
                failed += 1;
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_env_lookup() {
        let Value::Object(map) = json!({ "REGION": "eu-west", "RETRIES": 3 }) else {
            unreachable!()
        };
        let env = Env::new(map);
        assert_eq!(env.get_str("REGION"), Some("eu-west"));
        assert_eq!(env.get("RETRIES"), Some(&json!(3)));
        assert_eq!(env.get_str("RETRIES"), None);
        assert_eq!(env.len(), 2);
        assert!(Env::default().is_empty());
    }

    #[tokio::test]
    async fn test_wait_until_runs_after_handoff() {
        let ctx = ExecutionContext::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            ctx.clone().wait_until(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(ctx.pending(), 3);

        assert_eq!(ctx.settle().await, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(ctx.pending(), 0);
    }

    #[tokio::test]
    async fn test_settle_counts_panics() {
        let ctx = ExecutionContext::new();
        ctx.wait_until(async { panic!("background failure") });
        ctx.wait_until(async {});
        assert_eq!(ctx.settle().await, 1);
    }
}
