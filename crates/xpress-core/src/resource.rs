// ── Remote resources ──
//
// A `Resource<T>` is one remotely fetched list with `{data, loading, error}`
// state published over a `watch` channel. Each `load` takes a generation
// number; a response that comes back after a newer load started is dropped,
// so a slow old request can never overwrite a fresh one.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use strum::Display;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;

/// Observable state of a [`Resource`].
#[derive(Debug)]
pub struct ResourceState<T> {
    pub data: Arc<Vec<T>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: Arc::new(Vec::new()),
            loading: false,
            error: None,
        }
    }
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

/// Which cached lists a mutation made stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Invalidation {
    Products,
    Vendors,
    Users,
}

/// A generation-guarded remote list.
pub struct Resource<T> {
    name: &'static str,
    state: watch::Sender<ResourceState<T>>,
    generation: AtomicU64,
}

impl<T: Send + Sync + 'static> Resource<T> {
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            name,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Run `fetch` and publish its outcome.
    ///
    /// Returns `Ok(true)` when the result was applied and `Ok(false)` when a
    /// newer load superseded this one and the result was discarded. On a
    /// current failure the data is emptied, the message recorded, and the
    /// error returned.
    pub async fn load<F>(&self, fetch: F) -> Result<bool, CoreError>
    where
        F: Future<Output = Result<Vec<T>, CoreError>>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = fetch.await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(resource = self.name, generation, "dropping superseded response");
            return Ok(false);
        }

        match result {
            Ok(items) => {
                debug!(resource = self.name, count = items.len(), "loaded");
                self.state.send_replace(ResourceState {
                    data: Arc::new(items),
                    loading: false,
                    error: None,
                });
                Ok(true)
            }
            Err(e) => {
                debug!(resource = self.name, error = %e, "load failed");
                self.state.send_replace(ResourceState {
                    data: Arc::new(Vec::new()),
                    loading: false,
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }

    /// Reset to an empty, idle state without fetching, and discard any
    /// load still in flight.
    pub fn skip(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(ResourceState::default());
    }

    pub fn snapshot(&self) -> ResourceState<T> {
        self.state.borrow().clone()
    }

    /// The current data without the surrounding state.
    pub fn data(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.state.borrow().data)
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn success_replaces_data() {
        let res = Resource::new("numbers");
        assert!(res.load(async { Ok(vec![1, 2, 3]) }).await.unwrap());

        let snap = res.snapshot();
        assert_eq!(*snap.data, vec![1, 2, 3]);
        assert!(!snap.loading);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn failure_empties_data_and_records_message() {
        let res = Resource::new("numbers");
        res.load(async { Ok(vec![1]) }).await.unwrap();

        let err = res
            .load(async {
                Err::<Vec<i32>, _>(CoreError::ServiceUnavailable { status: 502 })
            })
            .await
            .unwrap_err();

        let snap = res.snapshot();
        assert!(snap.data.is_empty());
        assert_eq!(snap.error, Some(err.to_string()));
    }

    #[tokio::test]
    async fn superseded_response_is_dropped() {
        let res = Arc::new(Resource::new("numbers"));
        let (release_old, wait_old) = oneshot::channel::<()>();

        let old = tokio::spawn({
            let res = Arc::clone(&res);
            async move {
                res.load(async move {
                    wait_old.await.ok();
                    Ok(vec![1])
                })
                .await
            }
        });

        // Let the old load register its generation first.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(res.load(async { Ok(vec![2]) }).await.unwrap());

        release_old.send(()).unwrap();
        assert!(!old.await.unwrap().unwrap());
        assert_eq!(*res.data(), vec![2]);
    }

    #[tokio::test]
    async fn skip_resets_and_discards_in_flight() {
        let res = Arc::new(Resource::new("numbers"));
        let (release, wait) = oneshot::channel::<()>();

        let pending = tokio::spawn({
            let res = Arc::clone(&res);
            async move {
                res.load(async move {
                    wait.await.ok();
                    Ok(vec![1])
                })
                .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(res.snapshot().loading);

        res.skip();
        release.send(()).unwrap();
        assert!(!pending.await.unwrap().unwrap());
        assert!(res.data().is_empty());
        assert!(!res.snapshot().loading);
    }
}
