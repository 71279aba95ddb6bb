//! In-flight Load Merging
//!
//! Concurrent misses on the same key share one fetch: the first caller
//! runs it and every caller that arrives meanwhile receives a clone of its
//! result.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use crate::cache::ByteView;
use crate::error::{CacheError, Result};

type Waiters = Vec<oneshot::Sender<Result<ByteView>>>;

// == Flight Group ==
/// Tracks fetches currently running, keyed by cache key.
#[derive(Debug, Default)]
pub struct FlightGroup {
    calls: Mutex<HashMap<String, Waiters>>,
}

impl FlightGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` for `key` unless a fetch for it is already running, in
    /// which case this waits for that fetch's result instead.
    ///
    /// The entry is cleared when the fetch completes. If the leading caller
    /// is cancelled, waiting callers get an internal error and the next
    /// call starts a fresh fetch.
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> Result<ByteView>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ByteView>>,
    {
        let waiter = {
            let mut calls = self.calls.lock();
            match calls.entry(key.to_string()) {
                Entry::Occupied(mut call) => {
                    let (tx, rx) = oneshot::channel();
                    call.get_mut().push(tx);
                    Some(rx)
                }
                Entry::Vacant(slot) => {
                    slot.insert(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            trace!(key, "joined in-flight load");
            return rx.await.unwrap_or_else(|_| {
                Err(CacheError::Internal(format!(
                    "in-flight load of {} was abandoned",
                    key
                )))
            });
        }

        let call = CallGuard {
            group: self,
            key,
            finished: false,
        };
        let result = fetch().await;
        for tx in call.finish() {
            let _ = tx.send(result.clone());
        }
        result
    }

    /// Returns the number of keys with a fetch in progress.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Removes the in-flight entry even when the leading future is dropped.
struct CallGuard<'a> {
    group: &'a FlightGroup,
    key: &'a str,
    finished: bool,
}

impl CallGuard<'_> {
    fn finish(mut self) -> Waiters {
        self.finished = true;
        self.group.calls.lock().remove(self.key).unwrap_or_default()
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.group.calls.lock().remove(self.key);
        }
    }
}
