//! Debounced autosave: an edit schedules a save after a quiet period, and any
//! further edit to the same resume restarts the timer.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::session::{SaveStatus, StateCell};

pub const AUTOSAVE_QUIET_PERIOD: Duration = Duration::from_millis(2000);

pub struct Debouncer<K> {
    quiet: Duration,
    pending: Mutex<HashMap<K, JoinHandle<()>>>,
    status: Arc<StateCell<SaveStatus>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static,
{
    pub fn new(quiet: Duration, status: Arc<StateCell<SaveStatus>>) -> Self {
        Self {
            quiet,
            pending: Mutex::new(HashMap::new()),
            status,
        }
    }

    /// Schedules `save` for `key`, replacing any save still waiting out its quiet
    /// period. A save that has already started is left to finish.
    pub fn schedule<F, Fut>(&self, key: K, save: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let quiet = self.quiet;
        let status = self.status.clone();
        let label = key.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            // Detached so a later edit cannot abort a save mid-flight.
            tokio::spawn(async move {
                status.set(SaveStatus::Saving);
                match save().await {
                    Ok(()) => {
                        debug!("Autosaved {label:?}");
                        status.set(SaveStatus::Saved);
                    }
                    Err(e) => {
                        warn!("Autosave of {label:?} failed: {e:#}");
                        status.set(SaveStatus::Error(e.to_string()));
                    }
                }
            });
        });

        let mut pending = self.lock();
        // Timers that already fired have nothing left to cancel.
        pending.retain(|_, handle| !handle.is_finished());
        if let Some(previous) = pending.insert(key, timer) {
            previous.abort();
        }
    }

    /// Drops the pending save for `key`, if any. Returns whether one was waiting.
    pub fn cancel(&self, key: &K) -> bool {
        match self.lock().remove(key) {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.lock().values().filter(|h| !h.is_finished()).count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, JoinHandle<()>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let pending = match self.pending.get_mut() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}
