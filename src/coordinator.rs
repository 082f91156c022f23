//! Single-flight driver for diff cache refreshes
//!
//! At most one refresh cycle runs at a time. Requests that arrive while a
//! cycle is running are folded into a single follow-up cycle, and each of
//! those callers waits for that follow-up to finish.
//!
//! Cycles run on a spawned task, so a caller that stops waiting never
//! leaves the coordinator stuck in `Refreshing`.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::cache::{DiffCache, RefreshOutcome};
use crate::core::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Refreshing,
}

/// Outcome slot of one cycle, filled when that cycle finishes
type Completion = Arc<watch::Sender<Option<RefreshOutcome>>>;

fn completion() -> Completion {
    let (tx, _) = watch::channel(None);
    Arc::new(tx)
}

struct State {
    phase: Phase,
    /// Cycles started so far; the running cycle's number while refreshing
    started: u64,
    files: Arc<Vec<FileEntry>>,
    /// Follow-up requested while a cycle was running
    owed: Option<Completion>,
}

struct Inner {
    cache: Arc<DiffCache>,
    state: Mutex<State>,
    completed: watch::Sender<u64>,
}

pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(cache: Arc<DiffCache>) -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                cache,
                state: Mutex::new(State {
                    phase: Phase::Idle,
                    started: 0,
                    files: Arc::new(Vec::new()),
                    owed: None,
                }),
                completed,
            }),
        }
    }

    pub fn cache(&self) -> &Arc<DiffCache> {
        &self.inner.cache
    }

    /// Replace the file list the next cycle refreshes against.
    pub fn set_files(&self, files: Vec<FileEntry>) {
        self.inner.lock().files = Arc::new(files);
    }

    pub fn files(&self) -> Arc<Vec<FileEntry>> {
        self.inner.lock().files.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase() == Phase::Refreshing
    }

    pub fn cycles_completed(&self) -> u64 {
        *self.inner.completed.borrow()
    }

    /// Completed-cycle counter, bumped every time a cycle finishes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.completed.subscribe()
    }

    /// Start a refresh cycle, or join the follow-up of the one in flight,
    /// and wait for it.
    ///
    /// The returned outcome is that of the cycle this call waited for.
    /// Dropping the returned future does not cancel the cycle.
    pub async fn request_refresh(&self) -> RefreshOutcome {
        let mut done = {
            let mut state = self.inner.lock();
            match state.phase {
                Phase::Refreshing => state.owed.get_or_insert_with(completion).subscribe(),
                Phase::Idle => {
                    state.phase = Phase::Refreshing;
                    state.started += 1;
                    let first = completion();
                    let done = first.subscribe();
                    tokio::spawn(Inner::drive(self.inner.clone(), first));
                    done
                }
            }
        };

        let outcome = match done.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).unwrap_or_default(),
            Err(_) => {
                tracing::warn!("Refresh cycle ended without an outcome");
                RefreshOutcome::default()
            }
        };
        outcome
    }
}

impl Inner {
    /// Run cycles until nothing is owed, then go idle.
    async fn drive(self: Arc<Self>, first: Completion) {
        let mut current = first;
        loop {
            let (cycle, files) = {
                let state = self.lock();
                (state.started, state.files.clone())
            };

            tracing::debug!("Starting refresh cycle {} over {} files", cycle, files.len());
            let outcome = self.cache.refresh(&files).await;

            let follow_up = {
                let mut state = self.lock();
                match state.owed.take() {
                    Some(next) => {
                        state.started += 1;
                        Some(next)
                    }
                    None => {
                        state.phase = Phase::Idle;
                        None
                    }
                }
            };
            self.completed.send_replace(cycle);
            current.send_replace(Some(outcome));

            match follow_up {
                Some(next) => {
                    tracing::debug!("Refresh requested during cycle {}, running one more", cycle);
                    current = next;
                }
                None => return,
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
