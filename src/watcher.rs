use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;

use crate::{AppEvent, PathFilter};

/// Watches a repository and sends one `WorkingDirectoryChanged` per burst
/// of relevant filesystem events.
pub struct RepositoryWatcher {
    _watcher: RecommendedWatcher,
}

impl RepositoryWatcher {
    pub fn new<P: AsRef<Path>>(
        root: P,
        debounce: Duration,
        event_tx: UnboundedSender<AppEvent>,
    ) -> Result<Self> {
        let root = root.as_ref();
        let filter = PathFilter::new(root)?;

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();

        let mut watcher = notify::recommended_watcher(tx)
            .context("Failed to create file system watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .context("Failed to start watching directory")?;

        thread::spawn(move || {
            while let Ok(first) = rx.recv() {
                let paths = collect_burst(&rx, first, debounce, &filter);
                if paths.is_empty() {
                    continue;
                }

                tracing::debug!("{} paths changed", paths.len());
                if event_tx.send(AppEvent::working_directory_changed(paths)).is_err() {
                    break; // Receiver dropped, exit thread
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

/// Drain events until `quiet` passes without one, keeping the distinct
/// paths the filter accepts.
fn collect_burst(
    rx: &Receiver<notify::Result<Event>>,
    first: notify::Result<Event>,
    quiet: Duration,
    filter: &PathFilter,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut next = Some(first);

    while let Some(result) = next.take() {
        match result {
            Ok(event) => {
                for path in event.paths {
                    if filter.should_refresh(&path) && !paths.contains(&path) {
                        paths.push(path);
                    }
                }
            }
            Err(err) => {
                tracing::error!("File watcher error: {}", err);
            }
        }

        match rx.recv_timeout(quiet) {
            Ok(result) => next = Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
    }

    paths
}
