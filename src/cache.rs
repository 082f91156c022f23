//! Diff cache keyed by path and validated by modification time
//!
//! A refresh stats every file of the current change list, reuses the cached
//! diff of any file whose mtime is unchanged and recomputes the rest. The
//! result is published as a new immutable snapshot; readers holding the
//! previous snapshot keep a consistent view.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use futures::future::join_all;

use crate::core::FileEntry;
use crate::diff::FileDiff;
use crate::source::{DiffSource, ModificationTimeSource};

/// Cached diff of one path together with the mtime it was computed at
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub path: String,
    pub modified: SystemTime,
    pub diff: Arc<FileDiff>,
}

pub type CacheSnapshot = HashMap<String, CacheEntry>;

/// What a refresh did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// The published snapshot differs from the previous one
    pub changed: bool,
    pub recomputed: usize,
    pub reused: usize,
    pub failed: usize,
}

impl RefreshOutcome {
    /// Combine the outcomes of consecutive cycles.
    pub fn merge(self, other: RefreshOutcome) -> RefreshOutcome {
        RefreshOutcome {
            changed: self.changed || other.changed,
            recomputed: self.recomputed + other.recomputed,
            reused: self.reused + other.reused,
            failed: self.failed + other.failed,
        }
    }
}

enum FileRefresh {
    Reused(CacheEntry),
    Recomputed(CacheEntry),
    Failed,
}

struct Published {
    generation: u64,
    entries: Arc<CacheSnapshot>,
}

pub struct DiffCache {
    mtimes: Arc<dyn ModificationTimeSource>,
    diffs: Arc<dyn DiffSource>,
    published: RwLock<Published>,
    generations: AtomicU64,
}

impl DiffCache {
    pub fn new(mtimes: Arc<dyn ModificationTimeSource>, diffs: Arc<dyn DiffSource>) -> Self {
        Self {
            mtimes,
            diffs,
            published: RwLock::new(Published {
                generation: 0,
                entries: Arc::new(CacheSnapshot::new()),
            }),
            generations: AtomicU64::new(0),
        }
    }

    /// The current snapshot. Never observes a half-applied refresh.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        match self.published.read() {
            Ok(published) => published.entries.clone(),
            Err(poisoned) => poisoned.into_inner().entries.clone(),
        }
    }

    pub fn get(&self, path: &str) -> Option<CacheEntry> {
        self.snapshot().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Drop every entry; the next refresh recomputes all diffs.
    pub fn clear(&self) {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(generation, CacheSnapshot::new());
    }

    /// Bring the cache in line with `files`.
    ///
    /// Stats and diffs run concurrently for all files. A file whose stat or
    /// diff fails is left out of the new snapshot and retried next time.
    pub async fn refresh(&self, files: &[FileEntry]) -> RefreshOutcome {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.snapshot();

        let results = join_all(files.iter().map(|file| self.refresh_file(file, &previous))).await;

        let mut outcome = RefreshOutcome::default();
        let mut entries = CacheSnapshot::with_capacity(files.len());
        for result in results {
            match result {
                FileRefresh::Reused(entry) => {
                    outcome.reused += 1;
                    entries.insert(entry.path.clone(), entry);
                }
                FileRefresh::Recomputed(entry) => {
                    outcome.recomputed += 1;
                    entries.insert(entry.path.clone(), entry);
                }
                FileRefresh::Failed => outcome.failed += 1,
            }
        }

        let dropped = previous.keys().filter(|path| !entries.contains_key(*path)).count();
        outcome.changed = outcome.recomputed > 0 || dropped > 0;

        tracing::debug!(
            "Diff cache cycle {}: {} recomputed, {} reused, {} failed, {} dropped",
            generation,
            outcome.recomputed,
            outcome.reused,
            outcome.failed,
            dropped
        );

        if outcome.changed && !self.publish(generation, entries) {
            outcome.changed = false;
        }

        outcome
    }

    async fn refresh_file(&self, file: &FileEntry, previous: &CacheSnapshot) -> FileRefresh {
        // Stat before diffing so the recorded mtime is never newer than the
        // content the diff was computed from
        let modified = match self.mtimes.modified(file).await {
            Ok(modified) => modified,
            Err(err) => {
                tracing::debug!("Skipping {}: {:#}", file.path, err);
                return FileRefresh::Failed;
            }
        };

        if let Some(entry) = previous.get(&file.path) {
            if entry.modified == modified {
                return FileRefresh::Reused(entry.clone());
            }
        }

        match self.diffs.compute_diff(file).await {
            Ok(diff) => FileRefresh::Recomputed(CacheEntry {
                path: file.path.clone(),
                modified,
                diff: Arc::new(diff),
            }),
            Err(err) => {
                tracing::warn!("Failed to compute diff for {}: {:#}", file.path, err);
                FileRefresh::Failed
            }
        }
    }

    /// Swap in `entries` unless a later generation is already published.
    fn publish(&self, generation: u64, entries: CacheSnapshot) -> bool {
        let mut published = match self.published.write() {
            Ok(published) => published,
            Err(poisoned) => poisoned.into_inner(),
        };
        if published.generation > generation {
            tracing::debug!(
                "Discarding diff cache cycle {}, cycle {} already applied",
                generation,
                published.generation
            );
            return false;
        }
        published.generation = generation;
        published.entries = Arc::new(entries);
        true
    }
}
