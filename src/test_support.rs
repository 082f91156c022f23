//! In-memory collaborators shared by the unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::core::{FileEntry, FileStatusKind};
use crate::diff::{DiffHunk, DiffLine, FileDiff};
use crate::source::{DiffSource, ModificationTimeSource};

pub fn mtime(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn modified(path: &str) -> FileEntry {
    FileEntry::new(path, FileStatusKind::Modified)
}

pub fn text_diff(added: &[&str]) -> FileDiff {
    FileDiff::Text {
        hunks: vec![DiffHunk {
            header: "@@ -1,1 +1,2 @@".to_string(),
            old_start: 1,
            old_len: 1,
            new_start: 1,
            new_len: 1 + added.len(),
            lines: std::iter::once(DiffLine::context("unchanged context"))
                .chain(added.iter().map(|text| DiffLine::added(*text)))
                .collect(),
        }],
    }
}

/// Fake filesystem: mtimes per path, missing paths fail to stat
#[derive(Default)]
pub struct FakeMtimes {
    mtimes: Mutex<HashMap<String, SystemTime>>,
    pub calls: AtomicUsize,
}

impl FakeMtimes {
    pub fn set(&self, path: &str, at: SystemTime) {
        self.mtimes.lock().unwrap().insert(path.to_string(), at);
    }

    pub fn remove(&self, path: &str) {
        self.mtimes.lock().unwrap().remove(path);
    }
}

#[async_trait]
impl ModificationTimeSource for FakeMtimes {
    async fn modified(&self, file: &FileEntry) -> Result<SystemTime> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.mtimes
            .lock()
            .unwrap()
            .get(&file.path)
            .copied()
            .ok_or_else(|| anyhow!("No such file: {}", file.path))
    }
}

/// Fake diff source with per-path content, failures and gates
#[derive(Default)]
pub struct FakeDiffs {
    diffs: Mutex<HashMap<String, FileDiff>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, std::sync::Arc<Semaphore>>>,
    counts: Mutex<HashMap<String, usize>>,
}

impl FakeDiffs {
    pub fn set(&self, path: &str, diff: FileDiff) {
        self.diffs.lock().unwrap().insert(path.to_string(), diff);
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    /// Make `compute_diff` for `path` wait until the returned semaphore
    /// receives a permit.
    pub fn gate(&self, path: &str) -> std::sync::Arc<Semaphore> {
        let gate = std::sync::Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(path.to_string(), gate.clone());
        gate
    }

    pub fn count(&self, path: &str) -> usize {
        self.counts.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DiffSource for FakeDiffs {
    async fn compute_diff(&self, file: &FileEntry) -> Result<FileDiff> {
        *self.counts.lock().unwrap().entry(file.path.clone()).or_insert(0) += 1;

        let gate = self.gates.lock().unwrap().get(&file.path).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await?;
        }

        if self.failing.lock().unwrap().contains(&file.path) {
            return Err(anyhow!("diff failed for {}", file.path));
        }

        Ok(self
            .diffs
            .lock()
            .unwrap()
            .get(&file.path)
            .cloned()
            .unwrap_or_else(|| text_diff(&[])))
    }
}
