//! Collaborators the diff cache consults
//!
//! Both are async because they hit the filesystem or spawn git. Failures are
//! per file; the cache treats them as "omit this file for now".

use std::time::SystemTime;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::FileEntry;
use crate::diff::FileDiff;

/// Reports the last-write time of a working-directory file.
#[async_trait]
pub trait ModificationTimeSource: Send + Sync {
    async fn modified(&self, file: &FileEntry) -> Result<SystemTime>;
}

/// Computes the working-directory-vs-index diff of a file.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn compute_diff(&self, file: &FileEntry) -> Result<FileDiff>;
}
