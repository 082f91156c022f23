pub mod cache;
pub mod changes;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod diff;
pub mod filter;
pub mod git;
pub mod source;
pub mod view;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use cache::{CacheEntry, CacheSnapshot, DiffCache, RefreshOutcome};
pub use changes::{ChangesList, ChangesListener};
pub use config::ChangeViewConfig;
pub use coordinator::{Phase, RefreshCoordinator};
pub use crate::core::*;
pub use diff::{DiffFormatter, DiffLimits, FileDiff};
pub use filter::PathFilter;
pub use git::{FsModificationTime, GitRepository};
pub use source::{DiffSource, ModificationTimeSource};
pub use view::{FilterState, FilteredView, ViewUpdate};
pub use watcher::RepositoryWatcher;
