//! Filtered, order-preserving view over the change list
//!
//! The view is recomputed from scratch whenever the file list, the cache
//! snapshot or the filter text changes, then the caller's selection is
//! checked against the result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cache::CacheSnapshot;
use crate::core::FileEntry;

/// Path and diff-content substrings a file must contain to be shown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub path: String,
    pub content: String,
}

impl FilterState {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }

    pub fn is_active(&self) -> bool {
        !self.path.is_empty() || !self.content.is_empty()
    }

    /// Case-sensitive path match and, with a content filter, a match on an
    /// added or removed line of the cached diff. A file with no cached diff
    /// never matches a content filter.
    pub fn matches(&self, file: &FileEntry, cache: &CacheSnapshot) -> bool {
        if !file.path.contains(&self.path) {
            return false;
        }
        if self.content.is_empty() {
            return true;
        }
        match cache.get(&file.path) {
            Some(entry) => entry.diff.has_change_containing(&self.content),
            None => {
                tracing::debug!("No cached diff for {}, excluded from content filter", file.path);
                false
            }
        }
    }
}

/// Notifications produced by a recompute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    /// New visible list, when it differs from the previous one
    pub filtered: Option<Vec<FileEntry>>,
    /// Corrected selection the caller must adopt
    pub selection: Option<Vec<FileEntry>>,
}

impl ViewUpdate {
    pub fn is_empty(&self) -> bool {
        self.filtered.is_none() && self.selection.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    filters: FilterState,
    filtered: Vec<FileEntry>,
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with every file visible, as before any filter is applied.
    pub fn with_files(files: &[FileEntry]) -> Self {
        Self { filters: FilterState::default(), filtered: files.to_vec() }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filtered(&self) -> &[FileEntry] {
        &self.filtered
    }

    /// Store new filter text. Returns whether anything changed.
    pub fn set_filters(&mut self, path: &str, content: &str) -> bool {
        if self.filters.path == path && self.filters.content == content {
            return false;
        }
        self.filters = FilterState::new(path, content);
        true
    }

    /// Point the visible list at the entries of a new snapshot right away,
    /// dropping paths that disappeared. Full filtering waits for the cache.
    pub fn on_upstream_change(&mut self, files: &[FileEntry]) -> Option<Vec<FileEntry>> {
        let refreshed: Vec<FileEntry> = self
            .filtered
            .iter()
            .filter_map(|old| files.iter().find(|new| new.path == old.path).cloned())
            .collect();

        if refreshed == self.filtered {
            return None;
        }
        self.filtered = refreshed;
        Some(self.filtered.clone())
    }

    /// Rebuild the visible list and reconcile the selection against it.
    pub fn recompute(
        &mut self,
        files: &[FileEntry],
        cache: &CacheSnapshot,
        selected_ids: &[String],
    ) -> ViewUpdate {
        let filtered = filter_files(files, &self.filters, cache);

        let mut update = ViewUpdate::default();
        if filtered != self.filtered {
            update.filtered = Some(filtered.clone());
            self.filtered = filtered;
        }
        update.selection = reconcile_selection(&self.filtered, files, selected_ids);
        update
    }

    /// Row indices of the selected files that are currently visible.
    pub fn selected_rows(&self, selected_ids: &[String]) -> Vec<usize> {
        selected_ids
            .iter()
            .filter_map(|id| self.filtered.iter().position(|file| &file.id == id))
            .collect()
    }

    pub fn first(&self) -> Option<&FileEntry> {
        self.filtered.first()
    }

    pub fn last(&self) -> Option<&FileEntry> {
        self.filtered.last()
    }
}

/// Files of `files` passing `filters`, in their original order.
pub fn filter_files(files: &[FileEntry], filters: &FilterState, cache: &CacheSnapshot) -> Vec<FileEntry> {
    files
        .iter()
        .filter(|file| filters.matches(file, cache))
        .cloned()
        .collect()
}

/// Selection correction for a freshly filtered list, or `None` when the
/// current selection is already fully visible.
pub fn reconcile_selection(
    filtered: &[FileEntry],
    files: &[FileEntry],
    selected_ids: &[String],
) -> Option<Vec<FileEntry>> {
    let visible: HashSet<&str> = filtered.iter().map(|file| file.id.as_str()).collect();
    let surviving: Vec<&String> = selected_ids
        .iter()
        .filter(|id| visible.contains(id.as_str()))
        .collect();

    if surviving.is_empty() {
        // Nothing selected over nothing visible is already consistent
        if selected_ids.is_empty() && filtered.is_empty() {
            return None;
        }
        return Some(filtered.first().cloned().into_iter().collect());
    }

    if surviving.len() == selected_ids.len() {
        return None;
    }

    Some(
        surviving
            .into_iter()
            .filter_map(|id| files.iter().find(|file| &file.id == id).cloned())
            .collect(),
    )
}
