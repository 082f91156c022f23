//! Changes list: diff cache, refresh coordinator and filtered view wired to
//! a presentation layer
//!
//! Upstream file-list changes go through the coordinator and recompute the
//! view once the cache settles. Filter edits recompute immediately against
//! whatever snapshot the cache currently holds.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::{DiffCache, RefreshOutcome};
use crate::config::ViewConfig;
use crate::coordinator::RefreshCoordinator;
use crate::core::{include_all_state, ChangesSummary, FileEntry, IncludeAllState};
use crate::source::{DiffSource, ModificationTimeSource};
use crate::view::{FilterState, FilteredView, ViewUpdate};

/// Presentation layer callbacks. The listener owns the selection.
pub trait ChangesListener: Send + Sync {
    /// Ids of the files the user currently has selected
    fn selected_file_ids(&self) -> Vec<String>;

    /// The visible list or its order changed
    fn on_filtered_set_changed(&self, files: &[FileEntry]);

    /// The selection must be replaced with `files`
    fn on_selection_corrected(&self, files: &[FileEntry]);
}

pub struct ChangesList {
    coordinator: RefreshCoordinator,
    view: Mutex<FilteredView>,
    listener: Arc<dyn ChangesListener>,
}

impl ChangesList {
    pub fn new(
        mtimes: Arc<dyn ModificationTimeSource>,
        diffs: Arc<dyn DiffSource>,
        listener: Arc<dyn ChangesListener>,
    ) -> Self {
        let cache = Arc::new(DiffCache::new(mtimes, diffs));
        Self {
            coordinator: RefreshCoordinator::new(cache),
            view: Mutex::new(FilteredView::new()),
            listener,
        }
    }

    /// Like [`ChangesList::new`] with the initial filters from `config`.
    pub fn with_config(
        mtimes: Arc<dyn ModificationTimeSource>,
        diffs: Arc<dyn DiffSource>,
        listener: Arc<dyn ChangesListener>,
        config: &ViewConfig,
    ) -> Self {
        let list = Self::new(mtimes, diffs, listener);
        list.view().set_filters(&config.path_filter, &config.content_filter);
        list
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn cache(&self) -> &Arc<DiffCache> {
        self.coordinator.cache()
    }

    /// Upstream file list as last reported.
    pub fn files(&self) -> Arc<Vec<FileEntry>> {
        self.coordinator.files()
    }

    pub fn filtered_files(&self) -> Vec<FileEntry> {
        self.view().filtered().to_vec()
    }

    pub fn filters(&self) -> FilterState {
        self.view().filters().clone()
    }

    /// A new working-directory snapshot arrived.
    ///
    /// Refreshes the diff cache (joining a refresh already in flight) and
    /// recomputes the view once it settles. An identical list is ignored.
    pub async fn notify_upstream_files_changed(&self, files: Vec<FileEntry>) -> RefreshOutcome {
        if *self.coordinator.files() == files {
            tracing::debug!("File list unchanged, skipping refresh");
            return RefreshOutcome::default();
        }

        let repointed = self.view().on_upstream_change(&files);
        if let Some(visible) = repointed {
            self.listener.on_filtered_set_changed(&visible);
        }

        self.coordinator.set_files(files);
        let outcome = self.coordinator.request_refresh().await;
        self.recompute();
        outcome
    }

    /// Refresh against the current file list even if it did not change,
    /// e.g. after an edit that left `git status` output identical.
    pub async fn refresh(&self) -> RefreshOutcome {
        let outcome = self.coordinator.request_refresh().await;
        self.recompute();
        outcome
    }

    /// Change the filter text. Does not wait for any refresh in flight.
    pub fn set_filters(&self, path: &str, content: &str) {
        let changed = self.view().set_filters(path, content);
        if changed {
            tracing::debug!("Filters changed: path={:?} content={:?}", path, content);
            self.recompute();
        }
    }

    /// Rebuild the view against the current snapshot and notify the listener.
    pub fn recompute(&self) -> ViewUpdate {
        let files = self.coordinator.files();
        let snapshot = self.cache().snapshot();
        let selected = self.listener.selected_file_ids();

        let update = self.view().recompute(&files, &snapshot, &selected);
        self.emit(&update);
        update
    }

    /// Select the first visible file, as when pressing down from the filter box.
    pub fn select_first(&self) -> Option<FileEntry> {
        let first = self.view().first().cloned();
        self.select_edge(first)
    }

    /// Select the last visible file, as when pressing up from the filter box.
    pub fn select_last(&self) -> Option<FileEntry> {
        let last = self.view().last().cloned();
        self.select_edge(last)
    }

    /// Visible row indices of the listener's selection.
    pub fn selected_rows(&self) -> Vec<usize> {
        let selected = self.listener.selected_file_ids();
        self.view().selected_rows(&selected)
    }

    pub fn include_all_state(&self, rebase_in_progress: bool) -> IncludeAllState {
        include_all_state(&self.coordinator.files(), rebase_in_progress)
    }

    pub fn summary(&self) -> ChangesSummary {
        let visible = self.view().filtered().len();
        ChangesSummary::from_files(&self.coordinator.files(), visible)
    }

    fn select_edge(&self, file: Option<FileEntry>) -> Option<FileEntry> {
        let file = file?;
        self.listener.on_selection_corrected(std::slice::from_ref(&file));
        Some(file)
    }

    fn emit(&self, update: &ViewUpdate) {
        if let Some(filtered) = &update.filtered {
            self.listener.on_filtered_set_changed(filtered);
        }
        if let Some(selection) = &update.selection {
            self.listener.on_selection_corrected(selection);
        }
    }

    fn view(&self) -> MutexGuard<'_, FilteredView> {
        match self.view.lock() {
            Ok(view) => view,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
