use serde::{Deserialize, Serialize};

/// Kind of change git reports for a working-directory file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatusKind {
    New,
    Modified,
    Deleted,
    Renamed { old_path: String },
    Copied { old_path: String },
    Untracked,
    Conflicted,
}

impl FileStatusKind {
    /// Single-character marker used by the compact output.
    pub fn symbol(&self) -> &'static str {
        match self {
            FileStatusKind::New => "A",
            FileStatusKind::Modified => "M",
            FileStatusKind::Deleted => "D",
            FileStatusKind::Renamed { .. } => "R",
            FileStatusKind::Copied { .. } => "C",
            FileStatusKind::Untracked => "?",
            FileStatusKind::Conflicted => "U",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileStatusKind::New => "new",
            FileStatusKind::Modified => "modified",
            FileStatusKind::Deleted => "deleted",
            FileStatusKind::Renamed { .. } => "renamed",
            FileStatusKind::Copied { .. } => "copied",
            FileStatusKind::Untracked => "untracked",
            FileStatusKind::Conflicted => "conflicted",
        }
    }

    pub fn is_untracked(&self) -> bool {
        matches!(self, FileStatusKind::Untracked)
    }
}

/// How much of a file's change is included in the next commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionType {
    #[default]
    None,
    All,
    Partial,
}

/// Tri-state value of the "include all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeAllState {
    On,
    Off,
    Mixed,
}

/// One changed file in a working-directory snapshot.
///
/// Entries are immutable once produced by a status scan; a new scan produces
/// new entries even for unchanged paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub path: String,
    pub status: FileStatusKind,
    pub selection: SelectionType,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, status: FileStatusKind) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            path,
            status,
            selection: SelectionType::None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_selection(mut self, selection: SelectionType) -> Self {
        self.selection = selection;
        self
    }
}

/// Compute the "include all" checkbox value for a list of files.
///
/// While a rebase is stopped on conflicts untracked files are skipped by the
/// rebase, so the value follows tracked/untracked composition instead of the
/// per-file selections.
pub fn include_all_state(files: &[FileEntry], rebase_in_progress: bool) -> IncludeAllState {
    if rebase_in_progress {
        if files.is_empty() || files.iter().all(|f| f.status.is_untracked()) {
            return IncludeAllState::Off;
        }
        if files.iter().all(|f| !f.status.is_untracked()) {
            return IncludeAllState::On;
        }
        return IncludeAllState::Mixed;
    }

    if files.iter().all(|f| f.selection == SelectionType::All) && !files.is_empty() {
        IncludeAllState::On
    } else if files.iter().all(|f| f.selection == SelectionType::None) {
        IncludeAllState::Off
    } else {
        IncludeAllState::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_defaults_id_to_path() {
        let entry = FileEntry::new("src/main.rs", FileStatusKind::Modified);

        assert_eq!(entry.id, "src/main.rs");
        assert_eq!(entry.path, "src/main.rs");
        assert_eq!(entry.selection, SelectionType::None);
    }

    #[test]
    fn test_file_entry_builders() {
        let entry = FileEntry::new("a.txt", FileStatusKind::New)
            .with_id("id-1")
            .with_selection(SelectionType::Partial);

        assert_eq!(entry.id, "id-1");
        assert_eq!(entry.selection, SelectionType::Partial);
    }

    #[test]
    fn test_include_all_follows_selections() {
        let all = vec![
            FileEntry::new("a", FileStatusKind::Modified).with_selection(SelectionType::All),
            FileEntry::new("b", FileStatusKind::Modified).with_selection(SelectionType::All),
        ];
        assert_eq!(include_all_state(&all, false), IncludeAllState::On);

        let none = vec![FileEntry::new("a", FileStatusKind::Modified)];
        assert_eq!(include_all_state(&none, false), IncludeAllState::Off);

        let mixed = vec![
            FileEntry::new("a", FileStatusKind::Modified).with_selection(SelectionType::All),
            FileEntry::new("b", FileStatusKind::Modified),
        ];
        assert_eq!(include_all_state(&mixed, false), IncludeAllState::Mixed);

        let partial = vec![FileEntry::new("a", FileStatusKind::Modified).with_selection(SelectionType::Partial)];
        assert_eq!(include_all_state(&partial, false), IncludeAllState::Mixed);

        assert_eq!(include_all_state(&[], false), IncludeAllState::Off);
    }

    #[test]
    fn test_include_all_during_rebase() {
        assert_eq!(include_all_state(&[], true), IncludeAllState::Off);

        let untracked = vec![FileEntry::new("a", FileStatusKind::Untracked)];
        assert_eq!(include_all_state(&untracked, true), IncludeAllState::Off);

        let tracked = vec![FileEntry::new("a", FileStatusKind::Modified)];
        assert_eq!(include_all_state(&tracked, true), IncludeAllState::On);

        let both = vec![
            FileEntry::new("a", FileStatusKind::Modified),
            FileEntry::new("b", FileStatusKind::Untracked),
        ];
        assert_eq!(include_all_state(&both, true), IncludeAllState::Mixed);
    }

    #[test]
    fn test_status_symbols() {
        assert_eq!(FileStatusKind::Untracked.symbol(), "?");
        assert_eq!(FileStatusKind::Renamed { old_path: "x".to_string() }.symbol(), "R");
        assert_eq!(FileStatusKind::Conflicted.label(), "conflicted");
    }
}
