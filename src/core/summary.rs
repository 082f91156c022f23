//! Change summary for the presentation layer
//!
//! Counts and human-readable descriptions of the working-directory change
//! list, plus a serializable report used by the JSON output mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::files::{FileEntry, FileStatusKind, SelectionType};

/// Counts describing the current change list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesSummary {
    /// Files with changes in the working directory
    pub total: usize,
    /// Files with any lines included in the next commit
    pub selected_for_commit: usize,
    /// Files surviving the current filters
    pub visible: usize,
    pub untracked: usize,
    pub conflicted: usize,
}

impl ChangesSummary {
    pub fn from_files(files: &[FileEntry], visible: usize) -> Self {
        let mut summary = Self {
            total: files.len(),
            visible,
            ..Self::default()
        };

        for file in files {
            if file.selection != SelectionType::None {
                summary.selected_for_commit += 1;
            }
            match file.status {
                FileStatusKind::Untracked => summary.untracked += 1,
                FileStatusKind::Conflicted => summary.conflicted += 1,
                _ => {}
            }
        }

        summary
    }

    /// "3 changed files"
    pub fn describe(&self) -> String {
        format!("{} changed {}", self.total, plural_files(self.total))
    }

    /// "2 changed files selected"
    pub fn describe_selected(&self) -> String {
        format!(
            "{} changed {} selected",
            self.selected_for_commit,
            plural_files(self.selected_for_commit)
        )
    }

    pub fn is_filtered(&self) -> bool {
        self.visible != self.total
    }
}

fn plural_files(count: usize) -> &'static str {
    if count == 1 {
        "file"
    } else {
        "files"
    }
}

/// Snapshot of the filtered change list written by the JSON output mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesReport {
    pub generated_at: DateTime<Utc>,
    pub path_filter: String,
    pub content_filter: String,
    pub summary: ChangesSummary,
    pub files: Vec<FileEntry>,
}

impl ChangesReport {
    pub fn new(
        path_filter: impl Into<String>,
        content_filter: impl Into<String>,
        summary: ChangesSummary,
        files: Vec<FileEntry>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            path_filter: path_filter.into(),
            content_filter: content_filter.into(),
            summary,
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let files = vec![
            FileEntry::new("a.rs", FileStatusKind::Modified).with_selection(SelectionType::All),
            FileEntry::new("b.rs", FileStatusKind::Untracked),
            FileEntry::new("c.rs", FileStatusKind::Conflicted).with_selection(SelectionType::Partial),
        ];

        let summary = ChangesSummary::from_files(&files, 2);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.selected_for_commit, 2);
        assert_eq!(summary.untracked, 1);
        assert_eq!(summary.conflicted, 1);
        assert!(summary.is_filtered());
    }

    #[test]
    fn test_descriptions_pluralize() {
        let one = ChangesSummary::from_files(
            &[FileEntry::new("a.rs", FileStatusKind::Modified).with_selection(SelectionType::All)],
            1,
        );
        assert_eq!(one.describe(), "1 changed file");
        assert_eq!(one.describe_selected(), "1 changed file selected");

        let none = ChangesSummary::from_files(&[], 0);
        assert_eq!(none.describe(), "0 changed files");
        assert_eq!(none.describe_selected(), "0 changed files selected");
    }

    #[test]
    fn test_report_serializes() {
        let files = vec![FileEntry::new("src/a.ts", FileStatusKind::New)];
        let summary = ChangesSummary::from_files(&files, 1);
        let report = ChangesReport::new("src/", "", summary, files);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"path_filter\":\"src/\""));
        assert!(json.contains("src/a.ts"));
    }
}
