use serde::{Deserialize, Serialize};

/// Tag of a single line inside a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLineType {
    Context,
    Added,
    Removed,
}

/// A single line of a hunk, without its `+`/`-`/` ` prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffLineType,
    pub text: String,
}

impl DiffLine {
    pub fn context(text: impl Into<String>) -> Self {
        Self { kind: DiffLineType::Context, text: text.into() }
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self { kind: DiffLineType::Added, text: text.into() }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self { kind: DiffLineType::Removed, text: text.into() }
    }

    pub fn is_change(&self) -> bool {
        self.kind != DiffLineType::Context
    }

    pub fn prefix(&self) -> char {
        match self.kind {
            DiffLineType::Context => ' ',
            DiffLineType::Added => '+',
            DiffLineType::Removed => '-',
        }
    }
}

/// A single hunk (contiguous block of changes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    /// Raw `@@ ... @@` header line
    pub header: String,
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine>,
}

/// Statistics about the diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub hunks: usize,
}

impl DiffStats {
    pub fn total_changes(&self) -> usize {
        self.lines_added + self.lines_removed
    }

    pub fn net_change(&self) -> isize {
        self.lines_added as isize - self.lines_removed as isize
    }
}

/// Diff of one working-directory file against the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileDiff {
    Text { hunks: Vec<DiffHunk> },
    /// Textual but big enough that the presentation layer should ask before
    /// rendering it. Still searchable.
    LargeText { hunks: Vec<DiffHunk> },
    Binary,
    Image,
    /// Raw diff output exceeded the hard limit and was not parsed.
    Unrenderable { size: usize },
}

impl FileDiff {
    pub fn is_textual(&self) -> bool {
        matches!(self, FileDiff::Text { .. } | FileDiff::LargeText { .. })
    }

    pub fn hunks(&self) -> &[DiffHunk] {
        match self {
            FileDiff::Text { hunks } | FileDiff::LargeText { hunks } => hunks,
            _ => &[],
        }
    }

    /// Whether any added or removed line contains `needle`.
    ///
    /// Non-textual diffs never match.
    pub fn has_change_containing(&self, needle: &str) -> bool {
        self.hunks()
            .iter()
            .flat_map(|hunk| hunk.lines.iter())
            .any(|line| line.is_change() && line.text.contains(needle))
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats { hunks: self.hunks().len(), ..DiffStats::default() };
        for line in self.hunks().iter().flat_map(|hunk| hunk.lines.iter()) {
            match line.kind {
                DiffLineType::Added => stats.lines_added += 1,
                DiffLineType::Removed => stats.lines_removed += 1,
                DiffLineType::Context => {}
            }
        }
        stats
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FileDiff::Text { .. } => "text",
            FileDiff::LargeText { .. } => "large-text",
            FileDiff::Binary => "binary",
            FileDiff::Image => "image",
            FileDiff::Unrenderable { .. } => "unrenderable",
        }
    }
}

/// Size thresholds used to classify raw diff output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLimits {
    /// Above this many bytes a textual diff becomes `LargeText`
    pub large_diff_bytes: usize,
    /// Above this many bytes the diff is not parsed at all
    pub max_diff_bytes: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            large_diff_bytes: 1024 * 1024,
            max_diff_bytes: 5 * 1024 * 1024,
        }
    }
}

impl DiffLimits {
    /// Wrap parsed hunks in the variant matching the raw output size.
    pub fn classify(&self, raw_len: usize, hunks: Vec<DiffHunk>) -> FileDiff {
        if raw_len > self.max_diff_bytes {
            FileDiff::Unrenderable { size: raw_len }
        } else if raw_len > self.large_diff_bytes {
            FileDiff::LargeText { hunks }
        } else {
            FileDiff::Text { hunks }
        }
    }
}
