use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use super::model::{DiffHunk, DiffLine};

/// Available diff algorithms for in-process diffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithmType {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl DiffAlgorithmType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Myers => "Myers",
            Self::Patience => "Patience",
            Self::Lcs => "LCS",
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            Self::Myers => Algorithm::Myers,
            Self::Patience => Algorithm::Patience,
            Self::Lcs => Algorithm::Lcs,
        }
    }
}

impl std::fmt::Display for DiffAlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Generates hunks for content that git has no index entry for
/// (untracked and newly created files).
#[derive(Debug, Clone)]
pub struct DiffGenerator {
    algorithm: DiffAlgorithmType,
    context_lines: usize,
}

impl DiffGenerator {
    pub fn new(algorithm: DiffAlgorithmType) -> Self {
        Self { algorithm, context_lines: 3 }
    }

    pub fn context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    /// Diff `old` against `new` line by line.
    pub fn generate(&self, old: &str, new: &str) -> Vec<DiffHunk> {
        let diff = TextDiff::configure()
            .algorithm(self.algorithm.algorithm())
            .diff_lines(old, new);

        let mut hunks = Vec::new();
        for group in diff.grouped_ops(self.context_lines) {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            let old_start = first.old_range().start;
            let new_start = first.new_range().start;
            let old_len = last.old_range().end - old_start;
            let new_len = last.new_range().end - new_start;

            let mut lines = Vec::new();
            for op in &group {
                for change in diff.iter_changes(op) {
                    let text = change.value().trim_end_matches(['\n', '\r']);
                    lines.push(match change.tag() {
                        ChangeTag::Equal => DiffLine::context(text),
                        ChangeTag::Insert => DiffLine::added(text),
                        ChangeTag::Delete => DiffLine::removed(text),
                    });
                }
            }

            // git numbers an empty side from 0, a non-empty one from 1
            let old_header = if old_len == 0 { old_start } else { old_start + 1 };
            let new_header = if new_len == 0 { new_start } else { new_start + 1 };

            hunks.push(DiffHunk {
                header: format!("@@ -{},{} +{},{} @@", old_header, old_len, new_header, new_len),
                old_start: old_header,
                old_len,
                new_start: new_header,
                new_len,
                lines,
            });
        }

        hunks
    }
}

impl Default for DiffGenerator {
    fn default() -> Self {
        Self::new(DiffAlgorithmType::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::DiffLineType;

    #[test]
    fn test_myers_diff() {
        let hunks = DiffGenerator::new(DiffAlgorithmType::Myers).generate("a\nb\nc\n", "a\nx\nc\n");

        assert_eq!(hunks.len(), 1);
        let kinds: Vec<_> = hunks[0].lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![DiffLineType::Context, DiffLineType::Removed, DiffLineType::Added, DiffLineType::Context]
        );
        assert_eq!(hunks[0].lines[2].text, "x");
    }

    #[test]
    fn test_new_file_is_all_additions() {
        let hunks = DiffGenerator::default().generate("", "one\ntwo\n");

        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].header, "@@ -0,0 +1,2 @@");
        assert!(hunks[0].lines.iter().all(|l| l.kind == DiffLineType::Added));
    }

    #[test]
    fn test_identical_content_has_no_hunks() {
        assert!(DiffGenerator::default().generate("same\n", "same\n").is_empty());
    }

    #[test]
    fn test_patience_name() {
        let generator = DiffGenerator::new(DiffAlgorithmType::Patience).context_lines(5);
        assert_eq!(generator.algorithm_name(), "Patience");
    }
}
