//! Diff model, parsing and formatting module
//!
//! Cached diffs are structured as hunks of tagged lines so that content
//! filters can tell changed lines from context. Diffs come either from
//! parsing `git diff` output or from diffing file content in-process.

pub mod formatter;
pub mod generator;
pub mod model;
pub mod parser;

// Re-export the main types for easier use
pub use formatter::DiffFormatter;
pub use generator::{DiffAlgorithmType, DiffGenerator};
pub use model::{DiffHunk, DiffLimits, DiffLine, DiffLineType, DiffStats, FileDiff};
pub use parser::parse_unified;

/// Diff of a file that has no baseline, as every line added
pub fn new_file_diff(content: &str, generator: &DiffGenerator, limits: &DiffLimits) -> FileDiff {
    if content.len() > limits.max_diff_bytes {
        return FileDiff::Unrenderable { size: content.len() };
    }
    limits.classify(content.len(), generator.generate("", content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_diff() {
        let diff = new_file_diff("hello\nworld\n", &DiffGenerator::default(), &DiffLimits::default());

        assert!(diff.has_change_containing("world"));
        assert_eq!(diff.stats().lines_added, 2);
    }

    #[test]
    fn test_new_file_diff_respects_limits() {
        let limits = DiffLimits { large_diff_bytes: 2, max_diff_bytes: 4 };
        let diff = new_file_diff("hello\n", &DiffGenerator::default(), &limits);

        assert_eq!(diff, FileDiff::Unrenderable { size: 6 });
    }
}
