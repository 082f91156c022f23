use super::model::{DiffStats, FileDiff};

/// Formats cached diffs into text for the non-interactive output modes
pub struct DiffFormatter;

impl DiffFormatter {
    /// Format a diff as unified text, at most `max_lines` body lines.
    pub fn format_unified(diff: &FileDiff, path: &str, max_lines: usize) -> String {
        let mut output = Vec::new();
        output.push(format!("--- a/{}", path));
        output.push(format!("+++ b/{}", path));

        match diff {
            FileDiff::Text { hunks } | FileDiff::LargeText { hunks } => {
                let mut body = Vec::new();
                for hunk in hunks {
                    body.push(hunk.header.clone());
                    for line in &hunk.lines {
                        body.push(format!("{}{}", line.prefix(), line.text));
                    }
                }
                let total = body.len();
                output.extend(body.into_iter().take(max_lines));
                if total > max_lines {
                    output.push(format!("... {} more lines", total - max_lines));
                }
            }
            FileDiff::Binary => output.push("Binary file changed".to_string()),
            FileDiff::Image => output.push("Image changed".to_string()),
            FileDiff::Unrenderable { size } => {
                output.push(format!("Diff too large to display ({} bytes)", size));
            }
        }

        output.join("\n")
    }

    /// Format diff statistics as a summary
    pub fn format_stats(stats: &DiffStats) -> String {
        if stats.total_changes() == 0 {
            return "No changes".to_string();
        }

        let mut parts = Vec::new();

        if stats.lines_added > 0 {
            parts.push(format!("{} insertion{}",
                stats.lines_added,
                if stats.lines_added == 1 { "" } else { "s" }
            ));
        }

        if stats.lines_removed > 0 {
            parts.push(format!("{} deletion{}",
                stats.lines_removed,
                if stats.lines_removed == 1 { "" } else { "s" }
            ));
        }

        if stats.hunks > 0 {
            parts.push(format!("{} hunk{}",
                stats.hunks,
                if stats.hunks == 1 { "" } else { "s" }
            ));
        }

        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::generator::DiffGenerator;

    fn create_test_diff() -> FileDiff {
        FileDiff::Text {
            hunks: DiffGenerator::default().generate("line1\nline2\nline3\n", "line1\nmodified\nline3\n"),
        }
    }

    #[test]
    fn test_format_unified() {
        let formatted = DiffFormatter::format_unified(&create_test_diff(), "file.txt", 100);

        assert!(formatted.contains("--- a/file.txt"));
        assert!(formatted.contains("+++ b/file.txt"));
        assert!(formatted.contains("-line2"));
        assert!(formatted.contains("+modified"));
    }

    #[test]
    fn test_format_unified_truncates() {
        let formatted = DiffFormatter::format_unified(&create_test_diff(), "file.txt", 2);

        assert!(formatted.contains("... 3 more lines"));
    }

    #[test]
    fn test_format_binary() {
        let formatted = DiffFormatter::format_unified(&FileDiff::Binary, "logo.bin", 10);
        assert!(formatted.ends_with("Binary file changed"));
    }

    #[test]
    fn test_format_stats() {
        let stats = DiffFormatter::format_stats(&create_test_diff().stats());

        assert!(stats.contains("1 insertion"));
        assert!(stats.contains("1 deletion"));
        assert!(stats.contains("1 hunk"));
        assert_eq!(DiffFormatter::format_stats(&DiffStats::default()), "No changes");
    }
}
