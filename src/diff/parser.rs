use super::model::{DiffHunk, DiffLine, DiffLimits, FileDiff};

/// Parse the output of `git diff` for a single path.
///
/// File headers (`diff --git`, `index`, `---`, `+++`, mode lines) are
/// skipped. A "Binary files ... differ" or "GIT binary patch" marker turns the
/// whole result into [`FileDiff::Binary`].
pub fn parse_unified(raw: &str, limits: &DiffLimits) -> FileDiff {
    if raw.len() > limits.max_diff_bytes {
        return FileDiff::Unrenderable { size: raw.len() };
    }

    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut current: Option<DiffHunk> = None;

    for line in raw.lines() {
        if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
            return FileDiff::Binary;
        }

        if line.starts_with("@@") {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            current = parse_hunk_header(line);
            continue;
        }

        // Everything before the first hunk is header noise
        let Some(hunk) = current.as_mut() else {
            continue;
        };

        if let Some(text) = line.strip_prefix('+') {
            hunk.lines.push(DiffLine::added(text));
        } else if let Some(text) = line.strip_prefix('-') {
            hunk.lines.push(DiffLine::removed(text));
        } else if let Some(text) = line.strip_prefix(' ') {
            hunk.lines.push(DiffLine::context(text));
        } else if line.is_empty() {
            hunk.lines.push(DiffLine::context(""));
        }
        // Skip "\ No newline at end of file"
    }

    if let Some(hunk) = current {
        hunks.push(hunk);
    }

    limits.classify(raw.len(), hunks)
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()"
fn parse_hunk_header(line: &str) -> Option<DiffHunk> {
    let after_first = line.strip_prefix("@@ ")?;
    let end_idx = after_first.find(" @@")?;
    let range_str = &after_first[..end_idx];

    let mut parts = range_str.split_whitespace();
    let (old_start, old_len) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_len) = parse_range(parts.next()?.strip_prefix('+')?)?;

    Some(DiffHunk {
        header: line.to_string(),
        old_start,
        old_len,
        new_start,
        new_len,
        lines: Vec::new(),
    })
}

/// Parse "start,count" or just "start" (count defaults to 1)
fn parse_range(s: &str) -> Option<(usize, usize)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::DiffLineType;

    #[test]
    fn test_parse_simple_diff() {
        let raw = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@ fn main()
 fn main() {
+    println!("hello");
     let x = 1;
 }
"#;
        let diff = parse_unified(raw, &DiffLimits::default());

        let hunks = diff.hunks();
        assert!(matches!(diff, FileDiff::Text { .. }));
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines.len(), 4);
        assert_eq!(hunks[0].lines[1].kind, DiffLineType::Added);
        assert_eq!(hunks[0].lines[1].text, "    println!(\"hello\");");
        assert_eq!(hunks[0].header, "@@ -1,3 +1,4 @@ fn main()");
    }

    #[test]
    fn test_header_lines_are_not_content() {
        let raw = "--- a/x.txt\n+++ b/x.txt\n@@ -1 +1 @@\n-old\n+new\n";
        let diff = parse_unified(raw, &DiffLimits::default());

        let stats = diff.stats();
        assert_eq!(stats.lines_added, 1);
        assert_eq!(stats.lines_removed, 1);
        assert!(!diff.has_change_containing("x.txt"));
    }

    #[test]
    fn test_multiple_hunks_and_no_newline_marker() {
        let raw = "@@ -1,2 +1,2 @@\n-a\n+b\n c\n@@ -10 +10 @@\n-d\n\\ No newline at end of file\n+e\n";
        let diff = parse_unified(raw, &DiffLimits::default());

        let hunks = diff.hunks();
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[1].old_start, 10);
        assert_eq!(hunks[1].old_len, 1);
        assert_eq!(hunks[1].lines.len(), 2);
    }

    #[test]
    fn test_binary_marker() {
        let raw = "diff --git a/logo.bin b/logo.bin\nindex 1..2 100644\nBinary files a/logo.bin and b/logo.bin differ\n";
        assert_eq!(parse_unified(raw, &DiffLimits::default()), FileDiff::Binary);
    }

    #[test]
    fn test_oversized_output_is_unrenderable() {
        let limits = DiffLimits { large_diff_bytes: 4, max_diff_bytes: 8 };
        let raw = "@@ -1 +1 @@\n-a\n+b\n";

        assert_eq!(parse_unified(raw, &limits), FileDiff::Unrenderable { size: raw.len() });
    }

    #[test]
    fn test_parse_hunk_header() {
        let hunk = parse_hunk_header("@@ -10,4 +10,15 @@ impl Foo").unwrap();
        assert_eq!(hunk.old_start, 10);
        assert_eq!(hunk.old_len, 4);
        assert_eq!(hunk.new_start, 10);
        assert_eq!(hunk.new_len, 15);

        assert!(parse_hunk_header("@@ garbage").is_none());
    }
}
