//! Default collaborators backed by the `git` command line
//!
//! `GitRepository` lists working-directory changes and computes per-file
//! diffs of the working tree against the index. Files git has no index
//! content for (untracked, newly added, conflicted) are diffed in-process
//! against empty content. `FsModificationTime` stats files under the
//! repository root.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use crate::config::CacheConfig;
use crate::core::{FileEntry, FileStatusKind, SelectionType};
use crate::diff::{new_file_diff, parse_unified, DiffGenerator, DiffLimits, FileDiff};
use crate::source::{DiffSource, ModificationTimeSource};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "ico", "webp", "bmp", "avif"];

/// How many leading bytes are checked for NUL when sniffing binary content
const BINARY_SNIFF_LEN: usize = 8000;

pub struct GitRepository {
    root: PathBuf,
    limits: DiffLimits,
    generator: DiffGenerator,
}

impl GitRepository {
    /// Open the repository containing `path`.
    pub async fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()
            .await
            .with_context(|| format!("Failed to run git in '{}'", path.display()))?;

        if !output.status.success() {
            bail!("Not a git repository: {}", path.display());
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self::at(root))
    }

    /// Use `root` as the repository root without asking git.
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            limits: DiffLimits::default(),
            generator: DiffGenerator::default(),
        }
    }

    pub fn with_config(mut self, config: &CacheConfig) -> Self {
        self.limits = config.diff_limits();
        self.generator = DiffGenerator::new(config.algorithm).context_lines(config.context_lines);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current working-directory changes in `git status` order.
    pub async fn status(&self) -> Result<Vec<FileEntry>> {
        let stdout = self
            .git(&["status", "--porcelain=v1", "-z", "--untracked-files=all"])
            .await
            .context("Failed to get working directory status")?;
        Ok(parse_porcelain_status(&stdout))
    }

    pub fn is_rebase_in_progress(&self) -> bool {
        let git_dir = self.root.join(".git");
        git_dir.join("rebase-merge").is_dir() || git_dir.join("rebase-apply").is_dir()
    }

    async fn git(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await
            .context("Failed to run git")?;

        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(output.stdout)
    }

    async fn diff_against_empty(&self, file: &FileEntry) -> Result<FileDiff> {
        let bytes = tokio::fs::read(self.root.join(&file.path))
            .await
            .with_context(|| format!("Failed to read {}", file.path))?;

        if bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0) {
            return Ok(FileDiff::Binary);
        }
        match String::from_utf8(bytes) {
            Ok(content) => Ok(new_file_diff(&content, &self.generator, &self.limits)),
            Err(_) => Ok(FileDiff::Binary),
        }
    }

    async fn diff_against_index(&self, file: &FileEntry) -> Result<FileDiff> {
        let stdout = self
            .git(&["diff", "--no-color", "--no-ext-diff", "--", &file.path])
            .await
            .with_context(|| format!("Failed to diff {}", file.path))?;
        Ok(parse_unified(&String::from_utf8_lossy(&stdout), &self.limits))
    }
}

#[async_trait]
impl DiffSource for GitRepository {
    async fn compute_diff(&self, file: &FileEntry) -> Result<FileDiff> {
        if is_image(&file.path) {
            return Ok(FileDiff::Image);
        }

        match file.status {
            FileStatusKind::Untracked | FileStatusKind::New | FileStatusKind::Conflicted => {
                self.diff_against_empty(file).await
            }
            _ => self.diff_against_index(file).await,
        }
    }
}

/// Stats working-directory files relative to a root.
pub struct FsModificationTime {
    root: PathBuf,
}

impl FsModificationTime {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ModificationTimeSource for FsModificationTime {
    async fn modified(&self, file: &FileEntry) -> Result<SystemTime> {
        // A deleted file has nothing on disk; its diff only changes when it
        // leaves the list, so a fixed timestamp keeps it cached
        if file.status == FileStatusKind::Deleted {
            return Ok(UNIX_EPOCH);
        }

        let metadata = tokio::fs::metadata(self.root.join(&file.path))
            .await
            .with_context(|| format!("Failed to stat {}", file.path))?;
        metadata
            .modified()
            .with_context(|| format!("No modification time for {}", file.path))
    }
}

fn is_image(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|img| img.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// The index column decides how much of a change is staged: only index →
/// `All`, only worktree → `None`, both → `Partial`.
pub fn parse_porcelain_status(raw: &[u8]) -> Vec<FileEntry> {
    let text = String::from_utf8_lossy(raw);
    let mut fields = text.split('\0').filter(|field| !field.is_empty());
    let mut files = Vec::new();

    while let Some(field) = fields.next() {
        // "XY path": two ASCII status codes and a space
        let bytes = field.as_bytes();
        let path = match field.get(3..) {
            Some(path) if bytes.len() >= 4 && bytes[..2].is_ascii() && bytes[2] == b' ' => path,
            _ => {
                tracing::debug!("Skipping malformed status entry {:?}", field);
                continue;
            }
        };
        let (index, worktree) = (bytes[0] as char, bytes[1] as char);

        let status = match (index, worktree) {
            ('?', '?') => FileStatusKind::Untracked,
            ('!', '!') => continue,
            ('D', 'D') | ('A', 'A') | ('U', _) | (_, 'U') => FileStatusKind::Conflicted,
            ('R', _) | (_, 'R') => FileStatusKind::Renamed {
                old_path: fields.next().unwrap_or_default().to_string(),
            },
            ('C', _) | (_, 'C') => FileStatusKind::Copied {
                old_path: fields.next().unwrap_or_default().to_string(),
            },
            ('A', _) | (_, 'A') => FileStatusKind::New,
            ('D', _) | (_, 'D') => FileStatusKind::Deleted,
            _ => FileStatusKind::Modified,
        };

        let selection = match (index, worktree) {
            ('?', '?') => SelectionType::None,
            (' ', _) => SelectionType::None,
            (_, ' ') => SelectionType::All,
            _ => SelectionType::Partial,
        };

        files.push(FileEntry::new(path, status).with_selection(selection));
    }

    files
}
