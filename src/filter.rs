use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;

/// Files inside `.git/` whose changes alter `git status` output
const GIT_STATE_FILES: &[&str] = &["index", "HEAD"];

/// Decides which filesystem notifications should trigger a status refresh.
pub struct PathFilter {
    root: PathBuf,
    ignores: Vec<Gitignore>,
}

impl PathFilter {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut ignores = Vec::new();

        let walker = WalkBuilder::new(&root)
            .hidden(false)
            .git_ignore(true)
            .git_exclude(true)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for result in walker {
            match result {
                Ok(entry) if entry.file_name() == ".gitignore" => {
                    let (gitignore, err) = Gitignore::new(entry.path());
                    if let Some(err) = err {
                        tracing::warn!("Error in {}: {}", entry.path().display(), err);
                    }
                    ignores.push(gitignore);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("Error walking directory: {}", err);
                }
            }
        }

        let exclude = root.join(".git").join("info").join("exclude");
        if exclude.is_file() {
            ignores.push(build_ignore(&root, &exclude)?);
        }

        tracing::debug!("Loaded {} ignore files under {}", ignores.len(), root.display());
        Ok(Self { root, ignores })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn should_refresh<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let relative = match path.strip_prefix(&self.root) {
            Ok(relative) => relative,
            Err(_) => return false,
        };

        let mut components = relative.components();
        if let Some(first) = components.next() {
            if first.as_os_str() == ".git" {
                let rest = components.as_path();
                return GIT_STATE_FILES.iter().any(|name| rest == Path::new(name));
            }
        }

        let is_dir = path.is_dir();
        !self.ignores.iter().any(|gitignore| {
            path.starts_with(gitignore.path())
                && gitignore.matched_path_or_any_parents(path, is_dir).is_ignore()
        })
    }
}

fn build_ignore(root: &Path, file: &Path) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(file) {
        tracing::warn!("Error in {}: {}", file.display(), err);
    }
    Ok(builder.build()?)
}
