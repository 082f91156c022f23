use std::path::PathBuf;
use clap::{Parser, ValueEnum};

use crate::config::ChangeViewConfig;

#[derive(Parser)]
#[command(name = "changeview")]
#[command(author = "xicv")]
#[command(version = "0.1.0")]
#[command(about = "Live, filtered list of a repository's uncommitted changes")]
#[command(long_about = "changeview lists the files with uncommitted changes in a git working directory, keeps their diffs cached by modification time, and reprints the list whenever the working directory changes. Filter by path or by text in the changed lines.")]
pub struct Cli {
    /// Repository to watch
    #[arg(value_name = "PATH", help = "Path inside the repository (defaults to current directory)")]
    pub path: Option<PathBuf>,

    /// Only show files whose path contains this text
    #[arg(short = 'p', long, help = "Path substring filter (case-sensitive)")]
    pub filter_path: Option<String>,

    /// Only show files whose added or removed lines contain this text
    #[arg(short = 'c', long, help = "Diff content substring filter (case-sensitive)")]
    pub filter_content: Option<String>,

    /// Print the list once and exit instead of watching
    #[arg(long, help = "Print once and exit")]
    pub once: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Diff lines to print under each file in text output
    #[arg(long, help = "Diff preview lines per file in text output")]
    pub diff_lines: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    /// Output format
    #[arg(long, default_value = "text", help = "Output format")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable list with status and filters
    Text,
    /// JSON report for scripting
    Json,
    /// Compact single-line format
    Compact,
}

impl Cli {
    pub fn get_watch_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut ChangeViewConfig) {
        if let Some(ref path) = self.filter_path {
            config.view.path_filter = path.clone();
        }
        if let Some(ref content) = self.filter_content {
            config.view.content_filter = content.clone();
        }
        if let Some(lines) = self.diff_lines {
            config.view.diff_preview_lines = lines;
        }
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> Result<(), String> {
        let path = self.get_watch_path();

        if !path.exists() {
            return Err(format!("Path does not exist: {}", path.display()));
        }

        if !path.is_dir() {
            return Err(format!("Path is not a directory: {}", path.display()));
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        let cli = Cli::parse_from(["changeview", "--filter-path", "src/", "-c", "foo", "--once"]);

        assert_eq!(cli.filter_path.as_deref(), Some("src/"));
        assert_eq!(cli.filter_content.as_deref(), Some("foo"));
        assert!(cli.once);
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli::parse_from(["changeview", "-p", "lib/", "--diff-lines", "5", "--output", "json"]);
        let mut config = ChangeViewConfig::default();
        config.view.content_filter = "kept".to_string();

        cli.apply_to(&mut config);

        assert_eq!(config.view.path_filter, "lib/");
        assert_eq!(config.view.content_filter, "kept");
        assert_eq!(config.view.diff_preview_lines, 5);
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_validate_missing_path() {
        let cli = Cli::parse_from(["changeview", "/definitely/not/a/real/path"]);
        assert!(cli.validate().is_err());
    }
}
