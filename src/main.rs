use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use changeview::{
    cli::{Cli, OutputFormat},
    AppEvent, ChangeViewConfig, ChangesList, ChangesListener, ChangesReport, DiffFormatter,
    FileEntry, FileStatusKind, FsModificationTime, GitRepository, IncludeAllState,
    RepositoryWatcher,
};

/// Holds the selection on behalf of the terminal, which has no cursor.
#[derive(Default)]
struct SelectionTracker {
    selected: Mutex<Vec<String>>,
}

impl ChangesListener for SelectionTracker {
    fn selected_file_ids(&self) -> Vec<String> {
        match self.selected.lock() {
            Ok(selected) => selected.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn on_filtered_set_changed(&self, files: &[FileEntry]) {
        tracing::debug!("{} files visible", files.len());
    }

    fn on_selection_corrected(&self, files: &[FileEntry]) {
        let ids = files.iter().map(|file| file.id.clone()).collect();
        match self.selected.lock() {
            Ok(mut selected) => *selected = ids,
            Err(poisoned) => *poisoned.into_inner() = ids,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    let mut config = ChangeViewConfig::load_or_default(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    if let Err(err) = config.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    let watch_path = cli.get_watch_path();
    let repo = Arc::new(GitRepository::discover(&watch_path).await?.with_config(&config.cache));
    tracing::info!("Starting changeview on: {}", repo.root().display());

    let list = ChangesList::with_config(
        Arc::new(FsModificationTime::new(repo.root())),
        repo.clone(),
        Arc::new(SelectionTracker::default()),
        &config.view,
    );

    if cli.output == OutputFormat::Text && !cli.once {
        println!("Watching: {}", repo.root().display());
        println!("Press Ctrl+C to quit");
        println!("---");
    }

    list.notify_upstream_files_changed(repo.status().await?).await;
    print_report(&list, &repo, &cli, &config)?;

    if cli.once {
        return Ok(());
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let _watcher = RepositoryWatcher::new(
        repo.root(),
        config.watcher.event_debounce_duration(),
        event_tx.clone(),
    )?;

    ctrlc::set_handler(move || {
        let _ = event_tx.send(AppEvent::Quit);
    })?;

    while let Some(event) = event_rx.recv().await {
        // Changes that piled up during the last refresh need only one more
        match event.coalesce_pending(&mut event_rx) {
            AppEvent::WorkingDirectoryChanged { paths, .. } => {
                tracing::debug!("Working directory changed: {:?}", paths);

                let files = match repo.status().await {
                    Ok(files) => files,
                    Err(err) => {
                        tracing::warn!("Failed to refresh status: {:#}", err);
                        continue;
                    }
                };

                // Same list but possibly edited contents: only the cache can tell
                let list_changed = *list.files() != files;
                let outcome = if list_changed {
                    list.notify_upstream_files_changed(files).await
                } else {
                    list.refresh().await
                };

                if list_changed || outcome.changed {
                    print_report(&list, &repo, &cli, &config)?;
                }
            }
            AppEvent::Quit => break,
        }
    }

    Ok(())
}

fn print_report(
    list: &ChangesList,
    repo: &GitRepository,
    cli: &Cli,
    config: &ChangeViewConfig,
) -> Result<()> {
    match cli.output {
        OutputFormat::Json => {
            let filters = list.filters();
            let report = ChangesReport::new(
                filters.path,
                filters.content,
                list.summary(),
                list.filtered_files(),
            );
            println!("{}", serde_json::to_string(&report)?);
        }
        OutputFormat::Compact => {
            for file in list.filtered_files() {
                println!("{} {}", file.status.symbol(), file.path);
            }
        }
        OutputFormat::Text => print_text(list, repo, cli, config),
    }
    Ok(())
}

fn print_text(list: &ChangesList, repo: &GitRepository, cli: &Cli, config: &ChangeViewConfig) {
    let summary = list.summary();
    let checkbox = match list.include_all_state(repo.is_rebase_in_progress()) {
        IncludeAllState::On => "[x]",
        IncludeAllState::Off => "[ ]",
        IncludeAllState::Mixed => "[-]",
    };

    let timestamp = chrono::Local::now().format("%H:%M:%S");
    println!("[{}] {} {}, {}", timestamp, checkbox, summary.describe(), summary.describe_selected());

    let filters = list.filters();
    if filters.is_active() {
        println!(
            "Filter path={:?} content={:?}: showing {} of {}",
            filters.path, filters.content, summary.visible, summary.total
        );
    }

    let snapshot = list.cache().snapshot();
    for file in list.filtered_files() {
        let stats = snapshot
            .get(&file.path)
            .map(|entry| {
                if entry.diff.is_textual() {
                    format!(" ({})", DiffFormatter::format_stats(&entry.diff.stats()))
                } else {
                    format!(" ({})", entry.diff.kind_name())
                }
            })
            .unwrap_or_default();

        let origin = match &file.status {
            FileStatusKind::Renamed { old_path } | FileStatusKind::Copied { old_path } => {
                format!(" <- {}", old_path)
            }
            _ => String::new(),
        };

        if cli.no_color {
            println!("  {} {}{}{}", file.status.symbol(), file.path, origin, stats);
        } else {
            println!(
                "  {}{}\x1b[0m {}{}{}",
                status_color(&file.status),
                file.status.symbol(),
                file.path,
                origin,
                stats
            );
        }

        if config.view.diff_preview_lines > 0 {
            if let Some(entry) = snapshot.get(&file.path) {
                let text = DiffFormatter::format_unified(
                    &entry.diff,
                    &file.path,
                    config.view.diff_preview_lines,
                );
                for line in text.lines().skip(2) {
                    if cli.no_color {
                        println!("      {}", line);
                    } else if line.starts_with('+') {
                        println!("      \x1b[32m{}\x1b[0m", line);
                    } else if line.starts_with('-') {
                        println!("      \x1b[31m{}\x1b[0m", line);
                    } else {
                        println!("      {}", line);
                    }
                }
            }
        }
    }

    println!();
}

fn status_color(status: &FileStatusKind) -> &'static str {
    match status {
        FileStatusKind::New | FileStatusKind::Untracked => "\x1b[32m", // Green
        FileStatusKind::Modified => "\x1b[33m",                         // Yellow
        FileStatusKind::Deleted => "\x1b[31m",                          // Red
        FileStatusKind::Renamed { .. } | FileStatusKind::Copied { .. } => "\x1b[34m", // Blue
        FileStatusKind::Conflicted => "\x1b[35m",                       // Magenta
    }
}
