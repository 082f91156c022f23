use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::mpsc::UnboundedReceiver;

/// Events driving the main loop of the binary
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Something under the repository changed; the paths are the raw
    /// notifications that were coalesced into this event.
    WorkingDirectoryChanged {
        paths: Vec<PathBuf>,
        timestamp: SystemTime,
    },
    Quit,
}

impl AppEvent {
    pub fn working_directory_changed(paths: Vec<PathBuf>) -> Self {
        AppEvent::WorkingDirectoryChanged {
            paths,
            timestamp: SystemTime::now(),
        }
    }

    /// Fold the events already queued behind this one into a single event.
    /// A queued `Quit` wins.
    pub fn coalesce_pending(self, rx: &mut UnboundedReceiver<AppEvent>) -> AppEvent {
        let (mut paths, mut timestamp) = match self {
            AppEvent::WorkingDirectoryChanged { paths, timestamp } => (paths, timestamp),
            AppEvent::Quit => return AppEvent::Quit,
        };

        while let Ok(next) = rx.try_recv() {
            match next {
                AppEvent::WorkingDirectoryChanged { paths: more, timestamp: at } => {
                    for path in more {
                        if !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                    timestamp = timestamp.max(at);
                }
                AppEvent::Quit => return AppEvent::Quit,
            }
        }

        AppEvent::WorkingDirectoryChanged { paths, timestamp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_directory_changed_event() {
        let event = AppEvent::working_directory_changed(vec![PathBuf::from("src/lib.rs")]);

        match event {
            AppEvent::WorkingDirectoryChanged { paths, timestamp } => {
                assert_eq!(paths, vec![PathBuf::from("src/lib.rs")]);
                assert!(timestamp <= SystemTime::now());
            }
            AppEvent::Quit => panic!("Expected WorkingDirectoryChanged event"),
        }
    }

    #[test]
    fn test_queued_changes_fold_into_one() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(AppEvent::working_directory_changed(vec![PathBuf::from("b.rs")])).unwrap();
        tx.send(AppEvent::working_directory_changed(vec![PathBuf::from("a.rs")])).unwrap();

        let first = AppEvent::working_directory_changed(vec![PathBuf::from("a.rs")]);
        match first.coalesce_pending(&mut rx) {
            AppEvent::WorkingDirectoryChanged { paths, .. } => {
                assert_eq!(paths, vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
            }
            AppEvent::Quit => panic!("Expected WorkingDirectoryChanged event"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_queued_quit_wins() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(AppEvent::Quit).unwrap();
        tx.send(AppEvent::working_directory_changed(vec![PathBuf::from("a.rs")])).unwrap();

        let first = AppEvent::working_directory_changed(vec![PathBuf::from("b.rs")]);

        assert!(matches!(first.coalesce_pending(&mut rx), AppEvent::Quit));
    }
}
