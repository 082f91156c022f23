//! Core functionality module
//!
//! Contains the working-directory data model, application events and
//! change summaries

pub mod events;
pub mod files;
pub mod summary;

// Re-export main types
pub use events::AppEvent;
pub use files::{include_all_state, FileEntry, FileStatusKind, IncludeAllState, SelectionType};
pub use summary::{ChangesReport, ChangesSummary};
