//! File operations module for Tandem
//!
//! Native open/save dialogs (rfd) and the sidebar's directory listing.

pub mod dialogs;
pub mod explorer;

pub use dialogs::{open_file_dialog, save_export_dialog, save_file_dialog};
pub use explorer::{list_directory, DirEntryKind, ExplorerEntry};
