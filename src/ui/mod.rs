//! UI components for Tandem
//!
//! The shell's widgets: the two panes (each implementing `SyncableView`),
//! the sidebar (outline, issues, file explorer), and modal dialogs. All
//! sync logic lives in the controller; these components only surface user
//! events and display state.

mod dialogs;
mod editor_pane;
mod preview_pane;
mod sidebar;

pub use dialogs::{FrontMatterDialog, SettingsDialog};
pub use editor_pane::{EditorPane, EditorPaneOutput};
pub use preview_pane::{PreviewPane, PreviewPaneOutput};
pub use sidebar::{Sidebar, SidebarAction};
