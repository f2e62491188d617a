//! Save-dialog collaborator boundary.
//!
//! The executor never talks to a UI directly; whoever embeds the crate
//! supplies the dialog. The CLI runs without one and relies on the
//! default-directory path instead.

use std::path::PathBuf;

use async_trait::async_trait;

/// Asks the user where to save a file.
#[async_trait]
pub trait SaveDialog: Send + Sync {
    /// Presents `base_name` plus the offered `extensions` (first one
    /// is the default; an empty slice means "all files") and returns
    /// the chosen full path, or `None` when the user canceled.
    async fn pick_save_path(&self, base_name: &str, extensions: &[String]) -> Option<PathBuf>;
}

/// Dialog that always cancels. Used when no interactive frontend
/// exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDialog;

#[async_trait]
impl SaveDialog for NoDialog {
    async fn pick_save_path(&self, _base_name: &str, _extensions: &[String]) -> Option<PathBuf> {
        None
    }
}
