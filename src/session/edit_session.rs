use derive_more::Display;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::ext::FolderNameExt;
use crate::store::{StoreError, StructureStore};
use crate::structure::{DirectoryTree, Node, TreeError, TreePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryKind {
    #[display("folder")]
    Folder,
    #[display("file")]
    File,
}

/// An edit that has been started but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PendingEdit {
    /// New entry below `parent`, or at the top level when `parent` is `None`.
    #[display("add {kind}")]
    Add {
        parent: Option<TreePath>,
        kind: EntryKind,
    },
    #[display("rename '{path}'")]
    Rename { path: TreePath },
    #[display("delete '{path}'")]
    Delete { path: TreePath },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Viewing,
    Editing { pending: Option<PendingEdit> },
}

/// Editing state of one directory-structure document.
///
/// Edits are applied to a working copy; the persisted tree only changes on
/// a successful [`commit`](Self::commit). At most one edit can be pending at
/// any time.
#[derive(Debug, Clone)]
pub struct EditSession {
    persisted: DirectoryTree,
    working: DirectoryTree,
    mode: SessionMode,
    normalize_folder_names: bool,
}

impl EditSession {
    pub fn new(persisted: DirectoryTree) -> Self {
        Self {
            working: persisted.clone(),
            persisted,
            mode: SessionMode::Viewing,
            normalize_folder_names: true,
        }
    }

    pub fn with_folder_name_normalization(mut self, enabled: bool) -> Self {
        self.normalize_folder_names = enabled;
        self
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        match &self.mode {
            SessionMode::Editing { pending } => pending.as_ref(),
            SessionMode::Viewing => None,
        }
    }

    pub fn persisted(&self) -> &DirectoryTree {
        &self.persisted
    }

    pub fn working(&self) -> &DirectoryTree {
        &self.working
    }

    pub fn has_changes(&self) -> bool {
        self.working != self.persisted
    }

    pub fn begin_edit(&mut self) -> Result<(), SessionError> {
        ensure!(self.mode == SessionMode::Viewing, AlreadyEditingSnafu);
        debug!("Entering edit mode");
        self.mode = SessionMode::Editing { pending: None };
        Ok(())
    }

    pub fn stage(&mut self, edit: PendingEdit) -> Result<(), SessionError> {
        let pending = self.pending_slot()?;
        if let Some(current) = pending.as_ref() {
            return PendingInProgressSnafu {
                pending: current.to_string(),
            }
            .fail();
        }
        debug!("Staged {}", edit);
        *pending = Some(edit);
        Ok(())
    }

    /// Drops the pending edit, if any, without touching the working copy.
    pub fn discard_pending(&mut self) -> Result<Option<PendingEdit>, SessionError> {
        Ok(self.pending_slot()?.take())
    }

    /// Completes a pending add. Folder names are normalized when enabled,
    /// files get `description`.
    pub fn confirm_add(&mut self, name: &str, description: &str) -> Result<TreePath, SessionError> {
        let (parent, kind) = match self.current_pending()? {
            PendingEdit::Add { parent, kind } => (parent.clone(), *kind),
            other => {
                return PendingMismatchSnafu {
                    expected: "add",
                    pending: other.to_string(),
                }
                .fail();
            }
        };

        let (name, node) = match kind {
            EntryKind::Folder if self.normalize_folder_names => {
                (name.to_folder_name(), Node::empty_folder())
            }
            EntryKind::Folder => (name.trim().to_string(), Node::empty_folder()),
            EntryKind::File => (name.trim().to_string(), Node::file(description.trim())),
        };
        let path = match &parent {
            Some(parent) => parent.join(name),
            None => TreePath::from_segments([name]),
        }
        .map_err(|source| SessionError::Tree {
            source: TreeError::InvalidName { source },
        })?;

        self.working = self.working.insert(&path, node).context(TreeSnafu)?;
        self.clear_pending();
        info!("Added {} '{}'", kind, path);
        Ok(path)
    }

    pub fn confirm_rename(&mut self, new_name: &str) -> Result<TreePath, SessionError> {
        let path = match self.current_pending()? {
            PendingEdit::Rename { path } => path.clone(),
            other => {
                return PendingMismatchSnafu {
                    expected: "rename",
                    pending: other.to_string(),
                }
                .fail();
            }
        };

        let new_name = new_name.trim();
        self.working = self.working.rename(&path, new_name).context(TreeSnafu)?;
        self.clear_pending();
        let new_path = path
            .with_name(new_name)
            .map_err(|source| SessionError::Tree {
                source: TreeError::InvalidName { source },
            })?;
        info!("Renamed '{}' to '{}'", path, new_path);
        Ok(new_path)
    }

    pub fn confirm_delete(&mut self) -> Result<TreePath, SessionError> {
        let path = match self.current_pending()? {
            PendingEdit::Delete { path } => path.clone(),
            other => {
                return PendingMismatchSnafu {
                    expected: "delete",
                    pending: other.to_string(),
                }
                .fail();
            }
        };

        self.working = self.working.delete(&path).context(TreeSnafu)?;
        self.clear_pending();
        info!("Deleted '{}'", path);
        Ok(path)
    }

    /// Applies an arbitrary tree edit to the working copy. Only allowed
    /// while editing with nothing pending.
    pub fn apply<F>(&mut self, edit: F) -> Result<(), SessionError>
    where
        F: FnOnce(&DirectoryTree) -> Result<DirectoryTree, TreeError>,
    {
        if let Some(current) = self.pending_slot()? {
            return PendingInProgressSnafu {
                pending: current.to_string(),
            }
            .fail();
        }
        self.working = edit(&self.working).context(TreeSnafu)?;
        Ok(())
    }

    /// Throws the working copy away and returns to viewing.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.pending_slot()?;
        if self.has_changes() {
            info!("Discarding unsaved changes");
        }
        self.working = self.persisted.clone();
        self.mode = SessionMode::Viewing;
        Ok(())
    }

    /// Saves the working copy through `store`. On failure the session stays
    /// in edit mode with the working copy intact.
    pub async fn commit<S: StructureStore>(&mut self, store: &S) -> Result<(), SessionError> {
        if let Some(current) = self.pending_slot()? {
            return PendingInProgressSnafu {
                pending: current.to_string(),
            }
            .fail();
        }

        if let Err(err) = store.save(&self.working).await {
            warn!("Saving the directory structure failed: {}", err);
            return Err(err).context(SaveSnafu);
        }
        self.persisted = self.working.clone();
        self.mode = SessionMode::Viewing;
        info!("Committed directory structure");
        Ok(())
    }

    fn pending_slot(&mut self) -> Result<&mut Option<PendingEdit>, SessionError> {
        match &mut self.mode {
            SessionMode::Editing { pending } => Ok(pending),
            SessionMode::Viewing => NotEditingSnafu.fail(),
        }
    }

    fn current_pending(&mut self) -> Result<&PendingEdit, SessionError> {
        match self.pending_slot()? {
            Some(edit) => Ok(edit),
            None => NothingPendingSnafu.fail(),
        }
    }

    fn clear_pending(&mut self) {
        if let SessionMode::Editing { pending } = &mut self.mode {
            *pending = None;
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("Not in edit mode"))]
    NotEditing,
    #[snafu(display("Already in edit mode"))]
    AlreadyEditing,
    #[snafu(display("Another edit is still pending: {}", pending))]
    PendingInProgress { pending: String },
    #[snafu(display("No edit is pending"))]
    NothingPending,
    #[snafu(display("Expected a pending {} but found: {}", expected, pending))]
    PendingMismatch { expected: String, pending: String },
    #[snafu(display("Edit could not be applied"))]
    Tree { source: TreeError },
    #[snafu(display("Failed to save the directory structure"))]
    Save { source: StoreError },
}
