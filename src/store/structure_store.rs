use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::structure::DirectoryTree;

/// Persistence for a whole directory-structure document.
///
/// Saving always replaces the stored document; there is no partial update
/// and the last writer wins.
#[allow(async_fn_in_trait)]
pub trait StructureStore {
    async fn load(&self) -> Result<DirectoryTree, StoreError>;
    async fn save(&self, tree: &DirectoryTree) -> Result<(), StoreError>;
}

/// Wire shape of a stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDocument {
    pub directory_structure: DirectoryTree,
}

impl From<DirectoryTree> for StructureDocument {
    fn from(directory_structure: DirectoryTree) -> Self {
        Self {
            directory_structure,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("No directory structure stored at {}", path.display()))]
    NotFound { path: PathBuf },
    #[snafu(display("Failed to read directory structure from {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write directory structure to {}", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create directory {}", path.display()))]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Stored directory structure at {} is malformed", path.display()))]
    DecodeError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Failed to encode directory structure"))]
    EncodeError { source: serde_json::Error },
}
