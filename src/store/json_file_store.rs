use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::prelude::*;
use tracing::{debug, info};

use super::structure_store::{
    CreateDirSnafu, DecodeSnafu, EncodeSnafu, NotFoundSnafu, ReadSnafu, StoreError,
    StructureDocument, StructureStore, WriteSnafu,
};
use crate::structure::DirectoryTree;

/// Stores the document as pretty printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl StructureStore for JsonFileStore {
    async fn load(&self) -> Result<DirectoryTree, StoreError> {
        debug!("Reading directory structure from {}", self.path.display());
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return NotFoundSnafu { path: &self.path }.fail();
            }
            Err(err) => return Err(err).context(ReadSnafu { path: &self.path }),
        };

        let document: StructureDocument =
            serde_json::from_slice(&bytes).context(DecodeSnafu { path: &self.path })?;
        let tree = document.directory_structure;
        info!(
            "Loaded directory structure with {} from {}",
            tree.stats(),
            self.path.display()
        );
        Ok(tree)
    }

    async fn save(&self, tree: &DirectoryTree) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(CreateDirSnafu { path: parent })?;
        }

        let document = StructureDocument::from(tree.clone());
        let mut bytes = serde_json::to_vec_pretty(&document).context(EncodeSnafu)?;
        bytes.push(b'\n');

        fs::write(&self.path, bytes)
            .await
            .0
            .context(WriteSnafu { path: &self.path })?;
        info!(
            "Saved directory structure with {} to {}",
            tree.stats(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Node, TreePath};
    use tempfile::TempDir;

    fn sample() -> DirectoryTree {
        let path: TreePath = r"backend.controllers.authController\.js".parse().unwrap();
        DirectoryTree::scaffold(["frontend", "backend", "shared"])
            .and_then(|tree| tree.set(&path, Node::file("Handles auth")))
            .unwrap()
    }

    #[compio::test]
    async fn save_then_load_returns_same_tree() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonFileStore::new(dir.path().join("nested/structure.json"));

        store.save(&sample()).await.expect("save");
        assert!(store.exists());
        let loaded = store.load().await.expect("load");

        assert_eq!(loaded, sample());
        assert_eq!(
            loaded.children().keys().collect::<Vec<_>>(),
            ["frontend", "backend", "shared"]
        );
    }

    #[compio::test]
    async fn saved_file_wraps_tree_in_directory_structure_field() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonFileStore::new(dir.path().join("structure.json"));
        store.save(&sample()).await.expect("save");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value["directory_structure"]["backend"]["controllers"]["authController.js"],
            "Handles auth"
        );
    }

    #[compio::test]
    async fn load_missing_file_is_not_found() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonFileStore::new(dir.path().join("missing.json"));

        let result = store.load().await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[compio::test]
    async fn load_malformed_file_is_decode_error() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("structure.json");
        std::fs::write(&path, r#"{"directory_structure": ["not", "a", "tree"]}"#).unwrap();

        let result = JsonFileStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::DecodeError { .. })));
    }

    #[compio::test]
    async fn save_replaces_previous_document() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonFileStore::new(dir.path().join("structure.json"));
        store.save(&sample()).await.expect("first save");

        let smaller = DirectoryTree::scaffold(["docs"]).unwrap();
        store.save(&smaller).await.expect("second save");

        assert_eq!(store.load().await.expect("load"), smaller);
    }
}
