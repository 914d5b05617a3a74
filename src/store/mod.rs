//! Loading and saving whole directory-structure documents.

mod json_file_store;
mod structure_store;

pub use json_file_store::JsonFileStore;
pub use structure_store::{StoreError, StructureDocument, StructureStore};
