//! Editing of directory-structure documents: nested folders and described
//! files, addressed by dotted paths and saved as a single JSON document.

pub mod config;
mod ext;
pub mod session;
pub mod store;
pub mod structure;
