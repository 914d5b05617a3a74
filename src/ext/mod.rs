mod folder_name_ext;

pub use folder_name_ext::FolderNameExt;
