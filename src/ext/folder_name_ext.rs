/// Turns a user supplied name into the lowercase-hyphenated form used for
/// new folders, e.g. `"User Settings"` becomes `"user-settings"`.
pub fn to_folder_name(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub trait FolderNameExt {
    fn to_folder_name(&self) -> String;
}

impl FolderNameExt for str {
    fn to_folder_name(&self) -> String {
        to_folder_name(self)
    }
}

impl FolderNameExt for String {
    fn to_folder_name(&self) -> String {
        to_folder_name(self)
    }
}
