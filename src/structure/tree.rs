use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::debug;

use super::node::{Children, Node, TreeStats, count_children, sorted_entries};
use super::path::{PathError, TreePath, validate_segment};

/// Root folder of a directory-structure document.
///
/// Every edit clones the whole tree and returns the edited copy, leaving
/// `self` untouched, so a working copy can always be compared against or
/// reset to the tree it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectoryTree {
    root: Children,
}

// Decoded through `Node` so the root gets the same duplicate-name check as
// nested folders.
impl<'de> Deserialize<'de> for DirectoryTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Node::deserialize(deserializer)? {
            Node::Folder(root) => Ok(Self { root }),
            Node::File(_) => Err(de::Error::custom(
                "the root of a directory structure must be a folder mapping",
            )),
        }
    }
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with one empty top-level folder per name.
    pub fn scaffold<I, S>(roots: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        roots.into_iter().try_fold(Self::new(), |tree, name| {
            let path = TreePath::from_segments([name]).context(InvalidNameSnafu)?;
            tree.insert(&path, Node::empty_folder())
        })
    }

    pub fn from_children(root: Children) -> Self {
        Self { root }
    }

    pub fn children(&self) -> &Children {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.get(path).is_ok()
    }

    pub fn get(&self, path: &TreePath) -> Result<&Node, TreeError> {
        let parent = self.folder(path.parent_segments())?;
        parent.get(path.name()).context(PathNotFoundSnafu {
            path: path.to_string(),
        })
    }

    /// Returns a copy with `value` stored at `path`. Missing folders along
    /// the way are created; an existing entry is replaced in place.
    pub fn set(&self, path: &TreePath, value: Node) -> Result<Self, TreeError> {
        debug!("Setting '{}'", path);
        let mut tree = self.clone();
        let parent = tree.folder_mut_or_create(path)?;
        match parent.get_mut(path.name()) {
            Some(existing) => *existing = value,
            None => {
                parent.insert(path.name().to_string(), value);
            }
        }
        Ok(tree)
    }

    /// Like [`set`](Self::set), but refuses to replace an existing entry.
    pub fn insert(&self, path: &TreePath, value: Node) -> Result<Self, TreeError> {
        debug!("Inserting '{}'", path);
        let mut tree = self.clone();
        let parent = tree.folder_mut_or_create(path)?;
        ensure!(
            !parent.contains_key(path.name()),
            NameCollisionSnafu {
                name: path.name(),
                parent: parent_display(path),
            }
        );
        parent.insert(path.name().to_string(), value);
        Ok(tree)
    }

    /// Returns a copy without the entry at `path` and everything below it.
    pub fn delete(&self, path: &TreePath) -> Result<Self, TreeError> {
        debug!("Deleting '{}'", path);
        let mut tree = self.clone();
        let parent = tree.folder_mut(path)?;
        parent.remove(path.name()).context(PathNotFoundSnafu {
            path: path.to_string(),
        })?;
        Ok(tree)
    }

    /// Returns a copy where the entry at `path` is called `new_name`. The
    /// entry keeps its value and its position among its siblings.
    pub fn rename(&self, path: &TreePath, new_name: &str) -> Result<Self, TreeError> {
        debug!("Renaming '{}' to '{}'", path, new_name);
        validate_segment(new_name).context(InvalidNameSnafu)?;

        let mut tree = self.clone();
        let parent = tree.folder_mut(path)?;
        let old_name = path.name();
        ensure!(
            parent.contains_key(old_name),
            PathNotFoundSnafu {
                path: path.to_string(),
            }
        );
        if old_name == new_name {
            return Ok(tree);
        }
        ensure!(
            !parent.contains_key(new_name),
            NameCollisionSnafu {
                name: new_name,
                parent: parent_display(path),
            }
        );

        let renamed: Children = std::mem::take(parent)
            .into_iter()
            .map(|(name, node)| {
                if name == old_name {
                    (new_name.to_string(), node)
                } else {
                    (name, node)
                }
            })
            .collect();
        *parent = renamed;
        Ok(tree)
    }

    /// Combines two trees whose top-level names do not overlap.
    pub fn merge(&self, other: &DirectoryTree) -> Result<Self, TreeError> {
        let mut tree = self.clone();
        for (name, node) in &other.root {
            ensure!(
                !tree.root.contains_key(name),
                NameCollisionSnafu {
                    name,
                    parent: ROOT_DISPLAY,
                }
            );
            tree.root.insert(name.clone(), node.clone());
        }
        Ok(tree)
    }

    /// Top-level entries, folders first.
    pub fn entries(&self) -> Vec<(&str, &Node)> {
        sorted_entries(&self.root)
    }

    /// Folder and file totals of the whole tree. The root itself is not
    /// counted, so totals of trees with disjoint names add up.
    pub fn stats(&self) -> TreeStats {
        count_children(&self.root)
    }

    fn folder(&self, segments: &[String]) -> Result<&Children, TreeError> {
        let mut current = &self.root;
        for (depth, segment) in segments.iter().enumerate() {
            current = match current.get(segment) {
                Some(Node::Folder(children)) => children,
                Some(Node::File(_)) => {
                    return NotAFolderSnafu {
                        path: display_prefix(segments, depth),
                    }
                    .fail();
                }
                None => {
                    return PathNotFoundSnafu {
                        path: display_prefix(segments, depth),
                    }
                    .fail();
                }
            };
        }
        Ok(current)
    }

    /// Parent folder of `path`, which must already exist.
    fn folder_mut(&mut self, path: &TreePath) -> Result<&mut Children, TreeError> {
        let segments = path.parent_segments();
        let mut current = &mut self.root;
        for (depth, segment) in segments.iter().enumerate() {
            current = match current.get_mut(segment) {
                Some(Node::Folder(children)) => children,
                Some(Node::File(_)) => {
                    return NotAFolderSnafu {
                        path: display_prefix(segments, depth),
                    }
                    .fail();
                }
                None => {
                    return PathNotFoundSnafu {
                        path: display_prefix(segments, depth),
                    }
                    .fail();
                }
            };
        }
        Ok(current)
    }

    /// Parent folder of `path`, creating missing folders on the way.
    ///
    /// Existing folders are looked up with `get_mut`: `LinkedHashMap::entry`
    /// moves an occupied key to the back and would reorder siblings.
    fn folder_mut_or_create(&mut self, path: &TreePath) -> Result<&mut Children, TreeError> {
        let segments = path.parent_segments();
        let mut current = &mut self.root;
        for (depth, segment) in segments.iter().enumerate() {
            if !current.contains_key(segment) {
                current.insert(segment.clone(), Node::empty_folder());
            }
            current = match current.get_mut(segment) {
                Some(Node::Folder(children)) => children,
                Some(Node::File(_)) => {
                    return NotAFolderSnafu {
                        path: display_prefix(segments, depth),
                    }
                    .fail();
                }
                None => {
                    return PathNotFoundSnafu {
                        path: display_prefix(segments, depth),
                    }
                    .fail();
                }
            };
        }
        Ok(current)
    }
}

impl From<Children> for DirectoryTree {
    fn from(root: Children) -> Self {
        Self::from_children(root)
    }
}

const ROOT_DISPLAY: &str = "<root>";

fn display_prefix(segments: &[String], depth: usize) -> String {
    TreePath::from_segments(segments[..=depth].iter().cloned())
        .map(|path| path.to_string())
        .unwrap_or_else(|_| segments[..=depth].join("."))
}

fn parent_display(path: &TreePath) -> String {
    path.parent()
        .map(|parent| parent.to_string())
        .unwrap_or_else(|| ROOT_DISPLAY.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("No entry at '{}'", path))]
    PathNotFound { path: String },
    #[snafu(display("'{}' already exists in '{}'", name, parent))]
    NameCollision { name: String, parent: String },
    #[snafu(display("'{}' is a file, not a folder", path))]
    NotAFolder { path: String },
    #[snafu(display("Invalid entry name"))]
    InvalidName { source: PathError },
}
