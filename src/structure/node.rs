use std::fmt;

use derive_more::{Add, AddAssign, Sum};
use hashlink::LinkedHashMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

pub type Children = LinkedHashMap<String, Node>;

/// A named entry of the directory structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Folder(Children),
    /// Leaf holding the description of the file.
    File(String),
}

impl Node {
    pub fn empty_folder() -> Self {
        Node::Folder(Children::new())
    }

    pub fn file(description: impl Into<String>) -> Self {
        Node::File(description.into())
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Folder(children) => Some(children),
            Node::File(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Node::Folder(_) => None,
            Node::File(description) => Some(description),
        }
    }

    /// Children of a folder in display order, see [`sorted_entries`].
    /// Files have no entries.
    pub fn entries(&self) -> Vec<(&str, &Node)> {
        self.children().map(sorted_entries).unwrap_or_default()
    }

    /// Counts this node itself plus everything below it.
    pub fn stats(&self) -> TreeStats {
        match self {
            Node::Folder(children) => TreeStats::FOLDER + count_children(children),
            Node::File(_) => TreeStats::FILE,
        }
    }
}

/// Folders first, files after, insertion order kept within each group.
pub fn sorted_entries(children: &Children) -> Vec<(&str, &Node)> {
    let mut entries = children
        .iter()
        .map(|(name, node)| (name.as_str(), node))
        .collect::<Vec<_>>();
    entries.sort_by_key(|(_, node)| node.is_file());
    entries
}

pub fn count_children(children: &Children) -> TreeStats {
    children.values().map(Node::stats).sum()
}

/// Folder and file totals of a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign, Sum)]
pub struct TreeStats {
    pub folders: usize,
    pub files: usize,
}

impl TreeStats {
    const FOLDER: TreeStats = TreeStats {
        folders: 1,
        files: 0,
    };
    const FILE: TreeStats = TreeStats {
        folders: 0,
        files: 1,
    };

    pub fn total(&self) -> usize {
        self.folders + self.files
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} {}",
            self.folders,
            if self.folders == 1 { "folder" } else { "folders" },
            self.files,
            if self.files == 1 { "file" } else { "files" },
        )
    }
}

// Maps are folders, anything else is a file. Scalars other than strings are
// kept in their textual form and `null` becomes an empty description.
impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a folder mapping or a file description")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut children = Children::new();
        while let Some((name, node)) = map.next_entry::<String, Node>()? {
            if children.contains_key(&name) {
                return Err(de::Error::custom(format!("duplicate entry name '{name}'")));
            }
            children.insert(name, node);
        }
        Ok(Node::Folder(children))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::File(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::File(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::File(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::File(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::File(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::File(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::File(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::File(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn folder(entries: Vec<(&str, Node)>) -> Node {
        Node::Folder(
            entries
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        )
    }

    #[test]
    fn empty_folder_counts_as_one_folder() {
        assert_eq!(
            Node::empty_folder().stats(),
            TreeStats {
                folders: 1,
                files: 0
            }
        );
    }

    #[test]
    fn stats_count_nested_entries() {
        let node = folder(vec![
            ("index.js", Node::file("Entry point")),
            (
                "components",
                folder(vec![
                    ("Button.tsx", Node::file("Button")),
                    ("forms", Node::empty_folder()),
                ]),
            ),
        ]);
        assert_eq!(
            node.stats(),
            TreeStats {
                folders: 3,
                files: 2
            }
        );
        assert_eq!(node.stats().total(), 5);
    }

    #[test]
    fn entries_list_folders_before_files_in_insertion_order() {
        let node = folder(vec![
            ("README.md", Node::file("Docs")),
            ("src", Node::empty_folder()),
            ("package.json", Node::file("Manifest")),
            ("public", Node::empty_folder()),
        ]);
        let names = node
            .entries()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["src", "public", "README.md", "package.json"]);
    }

    #[test]
    fn file_has_no_entries() {
        assert!(Node::file("leaf").entries().is_empty());
    }

    #[test]
    fn deserializes_nested_structure_in_document_order() {
        let json = r#"{"zeta": "last letter", "alpha": {"b.js": "B", "a.js": "A"}}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let children = node.children().unwrap();
        assert_eq!(children.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
        let alpha = children.get("alpha").unwrap().children().unwrap();
        assert_eq!(alpha.keys().collect::<Vec<_>>(), ["b.js", "a.js"]);
    }

    #[rstest]
    #[case("42", "42")]
    #[case("true", "true")]
    #[case("null", "")]
    #[case("\"Handles auth\"", "Handles auth")]
    fn scalar_leaves_become_descriptions(#[case] json: &str, #[case] expected: &str) {
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node, Node::file(expected));
    }

    #[test]
    fn arrays_are_rejected() {
        let result = serde_json::from_str::<Node>(r#"["a", "b"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn serializes_folders_as_objects_and_files_as_strings() {
        let node = folder(vec![
            ("controllers", folder(vec![("auth.js", Node::file("Auth"))])),
            ("server.js", Node::file("Entry")),
        ]);
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"controllers":{"auth.js":"Auth"},"server.js":"Entry"}"#
        );
    }

    #[test]
    fn stats_display() {
        let stats = TreeStats {
            folders: 1,
            files: 3,
        };
        assert_eq!(stats.to_string(), "1 folder, 3 files");
    }
}
