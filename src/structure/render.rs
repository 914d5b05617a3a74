use colored::Colorize;

use super::node::{Node, sorted_entries};
use super::tree::DirectoryTree;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Draws a directory structure as an indented text tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeRenderer {
    color: bool,
}

impl TreeRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render_tree(&self, tree: &DirectoryTree) -> String {
        let mut out = String::new();
        self.render_entries(tree.entries(), "", &mut out);
        out
    }

    /// Renders a single entry with `name` as the header line.
    pub fn render_node(&self, name: &str, node: &Node) -> String {
        let mut out = self.entry_label(name, node);
        out.push('\n');
        self.render_entries(node.entries(), "", &mut out);
        out
    }

    fn render_entries(&self, entries: Vec<(&str, &Node)>, prefix: &str, out: &mut String) {
        let count = entries.len();
        for (i, (name, node)) in entries.into_iter().enumerate() {
            let last = i + 1 == count;
            out.push_str(prefix);
            out.push_str(if last { LAST_BRANCH } else { BRANCH });
            out.push_str(&self.entry_label(name, node));
            out.push('\n');

            if let Node::Folder(children) = node {
                let child_prefix = format!("{prefix}{}", if last { SPACE } else { PIPE });
                self.render_entries(sorted_entries(children), &child_prefix, out);
            }
        }
    }

    fn entry_label(&self, name: &str, node: &Node) -> String {
        match node {
            Node::Folder(_) => {
                let label = format!("{name}/");
                if self.color {
                    label.blue().bold().to_string()
                } else {
                    label
                }
            }
            Node::File(description) if description.is_empty() => name.to_string(),
            Node::File(description) => {
                if self.color {
                    format!("{name}: {}", description.dimmed())
                } else {
                    format!("{name}: {description}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DirectoryTree {
        let raw = r#"{
            "frontend": {
                "index.js": "Entry point",
                "components": { "Button.tsx": "Button", "forms": {} }
            },
            "shared": { "README.md": "" }
        }"#;
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn renders_folders_first_with_connectors() {
        let rendered = TreeRenderer::new(false).render_tree(&sample());
        let expected = "\
├── frontend/
│   ├── components/
│   │   ├── forms/
│   │   └── Button.tsx: Button
│   └── index.js: Entry point
└── shared/
    └── README.md
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn renders_subtree_with_header() {
        let tree = sample();
        let components = tree
            .get(&"frontend.components".parse().unwrap())
            .unwrap();
        let rendered = TreeRenderer::new(false).render_node("components", components);
        assert_eq!(rendered, "components/\n├── forms/\n└── Button.tsx: Button\n");
    }

    #[test]
    fn renders_empty_tree_as_nothing() {
        assert_eq!(TreeRenderer::default().render_tree(&DirectoryTree::new()), "");
    }
}
