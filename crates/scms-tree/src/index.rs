//! Numbered outline of a rendered tree.

use serde::Serialize;

use crate::{NodeLink, RenderedTree, TreeNode};

/// One line of a numbered index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Outline number such as `2.1.3`.
    pub number: String,
    /// Nesting depth, 1 for children of the root.
    pub depth: usize,
    /// Display label.
    pub label: String,
    /// Link target.
    pub link: NodeLink,
}

/// Flatten `tree` into numbered entries in pre-order.
///
/// The root is the document the index belongs to and is not listed; its
/// children are numbered `1`, `2`, … and their children `1.1`, `1.2`, ….
#[must_use]
pub fn numbered_index(tree: &RenderedTree) -> Vec<IndexEntry> {
    let mut entries = Vec::new();
    let mut prefix = Vec::new();
    push_children(tree.root(), &mut prefix, &mut entries);
    entries
}

fn push_children(node: &TreeNode, prefix: &mut Vec<usize>, entries: &mut Vec<IndexEntry>) {
    for (i, child) in node.children().iter().enumerate() {
        prefix.push(i + 1);
        entries.push(IndexEntry {
            number: prefix
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("."),
            depth: prefix.len(),
            label: child.label().to_owned(),
            link: child.link().clone(),
        });
        push_children(child, prefix, entries);
        prefix.pop();
    }
}
