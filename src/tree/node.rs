//! Generic name-keyed mergeable tree.
//!
//! Each node is addressed by a qualified call-site name and holds optional
//! typed data plus named children. Merging two trees recursively unions
//! children by name and merges data where both sides have it, so trees
//! built by independent recording sessions combine into one dataset.

use crate::tree::collection::{Mergeable, MergeableCollection};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// A tree node addressed by name, holding optional data and named children.
///
/// **Public** - the shape the recorder builds and the cleaner transforms
///
/// Within one node, child names are unique. The root conventionally has no
/// data, only children representing top-level call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeableNode<T> {
    name: String,
    data: Option<T>,
    children: HashMap<String, MergeableNode<T>>,
}

impl<T> MergeableNode<T> {
    /// Create a node with no data
    ///
    /// **Public** - constructor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
            children: HashMap::new(),
        }
    }

    /// Create a node carrying data
    pub fn with_data(name: impl Into<String>, data: T) -> Self {
        Self {
            name: name.into(),
            data: Some(data),
            children: HashMap::new(),
        }
    }

    /// Qualified call-site name of this node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This node's data, if any
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Child node by name
    pub fn child(&self, name: &str) -> Option<&MergeableNode<T>> {
        self.children.get(name)
    }

    /// Iterate over the children (no ordering guarantee)
    pub fn children(&self) -> impl Iterator<Item = &MergeableNode<T>> {
        self.children.values()
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Descend along a path of names, returning the addressed node if the
    /// whole path exists.
    ///
    /// **Public** - read-side addressing, used by consumers and tests
    pub fn node_at<'a>(&self, path: impl IntoIterator<Item = &'a str>) -> Option<&MergeableNode<T>> {
        let mut current = self;
        for name in path {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Descend along a path of names, creating missing nodes on the way,
    /// and return the addressed node mutably.
    ///
    /// **Public** - write-side addressing, used by the recorder's writer
    pub fn ensure_path<'a>(
        &mut self,
        path: impl IntoIterator<Item = &'a str>,
    ) -> &mut MergeableNode<T> {
        let mut current = self;
        for name in path {
            current = current
                .children
                .entry(name.to_string())
                .or_insert_with(|| MergeableNode::new(name));
        }
        current
    }

    /// Total number of nodes in this subtree, including this one
    pub fn count_nodes(&self) -> usize {
        1 + self.children.values().map(MergeableNode::count_nodes).sum::<usize>()
    }

    /// Transform this tree into an isomorphic tree with mapped data.
    ///
    /// **Public** - how the outlier cleaner produces its output tree
    ///
    /// Nodes without data pass through with `data = None`. The input tree
    /// is not mutated.
    pub fn map<U>(&self, f: &impl Fn(&T) -> U) -> MergeableNode<U> {
        MergeableNode {
            name: self.name.clone(),
            data: self.data.as_ref().map(f),
            children: self
                .children
                .iter()
                .map(|(name, child)| (name.clone(), child.map(f)))
                .collect(),
        }
    }
}

impl<T: Mergeable> MergeableNode<T> {
    /// Merge data into this node, initializing it if absent
    pub fn merge_data(&mut self, data: T) {
        match &mut self.data {
            Some(existing) => existing.merge(data),
            None => self.data = Some(data),
        }
    }

    /// Tree-shaped merge: data merges at matching nodes, children merge by
    /// name, and a child present on only one side is adopted as-is.
    ///
    /// **Public** - combines trees from independent recording sessions
    pub fn merge(&mut self, other: MergeableNode<T>) {
        debug!("merging tree node '{}' ({} children in)", self.name, other.children.len());

        if let Some(data) = other.data {
            self.merge_data(data);
        }

        for (name, child) in other.children {
            match self.children.entry(name) {
                Entry::Occupied(entry) => entry.into_mut().merge(child),
                Entry::Vacant(entry) => {
                    entry.insert(child);
                }
            }
        }
    }
}

impl<T> MergeableNode<MergeableCollection<T>> {
    /// Total number of samples held anywhere in this subtree
    pub fn total_samples(&self) -> usize {
        self.data.as_ref().map_or(0, MergeableCollection::len)
            + self
                .children
                .values()
                .map(MergeableNode::total_samples)
                .sum::<usize>()
    }
}

impl<T: fmt::Display> MergeableNode<T> {
    // Children are sorted by name so the dump is stable across runs.
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match &self.data {
            Some(data) => writeln!(f, "{}{} [{}]", "  ".repeat(depth), self.name, data)?,
            None => writeln!(f, "{}{}", "  ".repeat(depth), self.name)?,
        }

        let mut names: Vec<&String> = self.children.keys().collect();
        names.sort();
        for name in names {
            self.children[name].fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for MergeableNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tree = MergeableNode<MergeableCollection<i64>>;

    fn tree_with(path: &[&str], samples: Vec<i64>) -> Tree {
        let mut root = Tree::new("root");
        root.ensure_path(path.iter().copied())
            .merge_data(MergeableCollection::from(samples));
        root
    }

    #[test]
    fn test_ensure_path_creates_chain() {
        let mut root = Tree::new("root");
        let leaf = root.ensure_path(["a", "b", "c"]);
        assert_eq!(leaf.name(), "c");
        assert_eq!(root.count_nodes(), 4);
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.children().count(), 1);
    }

    #[test]
    fn test_node_at_missing_path() {
        let root = tree_with(&["a", "b"], vec![1]);
        assert!(root.node_at(["a", "b"]).is_some());
        assert!(root.node_at(["a", "x"]).is_none());
    }

    #[test]
    fn test_merge_preserves_every_leaf_sample() {
        let mut left = tree_with(&["a", "b"], vec![1, 2]);
        let mut right = tree_with(&["a", "b"], vec![3]);
        right
            .ensure_path(["a", "c"])
            .merge_data(MergeableCollection::from(vec![4]));

        left.merge(right);

        assert_eq!(left.total_samples(), 4);
        assert_eq!(left.node_at(["a", "b"]).unwrap().data().unwrap().len(), 3);
        assert_eq!(left.node_at(["a", "c"]).unwrap().data().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_with_empty_tree_is_identity() {
        let mut tree = tree_with(&["a"], vec![1, 2, 3]);
        tree.merge(Tree::new("root"));

        assert_eq!(tree.total_samples(), 3);
        assert_eq!(tree.count_nodes(), 2);
    }

    #[test]
    fn test_merge_absent_data_side_contributes_nothing() {
        let mut bare = Tree::new("root");
        bare.ensure_path(["a"]);

        let mut with_data = tree_with(&["a"], vec![5]);
        with_data.merge(bare);

        assert_eq!(with_data.node_at(["a"]).unwrap().data().unwrap().len(), 1);
    }

    #[test]
    fn test_with_data_node_merges_like_any_other() {
        let mut a: Tree = MergeableNode::with_data("root", MergeableCollection::from(vec![1]));
        let b: Tree = MergeableNode::with_data("root", MergeableCollection::from(vec![2, 3]));

        a.merge(b);
        assert_eq!(a.data().unwrap().len(), 3);
    }

    #[test]
    fn test_map_preserves_structure() {
        let tree = tree_with(&["a", "b"], vec![1, 2, 3]);

        let mapped: MergeableNode<usize> = tree.map(&|c| c.len());

        assert_eq!(mapped.count_nodes(), tree.count_nodes());
        assert_eq!(mapped.node_at(["a", "b"]).unwrap().data(), Some(&3));
        assert_eq!(mapped.node_at(["a"]).unwrap().data(), None);
        // Original untouched
        assert_eq!(tree.total_samples(), 3);
    }

    #[test]
    fn test_display_is_sorted_and_indented() {
        let mut root = tree_with(&["b"], vec![1]);
        root.ensure_path(["a"])
            .merge_data(MergeableCollection::from(vec![2, 3]));

        let dump = root.to_string();
        assert_eq!(dump, "root\n  a [2 samples]\n  b [1 samples]\n");
    }
}
