//! Nested tree output
//!
//! Children are grouped under their parent in input order, then nodes are
//! assembled bottom-up from an explicit work stack. Building, the traversal
//! helpers on [`TreeNode`] and dropping a tree all run in constant native
//! stack. The derived `Clone`, `PartialEq`, `Debug`, `Serialize` and
//! `Deserialize` impls still recurse once per level.

use serde::{Deserialize, Serialize};

use crate::element::Metadata;
use crate::error::StructuralError;
use crate::validate::ValidatedSet;

/// A node of the nested tree. Children are owned; there are no parent links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Element identifier
    pub identifier: String,

    /// Passthrough fields of the element
    pub metadata: Metadata,

    /// Children in input order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node.
    pub fn leaf(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            metadata: Metadata::new(),
            children: Vec::new(),
        }
    }

    /// Identifiers of the direct children.
    pub fn child_ids(&self) -> Vec<&str> {
        self.children
            .iter()
            .map(|child| child.identifier.as_str())
            .collect()
    }

    /// Check if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal of this node and everything below it.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Find a node by identifier in this subtree.
    pub fn find(&self, identifier: &str) -> Option<&TreeNode> {
        self.iter().find(|node| node.identifier == identifier)
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        // Detach descendants onto the heap so each node drops childless.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over a [`TreeNode`] subtree.
#[derive(Debug)]
pub struct Preorder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// The tree as returned by a build.
///
/// A single-root config gives `Single`; forest mode, or any expected root
/// count other than one, gives `Forest` with roots in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeOutput {
    /// The one root of a single tree
    Single(TreeNode),

    /// Roots of a forest, in the order they were first encountered
    Forest(Vec<TreeNode>),
}

impl TreeOutput {
    /// All roots as a slice (one element for `Single`).
    pub fn roots(&self) -> &[TreeNode] {
        match self {
            TreeOutput::Single(root) => std::slice::from_ref(root),
            TreeOutput::Forest(roots) => roots,
        }
    }

    /// The root of a single tree.
    pub fn as_single(&self) -> Option<&TreeNode> {
        match self {
            TreeOutput::Single(root) => Some(root),
            TreeOutput::Forest(_) => None,
        }
    }

    /// Consume and return every root.
    pub fn into_roots(self) -> Vec<TreeNode> {
        match self {
            TreeOutput::Single(root) => vec![root],
            TreeOutput::Forest(roots) => roots,
        }
    }

    /// Total nodes across all roots.
    pub fn node_count(&self) -> usize {
        self.roots().iter().map(TreeNode::node_count).sum()
    }

    /// Find a node by identifier under any root.
    pub fn find(&self, identifier: &str) -> Option<&TreeNode> {
        self.roots().iter().find_map(|root| root.find(identifier))
    }
}

/// Assemble the nested tree.
///
/// Fails with [`StructuralError::UnresolvedPath`] only for sets built with
/// [`ValidatedSet::assume_valid`] that hold a dangling parent or a cycle
/// (nodes on a cycle are never reached from a root).
pub fn build_tree(set: &ValidatedSet) -> Result<TreeOutput, StructuralError> {
    let elements = set.elements();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); elements.len()];
    for pos in 0..elements.len() {
        match set.parent_position(pos) {
            Ok(None) => {}
            Ok(Some(parent)) => children[parent].push(pos),
            Err(missing) => {
                return Err(StructuralError::UnresolvedPath {
                    identifier: elements[pos].identifier.clone(),
                    reason: format!("parent '{}' does not exist", missing),
                });
            }
        }
    }

    let mut built: Vec<Option<TreeNode>> = (0..elements.len()).map(|_| None).collect();
    let mut attached = vec![false; elements.len()];
    let mut roots = Vec::with_capacity(set.root_positions().len());

    for &root in set.root_positions() {
        // (position, children already pushed)
        let mut stack = vec![(root, false)];
        while let Some((pos, expanded)) = stack.pop() {
            if !expanded {
                stack.push((pos, true));
                stack.extend(children[pos].iter().rev().map(|&child| (child, false)));
                continue;
            }

            let mut nodes = Vec::with_capacity(children[pos].len());
            for &child in &children[pos] {
                if let Some(node) = built[child].take() {
                    nodes.push(node);
                }
            }
            built[pos] = Some(TreeNode {
                identifier: elements[pos].identifier.clone(),
                metadata: elements[pos].metadata.clone(),
                children: nodes,
            });
            attached[pos] = true;
        }

        if let Some(node) = built[root].take() {
            roots.push(node);
        }
    }

    if let Some(stray) = attached.iter().position(|&done| !done) {
        return Err(StructuralError::UnresolvedPath {
            identifier: elements[stray].identifier.clone(),
            reason: "element is not reachable from any root".to_string(),
        });
    }
    tracing::debug!(roots = roots.len(), nodes = elements.len(), "taxonomy tree assembled");

    if set.config().yields_single_tree() {
        match roots.pop() {
            Some(root) if roots.is_empty() => Ok(TreeOutput::Single(root)),
            _ => Err(StructuralError::RootCountMismatch {
                expected: 1,
                roots: set.roots().map(|e| e.identifier.clone()).collect(),
            }),
        }
    } else {
        Ok(TreeOutput::Forest(roots))
    }
}
