//! Pointer-based decision tree and traversal.

use std::collections::BTreeSet;

use ndarray::ArrayView1;

use super::node::Node;
use super::value::LeafValue;

// ============================================================================
// FeatureLookup
// ============================================================================

/// Random access to the feature values of one sample.
///
/// Columns that the sample does not provide read as NaN.
pub trait FeatureLookup {
    fn feature(&self, col_idx: usize) -> f32;
}

impl FeatureLookup for [f32] {
    #[inline]
    fn feature(&self, col_idx: usize) -> f32 {
        self.get(col_idx).copied().unwrap_or(f32::NAN)
    }
}

impl FeatureLookup for Vec<f32> {
    #[inline]
    fn feature(&self, col_idx: usize) -> f32 {
        self.as_slice().feature(col_idx)
    }
}

impl FeatureLookup for ArrayView1<'_, f32> {
    #[inline]
    fn feature(&self, col_idx: usize) -> f32 {
        self.get(col_idx).copied().unwrap_or(f32::NAN)
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A single CART tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Visit every node in pre-order: node, negative subtree, positive subtree.
    pub fn visit_preorder<F: FnMut(&Node)>(&self, mut f: F) {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            f(node);
            if let Node::Decision(d) = node {
                stack.push(&d.pos_child);
                stack.push(&d.neg_child);
            }
        }
    }

    /// Total number of nodes (internal + leaves).
    pub fn n_nodes(&self) -> usize {
        let mut n = 0;
        self.visit_preorder(|_| n += 1);
        n
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        let mut n = 0;
        self.visit_preorder(|node| {
            if node.is_leaf() {
                n += 1;
            }
        });
        n
    }

    /// All leaf values in pre-order.
    pub fn leaf_values(&self) -> Vec<&LeafValue> {
        let mut stack = vec![&self.root];
        let mut out = Vec::new();
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(leaf) => out.push(&leaf.value),
                Node::Decision(d) => {
                    stack.push(&d.pos_child);
                    stack.push(&d.neg_child);
                }
            }
        }
        out
    }

    /// Column indices referenced by at least one split.
    pub fn used_features(&self) -> BTreeSet<usize> {
        let mut features = BTreeSet::new();
        self.visit_preorder(|node| {
            if let Node::Decision(d) = node {
                features.insert(d.condition.feature.col_idx);
            }
        });
        features
    }

    /// Number of outputs produced per sample, taken from the first leaf.
    pub fn n_outputs(&self) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => return leaf.value.n_outputs(),
                Node::Decision(d) => node = &d.neg_child,
            }
        }
    }

    /// Route a sample from the root to a leaf and return its value.
    #[inline]
    pub fn predict_row<S: FeatureLookup + ?Sized>(&self, sample: &S) -> &LeafValue {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => return &leaf.value,
                Node::Decision(d) => {
                    let value = sample.feature(d.condition.feature.col_idx);
                    node = if d.condition.evaluate(value) {
                        &d.pos_child
                    } else {
                        &d.neg_child
                    };
                }
            }
        }
    }
}
