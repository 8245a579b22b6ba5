//! Tree node types.

use super::condition::HigherThanCondition;
use super::value::LeafValue;

/// A node of a CART tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Internal node routing to one of two children.
    Decision(DecisionNode),
    /// Terminal node holding the prediction.
    Leaf(LeafNode),
}

/// Internal node: `condition` true routes to `pos_child`, false to `neg_child`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub condition: HigherThanCondition,
    pub pos_child: Box<Node>,
    pub neg_child: Box<Node>,
}

impl Drop for DecisionNode {
    // Tear down subtrees with a work list so deep trees do not exhaust the
    // call stack.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach(&mut self.pos_child, &mut pending);
        detach(&mut self.neg_child, &mut pending);
        while let Some(mut node) = pending.pop() {
            if let Node::Decision(d) = &mut *node {
                detach(&mut d.pos_child, &mut pending);
                detach(&mut d.neg_child, &mut pending);
            }
        }
    }
}

/// Move a decision child onto `pending`, leaving an empty leaf behind.
fn detach(child: &mut Box<Node>, pending: &mut Vec<Box<Node>>) {
    if !child.is_leaf() {
        pending.push(std::mem::replace(
            child,
            Box::new(Node::leaf(LeafValue::Regression(0.0))),
        ));
    }
}

/// Terminal node.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub value: LeafValue,
}

impl Node {
    /// Create a leaf node.
    pub fn leaf(value: LeafValue) -> Self {
        Self::Leaf(LeafNode { value })
    }

    /// Create a decision node.
    pub fn decision(condition: HigherThanCondition, pos_child: Node, neg_child: Node) -> Self {
        Self::Decision(DecisionNode {
            condition,
            pos_child: Box::new(pos_child),
            neg_child: Box::new(neg_child),
        })
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::cart::ColumnSpec;

    #[test]
    fn deep_chain_drops() {
        let mut node = Node::leaf(LeafValue::Regression(0.0));
        for i in 0..200_000 {
            node = Node::decision(
                HigherThanCondition::new(ColumnSpec::numerical(0), i as f32, false),
                node,
                Node::leaf(LeafValue::Regression(1.0)),
            );
        }
        assert!(!node.is_leaf());
        drop(node);
    }
}
