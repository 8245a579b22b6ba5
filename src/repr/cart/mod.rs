//! Single-tree CART representation.
//!
//! A [`Tree`] owns its nodes top-down. Each [`Node`] is either a
//! [`DecisionNode`] testing a [`HigherThanCondition`] and routing to one of two
//! owned children, or a [`LeafNode`] holding a [`LeafValue`].
//!
//! The [`Objective`] describes the prediction task the tree was built for and
//! decides which [`LeafValue`] variant its leaves carry.

pub mod condition;
pub mod dataspec;
pub mod node;
pub mod objective;
pub mod tree;
pub mod value;

pub use condition::HigherThanCondition;
pub use dataspec::{ColumnSpec, ColumnType};
pub use node::{DecisionNode, LeafNode, Node};
pub use objective::Objective;
pub use tree::Tree;
pub use value::LeafValue;
