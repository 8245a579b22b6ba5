//! scikit-learn tree estimator support.
//!
//! This module provides the input-facing data contract for fitted
//! scikit-learn trees ([`Estimator`], [`TreeEstimator`], [`TreeState`]) and
//! the translation of their flat node arrays into a CART [`Tree`](crate::repr::cart::Tree).
//!
//! # JSON format
//!
//! Estimators are read from a JSON object holding the estimator class name
//! and its fitted attributes:
//!
//! ```json
//! {
//!   "type": "DecisionTreeClassifier",
//!   "n_features_in_": 4,
//!   "n_outputs_": 1,
//!   "n_classes_": 3,
//!   "classes_": [0, 1, 2],
//!   "tree_": { "nodes": [...], "values": [...] }
//! }
//! ```
//!
//! `tree_` is the tree's pickled state. Each node is either an object with
//! `left_child`, `right_child`, `feature` and `threshold` fields or a
//! positional record in scikit-learn's field order.

mod convert;
mod state;

pub use convert::ConversionError;
pub use state::{
    ClassCount, ClassLabel, Estimator, NodeRecord, TREE_LEAF, TREE_UNDEFINED, TreeEstimator,
    TreeState,
};
