//! Schema types for CART model artifacts.
//!
//! These types define the on-disk JSON layout independently of the runtime
//! types in [`crate::repr::cart`], so the format can evolve separately and be
//! validated when it is read back.
//!
//! An artifact is a directory holding:
//!
//! - `header.json`: [`HeaderSchema`]
//! - `nodes.json`: [`NodesSchema`], the tree in pre-order
//!   (node, negative subtree, positive subtree)
//! - `done`: empty marker written last

use serde::{Deserialize, Serialize};

/// Format identifier stored in every header.
pub const FORMAT_NAME: &str = "treeport-cart";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

pub const HEADER_FILE: &str = "header.json";
pub const NODES_FILE: &str = "nodes.json";
pub const DONE_FILE: &str = "done";

/// Objective schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveSchema {
    Regression { label: String },
    Classification { label: String, classes: Vec<String> },
}

/// Column type schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTypeSchema {
    Numerical,
}

/// One model input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub col_idx: usize,
    #[serde(rename = "type")]
    pub column_type: ColumnTypeSchema,
}

/// Artifact header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderSchema {
    pub format: String,
    pub version: u32,
    pub objective: ObjectiveSchema,
    pub num_trees: usize,
    pub num_nodes: usize,
    /// Columns referenced by splits, sorted by `col_idx`.
    pub input_features: Vec<ColumnSchema>,
}

/// Leaf value schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeafValueSchema {
    Regression { value: f32 },
    Probability { distribution: Vec<f32> },
}

/// One node of the pre-order node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSchema {
    Leaf {
        value: LeafValueSchema,
    },
    /// `x[attribute] > threshold` routes to the positive child. Missing
    /// values evaluate to `na_value`.
    HigherThan {
        attribute: usize,
        threshold: f32,
        na_value: bool,
    },
}

/// Contents of `nodes.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesSchema {
    pub nodes: Vec<NodeSchema>,
}
