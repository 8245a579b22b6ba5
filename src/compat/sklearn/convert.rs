//! Conversion from scikit-learn flat tree state to a CART [`Tree`].

use fixedbitset::FixedBitSet;
use tracing::debug;

use super::state::{TREE_LEAF, TreeEstimator, TreeState};
use crate::model::TaskKind;
use crate::repr::cart::{ColumnSpec, HigherThanCondition, LeafValue, Node, Tree};

/// Error type for scikit-learn tree conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("estimator must be fit to data before converting")]
    NotFitted,
    #[error(
        "only scalar regression and single-label classification are supported (n_outputs = {n_outputs})"
    )]
    UnsupportedTask { n_outputs: usize },
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("tree has {nodes} nodes but {values} value rows")]
    ValuesLengthMismatch { nodes: usize, values: usize },
    #[error("node {node} has no value for its output")]
    MissingValue { node: usize },
    #[error("invalid node index: node {node} references child {child} but tree has {n_nodes} nodes")]
    InvalidNodeIndex {
        node: usize,
        child: i64,
        n_nodes: usize,
    },
    #[error("node {node} has exactly one child (left {left}, right {right})")]
    MismatchedChildren { node: usize, left: i64, right: i64 },
    #[error("node {node} is reachable along more than one path")]
    NodeRevisited { node: usize },
    #[error("node {node} splits on feature {feature} but the estimator declares {n_features} features")]
    InvalidFeature {
        node: usize,
        feature: i64,
        n_features: usize,
    },
    #[error("node {node} has {actual} class counts, expected {expected}")]
    ClassCountMismatch {
        node: usize,
        expected: usize,
        actual: usize,
    },
    #[error("failed to parse estimator: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read estimator: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeEstimator {
    /// Convert the fitted tree into a CART [`Tree`].
    ///
    /// Left children become negative branches and right children positive
    /// branches of a `feature > threshold` condition. Missing values evaluate
    /// to "not greater" and follow the negative branch.
    ///
    /// Classification counts are normalized to probabilities. A node whose
    /// counts are all zero yields NaN probabilities; fitted trees never
    /// contain such nodes.
    pub fn to_tree(&self) -> Result<Tree, ConversionError> {
        let state = self.tree.as_ref().ok_or(ConversionError::NotFitted)?;
        let task = self.task_kind();
        if !task.is_supported() {
            return Err(ConversionError::UnsupportedTask {
                n_outputs: self.n_outputs,
            });
        }
        if state.nodes.is_empty() {
            return Err(ConversionError::EmptyTree);
        }
        if state.values.len() != state.nodes.len() {
            return Err(ConversionError::ValuesLengthMismatch {
                nodes: state.nodes.len(),
                values: state.values.len(),
            });
        }

        let n_classes = self.classes.as_ref().map(Vec::len);
        let values = node_values(state, task, n_classes)?;

        let mut builder = TreeBuilder {
            state,
            values,
            n_features: self.n_features_in,
            visited: FixedBitSet::with_capacity(state.nodes.len()),
        };
        let tree = Tree::new(builder.build()?);

        debug!(
            n_nodes = state.nodes.len(),
            n_leaves = tree.n_leaves(),
            task = %task,
            "translated tree"
        );
        Ok(tree)
    }
}

/// Precompute the value of every node.
fn node_values(
    state: &TreeState,
    task: TaskKind,
    n_classes: Option<usize>,
) -> Result<Vec<LeafValue>, ConversionError> {
    state
        .values
        .iter()
        .enumerate()
        .map(|(node, outputs)| {
            let raw = outputs
                .first()
                .filter(|v| !v.is_empty())
                .ok_or(ConversionError::MissingValue { node })?;
            match task {
                TaskKind::ScalarRegression => Ok(LeafValue::Regression(raw[0] as f32)),
                TaskKind::SingleLabelClassification => {
                    if let Some(expected) = n_classes.filter(|&e| e != raw.len()) {
                        return Err(ConversionError::ClassCountMismatch {
                            node,
                            expected,
                            actual: raw.len(),
                        });
                    }
                    Ok(LeafValue::Probability(normalize(raw)))
                }
                TaskKind::Unknown => Err(ConversionError::UnsupportedTask {
                    n_outputs: outputs.len(),
                }),
            }
        })
        .collect()
}

/// Divide class counts by their sum.
fn normalize(counts: &[f64]) -> Vec<f32> {
    let total: f64 = counts.iter().sum();
    counts.iter().map(|&c| (c / total) as f32).collect()
}

/// Largest `f32` that is `<=` `threshold`.
///
/// For every finite or infinite `f32` input `x`, `x > result` holds exactly
/// when `x as f64 > threshold`.
fn threshold_to_f32(threshold: f64) -> f32 {
    let rounded = threshold as f32;
    if f64::from(rounded) > threshold {
        next_down_f32(rounded)
    } else {
        rounded
    }
}

#[inline]
fn next_down_f32(x: f32) -> f32 {
    if x.is_nan() || x == f32::NEG_INFINITY {
        return x;
    }

    if x == 0.0 {
        // nextafter(±0.0, -inf) = smallest negative subnormal
        return -f32::from_bits(1);
    }

    let bits = x.to_bits();
    if x > 0.0 {
        f32::from_bits(bits - 1)
    } else {
        f32::from_bits(bits + 1)
    }
}

/// Pending work while walking the flat node arrays.
enum Step {
    /// Validate node `index`, reached from `parent`, and schedule its children.
    Enter { index: i64, parent: usize },
    /// Both children of `node` are built; assemble the decision node.
    Assemble { node: usize },
}

/// Translation state.
///
/// The walk uses an explicit stack, so arbitrarily deep trees convert
/// without growing the call stack.
struct TreeBuilder<'a> {
    state: &'a TreeState,
    values: Vec<LeafValue>,
    n_features: usize,
    visited: FixedBitSet,
}

impl TreeBuilder<'_> {
    /// Convert the tree rooted at node 0.
    ///
    /// Left children are visited before right children, so errors are
    /// reported in the same order a depth-first walk would find them.
    fn build(&mut self) -> Result<Node, ConversionError> {
        let mut steps = vec![Step::Enter {
            index: 0,
            parent: 0,
        }];
        // Finished subtrees; a decision node's negative child sits below its
        // positive child.
        let mut built: Vec<Node> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter { index, parent } => {
                    let idx = self.enter(index, parent)?;
                    let record = self.state.nodes[idx];
                    if record.left_child == TREE_LEAF {
                        built.push(Node::leaf(self.values[idx].clone()));
                    } else {
                        steps.push(Step::Assemble { node: idx });
                        steps.push(Step::Enter {
                            index: record.right_child,
                            parent: idx,
                        });
                        steps.push(Step::Enter {
                            index: record.left_child,
                            parent: idx,
                        });
                    }
                }
                Step::Assemble { node } => {
                    let (Some(pos_child), Some(neg_child)) = (built.pop(), built.pop()) else {
                        unreachable!("children are built before their parent");
                    };
                    let condition = self.condition(node)?;
                    built.push(Node::decision(condition, pos_child, neg_child));
                }
            }
        }

        built.pop().ok_or(ConversionError::EmptyTree)
    }

    /// Validate a child reference and mark the node visited.
    fn enter(&mut self, index: i64, parent: usize) -> Result<usize, ConversionError> {
        let n_nodes = self.state.nodes.len();
        let idx = usize::try_from(index)
            .ok()
            .filter(|&i| i < n_nodes)
            .ok_or(ConversionError::InvalidNodeIndex {
                node: parent,
                child: index,
                n_nodes,
            })?;
        if self.visited.put(idx) {
            return Err(ConversionError::NodeRevisited { node: idx });
        }

        let record = self.state.nodes[idx];
        if (record.left_child == TREE_LEAF) != (record.right_child == TREE_LEAF) {
            return Err(ConversionError::MismatchedChildren {
                node: idx,
                left: record.left_child,
                right: record.right_child,
            });
        }
        Ok(idx)
    }

    /// Split condition of internal node `idx`.
    fn condition(&self, idx: usize) -> Result<HigherThanCondition, ConversionError> {
        let record = self.state.nodes[idx];
        let feature = usize::try_from(record.feature)
            .ok()
            .filter(|&f| f < self.n_features)
            .ok_or(ConversionError::InvalidFeature {
                node: idx,
                feature: record.feature,
                n_features: self.n_features,
            })?;
        Ok(HigherThanCondition::new(
            ColumnSpec::numerical(feature),
            threshold_to_f32(record.threshold),
            false,
        ))
    }
}
