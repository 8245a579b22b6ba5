//! Conversion between runtime types and schema types.

use super::PersistError;
use super::schema::{ColumnSchema, ColumnTypeSchema, LeafValueSchema, NodeSchema, ObjectiveSchema};
use crate::repr::cart::{ColumnSpec, ColumnType, HigherThanCondition, LeafValue, Node, Objective, Tree};

// =============================================================================
// Objective
// =============================================================================

impl From<&Objective> for ObjectiveSchema {
    fn from(obj: &Objective) -> Self {
        match obj {
            Objective::Regression { label } => Self::Regression {
                label: label.clone(),
            },
            Objective::Classification { label, classes } => Self::Classification {
                label: label.clone(),
                classes: classes.clone(),
            },
        }
    }
}

impl TryFrom<ObjectiveSchema> for Objective {
    type Error = PersistError;

    fn try_from(schema: ObjectiveSchema) -> Result<Self, Self::Error> {
        match schema {
            ObjectiveSchema::Regression { label } => Ok(Self::Regression { label }),
            ObjectiveSchema::Classification { classes, .. } if classes.is_empty() => Err(
                PersistError::Validation("classification objective has no classes".into()),
            ),
            ObjectiveSchema::Classification { label, classes } => {
                Ok(Self::Classification { label, classes })
            }
        }
    }
}

// =============================================================================
// Columns
// =============================================================================

impl From<&ColumnSpec> for ColumnSchema {
    fn from(spec: &ColumnSpec) -> Self {
        Self {
            name: spec.name.clone(),
            col_idx: spec.col_idx,
            column_type: match spec.column_type {
                ColumnType::Numerical => ColumnTypeSchema::Numerical,
            },
        }
    }
}

impl TryFrom<ColumnSchema> for ColumnSpec {
    type Error = PersistError;

    fn try_from(schema: ColumnSchema) -> Result<Self, Self::Error> {
        if ColumnSpec::parse_index(&schema.name) != Some(schema.col_idx) {
            return Err(PersistError::Validation(format!(
                "input feature '{}' does not name column {}",
                schema.name, schema.col_idx
            )));
        }
        Ok(match schema.column_type {
            ColumnTypeSchema::Numerical => ColumnSpec::numerical(schema.col_idx),
        })
    }
}

// =============================================================================
// Leaf values
// =============================================================================

impl From<&LeafValue> for LeafValueSchema {
    fn from(value: &LeafValue) -> Self {
        match value {
            LeafValue::Regression(v) => Self::Regression { value: *v },
            LeafValue::Probability(p) => Self::Probability {
                distribution: p.clone(),
            },
        }
    }
}

impl From<LeafValueSchema> for LeafValue {
    fn from(schema: LeafValueSchema) -> Self {
        match schema {
            LeafValueSchema::Regression { value } => Self::Regression(value),
            LeafValueSchema::Probability { distribution } => Self::Probability(distribution),
        }
    }
}

// =============================================================================
// Tree
// =============================================================================

/// Flatten a tree into pre-order (node, negative subtree, positive subtree).
pub(super) fn tree_to_nodes(tree: &Tree) -> Vec<NodeSchema> {
    let mut nodes = Vec::with_capacity(tree.n_nodes());
    tree.visit_preorder(|node| {
        nodes.push(match node {
            Node::Leaf(leaf) => NodeSchema::Leaf {
                value: (&leaf.value).into(),
            },
            Node::Decision(decision) => NodeSchema::HigherThan {
                attribute: decision.condition.feature.col_idx,
                threshold: decision.condition.threshold,
                na_value: decision.condition.missing_evaluation,
            },
        });
    });
    nodes
}

/// Rebuild a tree from its pre-order node list.
///
/// The list must describe exactly one complete tree.
pub(super) fn nodes_to_tree(nodes: Vec<NodeSchema>) -> Result<Tree, PersistError> {
    let n_nodes = nodes.len();
    let mut cursor = nodes.into_iter();
    // Open decision nodes, each with its negative subtree once that is read.
    let mut open: Vec<(HigherThanCondition, Option<Node>)> = Vec::new();

    while let Some(schema) = cursor.next() {
        let mut node = match schema {
            NodeSchema::Leaf { value } => Node::leaf(value.into()),
            NodeSchema::HigherThan {
                attribute,
                threshold,
                na_value,
            } => {
                let condition =
                    HigherThanCondition::new(ColumnSpec::numerical(attribute), threshold, na_value);
                open.push((condition, None));
                continue;
            }
        };

        // Attach the finished subtree, closing every parent it completes.
        loop {
            match open.pop() {
                None => {
                    let trailing = cursor.len();
                    if trailing > 0 {
                        return Err(PersistError::Validation(format!(
                            "{trailing} of {n_nodes} nodes are not reachable from the root"
                        )));
                    }
                    return Ok(Tree::new(node));
                }
                Some((condition, None)) => {
                    open.push((condition, Some(node)));
                    break;
                }
                Some((condition, Some(neg))) => node = Node::decision(condition, node, neg),
            }
        }
    }

    Err(PersistError::Validation("node list ends inside a subtree".into()))
}

/// Check that every leaf matches the objective's kind and output width, and
/// that every stored number is finite.
///
/// JSON has no encoding for NaN or infinity, so such values could not be
/// read back.
pub(super) fn validate_tree(objective: &Objective, tree: &Tree) -> Result<(), PersistError> {
    let expected = objective.n_outputs();
    for value in tree.leaf_values() {
        let kind_matches = matches!(
            (objective, value),
            (Objective::Regression { .. }, LeafValue::Regression(_))
                | (Objective::Classification { .. }, LeafValue::Probability(_))
        );
        if !kind_matches {
            return Err(PersistError::Validation(format!(
                "leaf value {value:?} does not fit a {} objective",
                objective.task()
            )));
        }
        if value.n_outputs() != expected {
            return Err(PersistError::Validation(format!(
                "leaf has {} outputs, objective expects {expected}",
                value.n_outputs()
            )));
        }
        if value.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(PersistError::Validation(format!(
                "leaf value {value:?} is not finite"
            )));
        }
    }

    let mut threshold = None;
    tree.visit_preorder(|node| {
        if let Node::Decision(d) = node {
            if threshold.is_none() && !d.condition.threshold.is_finite() {
                threshold = Some((d.condition.feature.col_idx, d.condition.threshold));
            }
        }
    });
    if let Some((col_idx, t)) = threshold {
        return Err(PersistError::Validation(format!(
            "split on column {col_idx} has non-finite threshold {t}"
        )));
    }
    Ok(())
}
