//! CART model reloaded from a persisted artifact.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};

use super::meta::TaskKind;
use super::signature::{InputSpec, Signature};
use crate::repr::cart::tree::FeatureLookup;
use crate::repr::cart::{ColumnSpec, Objective, Tree};

/// Errors raised when invoking a loaded model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("missing model input '{0}'")]
    MissingInput(String),
    #[error("model input '{name}' has {actual} rows, expected {expected}")]
    InputLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("input matrix has {actual} feature columns, expected {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}

/// A live single-tree model.
///
/// Invoked with one named batch vector per signature input. Output rows hold
/// one value for regression and one probability per class for classification.
#[derive(Debug, Clone)]
pub struct CartModel {
    objective: Objective,
    tree: Tree,
    columns: Vec<ColumnSpec>,
    signature: Signature,
}

impl CartModel {
    /// Assemble a model from its parts.
    ///
    /// `columns` are the input columns in signature order.
    pub fn new(objective: Objective, tree: Tree, columns: Vec<ColumnSpec>) -> Self {
        let signature = Signature::new(columns.iter().map(InputSpec::from).collect());
        Self {
            objective,
            tree,
            columns,
            signature,
        }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The default serving signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Input columns in signature order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn task(&self) -> TaskKind {
        self.objective.task()
    }

    pub fn n_outputs(&self) -> usize {
        self.objective.n_outputs()
    }

    /// Invoke the model with named inputs.
    ///
    /// The batch size is taken from the provided inputs, which must all have
    /// the same length. Inputs not in the signature are ignored.
    pub fn call(&self, inputs: &HashMap<String, ArrayView1<'_, f32>>) -> Result<Array2<f32>, ModelError> {
        let n_rows = match self.signature.names().find_map(|name| inputs.get(name)) {
            Some(first) => first.len(),
            None => inputs.values().next().map_or(0, |v| v.len()),
        };
        self.call_rows(inputs, n_rows)
    }

    /// Invoke the model with named inputs and an explicit batch size.
    pub(crate) fn call_rows(
        &self,
        inputs: &HashMap<String, ArrayView1<'_, f32>>,
        n_rows: usize,
    ) -> Result<Array2<f32>, ModelError> {
        let width = self.columns.iter().map(|c| c.col_idx + 1).max().unwrap_or(0);
        let mut by_index: Vec<Option<ArrayView1<'_, f32>>> = vec![None; width];
        for column in &self.columns {
            let values = inputs
                .get(&column.name)
                .ok_or_else(|| ModelError::MissingInput(column.name.clone()))?;
            if values.len() != n_rows {
                return Err(ModelError::InputLengthMismatch {
                    name: column.name.clone(),
                    expected: n_rows,
                    actual: values.len(),
                });
            }
            by_index[column.col_idx] = Some(values.view());
        }

        let mut out = Array2::zeros((n_rows, self.n_outputs()));
        for (row, mut out_row) in out.rows_mut().into_iter().enumerate() {
            let sample = ColumnRow {
                columns: &by_index,
                row,
            };
            let value = self.tree.predict_row(&sample);
            out_row.assign(&ArrayView1::from(value.as_slice()));
        }
        Ok(out)
    }
}

/// One row of a column-major batch.
struct ColumnRow<'a, 'b> {
    columns: &'a [Option<ArrayView1<'b, f32>>],
    row: usize,
}

impl FeatureLookup for ColumnRow<'_, '_> {
    #[inline]
    fn feature(&self, col_idx: usize) -> f32 {
        match self.columns.get(col_idx) {
            Some(Some(column)) => column[self.row],
            _ => f32::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::cart::{HigherThanCondition, LeafValue, Node};
    use ndarray::array;

    fn classifier() -> CartModel {
        let root = Node::decision(
            HigherThanCondition::new(ColumnSpec::numerical(3), 1.5, false),
            Node::leaf(LeafValue::Probability(vec![0.25, 0.75])),
            Node::leaf(LeafValue::Probability(vec![1.0, 0.0])),
        );
        let tree = Tree::new(root);
        CartModel::new(
            Objective::classification("label", vec!["no".into(), "yes".into()]),
            tree,
            vec![ColumnSpec::numerical(3)],
        )
    }

    #[test]
    fn signature_lists_used_columns() {
        let model = classifier();
        assert_eq!(model.signature().names().collect::<Vec<_>>(), vec!["3"]);
        assert_eq!(model.n_outputs(), 2);
    }

    #[test]
    fn call_with_named_inputs() {
        let model = classifier();
        let col = array![1.0f32, 2.0, f32::NAN];
        let inputs = HashMap::from([("3".to_string(), col.view())]);

        let out = model.call(&inputs).unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out.row(0).to_vec(), vec![1.0, 0.0]);
        assert_eq!(out.row(1).to_vec(), vec![0.25, 0.75]);
        assert_eq!(out.row(2).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn call_missing_input_fails() {
        let model = classifier();
        let col = array![1.0f32];
        let inputs = HashMap::from([("0".to_string(), col.view())]);

        let err = model.call(&inputs).unwrap_err();
        assert!(matches!(err, ModelError::MissingInput(name) if name == "3"));
    }

    #[test]
    fn call_with_mismatched_lengths_fails() {
        let model = classifier();
        let col = array![1.0f32, 2.0];
        let inputs = HashMap::from([("3".to_string(), col.view())]);

        let err = model.call_rows(&inputs, 3).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InputLengthMismatch { expected: 3, actual: 2, .. }
        ));
    }
}
