//! Dense-matrix calling convention on top of a [`CartModel`].

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, ArrayView2};

use super::cart::{CartModel, ModelError};
use super::meta::TaskKind;
use crate::convert::ConvertError;
use crate::repr::cart::ColumnSpec;

/// A [`CartModel`] invoked with a single dense `[n_rows, n_features]` matrix.
///
/// `n_features` is the source estimator's declared input width, not only the
/// columns the tree splits on. Columns outside the wrapped model's signature
/// are accepted and ignored.
#[derive(Debug, Clone)]
pub struct DenseModel {
    model: CartModel,
    n_features: usize,
    /// Signature input name and the dense column it is sliced from.
    columns: Vec<(String, usize)>,
}

impl DenseModel {
    /// Wrap `model` to accept matrices with `n_features` columns.
    ///
    /// Fails with [`ConvertError::InternalConsistency`] if a signature input
    /// does not name a column index below `n_features`.
    pub fn wrap(model: CartModel, n_features: usize) -> Result<Self, ConvertError> {
        let columns = model
            .signature()
            .names()
            .map(|name| match ColumnSpec::parse_index(name) {
                Some(idx) if idx < n_features => Ok((name.to_string(), idx)),
                Some(idx) => Err(ConvertError::InternalConsistency(format!(
                    "signature input '{name}' refers to column {idx} but the estimator declares {n_features} features"
                ))),
                None => Err(ConvertError::InternalConsistency(format!(
                    "signature input '{name}' is not a column index"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model,
            n_features,
            columns,
        })
    }

    /// Declared input width.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Dense column indices that reach the wrapped model.
    pub fn used_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().map(|(_, idx)| *idx)
    }

    pub fn n_outputs(&self) -> usize {
        self.model.n_outputs()
    }

    pub fn task(&self) -> TaskKind {
        self.model.task()
    }

    pub fn model(&self) -> &CartModel {
        &self.model
    }

    /// Predict a batch.
    ///
    /// Returns `[n_rows, 1]` for regression and `[n_rows, n_classes]`
    /// probabilities for classification.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Array2<f32>, ModelError> {
        if features.ncols() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: features.ncols(),
            });
        }

        let inputs: HashMap<String, ArrayView1<'_, f32>> = self
            .columns
            .iter()
            .map(|(name, idx)| (name.clone(), features.column(*idx)))
            .collect();
        self.model.call_rows(&inputs, features.nrows())
    }

    /// Predict a single sample.
    pub fn predict_row(&self, sample: &[f32]) -> Result<Vec<f32>, ModelError> {
        let view = ArrayView2::from_shape((1, sample.len()), sample).map_err(|_| {
            ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: sample.len(),
            }
        })?;
        let out = self.predict(view)?;
        Ok(out.row(0).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::cart::{HigherThanCondition, LeafValue, Node, Objective, Tree};
    use ndarray::array;

    fn regressor_on(features: &[usize]) -> CartModel {
        // Chain of splits: the leaf value is the position of the first
        // non-positive feature, or `features.len()` if all are positive.
        let mut node = Node::leaf(LeafValue::Regression(features.len() as f32));
        for (i, &f) in features.iter().enumerate().rev() {
            node = Node::decision(
                HigherThanCondition::new(ColumnSpec::numerical(f), 0.0, false),
                node,
                Node::leaf(LeafValue::Regression(i as f32)),
            );
        }
        let columns = features.iter().map(|&f| ColumnSpec::numerical(f)).collect();
        CartModel::new(Objective::regression("label"), Tree::new(node), columns)
    }

    #[test]
    fn wrap_maps_signature_to_columns() {
        let dense = DenseModel::wrap(regressor_on(&[0, 2]), 5).unwrap();
        assert_eq!(dense.used_columns().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(dense.n_features(), 5);
    }

    #[test]
    fn wrap_rejects_out_of_range_column() {
        let err = DenseModel::wrap(regressor_on(&[0, 7]), 5).unwrap_err();
        assert!(matches!(err, ConvertError::InternalConsistency(_)));
    }

    #[test]
    fn predict_slices_columns() {
        let dense = DenseModel::wrap(regressor_on(&[0, 2]), 4).unwrap();
        let x = array![
            [-1.0f32, 9.0, 9.0, 9.0],
            [1.0, 9.0, -1.0, 9.0],
            [1.0, -9.0, 1.0, -9.0],
        ];
        let out = dense.predict(x.view()).unwrap();
        assert_eq!(out.shape(), &[3, 1]);
        assert_eq!(out.column(0).to_vec(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let dense = DenseModel::wrap(regressor_on(&[0]), 3).unwrap();
        let x = array![[0.0f32, 1.0]];
        let err = dense.predict(x.view()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCountMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn single_leaf_model_keeps_batch_size() {
        let model = CartModel::new(
            Objective::regression("label"),
            Tree::new(Node::leaf(LeafValue::Regression(4.0))),
            Vec::new(),
        );
        let dense = DenseModel::wrap(model, 2).unwrap();
        let out = dense.predict(Array2::<f32>::zeros((4, 2)).view()).unwrap();
        assert_eq!(out.shape(), &[4, 1]);
        assert!(out.iter().all(|&v| v == 4.0));
        assert_eq!(dense.predict_row(&[1.0, 2.0]).unwrap(), vec![4.0]);
    }
}
