//! Estimator to dense-input CART model conversion.
//!
//! The fitted tree is translated into a [`Tree`], written to a model directory
//! with [`CartBuilder`], reloaded with [`load_model`] and finally wrapped in a
//! [`DenseModel`] that accepts the estimator's full feature matrix.

use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::info;

use crate::compat::sklearn::{ConversionError, Estimator, TreeEstimator};
use crate::model::{CartModel, DenseModel};
use crate::persist::{CartBuilder, PersistError, load_model};
use crate::repr::cart::objective::DEFAULT_LABEL;
use crate::repr::cart::{Objective, Tree};

/// Errors raised by [`convert`].
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("estimator must be fit to data before converting")]
    NotFitted,
    #[error("unsupported estimator type '{type_name}'")]
    UnsupportedEstimatorType { type_name: String },
    #[error(
        "only scalar regression and single-label classification are supported (n_outputs = {n_outputs})"
    )]
    UnsupportedTaskType { n_outputs: usize },
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),
    #[error("malformed tree: {0}")]
    MalformedTree(#[source] ConversionError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("failed to create intermediate directory: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConversionError> for ConvertError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::NotFitted => Self::NotFitted,
            ConversionError::UnsupportedTask { n_outputs } => Self::UnsupportedTaskType { n_outputs },
            other => Self::MalformedTree(other),
        }
    }
}

/// Options for [`convert_with_config`].
///
/// ```
/// use treeport::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .intermediate_path("/tmp/model")
///     .label("price")
///     .build();
/// assert_eq!(config.label, "price");
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug))]
pub struct ConvertConfig {
    /// Directory receiving the intermediate artifact. It is left in place
    /// after conversion. `None` uses a temporary directory that is removed
    /// before returning.
    #[builder(into)]
    pub intermediate_path: Option<PathBuf>,

    /// Label name recorded in the objective. Default: `"label"`.
    #[builder(into, default = DEFAULT_LABEL.to_string())]
    pub label: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Convert a fitted estimator into a model that takes a dense feature matrix.
///
/// With `intermediate_path` set, the artifact is written there and kept.
/// Otherwise a temporary directory is used and removed before returning,
/// whether or not conversion succeeds.
pub fn convert(
    estimator: &Estimator,
    intermediate_path: Option<&Path>,
) -> Result<DenseModel, ConvertError> {
    let config = ConvertConfig::builder()
        .maybe_intermediate_path(intermediate_path.map(Path::to_path_buf))
        .build();
    convert_with_config(estimator, &config)
}

/// Convert a fitted estimator with explicit options.
pub fn convert_with_config(
    estimator: &Estimator,
    config: &ConvertConfig,
) -> Result<DenseModel, ConvertError> {
    // Held until the end of the function so every return path cleans up.
    let temp_dir;
    let path = match &config.intermediate_path {
        Some(path) => path.as_path(),
        None => {
            temp_dir = tempfile::tempdir()?;
            temp_dir.path()
        }
    };

    let model = build_cart_model(estimator, path, &config.label)?;
    let n_features = estimator
        .tree_estimator()
        .map(|t| t.n_features_in)
        .ok_or_else(|| ConvertError::UnsupportedEstimatorType {
            type_name: estimator.type_name().to_string(),
        })?;
    let dense = DenseModel::wrap(model, n_features)?;

    info!(
        estimator = estimator.type_name(),
        task = %dense.task(),
        n_features,
        used_features = dense.used_columns().count(),
        temporary = config.intermediate_path.is_none(),
        "converted estimator"
    );
    Ok(dense)
}

/// Translate, persist to `path`, and reload the estimator's tree.
pub fn build_cart_model(
    estimator: &Estimator,
    path: &Path,
    label: &str,
) -> Result<CartModel, ConvertError> {
    let (objective, tree) = match estimator {
        Estimator::DecisionTreeRegressor(t) | Estimator::ExtraTreeRegressor(t) => {
            let tree = t.to_tree()?;
            (Objective::regression(label), tree)
        }
        Estimator::DecisionTreeClassifier(t) | Estimator::ExtraTreeClassifier(t) => {
            let classes = class_names(t)?;
            let tree = t.to_tree()?;
            (Objective::classification(label, classes), tree)
        }
        Estimator::Unsupported { type_name } => {
            return Err(ConvertError::UnsupportedEstimatorType {
                type_name: type_name.clone(),
            });
        }
    };
    persist_and_reload(path, objective, tree)
}

/// Class names of a fitted classifier.
///
/// Checks run in the same order as tree translation, so an unfitted or
/// multi-output classifier reports that before missing class attributes.
fn class_names(estimator: &TreeEstimator) -> Result<Vec<String>, ConvertError> {
    if !estimator.is_fitted() {
        return Err(ConvertError::NotFitted);
    }
    if estimator.n_outputs != 1 {
        return Err(ConvertError::UnsupportedTaskType {
            n_outputs: estimator.n_outputs,
        });
    }
    match (&estimator.classes, &estimator.n_classes) {
        (Some(classes), Some(_)) => Ok(classes.iter().map(ToString::to_string).collect()),
        _ => Err(ConvertError::NotFitted),
    }
}

fn persist_and_reload(
    path: &Path,
    objective: Objective,
    tree: Tree,
) -> Result<CartModel, ConvertError> {
    let mut builder = CartBuilder::new(path, objective);
    builder.add_tree(tree)?;
    builder.close()?;
    Ok(load_model(path)?)
}
