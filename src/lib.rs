//! treeport: convert fitted scikit-learn decision trees into CART models.
//!
//! A fitted `DecisionTreeRegressor`, `DecisionTreeClassifier` or their
//! extremely-randomized variants is translated into a single-tree CART model,
//! written to a model directory, reloaded, and wrapped so it accepts the
//! estimator's dense feature matrix.
//!
//! ```no_run
//! use treeport::compat::Estimator;
//!
//! let estimator = Estimator::from_path("tree.json")?;
//! let model = treeport::convert(&estimator, None)?;
//!
//! let x = ndarray::Array2::<f32>::zeros((4, model.n_features()));
//! let predictions = model.predict(x.view())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compat;
pub mod convert;
pub mod model;
pub mod persist;
pub mod repr;
pub mod testing;

pub use convert::{ConvertConfig, ConvertError, convert, convert_with_config};
pub use model::{CartModel, DenseModel, ModelError, TaskKind};

// Re-export approx traits for users who want to compare predictions
pub use approx;
