//! External format compatibility loaders.
//!
//! This module reads fitted models produced by other libraries and converts
//! them into native treeport types.
//!
//! - [`sklearn`]: scikit-learn decision and extra trees.

pub mod sklearn;

pub use sklearn::{ConversionError, Estimator, TreeEstimator};
