//! Loaded inference models.
//!
//! # Overview
//!
//! - [`CartModel`]: a model reloaded from a CART artifact. It is invoked with
//!   one named column per feature its splits use (see [`Signature`]).
//! - [`DenseModel`]: wraps a [`CartModel`] so it takes a single dense matrix
//!   of the source estimator's full declared width.
//! - [`TaskKind`]: prediction task resolved from an estimator.
//!
//! # Example
//!
//! ```ignore
//! use treeport::compat::sklearn::Estimator;
//!
//! let estimator = Estimator::from_path("tree.json")?;
//! let model = treeport::convert(&estimator, None)?;
//! let probabilities = model.predict(features.view())?;
//! ```

mod cart;
mod dense;
mod meta;
mod signature;

pub use cart::{CartModel, ModelError};
pub use dense::DenseModel;
pub use meta::TaskKind;
pub use signature::{InputSpec, Signature};
