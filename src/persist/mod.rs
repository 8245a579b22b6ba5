//! CART model artifacts on disk.
//!
//! A [`CartBuilder`] collects one tree and writes it to a directory;
//! [`load_model`] reads the directory back into a live [`CartModel`].
//!
//! ```ignore
//! use treeport::persist::{CartBuilder, load_model};
//!
//! let mut builder = CartBuilder::new(dir.path(), objective);
//! builder.add_tree(tree)?;
//! builder.close()?;
//!
//! let model = load_model(dir.path())?;
//! ```
//!
//! [`CartModel`]: crate::model::CartModel

mod builder;
mod convert;
mod loader;
pub mod schema;

use std::path::PathBuf;

pub use builder::CartBuilder;
pub use loader::load_model;

/// Errors raised while writing or reading an artifact.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no tree was added before closing the builder")]
    NoTrees,
    #[error("a CART model holds exactly one tree")]
    TreeLimit,
    #[error("incomplete artifact at {0}: missing completion marker")]
    IncompleteArtifact(PathBuf),
    #[error("unsupported artifact format '{format}' version {version}")]
    UnsupportedVersion { format: String, version: u32 },
    #[error("invalid artifact: {0}")]
    Validation(String),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
