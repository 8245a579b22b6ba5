//! Writer for CART model artifacts.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::PersistError;
use super::convert::{tree_to_nodes, validate_tree};
use super::schema::{
    ColumnSchema, DONE_FILE, FORMAT_NAME, FORMAT_VERSION, HEADER_FILE, HeaderSchema, NODES_FILE,
    NodesSchema,
};
use crate::repr::cart::{ColumnSpec, Objective, Tree};

/// Collects a single tree and writes it as a model directory.
///
/// Nothing touches the filesystem until [`close`](Self::close).
#[derive(Debug)]
pub struct CartBuilder {
    path: PathBuf,
    objective: Objective,
    tree: Option<Tree>,
}

impl CartBuilder {
    pub fn new(path: impl Into<PathBuf>, objective: Objective) -> Self {
        Self {
            path: path.into(),
            objective,
            tree: None,
        }
    }

    /// Add the model's tree.
    ///
    /// Fails with [`PersistError::TreeLimit`] if a tree was already added and
    /// with [`PersistError::Validation`] if a leaf does not fit the objective
    /// or the tree holds a value JSON cannot represent.
    pub fn add_tree(&mut self, tree: Tree) -> Result<(), PersistError> {
        if self.tree.is_some() {
            return Err(PersistError::TreeLimit);
        }
        validate_tree(&self.objective, &tree)?;
        self.tree = Some(tree);
        Ok(())
    }

    /// Write the artifact.
    ///
    /// The completion marker is written last, so a directory without it was
    /// not fully written.
    pub fn close(self) -> Result<(), PersistError> {
        let tree = self.tree.ok_or(PersistError::NoTrees)?;

        fs::create_dir_all(&self.path).map_err(|e| PersistError::io(&self.path, e))?;
        let done = self.path.join(DONE_FILE);
        if done.exists() {
            fs::remove_file(&done).map_err(|e| PersistError::io(&done, e))?;
        }

        let header = HeaderSchema {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            objective: (&self.objective).into(),
            num_trees: 1,
            num_nodes: tree.n_nodes(),
            input_features: tree
                .used_features()
                .into_iter()
                .map(|idx| ColumnSchema::from(&ColumnSpec::numerical(idx)))
                .collect(),
        };
        let nodes = NodesSchema {
            nodes: tree_to_nodes(&tree),
        };

        write_json(&self.path.join(HEADER_FILE), &header)?;
        write_json(&self.path.join(NODES_FILE), &nodes)?;
        File::create(&done).map_err(|e| PersistError::io(&done, e))?;

        debug!(
            path = %self.path.display(),
            num_nodes = header.num_nodes,
            num_inputs = header.input_features.len(),
            "wrote CART artifact"
        );
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|e| PersistError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| PersistError::json(path, e))?;
    writer.flush().map_err(|e| PersistError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::cart::{LeafValue, Node};

    fn leaf_tree(v: f32) -> Tree {
        Tree::new(Node::leaf(LeafValue::Regression(v)))
    }

    #[test]
    fn second_tree_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = CartBuilder::new(dir.path(), Objective::regression("label"));
        builder.add_tree(leaf_tree(1.0)).unwrap();
        let err = builder.add_tree(leaf_tree(2.0)).unwrap_err();
        assert!(matches!(err, PersistError::TreeLimit));
    }

    #[test]
    fn close_without_tree_fails() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CartBuilder::new(dir.path().join("model"), Objective::regression("label"));
        assert!(matches!(builder.close(), Err(PersistError::NoTrees)));
        assert!(!dir.path().join("model").exists());
    }

    #[test]
    fn close_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model");
        let mut builder = CartBuilder::new(&path, Objective::regression("label"));
        builder.add_tree(leaf_tree(1.0)).unwrap();
        builder.close().unwrap();

        assert!(path.join(HEADER_FILE).is_file());
        assert!(path.join(NODES_FILE).is_file());
        assert!(path.join(DONE_FILE).is_file());
    }

    #[test]
    fn mismatched_leaf_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let objective = Objective::classification("label", vec!["a".into(), "b".into()]);
        let mut builder = CartBuilder::new(dir.path(), objective);
        let err = builder.add_tree(leaf_tree(1.0)).unwrap_err();
        assert!(matches!(err, PersistError::Validation(_)));
    }

    #[test]
    fn overflowing_leaf_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        let mut builder = CartBuilder::new(&path, Objective::regression("label"));
        let err = builder.add_tree(leaf_tree(1e39f64 as f32)).unwrap_err();
        assert!(matches!(err, PersistError::Validation(_)));
        assert!(!path.exists());
    }
}
