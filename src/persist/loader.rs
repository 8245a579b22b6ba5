//! Reader for CART model artifacts.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::PersistError;
use super::convert::{nodes_to_tree, validate_tree};
use super::schema::{
    DONE_FILE, FORMAT_NAME, FORMAT_VERSION, HEADER_FILE, HeaderSchema, NODES_FILE, NodesSchema,
};
use crate::model::CartModel;
use crate::repr::cart::{ColumnSpec, Objective};

/// Load a model directory written by [`CartBuilder`](super::CartBuilder).
pub fn load_model(path: impl AsRef<Path>) -> Result<CartModel, PersistError> {
    let path = path.as_ref();
    if !path.join(DONE_FILE).is_file() {
        return Err(PersistError::IncompleteArtifact(path.to_path_buf()));
    }

    let header: HeaderSchema = read_json(&path.join(HEADER_FILE))?;
    if header.format != FORMAT_NAME || header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            format: header.format,
            version: header.version,
        });
    }
    if header.num_trees != 1 {
        return Err(PersistError::Validation(format!(
            "expected exactly one tree, header declares {}",
            header.num_trees
        )));
    }

    let nodes: NodesSchema = read_json(&path.join(NODES_FILE))?;
    if nodes.nodes.len() != header.num_nodes {
        return Err(PersistError::Validation(format!(
            "header declares {} nodes, node file holds {}",
            header.num_nodes,
            nodes.nodes.len()
        )));
    }

    let objective = Objective::try_from(header.objective)?;
    let tree = nodes_to_tree(nodes.nodes)?;
    validate_tree(&objective, &tree)?;

    let columns = header
        .input_features
        .into_iter()
        .map(ColumnSpec::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let declared: Vec<usize> = columns.iter().map(|c| c.col_idx).collect();
    let used: Vec<usize> = tree.used_features().into_iter().collect();
    if declared != used {
        return Err(PersistError::Validation(format!(
            "input features {declared:?} do not match the columns used by the tree {used:?}"
        )));
    }

    debug!(
        path = %path.display(),
        num_nodes = header.num_nodes,
        task = %objective.task(),
        "loaded CART artifact"
    );
    Ok(CartModel::new(objective, tree, columns))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let file = File::open(path).map_err(|e| PersistError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| PersistError::json(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::CartBuilder;
    use crate::repr::cart::{HigherThanCondition, LeafValue, Node, Tree};
    use rstest::rstest;
    use std::fs;

    fn write_classifier(path: &Path) {
        let tree = Tree::new(Node::decision(
            HigherThanCondition::new(ColumnSpec::numerical(2), 0.5, false),
            Node::leaf(LeafValue::Probability(vec![0.0, 1.0])),
            Node::leaf(LeafValue::Probability(vec![0.75, 0.25])),
        ));
        let objective = Objective::classification("label", vec!["0".into(), "1".into()]);
        let mut builder = CartBuilder::new(path, objective);
        builder.add_tree(tree).unwrap();
        builder.close().unwrap();
    }

    fn edit_header(path: &Path, edit: impl FnOnce(&mut serde_json::Value)) {
        let file = path.join(HEADER_FILE);
        let mut header: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        edit(&mut header);
        fs::write(&file, serde_json::to_string(&header).unwrap()).unwrap();
    }

    #[test]
    fn loads_what_builder_wrote() {
        let dir = tempfile::tempdir().unwrap();
        write_classifier(dir.path());

        let model = load_model(dir.path()).unwrap();
        assert_eq!(model.objective().classes(), &["0".to_string(), "1".to_string()]);
        assert_eq!(model.signature().names().collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(model.tree().n_nodes(), 3);
        assert_eq!(model.tree().predict_row(&[0.0f32, 0.0, 1.0][..]).as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn missing_marker_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        write_classifier(dir.path());
        fs::remove_file(dir.path().join(DONE_FILE)).unwrap();

        let err = load_model(dir.path()).unwrap_err();
        assert!(matches!(err, PersistError::IncompleteArtifact(_)));
    }

    #[rstest]
    #[case::format(|h: &mut serde_json::Value| h["format"] = "other".into())]
    #[case::version(|h: &mut serde_json::Value| h["version"] = 99.into())]
    fn foreign_header_rejected(#[case] edit: fn(&mut serde_json::Value)) {
        let dir = tempfile::tempdir().unwrap();
        write_classifier(dir.path());
        edit_header(dir.path(), edit);

        let err = load_model(dir.path()).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion { .. }));
    }

    #[rstest]
    #[case::two_trees(|h: &mut serde_json::Value| h["num_trees"] = 2.into())]
    #[case::node_count(|h: &mut serde_json::Value| h["num_nodes"] = 5.into())]
    #[case::inputs(|h: &mut serde_json::Value| {
        h["input_features"] = serde_json::json!([{"name": "1", "col_idx": 1, "type": "numerical"}])
    })]
    #[case::class_count(|h: &mut serde_json::Value| {
        h["objective"]["classes"] = serde_json::json!(["a", "b", "c"])
    })]
    fn inconsistent_header_rejected(#[case] edit: fn(&mut serde_json::Value)) {
        let dir = tempfile::tempdir().unwrap();
        write_classifier(dir.path());
        edit_header(dir.path(), edit);

        let err = load_model(dir.path()).unwrap_err();
        assert!(matches!(err, PersistError::Validation(_)), "{err}");
    }

    #[test]
    fn corrupt_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        write_classifier(dir.path());
        fs::write(dir.path().join(NODES_FILE), "{").unwrap();

        let err = load_model(dir.path()).unwrap_err();
        assert!(matches!(&err, PersistError::Json { path, .. } if path.ends_with(NODES_FILE)));
    }
}
