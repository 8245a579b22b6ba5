//! Fitted scikit-learn tree state.
//!
//! These are "foreign types" mirroring the attributes scikit-learn exposes on
//! a fitted tree estimator. They are only used as conversion input.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::convert::ConversionError;
use crate::model::TaskKind;

/// Child index marking "no child" (the node is a leaf).
pub const TREE_LEAF: i64 = -1;

/// Feature index and threshold stored on leaf nodes.
pub const TREE_UNDEFINED: i64 = -2;

// =============================================================================
// Node records
// =============================================================================

/// One row of the flat node array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeRecord {
    pub left_child: i64,
    pub right_child: i64,
    pub feature: i64,
    pub threshold: f64,
}

impl NodeRecord {
    /// A leaf record.
    pub fn leaf() -> Self {
        Self {
            left_child: TREE_LEAF,
            right_child: TREE_LEAF,
            feature: TREE_UNDEFINED,
            threshold: TREE_UNDEFINED as f64,
        }
    }

    /// A split record: `x[feature] <= threshold` goes to `left`, otherwise `right`.
    pub fn split(feature: i64, threshold: f64, left: i64, right: i64) -> Self {
        Self {
            left_child: left,
            right_child: right,
            feature,
            threshold,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left_child == TREE_LEAF
    }
}

#[derive(Deserialize)]
struct NamedNodeRecord {
    left_child: i64,
    right_child: i64,
    feature: i64,
    threshold: f64,
}

// Accepts both `{"left_child": .., ...}` objects and positional rows in
// scikit-learn's dtype order (left_child, right_child, feature, threshold, ...).
impl<'de> Deserialize<'de> for NodeRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => {
                let named: NamedNodeRecord =
                    serde_json::from_value(value).map_err(D::Error::custom)?;
                Ok(Self {
                    left_child: named.left_child,
                    right_child: named.right_child,
                    feature: named.feature,
                    threshold: named.threshold,
                })
            }
            Value::Array(fields) => {
                if fields.len() < 4 {
                    return Err(D::Error::custom(format!(
                        "node record needs at least 4 fields, got {}",
                        fields.len()
                    )));
                }
                let int_at = |i: usize, name: &str| -> Result<i64, D::Error> {
                    fields[i].as_i64().ok_or_else(|| {
                        D::Error::custom(format!("node field '{name}' must be an integer"))
                    })
                };
                Ok(Self {
                    left_child: int_at(0, "left_child")?,
                    right_child: int_at(1, "right_child")?,
                    feature: int_at(2, "feature")?,
                    threshold: fields[3].as_f64().ok_or_else(|| {
                        D::Error::custom("node field 'threshold' must be a number")
                    })?,
                })
            }
            _ => Err(D::Error::custom("node record must be an object or an array")),
        }
    }
}

/// Serialized internal state of a fitted tree.
///
/// `values` has shape `[n_nodes][n_outputs][n_values]`: one regression mean
/// per output, or one count per class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeState {
    pub nodes: Vec<NodeRecord>,
    pub values: Vec<Vec<Vec<f64>>>,
}

impl TreeState {
    pub fn new(nodes: Vec<NodeRecord>, values: Vec<Vec<Vec<f64>>>) -> Self {
        Self { nodes, values }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

// =============================================================================
// Class attributes
// =============================================================================

/// A class label as found in `classes_`.
///
/// `Display` matches Python's `str()` of the label, which is how the label
/// reads as a class name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write_python_float(f, *x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip form of `x`, spelled the way Python prints floats:
/// `1.0`, `0.0001`, `1e-05`, `1.5e+16`, `nan`, `-inf`.
fn write_python_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "inf" } else { "-inf" });
    }

    let sci = format!("{x:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.write_str(&sci);
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.write_str(&sci);
    };
    if (-4..16).contains(&exp) {
        let plain = x.to_string();
        if plain.contains('.') {
            f.write_str(&plain)
        } else {
            write!(f, "{plain}.0")
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exp.abs())
    }
}

impl From<i64> for ClassLabel {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ClassLabel {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The `n_classes_` attribute: a scalar for single-output classifiers, one
/// count per output otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassCount {
    Single(usize),
    PerOutput(Vec<usize>),
}

// =============================================================================
// Estimators
// =============================================================================

/// Fitted attributes of a tree estimator.
///
/// `tree` is `None` until the estimator has been fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeEstimator {
    #[serde(rename = "n_features_in_")]
    pub n_features_in: usize,
    #[serde(rename = "n_outputs_")]
    pub n_outputs: usize,
    #[serde(rename = "n_classes_", skip_serializing_if = "Option::is_none")]
    pub n_classes: Option<ClassCount>,
    #[serde(rename = "classes_", skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<ClassLabel>>,
    #[serde(rename = "tree_", skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeState>,
}

impl TreeEstimator {
    /// A fitted single-output regressor.
    pub fn regressor(n_features_in: usize, tree: TreeState) -> Self {
        Self {
            n_features_in,
            n_outputs: 1,
            tree: Some(tree),
            ..Default::default()
        }
    }

    /// A fitted single-output classifier over `classes`.
    pub fn classifier(n_features_in: usize, classes: Vec<ClassLabel>, tree: TreeState) -> Self {
        Self {
            n_features_in,
            n_outputs: 1,
            n_classes: Some(ClassCount::Single(classes.len())),
            classes: Some(classes),
            tree: Some(tree),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.tree.is_some()
    }

    /// Resolve the prediction task from output arity and class attributes.
    pub fn task_kind(&self) -> TaskKind {
        TaskKind::resolve(self.n_outputs, self.n_classes.is_some())
    }

    /// Predict one sample by walking the flat node array.
    ///
    /// Routes `x <= threshold` left. NaN also goes left, which mirrors the
    /// missing-value policy of the converted model rather than any
    /// scikit-learn version's handling of missing values.
    /// Classification returns normalized class probabilities.
    /// Returns `None` for unfitted estimators, out-of-range indices, short
    /// samples, or paths longer than the node count.
    pub fn predict_row(&self, sample: &[f32]) -> Option<Vec<f64>> {
        let state = self.tree.as_ref()?;
        let classify = self.task_kind().is_classification();
        let mut idx = 0usize;
        for _ in 0..state.nodes.len() {
            let node = state.nodes.get(idx)?;
            if node.is_leaf() {
                let raw = state.values.get(idx)?.first()?;
                return Some(if classify {
                    let total: f64 = raw.iter().sum();
                    raw.iter().map(|c| c / total).collect()
                } else {
                    vec![*raw.first()?]
                });
            }
            let x = *sample.get(usize::try_from(node.feature).ok()?)?;
            let next = if x.is_nan() || f64::from(x) <= node.threshold {
                node.left_child
            } else {
                node.right_child
            };
            idx = usize::try_from(next).ok()?;
        }
        None
    }
}

/// A scikit-learn estimator, closed over the supported tree types.
///
/// Any other estimator class deserializes to [`Estimator::Unsupported`] so
/// that conversion can report it by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EstimatorRecord", into = "EstimatorRecord")]
pub enum Estimator {
    DecisionTreeRegressor(TreeEstimator),
    ExtraTreeRegressor(TreeEstimator),
    DecisionTreeClassifier(TreeEstimator),
    ExtraTreeClassifier(TreeEstimator),
    Unsupported { type_name: String },
}

impl Estimator {
    /// Class name of the estimator.
    pub fn type_name(&self) -> &str {
        match self {
            Self::DecisionTreeRegressor(_) => "DecisionTreeRegressor",
            Self::ExtraTreeRegressor(_) => "ExtraTreeRegressor",
            Self::DecisionTreeClassifier(_) => "DecisionTreeClassifier",
            Self::ExtraTreeClassifier(_) => "ExtraTreeClassifier",
            Self::Unsupported { type_name } => type_name,
        }
    }

    /// Fitted tree attributes, if this is a supported tree estimator.
    pub fn tree_estimator(&self) -> Option<&TreeEstimator> {
        match self {
            Self::DecisionTreeRegressor(t)
            | Self::ExtraTreeRegressor(t)
            | Self::DecisionTreeClassifier(t)
            | Self::ExtraTreeClassifier(t) => Some(t),
            Self::Unsupported { .. } => None,
        }
    }

    /// Parse an estimator from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConversionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an estimator from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConversionError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load an estimator from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

#[derive(Serialize, Deserialize)]
struct EstimatorRecord {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(flatten)]
    attributes: TreeEstimator,
}

impl From<EstimatorRecord> for Estimator {
    fn from(record: EstimatorRecord) -> Self {
        // Accept qualified names such as "sklearn.tree.DecisionTreeRegressor".
        let short = record.type_name.rsplit('.').next().unwrap_or_default();
        match short {
            "DecisionTreeRegressor" => Self::DecisionTreeRegressor(record.attributes),
            "ExtraTreeRegressor" => Self::ExtraTreeRegressor(record.attributes),
            "DecisionTreeClassifier" => Self::DecisionTreeClassifier(record.attributes),
            "ExtraTreeClassifier" => Self::ExtraTreeClassifier(record.attributes),
            _ => Self::Unsupported {
                type_name: record.type_name,
            },
        }
    }
}

impl From<Estimator> for EstimatorRecord {
    fn from(estimator: Estimator) -> Self {
        let type_name = estimator.type_name().to_string();
        let attributes = match estimator {
            Estimator::DecisionTreeRegressor(t)
            | Estimator::ExtraTreeRegressor(t)
            | Estimator::DecisionTreeClassifier(t)
            | Estimator::ExtraTreeClassifier(t) => t,
            Estimator::Unsupported { .. } => TreeEstimator::default(),
        };
        Self {
            type_name,
            attributes,
        }
    }
}
