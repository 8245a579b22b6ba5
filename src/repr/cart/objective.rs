//! Prediction task descriptors consumed by the CART builder.

use crate::model::TaskKind;

/// Label name used when the caller does not provide one.
///
/// The label is recorded in the artifact but never read at inference time.
pub const DEFAULT_LABEL: &str = "label";

/// The prediction task of a CART model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Scalar regression.
    Regression { label: String },
    /// Single-label classification over an ordered list of class names.
    Classification { label: String, classes: Vec<String> },
}

impl Objective {
    /// Regression objective with the given label.
    pub fn regression(label: impl Into<String>) -> Self {
        Self::Regression {
            label: label.into(),
        }
    }

    /// Classification objective with the given label and class names.
    pub fn classification(label: impl Into<String>, classes: Vec<String>) -> Self {
        Self::Classification {
            label: label.into(),
            classes,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Regression { label } | Self::Classification { label, .. } => label,
        }
    }

    /// Class names, or an empty slice for regression.
    pub fn classes(&self) -> &[String] {
        match self {
            Self::Regression { .. } => &[],
            Self::Classification { classes, .. } => classes,
        }
    }

    /// Number of prediction outputs per sample.
    pub fn n_outputs(&self) -> usize {
        match self {
            Self::Regression { .. } => 1,
            Self::Classification { classes, .. } => classes.len(),
        }
    }

    pub fn task(&self) -> TaskKind {
        match self {
            Self::Regression { .. } => TaskKind::ScalarRegression,
            Self::Classification { .. } => TaskKind::SingleLabelClassification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_has_single_output() {
        let obj = Objective::regression(DEFAULT_LABEL);
        assert_eq!(obj.label(), "label");
        assert_eq!(obj.n_outputs(), 1);
        assert!(obj.classes().is_empty());
        assert_eq!(obj.task(), TaskKind::ScalarRegression);
    }

    #[test]
    fn classification_outputs_match_classes() {
        let obj = Objective::classification("y", vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(obj.label(), "y");
        assert_eq!(obj.n_outputs(), 3);
        assert_eq!(obj.task(), TaskKind::SingleLabelClassification);
    }
}
