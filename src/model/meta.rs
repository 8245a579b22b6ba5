//! Task metadata.

use std::fmt;

/// Prediction task performed by a tree estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskKind {
    /// Single-output regression (continuous target).
    ScalarRegression,
    /// Single-output classification over a fixed class set.
    SingleLabelClassification,
    /// Anything else (multi-output regression, multi-label classification).
    #[default]
    Unknown,
}

impl TaskKind {
    /// Resolve the task from an estimator's declared output arity and whether
    /// it carries a class-count attribute.
    pub fn resolve(n_outputs: usize, has_class_count: bool) -> Self {
        match (n_outputs, has_class_count) {
            (1, true) => Self::SingleLabelClassification,
            (1, false) => Self::ScalarRegression,
            _ => Self::Unknown,
        }
    }

    /// Returns true if this is a classification task.
    pub fn is_classification(&self) -> bool {
        matches!(self, Self::SingleLabelClassification)
    }

    /// Returns true if the task can be converted.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ScalarRegression => "scalar regression",
            Self::SingleLabelClassification => "single-label classification",
            Self::Unknown => "unknown",
        })
    }
}
