//! Serving signatures of loaded models.

use crate::repr::cart::{ColumnSpec, ColumnType};

/// One named input of a model signature.
///
/// Each input is a batch vector of `f32` values, one per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub name: String,
    pub column_type: ColumnType,
}

impl From<&ColumnSpec> for InputSpec {
    fn from(column: &ColumnSpec) -> Self {
        Self {
            name: column.name.clone(),
            column_type: column.column_type,
        }
    }
}

/// The named inputs a model expects at invocation time.
///
/// Only columns that appear in at least one split are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    inputs: Vec<InputSpec>,
}

impl Signature {
    pub fn new(inputs: Vec<InputSpec>) -> Self {
        Self { inputs }
    }

    /// Input names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
