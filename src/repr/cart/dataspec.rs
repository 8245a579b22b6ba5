//! Column specifications referenced by split conditions.

use std::fmt;

/// Semantic type of an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnType {
    /// Continuous numeric column compared against thresholds.
    #[default]
    Numerical,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numerical => f.write_str("numerical"),
        }
    }
}

/// Reference to one input column of the design matrix.
///
/// The name is always the column index rendered as decimal text, so the
/// index can be recovered from a serving signature with [`ColumnSpec::parse_index`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSpec {
    /// Input name as exposed in the model signature.
    pub name: String,
    /// Column index in the dense design matrix.
    pub col_idx: usize,
    /// Semantic type.
    pub column_type: ColumnType,
}

impl ColumnSpec {
    /// Numerical column at `col_idx`, named after its index.
    pub fn numerical(col_idx: usize) -> Self {
        Self {
            name: col_idx.to_string(),
            col_idx,
            column_type: ColumnType::Numerical,
        }
    }

    /// Recover the column index from an input name.
    ///
    /// Returns `None` if `name` is not a plain non-negative integer.
    pub fn parse_index(name: &str) -> Option<usize> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        name.parse().ok()
    }
}
