//! Leaf value types.

/// Value stored in a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    /// Scalar regression output.
    Regression(f32),
    /// Probability distribution over classes (entries sum to 1).
    Probability(Vec<f32>),
}

impl LeafValue {
    /// Number of outputs this value contributes (1 for regression).
    pub fn n_outputs(&self) -> usize {
        match self {
            Self::Regression(_) => 1,
            Self::Probability(p) => p.len(),
        }
    }

    /// View the value as a slice.
    pub fn as_slice(&self) -> &[f32] {
        match self {
            Self::Regression(v) => std::slice::from_ref(v),
            Self::Probability(p) => p,
        }
    }
}
