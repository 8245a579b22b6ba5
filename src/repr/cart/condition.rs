//! Split conditions.

use super::dataspec::ColumnSpec;

/// Numerical "higher than" test.
///
/// The condition holds when the feature value is strictly greater than the
/// threshold. A holding condition routes to the positive child. Missing values
/// (NaN) evaluate to `missing_evaluation`.
#[derive(Debug, Clone, PartialEq)]
pub struct HigherThanCondition {
    pub feature: ColumnSpec,
    pub threshold: f32,
    pub missing_evaluation: bool,
}

impl HigherThanCondition {
    pub fn new(feature: ColumnSpec, threshold: f32, missing_evaluation: bool) -> Self {
        Self {
            feature,
            threshold,
            missing_evaluation,
        }
    }

    /// Evaluate the condition on a single feature value.
    #[inline]
    pub fn evaluate(&self, value: f32) -> bool {
        if value.is_nan() {
            self.missing_evaluation
        } else {
            value > self.threshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_greater() {
        let cond = HigherThanCondition::new(ColumnSpec::numerical(0), 0.5, false);
        assert!(!cond.evaluate(0.4));
        assert!(!cond.evaluate(0.5));
        assert!(cond.evaluate(0.6));
    }

    #[test]
    fn missing_uses_policy() {
        let neg = HigherThanCondition::new(ColumnSpec::numerical(0), 0.5, false);
        let pos = HigherThanCondition::new(ColumnSpec::numerical(0), 0.5, true);
        assert!(!neg.evaluate(f32::NAN));
        assert!(pos.evaluate(f32::NAN));
    }
}
