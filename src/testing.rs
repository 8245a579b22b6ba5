//! Testing utilities for treeport.
//!
//! Assertion helpers shared by unit tests and integration tests.
//!
//! ```ignore
//! use treeport::testing::{assert_batch_approx_eq, DEFAULT_TOLERANCE};
//! ```

use approx::AbsDiffEq;
use ndarray::ArrayView2;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Same tolerance as f64 for comparing against reference values.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-5;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f32 values are approximately equal.
///
/// ```
/// # use treeport::assert_approx_eq;
/// assert_approx_eq!(1.0f32, 1.0001f32, 0.001);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f32 = $left;
        let right_val: f32 = $right;
        let tol: f32 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert that two slices of f32 values are approximately equal element-wise.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f32], expected: &[f32], tolerance: f32, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.abs_diff_eq(e, tolerance),
            "{context}[{i}]: {a} ≠ {e} (diff={}, tolerance={tolerance})",
            (a - e).abs()
        );
    }
}

// =============================================================================
// Batch Assertions
// =============================================================================

/// Render the rows of `actual` that differ from `expected`.
///
/// Shows `-` lines for expected and `+` lines for actual.
fn diff_rows(actual: ArrayView2<'_, f32>, expected: &[Vec<f64>], epsilon: f64) -> String {
    let mut result = String::new();
    for (i, (act_row, exp_row)) in actual.rows().into_iter().zip(expected).enumerate() {
        let differs = act_row
            .iter()
            .zip(exp_row)
            .any(|(a, e)| !f64::from(*a).abs_diff_eq(e, epsilon));
        if !differs {
            continue;
        }

        result.push_str(&format!("[{i:3}] -"));
        for val in exp_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (expected)\n      +");
        for val in act_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (actual)\n");
    }
    result
}

/// Assert that a batch of model outputs matches per-row reference values.
///
/// On failure, prints a diff of the rows that differ.
///
/// # Panics
///
/// Panics if shapes differ or any value differs by more than `epsilon`.
pub fn assert_batch_approx_eq(
    actual: ArrayView2<'_, f32>,
    expected: &[Vec<f64>],
    epsilon: f64,
    context: &str,
) {
    let expected_cols = expected.first().map_or(actual.ncols(), Vec::len);
    if actual.nrows() != expected.len() || actual.ncols() != expected_cols {
        panic!(
            "\n{context}: shape mismatch\n- {:?}  (expected)\n+ {:?}  (actual)\n",
            (expected.len(), expected_cols),
            actual.dim()
        );
    }

    let diff = diff_rows(actual, expected, epsilon);
    if !diff.is_empty() {
        panic!("\n{context}: outputs differ (epsilon {epsilon:.0e})\n\n{diff}");
    }
}

/// Assert that every row of `probabilities` is a distribution summing to one.
pub fn assert_rows_are_distributions(probabilities: ArrayView2<'_, f32>, context: &str) {
    for (i, row) in probabilities.rows().into_iter().enumerate() {
        assert!(
            row.iter().all(|p| (0.0..=1.0 + DEFAULT_TOLERANCE).contains(p)),
            "{context}[{i}]: probabilities out of range: {row}"
        );
        let sum: f32 = row.sum();
        assert!(
            sum.abs_diff_eq(&1.0, 1e-4),
            "{context}[{i}]: probabilities sum to {sum}"
        );
    }
}
