//! Test case loading utilities for integration tests.
//!
//! For assertion helpers, use `treeport::testing`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use treeport::compat::Estimator;

// Re-export testing utilities for convenience
#[allow(unused_imports)]
pub use treeport::testing::{
    DEFAULT_TOLERANCE, DEFAULT_TOLERANCE_F64, assert_batch_approx_eq, assert_rows_are_distributions,
    assert_slice_approx_eq,
};

// =============================================================================
// Test Case Loading
// =============================================================================

/// Base directory for test cases.
pub fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases")
}

/// Directory for scikit-learn test cases.
pub fn sklearn_test_cases_dir() -> PathBuf {
    test_cases_dir().join("sklearn")
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file =
        File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

/// Load `<name>.estimator.json`.
pub fn load_estimator(name: &str) -> Estimator {
    let path = sklearn_test_cases_dir().join(format!("{name}.estimator.json"));
    Estimator::from_path(&path).unwrap_or_else(|e| panic!("Failed to load {}: {e}", path.display()))
}

/// Load an estimator together with its input and expected output.
pub fn load_case(name: &str) -> (Estimator, TestInput, TestExpected) {
    let dir = sklearn_test_cases_dir();
    let input: TestInput = load_json(&dir.join(format!("{name}.input.json")));
    let expected: TestExpected = load_json(&dir.join(format!("{name}.expected.json")));
    (load_estimator(name), input, expected)
}

// =============================================================================
// Common Test Data Structures
// =============================================================================

/// Input features for a test case.
#[derive(Debug, Deserialize)]
pub struct TestInput {
    /// Features matrix, where None represents NaN (missing value)
    pub features: Vec<Vec<Option<f64>>>,
    pub num_rows: usize,
    pub num_features: usize,
}

impl TestInput {
    /// Convert input features to f32 rows, mapping None to NaN.
    pub fn to_f32_rows(&self) -> Vec<Vec<f32>> {
        self.features
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&x| x.map(|v| v as f32).unwrap_or(f32::NAN))
                    .collect()
            })
            .collect()
    }

    /// Dense `[num_rows, num_features]` matrix.
    pub fn to_array(&self) -> Array2<f32> {
        let flat: Vec<f32> = self.to_f32_rows().into_iter().flatten().collect();
        Array2::from_shape_vec((self.num_rows, self.num_features), flat)
            .expect("input shape does not match num_rows x num_features")
    }
}

/// Expected per-row outputs for a test case.
#[derive(Debug, Deserialize)]
pub struct TestExpected {
    pub predictions: Vec<Vec<f64>>,
}
