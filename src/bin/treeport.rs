//! Convert a fitted scikit-learn tree exported as JSON.
//!
//! Examples:
//! - Convert and keep the model directory:
//!   `cargo run --bin treeport -- tree.json --out model/`
//!
//! - Convert and score a JSON matrix (`[[f32, ...], ...]`), comparing every row
//!   against the source tree:
//!   `cargo run --bin treeport -- tree.json --check rows.json`
//!
//! Set `RUST_LOG=debug` for per-step logs.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use ndarray::Array2;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use treeport::compat::Estimator;
use treeport::{DenseModel, convert};

#[derive(Debug)]
struct Args {
    estimator: PathBuf,
    out: Option<PathBuf>,
    check: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut estimator: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut check: Option<PathBuf> = None;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--out" => out = Some(it.next().ok_or("--out requires a directory")?.into()),
            "--check" => check = Some(it.next().ok_or("--check requires a path")?.into()),
            "--help" | "-h" => print_help_and_exit(),
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            path if estimator.is_none() => estimator = Some(path.into()),
            extra => return Err(format!("unexpected argument: {extra}")),
        }
    }

    Ok(Args {
        estimator: estimator.ok_or("missing <estimator.json>")?,
        out,
        check,
    })
}

fn print_help_and_exit() -> ! {
    eprintln!(
        "treeport <estimator.json> [--out DIR] [--check INPUT.json]\n\n  --out <dir>     keep the intermediate model directory\n  --check <path>  predict a JSON matrix and compare with the source tree\n"
    );
    std::process::exit(0)
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Stack `rows` into a matrix, requiring every row to have `n_cols` values.
fn rows_to_array(rows: &[Vec<f32>], n_cols: usize) -> Result<Array2<f32>, String> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n_cols) {
        return Err(format!(
            "row {i} has {} values, the model expects {n_cols}",
            row.len()
        ));
    }
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), n_cols), flat).map_err(|e| e.to_string())
}

fn check(estimator: &Estimator, model: &DenseModel, rows: &[Vec<f32>]) -> Result<(), Box<dyn Error>> {
    let x = rows_to_array(rows, model.n_features())?;
    let predictions = model.predict(x.view())?;

    let mut max_diff = 0.0f64;
    if let Some(tree) = estimator.tree_estimator() {
        for (row, out) in rows.iter().zip(predictions.rows()) {
            let Some(reference) = tree.predict_row(row) else {
                continue;
            };
            for (a, e) in out.iter().zip(&reference) {
                max_diff = max_diff.max((f64::from(*a) - e).abs());
            }
        }
    }
    if max_diff > 1e-5 {
        warn!(max_diff, "converted model disagrees with the source tree");
    } else {
        info!(rows = rows.len(), max_diff, "converted model matches the source tree");
    }

    let out: Vec<Vec<f32>> = predictions.rows().into_iter().map(|r| r.to_vec()).collect();
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    init_logging();

    let estimator = Estimator::from_path(&args.estimator)?;
    let model = convert(&estimator, args.out.as_deref())?;
    info!(
        estimator = estimator.type_name(),
        n_features = model.n_features(),
        n_outputs = model.n_outputs(),
        "model ready"
    );

    if let Some(path) = &args.check {
        let rows: Vec<Vec<f32>> = serde_json::from_str(&fs::read_to_string(path)?)?;
        check(&estimator, &model, &rows)?;
    }
    Ok(())
}
