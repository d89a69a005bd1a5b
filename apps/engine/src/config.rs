use std::path::PathBuf;

use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables, with defaults
/// suitable for local runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bulk training dataset (CSV: role, skills, job_description).
    pub dataset_path: PathBuf,
    /// Directory holding the persisted model artifacts.
    pub model_dir: PathBuf,
    /// Fraction of each class held out for evaluation.
    pub test_fraction: f64,
    /// Seed for every random step (split, SGD shuffling, bootstrap).
    pub seed: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let test_fraction = std::env::var("TEST_FRACTION")
            .unwrap_or_else(|_| "0.2".to_string())
            .parse::<f64>()
            .context("TEST_FRACTION must be a number in (0, 1)")?;
        if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
            anyhow::bail!("TEST_FRACTION must be in (0, 1), got {test_fraction}");
        }

        Ok(Config {
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| "data/jobs_dataset.csv".to_string())
                .into(),
            model_dir: std::env::var("MODEL_DIR")
                .unwrap_or_else(|_| "models".to_string())
                .into(),
            test_fraction,
            seed: std::env::var("TRAINING_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse::<u64>()
                .context("TRAINING_SEED must be an unsigned integer")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
