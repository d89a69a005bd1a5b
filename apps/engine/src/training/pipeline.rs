//! Offline training pipeline: dataset → normalization → split → fit →
//! evaluate → persist.
//!
//! Runs as a batch job, entirely outside the serving path. Model fitting
//! parallelizes internally (per class, per tree); everything visible here is
//! sequential and deterministic for a fixed seed.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::artifacts;
use crate::classify::forest::{ForestConfig, RandomForest};
use crate::classify::svm::{LinearSvm, SvmConfig};
use crate::config::Config;
use crate::errors::EngineError;
use crate::features::vectorizer::{self, VectorizerConfig};
use crate::models::roles::{LabelCodec, RoleMapping};
use crate::training::dataset::{self, Dataset};
use crate::training::metrics::{self, TrainingInfo, TrainingReport};

/// Full pipeline: load, train, evaluate, persist. Returns the report that
/// was written to the model directory.
pub fn run(config: &Config) -> Result<TrainingReport, EngineError> {
    let mapping = artifacts::load_role_mapping(&config.model_dir)?;
    let data = dataset::load_dataset(&config.dataset_path, &mapping)?;
    train_dataset(data, &mapping, &config.model_dir, config.test_fraction, config.seed)
}

/// Trains both classifiers from an already-ingested dataset and persists the
/// artifact set.
pub fn train_dataset(
    data: Dataset,
    mapping: &RoleMapping,
    model_dir: &Path,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainingReport, EngineError> {
    if data.records.is_empty() {
        return Err(EngineError::Training(
            "no trainable records after normalization".to_string(),
        ));
    }

    // One shared codec for both classifiers; training data must cover the
    // full required set or every later artifact load would be rejected.
    let codec = LabelCodec::fit(data.records.iter().map(|r| r.role.as_str()));
    codec.validate()?;

    let labels: Vec<usize> = data
        .records
        .iter()
        .map(|r| codec.encode(&r.role))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| EngineError::Training("record label outside the fitted codec".to_string()))?;

    let (train_idx, test_idx) = stratified_split(&labels, test_fraction, seed);
    info!(
        train = train_idx.len(),
        test = test_idx.len(),
        "stratified split complete"
    );

    // The feature space is fit on training text only; the held-out split
    // goes through the same frozen transform as inference traffic.
    let train_texts: Vec<String> = train_idx
        .iter()
        .map(|&i| data.records[i].text.clone())
        .collect();
    let space = vectorizer::fit(&train_texts, VectorizerConfig::default());
    info!(features = space.n_features(), "feature space fit");

    let train_rows: Vec<_> = train_idx
        .iter()
        .map(|&i| vectorizer::transform(&data.records[i].text, &space))
        .collect();
    let test_rows: Vec<_> = test_idx
        .iter()
        .map(|&i| vectorizer::transform(&data.records[i].text, &space))
        .collect();
    let train_labels: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
    let test_labels: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();

    let svm_config = SvmConfig {
        seed,
        ..SvmConfig::default()
    };
    let svm = LinearSvm::train(
        &train_rows,
        &train_labels,
        codec.len(),
        space.n_features(),
        &svm_config,
    );
    let svm_pred: Vec<usize> = test_rows
        .iter()
        .map(|row| svm.predict(row).unwrap_or(0))
        .collect();
    let svm_metrics = metrics::evaluate(&test_labels, &svm_pred, codec.len());
    info!(
        accuracy = svm_metrics.accuracy,
        f1 = svm_metrics.f1_score,
        "svm trained"
    );

    let forest_config = ForestConfig {
        seed,
        ..ForestConfig::default()
    };
    let forest = RandomForest::train(
        &train_rows,
        &train_labels,
        codec.len(),
        space.n_features(),
        &forest_config,
    );
    let rf_pred: Vec<usize> = test_rows
        .iter()
        .map(|row| forest.predict(row).unwrap_or(0))
        .collect();
    let rf_metrics = metrics::evaluate(&test_labels, &rf_pred, codec.len());
    info!(
        accuracy = rf_metrics.accuracy,
        f1 = rf_metrics.f1_score,
        "random forest trained"
    );

    let best_model = metrics::select_best(&svm_metrics, &rf_metrics);
    info!(?best_model, "model selection complete");

    let report = TrainingReport {
        timestamp: Utc::now(),
        best_model,
        normalized_roles: codec.classes().to_vec(),
        svm_metrics,
        rf_metrics,
        vectorizer_config: space.config().clone(),
        training_info: TrainingInfo {
            total_records_after_normalization: data.records.len(),
            excluded_unmapped: data.stats.excluded_unmapped,
            train_records: train_idx.len(),
            test_records: test_idx.len(),
            test_split: test_fraction,
            ensemble_enabled: true,
            models_saved: vec![
                artifacts::SVM_MODEL_FILE.to_string(),
                artifacts::FOREST_MODEL_FILE.to_string(),
            ],
        },
    };

    persist(model_dir, &space, &codec, &svm, &forest, mapping, &report)?;
    info!("artifacts written to {}", model_dir.display());
    Ok(report)
}

fn persist(
    model_dir: &Path,
    space: &vectorizer::FeatureSpace,
    codec: &LabelCodec,
    svm: &LinearSvm,
    forest: &RandomForest,
    mapping: &RoleMapping,
    report: &TrainingReport,
) -> Result<(), EngineError> {
    let stamp = report.timestamp;
    artifacts::save(model_dir, artifacts::FEATURE_SPACE_FILE, space, stamp)?;
    artifacts::save(model_dir, artifacts::LABEL_CODEC_FILE, codec, stamp)?;
    artifacts::save(model_dir, artifacts::SVM_MODEL_FILE, svm, stamp)?;
    artifacts::save(model_dir, artifacts::FOREST_MODEL_FILE, forest, stamp)?;
    artifacts::save(model_dir, artifacts::ROLE_MAPPING_FILE, mapping, stamp)?;
    artifacts::save(model_dir, artifacts::TRAINING_REPORT_FILE, report, stamp)?;
    Ok(())
}

/// Per-class shuffled split so every role keeps its share of the held-out
/// set. Deterministic for a fixed seed.
fn stratified_split(labels: &[usize], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(index);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(indices.len());
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }
    (train, test)
}
