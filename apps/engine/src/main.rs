use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use advisor_engine::config::Config;
use advisor_engine::training::pipeline;

fn main() -> Result<()> {
    // Load configuration first so logging can honor its default level.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("advisor_engine={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting training pipeline v{}", env!("CARGO_PKG_VERSION"));
    info!(
        dataset = %config.dataset_path.display(),
        model_dir = %config.model_dir.display(),
        test_fraction = config.test_fraction,
        seed = config.seed,
        "configuration loaded"
    );

    let report = pipeline::run(&config)?;

    info!(best_model = ?report.best_model, "training complete");
    info!(
        "svm:    accuracy {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}",
        report.svm_metrics.accuracy,
        report.svm_metrics.precision,
        report.svm_metrics.recall,
        report.svm_metrics.f1_score
    );
    info!(
        "forest: accuracy {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}",
        report.rf_metrics.accuracy,
        report.rf_metrics.precision,
        report.rf_metrics.recall,
        report.rf_metrics.f1_score
    );
    info!("artifacts written to {}", config.model_dir.display());

    Ok(())
}
