//! Career role prediction engine.
//!
//! Two independently trained text classifiers — a margin-based linear SVM
//! and a random forest — share one TF-IDF feature space and one label codec,
//! and are reconciled at inference time so the output is always one of eight
//! canonical roles, with a calibrated confidence, a deterministic tie-break,
//! and an explicit uncertainty signal.
//!
//! The library surface is consumed by an external web layer:
//! [`predict_role`] for the ensemble prediction and [`analyze_job_fit`] for
//! the lighter job-fit analysis. The `train` binary runs the offline
//! pipeline that produces the persisted artifacts.

pub mod artifacts;
pub mod classify;
pub mod config;
pub mod errors;
pub mod features;
pub mod models;
pub mod predict;
pub mod state;
pub mod training;

pub use config::Config;
pub use errors::EngineError;
pub use models::prediction::{EnsembleMethod, PredictionResult, TopRole};
pub use models::roles::{LabelCodec, RoleMapping, DEFAULT_ROLE, ROLE_LABELS};
pub use predict::job_fit::{analyze_job_fit, JobFitReport};
pub use predict::predictor::predict_role;
pub use state::{ArtifactCache, LoadedArtifacts, ModelSlot};
