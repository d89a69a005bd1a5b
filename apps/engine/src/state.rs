//! Shared inference state.
//!
//! Artifacts are loaded from disk at most once, validated, and shared
//! read-only across concurrent predictions. Nothing mutates a
//! `LoadedArtifacts` after construction, so no locking is needed beyond the
//! single-initialization guard.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::artifacts;
use crate::classify::forest::RandomForest;
use crate::classify::svm::LinearSvm;
use crate::errors::EngineError;
use crate::features::vectorizer::FeatureSpace;
use crate::models::roles::LabelCodec;

/// Why a classifier cannot contribute to predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The model file does not exist.
    Missing(String),
    /// The model file exists but could not be parsed.
    Unreadable(String),
    /// The shared label codec failed required-set validation, so no index
    /// this model emits can be trusted.
    LabelSetMismatch,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "artifact missing: {name}"),
            Self::Unreadable(name) => write!(f, "artifact unreadable: {name}"),
            Self::LabelSetMismatch => write!(f, "label codec failed required-set validation"),
        }
    }
}

/// A classifier slot: either a usable model or the reason it is out.
#[derive(Debug, Clone)]
pub enum ModelSlot<T> {
    Ready(T),
    Unavailable(UnavailableReason),
}

impl<T> ModelSlot<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(model) => Some(model),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    fn from_load(result: Result<T, EngineError>, name: &str) -> Self {
        match result {
            Ok(model) => Self::Ready(model),
            Err(EngineError::ArtifactMissing(path)) => {
                warn!("{name} not found ({path}); continuing without it");
                Self::Unavailable(UnavailableReason::Missing(name.to_string()))
            }
            Err(e) => {
                warn!("{name} could not be loaded: {e}");
                Self::Unavailable(UnavailableReason::Unreadable(name.to_string()))
            }
        }
    }
}

/// One immutable, validated artifact set shared by all predictions.
///
/// A missing or unreadable feature space fails the load outright — nothing
/// can be vectorized without it. A bad label codec instead marks both
/// classifiers unavailable (their indices would be meaningless), which
/// drives the resolver to its fallback rule rather than failing the call.
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub feature_space: FeatureSpace,
    pub codec: Option<LabelCodec>,
    pub svm: ModelSlot<LinearSvm>,
    pub forest: ModelSlot<RandomForest>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedArtifacts {
    pub fn load(model_dir: &Path) -> Result<Self, EngineError> {
        let feature_space: FeatureSpace =
            artifacts::load(model_dir, artifacts::FEATURE_SPACE_FILE)?;

        let (codec, codec_failure) = match artifacts::load_codec(model_dir) {
            Ok(codec) => (Some(codec), None),
            Err(e @ EngineError::LabelSetMismatch { .. }) => {
                error!("label codec rejected: {e}");
                (None, Some(UnavailableReason::LabelSetMismatch))
            }
            Err(EngineError::ArtifactMissing(path)) => {
                warn!("label codec not found ({path})");
                (
                    None,
                    Some(UnavailableReason::Missing(
                        artifacts::LABEL_CODEC_FILE.to_string(),
                    )),
                )
            }
            Err(e) => {
                warn!("label codec could not be loaded: {e}");
                (
                    None,
                    Some(UnavailableReason::Unreadable(
                        artifacts::LABEL_CODEC_FILE.to_string(),
                    )),
                )
            }
        };

        let (svm, forest) = match codec_failure {
            Some(reason) => (
                ModelSlot::Unavailable(reason.clone()),
                ModelSlot::Unavailable(reason),
            ),
            None => (
                ModelSlot::from_load(
                    artifacts::load(model_dir, artifacts::SVM_MODEL_FILE),
                    artifacts::SVM_MODEL_FILE,
                ),
                ModelSlot::from_load(
                    artifacts::load(model_dir, artifacts::FOREST_MODEL_FILE),
                    artifacts::FOREST_MODEL_FILE,
                ),
            ),
        };

        info!(
            features = feature_space.n_features(),
            svm = svm.is_ready(),
            forest = forest.is_ready(),
            "artifacts loaded"
        );

        Ok(Self {
            feature_space,
            codec,
            svm,
            forest,
            loaded_at: Utc::now(),
        })
    }
}

/// Single-initialization artifact cache, constructed once at service
/// start-up and shared by reference with every prediction call.
///
/// The first `get` populates the cache; concurrent first calls cannot
/// produce diverging copies because the `OnceLock` keeps exactly one
/// winning load.
pub struct ArtifactCache {
    model_dir: PathBuf,
    slot: OnceLock<Result<Arc<LoadedArtifacts>, String>>,
}

impl ArtifactCache {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            slot: OnceLock::new(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn get(&self) -> Result<Arc<LoadedArtifacts>, EngineError> {
        let cached = self.slot.get_or_init(|| {
            LoadedArtifacts::load(&self.model_dir)
                .map(Arc::new)
                .map_err(|e| {
                    error!("artifact load failed: {e}");
                    e.to_string()
                })
        });
        match cached {
            Ok(loaded) => Ok(Arc::clone(loaded)),
            Err(message) => Err(EngineError::ArtifactMissing(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::forest::ForestConfig;
    use crate::classify::svm::SvmConfig;
    use crate::features::vectorizer::{self, VectorizerConfig};
    use crate::models::roles::ROLE_LABELS;

    fn write_minimal_artifacts(dir: &Path, with_models: bool, codec: &LabelCodec) {
        let texts = vec![
            "docker kubernetes terraform".to_string(),
            "docker kubernetes ansible".to_string(),
            "python pandas numpy".to_string(),
            "python pandas spark".to_string(),
        ];
        let config = VectorizerConfig {
            min_df: 1,
            ..VectorizerConfig::default()
        };
        let space = vectorizer::fit(&texts, config);
        let now = Utc::now();
        artifacts::save(dir, artifacts::FEATURE_SPACE_FILE, &space, now).unwrap();
        artifacts::save(dir, artifacts::LABEL_CODEC_FILE, codec, now).unwrap();

        if with_models {
            let rows: Vec<_> = texts.iter().map(|t| vectorizer::transform(t, &space)).collect();
            let labels = vec![3, 3, 2, 2]; // DevOps Engineer, Data Scientist
            let svm = LinearSvm::train(&rows, &labels, 8, space.n_features(), &SvmConfig::default());
            let forest = RandomForest::train(
                &rows,
                &labels,
                8,
                space.n_features(),
                &ForestConfig {
                    n_trees: 5,
                    min_samples_split: 2,
                    min_samples_leaf: 1,
                    ..ForestConfig::default()
                },
            );
            artifacts::save(dir, artifacts::SVM_MODEL_FILE, &svm, now).unwrap();
            artifacts::save(dir, artifacts::FOREST_MODEL_FILE, &forest, now).unwrap();
        }
    }

    #[test]
    fn test_full_artifact_set_loads_ready() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path(), true, &LabelCodec::fit(ROLE_LABELS));
        let loaded = LoadedArtifacts::load(dir.path()).unwrap();
        assert!(loaded.svm.is_ready());
        assert!(loaded.forest.is_ready());
        assert!(loaded.codec.is_some());
    }

    #[test]
    fn test_missing_models_are_unavailable_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path(), false, &LabelCodec::fit(ROLE_LABELS));
        let loaded = LoadedArtifacts::load(dir.path()).unwrap();
        assert!(!loaded.svm.is_ready());
        assert!(!loaded.forest.is_ready());
        assert!(matches!(
            loaded.svm,
            ModelSlot::Unavailable(UnavailableReason::Missing(_))
        ));
    }

    #[test]
    fn test_codec_mismatch_disables_both_models_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path(), true, &LabelCodec::fit(&ROLE_LABELS[..7]));
        let loaded = LoadedArtifacts::load(dir.path()).unwrap();
        assert!(loaded.codec.is_none());
        // Both models exist on disk but must not be used.
        assert!(matches!(
            loaded.svm,
            ModelSlot::Unavailable(UnavailableReason::LabelSetMismatch)
        ));
        assert!(matches!(
            loaded.forest,
            ModelSlot::Unavailable(UnavailableReason::LabelSetMismatch)
        ));
    }

    #[test]
    fn test_missing_feature_space_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoadedArtifacts::load(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::ArtifactMissing(_)));
    }

    #[test]
    fn test_cache_returns_one_shared_copy() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path(), true, &LabelCodec::fit(ROLE_LABELS));
        let cache = ArtifactCache::new(dir.path());
        let a = cache.get().unwrap();
        let b = cache.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_cache_surfaces_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        assert!(cache.get().is_err());
        assert!(cache.get().is_err());
    }
}
