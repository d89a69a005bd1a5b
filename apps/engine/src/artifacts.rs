//! Artifact persistence.
//!
//! Every trained artifact round-trips as JSON in the model directory,
//! wrapped with the timestamp of the training run that produced it.
//! Artifacts are written once by the training pipeline and only ever read
//! by the serving path.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::roles::{LabelCodec, RoleMapping};

pub const FEATURE_SPACE_FILE: &str = "feature_space.json";
pub const LABEL_CODEC_FILE: &str = "label_codec.json";
pub const SVM_MODEL_FILE: &str = "svm_model.json";
pub const FOREST_MODEL_FILE: &str = "forest_model.json";
pub const ROLE_MAPPING_FILE: &str = "role_mapping.json";
pub const TRAINING_REPORT_FILE: &str = "training_report.json";

#[derive(Serialize)]
struct VersionedRef<'a, T> {
    created_at: DateTime<Utc>,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Versioned<T> {
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    payload: T,
}

/// Writes one artifact, stamped with `created_at`.
pub fn save<T: Serialize>(
    dir: &Path,
    name: &str,
    payload: &T,
    created_at: DateTime<Utc>,
) -> Result<(), EngineError> {
    fs::create_dir_all(dir)?;
    let wrapped = VersionedRef {
        created_at,
        payload,
    };
    let json = serde_json::to_string_pretty(&wrapped)?;
    fs::write(dir.join(name), json)?;
    Ok(())
}

/// Reads one artifact. A missing file is `ArtifactMissing`; a file that
/// exists but does not parse is `ArtifactUnreadable` — the two recover
/// differently upstream.
pub fn load<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T, EngineError> {
    let path = dir.join(name);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(EngineError::ArtifactMissing(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let wrapped: Versioned<T> =
        serde_json::from_str(&raw).map_err(|e| EngineError::ArtifactUnreadable {
            name: name.to_string(),
            detail: e.to_string(),
        })?;
    Ok(wrapped.payload)
}

/// Loads the label codec and enforces exact set-equality against the
/// required roles. A mismatch is reported distinctly from a missing file.
pub fn load_codec(dir: &Path) -> Result<LabelCodec, EngineError> {
    let codec: LabelCodec = load(dir, LABEL_CODEC_FILE)?;
    codec.validate()?;
    Ok(codec)
}

/// Loads the persisted role mapping when one exists next to the models,
/// otherwise the built-in table.
pub fn load_role_mapping(dir: &Path) -> Result<RoleMapping, EngineError> {
    match load::<RoleMapping>(dir, ROLE_MAPPING_FILE) {
        Ok(mapping) => {
            mapping.validate()?;
            Ok(mapping)
        }
        Err(EngineError::ArtifactMissing(_)) => Ok(RoleMapping::default()),
        Err(e) => Err(e),
    }
}
