//! CSV dataset ingest and label normalization.
//!
//! Turns the bulk jobs CSV into clean (canonical role, combined text)
//! records that are safe to train on:
//! - strict schema for the required columns
//! - row-level validation (skip bad rows, but report what happened)
//! - raw titles normalized to the 8 canonical roles, unmapped rows excluded
//!   with their count reported

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::EngineError;
use crate::models::roles::RoleMapping;

/// One row of the bulk dataset, as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub role: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub job_description: String,
}

/// A training record after normalization: canonical role plus the combined
/// text feature. The raw title is gone by construction.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub role: String,
    pub text: String,
}

/// Data-quality summary of one ingest run.
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicate_rows: usize,
    pub raw_title_count: usize,
    pub excluded_unmapped: usize,
    pub per_role_counts: BTreeMap<String, usize>,
}

pub struct Dataset {
    pub records: Vec<NormalizedRecord>,
    pub stats: IngestStats,
}

pub fn load_dataset(path: &Path, mapping: &RoleMapping) -> Result<Dataset, EngineError> {
    let file = File::open(path)?;
    let dataset = read_records(file, mapping)?;
    info!(
        rows_read = dataset.stats.rows_read,
        rows_skipped = dataset.stats.rows_skipped,
        duplicates = dataset.stats.duplicate_rows,
        raw_titles = dataset.stats.raw_title_count,
        excluded_unmapped = dataset.stats.excluded_unmapped,
        "dataset loaded from {}",
        path.display()
    );
    for (role, count) in &dataset.stats.per_role_counts {
        info!("  {role:<22} {count} records");
    }
    Ok(dataset)
}

/// Ingest from any reader; exposed separately so tests can feed CSV text.
pub fn read_records<R: Read>(reader: R, mapping: &RoleMapping) -> Result<Dataset, EngineError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut stats = IngestStats::default();
    let mut records = Vec::new();
    let mut seen_rows: HashSet<(String, String, String)> = HashSet::new();
    let mut raw_titles: HashSet<String> = HashSet::new();

    for row in csv_reader.deserialize::<RawRecord>() {
        stats.rows_read += 1;
        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                stats.rows_skipped += 1;
                warn!("skipping row {}: {e}", stats.rows_read);
                continue;
            }
        };

        if !seen_rows.insert((
            raw.role.clone(),
            raw.skills.clone(),
            raw.job_description.clone(),
        )) {
            stats.duplicate_rows += 1;
        }
        raw_titles.insert(raw.role.trim().to_string());

        match mapping.normalize(&raw.role) {
            Some(canonical) => {
                *stats.per_role_counts.entry(canonical.to_string()).or_insert(0) += 1;
                records.push(NormalizedRecord {
                    role: canonical.to_string(),
                    text: format!("{} {}", raw.skills, raw.job_description),
                });
            }
            None => stats.excluded_unmapped += 1,
        }
    }

    stats.raw_title_count = raw_titles.len();
    Ok(Dataset { records, stats })
}
