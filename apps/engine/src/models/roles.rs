//! Canonical role vocabulary, the raw-title mapping applied before training,
//! and the label codec shared by both classifiers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// The closed set of roles the engine is allowed to predict. Changing this
/// set invalidates every persisted artifact; all of them must be retrained
/// together.
pub const ROLE_LABELS: [&str; 8] = [
    "Full Stack Developer",
    "DevOps Engineer",
    "Data Scientist",
    "Cloud Engineer",
    "AI/ML Engineer",
    "Network Engineer",
    "RF Engineer",
    "Field Engineer",
];

/// Safe default when no classifier can contribute: the first declared role.
pub const DEFAULT_ROLE: &str = ROLE_LABELS[0];

pub fn is_required_role(label: &str) -> bool {
    ROLE_LABELS.contains(&label)
}

// ────────────────────────────────────────────────────────────────────────────
// LabelCodec
// ────────────────────────────────────────────────────────────────────────────

/// Bidirectional mapping between role strings and dense class indices.
///
/// Classes are stored sorted, so index assignments are stable across training
/// runs. Both classifiers are trained against one shared codec instance;
/// index `i` means the same role for both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    /// Builds a codec from observed labels: unique, sorted.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        Self {
            classes: unique.into_iter().collect(),
        }
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Exact set-equality check against the required role set.
    ///
    /// Any mismatch (missing, extra, or renamed role) is fatal for the
    /// artifact this codec came from; the classifiers depending on it must
    /// not be used.
    pub fn validate(&self) -> Result<(), EngineError> {
        let have: BTreeSet<&str> = self.classes.iter().map(String::as_str).collect();
        let want: BTreeSet<&str> = ROLE_LABELS.iter().copied().collect();
        if have == want {
            Ok(())
        } else {
            Err(EngineError::LabelSetMismatch {
                expected: ROLE_LABELS.len(),
                found: self.classes.clone(),
            })
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RoleMapping
// ────────────────────────────────────────────────────────────────────────────

/// Raw-title → canonical-role mapping applied before any model sees the data.
///
/// The groupings are a reviewed domain decision, not an algorithm: several
/// specialization titles fold into one canonical role on purpose. Titles not
/// present in the table are unmapped and their records are excluded from
/// training. The table ships with a built-in default and round-trips as a
/// JSON artifact next to the models so it can be audited or replaced without
/// a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMapping {
    entries: BTreeMap<String, String>,
}

impl RoleMapping {
    pub fn normalize(&self, raw_title: &str) -> Option<&str> {
        self.entries.get(raw_title.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every mapping target must be one of the required roles.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (raw, canonical) in &self.entries {
            if !is_required_role(canonical) {
                return Err(EngineError::Training(format!(
                    "role mapping sends '{raw}' to non-canonical role '{canonical}'"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RoleMapping {
    fn default() -> Self {
        let table: [(&str, &str); 44] = [
            // Full Stack Developer
            ("Full Stack Developer", "Full Stack Developer"),
            ("Software Engineer", "Full Stack Developer"),
            ("Web Developer", "Full Stack Developer"),
            ("API Developer", "Full Stack Developer"),
            ("Backend Developer", "Full Stack Developer"),
            ("Frontend Developer", "Full Stack Developer"),
            ("Android Developer", "Full Stack Developer"),
            ("iOS Developer", "Full Stack Developer"),
            ("Mobile Developer", "Full Stack Developer"),
            ("Game Developer", "Full Stack Developer"),
            // DevOps Engineer
            ("DevOps Engineer", "DevOps Engineer"),
            ("DevSecOps Engineer", "DevOps Engineer"),
            ("Site Reliability Engineer", "DevOps Engineer"),
            ("Systems Administrator", "DevOps Engineer"),
            ("Infrastructure Engineer", "DevOps Engineer"),
            // Data Scientist
            ("Data Scientist", "Data Scientist"),
            ("Machine Learning Engineer", "Data Scientist"),
            ("NLP Engineer", "Data Scientist"),
            ("Data Engineer", "Data Scientist"),
            ("Data Analyst", "Data Scientist"),
            ("Database Administrator", "Data Scientist"),
            ("BI Developer", "Data Scientist"),
            // Cloud Engineer
            ("Cloud Architect", "Cloud Engineer"),
            ("Platform Engineer", "Cloud Engineer"),
            ("Solutions Architect", "Cloud Engineer"),
            // AI/ML Engineer
            ("Research Engineer", "AI/ML Engineer"),
            ("Robotics Engineer", "AI/ML Engineer"),
            ("Computer Vision Engineer", "AI/ML Engineer"),
            // Network Engineer
            ("Network Engineer", "Network Engineer"),
            ("Security Engineer", "Network Engineer"),
            // RF Engineer (FPGA, hardware, embedded)
            ("FPGA Engineer", "RF Engineer"),
            ("Hardware Engineer", "RF Engineer"),
            ("Embedded Systems Engineer", "RF Engineer"),
            ("Firmware Engineer", "RF Engineer"),
            // Field Engineer (bridge roles)
            ("Systems Engineer", "Field Engineer"),
            ("Technical Lead", "Field Engineer"),
            ("Project Manager", "Field Engineer"),
            ("Technical Writer", "Field Engineer"),
            ("Engineering Manager", "Field Engineer"),
            ("Business Analyst", "Field Engineer"),
            ("Product Manager", "Field Engineer"),
            ("QA Engineer", "Field Engineer"),
            ("Graphic Designer", "Field Engineer"),
            ("UI/UX Designer", "Field Engineer"),
        ];
        Self {
            entries: table
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_set_has_eight_roles() {
        let unique: BTreeSet<&str> = ROLE_LABELS.iter().copied().collect();
        assert_eq!(unique.len(), 8);
        assert_eq!(DEFAULT_ROLE, "Full Stack Developer");
    }

    #[test]
    fn test_codec_fit_sorts_and_dedups() {
        let codec = LabelCodec::fit(["DevOps Engineer", "Cloud Engineer", "DevOps Engineer"]);
        assert_eq!(codec.len(), 2);
        assert_eq!(codec.decode(0), Some("Cloud Engineer"));
        assert_eq!(codec.decode(1), Some("DevOps Engineer"));
    }

    #[test]
    fn test_codec_encode_decode_roundtrip() {
        let codec = LabelCodec::fit(ROLE_LABELS);
        for role in ROLE_LABELS {
            let idx = codec.encode(role).unwrap();
            assert_eq!(codec.decode(idx), Some(role));
        }
        assert_eq!(codec.encode("Astronaut"), None);
        assert_eq!(codec.decode(8), None);
    }

    #[test]
    fn test_codec_sorted_index_assignment() {
        // Sorted classes give a stable index layout regardless of fit order.
        let codec = LabelCodec::fit(ROLE_LABELS);
        assert_eq!(codec.decode(0), Some("AI/ML Engineer"));
        assert_eq!(codec.decode(5), Some("Full Stack Developer"));
        assert_eq!(codec.decode(7), Some("RF Engineer"));
    }

    #[test]
    fn test_codec_validates_exact_required_set() {
        assert!(LabelCodec::fit(ROLE_LABELS).validate().is_ok());
    }

    #[test]
    fn test_codec_rejects_missing_role() {
        let seven = &ROLE_LABELS[..7];
        let err = LabelCodec::fit(seven).validate().unwrap_err();
        assert!(matches!(err, EngineError::LabelSetMismatch { expected: 8, .. }));
    }

    #[test]
    fn test_codec_rejects_extra_role() {
        let mut nine: Vec<&str> = ROLE_LABELS.to_vec();
        nine.push("Astronaut");
        let err = LabelCodec::fit(nine).validate().unwrap_err();
        assert!(matches!(err, EngineError::LabelSetMismatch { .. }));
    }

    #[test]
    fn test_codec_rejects_renamed_role() {
        let mut renamed: Vec<&str> = ROLE_LABELS.to_vec();
        renamed[3] = "Cloud Wizard";
        assert!(LabelCodec::fit(renamed).validate().is_err());
    }

    #[test]
    fn test_default_mapping_covers_44_titles() {
        let mapping = RoleMapping::default();
        assert_eq!(mapping.len(), 44);
        mapping.validate().unwrap();
    }

    #[test]
    fn test_default_mapping_groups_specializations() {
        let mapping = RoleMapping::default();
        assert_eq!(mapping.normalize("Software Engineer"), Some("Full Stack Developer"));
        assert_eq!(mapping.normalize("Site Reliability Engineer"), Some("DevOps Engineer"));
        assert_eq!(mapping.normalize("Machine Learning Engineer"), Some("Data Scientist"));
        assert_eq!(mapping.normalize("FPGA Engineer"), Some("RF Engineer"));
        assert_eq!(mapping.normalize("Project Manager"), Some("Field Engineer"));
    }

    #[test]
    fn test_mapping_unknown_title_is_unmapped() {
        let mapping = RoleMapping::default();
        assert_eq!(mapping.normalize("Professional Juggler"), None);
    }

    #[test]
    fn test_mapping_trims_whitespace() {
        let mapping = RoleMapping::default();
        assert_eq!(mapping.normalize("  Data Analyst "), Some("Data Scientist"));
    }

    #[test]
    fn test_mapping_roundtrips_as_json() {
        let mapping = RoleMapping::default();
        let json = serde_json::to_string(&mapping).unwrap();
        let back: RoleMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 44);
        assert_eq!(back.normalize("Web Developer"), Some("Full Stack Developer"));
    }
}
