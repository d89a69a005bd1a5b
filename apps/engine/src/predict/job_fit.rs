//! Job-fit analysis: how well a comma-separated skill set matches a target
//! role. Reuses the vectorizer and the probability-capable classifier, not
//! the full ensemble.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::features::vectorizer;
use crate::state::LoadedArtifacts;

/// Fit score when the query matches none of the canonical roles.
pub const NO_MATCH_FIT_SCORE: f64 = 0.65;
/// Fit score when no probability distribution can be produced at all.
pub const NO_PROBA_FIT_SCORE: f64 = 0.70;

/// The known technical-term vocabulary used for the skills-match tier.
pub const KNOWN_TECH_TERMS: [&str; 54] = [
    "Python", "Java", "C++", "C#", "JavaScript", "TypeScript", "Go", "Rust", "Ruby", "PHP",
    "SQL", "MongoDB", "PostgreSQL", "MySQL", "Redis", "Elasticsearch", "Cassandra",
    "React", "Vue", "Angular", "Node.js", "Express", "Django", "Flask", "Spring Boot",
    "Docker", "Kubernetes", "AWS", "Azure", "GCP", "Terraform", "Ansible", "Jenkins",
    "Git", "REST API", "GraphQL", "Machine Learning", "TensorFlow", "PyTorch",
    "Pandas", "NumPy", "Scikit-learn", "Keras", "OpenCV", "NLP", "Spark", "Hadoop",
    "HTML", "CSS", "SASS", "Bootstrap", "Microservices", "System Design", "Agile",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillsMatch {
    Excellent,
    Good,
    Fair,
    Limited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Senior,
    Intermediate,
    Junior,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFitReport {
    pub job_role: String,
    pub fit_score: f64,
    pub skills_match: SkillsMatch,
    pub experience_level: ExperienceLevel,
    pub message: String,
}

/// Scores the fit between a target role (free text) and a comma-separated
/// skill list.
///
/// The fit score is the forest's probability mass for the canonical role
/// matched case-insensitively by bidirectional substring (first match in
/// codec order wins; the policy is deliberately loose and can over-match
/// short queries).
pub fn analyze_job_fit(
    artifacts: &LoadedArtifacts,
    job_role: &str,
    skills: &str,
) -> Result<JobFitReport, EngineError> {
    let role_query = job_role.trim().to_lowercase();
    if role_query.is_empty() || skills.trim().is_empty() {
        return Err(EngineError::InvalidInput(
            "job role and skills required".to_string(),
        ));
    }

    let row = vectorizer::transform(skills, &artifacts.feature_space);

    let fit_score = match (artifacts.forest.ready(), artifacts.codec.as_ref()) {
        (Some(model), Some(codec)) => {
            let proba = model.predict_proba(&row);
            let matched = codec.classes().iter().enumerate().find(|(_, role)| {
                let role_lower = role.to_lowercase();
                role_lower.contains(&role_query) || role_query.contains(&role_lower)
            });
            match matched {
                Some((index, _)) => proba.get(index).copied().unwrap_or(NO_MATCH_FIT_SCORE),
                None => NO_MATCH_FIT_SCORE,
            }
        }
        _ => NO_PROBA_FIT_SCORE,
    };

    let user_skills: BTreeSet<String> = skills
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let known: BTreeSet<String> = KNOWN_TECH_TERMS
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let matching = user_skills.intersection(&known).count();

    let skills_match = match matching {
        n if n >= 5 => SkillsMatch::Excellent,
        n if n >= 3 => SkillsMatch::Good,
        n if n >= 1 => SkillsMatch::Fair,
        _ => SkillsMatch::Limited,
    };
    let experience_level = match user_skills.len() {
        n if n >= 8 => ExperienceLevel::Senior,
        n if n >= 5 => ExperienceLevel::Intermediate,
        _ => ExperienceLevel::Junior,
    };

    let display_role = title_case(job_role.trim());
    let message = format!("Analysis complete for {display_role}");

    Ok(JobFitReport {
        job_role: display_role,
        fit_score,
        skills_match,
        experience_level,
        message,
    })
}

/// Capitalizes the first letter of each whitespace-separated word.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::classify::forest::{ForestConfig, RandomForest};
    use crate::classify::svm::{LinearSvm, SvmConfig};
    use crate::features::vectorizer::VectorizerConfig;
    use crate::models::roles::{LabelCodec, ROLE_LABELS};
    use crate::state::{ModelSlot, UnavailableReason};

    fn toy_artifacts() -> LoadedArtifacts {
        let texts: Vec<String> = vec![
            "kubernetes terraform docker jenkins".to_string(),
            "kubernetes terraform ansible pipeline".to_string(),
            "kubernetes docker pipeline jenkins".to_string(),
            "pandas numpy statistics regression".to_string(),
            "pandas numpy dataset notebook".to_string(),
            "pandas statistics dataset regression".to_string(),
        ];
        let codec = LabelCodec::fit(ROLE_LABELS);
        let devops = codec.encode("DevOps Engineer").unwrap();
        let data = codec.encode("Data Scientist").unwrap();
        let labels = vec![devops, devops, devops, data, data, data];

        let space = vectorizer::fit(
            &texts,
            VectorizerConfig {
                min_df: 2,
                ..VectorizerConfig::default()
            },
        );
        let rows: Vec<_> = texts
            .iter()
            .map(|t| vectorizer::transform(t, &space))
            .collect();
        let svm = LinearSvm::train(&rows, &labels, codec.len(), space.n_features(), &SvmConfig::default());
        let forest = RandomForest::train(
            &rows,
            &labels,
            codec.len(),
            space.n_features(),
            &ForestConfig {
                n_trees: 15,
                min_samples_split: 2,
                min_samples_leaf: 1,
                ..ForestConfig::default()
            },
        );

        LoadedArtifacts {
            feature_space: space,
            codec: Some(codec),
            svm: ModelSlot::Ready(svm),
            forest: ModelSlot::Ready(forest),
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let artifacts = toy_artifacts();
        assert!(analyze_job_fit(&artifacts, "", "python, docker").is_err());
        assert!(analyze_job_fit(&artifacts, "devops engineer", "  ").is_err());
    }

    #[test]
    fn test_matching_role_uses_forest_probability() {
        let artifacts = toy_artifacts();
        let report =
            analyze_job_fit(&artifacts, "DevOps Engineer", "kubernetes, terraform, docker")
                .unwrap();
        assert!((0.0..=1.0).contains(&report.fit_score));
        assert!(
            report.fit_score > 0.5,
            "devops skills should carry mass, got {}",
            report.fit_score
        );
    }

    #[test]
    fn test_unknown_role_gets_default_score() {
        let artifacts = toy_artifacts();
        let report = analyze_job_fit(&artifacts, "Astronaut", "kubernetes, docker").unwrap();
        assert_eq!(report.fit_score, NO_MATCH_FIT_SCORE);
    }

    #[test]
    fn test_missing_forest_gets_no_proba_score() {
        let mut artifacts = toy_artifacts();
        artifacts.forest =
            ModelSlot::Unavailable(UnavailableReason::Missing("forest_model.json".into()));
        let report = analyze_job_fit(&artifacts, "DevOps Engineer", "kubernetes").unwrap();
        assert_eq!(report.fit_score, NO_PROBA_FIT_SCORE);
    }

    #[test]
    fn test_substring_matching_is_bidirectional() {
        let artifacts = toy_artifacts();
        // Short query is a substring of "Data Scientist"; the loose policy
        // accepts it (first codec-order match wins).
        let report = analyze_job_fit(&artifacts, "data", "pandas, numpy").unwrap();
        assert_ne!(report.fit_score, NO_MATCH_FIT_SCORE);
        // And the long query contains the canonical role.
        let report =
            analyze_job_fit(&artifacts, "senior devops engineer ii", "kubernetes").unwrap();
        assert_ne!(report.fit_score, NO_MATCH_FIT_SCORE);
    }

    #[test]
    fn test_skills_match_tiers() {
        let artifacts = toy_artifacts();
        let cases = [
            ("python, java, docker, kubernetes, aws", SkillsMatch::Excellent),
            ("python, java, docker", SkillsMatch::Good),
            ("python, underwater basket weaving", SkillsMatch::Fair),
            ("underwater basket weaving", SkillsMatch::Limited),
        ];
        for (skills, expected) in cases {
            let report = analyze_job_fit(&artifacts, "devops", skills).unwrap();
            assert_eq!(report.skills_match, expected, "skills: {skills}");
        }
    }

    #[test]
    fn test_experience_tiers_by_skill_count() {
        let artifacts = toy_artifacts();
        let senior = "a1, b2, c3, d4, e5, f6, g7, h8";
        let mid = "a1, b2, c3, d4, e5";
        let junior = "a1, b2";
        assert_eq!(
            analyze_job_fit(&artifacts, "devops", senior).unwrap().experience_level,
            ExperienceLevel::Senior
        );
        assert_eq!(
            analyze_job_fit(&artifacts, "devops", mid).unwrap().experience_level,
            ExperienceLevel::Intermediate
        );
        assert_eq!(
            analyze_job_fit(&artifacts, "devops", junior).unwrap().experience_level,
            ExperienceLevel::Junior
        );
    }

    #[test]
    fn test_role_is_echoed_title_cased() {
        let artifacts = toy_artifacts();
        let report = analyze_job_fit(&artifacts, "devops engineer", "docker").unwrap();
        assert_eq!(report.job_role, "Devops Engineer");
        assert!(report.message.contains("Devops Engineer"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("data scientist"), "Data Scientist");
        assert_eq!(title_case("  mixed CASE role "), "Mixed Case Role");
    }
}
