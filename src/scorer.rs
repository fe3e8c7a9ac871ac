//! EV Scorer - Main coordinator for scoring ecosystem components
//!
//! Runs the fixed pipeline for one dataset:
//! detect type → rescale → classify → AQ9 → AQ1-AQ15 → EV.
//! Includes a parallel (Rayon) entry point for scoring several components.

use crate::classification::{classify_features, Classification, UserClassifications};
use crate::config::EvaConfig;
use crate::data::Dataset;
use crate::detection::{detect_data_type, DataType, Detection};
use crate::error::{EvaError, EvaResult};
use crate::metrics::*;
use crate::store::ComponentSnapshot;
use crate::utils::{rescale_qualitative, rescale_quantitative, RescaledMatrix};
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Main EV scorer
#[derive(Debug, Clone, Default)]
pub struct EvScorer {
    config: EvaConfig,
}

/// Everything calculated for one dataset
#[derive(Debug, Clone, Serialize)]
pub struct ComponentScore {
    /// What the detector concluded, even when overridden
    pub detection: Detection,
    /// Type actually used
    pub data_type: DataType,
    pub classification: Classification,
    /// Rescaled matrix for `data_type`
    pub rescaled: RescaledMatrix,
    pub aq9: Aq9Result,
    pub aq_table: AqTable,
    pub ev_table: EvTable,
    pub statuses: Vec<(AssessmentQuestion, AqStatus)>,
}

impl ComponentScore {
    /// Freeze this score into a named store snapshot
    pub fn into_snapshot(
        self,
        name: &str,
        dataset: Dataset,
        user_classifications: UserClassifications,
    ) -> ComponentSnapshot {
        ComponentSnapshot {
            name: name.trim().to_string(),
            feature_count: dataset.n_features(),
            dataset,
            data_type: self.data_type,
            classification: self.classification,
            user_classifications,
            aq_table: self.aq_table,
            ev_table: self.ev_table,
            saved_at: Utc::now(),
        }
    }
}

/// One ecosystem component queued for parallel scoring
#[derive(Debug, Clone)]
pub struct ComponentInput {
    pub name: String,
    pub dataset: Dataset,
    pub data_type: Option<DataType>,
    pub user_classifications: UserClassifications,
}

impl EvScorer {
    /// Create a scorer, rejecting an invalid configuration
    pub fn new(config: EvaConfig) -> EvaResult<Self> {
        config.validate()?;
        debug!(
            "EV scorer: LRF threshold {}, concentration percentile {}",
            config.lrf_threshold, config.concentration_percentile
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvaConfig {
        &self.config
    }

    /// Score one dataset
    ///
    /// `data_type` overrides detection. Without an override an undetermined
    /// detection is an error.
    pub fn score(
        &self,
        dataset: &Dataset,
        data_type: Option<DataType>,
        user_classifications: &UserClassifications,
    ) -> EvaResult<ComponentScore> {
        let detection = detect_data_type(dataset);
        let data_type = data_type
            .or_else(|| detection.data_type())
            .ok_or(EvaError::UndeterminedDataType)?;
        debug!("Detected {:?}, scoring as {}", detection, data_type);

        // Both rescales are needed: the AQ engine reads the one for its type,
        // AQ9 always reads the quantitative one.
        let rescaled_qual = rescale_qualitative(dataset);
        let rescaled_quant = rescale_quantitative(dataset);

        let classification =
            classify_features(dataset, user_classifications, self.config.lrf_threshold);

        let aq9 = calculate_aq9_from_rescaled(
            dataset,
            &rescaled_quant,
            &classification,
            self.config.concentration_percentile,
        );

        let aq_table = calculate_all_aqs(
            dataset,
            data_type,
            &rescaled_qual,
            &rescaled_quant,
            &aq9,
            &classification,
        );
        let ev_table = calculate_ev(&aq_table, data_type);
        let statuses = aq_status(data_type, &classification);

        info!(
            "Scored {} subzones × {} features ({}): {} active AQs, mean EV {}",
            dataset.n_subzones(),
            dataset.n_features(),
            data_type,
            statuses.iter().filter(|(_, s)| s.is_active()).count(),
            ev_table
                .mean()
                .map_or_else(|| "n/a".to_string(), |m| format!("{:.3}", m))
        );

        let rescaled = match data_type {
            DataType::Qualitative => rescaled_qual,
            DataType::Quantitative => rescaled_quant,
        };

        Ok(ComponentScore {
            detection,
            data_type,
            classification,
            rescaled,
            aq9,
            aq_table,
            ev_table,
            statuses,
        })
    }

    /// Score several components in parallel using Rayon
    ///
    /// Components are independent, so each runs on its own thread. Results
    /// keep the input order; the first failure aborts the batch.
    pub fn score_components_parallel(
        &self,
        inputs: &[ComponentInput],
    ) -> EvaResult<Vec<ComponentScore>> {
        info!("Scoring {} ecosystem components in parallel", inputs.len());

        inputs
            .par_iter()
            .map(|input| {
                debug!("Scoring component '{}'", input.name);
                self.score(&input.dataset, input.data_type, &input.user_classifications)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Tag;
    use approx::assert_relative_eq;

    #[test]
    fn test_score_qualitative_dataset() {
        let ds = Dataset::from_rows(
            &["S1", "S2", "S3"],
            &["f1"],
            &[vec![1.0], vec![0.0], vec![0.0]],
        )
        .unwrap();

        let score = EvScorer::default()
            .score(&ds, None, &UserClassifications::default())
            .unwrap();

        assert_eq!(score.detection, Detection::Qualitative);
        assert_eq!(score.data_type, DataType::Qualitative);
        assert_relative_eq!(score.ev_table.values()[0].unwrap(), 5.0);
        assert_relative_eq!(score.ev_table.mean().unwrap(), 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_override_beats_detection() {
        let ds = Dataset::from_rows(&["S1", "S2"], &["f1"], &[vec![1.0], vec![0.0]]).unwrap();

        let score = EvScorer::default()
            .score(&ds, Some(DataType::Quantitative), &UserClassifications::default())
            .unwrap();

        assert_eq!(score.detection, Detection::Qualitative);
        assert_eq!(score.data_type, DataType::Quantitative);
        assert!(score.aq_table.is_applicable(AssessmentQuestion::Aq8));
        assert!(!score.aq_table.is_applicable(AssessmentQuestion::Aq7));
    }

    #[test]
    fn test_undetermined_requires_override() {
        let ds = Dataset::new(
            vec!["S1".into(), "S2".into()],
            vec!["empty".into()],
            vec![vec![None, None]],
        )
        .unwrap();

        let err = EvScorer::default()
            .score(&ds, None, &UserClassifications::default())
            .unwrap_err();
        assert!(matches!(err, EvaError::UndeterminedDataType));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EvaConfig {
            lrf_threshold: 1.5,
            ..EvaConfig::default()
        };
        assert!(matches!(EvScorer::new(config), Err(EvaError::Config(_))));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scorer = EvScorer::default();
        let fish = Dataset::from_rows(
            &["S1", "S2", "S3"],
            &["cod", "herring"],
            &[vec![4.0, 0.0], vec![12.5, 3.0], vec![0.0, 9.0]],
        )
        .unwrap();
        let birds = Dataset::from_rows(
            &["S1", "S2"],
            &["gull"],
            &[vec![1.0], vec![0.0]],
        )
        .unwrap();

        let mut tags = UserClassifications::default();
        tags.insert("cod".to_string(), vec![Tag::Nrf]);

        let inputs = vec![
            ComponentInput {
                name: "Fish".into(),
                dataset: fish.clone(),
                data_type: None,
                user_classifications: tags.clone(),
            },
            ComponentInput {
                name: "Birds".into(),
                dataset: birds.clone(),
                data_type: None,
                user_classifications: UserClassifications::default(),
            },
        ];

        let parallel = scorer.score_components_parallel(&inputs).unwrap();
        let fish_seq = scorer.score(&fish, None, &tags).unwrap();
        let birds_seq = scorer.score(&birds, None, &UserClassifications::default()).unwrap();

        assert_eq!(parallel[0].ev_table, fish_seq.ev_table);
        assert_eq!(parallel[1].ev_table, birds_seq.ev_table);
    }

    #[test]
    fn test_into_snapshot() {
        let ds = Dataset::from_rows(&["S1"], &["f1", "f2"], &[vec![1.0, 0.0]]).unwrap();
        let score = EvScorer::default()
            .score(&ds, None, &UserClassifications::default())
            .unwrap();

        let snapshot = score.into_snapshot(" Benthos ", ds, UserClassifications::default());
        assert_eq!(snapshot.name, "Benthos");
        assert_eq!(snapshot.feature_count, 2);
        assert_eq!(snapshot.data_type, DataType::Qualitative);
    }
}
