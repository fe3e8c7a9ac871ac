//! AQ9: CONCENTRATION-WEIGHTED REGULARLY OCCURRING FEATURES
//!
//! Rewards ROF features whose abundance is packed into a few subzones
//! (potential hotspots) over features spread evenly across the area.
//!
//! Three steps per ROF feature:
//!   1. Threshold `t` = value at the configured percentile across all subzones
//!   2. Concentration ratio `Y` = (sum of values ≥ t) / (sum of all values),
//!      0 when the total is not positive
//!   3. Weighted value = rescaled quantitative value × `Y`
//!
//! The subzone score is the mean of the weighted values over all ROF features.
//! Without ROF features the score is not applicable.

use crate::classification::{Classification, Tag};
use crate::data::Dataset;
use crate::utils::{percentile, rescale_quantitative, RescaledMatrix};
use serde::Serialize;

/// Concentration statistics for one ROF feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureConcentration {
    pub feature: String,
    /// Percentile threshold value
    pub threshold: f64,
    /// Sum of values at or above the threshold
    pub top_mass: f64,
    pub total_mass: f64,
    /// Concentration ratio Y in [0, 1]
    pub ratio: f64,
}

/// Result of AQ9 calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aq9Result {
    /// Column indices of the ROF features used
    pub rof_features: Vec<usize>,
    /// Per ROF feature statistics (same order as `rof_features`)
    pub concentrations: Vec<FeatureConcentration>,
    /// Weighted matrix over the ROF features only
    pub weighted: RescaledMatrix,
    /// Per-subzone AQ9 score, `None` when there are no ROF features
    pub scores: Vec<Option<f64>>,
}

/// Concentration ratio Y for one column of raw values
///
/// Returns `(threshold, top_mass, total_mass, ratio)`.
pub fn concentration_ratio(values: &[f64], pct: f64) -> (f64, f64, f64, f64) {
    let Some(threshold) = percentile(values, pct) else {
        return (0.0, 0.0, 0.0, 0.0);
    };

    let total_mass: f64 = values.iter().sum();
    let top_mass: f64 = values.iter().filter(|&&v| v >= threshold).sum();

    // Raw sums can overflow near f64::MAX, so the ratio works on max-scaled sums
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if !(scale.is_finite() && scale > 0.0) {
        return (threshold, top_mass, total_mass, 0.0);
    }
    let scaled_total: f64 = values.iter().map(|v| v / scale).sum();
    let scaled_top: f64 = values.iter().filter(|&&v| v >= threshold).map(|v| v / scale).sum();

    let ratio = if scaled_total > 0.0 {
        scaled_top / scaled_total
    } else {
        0.0
    };
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };

    (threshold, top_mass, total_mass, ratio)
}

/// Calculate AQ9 for a dataset
///
/// `percentile` is the concentration percentile (default 95).
pub fn calculate_aq9(
    dataset: &Dataset,
    classification: &Classification,
    percentile: u8,
) -> Aq9Result {
    calculate_aq9_from_rescaled(dataset, &rescale_quantitative(dataset), classification, percentile)
}

/// Calculate AQ9 reusing an existing quantitative rescale of `dataset`
pub fn calculate_aq9_from_rescaled(
    dataset: &Dataset,
    rescaled_quant: &RescaledMatrix,
    classification: &Classification,
    percentile: u8,
) -> Aq9Result {
    let n_rows = dataset.n_subzones();
    let rof_features = classification.features_with(Tag::Rof);

    let mut concentrations = Vec::with_capacity(rof_features.len());
    let mut weighted_columns = Vec::with_capacity(rof_features.len());

    for &feature in &rof_features {
        let values = dataset.column(feature);
        let (threshold, top_mass, total_mass, ratio) =
            concentration_ratio(&values, f64::from(percentile));

        weighted_columns.push(
            rescaled_quant
                .column(feature)
                .iter()
                .map(|&v| v * ratio)
                .collect(),
        );

        concentrations.push(FeatureConcentration {
            feature: dataset.features()[feature].clone(),
            threshold,
            top_mass,
            total_mass,
            ratio,
        });
    }

    let weighted = RescaledMatrix::from_columns(n_rows, weighted_columns);
    let all_weighted: Vec<usize> = (0..weighted.n_columns()).collect();
    let scores = (0..n_rows)
        .map(|row| weighted.row_mean(row, &all_weighted))
        .collect();

    Aq9Result {
        rof_features,
        concentrations,
        weighted,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{classify_features, UserClassifications};
    use crate::detection::DataType;
    use crate::scorer::EvScorer;
    use approx::assert_relative_eq;

    fn twenty_subzones(hotspot: Vec<f64>, uniform: Vec<f64>) -> Dataset {
        let ids: Vec<String> = (1..=20).map(|i| format!("S{}", i)).collect();
        Dataset::new(
            ids,
            vec!["hotspot".to_string(), "uniform".to_string()],
            vec![
                hotspot.into_iter().map(Some).collect(),
                uniform.into_iter().map(Some).collect(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_concentration_ratio_hotspot() {
        let mut values = vec![1.0; 19];
        values.push(100.0);
        let (threshold, top, total, ratio) = concentration_ratio(&values, 95.0);
        assert_relative_eq!(threshold, 5.95, epsilon = 1e-9);
        assert_relative_eq!(top, 100.0);
        assert_relative_eq!(total, 119.0);
        assert_relative_eq!(ratio, 100.0 / 119.0, epsilon = 1e-12);
    }

    #[test]
    fn test_concentration_ratio_zero_total() {
        let (_, _, total, ratio) = concentration_ratio(&[0.0, 0.0, 0.0], 95.0);
        assert_eq!(total, 0.0);
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn test_concentration_ratio_near_f64_max() {
        let mut values = vec![1.0; 10];
        values.extend([1.5e308, 1.5e308]);
        values.resize(20, 0.0);

        let (threshold, _, total, ratio) = concentration_ratio(&values, 95.0);
        assert!(total.is_infinite());
        assert_relative_eq!(threshold, 1.5e308);
        assert!(ratio.is_finite());
        assert_relative_eq!(ratio, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_huge_values_keep_aq_table_finite() {
        let mut values = vec![1.0; 10];
        values.extend([1.5e308, 1.5e308]);
        values.resize(20, 0.0);
        let ids: Vec<String> = (1..=20).map(|i| format!("S{}", i)).collect();
        let ds = Dataset::new(
            ids,
            vec!["biomass".to_string()],
            vec![values.into_iter().map(Some).collect()],
        )
        .unwrap();

        let score = EvScorer::default()
            .score(&ds, Some(DataType::Quantitative), &UserClassifications::default())
            .unwrap();

        assert!(score.aq9.concentrations[0].ratio.is_finite());
        for cell in &score.aq9.scores {
            assert!(cell.unwrap().is_finite());
        }
        for row in score.aq_table.rows() {
            assert!(row.iter().flatten().all(|v| v.is_finite()));
        }
        assert!(score.ev_table.values().iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_hotspot_scores_above_uniform_feature() {
        let mut hotspot = vec![1.0; 19];
        hotspot.push(100.0);
        // Same total mass (119) spread evenly
        let uniform = vec![119.0 / 20.0; 20];

        let ds = twenty_subzones(hotspot, uniform);
        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        let result = calculate_aq9(&ds, &classification, 95);

        assert_eq!(result.rof_features, vec![0, 1]);
        assert_relative_eq!(result.concentrations[0].ratio, 100.0 / 119.0, epsilon = 1e-12);

        // Hotspot subzone: (5 × 0.84 + 0) / 2 features
        let hot = result.scores[19].unwrap();
        assert_relative_eq!(hot, 5.0 * (100.0 / 119.0) / 2.0, epsilon = 1e-9);

        // A uniform feature contributes nothing in any subzone
        assert!(result.weighted.column(1).iter().all(|&v| v == 0.0));
        assert!(result.scores[..19].iter().all(|s| s.unwrap() == 0.0));
    }

    #[test]
    fn test_no_rof_features_is_not_applicable() {
        // Single feature present in 1 of 40 subzones → LRF only
        let ids: Vec<String> = (0..40).map(|i| format!("S{}", i)).collect();
        let column = (0..40).map(|i| Some(if i == 0 { 9.0 } else { 0.0 })).collect();
        let ds = Dataset::new(ids, vec!["rare".to_string()], vec![column]).unwrap();

        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        let result = calculate_aq9(&ds, &classification, 95);

        assert!(result.rof_features.is_empty());
        assert!(result.scores.iter().all(Option::is_none));
    }

    #[test]
    fn test_scores_stay_in_range() {
        let ds = twenty_subzones(
            (0..20).map(|i| (i * i) as f64).collect(),
            (0..20).map(|i| (20 - i) as f64).collect(),
        );
        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        let quant = rescale_quantitative(&ds);
        let result = calculate_aq9_from_rescaled(&ds, &quant, &classification, 95);

        for score in result.scores.iter().flatten() {
            assert!((0.0..=5.0).contains(score));
        }
    }
}
