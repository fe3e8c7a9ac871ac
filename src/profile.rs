//! Per-feature summary statistics (X / Y / Z)
//!
//! Shown alongside the classification step so users can judge which features
//! are rare or concentrated before tagging them:
//! - X: mean of the observed values
//! - Y: % of the total mass held by values at or above the percentile of the
//!   positive values
//! - Z: number of subzones where the feature is present (> 0)
//!
//! Unlike AQ9, the Y percentile here is taken over positive values only.

use crate::data::Dataset;
use crate::utils::percentile;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProfile {
    pub feature: String,
    /// X: mean of non-missing values
    pub mean: Option<f64>,
    /// Y: concentration percentage in [0, 100]
    pub concentration_pct: Option<f64>,
    /// Z: occurrence count
    pub occurrence: Option<usize>,
    pub total: Option<f64>,
}

/// Profile every feature of a dataset
pub fn feature_profiles(dataset: &Dataset, pct: u8) -> Vec<FeatureProfile> {
    dataset
        .features()
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_feature(name, dataset.observed(idx).collect(), pct))
        .collect()
}

fn profile_feature(name: &str, values: Vec<f64>, pct: u8) -> FeatureProfile {
    if values.is_empty() {
        return FeatureProfile {
            feature: name.to_string(),
            mean: None,
            concentration_pct: None,
            occurrence: None,
            total: None,
        };
    }

    let total: f64 = values.iter().sum();
    let mean = total / values.len() as f64;

    let positive: Vec<f64> = values.iter().copied().filter(|&v| v > 0.0).collect();
    let concentration_pct = match percentile(&positive, f64::from(pct)) {
        Some(threshold) if total > 0.0 => {
            let top: f64 = values.iter().filter(|&&v| v >= threshold).sum();
            top / total * 100.0
        }
        _ => 0.0,
    };

    FeatureProfile {
        feature: name.to_string(),
        mean: Some(mean),
        concentration_pct: Some(concentration_pct),
        occurrence: Some(positive.len()),
        total: Some(total),
    }
}
