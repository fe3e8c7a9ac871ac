//! Tagged-feature mean (AQ1-AQ8, AQ10-AQ15)
//!
//! Every question other than AQ9 is the same calculation: select the features
//! carrying the question's tag (or all features for AQ7), then average their
//! rescaled values across each subzone row. Averaging over features keeps the
//! score on the 0-5 scale no matter how many features qualify.

use crate::classification::Classification;
use crate::metrics::assessment::{AssessmentQuestion, FeatureFilter};
use crate::utils::RescaledMatrix;

/// Column indices a question averages over
pub fn matching_features(aq: AssessmentQuestion, classification: &Classification) -> Vec<usize> {
    match aq.feature_filter().tag() {
        None => (0..classification.len()).collect(),
        Some(tag) => classification.features_with(tag),
    }
}

/// Per-subzone row means for one question
///
/// Returns `None` for every row when no feature qualifies.
pub fn calculate_tagged_mean(
    aq: AssessmentQuestion,
    rescaled: &RescaledMatrix,
    classification: &Classification,
) -> Vec<Option<f64>> {
    debug_assert!(aq.feature_filter() != FeatureFilter::ConcentrationWeighted);

    let features = matching_features(aq, classification);
    (0..rescaled.n_rows())
        .map(|row| rescaled.row_mean(row, &features))
        .collect()
}
