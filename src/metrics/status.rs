//! Per-question activity status with a human-readable reason

use crate::classification::{Classification, Tag};
use crate::detection::DataType;
use crate::metrics::assessment::AssessmentQuestion;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum AqStatus {
    Active,
    Inactive(String),
}

impl AqStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AqStatus::Active)
    }
}

/// Status of all 15 questions for a data type and classification
pub fn aq_status(
    data_type: DataType,
    classification: &Classification,
) -> Vec<(AssessmentQuestion, AqStatus)> {
    AssessmentQuestion::ALL
        .into_iter()
        .map(|aq| (aq, status_of(aq, data_type, classification)))
        .collect()
}

fn status_of(aq: AssessmentQuestion, data_type: DataType, classification: &Classification) -> AqStatus {
    if aq.data_type() != data_type {
        let required = match aq.data_type() {
            DataType::Qualitative => "Qualitative data required",
            DataType::Quantitative => "Quantitative data required",
        };
        return AqStatus::Inactive(required.to_string());
    }

    match aq.feature_filter().tag() {
        Some(tag) if !classification.has_any(tag) => AqStatus::Inactive(format!(
            "No features classified as {}",
            display_acronym(tag)
        )),
        _ => AqStatus::Active,
    }
}

fn display_acronym(tag: Tag) -> &'static str {
    match tag {
        Tag::HfsBh => "HFS/BH",
        other => other.acronym(),
    }
}
