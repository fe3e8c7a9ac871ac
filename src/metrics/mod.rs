//! Assessment Question modules for EV scoring
//!
//! AQ1-AQ15 share one calculator (tagged-feature row mean) except AQ9, which
//! has its own concentration-weighted matrix. EV is reduced from the table.

pub mod assessment;
pub mod tagged_mean;
pub mod aq9_concentration;
pub mod ecological_value;
pub mod status;

// Re-export metric functions
pub use assessment::{AssessmentQuestion, FeatureFilter, QUALITATIVE_AQS, QUANTITATIVE_AQS};
pub use tagged_mean::{calculate_tagged_mean, matching_features};
pub use aq9_concentration::{calculate_aq9, calculate_aq9_from_rescaled, concentration_ratio, Aq9Result, FeatureConcentration};
pub use ecological_value::{calculate_ev, EvTable};
pub use status::{aq_status, AqStatus};

use crate::classification::Classification;
use crate::data::Dataset;
use crate::detection::DataType;
use crate::utils::RescaledMatrix;
use serde::{Deserialize, Serialize};

/// One subzone's AQ1..AQ15 scores; `None` = not applicable
pub type AqRow = [Option<f64>; 15];

/// Subzone × AQ1..AQ15
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqTable {
    subzone_ids: Vec<String>,
    rows: Vec<AqRow>,
}

impl AqTable {
    pub fn new(subzone_ids: Vec<String>, rows: Vec<AqRow>) -> Self {
        debug_assert_eq!(subzone_ids.len(), rows.len());
        Self { subzone_ids, rows }
    }

    pub fn subzone_ids(&self) -> &[String] {
        &self.subzone_ids
    }

    pub fn rows(&self) -> &[AqRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Score of one question in one subzone row
    pub fn get(&self, row: usize, aq: AssessmentQuestion) -> Option<f64> {
        self.rows[row][aq.index()]
    }

    /// Row of a subzone by ID
    pub fn row_for(&self, subzone_id: &str) -> Option<&AqRow> {
        self.subzone_ids
            .iter()
            .position(|id| id == subzone_id)
            .map(|idx| &self.rows[idx])
    }

    /// All values of one question, top to bottom
    pub fn column(&self, aq: AssessmentQuestion) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row[aq.index()]).collect()
    }

    /// True when the question has a value in at least one subzone
    pub fn is_applicable(&self, aq: AssessmentQuestion) -> bool {
        self.rows.iter().any(|row| row[aq.index()].is_some())
    }
}

/// Calculate all 15 assessment questions
///
/// Questions for the other data type are not applicable. Qualitative
/// questions read `rescaled_qual`, quantitative ones `rescaled_quant`, and
/// AQ9 takes its scores from `aq9`.
pub fn calculate_all_aqs(
    dataset: &Dataset,
    data_type: DataType,
    rescaled_qual: &RescaledMatrix,
    rescaled_quant: &RescaledMatrix,
    aq9: &Aq9Result,
    classification: &Classification,
) -> AqTable {
    let n_rows = dataset.n_subzones();
    let mut rows: Vec<AqRow> = vec![[None; 15]; n_rows];

    for aq in AssessmentQuestion::for_data_type(data_type) {
        let column = match aq.feature_filter() {
            FeatureFilter::ConcentrationWeighted => aq9.scores.clone(),
            _ => {
                let matrix = match aq.data_type() {
                    DataType::Qualitative => rescaled_qual,
                    DataType::Quantitative => rescaled_quant,
                };
                calculate_tagged_mean(*aq, matrix, classification)
            }
        };

        for (row, value) in rows.iter_mut().zip(column) {
            row[aq.index()] = value;
        }
    }

    AqTable::new(dataset.subzone_ids().to_vec(), rows)
}
