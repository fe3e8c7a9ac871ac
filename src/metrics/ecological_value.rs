//! Ecological Value (EV) aggregation
//!
//! EV is the MAXIMUM of the assessment questions applicable to the data type,
//! not an average: one strongly met criterion is enough to mark a subzone as
//! valuable. Not-applicable questions are skipped rather than counted as 0.
//!
//! - Qualitative: EV = MAX(AQ1, AQ3, AQ5, AQ7, AQ10, AQ12, AQ14)
//! - Quantitative: EV = MAX(AQ2, AQ4, AQ6, AQ8, AQ9, AQ11, AQ13, AQ15)

use crate::detection::DataType;
use crate::metrics::assessment::AssessmentQuestion;
use crate::metrics::AqTable;
use serde::{Deserialize, Serialize};

/// Subzone → EV (undefined when every applicable question is not applicable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvTable {
    subzone_ids: Vec<String>,
    values: Vec<Option<f64>>,
}

impl EvTable {
    pub fn new(subzone_ids: Vec<String>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(subzone_ids.len(), values.len());
        Self { subzone_ids, values }
    }

    pub fn subzone_ids(&self) -> &[String] {
        &self.subzone_ids
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// EV of a subzone; outer `None` = unknown subzone
    pub fn get(&self, subzone_id: &str) -> Option<Option<f64>> {
        self.subzone_ids
            .iter()
            .position(|id| id == subzone_id)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.subzone_ids
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    /// Mean over subzones with a defined EV
    pub fn mean(&self) -> Option<f64> {
        let (sum, n) = self.defined().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.defined().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.defined().reduce(f64::min)
    }
}

/// Calculate EV for every subzone of an AQ table
pub fn calculate_ev(aq_table: &AqTable, data_type: DataType) -> EvTable {
    let questions = AssessmentQuestion::for_data_type(data_type);

    let values = aq_table
        .rows()
        .iter()
        .map(|row| {
            questions
                .iter()
                .filter_map(|aq| row[aq.index()])
                .reduce(f64::max)
        })
        .collect();

    EvTable::new(aq_table.subzone_ids().to_vec(), values)
}
