//! Data Type Detection
//!
//! Decides whether a dataset holds presence/absence records (qualitative) or
//! continuous abundances (quantitative). Each feature column votes; the
//! majority wins and ties go to quantitative.

use crate::data::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns with more distinct values than this count as continuous
const MAX_CATEGORICAL_UNIQUE: usize = 10;

/// Data type of a dataset; gates which assessment questions apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Qualitative,
    Quantitative,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Qualitative => "qualitative",
            DataType::Quantitative => "quantitative",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qualitative" | "qual" => Ok(DataType::Qualitative),
            "quantitative" | "quant" => Ok(DataType::Quantitative),
            other => Err(format!("unknown data type '{}'", other)),
        }
    }
}

/// Outcome of automatic detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detection {
    Qualitative,
    Quantitative,
    /// No feature column held any value
    Undetermined,
}

impl Detection {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Detection::Qualitative => Some(DataType::Qualitative),
            Detection::Quantitative => Some(DataType::Quantitative),
            Detection::Undetermined => None,
        }
    }
}

/// How a single column looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Binary,
    LowCardinality,
    Continuous,
}

fn classify_column(values: &[f64]) -> ColumnKind {
    if values.iter().all(|&v| v == 0.0 || v == 1.0) {
        return ColumnKind::Binary;
    }

    let has_decimals = values.iter().any(|&v| v.fract() != 0.0);

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();

    if has_decimals || max - min > 1.0 || distinct.len() > MAX_CATEGORICAL_UNIQUE {
        ColumnKind::Continuous
    } else {
        ColumnKind::LowCardinality
    }
}

/// Detect whether a dataset is qualitative or quantitative
///
/// Never fails: a dataset without a single observed value is `Undetermined`.
pub fn detect_data_type(dataset: &Dataset) -> Detection {
    let mut qualitative_votes = 0usize;
    let mut quantitative_votes = 0usize;

    for feature in 0..dataset.n_features() {
        let values: Vec<f64> = dataset.observed(feature).collect();
        if values.is_empty() {
            continue;
        }
        match classify_column(&values) {
            ColumnKind::Binary | ColumnKind::LowCardinality => qualitative_votes += 1,
            ColumnKind::Continuous => quantitative_votes += 1,
        }
    }

    if qualitative_votes == 0 && quantitative_votes == 0 {
        Detection::Undetermined
    } else if qualitative_votes > quantitative_votes {
        Detection::Qualitative
    } else {
        Detection::Quantitative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_is_qualitative() {
        let ds = Dataset::from_rows(
            &["S1", "S2", "S3"],
            &["kelp", "cod"],
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        )
        .unwrap();
        assert_eq!(detect_data_type(&ds), Detection::Qualitative);
    }

    #[test]
    fn test_decimals_are_quantitative() {
        let ds = Dataset::from_rows(
            &["S1", "S2", "S3"],
            &["kelp", "cod"],
            &[vec![0.5, 12.0], vec![2.25, 0.0], vec![0.0, 40.0]],
        )
        .unwrap();
        assert_eq!(detect_data_type(&ds), Detection::Quantitative);
    }

    #[test]
    fn test_low_cardinality_integers_count_as_qualitative() {
        // Values 1 and 2 only: range 1, no decimals, two distinct values
        let values = [1.0, 2.0, 2.0, 1.0];
        assert_eq!(classify_column(&values), ColumnKind::LowCardinality);
    }

    #[test]
    fn test_high_cardinality_is_continuous() {
        let wide: Vec<f64> = (0..12).map(|v| v as f64).collect();
        assert_eq!(classify_column(&wide), ColumnKind::Continuous);
    }

    #[test]
    fn test_tie_goes_to_quantitative() {
        let ds = Dataset::from_rows(
            &["S1", "S2"],
            &["presence", "abundance"],
            &[vec![1.0, 17.0], vec![0.0, 3.0]],
        )
        .unwrap();
        assert_eq!(detect_data_type(&ds), Detection::Quantitative);
    }

    #[test]
    fn test_all_missing_is_undetermined() {
        let ds = Dataset::new(
            vec!["S1".to_string(), "S2".to_string()],
            vec!["kelp".to_string()],
            vec![vec![None, None]],
        )
        .unwrap();
        assert_eq!(detect_data_type(&ds), Detection::Undetermined);
        assert_eq!(detect_data_type(&ds).data_type(), None);
    }

    #[test]
    fn test_data_type_parse_and_display() {
        assert_eq!("Quantitative".parse::<DataType>().unwrap(), DataType::Quantitative);
        assert_eq!("qual".parse::<DataType>().unwrap(), DataType::Qualitative);
        assert!("maybe".parse::<DataType>().is_err());
        assert_eq!(DataType::Qualitative.to_string(), "qualitative");
    }
}
