//! Rescaling Utilities
//!
//! Maps raw feature values onto the common 0-5 ecological value scale.
//!
//! - Qualitative: presence → 5, absence → 0
//! - Quantitative: per-feature min-max, `5 × (x − min) / (max − min)`
//!
//! A constant quantitative column rescales to 0 everywhere. Output is always
//! finite and inside [0, 5].

use crate::config::MAX_EV_SCALE;
use crate::data::Dataset;
use crate::detection::DataType;
use serde::Serialize;

/// Subzone × feature matrix of rescaled values (column-major)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescaledMatrix {
    n_rows: usize,
    columns: Vec<Vec<f64>>,
}

impl RescaledMatrix {
    pub fn from_columns(n_rows: usize, columns: Vec<Vec<f64>>) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == n_rows));
        Self { n_rows, columns }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.columns[column][row]
    }

    pub fn column(&self, column: usize) -> &[f64] {
        &self.columns[column]
    }

    /// Mean of one row over the selected columns; `None` when none are selected
    pub fn row_mean(&self, row: usize, columns: &[usize]) -> Option<f64> {
        if columns.is_empty() {
            return None;
        }
        let sum: f64 = columns.iter().map(|&c| self.columns[c][row]).sum();
        Some(sum / columns.len() as f64)
    }

    /// Smallest and largest cell, `None` for an empty matrix
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.columns
            .iter()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

fn clamp_scale(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_EV_SCALE)
    } else {
        0.0
    }
}

/// Rescale presence/absence data: any positive value counts as present
pub fn rescale_qualitative(dataset: &Dataset) -> RescaledMatrix {
    let columns = (0..dataset.n_features())
        .map(|feature| {
            dataset
                .column(feature)
                .into_iter()
                .map(|v| if v > 0.0 { MAX_EV_SCALE } else { 0.0 })
                .collect()
        })
        .collect();

    RescaledMatrix::from_columns(dataset.n_subzones(), columns)
}

/// Rescale abundance data with per-feature min-max normalization
pub fn rescale_quantitative(dataset: &Dataset) -> RescaledMatrix {
    let columns = (0..dataset.n_features())
        .map(|feature| min_max_rescale(&dataset.column(feature)))
        .collect();

    RescaledMatrix::from_columns(dataset.n_subzones(), columns)
}

/// Min-max rescale one column onto 0-5; constant columns become all zeros
pub fn min_max_rescale(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|&v| clamp_scale(MAX_EV_SCALE * (v - min) / range))
        .collect()
}

/// Rescale according to the declared data type
pub fn rescale(dataset: &Dataset, data_type: DataType) -> RescaledMatrix {
    match data_type {
        DataType::Qualitative => rescale_qualitative(dataset),
        DataType::Quantitative => rescale_quantitative(dataset),
    }
}
