//! Dataset Loading and Validation
//!
//! A dataset is one ecosystem component's survey table: a `Subzone ID` key
//! column followed by numeric feature columns. Structural problems are
//! rejected here, before any calculation runs.
//!
//! Missing and unparseable cells are kept as `None` so they can be reported,
//! but every calculation reads them as 0.

use crate::config::EvaConfig;
use crate::error::DatasetError;
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Name of the key column
pub const SUBZONE_ID: &str = "Subzone ID";

/// String values treated as missing in text columns
const NA_TOKENS: &[&str] = &["NA", "N/A", "na", "n/a", "null", "NULL", "None", ""];

/// One ecosystem component's subzone × feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    subzone_ids: Vec<String>,
    features: Vec<String>,
    /// Column-major raw values; `None` = missing
    columns: Vec<Vec<Option<f64>>>,
    /// Per feature: cells that were present but not numeric
    coerced: Vec<usize>,
}

/// Missing-data summary for one feature column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValidation {
    pub name: String,
    pub missing: usize,
    pub missing_pct: f64,
    pub coerced: usize,
}

/// Upload validation summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub rows: usize,
    pub feature_count: usize,
    pub features: Vec<FeatureValidation>,
}

impl ValidationReport {
    /// Total missing cells across all features
    pub fn total_missing(&self) -> usize {
        self.features.iter().map(|f| f.missing).sum()
    }

    pub fn has_issues(&self) -> bool {
        self.features.iter().any(|f| f.missing > 0 || f.coerced > 0)
    }
}

impl Dataset {
    /// Build a dataset from column-major values, validating its structure
    ///
    /// Subzone IDs are trimmed. Non-finite values are treated as missing.
    pub fn new(
        subzone_ids: Vec<String>,
        features: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, DatasetError> {
        let coerced = vec![0; features.len()];
        Self::build(subzone_ids, features, columns, coerced)
    }

    /// Build a dataset from complete row-major values
    pub fn from_rows(
        subzone_ids: &[&str],
        features: &[&str],
        rows: &[Vec<f64>],
    ) -> Result<Self, DatasetError> {
        let n_features = features.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); n_features];
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(DatasetError::RaggedColumn {
                    column: format!("row {}", row_idx),
                    expected: n_features,
                    actual: row.len(),
                });
            }
            for (col_idx, value) in row.iter().enumerate() {
                columns[col_idx].push(Some(*value));
            }
        }

        Self::new(
            subzone_ids.iter().map(|s| s.to_string()).collect(),
            features.iter().map(|s| s.to_string()).collect(),
            columns,
        )
    }

    fn build(
        subzone_ids: Vec<String>,
        features: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
        coerced: Vec<usize>,
    ) -> Result<Self, DatasetError> {
        if features.is_empty() {
            return Err(DatasetError::NoFeatureColumns);
        }
        if subzone_ids.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }

        let n_rows = subzone_ids.len();

        // Subzone IDs: trimmed, non-blank, unique
        let mut seen: FxHashMap<String, usize> = FxHashMap::default();
        let mut ids = Vec::with_capacity(n_rows);
        for (row, raw) in subzone_ids.into_iter().enumerate() {
            let id = raw.trim().to_string();
            if id.is_empty() {
                return Err(DatasetError::MissingSubzoneId { row });
            }
            if let Some(&first_row) = seen.get(&id) {
                return Err(DatasetError::DuplicateSubzoneId { id, first_row, row });
            }
            seen.insert(id.clone(), row);
            ids.push(id);
        }

        let mut names_seen = FxHashSet::default();
        for name in &features {
            if !names_seen.insert(name.as_str()) {
                return Err(DatasetError::DuplicateFeature { name: name.clone() });
            }
        }

        if columns.len() != features.len() {
            return Err(DatasetError::RaggedColumn {
                column: "<feature list>".to_string(),
                expected: features.len(),
                actual: columns.len(),
            });
        }

        let mut cleaned = Vec::with_capacity(columns.len());
        for (name, column) in features.iter().zip(columns) {
            if column.len() != n_rows {
                return Err(DatasetError::RaggedColumn {
                    column: name.clone(),
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            cleaned.push(
                column
                    .into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect::<Vec<_>>(),
            );
        }

        Ok(Self {
            subzone_ids: ids,
            features,
            columns: cleaned,
            coerced,
        })
    }

    /// Build a dataset from a polars DataFrame
    ///
    /// The key column is `Subzone ID`, or else the first column whose name
    /// mentions "id" or "subzone". Every other column is a feature.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let id_name = resolve_id_column(&names).ok_or_else(|| DatasetError::MissingIdColumn {
            available: names.clone(),
        })?;
        if id_name != SUBZONE_ID {
            debug!("Using '{}' as the Subzone ID column", id_name);
        }

        let id_column = df
            .column(&id_name)?
            .cast(&DataType::String)
            .with_context(|| format!("Subzone ID column '{}' could not be read as text", id_name))?;

        let mut subzone_ids = Vec::with_capacity(df.height());
        for (row, value) in id_column.str()?.into_iter().enumerate() {
            match value {
                Some(id) => subzone_ids.push(id.to_string()),
                None => return Err(DatasetError::MissingSubzoneId { row }.into()),
            }
        }

        let mut features = Vec::new();
        let mut columns = Vec::new();
        let mut coerced = Vec::new();
        for name in names.iter().filter(|n| **n != id_name) {
            let (values, n_coerced) = read_feature_column(df.column(name)?, name)?;
            if n_coerced > 0 {
                debug!("Feature '{}': {} non-numeric cells treated as missing", name, n_coerced);
            }
            features.push(name.clone());
            columns.push(values);
            coerced.push(n_coerced);
        }

        Ok(Self::build(subzone_ids, features, columns, coerced)?)
    }

    /// Load a dataset from a CSV file
    pub fn load_csv(path: &Path, config: &EvaConfig) -> Result<Self> {
        check_file_size(path, config.max_file_size_mb)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to read CSV: {:?}", path))?;

        let dataset = Self::from_dataframe(&df)?;
        info!(
            "Loaded {:?}: {} subzones × {} features",
            path,
            dataset.n_subzones(),
            dataset.n_features()
        );
        Ok(dataset)
    }

    /// Load a dataset from a Parquet file
    pub fn load_parquet(path: &Path, config: &EvaConfig) -> Result<Self> {
        check_file_size(path, config.max_file_size_mb)?;

        let df = LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to scan parquet: {:?}", path))?
            .collect()
            .with_context(|| format!("Failed to load parquet: {:?}", path))?;

        let dataset = Self::from_dataframe(&df)?;
        info!(
            "Loaded {:?}: {} subzones × {} features",
            path,
            dataset.n_subzones(),
            dataset.n_features()
        );
        Ok(dataset)
    }

    pub fn n_subzones(&self) -> usize {
        self.subzone_ids.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn subzone_ids(&self) -> &[String] {
        &self.subzone_ids
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    /// Raw values of one feature, `None` where missing
    pub fn raw_column(&self, feature: usize) -> &[Option<f64>] {
        &self.columns[feature]
    }

    /// Values of one feature with missing cells read as 0
    pub fn column(&self, feature: usize) -> Vec<f64> {
        self.columns[feature].iter().map(|v| v.unwrap_or(0.0)).collect()
    }

    /// Value at (subzone row, feature), missing read as 0
    pub fn value(&self, row: usize, feature: usize) -> f64 {
        self.columns[feature][row].unwrap_or(0.0)
    }

    /// Non-missing values of one feature
    pub fn observed(&self, feature: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns[feature].iter().filter_map(|v| *v)
    }

    pub fn validation_report(&self) -> ValidationReport {
        let rows = self.n_subzones();
        let features = self
            .features
            .iter()
            .zip(&self.columns)
            .zip(&self.coerced)
            .map(|((name, column), &coerced)| {
                let missing = column.iter().filter(|v| v.is_none()).count();
                FeatureValidation {
                    name: name.clone(),
                    missing,
                    missing_pct: (missing as f64 / rows as f64 * 1000.0).round() / 10.0,
                    coerced,
                }
            })
            .collect();

        ValidationReport {
            rows,
            feature_count: self.n_features(),
            features,
        }
    }
}

/// Pick the key column: exact `Subzone ID`, else the first id-like column
fn resolve_id_column(names: &[String]) -> Option<String> {
    if names.iter().any(|n| n == SUBZONE_ID) {
        return Some(SUBZONE_ID.to_string());
    }
    names
        .iter()
        .find(|n| {
            let lower = n.to_lowercase();
            lower.contains("id") || lower.contains("subzone")
        })
        .cloned()
}

/// Read one feature column as f64 values plus the count of coerced cells
fn read_feature_column(column: &Column, name: &str) -> Result<(Vec<Option<f64>>, usize)> {
    if column.dtype() == &DataType::String {
        return Ok(parse_text_column(column.str()?, name)?);
    }

    let cast = column.cast(&DataType::Float64).map_err(|_| DatasetError::NonNumericFeature {
        column: name.to_string(),
        row: 0,
        value: column.dtype().to_string(),
    })?;

    Ok((cast.f64()?.into_iter().collect(), 0))
}

/// Parse a text column cell by cell
///
/// NA tokens become missing. Text such as "nan" or "inf" counts as
/// unparseable. A column where nothing parses is rejected; stray unparseable
/// cells in an otherwise numeric column become missing.
fn parse_text_column(
    values: &StringChunked,
    name: &str,
) -> Result<(Vec<Option<f64>>, usize), DatasetError> {
    let mut parsed = Vec::with_capacity(values.len());
    let mut first_bad: Option<(usize, String)> = None;
    let mut n_bad = 0;
    let mut n_numeric = 0;

    for (row, cell) in values.into_iter().enumerate() {
        let Some(text) = cell.map(str::trim) else {
            parsed.push(None);
            continue;
        };
        if NA_TOKENS.contains(&text) {
            parsed.push(None);
            continue;
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => {
                n_numeric += 1;
                parsed.push(Some(v));
            }
            _ => {
                n_bad += 1;
                if first_bad.is_none() {
                    first_bad = Some((row, text.to_string()));
                }
                parsed.push(None);
            }
        }
    }

    if n_numeric == 0 {
        if let Some((row, value)) = first_bad {
            return Err(DatasetError::NonNumericFeature {
                column: name.to_string(),
                row,
                value,
            });
        }
    }

    Ok((parsed, n_bad))
}

fn check_file_size(path: &Path, max_mb: u64) -> Result<()> {
    let size_bytes = fs::metadata(path)
        .with_context(|| format!("Could not check file size: {:?}", path))?
        .len();
    let size_mb = size_bytes as f64 / (1024.0 * 1024.0);
    if size_mb > max_mb as f64 {
        return Err(DatasetError::FileTooLarge { size_mb, max_mb }.into());
    }
    Ok(())
}
