//! Result tables as Polars DataFrames
//!
//! Not-applicable AQ cells and undefined EVs become nulls, so they stay
//! distinguishable from a genuine 0 in the written files.

use crate::classification::{Classification, Tag};
use crate::data::{Dataset, SUBZONE_ID};
use crate::metrics::{AqTable, AssessmentQuestion, EvTable};
use crate::store::TotalEvTable;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

/// Subzone ID, raw features, AQ1..AQ15 and EV
pub fn results_frame(dataset: &Dataset, aq_table: &AqTable, ev_table: &EvTable) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(dataset.n_features() + 17);
    columns.push(Series::new(SUBZONE_ID.into(), dataset.subzone_ids()).into());

    for (idx, name) in dataset.features().iter().enumerate() {
        columns.push(Series::new(name.as_str().into(), dataset.raw_column(idx)).into());
    }

    for aq in AssessmentQuestion::ALL {
        columns.push(Series::new(aq.label().into(), aq_table.column(aq)).into());
    }

    columns.push(Series::new("EV".into(), ev_table.values()).into());
    DataFrame::new(columns)
}

/// Feature name plus one boolean column per tag
pub fn classification_frame(classification: &Classification) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(Tag::ALL.len() + 1);
    columns.push(Series::new("Feature".into(), classification.features()).into());

    for tag in Tag::ALL {
        let flags: Vec<bool> = (0..classification.len())
            .map(|idx| classification.tags_at(idx).contains(tag))
            .collect();
        columns.push(Series::new(tag.acronym().into(), flags).into());
    }

    DataFrame::new(columns)
}

/// Subzone ID, one EV column per component, Total EV
pub fn total_ev_frame(total: &TotalEvTable) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(total.components().len() + 2);
    columns.push(Series::new(SUBZONE_ID.into(), total.subzone_ids()).into());

    for (idx, name) in total.components().iter().enumerate() {
        columns.push(Series::new(name.as_str().into(), total.component_column(idx)).into());
    }

    columns.push(Series::new("Total EV".into(), total.totals()).into());
    DataFrame::new(columns)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV: {:?}", path))?;

    info!("Wrote {} rows × {} cols to {:?}", df.height(), df.width(), path);
    Ok(())
}

/// Write a frame as ZSTD-compressed Parquet
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(df)
        .with_context(|| format!("Failed to write Parquet: {:?}", path))?;

    info!("Wrote {} rows to {:?}", df.height(), path);
    Ok(())
}
