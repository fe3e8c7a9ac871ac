//! Score ecosystem components and aggregate Total EV
//!
//! Usage:
//!   cargo run --bin eva_score -- Fish=data/fish.csv Benthos=data/benthos.parquet
//!
//! Environment:
//!   EVA_CONFIG      JSON config (thresholds); defaults when unset
//!   EVA_DATA_TYPE   qualitative | quantitative, overrides detection
//!   EVA_TAGS        JSON map of feature name → user tags, e.g. {"cod": ["NRF", "ESF"]}
//!   EVA_OUTPUT_DIR  write per-component results and total_ev.csv here

use anyhow::{bail, Context, Result};
use eva_engine::export::{classification_frame, results_frame, total_ev_frame, write_csv};
use eva_engine::profile::feature_profiles;
use eva_engine::{ComponentInput, ComponentStore, DataType, Dataset, EvScorer, EvaConfig, UserClassifications};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_dataset(path: &Path, config: &EvaConfig) -> Result<Dataset> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => Dataset::load_parquet(path, config),
        _ => Dataset::load_csv(path, config),
    }
}

fn parse_component_arg(arg: &str) -> Result<(String, PathBuf)> {
    let Some((name, path)) = arg.split_once('=') else {
        bail!("Expected NAME=PATH, got '{}'", arg);
    };
    if name.trim().is_empty() {
        bail!("Component name is empty in '{}'", arg);
    }
    Ok((name.trim().to_string(), PathBuf::from(path)))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eva_engine=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("Usage: eva_score NAME=PATH [NAME=PATH ...]");
    }

    let config = match std::env::var("EVA_CONFIG") {
        Ok(path) => EvaConfig::load(Path::new(&path))?,
        Err(_) => EvaConfig::default(),
    };

    let data_type: Option<DataType> = match std::env::var("EVA_DATA_TYPE") {
        Ok(value) => Some(value.parse().map_err(anyhow::Error::msg)?),
        Err(_) => None,
    };

    let user_classifications: UserClassifications = match std::env::var("EVA_TAGS") {
        Ok(path) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read tags file: {}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse tags JSON")?
        }
        Err(_) => UserClassifications::default(),
    };

    let output_dir = std::env::var("EVA_OUTPUT_DIR").ok().map(PathBuf::from);

    tracing::info!("Configuration:");
    tracing::info!("  LRF threshold: {}", config.lrf_threshold);
    tracing::info!("  Concentration percentile: {}", config.concentration_percentile);
    tracing::info!("  Data type: {}", data_type.map_or("auto".to_string(), |t| t.to_string()));

    let mut inputs = Vec::with_capacity(args.len());
    for arg in &args {
        let (name, path) = parse_component_arg(arg)?;
        let dataset = load_dataset(&path, &config)
            .with_context(|| format!("Failed to load component '{}'", name))?;
        inputs.push(ComponentInput {
            name,
            dataset,
            data_type,
            user_classifications: user_classifications.clone(),
        });
    }

    let scorer = EvScorer::new(config.clone())?;
    let start = Instant::now();
    let scores = scorer.score_components_parallel(&inputs)?;
    let elapsed = start.elapsed();

    let mut store = ComponentStore::new();

    for (input, score) in inputs.into_iter().zip(scores) {
        println!("\n{}", "=".repeat(70));
        println!("{} ({}, detected {:?})", input.name, score.data_type, score.detection);
        println!("{}", "=".repeat(70));

        for (aq, status) in &score.statuses {
            match status {
                eva_engine::AqStatus::Active => println!("  {:<5} {}", aq.label(), aq.name()),
                eva_engine::AqStatus::Inactive(reason) => {
                    println!("  {:<5} -  ({})", aq.label(), reason)
                }
            }
        }

        for profile in feature_profiles(&input.dataset, config.concentration_percentile) {
            if let (Some(mean), Some(y), Some(z)) =
                (profile.mean, profile.concentration_pct, profile.occurrence)
            {
                println!("  {:<30} X={:>9.2}  Y={:>6.2}%  Z={}", profile.feature, mean, y, z);
            }
        }

        if let Some(dir) = &output_dir {
            let mut results = results_frame(&input.dataset, &score.aq_table, &score.ev_table)?;
            write_csv(&mut results, &dir.join(format!("{}_results.csv", input.name)))?;
            let mut classes = classification_frame(&score.classification)?;
            write_csv(&mut classes, &dir.join(format!("{}_classification.csv", input.name)))?;
        }

        let snapshot = score.into_snapshot(&input.name, input.dataset, input.user_classifications);
        store.save(snapshot)?;
    }

    println!("\n{}", "=".repeat(70));
    println!("Per-EC Summary");
    println!("{}", "=".repeat(70));
    for summary in store.summaries() {
        println!(
            "  {:<20} {:<13} {:>4} features  mean EV {}",
            summary.name,
            summary.data_type,
            summary.feature_count,
            summary.mean_ev.map_or("n/a".to_string(), |m| format!("{:.3}", m))
        );
    }

    let consistency = store.subzone_consistency();
    for (name, missing) in &consistency.missing {
        println!("  ⚠ {} lacks {} subzone(s), counted as 0", name, missing.len());
    }

    let total = store.aggregate();
    println!("\nTotal EV ({} subzones, top 10):", total.len());
    for (id, value) in total.sorted_by_total().into_iter().take(10) {
        println!("  {:<20} {:>8.3}", id, value);
    }
    if let Some(summary) = total.summary() {
        println!(
            "\n  Sum {:.3}  Mean {:.3}  Max {:.3}  Min {:.3}",
            summary.sum, summary.mean, summary.max, summary.min
        );
    }

    if let Some(dir) = &output_dir {
        let mut frame = total_ev_frame(&total)?;
        write_csv(&mut frame, &dir.join("total_ev.csv"))?;
    }

    println!("\nScored {} component(s) in {:.1} ms", store.len(), elapsed.as_secs_f64() * 1000.0);
    Ok(())
}
