// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Merge per-sample reconstruction metrics into a single report

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use meshmetrics::aggregation::{AggregationConfig, AggregationEngine, Reporter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "meshmetrics-merge")]
#[command(about = "Aggregate per-sample reconstruction metrics into results.json", long_about = None)]
struct Cli {
    /// The path to the evaluation folder
    path: PathBuf,

    /// Worker threads per category
    #[arg(short, long)]
    workers: Option<usize>,

    /// Categories to aggregate (comma-separated: segment,dangling,intersection,flux)
    #[arg(long)]
    categories: Option<String>,

    /// Config file (defaults to <path>/metrics.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report file name, relative to the evaluation folder
    #[arg(short, long)]
    output: Option<String>,

    /// Also write a Markdown summary next to the report
    #[arg(long)]
    summary: bool,

    /// Show progress bars
    #[arg(long)]
    progress: bool,

    /// Keep going when a category directory cannot be listed
    #[arg(long)]
    keep_going: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AggregationConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.root_dir = cli.path.clone();
            config
        }
        None => AggregationConfig::load(&cli.path).context("Failed to load configuration")?,
    };

    if let Some(workers) = cli.workers {
        config.worker_count = workers;
    }
    if let Some(categories) = &cli.categories {
        config.categories =
            AggregationConfig::parse_categories(categories).context("Invalid --categories")?;
    }
    if let Some(output) = cli.output {
        config.report_file = output;
    }
    config.write_summary |= cli.summary;
    config.show_progress |= cli.progress;
    if cli.keep_going {
        config.fail_fast = false;
    }

    tracing::debug!(?config, "resolved configuration");

    let engine = AggregationEngine::new(config);
    let summary = engine.run_and_write().with_context(|| {
        format!(
            "Failed to aggregate metrics in {}",
            engine.config().root_dir.display()
        )
    })?;

    Reporter::print_summary(&summary);
    println!(
        "{} Report written to {}",
        "Success:".green(),
        engine.config().report_path().display()
    );

    if summary.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
