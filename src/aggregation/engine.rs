// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Aggregation engine - drives discovery, collection, reduction and reporting

use std::time::Instant;

use super::collector::ParallelCollector;
use super::config::AggregationConfig;
use super::discovery::SampleDiscovery;
use super::parser::parse_sample;
use super::reporter::{Reporter, RunSummary};
use super::stats::CategorySummary;
use super::types::MetricCategory;
use crate::error::Result;

/// Aggregation engine
#[derive(Debug)]
pub struct AggregationEngine {
    config: AggregationConfig,
    collector: ParallelCollector,
}

impl AggregationEngine {
    /// Create a new engine
    pub fn new(config: AggregationConfig) -> Self {
        let collector =
            ParallelCollector::new(config.effective_workers()).with_progress(config.show_progress);
        Self { config, collector }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn collector(&self) -> &ParallelCollector {
        &self.collector
    }

    /// Sample discovery for a category under the configured root
    pub fn discovery(&self, category: MetricCategory) -> SampleDiscovery {
        let discovery = SampleDiscovery::new(category, self.config.sample_dir(category));
        match self.config.reference_dir(category) {
            Some(reference_dir) => discovery.with_reference(reference_dir),
            None => discovery,
        }
    }

    /// Aggregate a single category
    ///
    /// Fails only when the category directory cannot be listed or the worker
    /// pool cannot be built.
    pub fn run_category(&self, category: MetricCategory) -> Result<CategorySummary> {
        let samples = self.discovery(category).discover()?;
        tracing::debug!(
            category = category.report_key(),
            samples = samples.len(),
            "discovered samples"
        );

        let outcome = self
            .collector
            .collect(category, &samples, |input| parse_sample(category, input))?;
        let summary = CategorySummary::from_outcome(category, &outcome);

        match summary.mean {
            Some(mean) => tracing::info!(
                category = category.report_key(),
                valid = summary.valid,
                listed = summary.listed,
                mean,
                "category aggregated"
            ),
            None => tracing::warn!(
                category = category.report_key(),
                listed = summary.listed,
                "no valid samples, aggregate is missing"
            ),
        }

        Ok(summary)
    }

    /// Aggregate every configured category
    ///
    /// With `fail_fast` the first fatal category error is returned; otherwise
    /// it is recorded in the summary and the remaining categories still run.
    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new(&self.config.root_dir);

        for category in MetricCategory::ALL {
            if !self.config.should_run_category(category) {
                continue;
            }

            match self.run_category(category) {
                Ok(category_summary) => summary.add_category(category_summary),
                Err(e) if !self.config.fail_fast => {
                    tracing::error!(category = category.report_key(), error = %e, "category failed");
                    summary.add_failure(category, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        summary.duration_secs = start.elapsed().as_secs_f64();
        Ok(summary)
    }

    /// Run and write the JSON report (and the Markdown summary if enabled)
    pub fn run_and_write(&self) -> Result<RunSummary> {
        let summary = self.run()?;

        let report_path = self.config.report_path();
        Reporter::write_json(&summary.report, &report_path)?;
        tracing::info!(path = %report_path.display(), "report written");

        if self.config.write_summary {
            let summary_path = self.config.summary_path();
            Reporter::write_markdown(&summary, &summary_path)?;
            tracing::info!(path = %summary_path.display(), "summary written");
        }

        Ok(summary)
    }
}

/// Aggregate the evaluation root described by `config` and write its report
pub fn aggregate(config: AggregationConfig) -> Result<RunSummary> {
    AggregationEngine::new(config).run_and_write()
}
