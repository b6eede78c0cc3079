// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshmetrics
//!
//! Aggregates per-sample quality metrics of mesh reconstructions (segment
//! count error, dangling edge length, self-intersection ratio, flux enclosure
//! error) into one report of per-category means.

pub mod aggregation;
pub mod error;

pub use aggregation::{
    aggregate, AggregationConfig, AggregationEngine, CategorySummary, InvalidReason,
    MetricCategory, MetricsReport, Reporter, RunSummary, SampleValue,
};
pub use error::{AggregationError, Result};

use std::path::Path;

/// Aggregate an evaluation folder with default settings and write `results.json`
pub fn merge_results(root_dir: impl AsRef<Path>) -> Result<MetricsReport> {
    let config = AggregationConfig::new(root_dir.as_ref());
    aggregate(config).map(|summary| summary.report)
}
