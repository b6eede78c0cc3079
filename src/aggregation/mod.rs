// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Metric aggregation over per-sample evaluation files

pub mod collector;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod parser;
pub mod reporter;
pub mod stats;
pub mod types;

pub use collector::{CollectionOutcome, ParallelCollector, RejectedSample};
pub use config::{AggregationConfig, DirectoryLayout, DEFAULT_WORKER_COUNT};
pub use discovery::SampleDiscovery;
pub use engine::{aggregate, AggregationEngine};
pub use parser::{
    parse_dangling_edge_length, parse_flux_enclosure_error, parse_sample,
    parse_segment_count_error, parse_self_intersection_ratio,
};
pub use reporter::{CategoryFailure, MetricsReport, Reporter, RunSummary};
pub use stats::{mean, CategorySummary};
pub use types::{sample_identifier, InvalidReason, MetricCategory, SampleInput, SampleValue};
