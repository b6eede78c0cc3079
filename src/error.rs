// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the aggregation engine
//!
//! Only conditions that stop a whole category (or the whole run) live here.
//! Per-sample problems are never errors; see [`crate::aggregation::InvalidReason`].

use std::path::PathBuf;
use thiserror::Error;

use crate::aggregation::MetricCategory;

/// Result type alias
pub type Result<T> = std::result::Result<T, AggregationError>;

/// Aggregation error types
#[derive(Error, Debug)]
pub enum AggregationError {
    /// A category's sample directory is missing or cannot be listed
    #[error("cannot list {category} samples in {}: {source}", .path.display())]
    CategoryDirectory {
        category: MetricCategory,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created
    #[error("failed to build worker pool with {workers} workers: {source}")]
    WorkerPool {
        workers: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// Report could not be written or read
    #[error("report I/O failed for {}: {source}", .path.display())]
    ReportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report (de)serialization error
    #[error("report serialization failed: {0}")]
    ReportFormat(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config could not be serialized
    #[error("failed to serialize config: {0}")]
    ConfigFormat(#[from] toml::ser::Error),

    /// Unrecognized category key
    #[error("unknown metric category: {0}")]
    UnknownCategory(String),
}

impl AggregationError {
    /// Category this error belongs to, if it is scoped to one
    pub fn category(&self) -> Option<MetricCategory> {
        match self {
            AggregationError::CategoryDirectory { category, .. } => Some(*category),
            _ => None,
        }
    }
}
