// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Aggregation configuration system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::types::MetricCategory;
use crate::error::{AggregationError, Result};

/// Default worker pool width
pub const DEFAULT_WORKER_COUNT: usize = 12;

/// Name of the optional config file inside the evaluation root
pub const CONFIG_FILE_NAME: &str = "metrics.toml";

/// Subdirectory names inside the evaluation root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryLayout {
    pub segment_num: String,
    pub gt_segment_num: String,
    pub dangling_edge: String,
    pub self_intersection: String,
    pub flux_enclosure_error: String,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        Self {
            segment_num: "recon_segment_num".to_string(),
            gt_segment_num: "gt_segment_num".to_string(),
            dangling_edge: "recon_dangling_edge".to_string(),
            self_intersection: "recon_self_intersection".to_string(),
            flux_enclosure_error: "recon_flux_enclosure_error".to_string(),
        }
    }
}

impl DirectoryLayout {
    /// Sample directory name of a category
    pub fn sample_dir(&self, category: MetricCategory) -> &str {
        match category {
            MetricCategory::SegmentCountError => &self.segment_num,
            MetricCategory::DanglingEdgeLength => &self.dangling_edge,
            MetricCategory::SelfIntersectionRatio => &self.self_intersection,
            MetricCategory::FluxEnclosureError => &self.flux_enclosure_error,
        }
    }

    /// Ground-truth directory name, for categories that have one
    pub fn reference_dir(&self, category: MetricCategory) -> Option<&str> {
        category
            .requires_reference()
            .then_some(self.gt_segment_num.as_str())
    }
}

/// Aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Evaluation root directory
    pub root_dir: PathBuf,
    /// Worker pool width
    pub worker_count: usize,
    /// Categories to aggregate
    pub categories: Vec<MetricCategory>,
    /// Report file name, relative to the root directory
    pub report_file: String,
    /// Also write a Markdown summary next to the report
    pub write_summary: bool,
    /// Show a progress bar per category
    pub show_progress: bool,
    /// Stop at the first category whose directory cannot be listed
    pub fail_fast: bool,
    /// Subdirectory names
    pub layout: DirectoryLayout,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            worker_count: DEFAULT_WORKER_COUNT,
            categories: MetricCategory::ALL.to_vec(),
            report_file: "results.json".to_string(),
            write_summary: false,
            show_progress: false,
            fail_fast: true,
            layout: DirectoryLayout::default(),
        }
    }
}

impl AggregationConfig {
    /// Default configuration rooted at `root_dir`
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AggregationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| AggregationError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration for `root_dir` with environment variable overrides
    ///
    /// Reads `<root_dir>/metrics.toml` when present. The root directory always
    /// comes from the argument, not from the file.
    pub fn load(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let config_path = root_dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };
        config.root_dir = root_dir;

        if let Ok(workers) = std::env::var("MESHMETRICS_WORKERS") {
            if let Ok(workers) = workers.parse() {
                config.worker_count = workers;
            }
        }

        if let Ok(report_file) = std::env::var("MESHMETRICS_REPORT_FILE") {
            config.report_file = report_file;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        let path = path.as_ref();
        std::fs::write(path, content).map_err(|source| AggregationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a comma-separated category list, e.g. `dangling,flux`
    pub fn parse_categories(list: &str) -> Result<Vec<MetricCategory>> {
        let mut categories = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let category: MetricCategory = item.parse()?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        Ok(categories)
    }

    /// Check if a category should be aggregated
    pub fn should_run_category(&self, category: MetricCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Worker count, never below one
    pub fn effective_workers(&self) -> usize {
        self.worker_count.max(1)
    }

    /// Absolute sample directory of a category
    pub fn sample_dir(&self, category: MetricCategory) -> PathBuf {
        self.root_dir.join(self.layout.sample_dir(category))
    }

    /// Absolute ground-truth directory of a category, if it has one
    pub fn reference_dir(&self, category: MetricCategory) -> Option<PathBuf> {
        self.layout
            .reference_dir(category)
            .map(|dir| self.root_dir.join(dir))
    }

    /// Absolute report path
    pub fn report_path(&self) -> PathBuf {
        self.root_dir.join(&self.report_file)
    }

    /// Absolute Markdown summary path, derived from the report path
    pub fn summary_path(&self) -> PathBuf {
        let report = self.report_path();
        let stem = report
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("results")
            .to_string();
        report.with_file_name(format!("{}_summary.md", stem))
    }
}
