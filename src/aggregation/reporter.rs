// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Report generation (JSON, Markdown and terminal)

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::stats::CategorySummary;
use super::types::MetricCategory;
use crate::error::{AggregationError, Result};

/// Per-category means, one field per category
///
/// A category without data is written as `null`, never omitted and never `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub segment_num_error: Option<f64>,
    pub dangling_edge_length: Option<f64>,
    pub self_intersection_percentage: Option<f64>,
    pub flux_enclosure_error: Option<f64>,
}

impl MetricsReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from category summaries; categories not present stay `None`
    pub fn from_summaries(summaries: &[CategorySummary]) -> Self {
        let mut report = Self::new();
        for summary in summaries {
            report.set(summary.category, summary.mean);
        }
        report
    }

    pub fn get(&self, category: MetricCategory) -> Option<f64> {
        match category {
            MetricCategory::SegmentCountError => self.segment_num_error,
            MetricCategory::DanglingEdgeLength => self.dangling_edge_length,
            MetricCategory::SelfIntersectionRatio => self.self_intersection_percentage,
            MetricCategory::FluxEnclosureError => self.flux_enclosure_error,
        }
    }

    pub fn set(&mut self, category: MetricCategory, value: Option<f64>) {
        let slot = match category {
            MetricCategory::SegmentCountError => &mut self.segment_num_error,
            MetricCategory::DanglingEdgeLength => &mut self.dangling_edge_length,
            MetricCategory::SelfIntersectionRatio => &mut self.self_intersection_percentage,
            MetricCategory::FluxEnclosureError => &mut self.flux_enclosure_error,
        };
        *slot = value;
    }
}

/// A category that could not be aggregated at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFailure {
    pub category: MetricCategory,
    pub error: String,
}

/// Everything known about one aggregation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub root_dir: PathBuf,
    pub duration_secs: f64,
    pub report: MetricsReport,
    pub categories: Vec<CategorySummary>,
    pub failures: Vec<CategoryFailure>,
}

impl RunSummary {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            root_dir: root_dir.into(),
            duration_secs: 0.0,
            report: MetricsReport::new(),
            categories: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn add_category(&mut self, summary: CategorySummary) {
        self.report.set(summary.category, summary.mean);
        self.categories.push(summary);
    }

    pub fn add_failure(&mut self, category: MetricCategory, error: String) {
        self.report.set(category, None);
        self.failures.push(CategoryFailure { category, error });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn category(&self, category: MetricCategory) -> Option<&CategorySummary> {
        self.categories.iter().find(|s| s.category == category)
    }
}

/// Report writer
pub struct Reporter;

impl Reporter {
    /// Write the per-category report as pretty JSON
    pub fn write_json(report: &MetricsReport, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).map_err(|source| AggregationError::ReportIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a report previously written by [`Reporter::write_json`]
    pub fn read_json(path: &Path) -> Result<MetricsReport> {
        let content = fs::read_to_string(path).map_err(|source| AggregationError::ReportIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Render the Markdown summary
    pub fn render_markdown(summary: &RunSummary) -> String {
        let mut md = String::new();

        md.push_str("# Reconstruction Metrics Report\n\n");
        md.push_str(&format!("**Generated:** {}\n\n", summary.timestamp));
        md.push_str(&format!("**Evaluation root:** `{}`\n\n", summary.root_dir.display()));
        md.push_str("---\n\n");

        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Mean | Valid | Listed | Invalid | NaN |\n");
        md.push_str("|--------|------|-------|--------|---------|-----|\n");
        for category in MetricCategory::ALL {
            let mean = format_mean(summary.report.get(category));
            match summary.category(category) {
                Some(s) => md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    category.report_key(),
                    mean,
                    s.valid,
                    s.listed,
                    s.invalid_total(),
                    s.nan_excluded
                )),
                None => md.push_str(&format!(
                    "| {} | {} | - | - | - | - |\n",
                    category.report_key(),
                    mean
                )),
            }
        }

        let with_invalid: Vec<_> = summary
            .categories
            .iter()
            .filter(|s| !s.invalid.is_empty())
            .collect();
        if !with_invalid.is_empty() {
            md.push_str("\n## Excluded Samples\n\n");
            for s in with_invalid {
                md.push_str(&format!("### {}\n\n", s.category.report_key()));
                for (kind, count) in &s.invalid {
                    md.push_str(&format!("- `{}`: {}\n", kind, count));
                }
                md.push('\n');
            }
        }

        if summary.has_failures() {
            md.push_str("\n## Failed Categories\n\n");
            for failure in &summary.failures {
                md.push_str(&format!(
                    "- **{}**: {}\n",
                    failure.category.report_key(),
                    failure.error
                ));
            }
        }

        md.push_str(&format!(
            "\n---\n\n*Aggregated in {:.2}s*\n",
            summary.duration_secs
        ));
        md
    }

    /// Write the Markdown summary
    pub fn write_markdown(summary: &RunSummary, path: &Path) -> Result<()> {
        fs::write(path, Self::render_markdown(summary)).map_err(|source| {
            AggregationError::ReportIo {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Print terminal summary
    pub fn print_summary(summary: &RunSummary) {
        println!("\n{}", "═".repeat(72).white());
        println!("{}", "Reconstruction Metrics".bold());
        println!("{}", "═".repeat(72).white());
        println!("  {} {}", "Timestamp:".white(), summary.timestamp.cyan());
        println!(
            "  {} {}",
            "Root:".white(),
            summary.root_dir.display().to_string().cyan()
        );
        println!("  {} {:.2}s", "Duration:".white(), summary.duration_secs);
        println!("{}", "─".repeat(72).white());

        for category in MetricCategory::ALL {
            let value = summary.report.get(category);
            let icon = if value.is_some() { "✓".green() } else { "∅".yellow() };
            let mean = match value {
                Some(v) => format!("{:.6}", v).green(),
                None => "missing".yellow(),
            };
            let counts = summary
                .category(category)
                .map(|s| format!("({}/{} valid)", s.valid, s.listed))
                .unwrap_or_else(|| "(not run)".to_string());

            println!(
                "  {} {:<30} {} {}",
                icon,
                category.report_key().cyan(),
                mean,
                counts.white()
            );
        }

        if summary.has_failures() {
            println!("\n{}", "Failed Categories".red().bold());
            println!("{}", "─".repeat(72).white());
            for failure in &summary.failures {
                println!(
                    "  {} {}: {}",
                    "✗".red(),
                    failure.category.report_key().bold(),
                    failure.error
                );
            }
        }

        println!("{}", "═".repeat(72).white());
    }
}

fn format_mean(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => "missing".to_string(),
    }
}
