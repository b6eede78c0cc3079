// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Core aggregation types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::AggregationError;

/// Metric category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    SegmentCountError,
    DanglingEdgeLength,
    SelfIntersectionRatio,
    FluxEnclosureError,
}

impl MetricCategory {
    /// All categories in report order
    pub const ALL: [MetricCategory; 4] = [
        MetricCategory::SegmentCountError,
        MetricCategory::DanglingEdgeLength,
        MetricCategory::SelfIntersectionRatio,
        MetricCategory::FluxEnclosureError,
    ];

    /// Stable field name used in the report
    pub fn report_key(&self) -> &'static str {
        match self {
            MetricCategory::SegmentCountError => "segment_num_error",
            MetricCategory::DanglingEdgeLength => "dangling_edge_length",
            MetricCategory::SelfIntersectionRatio => "self_intersection_percentage",
            MetricCategory::FluxEnclosureError => "flux_enclosure_error",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            MetricCategory::SegmentCountError => "segment count error",
            MetricCategory::DanglingEdgeLength => "dangling edge length",
            MetricCategory::SelfIntersectionRatio => "self-intersection ratio",
            MetricCategory::FluxEnclosureError => "flux enclosure error",
        }
    }

    /// Whether samples of this category are compared against a ground-truth file
    pub fn requires_reference(&self) -> bool {
        matches!(self, MetricCategory::SegmentCountError)
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricCategory {
    type Err = AggregationError;

    /// Accepts the report key or a short alias
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "segment_num_error" | "segment" | "segment_num" => Ok(MetricCategory::SegmentCountError),
            "dangling_edge_length" | "dangling" | "dangling_edge" => {
                Ok(MetricCategory::DanglingEdgeLength)
            }
            "self_intersection_percentage" | "self_intersection" | "intersection" => {
                Ok(MetricCategory::SelfIntersectionRatio)
            }
            "flux_enclosure_error" | "flux" => Ok(MetricCategory::FluxEnclosureError),
            other => Err(AggregationError::UnknownCategory(other.to_string())),
        }
    }
}

/// Identifier of a sample: the file name up to its first `.`
pub fn sample_identifier(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.split('.').next()
}

/// Input for one sample of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInput {
    pub id: String,
    pub path: PathBuf,
    /// Ground-truth file, only for categories that require one
    pub reference: Option<PathBuf>,
}

impl SampleInput {
    pub fn single(path: PathBuf) -> Self {
        let id = sample_identifier(&path).unwrap_or_default().to_string();
        Self {
            id,
            path,
            reference: None,
        }
    }

    pub fn paired(path: PathBuf, reference: PathBuf) -> Self {
        let mut input = Self::single(path);
        input.reference = Some(reference);
        input
    }
}

/// Why a sample produced no usable measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Ground-truth file does not exist
    MissingReference,
    /// Sample and ground-truth identifiers differ
    IdentifierMismatch { sample: String, reference: String },
    /// Category requires a reference but none was paired
    NoReferencePaired,
    /// File could not be opened or read
    Unreadable { message: String },
    /// File ended before the expected line
    Truncated { line: usize },
    /// Line content is not a number of the expected kind
    NotANumber { line: usize, content: String },
    /// Line parses as an infinite value
    NotFinite { line: usize, content: String },
    /// Ratio denominator is zero
    ZeroDenominator,
}

impl InvalidReason {
    /// Stable short name, used for per-reason counts
    pub fn kind(&self) -> &'static str {
        match self {
            InvalidReason::MissingReference => "missing_reference",
            InvalidReason::IdentifierMismatch { .. } => "identifier_mismatch",
            InvalidReason::NoReferencePaired => "no_reference_paired",
            InvalidReason::Unreadable { .. } => "unreadable",
            InvalidReason::Truncated { .. } => "truncated",
            InvalidReason::NotANumber { .. } => "not_a_number",
            InvalidReason::NotFinite { .. } => "not_finite",
            InvalidReason::ZeroDenominator => "zero_denominator",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingReference => write!(f, "reference file missing"),
            InvalidReason::IdentifierMismatch { sample, reference } => {
                write!(f, "identifier mismatch: {} vs {}", sample, reference)
            }
            InvalidReason::NoReferencePaired => write!(f, "no reference paired"),
            InvalidReason::Unreadable { message } => write!(f, "unreadable: {}", message),
            InvalidReason::Truncated { line } => write!(f, "file ends before line {}", line),
            InvalidReason::NotANumber { line, content } => {
                write!(f, "line {} is not a number: {:?}", line, content)
            }
            InvalidReason::NotFinite { line, content } => {
                write!(f, "line {} is not finite: {:?}", line, content)
            }
            InvalidReason::ZeroDenominator => write!(f, "zero denominator"),
        }
    }
}

/// Parsed value of one sample
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Valid(f64),
    Invalid(InvalidReason),
}

impl SampleValue {
    pub fn is_valid(&self) -> bool {
        matches!(self, SampleValue::Valid(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            SampleValue::Valid(v) => Some(*v),
            SampleValue::Invalid(_) => None,
        }
    }
}

impl From<Result<f64, InvalidReason>> for SampleValue {
    fn from(result: Result<f64, InvalidReason>) -> Self {
        match result {
            Ok(v) => SampleValue::Valid(v),
            Err(reason) => SampleValue::Invalid(reason),
        }
    }
}
