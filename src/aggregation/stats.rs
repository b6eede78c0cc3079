// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-category reduction of collected values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::collector::CollectionOutcome;
use super::types::MetricCategory;

/// Mean of the finite values, or `None` when there are none
///
/// Uses a running mean so large finite inputs cannot overflow the sum; the
/// result is always finite.
pub fn mean(values: &[f64]) -> Option<f64> {
    let mut count = 0_usize;
    let mut mean = 0.0_f64;
    for value in values.iter().filter(|v| v.is_finite()) {
        count += 1;
        let n = count as f64;
        mean += value / n - mean / n;
    }

    (count > 0).then_some(mean)
}

/// Aggregate and bookkeeping for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: MetricCategory,
    /// Files found in the category directory
    pub listed: usize,
    /// Values that entered the mean
    pub valid: usize,
    /// Parsed values dropped because they were NaN (or otherwise not finite)
    pub nan_excluded: usize,
    /// Invalid samples per reason kind
    pub invalid: BTreeMap<String, usize>,
    /// Mean of valid values; `None` when no valid value exists
    pub mean: Option<f64>,
}

impl CategorySummary {
    /// Reduce a collection outcome
    pub fn from_outcome(category: MetricCategory, outcome: &CollectionOutcome) -> Self {
        let nan_excluded = outcome.values.iter().filter(|v| !v.is_finite()).count();

        let mut invalid = BTreeMap::new();
        for rejected in &outcome.rejected {
            *invalid.entry(rejected.reason.kind().to_string()).or_insert(0) += 1;
        }

        Self {
            category,
            listed: outcome.listed,
            valid: outcome.values.len() - nan_excluded,
            nan_excluded,
            invalid,
            mean: mean(&outcome.values),
        }
    }

    pub fn invalid_total(&self) -> usize {
        self.invalid.values().sum()
    }

    pub fn is_absent(&self) -> bool {
        self.mean.is_none()
    }
}
