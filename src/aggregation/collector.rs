// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parallel collection of sample values over a bounded worker pool

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::{InvalidReason, MetricCategory, SampleInput, SampleValue};
use crate::error::{AggregationError, Result};

/// A sample that produced no usable value
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedSample {
    pub id: String,
    pub reason: InvalidReason,
}

/// Result of collecting one category
#[derive(Debug, Clone, Default)]
pub struct CollectionOutcome {
    /// Number of samples submitted
    pub listed: usize,
    /// Valid values, in submission order
    pub values: Vec<f64>,
    /// Invalid samples, in submission order
    pub rejected: Vec<RejectedSample>,
}

impl CollectionOutcome {
    pub fn valid_count(&self) -> usize {
        self.values.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Fans sample parsing out over a fixed-size rayon pool
#[derive(Debug)]
pub struct ParallelCollector {
    workers: usize,
    show_progress: bool,
    processed: Arc<AtomicUsize>,
}

impl ParallelCollector {
    /// Create a collector with `workers` threads (at least one)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            show_progress: false,
            processed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Render a progress bar while collecting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Shared counter of samples processed by the current collection
    ///
    /// Can be polled from another thread while `collect` runs.
    pub fn processed_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.processed)
    }

    /// Parse every input on the pool and keep the valid values
    ///
    /// Invalid samples are logged and returned separately; they never stop the
    /// other samples. Only a failure to build the pool is an error.
    pub fn collect<F>(
        &self,
        category: MetricCategory,
        inputs: &[SampleInput],
        parse: F,
    ) -> Result<CollectionOutcome>
    where
        F: Fn(&SampleInput) -> SampleValue + Sync + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("meshmetrics-worker-{}", index))
            .build()
            .map_err(|source| AggregationError::WorkerPool {
                workers: self.workers,
                source,
            })?;

        self.processed.store(0, Ordering::Relaxed);
        let progress = self.progress_bar(category, inputs.len());

        let parsed: Vec<SampleValue> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| {
                    let value = parse(input);
                    self.processed.fetch_add(1, Ordering::Relaxed);
                    progress.inc(1);
                    value
                })
                .collect()
        });

        progress.finish_and_clear();

        let mut outcome = CollectionOutcome {
            listed: inputs.len(),
            ..CollectionOutcome::default()
        };
        for (input, value) in inputs.iter().zip(parsed) {
            match value {
                SampleValue::Valid(v) => outcome.values.push(v),
                SampleValue::Invalid(reason) => {
                    tracing::debug!(
                        category = category.report_key(),
                        sample = %input.path.display(),
                        %reason,
                        "sample excluded"
                    );
                    outcome.rejected.push(RejectedSample {
                        id: input.id.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(outcome)
    }

    fn progress_bar(&self, category: MetricCategory, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(category.label());
        bar
    }
}

impl Default for ParallelCollector {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_WORKER_COUNT)
    }
}
