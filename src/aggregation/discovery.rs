// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sample discovery for a metric category

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::types::{MetricCategory, SampleInput};
use crate::error::{AggregationError, Result};

/// Lists the sample files of one category
#[derive(Debug, Clone)]
pub struct SampleDiscovery {
    category: MetricCategory,
    sample_dir: PathBuf,
    reference_dir: Option<PathBuf>,
}

impl SampleDiscovery {
    /// Discovery for a category without ground truth
    pub fn new(category: MetricCategory, sample_dir: impl Into<PathBuf>) -> Self {
        Self {
            category,
            sample_dir: sample_dir.into(),
            reference_dir: None,
        }
    }

    /// Pair every sample with the same-named file in `reference_dir`
    pub fn with_reference(mut self, reference_dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = Some(reference_dir.into());
        self
    }

    pub fn sample_dir(&self) -> &Path {
        &self.sample_dir
    }

    /// Discover all samples, sorted by file name
    ///
    /// Only an unreadable category directory is fatal. An entry that cannot be
    /// resolved (e.g. a dangling symlink) is still listed, so the parser reports
    /// it as unreadable. Reference files are not checked for existence here.
    pub fn discover(&self) -> Result<Vec<SampleInput>> {
        let metadata = std::fs::metadata(&self.sample_dir).map_err(|e| self.fatal(e))?;
        if !metadata.is_dir() {
            return Err(self.fatal(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }

        let mut samples = Vec::new();
        for entry in WalkDir::new(&self.sample_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    match e.path() {
                        Some(path) => {
                            tracing::debug!(
                                path = %path.display(),
                                error = %e,
                                "unresolvable sample entry"
                            );
                            samples.push(self.sample(path.to_path_buf()));
                        }
                        None => tracing::warn!(error = %e, "skipping sample entry"),
                    }
                    continue;
                }
                Err(e) => return Err(self.fatal(io::Error::from(e))),
            };
            if !entry.file_type().is_file() {
                continue;
            }

            samples.push(self.sample(entry.into_path()));
        }
        samples.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(samples)
    }

    fn sample(&self, path: PathBuf) -> SampleInput {
        let reference = match (&self.reference_dir, path.file_name()) {
            (Some(reference_dir), Some(name)) => Some(reference_dir.join(name)),
            _ => None,
        };
        match reference {
            Some(reference) => SampleInput::paired(path, reference),
            None => SampleInput::single(path),
        }
    }

    fn fatal(&self, source: io::Error) -> AggregationError {
        AggregationError::CategoryDirectory {
            category: self.category,
            path: self.sample_dir.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_sorted_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "1").unwrap();
        fs::write(dir.path().join("a.txt"), "2").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "3").unwrap();

        let samples = SampleDiscovery::new(MetricCategory::FluxEnclosureError, dir.path())
            .discover()
            .unwrap();

        let ids: Vec<_> = samples.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(samples.iter().all(|s| s.reference.is_none()));
    }

    #[test]
    fn test_reference_paths_are_not_checked() {
        let root = TempDir::new().unwrap();
        let samples_dir = root.path().join("recon_segment_num");
        fs::create_dir(&samples_dir).unwrap();
        fs::write(samples_dir.join("x.txt"), "5").unwrap();

        let samples = SampleDiscovery::new(MetricCategory::SegmentCountError, &samples_dir)
            .with_reference(root.path().join("gt_segment_num"))
            .discover()
            .unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(
            samples[0].reference,
            Some(root.path().join("gt_segment_num").join("x.txt"))
        );
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let root = TempDir::new().unwrap();
        let err = SampleDiscovery::new(MetricCategory::DanglingEdgeLength, root.path().join("nope"))
            .discover()
            .unwrap_err();

        assert_eq!(err.category(), Some(MetricCategory::DanglingEdgeLength));
        assert!(err.to_string().contains("dangling edge length"));
    }

    #[test]
    fn test_file_instead_of_directory_is_fatal() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("recon_flux_enclosure_error");
        fs::write(&file, "0.1").unwrap();

        let result = SampleDiscovery::new(MetricCategory::FluxEnclosureError, &file).discover();
        assert!(matches!(
            result,
            Err(AggregationError::CategoryDirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_listed_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "0.5").unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.txt"), dir.path().join("b.txt"))
            .unwrap();

        let samples = SampleDiscovery::new(MetricCategory::FluxEnclosureError, dir.path())
            .discover()
            .unwrap();

        let ids: Vec<_> = samples.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(samples[1].path, dir.path().join("b.txt"));
    }

    #[test]
    fn test_empty_directory_has_no_samples() {
        let dir = TempDir::new().unwrap();
        let samples = SampleDiscovery::new(MetricCategory::SelfIntersectionRatio, dir.path())
            .discover()
            .unwrap();
        assert!(samples.is_empty());
    }
}
