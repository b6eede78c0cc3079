// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-sample metric file parsing
//!
//! Every parser returns a [`SampleValue`]; nothing here fails or panics on bad
//! input. Files are line-oriented ASCII and only the leading lines are read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::{sample_identifier, InvalidReason, MetricCategory, SampleInput, SampleValue};

/// Parse one sample according to its category's rule
pub fn parse_sample(category: MetricCategory, input: &SampleInput) -> SampleValue {
    match category {
        MetricCategory::SegmentCountError => match &input.reference {
            Some(reference) => parse_segment_count_error(&input.path, reference),
            None => SampleValue::Invalid(InvalidReason::NoReferencePaired),
        },
        MetricCategory::DanglingEdgeLength => parse_dangling_edge_length(&input.path),
        MetricCategory::SelfIntersectionRatio => parse_self_intersection_ratio(&input.path),
        MetricCategory::FluxEnclosureError => parse_flux_enclosure_error(&input.path),
    }
}

/// Absolute difference between reconstructed and ground-truth segment counts
pub fn parse_segment_count_error(path: &Path, reference: &Path) -> SampleValue {
    let sample_id = sample_identifier(path).unwrap_or_default();
    let reference_id = sample_identifier(reference).unwrap_or_default();
    if sample_id != reference_id {
        return SampleValue::Invalid(InvalidReason::IdentifierMismatch {
            sample: sample_id.to_string(),
            reference: reference_id.to_string(),
        });
    }
    if !reference.exists() {
        return SampleValue::Invalid(InvalidReason::MissingReference);
    }

    segment_difference(path, reference).into()
}

fn segment_difference(path: &Path, reference: &Path) -> Result<f64, InvalidReason> {
    let segments = read_integers(path, 1)?[0];
    let reference_segments = read_integers(reference, 1)?[0];
    Ok(segments.abs_diff(reference_segments) as f64)
}

/// Dangling edge length from the first line
pub fn parse_dangling_edge_length(path: &Path) -> SampleValue {
    read_first_float(path).into()
}

/// Ratio of self-intersecting triangles to all triangles
pub fn parse_self_intersection_ratio(path: &Path) -> SampleValue {
    let result = read_integers(path, 2).and_then(|counts| {
        let (intersecting, total) = (counts[0], counts[1]);
        if total == 0 {
            return Err(InvalidReason::ZeroDenominator);
        }
        Ok(intersecting as f64 / total as f64)
    });
    result.into()
}

/// Flux enclosure error from the first line
pub fn parse_flux_enclosure_error(path: &Path) -> SampleValue {
    read_first_float(path).into()
}

fn read_first_float(path: &Path) -> Result<f64, InvalidReason> {
    let lines = read_leading_lines(path, 1)?;
    let content = lines[0].trim();
    let value = content.parse::<f64>().map_err(|_| InvalidReason::NotANumber {
        line: 1,
        content: content.to_string(),
    })?;
    // NaN passes through and is dropped by the aggregator
    if value.is_infinite() {
        return Err(InvalidReason::NotFinite {
            line: 1,
            content: content.to_string(),
        });
    }
    Ok(value)
}

fn read_integers(path: &Path, count: usize) -> Result<Vec<i64>, InvalidReason> {
    read_leading_lines(path, count)?
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let content = line.trim();
            content.parse::<i64>().map_err(|_| InvalidReason::NotANumber {
                line: index + 1,
                content: content.to_string(),
            })
        })
        .collect()
}

/// Read exactly `count` leading lines; the handle is closed on return
fn read_leading_lines(path: &Path, count: usize) -> Result<Vec<String>, InvalidReason> {
    let file = File::open(path).map_err(|e| InvalidReason::Unreadable {
        message: e.to_string(),
    })?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(count);

    for line_number in 1..=count {
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| InvalidReason::Unreadable {
                message: e.to_string(),
            })?;
        if read == 0 {
            return Err(InvalidReason::Truncated { line: line_number });
        }
        lines.push(line);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_segment_count_error() {
        let recon = TempDir::new().unwrap();
        let gt = TempDir::new().unwrap();
        let path = write(&recon, "a.txt", "5\n");
        let reference = write(&gt, "a.txt", "3\n");

        assert_eq!(parse_segment_count_error(&path, &reference), SampleValue::Valid(2.0));
        assert_eq!(parse_segment_count_error(&reference, &path), SampleValue::Valid(2.0));
    }

    #[test]
    fn test_segment_count_missing_reference() {
        let recon = TempDir::new().unwrap();
        let path = write(&recon, "a.txt", "5\n");
        let reference = recon.path().join("gt").join("a.txt");

        assert_eq!(
            parse_segment_count_error(&path, &reference),
            SampleValue::Invalid(InvalidReason::MissingReference)
        );
    }

    #[test]
    fn test_segment_count_identifier_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.txt", "5\n");
        let reference = write(&dir, "b.txt", "5\n");

        let value = parse_segment_count_error(&path, &reference);
        assert!(matches!(
            value,
            SampleValue::Invalid(InvalidReason::IdentifierMismatch { .. })
        ));
    }

    #[test]
    fn test_segment_count_ignores_extension() {
        let recon = TempDir::new().unwrap();
        let gt = TempDir::new().unwrap();
        let path = write(&recon, "a.txt", "7\n");
        let reference = write(&gt, "a.seg", "10\n");

        assert_eq!(parse_segment_count_error(&path, &reference), SampleValue::Valid(3.0));
    }

    #[test]
    fn test_segment_count_malformed_is_invalid() {
        let recon = TempDir::new().unwrap();
        let gt = TempDir::new().unwrap();
        let path = write(&recon, "a.txt", "five\n");
        let reference = write(&gt, "a.txt", "3\n");

        assert!(!parse_segment_count_error(&path, &reference).is_valid());
    }

    #[test]
    fn test_segment_count_without_pairing() {
        let dir = TempDir::new().unwrap();
        let input = SampleInput::single(write(&dir, "a.txt", "1\n"));
        assert_eq!(
            parse_sample(MetricCategory::SegmentCountError, &input),
            SampleValue::Invalid(InvalidReason::NoReferencePaired)
        );
    }

    #[test]
    fn test_dangling_edge_length() {
        let dir = TempDir::new().unwrap();
        let value = parse_dangling_edge_length(&write(&dir, "a.txt", "0.5\n"));
        assert_eq!(value, SampleValue::Valid(0.5));

        let value = parse_dangling_edge_length(&write(&dir, "b.txt", "  1.25e-2  \nignored\n"));
        assert_relative_eq!(value.value().unwrap(), 0.0125);
    }

    #[test]
    fn test_dangling_edge_nan_is_parsed() {
        let dir = TempDir::new().unwrap();
        let value = parse_dangling_edge_length(&write(&dir, "b.txt", "nan\n"));
        assert!(value.value().unwrap().is_nan());
    }

    #[test]
    fn test_infinite_values_are_invalid() {
        let dir = TempDir::new().unwrap();
        for (name, content) in [("a.txt", "inf\n"), ("b.txt", "-inf\n"), ("c.txt", "1e400\n")] {
            let value = parse_dangling_edge_length(&write(&dir, name, content));
            assert!(
                matches!(value, SampleValue::Invalid(InvalidReason::NotFinite { line: 1, .. })),
                "{} parsed as {:?}",
                content,
                value
            );
        }
        assert_eq!(
            parse_flux_enclosure_error(&write(&dir, "d.txt", "-infinity\n")),
            SampleValue::Invalid(InvalidReason::NotFinite {
                line: 1,
                content: "-infinity".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, [0xff, 0xfe, b'1', b'\n']).unwrap();

        assert!(matches!(
            parse_flux_enclosure_error(&path),
            SampleValue::Invalid(InvalidReason::Unreadable { .. })
        ));

        let recon = TempDir::new().unwrap();
        let gt = TempDir::new().unwrap();
        let sample = write(&recon, "a.txt", "5\n");
        let reference = gt.path().join("a.txt");
        fs::write(&reference, [b'3', 0xc3, b'\n']).unwrap();
        assert!(matches!(
            parse_segment_count_error(&sample, &reference),
            SampleValue::Invalid(InvalidReason::Unreadable { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_truncated() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            parse_flux_enclosure_error(&write(&dir, "a.txt", "")),
            SampleValue::Invalid(InvalidReason::Truncated { line: 1 })
        );
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let value = parse_flux_enclosure_error(&dir.path().join("missing.txt"));
        assert!(matches!(
            value,
            SampleValue::Invalid(InvalidReason::Unreadable { .. })
        ));
    }

    #[test]
    fn test_flux_non_numeric() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            parse_flux_enclosure_error(&write(&dir, "a.txt", "error\n")),
            SampleValue::Invalid(InvalidReason::NotANumber {
                line: 1,
                content: "error".to_string()
            })
        );
    }

    #[test]
    fn test_self_intersection_ratio() {
        let dir = TempDir::new().unwrap();
        let value = parse_self_intersection_ratio(&write(&dir, "a.txt", "3\n100\n"));
        assert_relative_eq!(value.value().unwrap(), 0.03);
    }

    #[test]
    fn test_self_intersection_zero_total() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            parse_self_intersection_ratio(&write(&dir, "a.txt", "0\n0\n")),
            SampleValue::Invalid(InvalidReason::ZeroDenominator)
        );
        assert_eq!(
            parse_self_intersection_ratio(&write(&dir, "b.txt", "4\n0\n")),
            SampleValue::Invalid(InvalidReason::ZeroDenominator)
        );
    }

    #[test]
    fn test_self_intersection_truncated() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            parse_self_intersection_ratio(&write(&dir, "a.txt", "3\n")),
            SampleValue::Invalid(InvalidReason::Truncated { line: 2 })
        );
    }

    #[test]
    fn test_self_intersection_rejects_float_counts() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            parse_self_intersection_ratio(&write(&dir, "a.txt", "3\n10.5\n")),
            SampleValue::Invalid(InvalidReason::NotANumber {
                line: 2,
                content: "10.5".to_string()
            })
        );
    }

    proptest! {
        #[test]
        fn prop_segment_error_is_abs_difference(a in -100_000i64..100_000, b in -100_000i64..100_000) {
            let recon = TempDir::new().unwrap();
            let gt = TempDir::new().unwrap();
            let path = write(&recon, "s.txt", &format!("{}\n", a));
            let reference = write(&gt, "s.txt", &format!("{}\n", b));

            let value = parse_segment_count_error(&path, &reference);
            prop_assert_eq!(value, SampleValue::Valid((a - b).abs() as f64));
        }
    }
}
