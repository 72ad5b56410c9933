//! Inspect a track outline file.

use std::path::Path;

use anyhow::{Context, Result};
use openracing_track::{BoundingBox, FlattenConfig, Point2, TrackGeometry};
use serde::Serialize;

use crate::commands::print_json;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct OutlineReport {
    pub points: usize,
    pub total_length: f64,
    pub bounds: BoundingBox,
    /// Evenly spaced `(progress, point)` samples along the lap.
    pub samples: Vec<(f64, Point2)>,
}

pub fn execute(file: &Path, samples: u32, tolerance_ratio: f64) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .map_err(CliError::from)
        .with_context(|| format!("reading {}", file.display()))?;
    let report = build_report(&text, samples, tolerance_ratio)
        .with_context(|| format!("parsing outline {}", file.display()))?;
    print_json(&report)?;
    Ok(())
}

pub fn build_report(svg: &str, samples: u32, tolerance_ratio: f64) -> Result<OutlineReport, CliError> {
    if !(tolerance_ratio.is_finite() && tolerance_ratio > 0.0) {
        return Err(CliError::InvalidInput(format!(
            "tolerance ratio must be positive, got {tolerance_ratio}"
        )));
    }
    let config = FlattenConfig {
        tolerance_ratio,
        ..FlattenConfig::default()
    };
    let geometry = TrackGeometry::from_svg_with(svg, &config)?;
    let samples = (0..samples)
        .map(|i| {
            let progress = f64::from(i) / f64::from(samples);
            (progress, geometry.point_at(progress))
        })
        .collect();
    Ok(OutlineReport {
        points: geometry.len(),
        total_length: geometry.total_length(),
        bounds: geometry.bounds(),
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn report_for_square() -> TestResult {
        let report = build_report(
            r#"<svg><polygon points="0,0 50,0 50,50 0,50"/></svg>"#,
            4,
            0.002,
        )?;
        assert_eq!(report.points, 5);
        assert_eq!(report.samples.len(), 4);
        assert_eq!(report.samples.get(1).map(|s| s.1), Some(Point2::new(50.0, 0.0)));
        assert!((report.total_length - 200.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn rejects_bad_tolerance() {
        let result = build_report("<svg/>", 4, 0.0);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn svg_without_outline_is_a_track_error() {
        let result = build_report("<svg><rect width=\"4\" height=\"4\"/></svg>", 4, 0.002);
        assert!(matches!(result, Err(CliError::Track(_))));
    }
}
