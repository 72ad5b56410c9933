//! Per-car lap progress for the active track.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::align::{AlignerConfig, CoordinateAligner};
use crate::cache::{GeometryCache, TrackId};
use crate::error::Result;
use crate::geometry::TrackGeometry;
use crate::point::Point2;
use crate::projector::{ProjectorConfig, TrackProjector};
use crate::provider::OutlineProvider;

/// Ties geometry loading, alignment and projection to the active track.
///
/// Geometry comes from the shared cache, built from the provider's outline on
/// a miss. Switching tracks discards the alignment.
pub struct LapProgressTracker {
    cache: Arc<GeometryCache>,
    provider: Arc<dyn OutlineProvider>,
    aligner: CoordinateAligner,
    projector: TrackProjector,
    track: Option<TrackId>,
    geometry: Option<Arc<TrackGeometry>>,
}

impl std::fmt::Debug for LapProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LapProgressTracker")
            .field("track", &self.track)
            .field("loaded", &self.geometry.is_some())
            .field("aligner", &self.aligner)
            .field("projector", &self.projector)
            .finish_non_exhaustive()
    }
}

impl LapProgressTracker {
    pub fn new(cache: Arc<GeometryCache>, provider: Arc<dyn OutlineProvider>) -> Self {
        Self {
            cache,
            provider,
            aligner: CoordinateAligner::new(AlignerConfig::default()),
            projector: TrackProjector::default(),
            track: None,
            geometry: None,
        }
    }

    #[must_use]
    pub fn with_aligner_config(mut self, config: AlignerConfig) -> Self {
        self.aligner = CoordinateAligner::new(config);
        self
    }

    #[must_use]
    pub fn with_projector_config(mut self, config: ProjectorConfig) -> Self {
        self.projector = TrackProjector::new(config);
        self
    }

    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    pub fn geometry(&self) -> Option<&Arc<TrackGeometry>> {
        self.geometry.as_ref()
    }

    pub fn aligner(&self) -> &CoordinateAligner {
        &self.aligner
    }

    /// Make `track` active. A change of id resets the alignment; a repeated
    /// id only retries a failed geometry load.
    ///
    /// # Errors
    ///
    /// Returns the provider or outline error when the geometry cannot be
    /// built. The track still becomes active, without geometry.
    pub fn set_track(&mut self, track: TrackId) -> Result<()> {
        if self.track == Some(track) && self.geometry.is_some() {
            return Ok(());
        }
        if self.track != Some(track) {
            info!(track, previous = ?self.track, "active track changed");
            self.aligner.reset();
            self.track = Some(track);
        }
        let provider = Arc::clone(&self.provider);
        match self
            .cache
            .get_or_build(track, || TrackGeometry::from_svg(&provider.outline(track)?))
        {
            Ok(geometry) => {
                self.geometry = Some(geometry);
                Ok(())
            }
            Err(err) => {
                warn!(track, error = %err, "track geometry unavailable");
                self.geometry = None;
                Err(err)
            }
        }
    }

    /// Feed one frame of `(slot, position)` pairs and return each slot's
    /// progress in `[0, 1)`.
    ///
    /// Positions are ground-plane map inputs (world X, world Z). Positions at
    /// the exact origin are empty slots and are skipped. Without geometry the
    /// result is empty.
    pub fn update<I>(&mut self, positions: I) -> Vec<(usize, f64)>
    where
        I: IntoIterator<Item = (usize, Point2)>,
    {
        let Some(geometry) = self.geometry.as_deref() else {
            return Vec::new();
        };
        let active: Vec<(usize, Point2)> = positions
            .into_iter()
            .filter(|(_, p)| !is_empty_slot(*p))
            .collect();

        for &(_, position) in &active {
            if self.aligner.observe(position, geometry) {
                debug!(track = ?self.track, "alignment ready");
            }
        }
        let transform = self.aligner.transform();
        active
            .into_iter()
            .map(|(slot, position)| (slot, self.projector.project(geometry, &transform, position)))
            .collect()
    }
}

fn is_empty_slot(p: Point2) -> bool {
    p.x.abs() < f64::EPSILON && p.y.abs() < f64::EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::QuarterTurn;
    use crate::error::TrackError;
    use crate::provider::StaticOutlines;
    use approx::assert_abs_diff_eq;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const SQUARE: &str = r#"<svg viewBox="0 0 100 100"><path d="M0 0 H100 V100 H0 Z"/></svg>"#;

    fn tracker(min_samples: usize) -> LapProgressTracker {
        let provider = StaticOutlines::new().with(4, SQUARE).with(9, SQUARE);
        LapProgressTracker::new(Arc::new(GeometryCache::new()), Arc::new(provider))
            .with_aligner_config(AlignerConfig { min_samples })
    }

    #[test]
    fn no_track_means_no_progress() {
        let mut tracker = tracker(2);
        assert!(tracker.update([(0, Point2::new(1.0, 1.0))]).is_empty());
    }

    #[test]
    fn origin_positions_are_skipped() -> TestResult {
        let mut tracker = tracker(100);
        tracker.set_track(4)?;
        let out = tracker.update([(0, Point2::ORIGIN), (1, Point2::new(50.0, 0.0))]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.first().map(|(slot, _)| *slot), Some(1));
        assert_eq!(tracker.aligner().sample_count(), 1);
        Ok(())
    }

    #[test]
    fn unaligned_positions_use_identity() -> TestResult {
        let mut tracker = tracker(100);
        tracker.set_track(4)?;
        let out = tracker.update([(3, Point2::new(100.0, 50.0))]);
        let progress = out.first().map_or(-1.0, |(_, p)| *p);
        assert_abs_diff_eq!(progress, 0.375, epsilon = 1e-3);
        Ok(())
    }

    #[test]
    fn world_positions_are_aligned_once_enough_samples_arrive() -> TestResult {
        let mut tracker = tracker(4);
        tracker.set_track(4)?;
        // world circuit is the map at double size, offset by (-1000, 500)
        let corners = [
            Point2::new(-1000.0, 500.0),
            Point2::new(-800.0, 500.0),
            Point2::new(-800.0, 700.0),
            Point2::new(-1000.0, 700.0),
        ];
        tracker.update(corners.iter().copied().enumerate());
        assert!(tracker.aligner().is_solved());

        let out = tracker.update([(0, Point2::new(-800.0, 600.0))]);
        let progress = out.first().map_or(-1.0, |(_, p)| *p);
        assert_abs_diff_eq!(progress, 0.375, epsilon = 1e-3);
        let rotation = tracker.aligner().solution().map(|s| s.transform.rotation);
        assert_eq!(rotation, Some(QuarterTurn::Deg0));
        Ok(())
    }

    #[test]
    fn changing_track_resets_alignment_but_reuses_geometry() -> TestResult {
        let cache = Arc::new(GeometryCache::new());
        let provider = StaticOutlines::new().with(4, SQUARE).with(9, SQUARE);
        let mut tracker = LapProgressTracker::new(Arc::clone(&cache), Arc::new(provider));
        tracker.set_track(4)?;
        tracker.update([(0, Point2::new(10.0, 10.0))]);
        assert_eq!(tracker.aligner().sample_count(), 1);

        tracker.set_track(4)?;
        assert_eq!(tracker.aligner().sample_count(), 1);

        tracker.set_track(9)?;
        assert_eq!(tracker.track(), Some(9));
        assert_eq!(tracker.aligner().sample_count(), 0);
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_outline_leaves_track_without_geometry() {
        let mut tracker = tracker(2);
        let result = tracker.set_track(42);
        assert!(matches!(result, Err(TrackError::OutlineUnavailable(_))));
        assert_eq!(tracker.track(), Some(42));
        assert!(tracker.geometry().is_none());
        assert!(tracker.update([(0, Point2::new(1.0, 1.0))]).is_empty());
    }
}
