//! Fitting world-space samples onto a track map.
//!
//! Game world coordinates and map coordinates differ by an unknown rotation,
//! scale and offset. The aligner collects car positions until it has seen
//! enough of the circuit, then picks the quarter-turn rotation whose fitted
//! sample box best lines up with the map outline.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::TrackGeometry;
use crate::point::{BoundingBox, Point2};

/// Sample boxes narrower than this in either axis cannot be fitted.
pub const DEGENERATE_EXTENT: f64 = 1e-6;

/// Rotation candidates, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuarterTurn {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl QuarterTurn {
    pub const ALL: [QuarterTurn; 4] = [
        QuarterTurn::Deg0,
        QuarterTurn::Deg90,
        QuarterTurn::Deg180,
        QuarterTurn::Deg270,
    ];

    pub const fn degrees(self) -> u16 {
        match self {
            QuarterTurn::Deg0 => 0,
            QuarterTurn::Deg90 => 90,
            QuarterTurn::Deg180 => 180,
            QuarterTurn::Deg270 => 270,
        }
    }

    /// Counter-clockwise rotation of a vector, exact for every candidate.
    pub fn rotate(self, v: Point2) -> Point2 {
        match self {
            QuarterTurn::Deg0 => v,
            QuarterTurn::Deg90 => Point2::new(-v.y, v.x),
            QuarterTurn::Deg180 => Point2::new(-v.x, -v.y),
            QuarterTurn::Deg270 => Point2::new(v.y, -v.x),
        }
    }

    /// Whether the rotation swaps the box axes.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, QuarterTurn::Deg90 | QuarterTurn::Deg270)
    }
}

/// World-to-map mapping: rotate about `source_center`, scale, then move to
/// `target_center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTransform {
    pub rotation: QuarterTurn,
    pub scale: f64,
    pub source_center: Point2,
    pub target_center: Point2,
}

impl Default for AlignmentTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AlignmentTransform {
    pub const fn identity() -> Self {
        Self {
            rotation: QuarterTurn::Deg0,
            scale: 1.0,
            source_center: Point2::ORIGIN,
            target_center: Point2::ORIGIN,
        }
    }

    pub fn apply(&self, p: Point2) -> Point2 {
        self.target_center + self.rotation.rotate(p - self.source_center) * self.scale
    }

    /// Fit `source` into `target` for one rotation. `None` if either box is
    /// degenerate.
    pub fn fit(source: &BoundingBox, target: &BoundingBox, rotation: QuarterTurn) -> Option<Self> {
        if source.is_degenerate(DEGENERATE_EXTENT) || target.is_degenerate(DEGENERATE_EXTENT) {
            return None;
        }
        let (rotated_w, rotated_h) = if rotation.swaps_axes() {
            (source.height(), source.width())
        } else {
            (source.width(), source.height())
        };
        let scale = (target.width() / rotated_w).min(target.height() / rotated_h);
        Some(Self {
            rotation,
            scale,
            source_center: source.center(),
            target_center: target.center(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Samples required before a solve is attempted.
    pub min_samples: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self { min_samples: 100 }
    }
}

/// Outcome of a successful solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSolution {
    pub transform: AlignmentTransform,
    /// Summed distance of the fitted reference points to the outline.
    pub score: f64,
    pub sample_bounds: BoundingBox,
    pub samples: usize,
}

/// Accumulates world samples for one track and solves the alignment once.
#[derive(Debug, Clone, Default)]
pub struct CoordinateAligner {
    config: AlignerConfig,
    bounds: BoundingBox,
    samples: usize,
    solution: Option<AlignmentSolution>,
}

impl CoordinateAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            bounds: BoundingBox::empty(),
            samples: 0,
            solution: None,
        }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Forget all samples and any solution.
    pub fn reset(&mut self) {
        self.bounds = BoundingBox::empty();
        self.samples = 0;
        self.solution = None;
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn sample_bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    pub fn solution(&self) -> Option<&AlignmentSolution> {
        self.solution.as_ref()
    }

    /// The solved transform, or identity while unsolved.
    pub fn transform(&self) -> AlignmentTransform {
        self.solution
            .map_or_else(AlignmentTransform::identity, |s| s.transform)
    }

    /// Record one world sample. Returns `true` if this sample completed the
    /// solve. Non-finite samples are ignored; once solved, samples are no
    /// longer collected.
    pub fn observe(&mut self, sample: Point2, geometry: &TrackGeometry) -> bool {
        if self.solution.is_some() || !sample.is_finite() {
            return false;
        }
        self.bounds.include(sample);
        self.samples += 1;
        if self.samples < self.config.min_samples {
            return false;
        }
        self.solution = solve(&self.bounds, geometry, self.samples);
        if let Some(solution) = &self.solution {
            debug!(
                rotation = solution.transform.rotation.degrees(),
                scale = solution.transform.scale,
                score = solution.score,
                samples = solution.samples,
                "coordinate alignment solved"
            );
            true
        } else {
            trace!(samples = self.samples, "alignment not solvable yet");
            false
        }
    }
}

/// Score every rotation candidate; the first lowest score wins.
fn solve(bounds: &BoundingBox, geometry: &TrackGeometry, samples: usize) -> Option<AlignmentSolution> {
    if geometry.is_empty() {
        return None;
    }
    let target = geometry.bounds();
    let [c0, c1, c2, c3] = bounds.corners();
    let references = [c0, c1, c2, c3, bounds.center()];

    let mut best: Option<AlignmentSolution> = None;
    for rotation in QuarterTurn::ALL {
        let Some(transform) = AlignmentTransform::fit(bounds, &target, rotation) else {
            continue;
        };
        let score: f64 = references
            .iter()
            .map(|&p| geometry.distance_to(transform.apply(p)))
            .sum();
        trace!(rotation = rotation.degrees(), score, "alignment candidate");
        if best.is_none_or(|current| score < current.score) {
            best = Some(AlignmentSolution {
                transform,
                score,
                sample_bounds: *bounds,
                samples,
            });
        }
    }
    best
}
