//! SVG path mini-language.
//!
//! Parses a `d` attribute into absolute segments. Shorthand forms are
//! expanded while parsing: `H`/`V` become lines, `S`/`T` get their reflected
//! control point, and elliptical arcs become cubic Béziers. What is left is
//! move, line, quadratic, cubic and close.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::transform::Affine;
use crate::error::{Result, TrackError};
use crate::point::{BoundingBox, Point2};

/// Scanner for SVG number lists: separators are whitespace and commas, and
/// numbers may run together (`1.5.5`, `-1-2`, `1e-3.2`).
#[derive(Debug, Clone)]
pub(crate) struct NumberLexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> NumberLexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos = self.pos.saturating_add(1);
    }

    fn error(&self, reason: &str) -> TrackError {
        TrackError::PathSyntax {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace() || b == b',') {
            self.bump();
        }
    }

    pub(crate) fn is_done(&mut self) -> bool {
        self.skip_separators();
        self.peek().is_none()
    }

    /// Next token starts a number.
    pub(crate) fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.peek(), Some(b'0'..=b'9' | b'+' | b'-' | b'.'))
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        self.pos - start
    }

    pub(crate) fn number(&mut self) -> Result<f64> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.bump();
        }
        let mut mantissa = self.digits();
        if self.peek() == Some(b'.') {
            self.bump();
            mantissa += self.digits();
        }
        if mantissa == 0 {
            self.pos = start;
            return Err(self.error("expected number"));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let before_exponent = self.pos;
            self.bump();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump();
            }
            if self.digits() == 0 {
                // not an exponent after all
                self.pos = before_exponent;
            }
        }
        let text = self
            .src
            .get(start..self.pos)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .ok_or_else(|| self.error("invalid number bytes"))?;
        text.parse::<f64>().map_err(|_err| TrackError::PathSyntax {
            offset: start,
            reason: format!("invalid number `{text}`"),
        })
    }

    /// Arc flags are a single `0` or `1` and need no separator.
    fn flag(&mut self) -> Result<bool> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.bump();
                Ok(false)
            }
            Some(b'1') => {
                self.bump();
                Ok(true)
            }
            _ => Err(self.error("expected arc flag 0 or 1")),
        }
    }

    fn point(&mut self) -> Result<Point2> {
        Ok(Point2::new(self.number()?, self.number()?))
    }

    /// Command letter, if the next token is one.
    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        let letter = self.peek().filter(u8::is_ascii_alphabetic)?;
        self.bump();
        Some(letter)
    }

    /// Every remaining number.
    pub(crate) fn numbers(&mut self) -> Result<Vec<f64>> {
        let mut out = Vec::new();
        while !self.is_done() {
            out.push(self.number()?);
        }
        Ok(out)
    }
}

/// One absolute path segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo(Point2),
    LineTo(Point2),
    QuadTo { ctrl: Point2, to: Point2 },
    CubicTo { ctrl1: Point2, ctrl2: Point2, to: Point2 },
    Close,
}

impl PathSegment {
    fn map(self, f: impl Fn(Point2) -> Point2) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(f(p)),
            Self::LineTo(p) => Self::LineTo(f(p)),
            Self::QuadTo { ctrl, to } => Self::QuadTo {
                ctrl: f(ctrl),
                to: f(to),
            },
            Self::CubicTo { ctrl1, ctrl2, to } => Self::CubicTo {
                ctrl1: f(ctrl1),
                ctrl2: f(ctrl2),
                to: f(to),
            },
            Self::Close => Self::Close,
        }
    }
}

/// An abstract curve path in absolute coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    segments: Vec<PathSegment>,
}

impl FromIterator<PathSegment> for PathData {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `d` attribute.
    ///
    /// Unsupported command letters are skipped, together with their
    /// arguments, after a warning.
    ///
    /// # Errors
    ///
    /// [`TrackError::PathSyntax`] for malformed numbers, missing arguments,
    /// bytes that start neither a command nor a number, or coordinates before
    /// the first command.
    pub fn parse(d: &str) -> Result<Self> {
        PathParser::new(d).run()
    }

    /// Straight-line path through `points`, closed when `close` is set.
    pub fn from_points(points: &[Point2], close: bool) -> Self {
        let mut segments = Vec::with_capacity(points.len() + 1);
        let mut iter = points.iter().copied();
        if let Some(first) = iter.next() {
            segments.push(PathSegment::MoveTo(first));
            segments.extend(iter.map(PathSegment::LineTo));
            if close {
                segments.push(PathSegment::Close);
            }
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Append another path's segments.
    pub fn extend(&mut self, other: &PathData) {
        self.segments.extend_from_slice(&other.segments);
    }

    /// Copy with every point mapped through `transform`.
    pub fn transformed(&self, transform: &Affine) -> PathData {
        if transform.is_identity() {
            return self.clone();
        }
        self.segments
            .iter()
            .map(|segment| segment.map(|p| transform.apply(p)))
            .collect()
    }

    /// Bounds of every end and control point (a superset of the curve).
    pub fn control_bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => bounds.include(p),
                PathSegment::QuadTo { ctrl, to } => {
                    bounds.include(ctrl);
                    bounds.include(to);
                }
                PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                    bounds.include(ctrl1);
                    bounds.include(ctrl2);
                    bounds.include(to);
                }
                PathSegment::Close => {}
            }
        }
        bounds
    }
}

fn is_supported(letter: u8) -> bool {
    matches!(
        letter.to_ascii_uppercase(),
        b'M' | b'L' | b'H' | b'V' | b'C' | b'S' | b'Q' | b'T' | b'A' | b'Z'
    )
}

struct PathParser<'a> {
    lexer: NumberLexer<'a>,
    segments: Vec<PathSegment>,
    current: Point2,
    subpath_start: Point2,
    /// Second control point of the previous cubic, for `S`.
    last_cubic_ctrl: Option<Point2>,
    /// Control point of the previous quadratic, for `T`.
    last_quad_ctrl: Option<Point2>,
}

impl<'a> PathParser<'a> {
    fn new(d: &'a str) -> Self {
        Self {
            lexer: NumberLexer::new(d),
            segments: Vec::new(),
            current: Point2::ORIGIN,
            subpath_start: Point2::ORIGIN,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn run(mut self) -> Result<PathData> {
        let mut previous: Option<u8> = None;
        while !self.lexer.is_done() {
            let command = match self.lexer.command() {
                Some(letter) => letter,
                None if !self.lexer.at_number() => {
                    return Err(TrackError::PathSyntax {
                        offset: self.lexer.offset(),
                        reason: "expected command or number".to_string(),
                    });
                }
                None => match previous {
                    // implicit repetition; extra pairs after a moveto are linetos
                    Some(b'M') => b'L',
                    Some(b'm') => b'l',
                    Some(b'Z' | b'z') | None => {
                        return Err(TrackError::PathSyntax {
                            offset: self.lexer.offset(),
                            reason: "coordinates without a command".to_string(),
                        });
                    }
                    Some(letter) => letter,
                },
            };
            self.command(command)?;
            // an unsupported command never repeats implicitly
            previous = is_supported(command).then_some(command);
        }
        Ok(PathData {
            segments: self.segments,
        })
    }

    /// Next coordinate pair, made absolute.
    fn next_point(&mut self, relative: bool) -> Result<Point2> {
        let p = self.lexer.point()?;
        Ok(if relative { self.current + p } else { p })
    }

    fn command(&mut self, letter: u8) -> Result<()> {
        let relative = letter.is_ascii_lowercase();
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match letter.to_ascii_uppercase() {
            b'M' => {
                let to = self.next_point(relative)?;
                self.segments.push(PathSegment::MoveTo(to));
                self.current = to;
                self.subpath_start = to;
            }
            b'L' => {
                let to = self.next_point(relative)?;
                self.line_to(to);
            }
            b'H' => {
                let x = self.lexer.number()?;
                let x = if relative { self.current.x + x } else { x };
                self.line_to(Point2::new(x, self.current.y));
            }
            b'V' => {
                let y = self.lexer.number()?;
                let y = if relative { self.current.y + y } else { y };
                self.line_to(Point2::new(self.current.x, y));
            }
            b'C' => {
                let ctrl1 = self.next_point(relative)?;
                let ctrl2 = self.next_point(relative)?;
                let to = self.next_point(relative)?;
                self.cubic_to(ctrl1, ctrl2, to);
                cubic_ctrl = Some(ctrl2);
            }
            b'S' => {
                let ctrl1 = self.reflect(self.last_cubic_ctrl);
                let ctrl2 = self.next_point(relative)?;
                let to = self.next_point(relative)?;
                self.cubic_to(ctrl1, ctrl2, to);
                cubic_ctrl = Some(ctrl2);
            }
            b'Q' => {
                let ctrl = self.next_point(relative)?;
                let to = self.next_point(relative)?;
                self.quad_to(ctrl, to);
                quad_ctrl = Some(ctrl);
            }
            b'T' => {
                let ctrl = self.reflect(self.last_quad_ctrl);
                let to = self.next_point(relative)?;
                self.quad_to(ctrl, to);
                quad_ctrl = Some(ctrl);
            }
            b'A' => {
                let rx = self.lexer.number()?;
                let ry = self.lexer.number()?;
                let x_rotation = self.lexer.number()?;
                let large_arc = self.lexer.flag()?;
                let sweep = self.lexer.flag()?;
                let to = self.next_point(relative)?;
                self.arc_to(rx, ry, x_rotation, large_arc, sweep, to);
            }
            b'Z' => {
                self.segments.push(PathSegment::Close);
                self.current = self.subpath_start;
            }
            _ => {
                warn!(
                    command = %char::from(letter),
                    offset = self.lexer.offset(),
                    "unsupported path command skipped"
                );
                while self.lexer.at_number() {
                    self.lexer.number()?;
                }
            }
        }

        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;
        Ok(())
    }

    /// Reflection of the previous control point about the current point, or
    /// the current point itself when the previous segment was another kind.
    fn reflect(&self, ctrl: Option<Point2>) -> Point2 {
        match ctrl {
            Some(c) => self.current * 2.0 - c,
            None => self.current,
        }
    }

    fn line_to(&mut self, to: Point2) {
        self.segments.push(PathSegment::LineTo(to));
        self.current = to;
    }

    fn quad_to(&mut self, ctrl: Point2, to: Point2) {
        self.segments.push(PathSegment::QuadTo { ctrl, to });
        self.current = to;
    }

    fn cubic_to(&mut self, ctrl1: Point2, ctrl2: Point2, to: Point2) {
        self.segments.push(PathSegment::CubicTo { ctrl1, ctrl2, to });
        self.current = to;
    }

    fn arc_to(&mut self, rx: f64, ry: f64, x_rotation: f64, large_arc: bool, sweep: bool, to: Point2) {
        let from = self.current;
        if from.distance_squared(to) <= f64::EPSILON {
            return;
        }
        let rx = rx.abs();
        let ry = ry.abs();
        if rx <= f64::EPSILON || ry <= f64::EPSILON {
            self.line_to(to);
            return;
        }
        for [ctrl1, ctrl2, end] in arc_to_cubics(from, to, rx, ry, x_rotation, large_arc, sweep) {
            self.cubic_to(ctrl1, ctrl2, end);
        }
        // land exactly on the requested end point
        self.current = to;
    }
}

/// Endpoint-parameterized elliptical arc as cubic Béziers of at most 90°
/// each. Radii that are too small to span the endpoints are scaled up.
fn arc_to_cubics(
    from: Point2,
    to: Point2,
    mut rx: f64,
    mut ry: f64,
    x_rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
) -> Vec<[Point2; 3]> {
    let (sin_phi, cos_phi) = x_rotation_deg.to_radians().sin_cos();

    // endpoint to centre conversion
    let half = (from - to) * 0.5;
    let x1p = cos_phi * half.x + sin_phi * half.y;
    let y1p = -sin_phi * half.x + cos_phi * half.y;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    let mid = from.midpoint(to);
    let center = Point2::new(
        cos_phi * cxp - sin_phi * cyp + mid.x,
        sin_phi * cxp + cos_phi * cyp + mid.y,
    );

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let theta1 = angle(1.0, 0.0, ux, uy);
    let mut delta = angle(ux, uy, vx, vy);
    if !sweep && delta > 0.0 {
        delta -= 2.0 * PI;
    } else if sweep && delta < 0.0 {
        delta += 2.0 * PI;
    }

    let count = (1u32..=4)
        .find(|&n| f64::from(n) * FRAC_PI_2 >= delta.abs() - 1e-9)
        .unwrap_or(4);
    let step = delta / f64::from(count);
    let kappa = 4.0 / 3.0 * (step / 4.0).tan();

    // point and derivative on the rotated ellipse at angle t
    let eval = |t: f64| {
        let (sin_t, cos_t) = t.sin_cos();
        let p = Point2::new(
            center.x + rx * cos_phi * cos_t - ry * sin_phi * sin_t,
            center.y + rx * sin_phi * cos_t + ry * cos_phi * sin_t,
        );
        let d = Point2::new(
            -rx * cos_phi * sin_t - ry * sin_phi * cos_t,
            -rx * sin_phi * sin_t + ry * cos_phi * cos_t,
        );
        (p, d)
    };

    let mut out = Vec::with_capacity(4);
    let mut t0 = theta1;
    let (mut p0, mut d0) = eval(t0);
    for i in 0..count {
        let t1 = if i + 1 == count { theta1 + delta } else { t0 + step };
        let (p1, d1) = eval(t1);
        let end = if i + 1 == count { to } else { p1 };
        out.push([p0 + d0 * kappa, p1 - d1 * kappa, end]);
        t0 = t1;
        p0 = p1;
        d0 = d1;
    }
    out
}
