//! 2D affine transforms and the SVG `transform` attribute.

use serde::{Deserialize, Serialize};

use super::path_data::NumberLexer;
use crate::error::{Result, TrackError};
use crate::point::Point2;

/// Affine matrix in SVG order:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counter-clockwise in a y-up frame (clockwise on screen).
    pub fn rotate_degrees(angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// `rotate(angle, cx, cy)`.
    pub fn rotate_about(angle: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy)
            .multiply(&Self::rotate_degrees(angle))
            .multiply(&Self::translate(-cx, -cy))
    }

    pub fn skew_x_degrees(angle: f64) -> Self {
        Self::new(1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y_degrees(angle: f64) -> Self {
        Self::new(1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// `self × rhs`: the result applies `rhs` first, then `self`.
    pub fn multiply(&self, rhs: &Affine) -> Affine {
        Affine {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    #[inline]
    pub fn apply(&self, p: Point2) -> Point2 {
        Point2::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Parse a transform list such as `translate(10 20) rotate(45, 5, 5)`.
    ///
    /// The list composes left to right, so the rightmost entry is applied to
    /// points first. An empty list is the identity.
    pub fn parse_list(text: &str) -> Result<Affine> {
        let mut acc = Affine::IDENTITY;
        let mut rest = text;
        loop {
            rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
            if rest.is_empty() {
                return Ok(acc);
            }
            let Some((name, after_name)) = rest.split_once('(') else {
                return Err(TrackError::InvalidTransform(rest.to_string()));
            };
            let Some((args, after_args)) = after_name.split_once(')') else {
                return Err(TrackError::InvalidTransform(rest.to_string()));
            };
            let args = NumberLexer::new(args).numbers().map_err(|err| {
                TrackError::InvalidTransform(format!("{}({args}): {err}", name.trim()))
            })?;
            acc = acc.multiply(&Self::from_function(name.trim(), &args)?);
            rest = after_args;
        }
    }

    fn from_function(name: &str, args: &[f64]) -> Result<Affine> {
        let transform = match (name, args) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new(a, b, c, d, e, f),
            ("translate", &[tx]) => Affine::translate(tx, 0.0),
            ("translate", &[tx, ty]) => Affine::translate(tx, ty),
            ("scale", &[s]) => Affine::scale(s, s),
            ("scale", &[sx, sy]) => Affine::scale(sx, sy),
            ("rotate", &[angle]) => Affine::rotate_degrees(angle),
            ("rotate", &[angle, cx, cy]) => Affine::rotate_about(angle, cx, cy),
            ("skewX", &[angle]) => Affine::skew_x_degrees(angle),
            ("skewY", &[angle]) => Affine::skew_y_degrees(angle),
            _ => {
                return Err(TrackError::InvalidTransform(format!(
                    "{name} with {} argument(s)",
                    args.len()
                )));
            }
        };
        Ok(transform)
    }
}
