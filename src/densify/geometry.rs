//! Integer ranges for grid iteration and the chromaticity-plane triangle test.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ascending half-open range `[0, end)`; empty for `end <= 0`.
pub fn range_to(end: i64) -> Range<i64> {
    range(0, end)
}

/// Ascending half-open range `[start, end)`; empty for `end <= start`.
pub fn range(start: i64, end: i64) -> Range<i64> {
    start..end.max(start)
}

/// A point in the chromaticity plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Strict point-in-triangle test.
///
/// The point is inside when it lies strictly on the same rotational side of all
/// three directed edges `v0→v1`, `v1→v2`, `v2→v0`. Either winding order works.
/// Points exactly on an edge or vertex are outside, and a zero-area triangle
/// contains nothing.
pub fn in_triangle(px: f64, py: f64, v0: Point2, v1: Point2, v2: Point2) -> bool {
    let s0 = edge_side(px, py, v0, v1);
    let s1 = edge_side(px, py, v1, v2);
    let s2 = edge_side(px, py, v2, v0);
    (s0 > 0.0 && s1 > 0.0 && s2 > 0.0) || (s0 < 0.0 && s1 < 0.0 && s2 < 0.0)
}

/// Cross product of `b - a` and `p - a`; positive when `p` is left of `a→b`.
fn edge_side(px: f64, py: f64, a: Point2, b: Point2) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Call-scoped clipping region in the chromaticity plane.
///
/// Serialized as the flat 6-number form `[x0, y0, x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Triangle {
    pub vertices: [Point2; 3],
}

impl Triangle {
    pub const fn new(v0: Point2, v1: Point2, v2: Point2) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    pub const fn from_flat([x0, y0, x1, y1, x2, y2]: [f64; 6]) -> Self {
        Self::new(Point2::new(x0, y0), Point2::new(x1, y1), Point2::new(x2, y2))
    }

    pub fn to_flat(&self) -> [f64; 6] {
        let [a, b, c] = self.vertices;
        [a.x, a.y, b.x, b.y, c.x, c.y]
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        let [v0, v1, v2] = self.vertices;
        in_triangle(px, py, v0, v1, v2)
    }
}

impl From<[f64; 6]> for Triangle {
    fn from(flat: [f64; 6]) -> Self {
        Self::from_flat(flat)
    }
}

impl From<Triangle> for [f64; 6] {
    fn from(triangle: Triangle) -> Self {
        triangle.to_flat()
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x0, y0, x1, y1, x2, y2] = self.to_flat();
        write!(f, "{x0},{y0},{x1},{y1},{x2},{y2}")
    }
}

/// Errors from parsing `x0,y0,x1,y1,x2,y2`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriangleParseError {
    #[error("expected 6 comma-separated numbers, got {0}")]
    WrongArity(usize),
    #[error("invalid triangle coordinate {0:?}")]
    InvalidNumber(String),
}

impl FromStr for Triangle {
    type Err = TriangleParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != 6 {
            return Err(TriangleParseError::WrongArity(parts.len()));
        }
        let mut flat = [0.0f64; 6];
        for (slot, part) in flat.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| TriangleParseError::InvalidNumber(part.to_string()))?;
        }
        Ok(Self::from_flat(flat))
    }
}
