// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scansplit pipeline.

use serde::{Deserialize, Serialize};

/// A point in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An oriented quadrilateral bounding one detected photo.
///
/// Stored as the four corners of a minimum-area rectangle in whatever order
/// the rectangle fit produced them. Use [`Quad::ordered`] where a canonical
/// corner order matters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned rectangle with its top-left corner at (`x`, `y`).
    pub fn axis_aligned(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    /// Polygon area (shoelace formula).
    pub fn area(&self) -> f64 {
        let c = &self.corners;
        let mut twice = 0.0;
        for i in 0..4 {
            let j = (i + 1) % 4;
            twice += c[i].x * c[j].y - c[j].x * c[i].y;
        }
        twice.abs() / 2.0
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Corners as top-left, top-right, bottom-right, bottom-left.
    ///
    /// Top-left has the smallest `x + y`, bottom-right the largest; top-right
    /// has the smallest `y - x`, bottom-left the largest. Ties go to the
    /// earliest stored corner.
    pub fn ordered(&self) -> [Point; 4] {
        let sum = |p: &Point| p.x + p.y;
        let diff = |p: &Point| p.y - p.x;
        let c = &self.corners;
        [
            c[arg_extreme(c, sum, false)],
            c[arg_extreme(c, diff, false)],
            c[arg_extreme(c, sum, true)],
            c[arg_extreme(c, diff, true)],
        ]
    }

    /// Copy shifted by (`dx`, `dy`).
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.corners.map(|p| Point::new(p.x + dx, p.y + dy)))
    }
}

/// Index of the first corner minimising (or maximising) `key`.
fn arg_extreme(points: &[Point; 4], key: impl Fn(&Point) -> f64, max: bool) -> usize {
    let mut best = 0;
    for i in 1..4 {
        let (candidate, current) = (key(&points[i]), key(&points[best]));
        let better = if max { candidate > current } else { candidate < current };
        if better {
            best = i;
        }
    }
    best
}

/// Quarter-turn page rotations tried by the orientation search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Deg0,
    /// 90° clockwise.
    Deg90,
    Deg180,
    /// 270° clockwise, i.e. 90° counter-clockwise.
    Deg270,
}

impl Rotation {
    /// All rotations in search order.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Clockwise angle in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Which detector produced a set of boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorKind {
    /// Otsu mask + morphology + watershed.
    Mask,
    /// Canny edge fallback.
    Edge,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mask => write!(f, "mask"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// Why a candidate rectangle was not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// A rectangle side was below the minimum dimension.
    TooSmall,
    /// Aspect ratio above the edge-fallback cutoff.
    TooElongated,
    /// Overlapped a larger kept box beyond the IoU threshold.
    Overlap,
}

/// A candidate rectangle dropped by a detector, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RejectedQuad {
    pub quad: Quad,
    pub reason: RejectReason,
}
