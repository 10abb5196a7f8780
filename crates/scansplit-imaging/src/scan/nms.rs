// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-maximum suppression of overlapping boxes.
//
// Overlap is measured by rasterising both quads onto a fixed square grid.
// Coordinates are scaled as if every page were `iou_reference_extent` pixels
// square, whatever its real size, so boxes far down a large page can fall
// partly or wholly off the grid.

use scansplit_core::{Point, Quad, RejectReason, RejectedQuad, SplitConfig};
use tracing::debug;

/// Fixed raster used for IoU.
#[derive(Debug, Clone, Copy)]
pub struct IouGrid {
    size: u32,
    scale: f64,
}

impl IouGrid {
    pub fn new(size: u32, reference_extent: f64) -> Self {
        Self {
            size,
            scale: size as f64 / reference_extent,
        }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.iou_grid_size, config.iou_reference_extent)
    }

    /// Intersection over union of the rasterised quads, 0.0 when neither
    /// covers any grid cell.
    pub fn iou(&self, a: &Quad, b: &Quad) -> f64 {
        let a = self.project(a);
        let b = self.project(b);
        let (mut intersection, mut union) = (0u64, 0u64);
        for row in 0..self.size {
            let y = row as f64;
            match (self.span(&a, y), self.span(&b, y)) {
                (Some((a0, a1)), Some((b0, b1))) => {
                    let overlap = if a1.min(b1) >= a0.max(b0) {
                        (a1.min(b1) - a0.max(b0) + 1) as u64
                    } else {
                        0
                    };
                    intersection += overlap;
                    union += (a1 - a0 + 1) as u64 + (b1 - b0 + 1) as u64 - overlap;
                }
                (Some((lo, hi)), None) | (None, Some((lo, hi))) => union += (hi - lo + 1) as u64,
                (None, None) => {}
            }
        }
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }

    fn project(&self, quad: &Quad) -> [Point; 4] {
        quad.corners
            .map(|p| Point::new(p.x * self.scale, p.y * self.scale))
    }

    /// Inclusive range of grid columns the convex polygon covers on row `y`.
    fn span(&self, poly: &[Point; 4], y: f64) -> Option<(u32, u32)> {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for i in 0..4 {
            let (p, q) = (poly[i], poly[(i + 1) % 4]);
            if (p.y - y) * (q.y - y) > 0.0 {
                continue;
            }
            if p.y == q.y {
                lo = lo.min(p.x.min(q.x));
                hi = hi.max(p.x.max(q.x));
            } else {
                let x = p.x + (y - p.y) / (q.y - p.y) * (q.x - p.x);
                lo = lo.min(x);
                hi = hi.max(x);
            }
        }
        let first = lo.ceil().max(0.0);
        let last = hi.floor().min(self.size as f64 - 1.0);
        (first <= last).then_some((first as u32, last as u32))
    }
}

/// Result of overlap suppression.
#[derive(Debug, Default)]
pub struct Deduplicated {
    /// Kept boxes, largest first.
    pub kept: Vec<Quad>,
    pub suppressed: Vec<RejectedQuad>,
}

/// Greedy NMS: visit boxes by descending area and keep a box only if its IoU
/// with every box kept so far is at most the threshold.
pub fn suppress_overlaps(boxes: Vec<Quad>, config: &SplitConfig) -> Deduplicated {
    let grid = IouGrid::from_config(config);
    let mut ranked: Vec<(f64, Quad)> = boxes.into_iter().map(|q| (q.area(), q)).collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut result = Deduplicated::default();
    for (_, candidate) in ranked {
        let overlaps = result
            .kept
            .iter()
            .any(|kept| grid.iou(&candidate, kept) > config.nms_iou_threshold);
        if overlaps {
            result.suppressed.push(RejectedQuad {
                quad: candidate,
                reason: RejectReason::Overlap,
            });
        } else {
            result.kept.push(candidate);
        }
    }
    if !result.suppressed.is_empty() {
        debug!(
            kept = result.kept.len(),
            suppressed = result.suppressed.len(),
            "Overlapping boxes suppressed"
        );
    }
    result
}
