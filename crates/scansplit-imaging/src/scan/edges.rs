// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fallback detector built on Canny edges, for pages where the lightness mask
// finds nothing.

use image::RgbImage;
use image::imageops::grayscale;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use scansplit_core::{DetectorKind, RejectReason, RejectedQuad, SplitConfig};
use tracing::{debug, instrument};

use super::detector::{Detection, DetectionStats, Detector, DiagnosticStep};
use super::geometry::{contour_area, external_contours, min_area_rect};
use super::nms::suppress_overlaps;
use super::segment::{BLUR_SIGMA, close_square};

/// Edge-map detector. Less robust to uneven lighting than [`MaskDetector`],
/// but copes with photos close to the background colour.
///
/// [`MaskDetector`]: super::mask::MaskDetector
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector;

impl Detector for EdgeDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Edge
    }

    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    fn detect(&self, page: &RgbImage, config: &SplitConfig) -> Detection {
        let (width, height) = page.dimensions();
        if width == 0 || height == 0 {
            return Detection::default();
        }
        let page_area = width as f64 * height as f64;

        let gray = gaussian_blur_f32(&grayscale(page), BLUR_SIGMA);
        let edges = canny(&gray, config.canny_low, config.canny_high);
        let closed = close_square(&edges, config.edge_close_kernel);

        let mut stats = DetectionStats::default();
        let mut rejected = Vec::new();
        let mut candidates = Vec::new();

        for contour in external_contours(&closed) {
            let area = contour_area(&contour);
            if area < config.min_area_ratio * page_area || area > config.max_area_ratio * page_area
            {
                continue;
            }
            stats.candidates += 1;
            let Some(rect) = min_area_rect(&contour) else {
                continue;
            };
            if rect.shorter_side() < config.min_dimension {
                rejected.push(RejectedQuad {
                    quad: rect.quad,
                    reason: RejectReason::TooSmall,
                });
                continue;
            }
            let aspect = rect.longer_side() / rect.shorter_side().max(1.0);
            if aspect > config.edge_max_aspect_ratio {
                rejected.push(RejectedQuad {
                    quad: rect.quad,
                    reason: RejectReason::TooElongated,
                });
                continue;
            }
            candidates.push(rect.quad);
        }

        let deduplicated = suppress_overlaps(candidates, config);
        rejected.extend(deduplicated.suppressed);
        debug!(
            boxes = deduplicated.kept.len(),
            candidates = stats.candidates,
            "Edge detection finished"
        );

        let steps = if config.diagnostics {
            vec![
                DiagnosticStep::gray("gray", gray),
                DiagnosticStep::gray("edges", edges),
                DiagnosticStep::gray("edges_closed", closed),
            ]
        } else {
            Vec::new()
        };

        Detection {
            boxes: deduplicated.kept,
            rejected,
            stats,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page_with(w: u32, h: u32, rects: &[(u32, u32, u32, u32)]) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let inside = rects
                .iter()
                .any(|&(x0, y0, x1, y1)| (x0..x1).contains(&x) && (y0..y1).contains(&y));
            if inside { Rgb([70, 70, 70]) } else { Rgb([240, 240, 240]) }
        })
    }

    #[test]
    fn outlines_a_rectangle() {
        let page = page_with(500, 400, &[(100, 100, 400, 300)]);
        let detection = EdgeDetector.detect(&page, &SplitConfig::default());
        assert_eq!(detection.boxes.len(), 1);
        let quad = detection.boxes[0];
        let centre = quad.centroid();
        assert!((centre.x - 250.0).abs() < 5.0 && (centre.y - 200.0).abs() < 5.0);
        // The closed edge ring sits on the rectangle border, give or take
        // the closing and blur spread.
        assert!((quad.area() - 60_000.0).abs() < 6_000.0, "area {}", quad.area());
        assert_eq!(detection.stats.foreground_ratio, None);
    }

    #[test]
    fn elongated_strips_are_rejected() {
        let page = page_with(500, 400, &[(50, 180, 450, 220)]);
        let detection = EdgeDetector.detect(&page, &SplitConfig::default());
        assert!(detection.boxes.is_empty());
        assert!(
            detection
                .rejected
                .iter()
                .any(|r| r.reason == RejectReason::TooElongated)
        );
    }

    #[test]
    fn blank_page_has_no_edges() {
        let page = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        let config = SplitConfig {
            diagnostics: true,
            ..SplitConfig::default()
        };
        let detection = EdgeDetector.detect(&page, &config);
        assert!(detection.boxes.is_empty());
        let names: Vec<&str> = detection.steps.iter().map(|s| s.name).collect();
        assert_eq!(names, ["gray", "edges", "edges_closed"]);
    }
}
