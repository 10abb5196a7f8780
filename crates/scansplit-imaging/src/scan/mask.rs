// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Primary detector: segments the non-white content of the page, separates
// touching photos with a watershed and fits a rectangle to each blob.

use image::RgbImage;
use imageproc::filter::gaussian_blur_f32;
use scansplit_core::{DetectorKind, RejectReason, RejectedQuad, SplitConfig};
use tracing::{debug, instrument};

use super::detector::{Detection, DetectionStats, Detector, DiagnosticStep};
use super::geometry::{largest_contour, min_area_rect};
use super::nms::suppress_overlaps;
use super::projection::split_by_projection;
use super::segment::{
    BLUR_SIGMA, DistanceMap, binarize_otsu_inverted, close_square, dilate_square,
    foreground_ratio, lab_lightness, open_square,
};
use super::watershed::{LabelMap, flood};

/// Side of the square used to grow the confident background.
const SURE_BACKGROUND_KERNEL: u8 = 3;

/// Lightness-mask detector with watershed separation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskDetector;

impl Detector for MaskDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Mask
    }

    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    fn detect(&self, page: &RgbImage, config: &SplitConfig) -> Detection {
        let (width, height) = page.dimensions();
        if width == 0 || height == 0 {
            return Detection::default();
        }
        let page_area = width as f64 * height as f64;

        let lightness = gaussian_blur_f32(&lab_lightness(page), BLUR_SIGMA);
        let mask = binarize_otsu_inverted(&lightness);
        let opened = open_square(&mask, config.open_kernel);
        let closed = close_square(&opened, config.close_kernel);
        let fg_ratio = foreground_ratio(&closed);

        let distance = DistanceMap::from_mask(&closed);
        let sure_fg = distance.confident_foreground(config.sure_foreground_fraction);
        let sure_bg = dilate_square(&closed, SURE_BACKGROUND_KERNEL);
        let mut labels = LabelMap::from_markers(&sure_fg, &sure_bg);
        flood(page, &mut labels);

        let min_area = config.min_area_ratio * page_area;
        let max_area = config.max_area_ratio * page_area;
        let mut stats = DetectionStats {
            foreground_ratio: Some(fg_ratio),
            ..DetectionStats::default()
        };
        let mut rejected = Vec::new();
        let mut candidates = Vec::new();

        for region in labels.regions() {
            // A contour never encloses more than its bounding box.
            if (region.width as f64) * (region.height as f64) < min_area {
                continue;
            }
            let Some((contour, area)) = largest_contour(&labels.region_mask(&region)) else {
                continue;
            };
            if area < min_area || area > max_area {
                continue;
            }
            stats.candidates += 1;

            let Some(rect) = min_area_rect(&contour) else {
                continue;
            };
            let rect = rect.translated(region.x as f64, region.y as f64);
            if rect.shorter_side() < config.min_dimension {
                rejected.push(RejectedQuad {
                    quad: rect.quad,
                    reason: RejectReason::TooSmall,
                });
                continue;
            }

            let rectangularity = area / rect.area().max(1.0);
            stats.rectangularity.push(rectangularity);
            if rectangularity < config.rectangularity_threshold {
                debug!(label = region.label, rectangularity, "Blob looks merged, splitting");
                stats.projection_splits += 1;
                candidates.extend(split_by_projection(
                    &labels.component_mask(region.label),
                    config,
                ));
            } else {
                candidates.push(rect.quad);
            }
        }

        let deduplicated = suppress_overlaps(candidates, config);
        rejected.extend(deduplicated.suppressed);
        debug!(
            boxes = deduplicated.kept.len(),
            candidates = stats.candidates,
            fg_ratio,
            "Mask detection finished"
        );

        let steps = if config.diagnostics {
            vec![
                DiagnosticStep::gray("l_channel", lightness),
                DiagnosticStep::gray("mask_otsu_inv", mask),
                DiagnosticStep::gray("mask_opened", opened),
                DiagnosticStep::gray("mask_closed", closed),
                DiagnosticStep::gray("dist", distance.to_gray()),
                DiagnosticStep::rgb("watershed_labels", labels.to_colour()),
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
