// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation search: run a detector on every quarter-turn of the page and
// keep the orientation that yields the most boxes.

use std::borrow::Cow;

use image::RgbImage;
use image::imageops::{rotate90, rotate180, rotate270};
use scansplit_core::{DetectorKind, Quad, RejectedQuad, Rotation, SplitConfig};
use tracing::{debug, info, instrument};

use super::detector::{Detection, DetectionStats, Detector, DiagnosticStep};

/// Rotate `page` clockwise by `rotation`. The unrotated page is borrowed.
pub fn rotate_page(page: &RgbImage, rotation: Rotation) -> Cow<'_, RgbImage> {
    match rotation {
        Rotation::Deg0 => Cow::Borrowed(page),
        Rotation::Deg90 => Cow::Owned(rotate90(page)),
        Rotation::Deg180 => Cow::Owned(rotate180(page)),
        Rotation::Deg270 => Cow::Owned(rotate270(page)),
    }
}

/// Summary of one detector run on one orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationTrial {
    pub rotation: Rotation,
    pub detector: DetectorKind,
    /// Boxes left after overlap suppression.
    pub boxes: usize,
    pub foreground_ratio: Option<f64>,
}

/// Winning orientation and its boxes.
#[derive(Debug)]
pub struct DetectionResult {
    /// The page rotated by `rotation`; boxes are in its coordinates.
    pub oriented: RgbImage,
    pub rotation: Rotation,
    pub detector: DetectorKind,
    pub boxes: Vec<Quad>,
    pub rejected: Vec<RejectedQuad>,
    pub stats: DetectionStats,
    pub steps: Vec<DiagnosticStep>,
    /// Every run, in execution order.
    pub trials: Vec<OrientationTrial>,
}

/// Primary detector over all rotations, then the fallback when the primary
/// found nothing anywhere.
pub struct OrientationSearch<'a> {
    primary: &'a dyn Detector,
    fallback: &'a dyn Detector,
}

impl<'a> OrientationSearch<'a> {
    pub fn new(primary: &'a dyn Detector, fallback: &'a dyn Detector) -> Self {
        Self { primary, fallback }
    }

    /// Pick the orientation with the strictly greatest box count; ties keep
    /// the earliest rotation. Without any box the result is the unrotated
    /// page with the first primary run's details.
    ///
    /// Each trial rotates the page afresh; only the best rotation is kept.
    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub fn run(&self, page: &RgbImage, config: &SplitConfig) -> DetectionResult {
        let mut trials = Vec::with_capacity(2 * Rotation::ALL.len());
        let mut best: Option<(Rotation, DetectorKind, Detection, Cow<'_, RgbImage>)> = None;

        for detector in [self.primary, self.fallback] {
            let kind = detector.kind();
            for rotation in Rotation::ALL {
                let rotated = rotate_page(page, rotation);
                let detection = detector.detect(&rotated, config);
                debug!(
                    rotation = %rotation,
                    detector = %kind,
                    boxes = detection.boxes.len(),
                    fg_ratio = ?detection.stats.foreground_ratio,
                    "Orientation trial"
                );
                trials.push(OrientationTrial {
                    rotation,
                    detector: kind,
                    boxes: detection.boxes.len(),
                    foreground_ratio: detection.stats.foreground_ratio,
                });
                let improves = best
                    .as_ref()
                    .is_none_or(|(_, _, b, _)| detection.boxes.len() > b.boxes.len());
                if improves {
                    best = Some((rotation, kind, detection, rotated));
                }
            }
            if best.as_ref().is_some_and(|(_, _, b, _)| !b.boxes.is_empty()) {
                break;
            }
        }

        let (rotation, detector, detection, oriented) = best.unwrap_or_else(|| {
            (
                Rotation::Deg0,
                self.primary.kind(),
                Detection::default(),
                Cow::Borrowed(page),
            )
        });
        info!(
            rotation = %rotation,
            detector = %detector,
            boxes = detection.boxes.len(),
            "Orientation chosen"
        );

        DetectionResult {
            oriented: oriented.into_owned(),
            rotation,
            detector,
            boxes: detection.boxes,
            rejected: detection.rejected,
            stats: detection.stats,
            steps: detection.steps,
            trials,
        }
    }
}
