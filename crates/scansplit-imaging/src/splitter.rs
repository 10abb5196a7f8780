// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PhotoSplitter: the entry point tying orientation search, detection and
// extraction together for one scanned page.

use image::{DynamicImage, RgbImage};
use scansplit_core::error::Result;
use scansplit_core::{DetectorKind, Quad, RejectedQuad, Rotation, SplitConfig};
use tracing::{info, instrument};

use crate::scan::detector::{DetectionStats, DiagnosticStep};
use crate::scan::edges::EdgeDetector;
use crate::scan::extract::{ExtractedPhoto, extract_photos, reading_order};
use crate::scan::mask::MaskDetector;
use crate::scan::orientation::{DetectionResult, OrientationSearch, OrientationTrial};
use crate::scan::overlay::draw_overlay;

/// Splits a multi-photo scan into individual, deskewed photos.
///
/// Holds only an immutable, validated [`SplitConfig`]; one instance can be
/// shared across threads and reused for any number of pages.
#[derive(Debug, Clone, Default)]
pub struct PhotoSplitter {
    config: SplitConfig,
}

/// Photos of one page plus, when enabled, what the detector saw.
#[derive(Debug)]
pub struct SplitOutput {
    /// Photos in reading order.
    pub photos: Vec<ExtractedPhoto>,
    /// Present only when `SplitConfig::diagnostics` is set.
    pub diagnostics: Option<SplitDiagnostics>,
}

/// Intermediate results of one split, for debugging and tuning.
#[derive(Debug)]
pub struct SplitDiagnostics {
    pub oriented: RgbImage,
    pub rotation: Rotation,
    pub detector: DetectorKind,
    pub boxes: Vec<Quad>,
    /// Reading order as indices into `boxes`.
    pub order: Vec<usize>,
    pub rejected: Vec<RejectedQuad>,
    pub stats: DetectionStats,
    pub steps: Vec<DiagnosticStep>,
    pub trials: Vec<OrientationTrial>,
    /// The oriented page with every box outlined and numbered.
    pub overlay: RgbImage,
}

impl SplitDiagnostics {
    fn from_detection(detection: DetectionResult, row_weight: f64) -> Self {
        let order = reading_order(&detection.boxes, row_weight);
        let overlay = draw_overlay(
            &detection.oriented,
            &detection.boxes,
            &order,
            detection.rotation,
        );
        Self {
            oriented: detection.oriented,
            rotation: detection.rotation,
            detector: detection.detector,
            boxes: detection.boxes,
            order,
            rejected: detection.rejected,
            stats: detection.stats,
            steps: detection.steps,
            trials: detection.trials,
            overlay,
        }
    }
}

impl PhotoSplitter {
    /// Create a splitter after validating `config`.
    pub fn new(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Find the best orientation and the photo boxes on it.
    pub fn detect(&self, page: &RgbImage) -> DetectionResult {
        let (primary, fallback) = (MaskDetector, EdgeDetector);
        OrientationSearch::new(&primary, &fallback).run(page, &self.config)
    }

    /// Detect, rectify and trim every photo on `page`.
    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub fn split(&self, page: &RgbImage) -> SplitOutput {
        let detection = self.detect(page);
        let photos = extract_photos(&detection.oriented, &detection.boxes, &self.config);
        info!(
            photos = photos.len(),
            boxes = detection.boxes.len(),
            rotation = %detection.rotation,
            detector = %detection.detector,
            "Page split"
        );

        let diagnostics = self
            .config
            .diagnostics
            .then(|| SplitDiagnostics::from_detection(detection, self.config.row_weight));
        SplitOutput {
            photos,
            diagnostics,
        }
    }

    /// [`split`](Self::split) for any decoded image; converts to RGB first.
    pub fn split_dynamic(&self, image: &DynamicImage) -> SplitOutput {
        self.split(&image.to_rgb8())
    }
}
