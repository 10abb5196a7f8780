// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector capability shared by the mask and edge detectors.

use image::{DynamicImage, GrayImage, RgbImage};
use scansplit_core::{DetectorKind, Quad, RejectedQuad, SplitConfig};

/// Finds candidate photo boxes on one page orientation.
///
/// Implementations never fail: a page without usable blobs produces an empty
/// [`Detection`].
pub trait Detector {
    fn kind(&self) -> DetectorKind;

    fn detect(&self, page: &RgbImage, config: &SplitConfig) -> Detection;
}

/// Output of one detector run on one orientation.
#[derive(Debug, Default)]
pub struct Detection {
    /// Accepted boxes after overlap suppression.
    pub boxes: Vec<Quad>,
    /// Candidates dropped by size, shape or overlap checks.
    pub rejected: Vec<RejectedQuad>,
    pub stats: DetectionStats,
    /// Intermediate images, only filled when diagnostics are enabled.
    pub steps: Vec<DiagnosticStep>,
}

/// Scan counters of one detector run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionStats {
    /// Contours that passed the area window.
    pub candidates: usize,
    /// Foreground fraction of the cleaned mask (mask detector only).
    pub foreground_ratio: Option<f64>,
    /// Rectangularity of every component that reached the rectangularity
    /// test (mask detector only).
    pub rectangularity: Vec<f64>,
    /// Components handed to the projection splitter.
    pub projection_splits: usize,
}

/// A named intermediate image.
#[derive(Debug, Clone)]
pub struct DiagnosticStep {
    pub name: &'static str,
    pub image: DiagnosticImage,
}

impl DiagnosticStep {
    pub fn gray(name: &'static str, image: GrayImage) -> Self {
        Self {
            name,
            image: DiagnosticImage::Gray(image),
        }
    }

    pub fn rgb(name: &'static str, image: RgbImage) -> Self {
        Self {
            name,
            image: DiagnosticImage::Rgb(image),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DiagnosticImage {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl DiagnosticImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Gray(img) => img.dimensions(),
            Self::Rgb(img) => img.dimensions(),
        }
    }

    /// Three-channel copy, suitable for JPEG output.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img.clone()).to_rgb8(),
            Self::Rgb(img) => img.clone(),
        }
    }
}
