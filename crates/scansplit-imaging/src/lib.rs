// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scansplit-imaging: photo detection and extraction for multi-photo scans.
//
// Finds the photos on a flatbed scan with a lightness mask and watershed
// (falling back to Canny edges), picks the page orientation with the most
// detections, then deskews and trims each photo.

pub mod image;
pub mod scan;
pub mod splitter;

// Re-export the primary types so callers can use `scansplit_imaging::PhotoSplitter` etc.
pub use self::image::codec;
pub use scan::{
    DetectionResult, Detector, DiagnosticImage, DiagnosticStep, EdgeDetector, ExtractedPhoto,
    MaskDetector, OrientationTrial,
};
pub use splitter::{PhotoSplitter, SplitDiagnostics, SplitOutput};
