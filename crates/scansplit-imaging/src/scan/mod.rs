// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: segmentation, box detection, overlap suppression,
// orientation search and photo extraction.

pub mod detector;
pub mod edges;
pub mod extract;
pub mod geometry;
pub mod mask;
pub mod nms;
pub mod orientation;
pub mod overlay;
pub mod projection;
pub mod segment;
pub mod watershed;

pub use detector::{Detection, DetectionStats, Detector, DiagnosticImage, DiagnosticStep};
pub use edges::EdgeDetector;
pub use extract::ExtractedPhoto;
pub use mask::MaskDetector;
pub use orientation::{DetectionResult, OrientationSearch, OrientationTrial};
