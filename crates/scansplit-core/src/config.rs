// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Splitter configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanSplitError};

/// Tuning parameters for one splitter instance.
///
/// Immutable once handed to `PhotoSplitter`; every detector and extractor
/// receives it by reference. Missing fields in a serialized config fall back
/// to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Smallest accepted blob, as a fraction of the page area.
    pub min_area_ratio: f64,
    /// Largest accepted blob, as a fraction of the page area (above this the
    /// blob is most likely the whole page).
    pub max_area_ratio: f64,
    /// Side of the square opening kernel used to drop speckle noise.
    pub open_kernel: u8,
    /// Side of the square closing kernel used to bridge gaps at photo edges.
    /// Reduce it if neighbouring photos merge.
    pub close_kernel: u8,
    /// Contour area / min-rect area below which a blob is treated as two
    /// merged photos and handed to the projection splitter.
    pub rectangularity_threshold: f64,
    /// Fraction of the maximum distance-transform value above which a pixel
    /// seeds a watershed marker.
    pub sure_foreground_fraction: f64,
    /// Maximum IoU allowed between two kept boxes.
    pub nms_iou_threshold: f64,
    /// A projection seam only triggers a split when its value is below this
    /// fraction of the projection maximum.
    pub projection_valley_ratio: f64,
    /// Minimum contour area (px²) for one half of a projection split.
    pub projection_min_sub_area: f64,
    /// Low hysteresis threshold of the edge fallback.
    pub canny_low: f32,
    /// High hysteresis threshold of the edge fallback.
    pub canny_high: f32,
    /// Side of the square closing kernel applied to the edge map.
    pub edge_close_kernel: u8,
    /// Edge candidates with a longer/shorter side ratio above this are
    /// discarded as edge artifacts.
    pub edge_max_aspect_ratio: f64,
    /// Margin (px) kept around the detected content when trimming borders.
    pub crop_padding: u32,
    /// Minimum side (px) of a detected rectangle and of a warped photo.
    pub min_dimension: f64,
    /// Weight of the centroid y coordinate in the reading-order key
    /// `row_weight * y + x`. Must exceed any page width for rows to dominate;
    /// raise it for very large scans.
    pub row_weight: f64,
    /// Side of the square raster used for IoU computation.
    pub iou_grid_size: u32,
    /// Page extent assumed when scaling boxes onto the IoU raster. This is
    /// independent of the real page size.
    pub iou_reference_extent: f64,
    /// Collect intermediate masks, rejected boxes and an overlay.
    pub diagnostics: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.03,
            max_area_ratio: 0.98,
            open_kernel: 3,
            close_kernel: 7,
            rectangularity_threshold: 0.60,
            sure_foreground_fraction: 0.30,
            nms_iou_threshold: 0.25,
            projection_valley_ratio: 0.20,
            projection_min_sub_area: 5000.0,
            canny_low: 50.0,
            canny_high: 150.0,
            edge_close_kernel: 15,
            edge_max_aspect_ratio: 4.5,
            crop_padding: 10,
            min_dimension: 20.0,
            row_weight: 1e5,
            iou_grid_size: 2048,
            iou_reference_extent: 1000.0,
            diagnostics: false,
        }
    }
}

impl SplitConfig {
    /// Load a configuration from JSON. Absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are mutually consistent.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_area_ratio", self.min_area_ratio),
            ("max_area_ratio", self.max_area_ratio),
            ("rectangularity_threshold", self.rectangularity_threshold),
            ("sure_foreground_fraction", self.sure_foreground_fraction),
            ("nms_iou_threshold", self.nms_iou_threshold),
            ("projection_valley_ratio", self.projection_valley_ratio),
            ("projection_min_sub_area", self.projection_min_sub_area),
            ("canny_low", f64::from(self.canny_low)),
            ("canny_high", f64::from(self.canny_high)),
            ("edge_max_aspect_ratio", self.edge_max_aspect_ratio),
            ("min_dimension", self.min_dimension),
            ("row_weight", self.row_weight),
            ("iou_reference_extent", self.iou_reference_extent),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.min_area_ratio) || !unit.contains(&self.max_area_ratio) {
            return Err(invalid("area ratios must lie in [0, 1]"));
        }
        if self.min_area_ratio >= self.max_area_ratio {
            return Err(invalid(format!(
                "min_area_ratio ({}) must be below max_area_ratio ({})",
                self.min_area_ratio, self.max_area_ratio
            )));
        }
        for (name, side) in [
            ("open_kernel", self.open_kernel),
            ("close_kernel", self.close_kernel),
            ("edge_close_kernel", self.edge_close_kernel),
        ] {
            if side % 2 == 0 {
                return Err(invalid(format!("{name} must be an odd kernel side, got {side}")));
            }
        }
        for (name, value) in [
            ("rectangularity_threshold", self.rectangularity_threshold),
            ("sure_foreground_fraction", self.sure_foreground_fraction),
            ("nms_iou_threshold", self.nms_iou_threshold),
            ("projection_valley_ratio", self.projection_valley_ratio),
        ] {
            if !unit.contains(&value) {
                return Err(invalid(format!("{name} must lie in [0, 1], got {value}")));
            }
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(invalid("canny thresholds must satisfy 0 <= low <= high"));
        }
        if self.edge_max_aspect_ratio < 1.0 {
            return Err(invalid("edge_max_aspect_ratio must be at least 1"));
        }
        if self.min_dimension <= 0.0 || self.projection_min_sub_area < 0.0 {
            return Err(invalid("size limits must be positive"));
        }
        if self.row_weight <= 0.0 {
            return Err(invalid("row_weight must be positive"));
        }
        if self.iou_grid_size == 0 || self.iou_reference_extent <= 0.0 {
            return Err(invalid("IoU grid size and reference extent must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ScanSplitError {
    ScanSplitError::InvalidConfig(msg.into())
}
