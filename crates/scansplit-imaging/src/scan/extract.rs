// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo extraction: reading order, perspective rectification and border trim.

use image::imageops::{crop_imm, grayscale};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scansplit_core::{Quad, SplitConfig};
use tracing::{debug, instrument, warn};

use super::geometry::nonzero_bounds;
use super::segment::{binarize_otsu_inverted, open_square};

/// Colour of warp samples falling outside the page.
const FILL: Rgb<u8> = Rgb([0, 0, 0]);

/// One rectified photo.
#[derive(Debug, Clone)]
pub struct ExtractedPhoto {
    /// 1-based position among the emitted photos.
    pub index: usize,
    /// Index of the source quad in the detection result.
    pub source: usize,
    pub image: RgbImage,
}

/// Quad indices sorted top-to-bottom then left-to-right by the key
/// `row_weight * centroid.y + centroid.x`.
pub fn reading_order(boxes: &[Quad], row_weight: f64) -> Vec<usize> {
    let keys: Vec<f64> = boxes
        .iter()
        .map(|quad| {
            let c = quad.centroid();
            row_weight * c.y + c.x
        })
        .collect();
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    order
}

/// Map `quad` onto an upright rectangle.
///
/// Output size is the truncated longer of each pair of opposite sides.
/// Returns `None` when either side is below `min_dimension` or the corners
/// are degenerate.
pub fn warp_quad(page: &RgbImage, quad: &Quad, min_dimension: f64) -> Option<RgbImage> {
    let [tl, tr, br, bl] = quad.ordered();
    let width = br.distance(&bl).max(tr.distance(&tl)) as u32;
    let height = tr.distance(&br).max(tl.distance(&bl)) as u32;
    if (width as f64) < min_dimension || (height as f64) < min_dimension || width == 0 || height == 0
    {
        return None;
    }

    let (right, bottom) = ((width - 1) as f32, (height - 1) as f32);
    let from = [tl, tr, br, bl].map(|p| (p.x as f32, p.y as f32));
    let to = [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)];
    let projection = Projection::from_control_points(from, to)?;

    let mut out = RgbImage::new(width, height);
    warp_into(page, &projection, Interpolation::Bicubic, FILL, &mut out);
    Some(out)
}

/// Trim the light margin around the content of `photo`, keeping `padding`
/// pixels on each side where available. Images without detectable content
/// are returned unchanged.
pub fn auto_crop_border(photo: RgbImage, padding: u32) -> RgbImage {
    let mask = open_square(&binarize_otsu_inverted(&grayscale(&photo)), 3);
    let Some(content) = nonzero_bounds(&mask) else {
        return photo;
    };
    let (w, h) = photo.dimensions();
    let x = content.x.saturating_sub(padding);
    let y = content.y.saturating_sub(padding);
    let width = (w - x).min(content.width.saturating_add(padding.saturating_mul(2)));
    let height = (h - y).min(content.height.saturating_add(padding.saturating_mul(2)));
    crop_imm(&photo, x, y, width, height).to_image()
}

/// Warp and trim every quad, in reading order.
#[instrument(skip_all, fields(boxes = boxes.len()))]
pub fn extract_photos(page: &RgbImage, boxes: &[Quad], config: &SplitConfig) -> Vec<ExtractedPhoto> {
    let mut photos = Vec::with_capacity(boxes.len());
    for source in reading_order(boxes, config.row_weight) {
        let Some(warped) = warp_quad(page, &boxes[source], config.min_dimension) else {
            warn!(source, "Box too small to rectify, skipping");
            continue;
        };
        let image = auto_crop_border(warped, config.crop_padding);
        debug!(
            source,
            width = image.width(),
            height = image.height(),
            "Photo extracted"
        );
        photos.push(ExtractedPhoto {
            index: photos.len() + 1,
            source,
            image,
        });
    }
    photos
}
