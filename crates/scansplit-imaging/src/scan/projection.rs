// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Projection split of a merged blob along its background seam.

use image::GrayImage;
use image::imageops::crop_imm;
use scansplit_core::{Quad, SplitConfig};
use tracing::debug;

use super::geometry::{largest_contour, min_area_rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Columns,
    Rows,
}

/// Split a full-page component mask into sub-boxes.
///
/// Tries a vertical cut first; when that yields at most one box, a horizontal
/// cut is tried and its boxes are appended. May return an empty list.
pub fn split_by_projection(mask: &GrayImage, config: &SplitConfig) -> Vec<Quad> {
    let mut boxes = split_along(mask, Axis::Columns, config);
    if boxes.len() <= 1 {
        boxes.extend(split_along(mask, Axis::Rows, config));
    }
    debug!(boxes = boxes.len(), "Projection split");
    boxes
}

/// Seam position: the first index of the minimum background count, if that
/// minimum is below `ratio` of the maximum and the maximum is non-zero.
pub fn find_seam(background: &[u64], ratio: f64) -> Option<usize> {
    let max = background.iter().copied().max()?;
    let (seam, &min) = background.iter().enumerate().min_by_key(|(_, c)| **c)?;
    (max > 0 && (min as f64) < ratio * max as f64).then_some(seam)
}

fn background_counts(mask: &GrayImage, axis: Axis) -> Vec<u64> {
    let (w, h) = mask.dimensions();
    let len = match axis {
        Axis::Columns => w,
        Axis::Rows => h,
    };
    let mut counts = vec![0u64; len as usize];
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == 0 {
            let i = match axis {
                Axis::Columns => x,
                Axis::Rows => y,
            };
            counts[i as usize] += 1;
        }
    }
    counts
}

fn split_along(mask: &GrayImage, axis: Axis, config: &SplitConfig) -> Vec<Quad> {
    let counts = background_counts(mask, axis);
    let Some(seam) = find_seam(&counts, config.projection_valley_ratio) else {
        return Vec::new();
    };
    let seam = seam as u32;
    let (w, h) = mask.dimensions();

    // (x, y, width, height) of both halves.
    let halves = match axis {
        Axis::Columns => [(0, 0, seam, h), (seam, 0, w - seam, h)],
        Axis::Rows => [(0, 0, w, seam), (0, seam, w, h - seam)],
    };

    let mut boxes = Vec::new();
    for (x, y, width, height) in halves {
        if width == 0 || height == 0 {
            continue;
        }
        let half = crop_imm(mask, x, y, width, height).to_image();
        let Some((contour, area)) = largest_contour(&half) else {
            continue;
        };
        if area < config.projection_min_sub_area {
            continue;
        }
        if let Some(rect) = min_area_rect(&contour) {
            boxes.push(rect.quad.translated(x as f64, y as f64));
        }
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn mask_with(w: u32, h: u32, blocks: &[(u32, u32, u32, u32)]) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let on = blocks
                .iter()
                .any(|&(x0, y0, x1, y1)| (x0..x1).contains(&x) && (y0..y1).contains(&y));
            Luma([if on { 255 } else { 0 }])
        })
    }

    #[test]
    fn seam_is_first_minimum() {
        assert_eq!(find_seam(&[300, 40, 290, 40, 300], 0.2), Some(1));
    }

    #[test]
    fn no_seam_without_valley() {
        assert_eq!(find_seam(&[300, 200, 290], 0.2), None);
        assert_eq!(find_seam(&[0, 0, 0], 0.2), None);
        assert_eq!(find_seam(&[], 0.2), None);
    }

    #[test]
    fn bridged_pair_splits_vertically() {
        // Two 150x200 blocks joined by a thin bar; the only column without
        // any background is inside the bar.
        let mask = mask_with(
            400,
            240,
            &[(20, 20, 170, 220), (230, 20, 380, 220), (170, 0, 230, 240)],
        );
        let boxes = split_by_projection(&mask, &SplitConfig::default());
        assert_eq!(boxes.len(), 2);
        assert!(boxes[0].centroid().x < boxes[1].centroid().x);
        for quad in &boxes {
            assert!(quad.area() > 5000.0);
        }
    }

    #[test]
    fn single_vertical_box_gets_row_split_appended() {
        // Stacked blocks joined by a full-width bar. The column cut at x=20
        // leaves a sliver (dropped) and one box; the row cut through the bar
        // then adds the two stacked halves.
        let mask = mask_with(
            300,
            300,
            &[(20, 20, 280, 130), (20, 170, 280, 280), (0, 130, 300, 170)],
        );
        let boxes = split_by_projection(&mask, &SplitConfig::default());
        assert_eq!(boxes.len(), 3);
        assert!(boxes[1].centroid().y < boxes[2].centroid().y);
        assert!(boxes[1].centroid().y < 130.0);
    }

    #[test]
    fn small_halves_are_dropped() {
        let mask = mask_with(100, 60, &[(10, 10, 40, 50), (40, 0, 50, 60), (50, 10, 90, 50)]);
        assert!(split_by_projection(&mask, &SplitConfig::default()).is_empty());
    }

    #[test]
    fn empty_mask_yields_nothing() {
        assert!(split_by_projection(&GrayImage::new(50, 50), &SplitConfig::default()).is_empty());
    }
}
