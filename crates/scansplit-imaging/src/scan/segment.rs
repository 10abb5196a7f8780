// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segmentation primitives: lightness extraction, inverted Otsu binarization,
// square-kernel morphology and distance-transform markers.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::{Norm, euclidean_squared_distance_transform};
use imageproc::morphology;

/// Gaussian sigma equivalent to a 5x5 kernel with automatic sigma
/// (`0.3 * ((5 - 1) * 0.5 - 1) + 0.8`).
pub const BLUR_SIGMA: f32 = 1.1;

/// CIE L* lightness of an sRGB image, scaled to 0..=255.
///
/// Uses the D65 white point; this is the first channel of an 8-bit L*a*b*
/// conversion.
pub fn lab_lightness(page: &RgbImage) -> GrayImage {
    let mut linear = [0f64; 256];
    for (v, slot) in linear.iter_mut().enumerate() {
        let c = v as f64 / 255.0;
        *slot = if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        };
    }

    let mut out = GrayImage::new(page.width(), page.height());
    for (dst, src) in out.pixels_mut().zip(page.pixels()) {
        let [r, g, b] = src.0;
        let y = 0.212671 * linear[r as usize]
            + 0.715160 * linear[g as usize]
            + 0.072169 * linear[b as usize];
        let l_star = if y > 0.008856 {
            116.0 * y.cbrt() - 16.0
        } else {
            903.3 * y
        };
        dst.0[0] = (l_star * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Binarize with an automatic Otsu level, inverted: pixels at or below the
/// level become foreground (255), brighter pixels background (0).
///
/// On a white page the dark photos end up as foreground.
pub fn binarize_otsu_inverted(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    let mut mask = gray.clone();
    for pixel in mask.pixels_mut() {
        pixel.0[0] = if pixel.0[0] <= level { 255 } else { 0 };
    }
    mask
}

/// Morphological opening with a `side` x `side` square.
pub fn open_square(mask: &GrayImage, side: u8) -> GrayImage {
    morphology::open(mask, Norm::LInf, side / 2)
}

/// Morphological closing with a `side` x `side` square.
pub fn close_square(mask: &GrayImage, side: u8) -> GrayImage {
    morphology::close(mask, Norm::LInf, side / 2)
}

/// Dilation with a `side` x `side` square.
pub fn dilate_square(mask: &GrayImage, side: u8) -> GrayImage {
    morphology::dilate(mask, Norm::LInf, side / 2)
}

/// Fraction of non-zero pixels.
pub fn foreground_ratio(mask: &GrayImage) -> f64 {
    let total = mask.width() as f64 * mask.height() as f64;
    if total == 0.0 {
        return 0.0;
    }
    let on = mask.pixels().filter(|p| p.0[0] != 0).count();
    on as f64 / total
}

/// Per-pixel Euclidean distance to the nearest background (zero) pixel.
///
/// Background pixels are 0. A mask without any background pixel gets the
/// page half-perimeter everywhere.
pub struct DistanceMap {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl DistanceMap {
    pub fn from_mask(mask: &GrayImage) -> Self {
        let (width, height) = mask.dimensions();
        let has_background = mask.pixels().any(|p| p.0[0] == 0);
        if !has_background {
            return Self {
                width,
                height,
                values: vec![(width + height) as f32; (width * height) as usize],
            };
        }

        // The transform measures distance to the nearest non-zero pixel, so
        // feed it the background as the seed set.
        let seeds = GrayImage::from_fn(width, height, |x, y| {
            if mask.get_pixel(x, y).0[0] == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let squared = euclidean_squared_distance_transform(&seeds);
        let values = squared.pixels().map(|p| p.0[0].sqrt() as f32).collect();
        Self {
            width,
            height,
            values,
        }
    }

    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// Pixels strictly farther than `fraction` of the maximum distance.
    pub fn confident_foreground(&self, fraction: f64) -> GrayImage {
        let cutoff = (fraction * self.max() as f64) as f32;
        let data = self
            .values
            .iter()
            .map(|&d| if d > cutoff { 255u8 } else { 0u8 })
            .collect();
        GrayImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Min-max normalised 8-bit rendering for diagnostics.
    pub fn to_gray(&self) -> GrayImage {
        let (lo, hi) = self
            .values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        let span = hi - lo;
        let data = self
            .values
            .iter()
            .map(|&d| {
                if span > 0.0 {
                    ((d - lo) / span * 255.0).round() as u8
                } else {
                    0
                }
            })
            .collect();
        GrayImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn lightness_extremes() {
        let mut page = RgbImage::from_pixel(4, 1, Rgb([255, 255, 255]));
        page.put_pixel(1, 0, Rgb([0, 0, 0]));
        page.put_pixel(2, 0, Rgb([128, 128, 128]));
        let l = lab_lightness(&page);
        assert_eq!(l.get_pixel(0, 0).0[0], 255);
        assert_eq!(l.get_pixel(1, 0).0[0], 0);
        // Mid-grey sRGB 128 has L* close to 53.6.
        let mid = l.get_pixel(2, 0).0[0] as i32;
        assert!((mid - 137).abs() <= 1, "mid-grey lightness {mid}");
    }

    #[test]
    fn inverted_otsu_marks_dark_pixels() {
        let mut gray = GrayImage::from_pixel(20, 20, Luma([240u8]));
        for y in 5..15 {
            for x in 5..15 {
                gray.put_pixel(x, y, Luma([30]));
            }
        }
        let mask = binarize_otsu_inverted(&gray);
        assert_eq!(mask.get_pixel(10, 10).0[0], 255);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert!((foreground_ratio(&mask) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn uniform_white_has_no_foreground() {
        let gray = GrayImage::from_pixel(16, 16, Luma([255u8]));
        assert_eq!(foreground_ratio(&binarize_otsu_inverted(&gray)), 0.0);
    }

    #[test]
    fn opening_removes_speckle_closing_fills_gap() {
        let mut mask = GrayImage::new(30, 30);
        mask.put_pixel(2, 2, Luma([255]));
        assert_eq!(foreground_ratio(&open_square(&mask, 3)), 0.0);

        let mut split = GrayImage::new(30, 30);
        for y in 5..25 {
            for x in (5..14).chain(16..25) {
                split.put_pixel(x, y, Luma([255]));
            }
        }
        let closed = close_square(&split, 7);
        assert_eq!(closed.get_pixel(14, 15).0[0], 255);
        assert_eq!(closed.get_pixel(15, 15).0[0], 255);
    }

    #[test]
    fn distance_peaks_in_the_middle() {
        let mut mask = GrayImage::new(21, 21);
        for y in 1..20 {
            for x in 1..20 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let dist = DistanceMap::from_mask(&mask);
        assert_eq!(dist.values[0], 0.0);
        let centre = dist.values[10 * 21 + 10];
        assert!((centre - 10.0).abs() < 1e-3, "centre {centre}");
        assert!((dist.max() - 10.0).abs() < 1e-3);

        let sure = dist.confident_foreground(0.3);
        assert_eq!(sure.get_pixel(10, 10).0[0], 255);
        assert_eq!(sure.get_pixel(1, 10).0[0], 0);
    }

    #[test]
    fn empty_mask_has_no_confident_foreground() {
        let dist = DistanceMap::from_mask(&GrayImage::new(10, 10));
        assert_eq!(dist.max(), 0.0);
        assert_eq!(foreground_ratio(&dist.confident_foreground(0.3)), 0.0);
    }
}
