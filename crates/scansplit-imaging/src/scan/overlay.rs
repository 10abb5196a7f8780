// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug overlay: detected boxes outlined on the oriented page, numbered in
// reading order, under a one-line summary header.

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use scansplit_core::{Quad, Rotation};
use tracing::warn;

const FONT: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

const OUTLINE: Rgb<u8> = Rgb([255, 255, 0]);
const LABEL: Rgb<u8> = Rgb([0, 255, 0]);
const HEADER: Rgb<u8> = Rgb([255, 255, 255]);
const HALO: Rgb<u8> = Rgb([0, 0, 0]);

/// Stroke width scaled to the page: 0.3% of the longer side, at least 2 px.
pub fn stroke_width(width: u32, height: u32) -> u32 {
    ((0.003 * width.max(height) as f64) as u32).max(2)
}

/// Text height scaled to the page: 3.6% of the longer side, at least 18 px.
pub fn text_scale(width: u32, height: u32) -> f32 {
    (0.036 * width.max(height) as f32).max(18.0)
}

/// Copy of `page` with every quad outlined.
///
/// Each quad is labelled near its top-left corner with its 1-based position
/// in `order`, or its own index + 1 when `order` does not list it. The
/// header reads `Detected: N | Angle: R°`.
pub fn draw_overlay(
    page: &RgbImage,
    boxes: &[Quad],
    order: &[usize],
    rotation: Rotation,
) -> RgbImage {
    let mut canvas = page.clone();
    let (width, height) = page.dimensions();
    let stroke = stroke_width(width, height) as i32;

    for quad in boxes {
        let c = &quad.corners;
        for i in 0..4 {
            let (p, q) = (c[i], c[(i + 1) % 4]);
            for offset in -(stroke / 2)..stroke - stroke / 2 {
                let o = offset as f32;
                draw_line_segment_mut(
                    &mut canvas,
                    (p.x as f32 + o, p.y as f32),
                    (q.x as f32 + o, q.y as f32),
                    OUTLINE,
                );
                draw_line_segment_mut(
                    &mut canvas,
                    (p.x as f32, p.y as f32 + o),
                    (q.x as f32, q.y as f32 + o),
                    OUTLINE,
                );
            }
        }
    }

    let font = match FontRef::try_from_slice(FONT) {
        Ok(font) => font,
        Err(err) => {
            warn!(error = %err, "Overlay font unusable, labels skipped");
            return canvas;
        }
    };
    let scale = PxScale::from(text_scale(width, height));
    let halo = (stroke / 2).max(1);
    let label = |canvas: &mut RgbImage, x: i32, y: i32, text: &str, colour: Rgb<u8>| {
        for dy in [-halo, 0, halo] {
            for dx in [-halo, 0, halo] {
                if (dx, dy) != (0, 0) {
                    draw_text_mut(canvas, HALO, x + dx, y + dy, scale, &font, text);
                }
            }
        }
        draw_text_mut(canvas, colour, x, y, scale, &font, text);
    };

    for (index, quad) in boxes.iter().enumerate() {
        let number = order
            .iter()
            .position(|&source| source == index)
            .unwrap_or(index)
            + 1;
        let [top_left, ..] = quad.ordered();
        let (x, y) = (top_left.x as i32 + 5, top_left.y as i32 + 5);
        label(&mut canvas, x, y, &number.to_string(), LABEL);
    }

    let header = format!("Detected: {} | Angle: {}", boxes.len(), rotation);
    label(&mut canvas, 10, 10, &header, HEADER);
    canvas
}
