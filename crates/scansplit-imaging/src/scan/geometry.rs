// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour and rectangle geometry shared by the detectors: external contour
// extraction, polygon area, convex hull, minimum-area rectangles and
// bounding boxes of binary masks.

use image::GrayImage;
use image::imageops::replace;
use imageproc::contours::{BorderType, find_contours};
use scansplit_core::{Point, Quad};

/// A closed contour as an ordered list of boundary pixel centres.
pub type Contour = Vec<Point>;

/// Outermost contours of the non-zero regions of `mask`.
///
/// Contours nested inside holes of other regions are ignored. Regions
/// touching the mask edge are traced like any other.
pub fn external_contours(mask: &GrayImage) -> Vec<Contour> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    // The tracer only starts an outer border right of a background pixel,
    // so surround the mask with one.
    let mut padded = GrayImage::new(w + 2, h + 2);
    replace(&mut padded, mask, 1, 1);
    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            c.points
                .iter()
                .map(|p| Point::new(p.x as f64 - 1.0, p.y as f64 - 1.0))
                .collect()
        })
        .collect()
}

/// Enclosed polygon area of a contour (shoelace formula).
pub fn contour_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice += p.x * q.y - q.x * p.y;
    }
    twice.abs() / 2.0
}

/// The external contour of `mask` with the largest area, with that area.
///
/// On equal areas the first contour found wins.
pub fn largest_contour(mask: &GrayImage) -> Option<(Contour, f64)> {
    let mut best: Option<(Contour, f64)> = None;
    for contour in external_contours(mask) {
        let area = contour_area(&contour);
        if best.as_ref().is_none_or(|(_, best_area)| area > *best_area) {
            best = Some((contour, area));
        }
    }
    best
}

/// Minimum-area enclosing rectangle of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinAreaRect {
    /// Rectangle corners, consecutive around the perimeter.
    pub quad: Quad,
    /// Side length along the first corner pair.
    pub width: f64,
    /// Side length along the second corner pair.
    pub height: f64,
}

impl MinAreaRect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn shorter_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn longer_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Copy shifted by (`dx`, `dy`).
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            quad: self.quad.translated(dx, dy),
            ..*self
        }
    }
}

/// Minimum-area rectangle enclosing `points`, via rotating calipers over the
/// convex hull.
///
/// Degenerate inputs (a single point, collinear points) yield the axis-aligned
/// bounds, which may have zero width or height. Returns `None` only for an
/// empty input.
pub fn min_area_rect(points: &[Point]) -> Option<MinAreaRect> {
    if points.is_empty() {
        return None;
    }

    let hull = convex_hull(points);
    if hull.len() < 3 {
        let (min_x, min_y, max_x, max_y) = bounds(points);
        let (width, height) = (max_x - min_x, max_y - min_y);
        return Some(MinAreaRect {
            quad: Quad::axis_aligned(min_x, min_y, width, height),
            width,
            height,
        });
    }

    let mut best: Option<MinAreaRect> = None;
    for i in 0..hull.len() {
        let origin = hull[i];
        let next = hull[(i + 1) % hull.len()];
        let length = origin.distance(&next);
        if length == 0.0 {
            continue;
        }
        // Unit vector along the edge and its normal.
        let (ux, uy) = ((next.x - origin.x) / length, (next.y - origin.y) / length);
        let (vx, vy) = (-uy, ux);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let (dx, dy) = (p.x - origin.x, p.y - origin.y);
            let u = dx * ux + dy * uy;
            let v = dx * vx + dy * vy;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let (width, height) = (max_u - min_u, max_v - min_v);
        if best.is_none_or(|r| width * height < r.area()) {
            let corner = |u: f64, v: f64| {
                Point::new(origin.x + u * ux + v * vx, origin.y + u * uy + v * vy)
            };
            best = Some(MinAreaRect {
                quad: Quad::new([
                    corner(min_u, min_v),
                    corner(max_u, min_v),
                    corner(max_u, max_v),
                    corner(min_u, max_v),
                ]),
                width,
                height,
            });
        }
    }
    best
}

/// Convex hull using Andrew's monotone chain, counter-clockwise in a y-up
/// frame, without collinear points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point> = Vec::new();
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        ),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    )
}

/// Integer axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Tight bounding box of all non-zero pixels, or `None` for an empty mask.
pub fn nonzero_bounds(mask: &GrayImage) -> Option<PixelRect> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut any = false;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] != 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    any.then(|| PixelRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled_mask(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[test]
    fn contour_area_of_pixel_rectangle() {
        // Boundary pixel centres of a 40x30 block span 39x29.
        let mask = filled_mask(60, 50, 10, 10, 50, 40);
        let (contour, area) = largest_contour(&mask).expect("one contour");
        assert!(!contour.is_empty());
        assert!((area - 39.0 * 29.0).abs() < 1e-9, "area {area}");
    }

    #[test]
    fn regions_touching_the_mask_edge_are_traced() {
        // A uniform patch filling its whole crop, as cut from a label map.
        let mask = filled_mask(40, 30, 0, 0, 40, 30);
        let (contour, area) = largest_contour(&mask).expect("one contour");
        assert!((area - 39.0 * 29.0).abs() < 1e-9, "area {area}");
        let (min_x, min_y, max_x, max_y) = bounds(&contour);
        assert_eq!((min_x, min_y, max_x, max_y), (0.0, 0.0, 39.0, 29.0));

        // Flush against the left edge only.
        let mask = filled_mask(60, 50, 0, 10, 25, 40);
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(bounds(&contours[0]), (0.0, 10.0, 24.0, 39.0));
    }

    #[test]
    fn external_contours_skip_nested_regions() {
        // A ring with a separate blob inside its hole.
        let mut mask = filled_mask(80, 80, 5, 5, 75, 75);
        for y in 15..65 {
            for x in 15..65 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        for y in 30..50 {
            for x in 30..50 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        assert_eq!(external_contours(&mask).len(), 1);
    }

    #[test]
    fn empty_mask_has_no_contours() {
        assert!(largest_contour(&GrayImage::new(20, 20)).is_none());
        assert!(external_contours(&GrayImage::new(0, 0)).is_empty());
    }

    #[test]
    fn convex_hull_drops_interior_points() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 0.0),
        ];
        assert_eq!(convex_hull(&points).len(), 4);
    }

    #[test]
    fn min_area_rect_axis_aligned() {
        let points = [
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
            Point::new(50.0, 40.0),
            Point::new(10.0, 40.0),
            Point::new(30.0, 25.0),
        ];
        let rect = min_area_rect(&points).expect("rect");
        assert!((rect.area() - 1200.0).abs() < 1e-6);
        assert!((rect.longer_side() - 40.0).abs() < 1e-6);
        assert!((rect.shorter_side() - 30.0).abs() < 1e-6);
        let c = rect.quad.centroid();
        assert!((c.x - 30.0).abs() < 1e-6 && (c.y - 25.0).abs() < 1e-6);
    }

    #[test]
    fn min_area_rect_rotated_square() {
        // A diamond: the tight rectangle is the diamond itself, not its
        // axis-aligned bounds.
        let points = [
            Point::new(50.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 50.0),
        ];
        let rect = min_area_rect(&points).expect("rect");
        let side = 50.0 * 2f64.sqrt();
        assert!((rect.width - side).abs() < 1e-6);
        assert!((rect.height - side).abs() < 1e-6);
        assert!((rect.area() - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn min_area_rect_degenerate_inputs() {
        assert!(min_area_rect(&[]).is_none());
        let line = [Point::new(0.0, 5.0), Point::new(10.0, 5.0), Point::new(20.0, 5.0)];
        let rect = min_area_rect(&line).expect("rect");
        assert_eq!(rect.height, 0.0);
        assert!((rect.width - 20.0).abs() < 1e-9);
    }

    #[test]
    fn nonzero_bounds_of_block() {
        let mask = filled_mask(100, 80, 12, 7, 40, 30);
        assert_eq!(
            nonzero_bounds(&mask),
            Some(PixelRect {
                x: 12,
                y: 7,
                width: 28,
                height: 23
            })
        );
        assert_eq!(nonzero_bounds(&GrayImage::new(10, 10)), None);
    }
}
