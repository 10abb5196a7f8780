// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Marker-controlled watershed over a colour image.
//
// Markers: 0 = unknown (to be flooded), 1 = confident background, >= 2 = one
// seed per confident-foreground component. After flooding every pixel carries
// a label, or `BOUNDARY` where two basins meet and along the image border.

use std::collections::VecDeque;

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::region_labelling::{Connectivity, connected_components};

/// Label of watershed lines and of the image border.
pub const BOUNDARY: i32 = -1;
/// Label of the confident background.
pub const BACKGROUND: i32 = 1;

const IN_QUEUE: i32 = -2;
const NUM_QUEUES: usize = 256;

/// Bounding box and label of one flooded region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub label: i32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Row-major label grid the size of the page.
#[derive(Debug, Clone)]
pub struct LabelMap {
    pub width: u32,
    pub height: u32,
    pub labels: Vec<i32>,
}

impl LabelMap {
    /// Seed markers from a confident-foreground mask and a confident-background
    /// region.
    ///
    /// Components of `sure_fg` (8-connected) get labels 2.., the rest of the
    /// page 1, and pixels inside `sure_bg` but outside `sure_fg` are unknown.
    pub fn from_markers(sure_fg: &GrayImage, sure_bg: &GrayImage) -> Self {
        let (width, height) = sure_fg.dimensions();
        let components = connected_components(sure_fg, Connectivity::Eight, Luma([0u8]));
        let labels = components
            .pixels()
            .zip(sure_fg.pixels().zip(sure_bg.pixels()))
            .map(|(component, (fg, bg))| {
                if bg.0[0] != 0 && fg.0[0] == 0 {
                    0
                } else {
                    component.0[0] as i32 + 1
                }
            })
            .collect();
        Self {
            width,
            height,
            labels,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> i32 {
        self.labels[(y * self.width + x) as usize]
    }

    /// Regions with a label above `BACKGROUND`, in ascending label order.
    pub fn regions(&self) -> Vec<Region> {
        let max_label = self.labels.iter().copied().max().unwrap_or(0);
        if max_label <= BACKGROUND {
            return Vec::new();
        }
        // (min_x, min_y, max_x, max_y) per label.
        let mut extents: Vec<Option<(u32, u32, u32, u32)>> = vec![None; max_label as usize + 1];
        for (i, &label) in self.labels.iter().enumerate() {
            if label <= BACKGROUND {
                continue;
            }
            let (x, y) = (i as u32 % self.width, i as u32 / self.width);
            let entry = &mut extents[label as usize];
            *entry = Some(match *entry {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        extents
            .iter()
            .enumerate()
            .filter_map(|(label, extent)| {
                extent.map(|(x0, y0, x1, y1)| Region {
                    label: label as i32,
                    x: x0,
                    y: y0,
                    width: x1 - x0 + 1,
                    height: y1 - y0 + 1,
                })
            })
            .collect()
    }

    /// Binary mask of `region`, cropped to its bounding box.
    pub fn region_mask(&self, region: &Region) -> GrayImage {
        GrayImage::from_fn(region.width, region.height, |x, y| {
            if self.get(region.x + x, region.y + y) == region.label {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    /// Full-page binary mask of one label.
    pub fn component_mask(&self, label: i32) -> GrayImage {
        let data = self
            .labels
            .iter()
            .map(|&l| if l == label { 255u8 } else { 0u8 })
            .collect();
        GrayImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// False-colour rendering: regions above the background get a stable
    /// per-label colour, everything else stays black.
    pub fn to_colour(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let label = self.get(x, y);
            if label <= BACKGROUND {
                Rgb([0, 0, 0])
            } else {
                label_colour(label)
            }
        })
    }
}

fn label_colour(label: i32) -> Rgb<u8> {
    let hash = (label as u32).wrapping_mul(0x9E37_79B9);
    let channel = |shift: u32| 80 + ((hash >> shift) % 176) as u8;
    Rgb([channel(0), channel(11), channel(22)])
}

/// Flood the unknown pixels of `markers` from their labelled neighbours.
///
/// Pixels are processed in order of the colour difference to the neighbour
/// that reached them (max absolute channel difference), one FIFO queue per
/// difference level. A pixel whose labelled 4-neighbours disagree becomes
/// `BOUNDARY`.
pub fn flood(image: &RgbImage, markers: &mut LabelMap) {
    let (w, h) = (markers.width as usize, markers.height as usize);
    debug_assert_eq!(image.dimensions(), (markers.width, markers.height));
    let labels = &mut markers.labels;

    if w < 3 || h < 3 {
        labels.fill(BOUNDARY);
        return;
    }

    for x in 0..w {
        labels[x] = BOUNDARY;
        labels[(h - 1) * w + x] = BOUNDARY;
    }
    for y in 0..h {
        labels[y * w] = BOUNDARY;
        labels[y * w + w - 1] = BOUNDARY;
    }

    let rgb = image.as_raw();
    let diff = |a: usize, b: usize| -> usize {
        (0..3)
            .map(|c| rgb[a * 3 + c].abs_diff(rgb[b * 3 + c]))
            .max()
            .unwrap_or(0) as usize
    };
    let neighbours = |i: usize| [i - 1, i + 1, i - w, i + w];

    let mut queues: Vec<VecDeque<usize>> = (0..NUM_QUEUES).map(|_| VecDeque::new()).collect();
    let mut active = NUM_QUEUES;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            if labels[i] != 0 {
                continue;
            }
            let priority = neighbours(i)
                .into_iter()
                .filter(|&n| labels[n] > 0)
                .map(|n| diff(i, n))
                .min();
            if let Some(priority) = priority {
                queues[priority].push_back(i);
                labels[i] = IN_QUEUE;
                active = active.min(priority);
            }
        }
    }

    loop {
        while active < NUM_QUEUES && queues[active].is_empty() {
            active += 1;
        }
        let Some(i) = queues.get_mut(active).and_then(VecDeque::pop_front) else {
            break;
        };

        let mut label = 0;
        for n in neighbours(i) {
            let t = labels[n];
            if t > 0 {
                if label == 0 {
                    label = t;
                } else if t != label {
                    label = BOUNDARY;
                }
            }
        }
        if label == 0 {
            label = BOUNDARY;
        }
        labels[i] = label;
        if label == BOUNDARY {
            continue;
        }

        for n in neighbours(i) {
            if labels[n] == 0 {
                let priority = diff(i, n);
                queues[priority].push_back(n);
                labels[n] = IN_QUEUE;
                active = active.min(priority);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_mask(w: u32, h: u32, blocks: &[(u32, u32, u32, u32)]) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = blocks
                .iter()
                .any(|&(x0, y0, x1, y1)| (x0..x1).contains(&x) && (y0..y1).contains(&y));
            Luma([if inside { 255 } else { 0 }])
        })
    }

    #[test]
    fn markers_layout() {
        let sure_fg = block_mask(20, 20, &[(8, 8, 12, 12)]);
        let sure_bg = block_mask(20, 20, &[(4, 4, 16, 16)]);
        let markers = LabelMap::from_markers(&sure_fg, &sure_bg);
        assert_eq!(markers.get(10, 10), 2);
        assert_eq!(markers.get(5, 5), 0);
        assert_eq!(markers.get(0, 0), BACKGROUND);
    }

    #[test]
    fn flood_stops_at_colour_edges() {
        // Two dark squares on white, touching nothing.
        let page = RgbImage::from_fn(60, 40, |x, y| {
            let dark = ((5..25).contains(&x) || (35..55).contains(&x)) && (10..30).contains(&y);
            if dark { Rgb([40, 40, 40]) } else { Rgb([250, 250, 250]) }
        });
        let sure_fg = block_mask(60, 40, &[(12, 17, 18, 23), (42, 17, 48, 23)]);
        let sure_bg = block_mask(60, 40, &[(4, 9, 26, 31), (34, 9, 56, 31)]);
        let mut markers = LabelMap::from_markers(&sure_fg, &sure_bg);
        flood(&page, &mut markers);

        assert!(markers.labels.iter().all(|&l| l != 0 && l != IN_QUEUE));
        assert_eq!(markers.get(0, 0), BOUNDARY);

        let regions = markers.regions();
        assert_eq!(regions.len(), 2);
        // Each basin grows out to the dark square, give or take the line
        // where it meets the background.
        for (region, x0) in regions.iter().zip([5u32, 35]) {
            assert!(region.x.abs_diff(x0) <= 1, "{region:?}");
            assert!(region.width.abs_diff(20) <= 2, "{region:?}");
            assert!(region.height.abs_diff(20) <= 2, "{region:?}");
        }
        let mask = markers.region_mask(&regions[0]);
        assert_eq!(mask.dimensions(), (regions[0].width, regions[0].height));
    }

    #[test]
    fn tiny_images_are_all_boundary() {
        let page = RgbImage::new(2, 5);
        let mut markers = LabelMap {
            width: 2,
            height: 5,
            labels: vec![1; 10],
        };
        flood(&page, &mut markers);
        assert!(markers.labels.iter().all(|&l| l == BOUNDARY));
        assert!(markers.regions().is_empty());
    }

    #[test]
    fn component_mask_matches_label() {
        let markers = LabelMap {
            width: 3,
            height: 2,
            labels: vec![1, 2, 2, -1, 3, 2],
        };
        let mask = markers.component_mask(2);
        assert_eq!(mask.as_raw(), &vec![0, 255, 255, 0, 0, 255]);
        assert_eq!(markers.to_colour().get_pixel(0, 0), &Rgb([0, 0, 0]));
    }
}
