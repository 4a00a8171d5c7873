use std::collections::VecDeque;

use image::GrayImage;

use crate::binarize::FOREGROUND;
use crate::errors::{CrackScanError, Result};

/// Neighbor offsets for 4-connectivity (edge-adjacent)
static NEIGHBORS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Neighbor offsets for 8-connectivity (edge- and corner-adjacent)
static NEIGHBORS_8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Pixel adjacency rule used when grouping foreground pixels.
///
/// Cracks snake diagonally, so the default is 8-connectivity; it must match
/// what the downstream per-component analysis assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

impl Connectivity {
    /// Parse the 4/8 value used in configuration files
    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            other => Err(CrackScanError::Config(format!(
                "connectivity must be 4 or 8, got {}",
                other
            ))),
        }
    }

    fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &NEIGHBORS_4,
            Connectivity::Eight => &NEIGHBORS_8,
        }
    }
}

/// Inclusive pixel bounding box of a labeled component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0 + 1
    }
}

/// One connected foreground region with its single-pass statistics
#[derive(Debug, Clone)]
pub struct LabeledComponent {
    /// Positive label id; 0 is reserved for background
    pub label: u32,
    /// Pixel count
    pub area: u32,
    /// Mean pixel position (x, y) in mask coordinates
    pub centroid: (f64, f64),
    pub bbox: BoundingBox,
}

/// Dense per-pixel label array; 0 is background
pub struct LabelMap {
    width: usize,
    height: usize,
    labels: Vec<u32>,
}

impl LabelMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Label id at (x, y); 0 for background
    #[inline]
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width + x as usize]
    }
}

/// Partition a binary mask into connected foreground components.
///
/// Array-backed flood fill with a work queue. Seeds are visited in
/// row-major order, so label ids are deterministic for a fixed input.
/// Area, coordinate sums and the bounding box are accumulated during the
/// fill itself to avoid a second full-image scan.
pub fn label_components(
    mask: &GrayImage,
    connectivity: Connectivity,
) -> Result<(LabelMap, Vec<LabeledComponent>)> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Err(CrackScanError::InvalidInput(format!(
            "mask dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    let mut labels = vec![0u32; (width * height) as usize];
    let mut components = Vec::new();
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();
    let offsets = connectivity.offsets();
    let mut next_label = 1u32;

    for seed_y in 0..height {
        for seed_x in 0..width {
            let seed_idx = (seed_y * width + seed_x) as usize;
            if mask.get_pixel(seed_x, seed_y)[0] != FOREGROUND || labels[seed_idx] != 0 {
                continue;
            }

            let label = next_label;
            next_label += 1;

            let mut area = 0u32;
            let mut sum_x = 0.0f64;
            let mut sum_y = 0.0f64;
            let mut bbox = BoundingBox {
                x0: seed_x,
                y0: seed_y,
                x1: seed_x,
                y1: seed_y,
            };

            labels[seed_idx] = label;
            queue.push_back((seed_x, seed_y));

            while let Some((x, y)) = queue.pop_front() {
                area += 1;
                sum_x += x as f64;
                sum_y += y as f64;
                bbox.x0 = bbox.x0.min(x);
                bbox.x1 = bbox.x1.max(x);
                bbox.y0 = bbox.y0.min(y);
                bbox.y1 = bbox.y1.max(y);

                for &(dx, dy) in offsets {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;

                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }

                    let nx = nx as u32;
                    let ny = ny as u32;
                    let nidx = (ny * width + nx) as usize;

                    if mask.get_pixel(nx, ny)[0] == FOREGROUND && labels[nidx] == 0 {
                        labels[nidx] = label;
                        queue.push_back((nx, ny));
                    }
                }
            }

            components.push(LabeledComponent {
                label,
                area,
                centroid: (sum_x / area as f64, sum_y / area as f64),
                bbox,
            });
        }
    }

    let map = LabelMap {
        width: width as usize,
        height: height as usize,
        labels,
    };

    Ok((map, components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::Luma;

    fn mask_from_points(width: u32, height: u32, points: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in points {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
        mask
    }

    fn filled_rect(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
        mask
    }

    #[test]
    fn rectangle_has_one_component_with_exact_stats() {
        let mask = filled_rect(20, 20, 3, 5, 4, 10);
        let (map, components) = label_components(&mask, Connectivity::Eight).unwrap();

        assert_eq!(components.len(), 1);
        let comp = &components[0];
        assert_eq!(comp.label, 1);
        assert_eq!(comp.area, 40);
        assert_approx_eq!(comp.centroid.0, 4.5);
        assert_approx_eq!(comp.centroid.1, 9.5);
        assert_eq!(comp.bbox, BoundingBox { x0: 3, y0: 5, x1: 6, y1: 14 });
        assert_eq!(map.label_at(3, 5), 1);
        assert_eq!(map.label_at(0, 0), 0);
    }

    #[test]
    fn separated_blobs_get_distinct_labels() {
        let mask = mask_from_points(10, 10, &[(1, 1), (1, 2), (5, 5), (5, 6)]);
        let (_, components) = label_components(&mask, Connectivity::Eight).unwrap();

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].label, 1);
        assert_eq!(components[1].label, 2);
    }

    #[test]
    fn diagonal_touch_merges_under_eight_but_not_four() {
        // Two blobs sharing only a diagonal corner at (2,2)/(3,3)
        let points = [(1, 1), (2, 1), (1, 2), (2, 2), (3, 3), (4, 3), (3, 4), (4, 4)];
        let mask = mask_from_points(8, 8, &points);

        let (_, eight) = label_components(&mask, Connectivity::Eight).unwrap();
        assert_eq!(eight.len(), 1);
        assert_eq!(eight[0].area, 8);

        let (_, four) = label_components(&mask, Connectivity::Four).unwrap();
        assert_eq!(four.len(), 2);
        assert_eq!(four[0].area, 4);
        assert_eq!(four[1].area, 4);
    }

    #[test]
    fn labels_are_assigned_in_discovery_order() {
        let mask = mask_from_points(10, 4, &[(7, 0), (1, 1), (4, 2)]);
        let (map, components) = label_components(&mask, Connectivity::Eight).unwrap();

        // Row-major scan finds (7,0) first, then (1,1), then (4,2)
        assert_eq!(components.len(), 3);
        assert_eq!(map.label_at(7, 0), 1);
        assert_eq!(map.label_at(1, 1), 2);
        assert_eq!(map.label_at(4, 2), 3);
    }

    #[test]
    fn connectivity_values_are_validated() {
        assert!(Connectivity::from_value(4).is_ok());
        assert!(Connectivity::from_value(8).is_ok());
        assert!(Connectivity::from_value(6).is_err());
    }
}
