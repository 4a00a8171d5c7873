use crate::distance::DistanceField;
use crate::labeling::{LabelMap, LabeledComponent};

/// Medial-axis pixels of one component, stored over its bounding box.
///
/// Keeps the bounding-box origin so skeleton pixels can be mapped back
/// into full-mask coordinates for visualization.
#[derive(Debug, Clone)]
pub struct SkeletonMask {
    x0: u32,
    y0: u32,
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl SkeletonMask {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether bounding-box-local (x, y) is a skeleton pixel
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Number of skeleton pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Skeleton pixels in full-mask coordinates
    pub fn iter_points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width;
        let x0 = self.x0;
        let y0 = self.y0;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &set)| set)
            .map(move |(idx, _)| {
                let x = (idx % width) as u32;
                let y = (idx / width) as u32;
                (x0 + x, y0 + y)
            })
    }
}

/// Extract the medial-axis pixel set of one component from its distance
/// field.
///
/// A pixel is kept when its distance value is >= every value in its 3x3
/// neighborhood (neighbors outside the field count as 0) and it belongs to
/// the component. Plateaus of equal maxima are all retained, so the result
/// is not thinned to a single-pixel-wide curve.
pub fn extract_skeleton(
    field: &DistanceField,
    labels: &LabelMap,
    component: &LabeledComponent,
) -> SkeletonMask {
    let width = field.width();
    let height = field.height();
    let mut data = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            let center = field.get(x, y);

            // Maximum of the 3x3 neighborhood, dilation-compare style
            let mut neighborhood_max = 0.0f32;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    neighborhood_max = neighborhood_max.max(field.get(nx as usize, ny as usize));
                }
            }

            if center < neighborhood_max {
                continue;
            }

            // Restrict candidates to the component's own pixels; a local
            // maximum outside the component would be a boundary artifact
            let mask_x = component.bbox.x0 + x as u32;
            let mask_y = component.bbox.y0 + y as u32;
            if labels.label_at(mask_x, mask_y) == component.label {
                data[y * width + x] = true;
            }
        }
    }

    SkeletonMask {
        x0: component.bbox.x0,
        y0: component.bbox.y0,
        width,
        height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binarize::FOREGROUND;
    use crate::distance::build_distance_field;
    use crate::labeling::{label_components, Connectivity};
    use image::{GrayImage, Luma};

    fn skeleton_for_mask(mask: &GrayImage) -> SkeletonMask {
        let (map, components) = label_components(mask, Connectivity::Eight).unwrap();
        assert_eq!(components.len(), 1);
        let field = build_distance_field(&map, &components[0]);
        extract_skeleton(&field, &map, &components[0])
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
    fn rectangle_skeleton_follows_the_long_axis() {
        // 5 wide, 11 tall: the medial axis is the center column clipped
        // where the end caps take over
        let mask = filled_rect(9, 15, 2, 2, 5, 11);
        let skeleton = skeleton_for_mask(&mask);

        let points: Vec<(u32, u32)> = skeleton.iter_points().collect();
        assert!(points.iter().all(|&(x, _)| x == 4));
        let expected = 11 - 5 + 1;
        assert_eq!(skeleton.count(), expected);
    }

    #[test]
    fn thin_crack_is_entirely_skeleton() {
        // One-pixel-wide crack: every pixel is a plateau maximum
        let mut mask = GrayImage::new(10, 10);
        for y in 1..9 {
            mask.put_pixel(4, y, Luma([FOREGROUND]));
        }
        let skeleton = skeleton_for_mask(&mask);

        assert_eq!(skeleton.count(), 8);
    }

    #[test]
    fn even_width_plateau_is_retained() {
        // 2-wide bar: both columns hold the same maximum and both stay
        let mask = filled_rect(10, 12, 4, 2, 2, 8);
        let skeleton = skeleton_for_mask(&mask);

        let points: Vec<(u32, u32)> = skeleton.iter_points().collect();
        assert!(points.iter().any(|&(x, _)| x == 4));
        assert!(points.iter().any(|&(x, _)| x == 5));
    }

    #[test]
    fn single_pixel_component_is_its_own_skeleton() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(2, 2, Luma([FOREGROUND]));
        let skeleton = skeleton_for_mask(&mask);

        assert_eq!(skeleton.count(), 1);
        assert_eq!(skeleton.iter_points().next(), Some((2, 2)));
    }
}
