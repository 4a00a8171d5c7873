use image::{GrayImage, Luma};

use crate::errors::{CrackScanError, Result};

/// Mask value for crack pixels
pub const FOREGROUND: u8 = 255;
/// Mask value for background pixels
pub const BACKGROUND: u8 = 0;

/// Default binarization threshold, equivalent to a probability of 0.5
/// after scaling to the 8-bit range.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Scale a [0, 1] probability channel to an 8-bit grayscale image
pub fn scale_to_gray(values: &[f32], width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(CrackScanError::InvalidInput(format!(
            "mask dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    if values.len() != (width * height) as usize {
        return Err(CrackScanError::InvalidInput(format!(
            "expected {} probability values for {}x{}, got {}",
            width * height,
            width,
            height,
            values.len()
        )));
    }

    let mut gray = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let value = values[(y * width + x) as usize].clamp(0.0, 1.0);
            gray.put_pixel(x, y, Luma([(value * 255.0) as u8]));
        }
    }

    Ok(gray)
}

/// Threshold a grayscale mask into a decisive 0/255 binary mask.
///
/// A pixel becomes foreground when its value is strictly greater than the
/// threshold, so re-thresholding an already-binary mask is a no-op.
pub fn threshold_mask(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut mask = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let value = gray.get_pixel(x, y)[0];
            let out = if value > threshold { FOREGROUND } else { BACKGROUND };
            mask.put_pixel(x, y, Luma([out]));
        }
    }

    mask
}

/// 3x3 square structuring element offsets (includes the center)
const KERNEL_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Morphological erosion with a 3x3 square kernel.
///
/// Out-of-bounds neighbors count as background, so foreground touching the
/// image border erodes.
fn erode(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut result = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut keep = mask.get_pixel(x, y)[0] == FOREGROUND;

            if keep {
                'kernel_check: for &(dx, dy) in &KERNEL_OFFSETS {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;

                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        keep = false;
                        break 'kernel_check;
                    }

                    if mask.get_pixel(nx as u32, ny as u32)[0] != FOREGROUND {
                        keep = false;
                        break 'kernel_check;
                    }
                }
            }

            result.put_pixel(x, y, Luma([if keep { FOREGROUND } else { BACKGROUND }]));
        }
    }

    result
}

/// Morphological dilation with a 3x3 square kernel
fn dilate(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut result = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut grow = false;

            'kernel_check: for &(dx, dy) in &KERNEL_OFFSETS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;

                if nx >= 0 && ny >= 0 && nx < width as i32 && ny < height as i32 {
                    if mask.get_pixel(nx as u32, ny as u32)[0] == FOREGROUND {
                        grow = true;
                        break 'kernel_check;
                    }
                }
            }

            result.put_pixel(x, y, Luma([if grow { FOREGROUND } else { BACKGROUND }]));
        }
    }

    result
}

/// Morphological cleanup of a binary mask: opening (erosion then dilation)
/// to remove isolated noise pixels, then closing (dilation then erosion)
/// to bridge small gaps between nearby segments.
pub fn clean_mask(mask: &GrayImage) -> GrayImage {
    let opened = dilate(&erode(mask));
    erode(&dilate(&opened))
}

/// Full binarization step: scale the probability channel to 8-bit,
/// threshold it, and apply the morphological cleanup.
pub fn binarize(values: &[f32], width: u32, height: u32, threshold: u8) -> Result<GrayImage> {
    let gray = scale_to_gray(values, width, height)?;
    let mask = threshold_mask(&gray, threshold);
    Ok(clean_mask(&mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_points(width: u32, height: u32, points: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in points {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
        mask
    }

    #[test]
    fn thresholding_is_idempotent_on_binary_masks() {
        let mask = mask_from_points(4, 4, &[(1, 1), (2, 2), (3, 0)]);
        let once = threshold_mask(&mask, DEFAULT_THRESHOLD);
        let twice = threshold_mask(&once, DEFAULT_THRESHOLD);

        assert_eq!(once.as_raw(), mask.as_raw());
        assert_eq!(twice.as_raw(), once.as_raw());
    }

    #[test]
    fn threshold_splits_around_midpoint() {
        let mut gray = GrayImage::new(3, 1);
        gray.put_pixel(0, 0, Luma([127]));
        gray.put_pixel(1, 0, Luma([128]));
        gray.put_pixel(2, 0, Luma([0]));

        let mask = threshold_mask(&gray, DEFAULT_THRESHOLD);
        assert_eq!(mask.get_pixel(0, 0)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(1, 0)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 0)[0], BACKGROUND);
    }

    #[test]
    fn opening_removes_isolated_pixels() {
        let mask = mask_from_points(7, 7, &[(3, 3)]);
        let cleaned = clean_mask(&mask);

        assert!(cleaned.as_raw().iter().all(|&v| v == BACKGROUND));
    }

    #[test]
    fn closing_bridges_single_pixel_gaps() {
        // Two 3x3 blocks separated by one background column
        let mut points = Vec::new();
        for y in 2..5 {
            for x in 2..5 {
                points.push((x, y));
            }
            for x in 6..9 {
                points.push((x, y));
            }
        }
        let mask = mask_from_points(11, 7, &points);
        let cleaned = clean_mask(&mask);

        // The gap column survives cleanup connected to both blocks
        assert_eq!(cleaned.get_pixel(5, 3)[0], FOREGROUND);
        assert_eq!(cleaned.get_pixel(4, 3)[0], FOREGROUND);
        assert_eq!(cleaned.get_pixel(6, 3)[0], FOREGROUND);
    }

    #[test]
    fn zero_sized_input_is_rejected() {
        assert!(scale_to_gray(&[], 0, 5).is_err());
        assert!(scale_to_gray(&[], 5, 0).is_err());
    }
}
