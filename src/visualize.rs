use image::{GrayImage, Rgba, RgbaImage};

use crate::font;
use crate::measure::CrackMeasurement;

/// Vertical spacing between annotation lines, in pixels
const TEXT_LINE_HEIGHT: i32 = 20;
/// Glyph scale for annotation text
const TEXT_SCALE: u32 = 2;

/// Offsets for the black text outline, one per compass direction
const OUTLINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
];

/// splitmix64 finalizer; spreads consecutive indices over the color range
fn mix(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic skeleton color for a measurement index.
///
/// Seeded by the index alone so repeated runs produce identical output:
/// green and red in 128..=255, blue 0.
pub fn crack_color(index: usize) -> Rgba<u8> {
    let bits = mix(index as u64);
    let g = 128 + (bits & 0x7F) as u8;
    let r = 128 + ((bits >> 8) & 0x7F) as u8;
    Rgba([r, g, 0, 255])
}

/// Draw text with a black outline in all eight directions and a white
/// fill, so labels stay readable on arbitrary backgrounds.
fn draw_outlined_text(image: &mut RgbaImage, text: &str, x: i32, y: i32) {
    for &(dx, dy) in &OUTLINE_OFFSETS {
        font::draw_text(image, text, x + dx, y + dy, TEXT_SCALE, Rgba([0, 0, 0, 255]));
    }
    font::draw_text(image, text, x, y, TEXT_SCALE, Rgba([255, 255, 255, 255]));
}

/// Composite skeletons and measurement annotations onto a copy of the
/// original image.
///
/// Each crack gets its deterministic color painted over every skeleton
/// pixel at full opacity, plus four annotation lines (index, width,
/// length, area) anchored at the centroid.
pub fn visualize_analysis(original: &RgbaImage, measurements: &[CrackMeasurement]) -> RgbaImage {
    let mut result = original.clone();
    let (width, height) = result.dimensions();

    for (index, crack) in measurements.iter().enumerate() {
        let color = crack_color(index);

        for (x, y) in crack.skeleton.iter_points() {
            if x < width && y < height {
                result.put_pixel(x, y, color);
            }
        }

        let text_x = crack.center_x.round() as i32;
        let text_y = crack.center_y.round() as i32;

        draw_outlined_text(&mut result, &format!("Crack {}", index + 1), text_x, text_y);
        draw_outlined_text(
            &mut result,
            &format!("W:{:.1}px", crack.width),
            text_x,
            text_y + TEXT_LINE_HEIGHT,
        );
        draw_outlined_text(
            &mut result,
            &format!("L:{:.1}px", crack.length),
            text_x,
            text_y + TEXT_LINE_HEIGHT * 2,
        );
        draw_outlined_text(
            &mut result,
            &format!("A:{}px", crack.area),
            text_x,
            text_y + TEXT_LINE_HEIGHT * 3,
        );
    }

    result
}

/// Blend a red tint over the masked region of the original image.
///
/// Foreground mask pixels get `opacity * 255` added to their red channel,
/// saturating; everything else is untouched.
pub fn create_mask_overlay(original: &RgbaImage, mask: &GrayImage, opacity: f32) -> RgbaImage {
    let mut result = original.clone();
    let width = original.width().min(mask.width());
    let height = original.height().min(mask.height());
    let tint = (opacity.clamp(0.0, 1.0) * 255.0) as u8;

    for y in 0..height {
        for x in 0..width {
            if mask.get_pixel(x, y)[0] > 127 {
                let pixel = result.get_pixel(x, y);
                let blended = Rgba([
                    pixel[0].saturating_add(tint),
                    pixel[1],
                    pixel[2],
                    pixel[3],
                ]);
                result.put_pixel(x, y, blended);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{analyze_mask, AnalysisParams};
    use image::Luma;

    fn sample_measurements() -> Vec<CrackMeasurement> {
        let mut mask = GrayImage::new(40, 40);
        for y in 5..30 {
            for x in 10..14 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let params = AnalysisParams {
            min_pixels: 0,
            parallel: false,
            ..AnalysisParams::default()
        };
        analyze_mask(&mask, &params).unwrap()
    }

    #[test]
    fn colors_are_deterministic_and_in_range() {
        for index in 0..32 {
            let a = crack_color(index);
            let b = crack_color(index);
            assert_eq!(a, b);
            assert!(a[0] >= 128);
            assert!(a[1] >= 128);
            assert_eq!(a[2], 0);
            assert_eq!(a[3], 255);
        }
        assert_ne!(crack_color(0), crack_color(1));
    }

    #[test]
    fn visualization_is_pixel_identical_across_calls() {
        let measurements = sample_measurements();
        let original = RgbaImage::from_pixel(40, 40, Rgba([30, 30, 30, 255]));

        let first = visualize_analysis(&original, &measurements);
        let second = visualize_analysis(&original, &measurements);

        assert_eq!(first.as_raw(), second.as_raw());
        // The original is untouched
        assert!(original.pixels().all(|p| *p == Rgba([30, 30, 30, 255])));
    }

    #[test]
    fn skeleton_pixels_take_the_crack_color() {
        let measurements = sample_measurements();
        let original = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        let result = visualize_analysis(&original, &measurements);

        let color = crack_color(0);
        let (x, y) = measurements[0].skeleton.iter_points().next().unwrap();
        assert_eq!(*result.get_pixel(x, y), color);
    }

    #[test]
    fn overlay_tints_only_masked_pixels() {
        let original = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(3, 3, Luma([255]));

        let overlay = create_mask_overlay(&original, &mask, 0.5);

        assert_eq!(*overlay.get_pixel(3, 3), Rgba([10 + 127, 20, 30, 255]));
        assert_eq!(*overlay.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }
}
