use image::GrayImage;
use rayon::prelude::*;
use serde::Serialize;

use crate::binarize;
use crate::distance::build_distance_field;
use crate::errors::Result;
use crate::labeling::{label_components, Connectivity, LabelMap, LabeledComponent};
use crate::probability::ProbabilityField;
use crate::skeleton::{extract_skeleton, SkeletonMask};

/// Parameters controlling the segmentation-to-measurement pipeline
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    /// Components below this pixel count are dropped without a record
    pub min_pixels: u32,
    /// Foreground adjacency rule for component labeling
    pub connectivity: Connectivity,
    /// Scale factor applied to the skeleton pixel count, compensating for
    /// staircase undercounting of diagonal runs
    pub length_calibration: f64,
    /// 8-bit binarization threshold; 127 corresponds to probability 0.5
    pub threshold: u8,
    /// Run the per-component measurements through rayon
    pub parallel: bool,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            min_pixels: 500,
            connectivity: Connectivity::Eight,
            length_calibration: 0.8,
            threshold: binarize::DEFAULT_THRESHOLD,
            parallel: true,
        }
    }
}

/// One quantified crack: geometry reduced from a labeled component's
/// distance field and skeleton. Read-only once created.
#[derive(Debug, Clone, Serialize)]
pub struct CrackMeasurement {
    /// Twice the largest interior distance: thickness at the widest point
    pub width: f64,
    /// Calibrated skeleton pixel count
    pub length: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Medial-axis pixels, kept for visualization
    #[serde(skip)]
    pub skeleton: SkeletonMask,
    /// Pixel count of the source component
    pub area: u32,
}

/// Reduce one labeled component to its measurement record.
///
/// A degenerate distance field (maximum 0) yields width 0 rather than an
/// error.
pub fn measure_component(
    labels: &LabelMap,
    component: &LabeledComponent,
    length_calibration: f64,
) -> CrackMeasurement {
    let field = build_distance_field(labels, component);
    let skeleton = extract_skeleton(&field, labels, component);

    let width = 2.0 * field.max_value() as f64;
    let length = skeleton.count() as f64 * length_calibration;

    CrackMeasurement {
        width,
        length,
        center_x: component.centroid.0,
        center_y: component.centroid.1,
        skeleton,
        area: component.area,
    }
}

/// Analyze an already-binarized mask: label connected components, drop the
/// ones below `min_pixels`, and measure the survivors.
///
/// Components are independent once labeling has finished, so the
/// per-component work fans out over rayon when requested. Measurement
/// order follows label order either way.
pub fn analyze_mask(mask: &GrayImage, params: &AnalysisParams) -> Result<Vec<CrackMeasurement>> {
    let (labels, components) = label_components(mask, params.connectivity)?;

    let survivors: Vec<&LabeledComponent> = components
        .iter()
        .filter(|c| c.area >= params.min_pixels)
        .collect();

    let measurements = if params.parallel {
        survivors
            .into_par_iter()
            .map(|c| measure_component(&labels, c, params.length_calibration))
            .collect()
    } else {
        survivors
            .into_iter()
            .map(|c| measure_component(&labels, c, params.length_calibration))
            .collect()
    };

    Ok(measurements)
}

/// Core entry point: from a probability field to the measurement list.
///
/// Binarizes the crack-class channel, then runs the component analysis.
/// Returns an empty list when nothing survives filtering.
pub fn analyze(field: &ProbabilityField, params: &AnalysisParams) -> Result<Vec<CrackMeasurement>> {
    let mask = binarize::binarize(
        field.foreground_channel(),
        field.width() as u32,
        field.height() as u32,
        params.threshold,
    )?;

    analyze_mask(&mask, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::Luma;

    fn filled_rect(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }

    fn unfiltered() -> AnalysisParams {
        AnalysisParams {
            min_pixels: 0,
            parallel: false,
            ..AnalysisParams::default()
        }
    }

    #[test]
    fn rectangle_measurements_match_geometry() {
        // 5 wide, 21 tall
        let mask = filled_rect(15, 30, 4, 3, 5, 21);
        let measurements = analyze_mask(&mask, &unfiltered()).unwrap();

        assert_eq!(measurements.len(), 1);
        let m = &measurements[0];

        assert_eq!(m.area, 105);
        assert_approx_eq!(m.center_x, 6.0);
        assert_approx_eq!(m.center_y, 13.0);

        // Width within distance-transform discretization error
        assert!((m.width - 5.0).abs() <= 2.0, "width {} too far from 5", m.width);

        // Skeleton runs the long axis: (h - w) pixels give or take the caps
        let expected_length = (21.0 - 5.0) * 0.8;
        assert!(
            (m.length - expected_length).abs() <= 2.0 * 0.8,
            "length {} too far from {}",
            m.length,
            expected_length
        );
    }

    #[test]
    fn min_pixels_filters_exactly_the_undersized() {
        let mut mask = filled_rect(40, 20, 2, 2, 10, 10); // area 100
        for y in 5..8 {
            for x in 20..25 {
                mask.put_pixel(x, y, Luma([255])); // area 15
            }
        }

        let mut params = unfiltered();
        let all = analyze_mask(&mask, &params).unwrap();
        assert_eq!(all.len(), 2);

        params.min_pixels = 16;
        let filtered = analyze_mask(&mask, &params).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].area, 100);

        params.min_pixels = 101;
        let none = analyze_mask(&mask, &params).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn empty_mask_yields_empty_list() {
        let mask = GrayImage::new(16, 16);
        let measurements = analyze_mask(&mask, &unfiltered()).unwrap();
        assert!(measurements.is_empty());
    }

    #[test]
    fn single_pixel_component_is_measured_not_rejected() {
        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(3, 3, Luma([255]));

        let measurements = analyze_mask(&mask, &unfiltered()).unwrap();
        assert_eq!(measurements.len(), 1);
        let m = &measurements[0];

        // One skeleton pixel at distance 1 from the implicit background
        assert_approx_eq!(m.width, 2.0);
        assert_approx_eq!(m.length, 0.8);
        assert_eq!(m.area, 1);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let mut mask = filled_rect(60, 40, 2, 2, 7, 25);
        for y in 10..30 {
            for x in 30..39 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let sequential = analyze_mask(&mask, &unfiltered()).unwrap();
        let parallel = analyze_mask(
            &mask,
            &AnalysisParams {
                min_pixels: 0,
                parallel: true,
                ..AnalysisParams::default()
            },
        )
        .unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(parallel.iter()) {
            assert_approx_eq!(s.width, p.width);
            assert_approx_eq!(s.length, p.length);
            assert_eq!(s.area, p.area);
        }
    }

    #[test]
    fn analyze_runs_from_probabilities() {
        // A 3x12 bar of high probability in a low-probability field
        let width = 20usize;
        let height = 20usize;
        let mut values = vec![0.1f32; width * height];
        for y in 4..16 {
            for x in 8..11 {
                values[y * width + x] = 0.9;
            }
        }

        let field = ProbabilityField::from_single_channel(&values, width, height).unwrap();
        let measurements = analyze(&field, &unfiltered()).unwrap();

        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].area, 36);
    }
}
