use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::binarize::{clean_mask, threshold_mask};
use crate::config::Config;
use crate::errors::Result;
use crate::image_io::{
    gray_to_rgba, load_original_image, save_gray_image, save_rgba_image, InputImage,
};
use crate::measure::analyze_mask;
use crate::output::{print_measurements, write_measurements_csv, write_measurements_json};
use crate::visualize::{create_mask_overlay, visualize_analysis};

/// Find the overlay base image matching a probability-map input.
///
/// `original_image_path` may point at a single image or at a directory
/// searched for a file with the same stem. Falls back to the probability
/// map itself rendered as RGBA.
fn resolve_original_image(input: &InputImage, config: &Config) -> Result<RgbaImage> {
    if let Some(ref original) = config.original_image_path {
        let original = PathBuf::from(original);

        if original.is_file() {
            return load_original_image(&original);
        }

        if original.is_dir() {
            for ext in ["png", "jpg", "jpeg"] {
                let candidate = original.join(format!("{}.{}", input.filename, ext));
                if candidate.is_file() {
                    return load_original_image(&candidate);
                }
            }
            eprintln!(
                "Warning: no original image for '{}' in {}, using the probability map",
                input.filename,
                original.display()
            );
        }
    }

    Ok(gray_to_rgba(&input.probability))
}

/// Process a single probability map: binarize, measure, visualize, and
/// write all artifacts under the configured output directory.
pub fn process_image(input: InputImage, config: &Config, debug: bool) -> Result<()> {
    let params = config.analysis_params()?;
    let output_base = PathBuf::from(&config.output_base_dir);
    let filename = input.filename.clone();

    // Step 1: raw probability mask, kept as-is for inspection
    save_gray_image(
        &input.probability,
        output_base.join("masks").join(format!("{}_raw.png", filename)),
    )?;

    // Step 2: threshold and clean up
    let thresholded = threshold_mask(&input.probability, params.threshold);
    let cleaned = clean_mask(&thresholded);
    save_gray_image(
        &cleaned,
        output_base
            .join("masks")
            .join(format!("{}_cleaned.png", filename)),
    )?;

    // Step 3: label and measure the surviving components
    let measurements = analyze_mask(&cleaned, &params)?;
    print_measurements(&measurements);

    if debug {
        println!(
            "{}: {} crack(s) above {} px (threshold {}, connectivity {})",
            filename,
            measurements.len(),
            config.min_pixels,
            params.threshold,
            config.connectivity
        );
    }

    // Step 4: overlay and annotated analysis image
    let original = resolve_original_image(&input, config)?;

    let overlay = create_mask_overlay(&original, &cleaned, config.overlay_opacity);
    save_rgba_image(
        &overlay,
        output_base
            .join("overlays")
            .join(format!("{}_overlay.png", filename)),
    )?;

    let analysis = visualize_analysis(&original, &measurements);
    save_rgba_image(
        &analysis,
        output_base
            .join("analysis")
            .join(format!("{}_analysis.png", filename)),
    )?;

    // Step 5: measurement records
    write_measurements_csv(&measurements, &output_base, &filename)?;
    write_measurements_json(&measurements, &output_base, &filename)?;

    Ok(())
}

/// Load one probability map and run the full pipeline on it
pub fn process_file(path: &Path, config: &Config, debug: bool) -> Result<()> {
    let input = crate::image_io::load_probability_map(path)?;
    process_image(input, config, debug)
}
