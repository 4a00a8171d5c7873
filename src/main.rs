mod binarize;
mod config;
mod distance;
mod errors;
mod font;
mod image_io;
mod labeling;
mod measure;
mod output;
mod pipeline;
mod probability;
mod skeleton;
mod visualize;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rayon::prelude::*;

use config::Config;
use errors::{CrackScanError, Result};
use image_io::get_png_files_in_dir;
use pipeline::process_file;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "CrackScanR - Crack Segmentation Measurement")]
struct Args {
    /// Path to a probability-map PNG or a directory of them
    #[clap(short, long)]
    input: Option<String>,

    /// Path to the source image (or directory) used for overlays
    #[clap(long)]
    original: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Minimum component size in pixels (overwrites config)
    #[clap(short, long)]
    min_pixels: Option<i64>,

    /// Enable debug mode (print per-image analysis details)
    #[clap(short, long)]
    debug: bool,
}

/// Main function
fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_file(&args.config)?;

    // Override config with command-line arguments
    if let Some(input) = args.input {
        config.input_path = input;
    }

    if let Some(original) = args.original {
        config.original_image_path = Some(original);
    }

    if let Some(output) = args.output {
        config.output_base_dir = output;
    }

    if let Some(min_pixels) = args.min_pixels {
        config.min_pixels = min_pixels;
    }

    // Validate configuration and create the output tree
    config.validate()?;
    config.prepare_output_dirs()?;

    // Start timing
    let start_time = Instant::now();

    // Process input
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        println!("Processing single file: {}", input_path.display());
        process_file(&input_path, &config, args.debug)?;
    } else if input_path.is_dir() {
        println!("Processing directory: {}", input_path.display());
        let png_files = get_png_files_in_dir(&input_path)?;

        println!("Found {} PNG files", png_files.len());

        if config.use_parallel {
            // Process files in parallel
            png_files
                .par_iter()
                .map(|path| {
                    println!("Processing: {}", path.display());
                    process_file(path, &config, args.debug).map_err(|e| {
                        eprintln!("Error processing {}: {}", path.display(), e);
                        e
                    })
                })
                .collect::<Vec<_>>();
        } else {
            // Process files sequentially
            for path in &png_files {
                println!("Processing: {}", path.display());
                process_file(path, &config, args.debug)?;
            }
        }
    } else {
        return Err(CrackScanError::InvalidPath(input_path));
    }

    // Report elapsed time
    let elapsed = start_time.elapsed();
    println!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
