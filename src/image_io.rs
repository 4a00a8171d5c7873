use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, RgbaImage};

use crate::errors::{CrackScanError, Result};

/// A probability-map input with its metadata
pub struct InputImage {
    /// Crack probability per pixel, 8-bit grayscale
    pub probability: GrayImage,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all PNG files from a directory (recursively)
pub fn get_png_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(CrackScanError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(CrackScanError::Config(format!(
            "{} is not a directory",
            dir_path.display()
        )));
    }

    let mut png_files = Vec::new();
    find_png_files_recursive(dir_path, &mut png_files)?;
    png_files.sort();

    Ok(png_files)
}

/// Helper function to recursively search for PNG files
fn find_png_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir_path).map_err(CrackScanError::Io)?;

    for entry in entries {
        let entry = entry.map_err(CrackScanError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            find_png_files_recursive(&path, result)?;
        } else if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.to_ascii_lowercase() == "png" {
                    result.push(path);
                }
            }
        }
    }

    Ok(())
}

/// Load a probability-map image, converting to 8-bit grayscale
pub fn load_probability_map<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CrackScanError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let img = image::open(path).map_err(CrackScanError::Image)?;

    Ok(InputImage {
        probability: img.to_luma8(),
        path: path.to_path_buf(),
        filename,
    })
}

/// Load a source image for overlays, converting to RGBA
pub fn load_original_image<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let img = image::open(path.as_ref()).map_err(CrackScanError::Image)?;
    Ok(img.to_rgba8())
}

/// Save a grayscale image as PNG
pub fn save_gray_image<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(CrackScanError::Image)?;

    Ok(())
}

/// Save an RGBA image as PNG
pub fn save_rgba_image<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(CrackScanError::Image)?;

    Ok(())
}

/// Render a grayscale probability map as RGBA, for use as the overlay
/// base when no source photograph is available
pub fn gray_to_rgba(gray: &GrayImage) -> RgbaImage {
    let (width, height) = gray.dimensions();
    let mut rgba = RgbaImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let v = gray.get_pixel(x, y)[0];
            rgba.put_pixel(x, y, image::Rgba([v, v, v, 255]));
        }
    }

    rgba
}
