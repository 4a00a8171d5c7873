use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{CrackScanError, Result};
use crate::labeling::Connectivity;
use crate::measure::AnalysisParams;

/// Configuration for CrackScanR
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Probability-map PNG, or a directory of them
    pub input_path: String,
    pub output_base_dir: String,

    /// Source photograph (or directory of them, matched by file stem) used
    /// as the base for overlays; the probability map itself is used when
    /// absent
    #[serde(default)]
    pub original_image_path: Option<String>,

    /// Components below this pixel count are dropped from the report
    #[serde(default = "default_min_pixels")]
    pub min_pixels: i64,

    /// Scale factor applied to skeleton pixel counts
    #[serde(default = "default_length_calibration")]
    pub length_calibration: f64,

    /// Foreground adjacency: 4 or 8
    #[serde(default = "default_connectivity")]
    pub connectivity: u32,

    /// 8-bit binarization threshold; 127 corresponds to probability 0.5
    #[serde(default = "default_binarization_threshold")]
    pub binarization_threshold: u32,

    /// Red tint strength of the mask overlay, 0.0 to 1.0
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f32,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,
}

fn default_min_pixels() -> i64 {
    500
}

fn default_length_calibration() -> f64 {
    0.8
}

fn default_connectivity() -> u32 {
    8
}

fn default_binarization_threshold() -> u32 {
    127
}

fn default_overlay_opacity() -> f32 {
    0.5
}

fn default_parallel() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CrackScanError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CrackScanError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            original_image_path: None,
            min_pixels: 500,
            length_calibration: 0.8,
            connectivity: 8,
            binarization_threshold: 127,
            overlay_opacity: 0.5,
            use_parallel: true,
        }
    }

    /// Validate configuration, including the input path
    pub fn validate(&self) -> Result<()> {
        self.validate_values()?;

        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(CrackScanError::InvalidPath(input_path));
        }

        Ok(())
    }

    /// Create the output directory tree
    pub fn prepare_output_dirs(&self) -> Result<()> {
        let base_dir = PathBuf::from(&self.output_base_dir);

        for subdir in ["masks", "overlays", "analysis", "measurements"] {
            fs::create_dir_all(base_dir.join(subdir)).map_err(CrackScanError::Io)?;
        }

        Ok(())
    }

    /// Convert validated configuration into pipeline parameters
    pub fn analysis_params(&self) -> Result<AnalysisParams> {
        self.validate_values()?;

        Ok(AnalysisParams {
            min_pixels: self.min_pixels as u32,
            connectivity: Connectivity::from_value(self.connectivity)?,
            length_calibration: self.length_calibration,
            threshold: self.binarization_threshold as u8,
            parallel: self.use_parallel,
        })
    }

    /// Value checks only, without touching the filesystem
    fn validate_values(&self) -> Result<()> {
        if self.min_pixels < 0 {
            return Err(CrackScanError::Config(
                "min_pixels must be >= 0".to_string(),
            ));
        }

        if self.length_calibration <= 0.0 {
            return Err(CrackScanError::Config(
                "length_calibration must be > 0.0".to_string(),
            ));
        }

        if self.connectivity != 4 && self.connectivity != 8 {
            return Err(CrackScanError::Config(format!(
                "connectivity must be 4 or 8, got {}",
                self.connectivity
            )));
        }

        if self.binarization_threshold > 255 {
            return Err(CrackScanError::Config(format!(
                "binarization_threshold must be in 0..=255, got {}",
                self.binarization_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(CrackScanError::Config(format!(
                "overlay_opacity must be between 0.0 and 1.0, got {}",
                self.overlay_opacity
            )));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CrackScanError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(CrackScanError::Io)?;

        Ok(())
    }
}
