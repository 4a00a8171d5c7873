use crate::errors::{CrackScanError, Result};

/// Per-pixel class probabilities in channel-major [C, H, W] layout.
///
/// Built once per inference result from the raw model logits; immutable
/// afterwards. Each pixel's channel values sum to 1 after normalization.
pub struct ProbabilityField {
    channels: usize,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ProbabilityField {
    /// Build a probability field from raw multi-channel logits via softmax.
    ///
    /// The per-pixel maximum logit is subtracted before exponentiating to
    /// keep the exponentials finite for large logit magnitudes.
    pub fn from_logits(
        logits: &[f32],
        channels: usize,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        validate_dimensions(logits.len(), channels, width, height)?;

        if channels == 1 {
            return Self::from_single_channel(logits, width, height);
        }

        let plane = width * height;
        let mut data = vec![0.0f32; logits.len()];

        for y in 0..height {
            for x in 0..width {
                let pixel = y * width + x;

                // Max logit for numerical stability
                let mut max_val = f32::MIN;
                for c in 0..channels {
                    let val = logits[c * plane + pixel];
                    if val > max_val {
                        max_val = val;
                    }
                }

                // Sum of exponentials
                let mut sum_exp = 0.0f32;
                for c in 0..channels {
                    let idx = c * plane + pixel;
                    let exp_val = (logits[idx] - max_val).exp();
                    data[idx] = exp_val;
                    sum_exp += exp_val;
                }

                // Normalize to probabilities
                for c in 0..channels {
                    data[c * plane + pixel] /= sum_exp;
                }
            }
        }

        Ok(Self {
            channels,
            width,
            height,
            data,
        })
    }

    /// Build a single-channel field from values that are already probabilities.
    ///
    /// The softmax is bypassed; values are clamped to [0, 1].
    pub fn from_single_channel(values: &[f32], width: usize, height: usize) -> Result<Self> {
        validate_dimensions(values.len(), 1, width, height)?;

        let data = values.iter().map(|v| v.clamp(0.0, 1.0)).collect();

        Ok(Self {
            channels: 1,
            width,
            height,
            data,
        })
    }

    /// Number of class channels
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Field width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Probability values of one channel as a [H, W] row-major slice
    pub fn channel(&self, c: usize) -> &[f32] {
        let plane = self.width * self.height;
        &self.data[c * plane..(c + 1) * plane]
    }

    /// The crack-class channel: channel 1 for multi-channel fields
    /// (channel 0 is background), channel 0 for single-channel fields.
    pub fn foreground_channel(&self) -> &[f32] {
        let c = if self.channels > 1 { 1 } else { 0 };
        self.channel(c)
    }
}

fn validate_dimensions(len: usize, channels: usize, width: usize, height: usize) -> Result<()> {
    if channels < 1 {
        return Err(CrackScanError::InvalidInput(
            "probability field needs at least one channel".to_string(),
        ));
    }

    if width == 0 || height == 0 {
        return Err(CrackScanError::InvalidInput(format!(
            "probability field dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    let expected = channels * width * height;
    if len != expected {
        return Err(CrackScanError::InvalidInput(format!(
            "expected {} values for {} channels of {}x{}, got {}",
            expected, channels, width, height, len
        )));
    }

    Ok(())
}
