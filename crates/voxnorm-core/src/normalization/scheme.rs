use std::fmt;
use std::sync::Arc;

use crate::error::{NormError, Result};

/// Hounsfield-unit clipping window applied before z-scoring with the
/// channel's global foreground statistics.
///
/// `lower < upper` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CtWindow {
    lower: i64,
    upper: i64,
}

impl CtWindow {
    /// Soft-tissue window, -15..115 HU.
    pub const NEG15_TO_115: CtWindow = CtWindow {
        lower: -15,
        upper: 115,
    };

    /// Wide abdominal window, -100..200 HU.
    pub const NEG100_TO_200: CtWindow = CtWindow {
        lower: -100,
        upper: 200,
    };

    pub fn new(lower: i64, upper: i64) -> Result<Self> {
        if lower >= upper {
            return Err(NormError::InvalidCtWindow { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    /// Canonical name, e.g. `CTWindowNeg15To115Normalization`.
    ///
    /// Negative bounds are written as `Neg` followed by the magnitude.
    pub fn canonical_name(&self) -> String {
        format!(
            "CTWindow{}To{}Normalization",
            signed_part(self.lower),
            signed_part(self.upper)
        )
    }
}

fn signed_part(bound: i64) -> String {
    if bound < 0 {
        format!("Neg{}", bound.unsigned_abs())
    } else {
        bound.to_string()
    }
}

/// Intensity normalization scheme selected for one channel.
///
/// Windows are shared through `Arc` so a registry can hand out the same
/// instance for every resolution of the same bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NormalizationScheme {
    /// Clip to the 0.5/99.5 foreground percentiles, then z-score with global stats.
    Ct,
    /// Cast only.
    NoNorm,
    /// Per-image z-score, optionally restricted to the segmentation mask.
    #[default]
    ZScore,
    /// Shift the minimum to 0 and divide by the resulting maximum.
    RescaleTo01,
    /// Divide 8-bit RGB intensities by 255.
    RgbTo01,
    /// Clip to a fixed HU window, then z-score with global stats.
    CtWindow(Arc<CtWindow>),
}

impl NormalizationScheme {
    pub fn ct_window(window: CtWindow) -> Self {
        Self::CtWindow(Arc::new(window))
    }

    /// Whether voxels outside the mask are left at zero when the scheme is
    /// run with `use_mask_for_norm`.
    pub fn zeroes_outside_mask(&self) -> bool {
        matches!(self, Self::ZScore)
    }

    /// Whether the scheme reads dataset-wide intensity statistics.
    pub fn requires_intensity_properties(&self) -> bool {
        matches!(self, Self::Ct | Self::CtWindow(_))
    }

    pub fn name(&self) -> String {
        match self {
            Self::Ct => "CTNormalization".into(),
            Self::NoNorm => "NoNormalization".into(),
            Self::ZScore => "ZScoreNormalization".into(),
            Self::RescaleTo01 => "RescaleTo01Normalization".into(),
            Self::RgbTo01 => "RGBTo01Normalization".into(),
            Self::CtWindow(w) => w.canonical_name(),
        }
    }
}

impl fmt::Display for NormalizationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CtWindow(w) => write!(f, "CT window [{}, {}]", w.lower, w.upper),
            Self::Ct => write!(f, "CT"),
            Self::NoNorm => write!(f, "No normalization"),
            Self::ZScore => write!(f, "Z-score"),
            Self::RescaleTo01 => write!(f, "Rescale to [0, 1]"),
            Self::RgbTo01 => write!(f, "RGB to [0, 1]"),
        }
    }
}
