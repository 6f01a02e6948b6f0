use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormError {
    #[error("{scheme} requires intensity properties")]
    MissingIntensityProperties { scheme: String },

    #[error("{scheme} requires percentile_00_5 and percentile_99_5 in its intensity properties")]
    MissingPercentiles { scheme: String },

    #[error("{scheme} is configured to use the mask for normalization but no segmentation was given")]
    MissingSegmentation { scheme: String },

    #[error("Invalid CT window: lower bound ({lower}) greater than or equal to upper bound ({upper})")]
    InvalidCtWindow { lower: i64, upper: i64 },

    #[error("Invalid CT window bound: {0}")]
    InvalidCtWindowBound(String),

    #[error("{scheme} expects intensities in [0, 255], found [{min}, {max}]")]
    InvalidIntensityRange { scheme: String, min: f64, max: f64 },

    #[error("Segmentation shape {actual:?} does not match image shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Plan has {expected} channels but the image has {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
}

impl NormError {
    /// Preconditions the caller failed to configure (missing statistics or mask).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingIntensityProperties { .. }
                | Self::MissingPercentiles { .. }
                | Self::MissingSegmentation { .. }
        )
    }

    /// Malformed user input in a channel name.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCtWindow { .. } | Self::InvalidCtWindowBound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NormError>;
