/// Lower bound on the divisor when dividing by a standard deviation or a maximum.
pub const STD_EPSILON: f64 = 1e-8;

/// Largest intensity of an 8-bit RGB channel.
pub const RGB_MAX: f64 = 255.0;

/// Minimum voxel count per channel to normalize channels with Rayon.
pub const PARALLEL_VOXEL_THRESHOLD: usize = 65_536;

/// Cropping to the nonzero region must shrink the median image below this
/// fraction of its original size before mask-based normalization is used.
pub const MASK_CROP_SIZE_THRESHOLD: f64 = 0.75;

/// Channel-name prefix that selects a custom CT window, e.g. `ct_to_-100_200`.
pub const CT_WINDOW_PREFIX: &str = "ct_to_";
