use tracing::debug;

use crate::consts::MASK_CROP_SIZE_THRESHOLD;
use crate::normalization::NormalizationScheme;

/// Decide per channel whether normalization statistics should come from the
/// nonzero mask only.
///
/// Only schemes that zero voxels outside the mask qualify, and only when
/// cropping to the nonzero region removed a substantial part of the image
/// (median relative size below `MASK_CROP_SIZE_THRESHOLD`).
pub fn determine_use_mask_for_norm(
    schemes: &[NormalizationScheme],
    median_relative_size_after_cropping: f64,
) -> Vec<bool> {
    let cropping_shrank = median_relative_size_after_cropping < MASK_CROP_SIZE_THRESHOLD;
    let decisions: Vec<bool> = schemes
        .iter()
        .map(|scheme| cropping_shrank && scheme.zeroes_outside_mask())
        .collect();
    debug!(
        relative_size = median_relative_size_after_cropping,
        ?decisions,
        "Mask usage for normalization"
    );
    decisions
}
