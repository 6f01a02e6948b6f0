use std::path::Path;

use anyhow::{Context, Result};
use voxnorm_core::normalization::{ImageNormalizer, NormalizationScheme};
use voxnorm_core::plan::{ChannelNormalizers, NormalizationPlan};

/// Read and parse a TOML normalization plan.
pub fn load_plan(path: &Path) -> Result<NormalizationPlan> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid plan {}", path.display()))
}

/// Names of channels whose scheme needs intensity properties the plan lacks.
pub fn missing_statistics(plan: &NormalizationPlan, normalizers: &ChannelNormalizers) -> Vec<String> {
    plan.channels
        .iter()
        .zip(normalizers.iter())
        .filter(|(_, n)| lacks_statistics(n))
        .map(|(c, _)| c.name.clone())
        .collect()
}

fn lacks_statistics(normalizer: &ImageNormalizer) -> bool {
    match normalizer.intensity_properties() {
        None => normalizer.scheme().requires_intensity_properties(),
        Some(props) => {
            *normalizer.scheme() == NormalizationScheme::Ct && props.percentiles().is_none()
        }
    }
}
