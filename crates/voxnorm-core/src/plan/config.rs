use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intensity::IntensityProperties;
use crate::normalization::SchemeRegistry;

use super::mask::determine_use_mask_for_norm;

/// Per-dataset normalization configuration, one entry per input channel in
/// channel order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationPlan {
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, resolved to a scheme case-insensitively.
    pub name: String,
    #[serde(default)]
    pub use_mask_for_norm: bool,
    /// Required by `ct` and `ct_to_<lower>_<upper>` channels.
    #[serde(default)]
    pub intensity_properties: Option<IntensityProperties>,
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_mask_for_norm: false,
            intensity_properties: None,
        }
    }

    pub fn with_intensity_properties(mut self, properties: IntensityProperties) -> Self {
        self.intensity_properties = Some(properties);
        self
    }
}

impl NormalizationPlan {
    pub fn new(channels: Vec<ChannelConfig>) -> Self {
        Self { channels }
    }

    /// A two-channel CT + MRI plan, used as a starting template.
    pub fn example() -> Self {
        Self::new(vec![
            ChannelConfig::new("ct_to_-100_200").with_intensity_properties(
                IntensityProperties::new(100.0, 50.0).with_percentiles(-1000.0, 1000.0),
            ),
            ChannelConfig::new("T2"),
        ])
    }

    /// Set `use_mask_for_norm` on every channel from its scheme and how much
    /// cropping to the nonzero region shrank the dataset.
    pub fn decide_mask_usage(
        &mut self,
        registry: &SchemeRegistry,
        median_relative_size_after_cropping: f64,
    ) -> Result<()> {
        let schemes = self
            .channels
            .iter()
            .map(|c| registry.resolve(&c.name))
            .collect::<Result<Vec<_>>>()?;
        let decisions = determine_use_mask_for_norm(&schemes, median_relative_size_after_cropping);
        for (channel, use_mask) in self.channels.iter_mut().zip(decisions) {
            channel.use_mask_for_norm = use_mask;
        }
        Ok(())
    }
}
