use ndarray::{ArrayBase, ArrayView, Axis, DataMut, Dimension, RemoveAxis};
use rayon::prelude::*;
use tracing::info;

use crate::consts::PARALLEL_VOXEL_THRESHOLD;
use crate::error::{NormError, Result};
use crate::intensity::TargetFloat;
use crate::normalization::{ImageNormalizer, SchemeRegistry};

use super::config::NormalizationPlan;

/// One normalizer per channel, in channel order.
#[derive(Clone, Debug, Default)]
pub struct ChannelNormalizers {
    normalizers: Vec<ImageNormalizer>,
}

impl ChannelNormalizers {
    pub fn new(normalizers: Vec<ImageNormalizer>) -> Self {
        Self { normalizers }
    }

    /// Resolve every channel of the plan once through `registry`.
    pub fn from_plan(plan: &NormalizationPlan, registry: &SchemeRegistry) -> Result<Self> {
        let normalizers = plan
            .channels
            .iter()
            .map(|channel| {
                let scheme = registry.resolve(&channel.name)?;
                let normalizer =
                    ImageNormalizer::new(scheme).with_mask_for_norm(channel.use_mask_for_norm);
                Ok(match channel.intensity_properties {
                    Some(props) => normalizer.with_intensity_properties(props),
                    None => normalizer,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(normalizers))
    }

    pub fn len(&self) -> usize {
        self.normalizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalizers.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<&ImageNormalizer> {
        self.normalizers.get(channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageNormalizer> {
        self.normalizers.iter()
    }

    /// Normalize a channel-first array (axis 0 = channel) in place.
    ///
    /// `seg` is the spatial mask shared by all channels. If a channel fails,
    /// its error is returned and other channels may already be normalized.
    pub fn normalize_channels<F, S, D>(
        &self,
        data: &mut ArrayBase<S, D>,
        seg: Option<ArrayView<'_, i16, D::Smaller>>,
    ) -> Result<()>
    where
        S: DataMut<Elem = F>,
        D: Dimension + RemoveAxis,
        F: TargetFloat,
    {
        let channels = data.len_of(Axis(0));
        if channels != self.len() {
            return Err(NormError::ChannelCountMismatch {
                expected: self.len(),
                actual: channels,
            });
        }
        let voxels = if channels == 0 { 0 } else { data.len() / channels };

        if channels > 1 && voxels >= PARALLEL_VOXEL_THRESHOLD {
            info!(channels, voxels, "Normalizing channels in parallel");
            data.axis_iter_mut(Axis(0))
                .into_par_iter()
                .zip(self.normalizers.par_iter())
                .try_for_each(|(mut channel, normalizer)| {
                    normalizer.run_in_place(&mut channel, seg.clone())
                })
        } else {
            info!(channels, voxels, "Normalizing channels");
            for (mut channel, normalizer) in data.axis_iter_mut(Axis(0)).zip(&self.normalizers) {
                normalizer.run_in_place(&mut channel, seg.clone())?;
            }
            Ok(())
        }
    }
}
