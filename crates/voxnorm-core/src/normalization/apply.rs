use ndarray::{Array, ArrayBase, ArrayView, Data, DataMut, Dimension, Zip};
use num_traits::AsPrimitive;
use tracing::{debug, warn};

use crate::consts::{RGB_MAX, STD_EPSILON};
use crate::error::{NormError, Result};
use crate::intensity::{cast_image, to_target, IntensityProperties, TargetFloat};

use super::scheme::NormalizationScheme;

/// A resolved scheme bound to the configuration it runs with.
///
/// The same normalizer can be reused for every image of a channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageNormalizer {
    scheme: NormalizationScheme,
    use_mask_for_norm: bool,
    intensity_properties: Option<IntensityProperties>,
}

impl ImageNormalizer {
    pub fn new(scheme: NormalizationScheme) -> Self {
        Self {
            scheme,
            use_mask_for_norm: false,
            intensity_properties: None,
        }
    }

    /// Restrict z-score statistics to voxels with `seg >= 0`. Ignored by every
    /// other scheme.
    pub fn with_mask_for_norm(mut self, use_mask_for_norm: bool) -> Self {
        self.use_mask_for_norm = use_mask_for_norm;
        self
    }

    pub fn with_intensity_properties(mut self, properties: IntensityProperties) -> Self {
        self.intensity_properties = Some(properties);
        self
    }

    pub fn scheme(&self) -> &NormalizationScheme {
        &self.scheme
    }

    pub fn use_mask_for_norm(&self) -> bool {
        self.use_mask_for_norm
    }

    pub fn intensity_properties(&self) -> Option<&IntensityProperties> {
        self.intensity_properties.as_ref()
    }

    /// Cast `image` to `F` and normalize the copy. `image` is never modified.
    pub fn run<T, F, S, D>(
        &self,
        image: &ArrayBase<S, D>,
        seg: Option<ArrayView<'_, i16, D>>,
    ) -> Result<Array<F, D>>
    where
        S: Data<Elem = T>,
        D: Dimension,
        T: AsPrimitive<F>,
        F: TargetFloat,
    {
        let mut out: Array<F, D> = cast_image(image);
        self.run_in_place(&mut out, seg)?;
        Ok(out)
    }

    /// Normalize a buffer that is already in the target precision, in place.
    ///
    /// Every precondition is checked before the first write, so on error the
    /// buffer is unchanged.
    pub fn run_in_place<F, S, D>(
        &self,
        image: &mut ArrayBase<S, D>,
        seg: Option<ArrayView<'_, i16, D>>,
    ) -> Result<()>
    where
        S: DataMut<Elem = F>,
        D: Dimension,
        F: TargetFloat,
    {
        debug!(scheme = %self.scheme.name(), voxels = image.len(), "Normalizing image");

        match &self.scheme {
            NormalizationScheme::CtWindow(window) => {
                let props = self.require_properties()?;
                clip_and_standardize(image, window.lower() as f64, window.upper() as f64, props);
            }
            NormalizationScheme::Ct => {
                let props = self.require_properties()?;
                let (lower, upper) =
                    props
                        .percentiles()
                        .ok_or_else(|| NormError::MissingPercentiles {
                            scheme: self.scheme.name(),
                        })?;
                clip_and_standardize(image, lower, upper, props);
            }
            NormalizationScheme::ZScore if self.use_mask_for_norm => {
                let seg = seg.ok_or_else(|| NormError::MissingSegmentation {
                    scheme: self.scheme.name(),
                })?;
                if seg.shape() != image.shape() {
                    return Err(NormError::ShapeMismatch {
                        expected: image.shape().to_vec(),
                        actual: seg.shape().to_vec(),
                    });
                }
                zscore_masked(image, &seg);
            }
            NormalizationScheme::ZScore => zscore(image),
            NormalizationScheme::NoNorm => {}
            NormalizationScheme::RescaleTo01 => rescale_to_unit(image),
            NormalizationScheme::RgbTo01 => {
                check_rgb_range(&*image, &self.scheme)?;
                let scale = to_target::<F>(RGB_MAX);
                image.mapv_inplace(|v| v / scale);
            }
        }
        Ok(())
    }

    fn require_properties(&self) -> Result<&IntensityProperties> {
        self.intensity_properties
            .as_ref()
            .ok_or_else(|| NormError::MissingIntensityProperties {
                scheme: self.scheme.name(),
            })
    }
}

/// Clip to `[lower, upper]`, subtract the dataset mean and divide by the
/// dataset standard deviation (at least `STD_EPSILON`).
fn clip_and_standardize<F, S, D>(
    image: &mut ArrayBase<S, D>,
    lower: f64,
    upper: f64,
    props: &IntensityProperties,
) where
    S: DataMut<Elem = F>,
    D: Dimension,
    F: TargetFloat,
{
    let lower = to_target::<F>(lower);
    let upper = to_target::<F>(upper);
    let mean = to_target::<F>(props.mean);
    let divisor = to_target::<F>(props.std.max(STD_EPSILON));

    image.mapv_inplace(|v| (clip(v, lower, upper) - mean) / divisor);
}

/// NaN passes through unchanged.
fn clip<F: TargetFloat>(v: F, lower: F, upper: F) -> F {
    if v < lower {
        lower
    } else if v > upper {
        upper
    } else {
        v
    }
}

fn zscore<F, S, D>(image: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = F>,
    D: Dimension,
    F: TargetFloat,
{
    let Some((mean, std)) = mean_std(image.iter().copied()) else {
        return;
    };
    let mean = to_target::<F>(mean);
    let divisor = to_target::<F>(std.max(STD_EPSILON));
    image.mapv_inplace(|v| (v - mean) / divisor);
}

/// Z-score using only voxels with `seg >= 0`; other voxels are left as they are.
fn zscore_masked<F, S, D>(image: &mut ArrayBase<S, D>, seg: &ArrayView<'_, i16, D>)
where
    S: DataMut<Elem = F>,
    D: Dimension,
    F: TargetFloat,
{
    let inside = image
        .iter()
        .zip(seg.iter())
        .filter(|(_, label)| **label >= 0)
        .map(|(&v, _)| v);
    let Some((mean, std)) = mean_std(inside) else {
        warn!("Normalization mask is empty, image left unchanged");
        return;
    };
    let mean = to_target::<F>(mean);
    let divisor = to_target::<F>(std.max(STD_EPSILON));

    Zip::from(image).and(seg).for_each(|v, &label| {
        if label >= 0 {
            *v = (*v - mean) / divisor;
        }
    });
}

fn rescale_to_unit<F, S, D>(image: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = F>,
    D: Dimension,
    F: TargetFloat,
{
    if image.is_empty() {
        return;
    }
    let min = image.iter().copied().fold(F::infinity(), F::min);
    image.mapv_inplace(|v| v - min);
    let max = image.iter().copied().fold(F::neg_infinity(), F::max);
    let divisor = max.max(to_target::<F>(STD_EPSILON));
    image.mapv_inplace(|v| v / divisor);
}

fn check_rgb_range<F, S, D>(image: &ArrayBase<S, D>, scheme: &NormalizationScheme) -> Result<()>
where
    S: Data<Elem = F>,
    D: Dimension,
    F: TargetFloat,
{
    if image.is_empty() {
        return Ok(());
    }
    let (min, max) = image
        .iter()
        .copied()
        .fold((F::infinity(), F::neg_infinity()), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min < F::zero() || max > to_target::<F>(RGB_MAX) {
        return Err(NormError::InvalidIntensityRange {
            scheme: scheme.name(),
            min: min.to_f64().unwrap_or(f64::NAN),
            max: max.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

/// Population mean and standard deviation, accumulated in `f64`.
pub(crate) fn mean_std<F: TargetFloat>(values: impl IntoIterator<Item = F>) -> Option<(f64, f64)> {
    let mut count = 0usize;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    for v in values {
        let x = v.to_f64().unwrap_or(f64::NAN);
        count += 1;
        let delta = x - mean;
        mean += delta / count as f64;
        m2 += delta * (x - mean);
    }
    (count > 0).then(|| (mean, (m2 / count as f64).sqrt()))
}
