use std::fmt::Debug;

use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::{AsPrimitive, Float, FromPrimitive};
use serde::{Deserialize, Serialize};

/// Foreground intensity statistics of one channel, computed offline across the
/// training corpus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityProperties {
    pub mean: f64,
    pub std: f64,
    /// 0.5th percentile, lower clip bound of the plain `ct` scheme.
    #[serde(default)]
    pub percentile_00_5: Option<f64>,
    /// 99.5th percentile, upper clip bound of the plain `ct` scheme.
    #[serde(default)]
    pub percentile_99_5: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl IntensityProperties {
    pub fn new(mean: f64, std: f64) -> Self {
        Self {
            mean,
            std,
            percentile_00_5: None,
            percentile_99_5: None,
            median: None,
            min: None,
            max: None,
        }
    }

    pub fn with_percentiles(mut self, percentile_00_5: f64, percentile_99_5: f64) -> Self {
        self.percentile_00_5 = Some(percentile_00_5);
        self.percentile_99_5 = Some(percentile_99_5);
        self
    }

    /// Both clip percentiles, if the fingerprint carried them.
    pub fn percentiles(&self) -> Option<(f64, f64)> {
        Some((self.percentile_00_5?, self.percentile_99_5?))
    }
}

/// Floating-point precision normalized images are computed in (`f32` or `f64`).
pub trait TargetFloat: Float + FromPrimitive + Send + Sync + Debug + 'static {}

impl<T> TargetFloat for T where T: Float + FromPrimitive + Send + Sync + Debug + 'static {}

/// Convert an `f64` statistic into the target precision.
pub(crate) fn to_target<F: TargetFloat>(value: f64) -> F {
    F::from_f64(value).unwrap_or_else(F::nan)
}

/// Cast an image of any primitive numeric type into a freshly allocated
/// array of the target precision.
pub fn cast_image<T, F, S, D>(image: &ArrayBase<S, D>) -> Array<F, D>
where
    S: Data<Elem = T>,
    D: Dimension,
    T: AsPrimitive<F>,
    F: TargetFloat,
{
    image.mapv(|v| v.as_())
}
