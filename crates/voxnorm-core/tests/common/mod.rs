#![allow(dead_code)]

use ndarray::{Array1, Array3, ArrayD, IxDyn};

use voxnorm_core::intensity::IntensityProperties;

/// Dataset statistics used throughout the CT window tests.
pub fn ct_props() -> IntensityProperties {
    IntensityProperties::new(100.0, 50.0)
}

/// Same statistics with 0.5/99.5 percentiles for the plain CT scheme.
pub fn ct_props_with_percentiles(lower: f64, upper: f64) -> IntensityProperties {
    ct_props().with_percentiles(lower, upper)
}

/// A 1-D "image" holding exactly the given values.
pub fn line(values: &[f32]) -> Array1<f32> {
    Array1::from(values.to_vec())
}

/// A small HU volume ramping from -1200 to 1200.
pub fn hu_ramp(d: usize, h: usize, w: usize) -> Array3<f32> {
    let n = (d * h * w).max(2) as f32;
    Array3::from_shape_fn((d, h, w), |(z, y, x)| {
        let i = (z * h * w + y * w + x) as f32;
        -1200.0 + 2400.0 * i / (n - 1.0)
    })
}

/// Dynamic-dimension zeros, handy for shape-mismatch cases.
pub fn zeros_dyn(shape: &[usize]) -> ArrayD<f32> {
    ArrayD::zeros(IxDyn(shape))
}

/// Element-wise comparison against expected values, in iteration order.
pub fn assert_close<'a, T>(actual: impl IntoIterator<Item = &'a T>, expected: &[f64], epsilon: f64)
where
    T: Copy + Into<f64> + 'a,
{
    let actual: Vec<f64> = actual.into_iter().map(|v| (*v).into()).collect();
    assert_eq!(actual.len(), expected.len(), "length mismatch: {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        approx::assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}
