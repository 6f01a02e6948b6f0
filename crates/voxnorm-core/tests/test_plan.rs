mod common;

use approx::assert_abs_diff_eq;
use ndarray::{s, Array1, Array2, Array3, Array4, Axis};

use voxnorm_core::consts::PARALLEL_VOXEL_THRESHOLD;
use voxnorm_core::error::NormError;
use voxnorm_core::normalization::{ImageNormalizer, NormalizationScheme, SchemeRegistry};
use voxnorm_core::plan::{
    determine_use_mask_for_norm, ChannelConfig, ChannelNormalizers, NormalizationPlan,
};

use common::ct_props;

fn ct_and_mri_plan() -> NormalizationPlan {
    NormalizationPlan::new(vec![
        ChannelConfig::new("ct_to_-100_200").with_intensity_properties(ct_props()),
        ChannelConfig::new("T2"),
    ])
}

// ---------------------------------------------------------------------------
// Plan deserialization
// ---------------------------------------------------------------------------

#[test]
fn test_plan_from_json_defaults() {
    let json = r#"{
        "channels": [
            { "name": "CT", "intensity_properties": { "mean": 100.0, "std": 50.0,
              "percentile_00_5": -1000.0, "percentile_99_5": 1000.0 } },
            { "name": "flair", "use_mask_for_norm": true }
        ]
    }"#;
    let plan: NormalizationPlan = serde_json::from_str(json).unwrap();

    assert_eq!(plan.channels.len(), 2);
    assert!(!plan.channels[0].use_mask_for_norm);
    let props = plan.channels[0].intensity_properties.unwrap();
    assert_eq!(props.percentiles(), Some((-1000.0, 1000.0)));
    assert_eq!(props.median, None);
    assert!(plan.channels[1].use_mask_for_norm);
    assert!(plan.channels[1].intensity_properties.is_none());
}

#[test]
fn test_empty_plan_from_json() {
    let plan: NormalizationPlan = serde_json::from_str("{}").unwrap();
    assert!(plan.channels.is_empty());
}

#[test]
fn test_properties_require_mean_and_std() {
    let result: Result<NormalizationPlan, _> =
        serde_json::from_str(r#"{ "channels": [ { "name": "ct", "intensity_properties": { "mean": 1.0 } } ] }"#);
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Building normalizers
// ---------------------------------------------------------------------------

#[test]
fn test_from_plan_resolves_every_channel() {
    let registry = SchemeRegistry::new();
    let normalizers = ChannelNormalizers::from_plan(&ct_and_mri_plan(), &registry).unwrap();

    assert_eq!(normalizers.len(), 2);
    let ct = normalizers.get(0).unwrap();
    assert_eq!(ct.scheme().name(), "CTWindowNeg100To200Normalization");
    assert_eq!(ct.intensity_properties(), Some(&ct_props()));
    assert_eq!(normalizers.get(1).unwrap().scheme(), &NormalizationScheme::ZScore);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_from_plan_propagates_invalid_window() {
    let registry = SchemeRegistry::new();
    let plan = NormalizationPlan::new(vec![ChannelConfig::new("ct_to_200_-100")]);
    let err = ChannelNormalizers::from_plan(&plan, &registry).unwrap_err();
    assert!(matches!(err, NormError::InvalidCtWindow { lower: 200, upper: -100 }));
}

#[test]
fn test_example_plan_is_complete() {
    let registry = SchemeRegistry::new();
    let plan = NormalizationPlan::example();
    let normalizers = ChannelNormalizers::from_plan(&plan, &registry).unwrap();
    for n in normalizers.iter() {
        assert!(!n.scheme().requires_intensity_properties() || n.intensity_properties().is_some());
    }
}

// ---------------------------------------------------------------------------
// normalize_channels
// ---------------------------------------------------------------------------

#[test]
fn test_each_channel_gets_its_own_scheme() {
    let registry = SchemeRegistry::new();
    let normalizers = ChannelNormalizers::from_plan(&ct_and_mri_plan(), &registry).unwrap();

    let mut data = Array3::<f32>::zeros((2, 1, 4));
    data.slice_mut(s![0, 0, ..]).assign(&Array1::from(vec![-1000.0, 100.0, 150.0, 900.0]));
    data.slice_mut(s![1, 0, ..]).assign(&Array1::from(vec![2.0, 4.0, 6.0, 8.0]));

    normalizers.normalize_channels(&mut data, None).unwrap();

    let ct = data.index_axis(Axis(0), 0);
    assert_abs_diff_eq!(ct[[0, 0]], -4.0, epsilon = 1e-6);
    assert_abs_diff_eq!(ct[[0, 1]], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(ct[[0, 2]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(ct[[0, 3]], 2.0, epsilon = 1e-6);

    let mri = data.index_axis(Axis(0), 1);
    assert_abs_diff_eq!(mri.sum(), 0.0, epsilon = 1e-5);
    let std = (mri.mapv(|v| v * v).sum() / 4.0).sqrt();
    assert_abs_diff_eq!(std, 1.0, epsilon = 1e-5);
}

#[test]
fn test_parallel_path_matches_sequential() {
    let registry = SchemeRegistry::new();
    let normalizers = ChannelNormalizers::from_plan(&ct_and_mri_plan(), &registry).unwrap();

    // 16 * 64 * 64 voxels per channel reaches the parallel threshold.
    let (d, h, w) = (16, 64, 64);
    assert!(d * h * w >= PARALLEL_VOXEL_THRESHOLD);
    let mut data = Array4::<f32>::from_shape_fn((2, d, h, w), |(c, z, y, x)| {
        (c * 1000 + z * 37 + y * 11 + x) as f32 - 500.0
    });
    let original = data.clone();

    normalizers.normalize_channels(&mut data, None).unwrap();

    for (c, normalizer) in normalizers.iter().enumerate() {
        let expected: Array3<f32> = normalizer
            .run(&original.index_axis(Axis(0), c), None)
            .unwrap();
        let actual = data.index_axis(Axis(0), c);
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_shared_mask_reaches_every_channel() {
    let normalizers = ChannelNormalizers::new(vec![
        ImageNormalizer::new(NormalizationScheme::ZScore).with_mask_for_norm(true),
        ImageNormalizer::new(NormalizationScheme::ZScore),
    ]);
    let mut data = Array2::from_shape_vec((2, 4), vec![1.0f32, 3.0, 5.0, 99.0, 1.0, 3.0, 5.0, 99.0]).unwrap();
    let seg = Array1::from(vec![0i16, 0, 0, -1]);

    normalizers.normalize_channels(&mut data, Some(seg.view())).unwrap();

    // masked channel keeps the outside voxel and centres the rest on 3
    assert_eq!(data[[0, 3]], 99.0);
    assert_abs_diff_eq!(data[[0, 1]], 0.0, epsilon = 1e-6);
    // unmasked channel is centred on the global mean
    assert_abs_diff_eq!(data.row(1).sum(), 0.0, epsilon = 1e-4);
}

#[test]
fn test_channel_count_mismatch() {
    let registry = SchemeRegistry::new();
    let normalizers = ChannelNormalizers::from_plan(&ct_and_mri_plan(), &registry).unwrap();
    let mut data = Array3::<f32>::zeros((3, 2, 2));
    let err = normalizers.normalize_channels(&mut data, None).unwrap_err();
    assert!(matches!(err, NormError::ChannelCountMismatch { expected: 2, actual: 3 }));
}

#[test]
fn test_missing_statistics_propagate() {
    let registry = SchemeRegistry::new();
    let plan = NormalizationPlan::new(vec![ChannelConfig::new("ct_to_-15_115")]);
    let normalizers = ChannelNormalizers::from_plan(&plan, &registry).unwrap();
    let mut data = Array2::<f32>::from_elem((1, 4), 500.0);
    let err = normalizers.normalize_channels(&mut data, None).unwrap_err();
    assert!(err.is_configuration_error());
    assert!(data.iter().all(|v| *v == 500.0));
}

// ---------------------------------------------------------------------------
// Mask usage decision
// ---------------------------------------------------------------------------

#[test]
fn test_mask_used_only_for_zscore_after_substantial_cropping() {
    let schemes = [
        NormalizationScheme::ZScore,
        NormalizationScheme::Ct,
        NormalizationScheme::NoNorm,
    ];
    assert_eq!(determine_use_mask_for_norm(&schemes, 0.5), vec![true, false, false]);
    assert_eq!(determine_use_mask_for_norm(&schemes, 0.9), vec![false, false, false]);
}

#[test]
fn test_mask_threshold_is_strict() {
    let schemes = [NormalizationScheme::ZScore];
    assert_eq!(determine_use_mask_for_norm(&schemes, 0.75), vec![false]);
    assert_eq!(determine_use_mask_for_norm(&schemes, 0.7499), vec![true]);
}

#[test]
fn test_decide_mask_usage_updates_plan() {
    let registry = SchemeRegistry::new();
    let mut plan = ct_and_mri_plan();
    plan.decide_mask_usage(&registry, 0.4).unwrap();
    assert!(!plan.channels[0].use_mask_for_norm);
    assert!(plan.channels[1].use_mask_for_norm);

    plan.decide_mask_usage(&registry, 1.0).unwrap();
    assert!(!plan.channels[1].use_mask_for_norm);
}
