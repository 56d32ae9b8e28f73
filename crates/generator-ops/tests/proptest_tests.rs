//! Property-based tests for the generators using the `proptest` crate.

use proptest::prelude::*;

use generator_ops::{
    build_hinge, knuckle_bands, level_parameters, HingeParameters, LeafSide,
};
use solid_kernel::{MockKernel, OpKind};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_hinge() -> impl Strategy<Value = HingeParameters> {
    (
        1u32..12,
        1.0f64..50.0,
        0.5f64..20.0,
        0.05f64..5.0,
        1.0f64..100.0,
        prop_oneof![Just(0.0f64), 0.0f64..1.0],
        any::<bool>(),
    )
        .prop_map(
            |(num_knuckles, knuckle_height, knuckle_radius, thickness, leaf_length, gap, add_vents)| {
                HingeParameters {
                    num_knuckles,
                    knuckle_height,
                    knuckle_radius,
                    thickness,
                    leaf_length,
                    gap,
                    add_vents,
                }
            },
        )
}

fn arb_valid_hinge() -> impl Strategy<Value = HingeParameters> {
    arb_hinge().prop_filter("derivable", |p| p.derive().is_ok())
}

fn arb_op_kind() -> impl Strategy<Value = OpKind> {
    prop_oneof![
        Just(OpKind::Cylinder),
        Just(OpKind::Box),
        Just(OpKind::Union),
        Just(OpKind::Difference),
        Just(OpKind::Mirror),
        Just(OpKind::MergeFaces),
        Just(OpKind::Select),
    ]
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 1. Bands split ceil(N/2) / floor(N/2), strictly alternating from the left
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bands_alternate_and_split_evenly(params in arb_hinge()) {
        let bands = knuckle_bands(&params);
        let n = params.num_knuckles as usize;
        prop_assert_eq!(bands.len(), n);

        let left = bands.iter().filter(|b| b.cut == LeafSide::Left).count();
        let right = bands.iter().filter(|b| b.cut == LeafSide::Right).count();
        prop_assert_eq!(left, (n + 1) / 2);
        prop_assert_eq!(right, n / 2);

        for (i, band) in bands.iter().enumerate() {
            let expected = if i % 2 == 0 { LeafSide::Left } else { LeafSide::Right };
            prop_assert_eq!(band.cut, expected);
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Interior boundaries extend by half a gap; outer bounds stay exact
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn band_boundaries_extend_by_half_gap(params in arb_hinge()) {
        let bands = knuckle_bands(&params);
        let half = 0.5 * params.gap;
        let height = params.num_knuckles as f64 * params.knuckle_height;

        prop_assert_eq!(bands[0].cut_z0, 0.0);
        let last = bands[bands.len() - 1];
        prop_assert!((last.cut_z1 - height).abs() < TOL * (1.0 + height));
        prop_assert_eq!(last.cut_z1, last.z1);

        for pair in bands.windows(2) {
            let upper_ext = pair[0].cut_z1 - pair[0].z1;
            let lower_ext = pair[1].z0 - pair[1].cut_z0;
            prop_assert!((upper_ext - half).abs() < TOL * (1.0 + height));
            prop_assert!((lower_ext - half).abs() < TOL * (1.0 + height));
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Derived radii stay inside the knuckle for every valid configuration
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn derived_radii_inequalities(params in arb_valid_hinge()) {
        let dims = params.derive().unwrap();
        prop_assert!(dims.pin_radius > 0.0);
        prop_assert!(dims.cap_radius > 0.0);
        // a zero gap puts the pin flush with the bore
        if params.gap > 0.0 {
            prop_assert!(dims.pin_radius < params.knuckle_radius - params.thickness);
        } else {
            prop_assert_eq!(dims.pin_radius, params.knuckle_radius - params.thickness);
        }
        prop_assert!(dims.cap_radius < params.knuckle_radius);
    }
}

// ---------------------------------------------------------------------------
// 4. Level parameters are increasing with exact endpoints
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn level_parameters_span_unit_interval(n in 2usize..200) {
        let u = level_parameters(n);
        prop_assert_eq!(u.len(), n);
        prop_assert_eq!(u[0], 0.0);
        prop_assert_eq!(u[n - 1], 1.0);
        for pair in u.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. A hinge run either yields exactly three solids or leaves nothing behind
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hinge_run_is_all_or_nothing(
        params in arb_valid_hinge(),
        kind in arb_op_kind(),
        nth in 1usize..12,
    ) {
        let mut kernel = MockKernel::new();
        kernel.fail_nth(kind, nth);
        match build_hinge(&mut kernel, &params) {
            Ok(hinge) => {
                prop_assert_eq!(kernel.solid_count(), 3);
                prop_assert_eq!(kernel.selected(), &hinge.ids()[..]);
            }
            Err(_) => prop_assert!(kernel.live_objects().is_empty()),
        }
    }
}
