use approx::assert_relative_eq;

use generator_ops::{
    anchor_point, build_hinge, build_lattice, default_hinge, generate_lattice, level_table,
    reference_radius, CurvePicker, HingeParameters, InputShapeError, LatticeConfig, OpError,
    ParamAnswer, ParamSource, ParamSpec, PresetParams, SelectedObject,
};
use geom_types::{Transform, Vec3};
use solid_kernel::{CurveHandle, Kernel, KernelError, MockKernel, MockShape, OpKind};

/// Profile in the YZ plane: radius 4 at z=0, 6 at z=10, 3 at z=20.
fn vase_profile(kernel: &mut MockKernel) -> CurveHandle {
    kernel
        .add_polyline(&[
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(0.0, 6.0, 10.0),
            Vec3::new(0.0, 3.0, 20.0),
        ])
        .unwrap()
}

fn circle_section(kernel: &mut MockKernel, radius: f64, z: f64) -> CurveHandle {
    kernel
        .add_circle(Vec3::new(0.0, 0.0, z), Vec3::Z, radius)
        .unwrap()
}

fn square_section(kernel: &mut MockKernel, half: f64, lift: f64) -> CurveHandle {
    kernel
        .add_polyline(&[
            Vec3::new(-half, -half, 0.0),
            Vec3::new(half, -half, 0.0),
            Vec3::new(half, half, lift),
            Vec3::new(-half, half, 0.0),
            Vec3::new(-half, -half, 0.0),
        ])
        .unwrap()
}

struct Picker {
    selection: Vec<SelectedObject>,
    picks: Vec<Option<CurveHandle>>,
}

impl CurvePicker for Picker {
    fn take_selection(&mut self) -> Vec<SelectedObject> {
        std::mem::take(&mut self.selection)
    }

    fn pick_curve(&mut self, _prompt: &str) -> Option<CurveHandle> {
        if self.picks.is_empty() {
            None
        } else {
            self.picks.remove(0)
        }
    }
}

// ── Hinge ──────────────────────────────────────────────────────────────────

#[test]
fn hinge_default_produces_three_selected_solids() {
    let mut kernel = MockKernel::new();
    let hinge = build_hinge(&mut kernel, &HingeParameters::default()).unwrap();

    assert_eq!(kernel.solid_count(), 3);
    assert_eq!(kernel.selected(), &hinge.ids());
    assert_eq!(kernel.merged_count(), 3);
}

#[test]
fn hinge_default_operation_counts() {
    let mut kernel = MockKernel::new();
    build_hinge(&mut kernel, &HingeParameters::default()).unwrap();

    // shaft, 2 caps, knuckle, bore, 2 pockets
    assert_eq!(kernel.op_count(OpKind::Cylinder), 7);
    // paddle, 3 band cutters, 3 vents
    assert_eq!(kernel.op_count(OpKind::Box), 7);
    assert_eq!(kernel.op_count(OpKind::Union), 2);
    assert_eq!(kernel.op_count(OpKind::Difference), 3);
    assert_eq!(kernel.op_count(OpKind::Mirror), 1);
}

#[test]
fn hinge_bounds() {
    let mut kernel = MockKernel::new();
    let hinge = build_hinge(&mut kernel, &HingeParameters::default()).unwrap();

    let pin = kernel.bounds(&hinge.pin).unwrap();
    assert_relative_eq!(pin.min.z, 0.0);
    assert_relative_eq!(pin.max.z, 60.0);
    // the end caps are wider than the shaft
    assert_relative_eq!(pin.max.x, 3.75);

    let right = kernel.bounds(&hinge.right_leaf).unwrap();
    assert_relative_eq!(right.min.x, -5.0);
    assert_relative_eq!(right.max.x, 40.0);

    let left = kernel.bounds(&hinge.left_leaf).unwrap();
    assert_relative_eq!(left.min.x, -40.0, epsilon = 1e-12);
    assert_relative_eq!(left.max.x, 5.0, epsilon = 1e-12);
    assert_relative_eq!(left.max.y, 5.0, epsilon = 1e-12);
}

#[test]
fn hinge_leaves_receive_alternating_cutters() {
    let mut kernel = MockKernel::new();
    let hinge = build_hinge(&mut kernel, &HingeParameters::default()).unwrap();

    let tools = |h| match &kernel.solid(h).unwrap().shape {
        MockShape::Difference { tools } => tools.clone(),
        other => panic!("expected a difference, got {other:?}"),
    };
    let left = tools(&hinge.left_leaf);
    let right = tools(&hinge.right_leaf);
    assert_eq!(left.len(), 3);
    assert_eq!(right.len(), 3);

    // left: band 0, band 1 vent, band 2; right: band 0 vent, band 1, band 2 vent
    assert_relative_eq!(left[0].min.z, 0.0);
    assert_relative_eq!(left[0].max.z, 20.125);
    assert_relative_eq!(left[1].min.z, 24.0);
    assert_relative_eq!(left[1].max.y, 3.0);
    assert_relative_eq!(left[2].min.z, 39.875);
    assert_relative_eq!(left[2].max.z, 60.0);
    assert_relative_eq!(right[1].min.z, 19.875);
    assert_relative_eq!(right[1].max.z, 40.125);
}

#[test]
fn hinge_single_knuckle_without_vents_skips_empty_difference() {
    let mut kernel = MockKernel::new();
    let params = HingeParameters {
        num_knuckles: 1,
        add_vents: false,
        ..HingeParameters::default()
    };
    let hinge = build_hinge(&mut kernel, &params).unwrap();

    // bore difference plus the left leaf's single band
    assert_eq!(kernel.op_count(OpKind::Difference), 2);
    let tool_count = |h| match &kernel.solid(h).unwrap().shape {
        MockShape::Difference { tools } => tools.len(),
        other => panic!("expected a difference, got {other:?}"),
    };
    // the right leaf still carries only the bore and cap pockets
    assert_eq!(tool_count(&hinge.right_leaf), 3);
    assert_eq!(tool_count(&hinge.left_leaf), 1);
    assert_eq!(kernel.solid_count(), 3);
}

#[test]
fn hinge_configuration_error_makes_no_kernel_calls() {
    let mut kernel = MockKernel::new();
    let params = HingeParameters {
        knuckle_radius: 2.0,
        thickness: 1.5,
        gap: 0.5,
        ..HingeParameters::default()
    };
    let err = build_hinge(&mut kernel, &params).unwrap_err();
    assert!(matches!(err, OpError::Configuration { .. }));
    assert!(kernel.log().is_empty());
}

#[test]
fn hinge_kernel_failure_releases_everything() {
    for (kind, n) in [
        (OpKind::Union, 1),
        (OpKind::Union, 2),
        (OpKind::Difference, 1),
        (OpKind::Difference, 3),
        (OpKind::Mirror, 1),
        (OpKind::Box, 5),
        (OpKind::MergeFaces, 1),
        (OpKind::Select, 1),
    ] {
        let mut kernel = MockKernel::new();
        kernel.fail_nth(kind, n);
        let err = build_hinge(&mut kernel, &HingeParameters::default()).unwrap_err();
        assert!(matches!(err, OpError::Kernel(_)), "{kind:?}: {err}");
        assert!(
            kernel.live_objects().is_empty(),
            "{kind:?} #{n} leaked {:?}",
            kernel.live_objects()
        );
    }
}

#[test]
fn default_hinge_cancelled() {
    struct Cancel;
    impl ParamSource for Cancel {
        fn ask(&mut self, _spec: &ParamSpec) -> Option<ParamAnswer> {
            None
        }
    }
    let mut kernel = MockKernel::new();
    assert!(default_hinge(&mut kernel, &mut Cancel).unwrap().is_none());
    assert!(kernel.log().is_empty());
}

#[test]
fn default_hinge_with_preset_answers() {
    let mut kernel = MockKernel::new();
    let mut source = PresetParams::new()
        .with("Number of knuckles", ParamAnswer::Text("5".into()))
        .with("Add vents?", ParamAnswer::Text("False".into()));
    let hinge = default_hinge(&mut kernel, &mut source).unwrap().unwrap();

    // paddle plus five band cutters
    assert_eq!(kernel.op_count(OpKind::Box), 6);
    assert_relative_eq!(kernel.bounds(&hinge.pin).unwrap().max.z, 100.0);
}

// ── Lattice ────────────────────────────────────────────────────────────────

#[test]
fn lattice_default_counts() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = circle_section(&mut kernel, 2.0, 0.0);

    let lattice = build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap();

    assert_eq!(lattice.rings.len(), 8);
    assert_eq!(lattice.struts.len(), 35);
    assert_eq!(kernel.solid_count(), 43);
    // only the two input curves remain
    assert_eq!(kernel.curve_count(), 2);
    assert_eq!(kernel.selected().len(), 43);
    assert_eq!(kernel.op_count(OpKind::TransformCopy), 28);
}

#[test]
fn lattice_rings_follow_profile() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = circle_section(&mut kernel, 2.0, 3.0);
    let config = LatticeConfig::default();

    let lattice = build_lattice(&mut kernel, &profile, &cross, &config).unwrap();

    let bottom = kernel.bounds(&lattice.rings[0]).unwrap();
    assert_relative_eq!(bottom.max.x, 4.3, epsilon = 1e-9);
    assert_relative_eq!(bottom.min.z, -0.6, epsilon = 1e-9);
    assert_relative_eq!(bottom.max.z, 0.6, epsilon = 1e-9);

    let top = kernel.bounds(&lattice.rings[7]).unwrap();
    assert_relative_eq!(top.max.y, 3.3, epsilon = 1e-9);
    assert_relative_eq!(top.min.z, 19.4, epsilon = 1e-9);
}

#[test]
fn lattice_levels_and_anchors() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = circle_section(&mut kernel, 2.0, 0.0);

    let levels = level_table(&kernel, &profile, 8).unwrap();
    assert_eq!(levels.len(), 8);
    assert_eq!(levels[0].u, 0.0);
    assert_eq!(levels[7].u, 1.0);
    assert_relative_eq!(levels[0].radius, 4.0, epsilon = 1e-12);
    assert_relative_eq!(levels[7].radius, 3.0, epsilon = 1e-12);
    assert_relative_eq!(levels[7].z, 20.0);

    let (r, pc) = reference_radius(&kernel, &cross, Vec3::ZERO).unwrap();
    for level in &levels {
        let p = anchor_point(pc, r, level, 5);
        assert_relative_eq!(p.x.hypot(p.y), level.radius, epsilon = 1e-9);
        assert_relative_eq!(p.z, level.z, epsilon = 1e-12);
    }
}

#[test]
fn reference_radius_of_circle_is_its_radius() {
    let mut kernel = MockKernel::new();
    let cross = circle_section(&mut kernel, 1.75, 2.0);
    let (r, pc) = reference_radius(&kernel, &cross, Vec3::new(0.0, 0.0, 2.0)).unwrap();
    assert_relative_eq!(r, 1.75, epsilon = 1e-12);
    assert_relative_eq!(pc.length(), 1.75, epsilon = 1e-12);
    assert_relative_eq!(pc.z, 0.0, epsilon = 1e-12);
}

#[test]
fn reference_radius_takes_minimum_over_segments() {
    let mut kernel = MockKernel::new();
    let rect = kernel
        .add_polyline(&[
            Vec3::new(-3.0, -1.0, 0.0),
            Vec3::new(3.0, -1.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(-3.0, 1.0, 0.0),
            Vec3::new(-3.0, -1.0, 0.0),
        ])
        .unwrap();
    let (r, pc) = reference_radius(&kernel, &rect, Vec3::ZERO).unwrap();
    assert_relative_eq!(r, 1.0, epsilon = 1e-12);
    assert_relative_eq!(pc.y.abs(), 1.0, epsilon = 1e-12);
}

#[test]
fn scaled_cross_section_reproduces_level_radius() {
    let mut kernel = MockKernel::new();
    let cross = circle_section(&mut kernel, 2.0, 0.0);
    let (r, _) = reference_radius(&kernel, &cross, Vec3::ZERO).unwrap();
    for ri in [0.5, 3.0, 7.25] {
        let k = ri / r;
        let scaled = kernel
            .transform_curve_copy(&cross, &Transform::scaling(Vec3::new(k, k, 1.0)))
            .unwrap();
        let (back, _) = reference_radius(&kernel, &scaled, Vec3::ZERO).unwrap();
        assert_relative_eq!(back, ri, epsilon = 1e-9);
    }
}

#[test]
fn lattice_rejects_non_planar_cross_section() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = square_section(&mut kernel, 1.0, 1e-6);

    let err = build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        OpError::InputShape(InputShapeError::CrossSectionNotPlanar { .. })
    ));
    assert_eq!(kernel.solid_count(), 0);
    assert_eq!(kernel.curve_count(), 2);
    assert_eq!(kernel.op_count(OpKind::Sweep), 0);
}

#[test]
fn lattice_rejects_non_planar_profile() {
    let mut kernel = MockKernel::new();
    let profile = kernel
        .add_polyline(&[Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.5, 6.0, 10.0)])
        .unwrap();
    let cross = circle_section(&mut kernel, 1.0, 0.0);

    let err = build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        OpError::InputShape(InputShapeError::ProfileNotPlanar { .. })
    ));
    assert_eq!(kernel.solid_count(), 0);
}

#[test]
fn lattice_rejects_open_cross_section() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = kernel
        .add_polyline(&[Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)])
        .unwrap();
    let err = build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap_err();
    assert_eq!(err, OpError::InputShape(InputShapeError::CrossSectionNotClosed));
}

#[test]
fn lattice_rejects_cross_section_through_center() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = kernel
        .add_polyline(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
    let err = build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        OpError::InputShape(InputShapeError::DegenerateCrossSection { .. })
    ));
}

#[test]
fn lattice_rejects_multi_valued_profile() {
    let mut kernel = MockKernel::new();
    let profile = kernel
        .add_polyline(&[
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(0.0, 6.0, 10.0),
            Vec3::new(0.0, 3.0, 5.0),
        ])
        .unwrap();
    let cross = circle_section(&mut kernel, 1.0, 0.0);

    let err = build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap_err();
    match err {
        OpError::InputShape(InputShapeError::BadIntersection { points, .. }) => {
            assert_eq!(points, 2)
        }
        other => panic!("expected a bad intersection, got {other:?}"),
    }
    assert_eq!(kernel.solid_count(), 0);
    assert_eq!(kernel.op_count(OpKind::Sweep), 0);
}

#[test]
fn lattice_kernel_failure_releases_partial_geometry() {
    for (kind, n) in [
        (OpKind::Sweep, 5),
        (OpKind::Sweep, 12),
        (OpKind::CurveCopy, 4),
        (OpKind::TransformInPlace, 8),
        (OpKind::TransformCopy, 20),
        (OpKind::Line, 3),
        (OpKind::Select, 1),
    ] {
        let mut kernel = MockKernel::new();
        let profile = vase_profile(&mut kernel);
        let cross = circle_section(&mut kernel, 2.0, 0.0);
        kernel.fail_nth(kind, n);

        let err =
            build_lattice(&mut kernel, &profile, &cross, &LatticeConfig::default()).unwrap_err();
        assert!(matches!(err, OpError::Kernel(_)), "{kind:?}: {err}");
        assert_eq!(kernel.solid_count(), 0, "{kind:?} #{n}");
        assert_eq!(
            kernel.live_objects(),
            vec![profile.id(), cross.id()],
            "{kind:?} #{n}"
        );
    }
}

#[test]
fn lattice_respects_custom_config() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = circle_section(&mut kernel, 2.0, 0.0);
    let config = LatticeConfig {
        num_levels: 3,
        num_sides: 4,
        ..LatticeConfig::default()
    };
    let lattice = build_lattice(&mut kernel, &profile, &cross, &config).unwrap();
    assert_eq!(lattice.rings.len(), 3);
    assert_eq!(lattice.struts.len(), 8);
}

#[test]
fn lattice_invalid_config_is_configuration_error() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = circle_section(&mut kernel, 2.0, 0.0);
    let config = LatticeConfig {
        strut_radius: -1.0,
        ..LatticeConfig::default()
    };
    let err = build_lattice(&mut kernel, &profile, &cross, &config).unwrap_err();
    assert!(matches!(err, OpError::Configuration { .. }));
    assert_eq!(kernel.op_count(OpKind::Sweep), 0);
}

#[test]
fn generate_lattice_from_preselection() {
    let mut kernel = MockKernel::new();
    let profile = vase_profile(&mut kernel);
    let cross = circle_section(&mut kernel, 2.0, 0.0);
    let mut picker = Picker {
        selection: vec![SelectedObject::Curve(cross), SelectedObject::Curve(profile)],
        picks: Vec::new(),
    };
    let lattice = generate_lattice(&mut kernel, &mut picker, &LatticeConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(lattice.ids().len(), 43);
}

#[test]
fn generate_lattice_cancelled() {
    let mut kernel = MockKernel::new();
    let mut picker = Picker {
        selection: Vec::new(),
        picks: vec![None],
    };
    let result = generate_lattice(&mut kernel, &mut picker, &LatticeConfig::default()).unwrap();
    assert!(result.is_none());
    assert!(kernel.log().is_empty());
}

#[test]
fn kernel_errors_convert_into_op_errors() {
    let err: OpError = KernelError::SweepFailed {
        reason: "x".into(),
    }
    .into();
    assert!(err.to_string().contains("sweep failed"));
}
