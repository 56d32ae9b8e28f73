//! Profile-conforming ring-and-strut lattice.
//!
//! The cross-section is a closed curve lying in a horizontal plane; the
//! profile is a silhouette in the YZ plane whose |y| gives the lattice
//! radius at each height. One ring is swept per level and a helical strand
//! of struts joins anchor points that turn `360 / num_sides` degrees per
//! level; the strand is then replicated around the Z axis.

use geom_types::{Axis, Plane, Transform, Vec3};
use serde::{Deserialize, Serialize};
use solid_kernel::{CurveHandle, IntersectionKind, Kernel, PipeCap, PipeStation};
use tracing::{debug, info, instrument, warn};

use crate::scope::KernelScope;
use crate::selection::{acquire_curves, CurvePicker};
use crate::types::{InputShapeError, LatticeSolids, OpError};

/// Axis along which the cross-section must be flat.
pub const CROSS_SECTION_NORMAL: Axis = Axis::Z;
/// Axis along which the profile must be flat.
pub const PROFILE_NORMAL: Axis = Axis::X;
/// Profile coordinate read as the lattice radius.
pub const PROFILE_RADIUS_AXIS: Axis = Axis::Y;

/// Radii at or below this are treated as zero.
const MIN_RADIUS: f64 = 1e-12;

/// Generation constants for the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub num_levels: usize,
    pub num_sides: usize,
    pub strut_radius: f64,
    pub ring_radius: f64,
    /// Vertical stretch applied to each swept ring.
    pub ring_vertical_scale: f64,
    /// Maximum out-of-plane extent accepted for input curves.
    pub planarity_tolerance: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            num_levels: 8,
            num_sides: 5,
            strut_radius: 0.25,
            ring_radius: 0.3,
            ring_vertical_scale: 2.0,
            planarity_tolerance: 1e-9,
        }
    }
}

impl LatticeConfig {
    pub fn validate(&self) -> Result<(), OpError> {
        if self.num_levels < 2 {
            return Err(OpError::config(format!(
                "num_levels must be at least 2, got {}",
                self.num_levels
            )));
        }
        if self.num_sides < 1 {
            return Err(OpError::config("num_sides must be at least 1"));
        }
        for (name, value) in [
            ("strut_radius", self.strut_radius),
            ("ring_radius", self.ring_radius),
            ("ring_vertical_scale", self.ring_vertical_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OpError::config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.planarity_tolerance.is_finite() && self.planarity_tolerance >= 0.0) {
            return Err(OpError::config(format!(
                "planarity_tolerance must be non-negative, got {}",
                self.planarity_tolerance
            )));
        }
        Ok(())
    }

    pub fn ring_count(&self) -> usize {
        self.num_levels
    }

    pub fn strut_count(&self) -> usize {
        self.num_levels.saturating_sub(1) * self.num_sides
    }
}

/// One horizontal slice of the lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub index: usize,
    /// Normalized height, `index / (num_levels - 1)`.
    pub u: f64,
    pub z: f64,
    /// Target in-plane radius read off the profile.
    pub radius: f64,
}

/// Evenly spaced parameters `i / (num_levels - 1)`, first 0 and last exactly 1.
pub fn level_parameters(num_levels: usize) -> Vec<f64> {
    match num_levels {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let last = (n - 1) as f64;
            (0..n).map(|i| i as f64 / last).collect()
        }
    }
}

/// Closest approach of `cross` to `center`: one closest-point query per
/// segment, keeping the global minimum. Returns the distance and the
/// displacement from `center` to the closest point.
pub fn reference_radius(
    kernel: &dyn Kernel,
    cross: &CurveHandle,
    center: Vec3,
) -> Result<(f64, Vec3), OpError> {
    let segments = kernel.curve_segment_count(cross)?;
    let mut best: Option<(f64, Vec3)> = None;
    for segment in 0..segments {
        let t = kernel.closest_point_on_curve(cross, center, segment)?;
        let offset = kernel.evaluate_curve(cross, t)? - center;
        let r = offset.length();
        if best.map_or(true, |(best_r, _)| r < best_r) {
            best = Some((r, offset));
        }
    }
    match best {
        Some((r, offset)) if r > MIN_RADIUS => Ok((r, offset)),
        Some((r, _)) => Err(InputShapeError::DegenerateCrossSection { radius: r }.into()),
        None => Err(InputShapeError::DegenerateCrossSection { radius: 0.0 }.into()),
    }
}

/// Radius of `profile` at height `z`: the horizontal plane must cut it in
/// exactly one point.
pub fn level_radius(kernel: &dyn Kernel, profile: &CurveHandle, z: f64) -> Result<f64, OpError> {
    let events = kernel.plane_curve_intersection(&Plane::horizontal(z), profile)?;
    let points = events
        .iter()
        .filter(|e| e.kind == IntersectionKind::Point)
        .count();
    match events.as_slice() {
        [event] if event.kind == IntersectionKind::Point => {
            Ok(event.point[PROFILE_RADIUS_AXIS].abs())
        }
        _ => Err(InputShapeError::BadIntersection {
            z,
            points,
            overlaps: events.len() - points,
        }
        .into()),
    }
}

/// Anchor of the base strand at `level`: `pc` rotated by
/// `360 * index / num_sides` degrees about Z, scaled by `radius / r`, then
/// lifted to the level height.
pub fn anchor_point(pc: Vec3, r: f64, level: &Level, num_sides: usize) -> Vec3 {
    let angle = 360.0 * level.index as f64 / num_sides as f64;
    let k = level.radius / r;
    let xform = Transform::translation(Vec3::new(0.0, 0.0, level.z))
        .then(&Transform::scaling(Vec3::new(k, k, 1.0)))
        .then(&Transform::rotation_about_axis(angle, Vec3::Z, Vec3::ZERO));
    xform.transform_point(&pc)
}

/// Compute every level of the lattice from the profile's vertical extent.
pub fn level_table(
    kernel: &dyn Kernel,
    profile: &CurveHandle,
    num_levels: usize,
) -> Result<Vec<Level>, OpError> {
    let bounds = kernel.curve_bounding_box(profile)?.bounds();
    let (z0, z1) = (bounds.min.z, bounds.max.z);
    level_parameters(num_levels)
        .into_iter()
        .enumerate()
        .map(|(index, u)| {
            let z = z0 + u * (z1 - z0);
            let radius = level_radius(kernel, profile, z)?;
            if radius <= MIN_RADIUS {
                return Err(InputShapeError::ZeroLevelRadius { index, z }.into());
            }
            debug!(index, u, z, radius, "lattice level");
            Ok(Level {
                index,
                u,
                z,
                radius,
            })
        })
        .collect()
}

/// Build rings and struts conforming to `profile`. The input curves are only
/// read; nothing is left in the kernel if any step fails.
#[instrument(skip(kernel, profile, cross))]
pub fn build_lattice(
    kernel: &mut dyn Kernel,
    profile: &CurveHandle,
    cross: &CurveHandle,
    config: &LatticeConfig,
) -> Result<LatticeSolids, OpError> {
    let result = assemble(kernel, profile, cross, config);
    if let Err(err) = &result {
        warn!(%err, "lattice generation aborted");
    }
    result
}

fn assemble(
    kernel: &mut dyn Kernel,
    profile: &CurveHandle,
    cross: &CurveHandle,
    config: &LatticeConfig,
) -> Result<LatticeSolids, OpError> {
    config.validate()?;

    if !kernel.is_curve_closed(cross)? {
        return Err(InputShapeError::CrossSectionNotClosed.into());
    }
    let cross_bounds = kernel.curve_bounding_box(cross)?.bounds();
    let extent = cross_bounds.extent(CROSS_SECTION_NORMAL);
    if extent > config.planarity_tolerance {
        return Err(InputShapeError::CrossSectionNotPlanar { extent }.into());
    }
    let cz = cross_bounds.center().z;

    let extent = kernel
        .curve_bounding_box(profile)?
        .bounds()
        .extent(PROFILE_NORMAL);
    if extent > config.planarity_tolerance {
        return Err(InputShapeError::ProfileNotPlanar { extent }.into());
    }

    let (r, pc) = reference_radius(&*kernel, cross, Vec3::new(0.0, 0.0, cz))?;
    let levels = level_table(&*kernel, profile, config.num_levels)?;
    info!(reference_radius = r, levels = levels.len(), "lattice levels computed");

    let mut scope = KernelScope::new(kernel);
    let recenter = Transform::translation(Vec3::new(0.0, 0.0, -cz));
    let squash = Transform::scaling(Vec3::new(1.0, 1.0, config.ring_vertical_scale));
    let ring_stations = PipeStation::constant(config.ring_radius);

    let mut rings = Vec::with_capacity(levels.len());
    let mut anchors = Vec::with_capacity(levels.len());
    for level in &levels {
        let k = level.radius / r;
        let section = scope.transform_curve_copy(
            cross,
            &Transform::scaling(Vec3::new(k, k, 1.0)).then(&recenter),
        )?;
        let ring = scope.sweep_pipe(&section, &ring_stations, PipeCap::None)?;
        scope.transform_solid(
            &ring,
            &Transform::translation(Vec3::new(0.0, 0.0, level.z)).then(&squash),
        )?;
        scope.delete_curve(section)?;
        rings.push(ring);
        anchors.push(anchor_point(pc, r, level, config.num_sides));
    }

    let strut_stations = PipeStation::constant(config.strut_radius);
    let mut strand = Vec::with_capacity(anchors.len().saturating_sub(1));
    for pair in anchors.windows(2) {
        let rail = scope.add_line(pair[0], pair[1])?;
        let strut = scope.sweep_pipe(&rail, &strut_stations, PipeCap::Flat)?;
        scope.delete_curve(rail)?;
        strand.push(strut);
    }

    let mut copies = Vec::with_capacity(strand.len() * config.num_sides.saturating_sub(1));
    for j in 1..config.num_sides {
        let angle = 360.0 * j as f64 / config.num_sides as f64;
        let rotation = Transform::rotation_about_axis(angle, Vec3::Z, Vec3::ZERO);
        for strut in &strand {
            copies.push(scope.transform_solid_copy(strut, &rotation)?);
        }
    }
    let mut struts = strand;
    struts.extend(copies);

    let outputs = LatticeSolids { rings, struts };
    let finals: Vec<_> = outputs.rings.iter().chain(outputs.struts.iter()).collect();
    scope.select_solids(&finals)?;
    scope.commit(&outputs.ids());

    info!(
        rings = outputs.rings.len(),
        struts = outputs.struts.len(),
        "lattice generated"
    );
    Ok(outputs)
}

/// Acquire the two curves through `picker` and build the lattice.
/// Returns `Ok(None)` when the user cancels the curve prompts.
#[instrument(skip(kernel, picker))]
pub fn generate_lattice(
    kernel: &mut dyn Kernel,
    picker: &mut dyn CurvePicker,
    config: &LatticeConfig,
) -> Result<Option<LatticeSolids>, OpError> {
    let Some(curves) = acquire_curves(&*kernel, picker)? else {
        return Ok(None);
    };
    build_lattice(kernel, &curves.profile, &curves.cross_section, config).map(Some)
}
