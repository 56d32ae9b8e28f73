//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail instead of
//! panicking, so a scenario can collect every failure in one pass.

use generator_ops::{HingeParameters, HingeSolids, LatticeConfig, LatticeSolids, Level};
use geom_types::Axis;
use solid_kernel::{MockKernel, ObjectId};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

// ── Ownership Oracles ───────────────────────────────────────────────────────

/// Every live kernel object must be in `expected` and vice versa.
pub fn check_no_leaks(kernel: &MockKernel, expected: &[ObjectId]) -> OracleVerdict {
    let live = kernel.live_objects();
    let leaked: Vec<_> = live.iter().filter(|id| !expected.contains(id)).collect();
    let missing: Vec<_> = expected.iter().filter(|id| !live.contains(id)).collect();
    if leaked.is_empty() && missing.is_empty() {
        OracleVerdict::pass("no_leaks", format!("{} live objects, all accounted for", live.len()))
    } else {
        OracleVerdict::fail(
            "no_leaks",
            format!("leaked {leaked:?}, missing {missing:?}"),
        )
        .with_value(leaked.len() as f64)
    }
}

/// The kernel's current selection must be exactly `expected`, in order.
pub fn check_selection(kernel: &MockKernel, expected: &[ObjectId]) -> OracleVerdict {
    if kernel.selected() == expected {
        OracleVerdict::pass("selection", format!("{} objects selected", expected.len()))
    } else {
        OracleVerdict::fail(
            "selection",
            format!("expected {expected:?}, got {:?}", kernel.selected()),
        )
    }
}

// ── Hinge Oracles ───────────────────────────────────────────────────────────

/// Pin spans the full hinge height; its widest part is the end caps.
pub fn check_pin_dimensions(
    kernel: &MockKernel,
    hinge: &HingeSolids,
    params: &HingeParameters,
    tol: f64,
) -> OracleVerdict {
    let name = "pin_dimensions";
    let dims = match params.derive() {
        Ok(d) => d,
        Err(e) => return OracleVerdict::fail(name, format!("parameters invalid: {e}")),
    };
    let Some(bb) = kernel.bounds(&hinge.pin) else {
        return OracleVerdict::fail(name, "pin does not exist".into());
    };
    let height = bb.extent(Axis::Z);
    let radius = 0.5 * bb.extent(Axis::X);
    if close(height, dims.hinge_height, tol) && close(radius, dims.cap_radius, tol) {
        OracleVerdict::pass(name, format!("height {height}, radius {radius}")).with_value(radius)
    } else {
        OracleVerdict::fail(
            name,
            format!(
                "expected height {} cap radius {}, got height {height} radius {radius}",
                dims.hinge_height, dims.cap_radius
            ),
        )
        .with_value(radius)
    }
}

/// The left leaf is a reflection of the right leaf and its bounds mirror the
/// right leaf's across the YZ plane.
pub fn check_leaves_mirrored(kernel: &MockKernel, hinge: &HingeSolids, tol: f64) -> OracleVerdict {
    let name = "leaves_mirrored";
    let (Some(left_solid), Some(right_solid)) =
        (kernel.solid(&hinge.left_leaf), kernel.solid(&hinge.right_leaf))
    else {
        return OracleVerdict::fail(name, "a leaf does not exist".into());
    };
    if !left_solid.placement.is_orientation_reversing()
        || right_solid.placement.is_orientation_reversing()
    {
        return OracleVerdict::fail(name, "left leaf is not a reflection of the right leaf".into());
    }
    let (left, right) = (left_solid.bounds, right_solid.bounds);
    let ok = close(left.min.x, -right.max.x, tol)
        && close(left.max.x, -right.min.x, tol)
        && close(left.min.y, right.min.y, tol)
        && close(left.max.y, right.max.y, tol)
        && close(left.min.z, right.min.z, tol)
        && close(left.max.z, right.max.z, tol);
    if ok {
        OracleVerdict::pass(name, format!("left x [{}, {}]", left.min.x, left.max.x))
    } else {
        OracleVerdict::fail(name, format!("left {left:?} vs right {right:?}"))
    }
}

// ── Lattice Oracles ─────────────────────────────────────────────────────────

/// `num_levels` rings and `(num_levels - 1) * num_sides` struts.
pub fn check_lattice_counts(lattice: &LatticeSolids, config: &LatticeConfig) -> OracleVerdict {
    let name = "lattice_counts";
    let (rings, struts) = (lattice.rings.len(), lattice.struts.len());
    if rings == config.ring_count() && struts == config.strut_count() {
        OracleVerdict::pass(name, format!("{rings} rings, {struts} struts"))
    } else {
        OracleVerdict::fail(
            name,
            format!(
                "expected {} rings and {} struts, got {rings} and {struts}",
                config.ring_count(),
                config.strut_count()
            ),
        )
    }
}

/// Each ring is centered at its level height with the squashed tube height.
pub fn check_ring_heights(
    kernel: &MockKernel,
    lattice: &LatticeSolids,
    levels: &[Level],
    config: &LatticeConfig,
    tol: f64,
) -> OracleVerdict {
    let name = "ring_heights";
    if lattice.rings.len() != levels.len() {
        return OracleVerdict::fail(
            name,
            format!("{} rings for {} levels", lattice.rings.len(), levels.len()),
        );
    }
    let half_height = config.ring_radius * config.ring_vertical_scale;
    for (ring, level) in lattice.rings.iter().zip(levels) {
        let Some(bb) = kernel.bounds(ring) else {
            return OracleVerdict::fail(name, format!("ring {} does not exist", level.index));
        };
        let center = bb.center().z;
        let half = 0.5 * bb.extent(Axis::Z);
        if !close(center, level.z, tol) || !close(half, half_height, tol) {
            return OracleVerdict::fail(
                name,
                format!(
                    "ring {}: center z {center} half height {half}, expected {} and {half_height}",
                    level.index, level.z
                ),
            );
        }
    }
    OracleVerdict::pass(name, format!("{} rings at their levels", levels.len()))
}

/// For a circular cross-section the ring's outer radius is the level radius
/// plus the tube radius.
pub fn check_ring_radii(
    kernel: &MockKernel,
    lattice: &LatticeSolids,
    levels: &[Level],
    config: &LatticeConfig,
    tol: f64,
) -> OracleVerdict {
    let name = "ring_radii";
    let mut worst: f64 = 0.0;
    for (ring, level) in lattice.rings.iter().zip(levels) {
        let Some(bb) = kernel.bounds(ring) else {
            return OracleVerdict::fail(name, format!("ring {} does not exist", level.index));
        };
        let outer = 0.5 * bb.extent(Axis::X);
        let expected = level.radius + config.ring_radius;
        worst = worst.max((outer - expected).abs());
        if !close(outer, expected, tol) {
            return OracleVerdict::fail(
                name,
                format!("ring {}: outer radius {outer}, expected {expected}", level.index),
            )
            .with_value(worst);
        }
    }
    OracleVerdict::pass(name, format!("max deviation {worst:e}")).with_value(worst)
}
