//! Multi-knuckle hinge: two interlocking leaves and a capped pin.
//!
//! The hinge axis is +Z through the origin. The right leaf's paddle sits at
//! +X, offset to the knuckle's outer wall at `y = knuckle_radius`; the left
//! leaf is its mirror image across the YZ plane.

use geom_types::{BoxSpec, Vec3};
use serde::{Deserialize, Serialize};
use solid_kernel::{Kernel, SolidHandle};
use tracing::{debug, info, instrument, warn};

use crate::params::{collect_params, ParamSource, ParamSpec, ParamValue};
use crate::scope::KernelScope;
use crate::types::{HingeSolids, OpError};

/// User-facing hinge parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HingeParameters {
    pub num_knuckles: u32,
    pub knuckle_height: f64,
    pub knuckle_radius: f64,
    pub thickness: f64,
    pub leaf_length: f64,
    /// Clearance between moving parts.
    pub gap: f64,
    pub add_vents: bool,
}

impl Default for HingeParameters {
    fn default() -> Self {
        Self {
            num_knuckles: 3,
            knuckle_height: 20.0,
            knuckle_radius: 5.0,
            thickness: 2.0,
            leaf_length: 40.0,
            gap: 0.25,
            add_vents: true,
        }
    }
}

/// Quantities derived from [`HingeParameters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HingeDimensions {
    pub hinge_height: f64,
    pub pin_radius: f64,
    pub cap_radius: f64,
    pub cap_height: f64,
    /// Axial bore through the knuckle.
    pub pin_hole_radius: f64,
    /// Clearance pockets for the pin caps.
    pub end_hole_radius: f64,
    pub end_hole_height: f64,
    /// Half of the square knuckle cutter's side.
    pub band_half_width: f64,
    pub vent_height: f64,
    pub vent_half_width: f64,
}

impl HingeParameters {
    /// Prompt list used by [`default_hinge`], in argument order.
    pub fn param_specs(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::integer("Number of knuckles", i64::from(self.num_knuckles)),
            ParamSpec::real("Height of knuckle", self.knuckle_height),
            ParamSpec::real("Radius of knuckle", self.knuckle_radius),
            ParamSpec::real("Thickness", self.thickness),
            ParamSpec::real("Length of leaf", self.leaf_length),
            ParamSpec::real("Gap width", self.gap),
            ParamSpec::boolean("Add vents?", self.add_vents),
        ]
    }

    /// Build parameters from answers to [`param_specs`](Self::param_specs).
    pub fn from_values(values: &[ParamValue]) -> Result<Self, OpError> {
        let [count, height, radius, thickness, length, gap, vents] = values else {
            return Err(OpError::InvalidParameter {
                reason: format!("expected 7 hinge parameters, got {}", values.len()),
            });
        };
        let real = |v: &ParamValue, name: &str| {
            v.as_real().ok_or_else(|| OpError::InvalidParameter {
                reason: format!("{name} must be a number, got {v:?}"),
            })
        };
        let count = count.as_integer().ok_or_else(|| OpError::InvalidParameter {
            reason: format!("number of knuckles must be an integer, got {count:?}"),
        })?;
        let num_knuckles = u32::try_from(count)
            .map_err(|_| OpError::config(format!("number of knuckles must be positive, got {count}")))?;
        Ok(Self {
            num_knuckles,
            knuckle_height: real(height, "knuckle height")?,
            knuckle_radius: real(radius, "knuckle radius")?,
            thickness: real(thickness, "thickness")?,
            leaf_length: real(length, "leaf length")?,
            gap: real(gap, "gap")?,
            add_vents: vents.as_bool().ok_or_else(|| OpError::InvalidParameter {
                reason: format!("add vents must be a boolean, got {vents:?}"),
            })?,
        })
    }

    /// Validate and compute every derived quantity.
    pub fn derive(&self) -> Result<HingeDimensions, OpError> {
        if self.num_knuckles == 0 {
            return Err(OpError::config("number of knuckles must be at least 1"));
        }
        for (name, value) in [
            ("knuckle height", self.knuckle_height),
            ("knuckle radius", self.knuckle_radius),
            ("thickness", self.thickness),
            ("leaf length", self.leaf_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OpError::config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return Err(OpError::config(format!(
                "gap must be non-negative, got {}",
                self.gap
            )));
        }

        let hinge_height = f64::from(self.num_knuckles) * self.knuckle_height;
        let pin_radius = self.knuckle_radius - (self.gap + self.thickness);
        let cap_radius = self.knuckle_radius - 0.5 * self.thickness - self.gap;
        if pin_radius <= 0.0 {
            return Err(OpError::config(format!(
                "pin radius {pin_radius} is not positive; knuckle radius must exceed thickness + gap"
            )));
        }
        if cap_radius <= 0.0 {
            return Err(OpError::config(format!(
                "cap radius {cap_radius} is not positive; knuckle radius must exceed thickness/2 + gap"
            )));
        }
        let vent_height = self.knuckle_height - 4.0 * self.thickness;
        if self.add_vents && vent_height <= 0.0 {
            return Err(OpError::config(format!(
                "vent height {vent_height} is not positive; knuckle height must exceed 4 * thickness"
            )));
        }

        Ok(HingeDimensions {
            hinge_height,
            pin_radius,
            cap_radius,
            cap_height: self.thickness,
            pin_hole_radius: self.knuckle_radius - self.thickness,
            end_hole_radius: cap_radius + self.gap,
            end_hole_height: self.thickness + self.gap,
            band_half_width: self.knuckle_radius + self.gap,
            vent_height,
            vent_half_width: pin_radius + self.gap,
        })
    }
}

/// Which leaf a cutter is subtracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafSide {
    Left,
    Right,
}

impl LeafSide {
    pub fn opposite(self) -> Self {
        match self {
            LeafSide::Left => LeafSide::Right,
            LeafSide::Right => LeafSide::Left,
        }
    }
}

/// One knuckle band and the leaf it is cut away from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnuckleBand {
    pub index: usize,
    /// Nominal band bounds, `index * knuckle_height` and one band higher.
    pub z0: f64,
    pub z1: f64,
    /// Cutter bounds: interior boundaries pushed half a gap into the neighbor.
    pub cut_z0: f64,
    pub cut_z1: f64,
    /// Leaf losing its knuckle material in this band.
    pub cut: LeafSide,
}

impl KnuckleBand {
    pub fn mid_z(&self) -> f64 {
        0.5 * (self.z0 + self.z1)
    }
}

/// Partition the hinge height into knuckle bands. Even bands cut the left
/// leaf, odd bands the right.
pub fn knuckle_bands(params: &HingeParameters) -> Vec<KnuckleBand> {
    let n = params.num_knuckles as usize;
    let half_gap = 0.5 * params.gap;
    let mut z0 = 0.0;
    (0..n)
        .map(|index| {
            let z1 = z0 + params.knuckle_height;
            let band = KnuckleBand {
                index,
                z0,
                z1,
                cut_z0: if index == 0 { z0 } else { z0 - half_gap },
                cut_z1: if index + 1 == n { z1 } else { z1 + half_gap },
                cut: if index % 2 == 0 {
                    LeafSide::Left
                } else {
                    LeafSide::Right
                },
            };
            z0 += params.knuckle_height;
            band
        })
        .collect()
}

/// Square cutter removing a whole knuckle band.
pub fn band_box(band: &KnuckleBand, dims: &HingeDimensions) -> BoxSpec {
    let s = dims.band_half_width;
    BoxSpec::from_corners(
        Vec3::new(-s, -s, band.cut_z0),
        Vec3::new(s, s, band.cut_z1),
    )
}

/// Vent window centered in the band, cut from the leaf that keeps the band.
pub fn vent_box(band: &KnuckleBand, dims: &HingeDimensions) -> BoxSpec {
    let center = Vec3::new(0.0, 0.0, band.mid_z());
    let extents = Vec3::new(
        2.0 * dims.band_half_width,
        2.0 * dims.vent_half_width,
        dims.vent_height,
    );
    BoxSpec::from_center_extents(center, extents)
}

/// Build the hinge. Nothing is left in the kernel if any step fails.
#[instrument(skip(kernel))]
pub fn build_hinge(
    kernel: &mut dyn Kernel,
    params: &HingeParameters,
) -> Result<HingeSolids, OpError> {
    let result = assemble(kernel, params);
    if let Err(err) = &result {
        warn!(%err, "hinge generation aborted");
    }
    result
}

fn assemble(kernel: &mut dyn Kernel, params: &HingeParameters) -> Result<HingeSolids, OpError> {
    let dims = params.derive()?;
    info!(
        hinge_height = dims.hinge_height,
        pin_radius = dims.pin_radius,
        cap_radius = dims.cap_radius,
        "derived hinge dimensions"
    );

    let origin = Vec3::ZERO;
    let h = dims.hinge_height;
    let mut scope = KernelScope::new(kernel);

    // pin with end caps
    let shaft = scope.create_cylinder(origin, h, dims.pin_radius)?;
    let cap_bottom = scope.create_cylinder(origin, dims.cap_height, dims.cap_radius)?;
    let cap_top = scope.create_cylinder(
        Vec3::new(0.0, 0.0, h - dims.cap_height),
        dims.cap_height,
        dims.cap_radius,
    )?;
    let pin = scope.boolean_union(vec![shaft, cap_bottom, cap_top])?;

    // right leaf: knuckle plus paddle, minus bore and cap pockets
    let knuckle = scope.create_cylinder(origin, h, params.knuckle_radius)?;
    let paddle = scope.create_box(&BoxSpec::from_corners(
        Vec3::new(0.0, params.knuckle_radius, 0.0),
        Vec3::new(
            params.leaf_length,
            params.knuckle_radius - params.thickness,
            h,
        ),
    ))?;
    let base = scope.boolean_union(vec![knuckle, paddle])?;

    let bore = scope.create_cylinder(origin, h, dims.pin_hole_radius)?;
    let pocket_bottom =
        scope.create_cylinder(origin, dims.end_hole_height, dims.end_hole_radius)?;
    let pocket_top = scope.create_cylinder(
        Vec3::new(0.0, 0.0, h - dims.end_hole_height),
        dims.end_hole_height,
        dims.end_hole_radius,
    )?;
    let right_leaf = scope.difference_single(base, vec![bore, pocket_bottom, pocket_top])?;

    let left_leaf = scope.mirror(&right_leaf, origin, Vec3::X)?;

    let mut left_cutters = Vec::new();
    let mut right_cutters = Vec::new();
    for band in knuckle_bands(params) {
        debug!(
            band = band.index,
            cut_z0 = band.cut_z0,
            cut_z1 = band.cut_z1,
            cut = ?band.cut,
            "knuckle band"
        );
        let cutter = scope.create_box(&band_box(&band, &dims))?;
        push_cutter(&mut left_cutters, &mut right_cutters, band.cut, cutter);
        if params.add_vents {
            let vent = scope.create_box(&vent_box(&band, &dims))?;
            push_cutter(&mut left_cutters, &mut right_cutters, band.cut.opposite(), vent);
        }
    }

    let left_leaf = cut_leaf(&mut scope, left_leaf, left_cutters)?;
    let right_leaf = cut_leaf(&mut scope, right_leaf, right_cutters)?;

    let outputs = HingeSolids {
        left_leaf,
        right_leaf,
        pin,
    };
    let finals = [&outputs.left_leaf, &outputs.right_leaf, &outputs.pin];
    scope.merge_all_faces(&finals)?;
    scope.select_solids(&finals)?;
    scope.commit(&outputs.ids());

    info!(num_knuckles = params.num_knuckles, "hinge generated");
    Ok(outputs)
}

fn push_cutter(
    left: &mut Vec<SolidHandle>,
    right: &mut Vec<SolidHandle>,
    side: LeafSide,
    cutter: SolidHandle,
) {
    match side {
        LeafSide::Left => left.push(cutter),
        LeafSide::Right => right.push(cutter),
    }
}

/// Subtract all cutters in one Boolean; a leaf with no cutters is kept as is.
fn cut_leaf(
    scope: &mut KernelScope<'_>,
    leaf: SolidHandle,
    cutters: Vec<SolidHandle>,
) -> Result<SolidHandle, OpError> {
    if cutters.is_empty() {
        return Ok(leaf);
    }
    Ok(scope.difference_single(leaf, cutters)?)
}

/// Prompt for the seven hinge parameters, starting from the defaults, and
/// build the hinge. Returns `Ok(None)` when a prompt is cancelled.
#[instrument(skip_all)]
pub fn default_hinge(
    kernel: &mut dyn Kernel,
    source: &mut dyn ParamSource,
) -> Result<Option<HingeSolids>, OpError> {
    let specs = HingeParameters::default().param_specs();
    let Some(values) = collect_params(&specs, source)? else {
        return Ok(None);
    };
    let params = HingeParameters::from_values(&values)?;
    build_hinge(kernel, &params).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_dimensions() {
        let dims = HingeParameters::default().derive().unwrap();
        assert_relative_eq!(dims.hinge_height, 60.0);
        assert_relative_eq!(dims.pin_radius, 2.75);
        // 5 - 0.5 * 2 - 0.25
        assert_relative_eq!(dims.cap_radius, 3.75);
        assert_relative_eq!(dims.pin_hole_radius, 3.0);
        assert_relative_eq!(dims.end_hole_radius, 4.0);
        assert_relative_eq!(dims.end_hole_height, 2.25);
        assert_relative_eq!(dims.vent_height, 12.0);
        assert_relative_eq!(dims.vent_half_width, 3.0);
    }

    #[test]
    fn test_non_positive_pin_radius_rejected() {
        let params = HingeParameters {
            knuckle_radius: 2.0,
            thickness: 2.0,
            ..HingeParameters::default()
        };
        assert!(matches!(params.derive(), Err(OpError::Configuration { .. })));
    }

    #[test]
    fn test_zero_gap_pin_fills_bore() {
        let params = HingeParameters {
            gap: 0.0,
            ..HingeParameters::default()
        };
        let dims = params.derive().unwrap();
        assert_relative_eq!(dims.pin_radius, 3.0);
        assert_relative_eq!(dims.pin_radius, dims.pin_hole_radius);
        assert_relative_eq!(dims.end_hole_radius, dims.cap_radius);
        assert_relative_eq!(dims.band_half_width, params.knuckle_radius);
    }

    #[test]
    fn test_zero_knuckles_rejected() {
        let params = HingeParameters {
            num_knuckles: 0,
            ..HingeParameters::default()
        };
        assert!(matches!(params.derive(), Err(OpError::Configuration { .. })));
    }

    #[test]
    fn test_vent_height_only_checked_with_vents() {
        let mut params = HingeParameters {
            knuckle_height: 6.0,
            ..HingeParameters::default()
        };
        assert!(params.derive().is_err());
        params.add_vents = false;
        assert!(params.derive().is_ok());
    }

    #[test]
    fn test_band_extensions() {
        let params = HingeParameters {
            num_knuckles: 4,
            gap: 0.5,
            ..HingeParameters::default()
        };
        let bands = knuckle_bands(&params);
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0].cut_z0, 0.0);
        assert_eq!(bands[3].cut_z1, 80.0);
        assert_relative_eq!(bands[0].cut_z1, 20.25);
        assert_relative_eq!(bands[1].cut_z0, 19.75);
        let sides: Vec<_> = bands.iter().map(|b| b.cut).collect();
        assert_eq!(
            sides,
            vec![LeafSide::Left, LeafSide::Right, LeafSide::Left, LeafSide::Right]
        );
    }

    #[test]
    fn test_vent_box_centered_in_band() {
        let params = HingeParameters::default();
        let dims = params.derive().unwrap();
        let band = knuckle_bands(&params)[1];
        let bb = vent_box(&band, &dims).bounds();
        assert_relative_eq!(bb.min.z, 24.0);
        assert_relative_eq!(bb.max.z, 36.0);
        assert_relative_eq!(bb.max.y, 3.0);
        assert_relative_eq!(bb.max.x, 5.25);
    }

    #[test]
    fn test_from_values_rejects_short_list() {
        assert!(matches!(
            HingeParameters::from_values(&[ParamValue::Integer(3)]),
            Err(OpError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_from_values_negative_count() {
        let mut values: Vec<ParamValue> = HingeParameters::default()
            .param_specs()
            .into_iter()
            .map(|s| s.default)
            .collect();
        values[0] = ParamValue::Integer(-2);
        assert!(matches!(
            HingeParameters::from_values(&values),
            Err(OpError::Configuration { .. })
        ));
    }
}
