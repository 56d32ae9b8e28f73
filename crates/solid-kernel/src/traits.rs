use geom_types::{BoxSpec, Plane, Transform, Vec3};

use crate::types::*;

/// Solid-modeling kernel contract consumed by the generators.
///
/// Every call is synchronous. Operations that take handles by value consume
/// them: the kernel releases the inputs whether the call succeeds or fails.
/// Implemented by [`MockKernel`](crate::MockKernel) (deterministic test double);
/// real CAD back-ends plug in behind the same trait.
pub trait Kernel {
    // ── Primitives ───────────────────────────────────────────────────────

    /// Cylinder with its base centered on `origin`, extending `height` along +Z.
    fn create_cylinder(
        &mut self,
        origin: Vec3,
        height: f64,
        radius: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Box through the 8 corners of `corners`.
    fn create_box(&mut self, corners: &BoxSpec) -> Result<SolidHandle, KernelError>;

    /// Straight line curve from `start` to `end`.
    fn add_line(&mut self, start: Vec3, end: Vec3) -> Result<CurveHandle, KernelError>;

    /// Sweep a circular section along `rail`. Radii are interpolated between
    /// stations given at normalized rail parameters.
    fn sweep_pipe(
        &mut self,
        rail: &CurveHandle,
        stations: &[PipeStation],
        cap: PipeCap,
    ) -> Result<SolidHandle, KernelError>;

    // ── Booleans ─────────────────────────────────────────────────────────

    /// Union of all inputs into one solid. Consumes the inputs.
    fn boolean_union(&mut self, solids: Vec<SolidHandle>) -> Result<SolidHandle, KernelError>;

    /// Subtract every tool from every target. Consumes targets and tools.
    fn boolean_difference(
        &mut self,
        targets: Vec<SolidHandle>,
        tools: Vec<SolidHandle>,
    ) -> Result<Vec<SolidHandle>, KernelError>;

    // ── Transforms ───────────────────────────────────────────────────────

    /// Independent mirrored copy of `solid` across the plane through
    /// `plane_origin` with normal `plane_normal`.
    fn mirror(
        &mut self,
        solid: &SolidHandle,
        plane_origin: Vec3,
        plane_normal: Vec3,
    ) -> Result<SolidHandle, KernelError>;

    fn transform_solid_copy(
        &mut self,
        solid: &SolidHandle,
        xform: &Transform,
    ) -> Result<SolidHandle, KernelError>;

    fn transform_solid(&mut self, solid: &SolidHandle, xform: &Transform)
        -> Result<(), KernelError>;

    fn transform_curve_copy(
        &mut self,
        curve: &CurveHandle,
        xform: &Transform,
    ) -> Result<CurveHandle, KernelError>;

    // ── Curve queries ────────────────────────────────────────────────────

    /// Number of segments of a (poly)curve. Plain curves have one.
    fn curve_segment_count(&self, curve: &CurveHandle) -> Result<usize, KernelError>;

    fn is_curve_closed(&self, curve: &CurveHandle) -> Result<bool, KernelError>;

    /// Parameter of the point on segment `segment` closest to `point`.
    fn closest_point_on_curve(
        &self,
        curve: &CurveHandle,
        point: Vec3,
        segment: usize,
    ) -> Result<f64, KernelError>;

    fn evaluate_curve(&self, curve: &CurveHandle, parameter: f64) -> Result<Vec3, KernelError>;

    fn curve_bounding_box(&self, curve: &CurveHandle) -> Result<BoxSpec, KernelError>;

    fn solids_bounding_box(&self, solids: &[&SolidHandle]) -> Result<BoxSpec, KernelError>;

    fn plane_curve_intersection(
        &self,
        plane: &Plane,
        curve: &CurveHandle,
    ) -> Result<Vec<IntersectionEvent>, KernelError>;

    // ── Document ─────────────────────────────────────────────────────────

    /// Cosmetic cleanup merging coplanar faces. Not part of any geometric contract.
    fn merge_all_faces(&mut self, solids: &[&SolidHandle]) -> Result<(), KernelError>;

    /// Select the final result set in the host document.
    fn select_solids(&mut self, solids: &[&SolidHandle]) -> Result<(), KernelError>;

    fn delete_solid(&mut self, solid: SolidHandle) -> Result<(), KernelError>;

    fn delete_curve(&mut self, curve: CurveHandle) -> Result<(), KernelError>;

    /// Release an object by identity. Idempotent: returns `false` when the
    /// object no longer exists.
    fn discard(&mut self, id: ObjectId) -> bool;
}
