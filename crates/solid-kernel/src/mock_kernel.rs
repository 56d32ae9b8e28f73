//! MockKernel: deterministic test double implementing [`Kernel`].
//!
//! Solids are kept as a construction record plus exact axis-aligned bounds.
//! Curves are exact segment chains (see [`curve_geom`](crate::curve_geom)), so
//! curve queries behave like a real kernel while solid Booleans only combine
//! bounds. Every operation is logged, and any operation kind can be made to
//! fail on its n-th invocation.

use std::collections::{BTreeMap, HashMap};

use geom_types::{BoundingBox, BoxSpec, Plane, Transform, Vec3};
use tracing::{debug, info, instrument, warn};

use crate::curve_geom::MockCurve;
use crate::traits::Kernel;
use crate::types::*;

/// How a mock solid was constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum MockShape {
    Cylinder {
        origin: Vec3,
        height: f64,
        radius: f64,
    },
    Box {
        min: Vec3,
        max: Vec3,
    },
    Pipe {
        radius: f64,
        cap: PipeCap,
    },
    /// Union of `parts` input solids.
    Union {
        parts: usize,
    },
    /// Target minus tools; the tool bounds are recorded.
    Difference {
        tools: Vec<BoundingBox>,
    },
}

/// A synthetic solid.
#[derive(Debug, Clone)]
pub struct MockSolid {
    pub shape: MockShape,
    pub bounds: BoundingBox,
    /// Accumulated placement applied after construction.
    pub placement: Transform,
}

impl MockSolid {
    fn new(shape: MockShape, bounds: BoundingBox) -> Self {
        Self {
            shape,
            bounds,
            placement: Transform::identity(),
        }
    }

    fn transformed(&self, xform: &Transform) -> Self {
        Self {
            shape: self.shape.clone(),
            bounds: self.bounds.transformed(xform),
            placement: xform.then(&self.placement),
        }
    }
}

/// Deterministic test double for the solid-modeling kernel.
#[derive(Debug, Default)]
pub struct MockKernel {
    next_id: u64,
    solids: BTreeMap<u64, MockSolid>,
    curves: BTreeMap<u64, MockCurve>,
    log: Vec<OpKind>,
    fail_on: HashMap<OpKind, usize>,
    selected: Vec<ObjectId>,
    merged: usize,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Make the `n`-th (1-based) call of `kind` fail.
    pub fn fail_nth(&mut self, kind: OpKind, n: usize) {
        self.fail_on.insert(kind, n);
    }

    /// Number of live solids.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Number of live curves.
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn live_objects(&self) -> Vec<ObjectId> {
        self.curves
            .keys()
            .map(|&id| ObjectId::Curve(id))
            .chain(self.solids.keys().map(|&id| ObjectId::Solid(id)))
            .collect()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        match id {
            ObjectId::Solid(raw) => self.solids.contains_key(&raw),
            ObjectId::Curve(raw) => self.curves.contains_key(&raw),
        }
    }

    /// Operations attempted so far, in call order (failed ones included).
    pub fn log(&self) -> &[OpKind] {
        &self.log
    }

    pub fn op_count(&self, kind: OpKind) -> usize {
        self.log.iter().filter(|&&k| k == kind).count()
    }

    /// The last selection made through [`Kernel::select_solids`].
    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    /// Solids passed to `merge_all_faces` so far.
    pub fn merged_count(&self) -> usize {
        self.merged
    }

    pub fn solid(&self, handle: &SolidHandle) -> Option<&MockSolid> {
        self.solids.get(&handle.raw())
    }

    pub fn bounds(&self, handle: &SolidHandle) -> Option<BoundingBox> {
        self.solid(handle).map(|s| s.bounds)
    }

    pub fn curve(&self, handle: &CurveHandle) -> Option<&MockCurve> {
        self.curves.get(&handle.raw())
    }

    /// Register an arbitrary curve.
    pub fn add_curve(&mut self, curve: MockCurve) -> CurveHandle {
        let id = self.alloc();
        self.curves.insert(id, curve);
        CurveHandle::from_raw(id)
    }

    pub fn add_polyline(&mut self, points: &[Vec3]) -> Result<CurveHandle, KernelError> {
        let curve = MockCurve::polyline(points).ok_or_else(|| KernelError::InvalidParameter {
            reason: format!("polyline needs at least 2 points, got {}", points.len()),
        })?;
        Ok(self.add_curve(curve))
    }

    pub fn add_circle(
        &mut self,
        center: Vec3,
        normal: Vec3,
        radius: f64,
    ) -> Result<CurveHandle, KernelError> {
        if !(radius > 0.0) {
            return Err(KernelError::InvalidParameter {
                reason: format!("circle radius must be positive, got {radius}"),
            });
        }
        let curve = MockCurve::circle(center, normal, radius).ok_or_else(|| {
            KernelError::InvalidParameter {
                reason: "circle normal has zero length".into(),
            }
        })?;
        Ok(self.add_curve(curve))
    }

    fn alloc(&mut self) -> u64 {
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_solid(&mut self, solid: MockSolid) -> SolidHandle {
        let id = self.alloc();
        self.solids.insert(id, solid);
        SolidHandle::from_raw(id)
    }

    /// Log `kind` and fail if it was scheduled to.
    fn record(&mut self, kind: OpKind) -> Result<(), KernelError> {
        self.log.push(kind);
        if self.fail_on.get(&kind) == Some(&self.op_count(kind)) {
            warn!(?kind, "injected kernel failure");
            let reason = format!("injected failure on {kind:?}");
            return Err(match kind {
                OpKind::Union | OpKind::Difference => KernelError::BooleanFailed { reason },
                OpKind::Sweep => KernelError::SweepFailed { reason },
                _ => KernelError::Other { message: reason },
            });
        }
        Ok(())
    }

    fn get_solid(&self, handle: &SolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.raw())
            .ok_or(KernelError::EntityNotFound { id: handle.id() })
    }

    fn get_curve(&self, handle: &CurveHandle) -> Result<&MockCurve, KernelError> {
        self.curves
            .get(&handle.raw())
            .ok_or(KernelError::EntityNotFound { id: handle.id() })
    }

    /// Remove consumed inputs.
    fn take_solids(&mut self, handles: Vec<SolidHandle>) -> Result<Vec<MockSolid>, KernelError> {
        let mut missing = None;
        let mut taken = Vec::with_capacity(handles.len());
        for h in handles {
            match self.solids.remove(&h.raw()) {
                Some(s) => taken.push(s),
                None => missing = missing.or(Some(h.id())),
            }
        }
        match missing {
            Some(id) => Err(KernelError::EntityNotFound { id }),
            None => Ok(taken),
        }
    }
}

impl Kernel for MockKernel {
    #[instrument(skip(self))]
    fn create_cylinder(
        &mut self,
        origin: Vec3,
        height: f64,
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.record(OpKind::Cylinder)?;
        if !(radius > 0.0 && height > 0.0) || !origin.is_finite() {
            return Err(KernelError::DegeneratePrimitive {
                primitive: "cylinder".into(),
                reason: format!("radius {radius}, height {height}"),
            });
        }
        let bounds = BoundingBox::new(
            origin - Vec3::new(radius, radius, 0.0),
            origin + Vec3::new(radius, radius, height),
        );
        let handle = self.insert_solid(MockSolid::new(
            MockShape::Cylinder {
                origin,
                height,
                radius,
            },
            bounds,
        ));
        info!(id = handle.raw(), radius, height, "created cylinder");
        Ok(handle)
    }

    #[instrument(skip(self))]
    fn create_box(&mut self, corners: &BoxSpec) -> Result<SolidHandle, KernelError> {
        self.record(OpKind::Box)?;
        if !corners.has_volume() {
            return Err(KernelError::DegeneratePrimitive {
                primitive: "box".into(),
                reason: "corners span no volume".into(),
            });
        }
        let bounds = corners.bounds();
        let handle = self.insert_solid(MockSolid::new(
            MockShape::Box {
                min: bounds.min,
                max: bounds.max,
            },
            bounds,
        ));
        info!(id = handle.raw(), "created box");
        Ok(handle)
    }

    fn add_line(&mut self, start: Vec3, end: Vec3) -> Result<CurveHandle, KernelError> {
        self.record(OpKind::Line)?;
        if start.distance_to(&end) < 1e-12 {
            return Err(KernelError::DegeneratePrimitive {
                primitive: "line".into(),
                reason: "start and end coincide".into(),
            });
        }
        Ok(self.add_curve(MockCurve::line(start, end)))
    }

    #[instrument(skip(self, stations))]
    fn sweep_pipe(
        &mut self,
        rail: &CurveHandle,
        stations: &[PipeStation],
        cap: PipeCap,
    ) -> Result<SolidHandle, KernelError> {
        self.record(OpKind::Sweep)?;
        let rail_bounds = self.get_curve(rail)?.bounds();
        if stations.is_empty() || stations.iter().any(|s| !(s.radius > 0.0)) {
            return Err(KernelError::SweepFailed {
                reason: "pipe radii must be positive".into(),
            });
        }
        let radius = stations.iter().map(|s| s.radius).fold(0.0, f64::max);
        let handle = self.insert_solid(MockSolid::new(
            MockShape::Pipe { radius, cap },
            rail_bounds.expanded(radius),
        ));
        Ok(handle)
    }

    #[instrument(skip_all, fields(count = solids.len()))]
    fn boolean_union(&mut self, solids: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        let parts = solids.len();
        let taken = self.take_solids(solids);
        self.record(OpKind::Union)?;
        let taken = taken?;
        if taken.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "union of zero solids".into(),
            });
        }
        let merged = taken
            .iter()
            .fold(BoundingBox::empty(), |acc, s| acc.union(&s.bounds));
        Ok(self.insert_solid(MockSolid::new(MockShape::Union { parts }, merged)))
    }

    #[instrument(skip_all, fields(targets = targets.len(), tools = tools.len()))]
    fn boolean_difference(
        &mut self,
        targets: Vec<SolidHandle>,
        tools: Vec<SolidHandle>,
    ) -> Result<Vec<SolidHandle>, KernelError> {
        let targets = self.take_solids(targets);
        let tools = self.take_solids(tools);
        self.record(OpKind::Difference)?;
        let (targets, tools) = (targets?, tools?);
        if targets.is_empty() || tools.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "difference needs at least one target and one tool".into(),
            });
        }
        let tool_bounds: Vec<BoundingBox> = tools.iter().map(|t| t.bounds).collect();
        Ok(targets
            .into_iter()
            .map(|target| {
                // the result stays where the target was placed
                let cut = MockSolid {
                    shape: MockShape::Difference {
                        tools: tool_bounds.clone(),
                    },
                    bounds: target.bounds,
                    placement: target.placement,
                };
                self.insert_solid(cut)
            })
            .collect())
    }

    fn mirror(
        &mut self,
        solid: &SolidHandle,
        plane_origin: Vec3,
        plane_normal: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        self.record(OpKind::Mirror)?;
        if plane_normal.normalized().is_none() {
            return Err(KernelError::InvalidParameter {
                reason: "mirror plane normal has zero length".into(),
            });
        }
        let copy = self
            .get_solid(solid)?
            .transformed(&Transform::mirror(plane_origin, plane_normal));
        Ok(self.insert_solid(copy))
    }

    fn transform_solid_copy(
        &mut self,
        solid: &SolidHandle,
        xform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        self.record(OpKind::TransformCopy)?;
        let copy = self.get_solid(solid)?.transformed(xform);
        Ok(self.insert_solid(copy))
    }

    fn transform_solid(&mut self, solid: &SolidHandle, xform: &Transform) -> Result<(), KernelError> {
        self.record(OpKind::TransformInPlace)?;
        let moved = self.get_solid(solid)?.transformed(xform);
        self.solids.insert(solid.raw(), moved);
        Ok(())
    }

    fn transform_curve_copy(
        &mut self,
        curve: &CurveHandle,
        xform: &Transform,
    ) -> Result<CurveHandle, KernelError> {
        self.record(OpKind::CurveCopy)?;
        let copy = self.get_curve(curve)?.transformed(xform);
        Ok(self.add_curve(copy))
    }

    fn curve_segment_count(&self, curve: &CurveHandle) -> Result<usize, KernelError> {
        Ok(self.get_curve(curve)?.segment_count())
    }

    fn is_curve_closed(&self, curve: &CurveHandle) -> Result<bool, KernelError> {
        Ok(self.get_curve(curve)?.is_closed())
    }

    fn closest_point_on_curve(
        &self,
        curve: &CurveHandle,
        point: Vec3,
        segment: usize,
    ) -> Result<f64, KernelError> {
        let c = self.get_curve(curve)?;
        c.closest_on_segment(&point, segment)
            .ok_or_else(|| KernelError::InvalidParameter {
                reason: format!(
                    "segment {segment} out of range for curve with {} segments",
                    c.segment_count()
                ),
            })
    }

    fn evaluate_curve(&self, curve: &CurveHandle, parameter: f64) -> Result<Vec3, KernelError> {
        let c = self.get_curve(curve)?;
        let (lo, hi) = c.domain();
        if !(lo..=hi).contains(&parameter) {
            return Err(KernelError::InvalidParameter {
                reason: format!("parameter {parameter} outside [{lo}, {hi}]"),
            });
        }
        Ok(c.evaluate(parameter))
    }

    fn curve_bounding_box(&self, curve: &CurveHandle) -> Result<BoxSpec, KernelError> {
        Ok(BoxSpec::from_bounds(&self.get_curve(curve)?.bounds()))
    }

    fn solids_bounding_box(&self, solids: &[&SolidHandle]) -> Result<BoxSpec, KernelError> {
        if solids.is_empty() {
            return Err(KernelError::InvalidParameter {
                reason: "bounding box of zero solids".into(),
            });
        }
        let mut bounds = BoundingBox::empty();
        for h in solids {
            bounds = bounds.union(&self.get_solid(h)?.bounds);
        }
        Ok(BoxSpec::from_bounds(&bounds))
    }

    fn plane_curve_intersection(
        &self,
        plane: &Plane,
        curve: &CurveHandle,
    ) -> Result<Vec<IntersectionEvent>, KernelError> {
        Ok(self.get_curve(curve)?.intersect_plane(plane))
    }

    fn merge_all_faces(&mut self, solids: &[&SolidHandle]) -> Result<(), KernelError> {
        self.record(OpKind::MergeFaces)?;
        for h in solids {
            self.get_solid(h)?;
        }
        self.merged += solids.len();
        Ok(())
    }

    fn select_solids(&mut self, solids: &[&SolidHandle]) -> Result<(), KernelError> {
        self.record(OpKind::Select)?;
        for h in solids {
            self.get_solid(h)?;
        }
        self.selected = solids.iter().map(|h| h.id()).collect();
        Ok(())
    }

    fn delete_solid(&mut self, solid: SolidHandle) -> Result<(), KernelError> {
        self.record(OpKind::Delete)?;
        self.solids
            .remove(&solid.raw())
            .map(|_| ())
            .ok_or(KernelError::EntityNotFound { id: solid.id() })
    }

    fn delete_curve(&mut self, curve: CurveHandle) -> Result<(), KernelError> {
        self.record(OpKind::Delete)?;
        self.curves
            .remove(&curve.raw())
            .map(|_| ())
            .ok_or(KernelError::EntityNotFound { id: curve.id() })
    }

    fn discard(&mut self, id: ObjectId) -> bool {
        match id {
            ObjectId::Solid(raw) => self.solids.remove(&raw).is_some(),
            ObjectId::Curve(raw) => self.curves.remove(&raw).is_some(),
        }
    }
}
