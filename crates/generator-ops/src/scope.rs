//! Scoped ownership of partially built geometry.

use std::collections::BTreeSet;

use geom_types::{BoxSpec, Transform, Vec3};
use solid_kernel::{
    CurveHandle, Kernel, KernelError, ObjectId, PipeCap, PipeStation, SolidHandle,
};
use tracing::debug;

/// Wraps a kernel for one generation run and remembers every object the run
/// creates. Objects consumed by Booleans or deleted explicitly are forgotten;
/// whatever is still tracked when the scope drops without [`commit`] is
/// discarded from the kernel.
///
/// [`commit`]: KernelScope::commit
pub struct KernelScope<'k> {
    kernel: &'k mut dyn Kernel,
    owned: BTreeSet<ObjectId>,
}

impl<'k> KernelScope<'k> {
    pub fn new(kernel: &'k mut dyn Kernel) -> Self {
        Self {
            kernel,
            owned: BTreeSet::new(),
        }
    }

    /// Read-only access for curve and bounding-box queries.
    pub fn kernel(&self) -> &dyn Kernel {
        &*self.kernel
    }

    /// Objects created in this scope and not yet consumed.
    pub fn owned(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.owned.iter().copied()
    }

    fn track_solid(&mut self, handle: SolidHandle) -> SolidHandle {
        self.owned.insert(handle.id());
        handle
    }

    fn track_curve(&mut self, handle: CurveHandle) -> CurveHandle {
        self.owned.insert(handle.id());
        handle
    }

    fn forget(&mut self, solids: &[SolidHandle]) {
        for s in solids {
            self.owned.remove(&s.id());
        }
    }

    pub fn create_cylinder(
        &mut self,
        origin: Vec3,
        height: f64,
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        let h = self.kernel.create_cylinder(origin, height, radius)?;
        Ok(self.track_solid(h))
    }

    pub fn create_box(&mut self, corners: &BoxSpec) -> Result<SolidHandle, KernelError> {
        let h = self.kernel.create_box(corners)?;
        Ok(self.track_solid(h))
    }

    pub fn add_line(&mut self, start: Vec3, end: Vec3) -> Result<CurveHandle, KernelError> {
        let h = self.kernel.add_line(start, end)?;
        Ok(self.track_curve(h))
    }

    pub fn sweep_pipe(
        &mut self,
        rail: &CurveHandle,
        stations: &[PipeStation],
        cap: PipeCap,
    ) -> Result<SolidHandle, KernelError> {
        let h = self.kernel.sweep_pipe(rail, stations, cap)?;
        Ok(self.track_solid(h))
    }

    /// Union consumes its inputs even when it fails.
    pub fn boolean_union(&mut self, solids: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        self.forget(&solids);
        let h = self.kernel.boolean_union(solids)?;
        Ok(self.track_solid(h))
    }

    pub fn boolean_difference(
        &mut self,
        targets: Vec<SolidHandle>,
        tools: Vec<SolidHandle>,
    ) -> Result<Vec<SolidHandle>, KernelError> {
        self.forget(&targets);
        self.forget(&tools);
        let results = self.kernel.boolean_difference(targets, tools)?;
        Ok(results.into_iter().map(|h| self.track_solid(h)).collect())
    }

    /// Difference that must leave exactly one solid.
    pub fn difference_single(
        &mut self,
        target: SolidHandle,
        tools: Vec<SolidHandle>,
    ) -> Result<SolidHandle, KernelError> {
        let mut results = self.boolean_difference(vec![target], tools)?;
        match results.len() {
            1 => results.pop().ok_or_else(|| KernelError::BooleanFailed {
                reason: "difference produced no solid".into(),
            }),
            n => Err(KernelError::BooleanFailed {
                reason: format!("difference produced {n} solids, expected 1"),
            }),
        }
    }

    pub fn mirror(
        &mut self,
        solid: &SolidHandle,
        plane_origin: Vec3,
        plane_normal: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        let h = self.kernel.mirror(solid, plane_origin, plane_normal)?;
        Ok(self.track_solid(h))
    }

    pub fn transform_solid_copy(
        &mut self,
        solid: &SolidHandle,
        xform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        let h = self.kernel.transform_solid_copy(solid, xform)?;
        Ok(self.track_solid(h))
    }

    pub fn transform_solid(
        &mut self,
        solid: &SolidHandle,
        xform: &Transform,
    ) -> Result<(), KernelError> {
        self.kernel.transform_solid(solid, xform)
    }

    pub fn transform_curve_copy(
        &mut self,
        curve: &CurveHandle,
        xform: &Transform,
    ) -> Result<CurveHandle, KernelError> {
        let h = self.kernel.transform_curve_copy(curve, xform)?;
        Ok(self.track_curve(h))
    }

    pub fn delete_curve(&mut self, curve: CurveHandle) -> Result<(), KernelError> {
        self.owned.remove(&curve.id());
        self.kernel.delete_curve(curve)
    }

    pub fn merge_all_faces(&mut self, solids: &[&SolidHandle]) -> Result<(), KernelError> {
        self.kernel.merge_all_faces(solids)
    }

    pub fn select_solids(&mut self, solids: &[&SolidHandle]) -> Result<(), KernelError> {
        self.kernel.select_solids(solids)
    }

    /// Keep `outputs` and release everything else this scope still owns.
    pub fn commit(mut self, outputs: &[ObjectId]) {
        for id in outputs {
            self.owned.remove(id);
        }
    }
}

impl Drop for KernelScope<'_> {
    fn drop(&mut self) {
        if self.owned.is_empty() {
            return;
        }
        let mut released = 0usize;
        for id in std::mem::take(&mut self.owned) {
            if self.kernel.discard(id) {
                released += 1;
            }
        }
        debug!(released, "released uncommitted kernel objects");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solid_kernel::{MockKernel, OpKind};

    #[test]
    fn test_drop_without_commit_discards_everything() {
        let mut kernel = MockKernel::new();
        {
            let mut scope = KernelScope::new(&mut kernel);
            scope.create_cylinder(Vec3::ZERO, 1.0, 1.0).unwrap();
            let line = scope.add_line(Vec3::ZERO, Vec3::Z).unwrap();
            scope
                .sweep_pipe(&line, &PipeStation::constant(0.1), PipeCap::Flat)
                .unwrap();
        }
        assert!(kernel.live_objects().is_empty());
    }

    #[test]
    fn test_commit_keeps_outputs_only() {
        let mut kernel = MockKernel::new();
        let kept = {
            let mut scope = KernelScope::new(&mut kernel);
            let a = scope.create_cylinder(Vec3::ZERO, 1.0, 1.0).unwrap();
            scope.create_cylinder(Vec3::X, 1.0, 1.0).unwrap();
            let id = a.id();
            scope.commit(&[id]);
            a
        };
        assert_eq!(kernel.live_objects(), vec![kept.id()]);
    }

    #[test]
    fn test_union_inputs_are_forgotten() {
        let mut kernel = MockKernel::new();
        let mut scope = KernelScope::new(&mut kernel);
        let a = scope.create_cylinder(Vec3::ZERO, 1.0, 1.0).unwrap();
        let b = scope.create_cylinder(Vec3::X, 1.0, 1.0).unwrap();
        let u = scope.boolean_union(vec![a, b]).unwrap();
        assert_eq!(scope.owned().collect::<Vec<_>>(), vec![u.id()]);
    }

    #[test]
    fn test_failed_difference_leaves_nothing_behind() {
        let mut kernel = MockKernel::new();
        kernel.fail_nth(OpKind::Difference, 1);
        {
            let mut scope = KernelScope::new(&mut kernel);
            let a = scope.create_cylinder(Vec3::ZERO, 2.0, 2.0).unwrap();
            let b = scope.create_cylinder(Vec3::ZERO, 1.0, 1.0).unwrap();
            assert!(scope.difference_single(a, vec![b]).is_err());
        }
        assert_eq!(kernel.solid_count(), 0);
    }

    #[test]
    fn test_borrowed_input_curves_survive() {
        let mut kernel = MockKernel::new();
        let input = kernel.add_circle(Vec3::ZERO, Vec3::Z, 1.0).unwrap();
        {
            let mut scope = KernelScope::new(&mut kernel);
            let copy = scope
                .transform_curve_copy(&input, &Transform::scaling(Vec3::new(2.0, 2.0, 1.0)))
                .unwrap();
            scope.delete_curve(copy).unwrap();
        }
        assert_eq!(kernel.live_objects(), vec![input.id()]);
    }
}
