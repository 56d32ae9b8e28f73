//! Workbench: fluent API for scripting generator runs in tests.
//!
//! Owns a `MockKernel` and refers to curves and generated parts by name, so a
//! scenario reads as a sequence of document edits rather than handle juggling.

use std::collections::BTreeMap;

use generator_ops::{
    build_hinge, build_lattice, collect_params, generate_lattice, level_table, HingeParameters,
    HingeSolids, LatticeConfig, LatticeSolids, Level, ParamSource, SelectedObject,
};
use geom_types::Vec3;
use solid_kernel::{CurveHandle, Kernel, MockKernel, ObjectId, OpKind};
use tracing::debug;

use crate::helpers::*;
use crate::oracle::{self, OracleVerdict};

/// A generated hinge together with the parameters that produced it.
#[derive(Debug)]
pub struct HingeRecord {
    pub params: HingeParameters,
    pub solids: HingeSolids,
}

/// A generated lattice. `levels` is known whenever the profile was
/// identifiable before generation.
#[derive(Debug)]
pub struct LatticeRecord {
    pub config: LatticeConfig,
    pub levels: Option<Vec<Level>>,
    pub solids: LatticeSolids,
}

/// A fluent builder for driving the generators against a mock kernel.
#[derive(Debug)]
pub struct Workbench {
    pub(crate) kernel: MockKernel,
    curves: BTreeMap<String, CurveHandle>,
    /// Curves whose handle was handed to a picker; they stay in the kernel.
    released: BTreeMap<String, ObjectId>,
    pub(crate) hinges: BTreeMap<String, HingeRecord>,
    pub(crate) lattices: BTreeMap<String, LatticeRecord>,
    history: Vec<(String, String)>,
    pub(crate) errors: Vec<(String, String)>,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbench {
    pub fn new() -> Self {
        Self {
            kernel: MockKernel::new(),
            curves: BTreeMap::new(),
            released: BTreeMap::new(),
            hinges: BTreeMap::new(),
            lattices: BTreeMap::new(),
            history: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Schedule the `n`-th kernel call of `kind` to fail.
    pub fn fail_nth(&mut self, kind: OpKind, n: usize) -> &mut Self {
        self.kernel.fail_nth(kind, n);
        self
    }

    // ── Curves ──────────────────────────────────────────────────────────

    /// Add an open or closed polyline through `points`.
    pub fn polyline(&mut self, name: &str, points: &[Vec3]) -> Result<&mut Self, HarnessError> {
        self.check_name_available(name)?;
        let handle = self.kernel.add_polyline(points)?;
        self.insert_curve(name, handle, format!("{} points", points.len()))
    }

    /// Add a YZ-plane profile through `(radius, z)` samples.
    pub fn profile(&mut self, name: &str, samples: &[(f64, f64)]) -> Result<&mut Self, HarnessError> {
        self.polyline(name, &profile_points(samples))
    }

    pub fn circle(&mut self, name: &str, radius: f64, z: f64) -> Result<&mut Self, HarnessError> {
        self.check_name_available(name)?;
        let handle = circle_on_axis(&mut self.kernel, radius, z)?;
        self.insert_curve(name, handle, format!("circle r={radius} z={z}"))
    }

    pub fn ellipse(&mut self, name: &str, a: f64, b: f64, z: f64) -> Result<&mut Self, HarnessError> {
        self.check_name_available(name)?;
        let handle = ellipse_on_axis(&mut self.kernel, a, b, z)?;
        self.insert_curve(name, handle, format!("ellipse {a}x{b} z={z}"))
    }

    /// Closed regular polygon centered on the Z axis.
    pub fn polygon(
        &mut self,
        name: &str,
        sides: usize,
        radius: f64,
        z: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.polyline(name, &polygon_points(sides, radius, z))
    }

    pub fn curve(&self, name: &str) -> Result<&CurveHandle, HarnessError> {
        self.curves.get(name).ok_or_else(|| HarnessError::CurveNotFound {
            name: name.to_string(),
        })
    }

    // ── Generators ──────────────────────────────────────────────────────

    /// Build a hinge with explicit parameters.
    pub fn hinge(
        &mut self,
        name: &str,
        params: HingeParameters,
    ) -> Result<&HingeSolids, HarnessError> {
        self.check_name_available(name)?;
        match build_hinge(&mut self.kernel, &params) {
            Ok(solids) => Ok(self.insert_hinge(name, params, solids)),
            Err(e) => Err(self.record_error(name, e.into())),
        }
    }

    /// Build a hinge from parameters collected through `source`.
    /// Returns `Ok(None)` when the source cancels.
    pub fn hinge_interactive(
        &mut self,
        name: &str,
        source: &mut dyn ParamSource,
    ) -> Result<Option<&HingeSolids>, HarnessError> {
        self.check_name_available(name)?;
        let specs = HingeParameters::default().param_specs();
        let params = match collect_params(&specs, source)
            .and_then(|values| values.map(|v| HingeParameters::from_values(&v)).transpose())
        {
            Ok(Some(params)) => params,
            Ok(None) => {
                self.history.push(("hinge".into(), format!("{name}: cancelled")));
                return Ok(None);
            }
            Err(e) => return Err(self.record_error(name, e.into())),
        };
        self.hinge(name, params).map(Some)
    }

    /// Build a lattice from two named curves.
    pub fn lattice(
        &mut self,
        name: &str,
        profile: &str,
        cross_section: &str,
        config: LatticeConfig,
    ) -> Result<&LatticeSolids, HarnessError> {
        self.check_name_available(name)?;
        let missing = |name: &str| HarnessError::CurveNotFound {
            name: name.to_string(),
        };
        let profile_handle = self.curves.get(profile).ok_or_else(|| missing(profile))?;
        let cross_handle = self
            .curves
            .get(cross_section)
            .ok_or_else(|| missing(cross_section))?;
        let levels = level_table(&self.kernel, profile_handle, config.num_levels).ok();
        match build_lattice(&mut self.kernel, profile_handle, cross_handle, &config) {
            Ok(solids) => Ok(self.insert_lattice(name, config, levels, solids)),
            Err(e) => Err(self.record_error(name, e.into())),
        }
    }

    /// Build a lattice through the curve acquisition flow.
    ///
    /// Curves named in `preselected` form the document selection; `picks`
    /// answers the prompts in order, `None` meaning the user cancelled. Every
    /// curve named here has its handle moved into the picker.
    pub fn lattice_interactive(
        &mut self,
        name: &str,
        preselected: &[&str],
        picks: &[Option<&str>],
        config: LatticeConfig,
    ) -> Result<Option<&LatticeSolids>, HarnessError> {
        self.check_name_available(name)?;
        let mut levels = None;
        let mut picker = ScriptedPicker::new();
        for curve_name in preselected {
            let handle = self.release_curve(curve_name, &mut levels, config.num_levels)?;
            picker = picker.preselect(SelectedObject::Curve(handle));
        }
        for pick in picks {
            let handle = match pick {
                Some(curve_name) => {
                    Some(self.release_curve(curve_name, &mut levels, config.num_levels)?)
                }
                None => None,
            };
            picker = picker.then_pick(handle);
        }
        match generate_lattice(&mut self.kernel, &mut picker, &config) {
            Ok(Some(solids)) => Ok(Some(self.insert_lattice(name, config, levels, solids))),
            Ok(None) => {
                self.history.push(("lattice".into(), format!("{name}: cancelled")));
                Ok(None)
            }
            Err(e) => Err(self.record_error(name, e.into())),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn hinge_record(&self, name: &str) -> Result<&HingeRecord, HarnessError> {
        self.hinges.get(name).ok_or_else(|| HarnessError::ResultNotFound {
            name: name.to_string(),
        })
    }

    pub fn lattice_record(&self, name: &str) -> Result<&LatticeRecord, HarnessError> {
        self.lattices.get(name).ok_or_else(|| HarnessError::ResultNotFound {
            name: name.to_string(),
        })
    }

    pub fn kernel(&self) -> &MockKernel {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut MockKernel {
        &mut self.kernel
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    /// Every object the workbench knows about: curves first, then parts.
    pub fn expected_objects(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.curves.values().map(CurveHandle::id).collect();
        ids.extend(self.released.values().copied());
        for record in self.hinges.values() {
            ids.extend(record.solids.ids());
        }
        for record in self.lattices.values() {
            ids.extend(record.solids.ids());
        }
        ids
    }

    // ── Inline Assertions ───────────────────────────────────────────────

    pub fn assert_no_errors(&self) -> Result<&Self, HarnessError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(HarnessError::AssertionFailed {
                detail: format!("expected no errors, got {}: {:?}", self.errors.len(), self.errors),
            })
        }
    }

    /// Useful for negative testing.
    pub fn assert_has_errors(&self) -> Result<&Self, HarnessError> {
        if self.errors.is_empty() {
            Err(HarnessError::AssertionFailed {
                detail: "expected errors, but none found".to_string(),
            })
        } else {
            Ok(self)
        }
    }

    /// The kernel holds exactly the objects the workbench knows about.
    pub fn assert_no_leaks(&self) -> Result<&Self, HarnessError> {
        let verdict = oracle::check_no_leaks(&self.kernel, &self.expected_objects());
        if verdict.passed {
            Ok(self)
        } else {
            Err(HarnessError::OracleFailure {
                oracle: verdict.oracle_name,
                detail: verdict.detail,
            })
        }
    }

    // ── Oracle Integration ──────────────────────────────────────────────

    pub fn check_hinge(&self, name: &str, tol: f64) -> Result<Vec<OracleVerdict>, HarnessError> {
        let record = self.hinge_record(name)?;
        Ok(vec![
            oracle::check_pin_dimensions(&self.kernel, &record.solids, &record.params, tol),
            oracle::check_leaves_mirrored(&self.kernel, &record.solids, tol),
        ])
    }

    /// Lattice oracles. Ring radii are only checked for circular sections,
    /// where the outer extent is known in closed form.
    pub fn check_lattice(
        &self,
        name: &str,
        circular_section: bool,
        tol: f64,
    ) -> Result<Vec<OracleVerdict>, HarnessError> {
        let record = self.lattice_record(name)?;
        let mut verdicts = vec![oracle::check_lattice_counts(&record.solids, &record.config)];
        if let Some(levels) = &record.levels {
            verdicts.push(oracle::check_ring_heights(
                &self.kernel,
                &record.solids,
                levels,
                &record.config,
                tol,
            ));
            if circular_section {
                verdicts.push(oracle::check_ring_radii(
                    &self.kernel,
                    &record.solids,
                    levels,
                    &record.config,
                    tol,
                ));
            }
        }
        Ok(verdicts)
    }

    // ── Internal Helpers ────────────────────────────────────────────────

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        let taken = self.curves.contains_key(name)
            || self.released.contains_key(name)
            || self.hinges.contains_key(name)
            || self.lattices.contains_key(name);
        if taken {
            Err(HarnessError::DuplicateName {
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn insert_curve(
        &mut self,
        name: &str,
        handle: CurveHandle,
        detail: String,
    ) -> Result<&mut Self, HarnessError> {
        self.history.push(("curve".into(), format!("{name}: {detail}")));
        debug!(curve = name, id = handle.raw(), "added curve");
        self.curves.insert(name.to_string(), handle);
        Ok(self)
    }

    fn insert_hinge(
        &mut self,
        name: &str,
        params: HingeParameters,
        solids: HingeSolids,
    ) -> &HingeSolids {
        self.history.push((
            "hinge".into(),
            format!("{name}: {} knuckles", params.num_knuckles),
        ));
        &self
            .hinges
            .entry(name.to_string())
            .or_insert(HingeRecord { params, solids })
            .solids
    }

    fn insert_lattice(
        &mut self,
        name: &str,
        config: LatticeConfig,
        levels: Option<Vec<Level>>,
        solids: LatticeSolids,
    ) -> &LatticeSolids {
        self.history.push((
            "lattice".into(),
            format!(
                "{name}: {} rings, {} struts",
                solids.rings.len(),
                solids.struts.len()
            ),
        ));
        &self
            .lattices
            .entry(name.to_string())
            .or_insert(LatticeRecord {
                config,
                levels,
                solids,
            })
            .solids
    }

    /// Move a named curve's handle out for a picker. The first open curve
    /// seen is taken as the profile and its level table is computed first.
    fn release_curve(
        &mut self,
        name: &str,
        levels: &mut Option<Vec<Level>>,
        num_levels: usize,
    ) -> Result<CurveHandle, HarnessError> {
        let handle = self
            .curves
            .remove(name)
            .ok_or_else(|| HarnessError::CurveNotFound {
                name: name.to_string(),
            })?;
        if levels.is_none() && !self.kernel.is_curve_closed(&handle).unwrap_or(true) {
            *levels = level_table(&self.kernel, &handle, num_levels).ok();
        }
        self.released.insert(name.to_string(), handle.id());
        Ok(handle)
    }

    fn record_error(&mut self, name: &str, err: HarnessError) -> HarnessError {
        debug!(part = name, error = %err, "generator run failed");
        self.errors.push((name.to_string(), err.to_string()));
        err
    }
}
