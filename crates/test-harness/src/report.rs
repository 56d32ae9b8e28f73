//! Structured text reports of a workbench session.
//!
//! Reports are plain text rather than JSON; they are meant to be pasted into a
//! failing test's output and read.

use std::fmt;

use geom_types::BoundingBox;
use solid_kernel::{MockKernel, OpKind, SolidHandle};

use crate::oracle::OracleVerdict;
use crate::workflow::Workbench;

/// A complete session report.
pub struct GenerationReport {
    pub part_entries: Vec<PartEntry>,
    /// Kernel calls by kind, in order of first use.
    pub op_counts: Vec<(OpKind, usize)>,
    pub curve_count: usize,
    pub bounding_box: Option<BoundingBox>,
    pub oracle_results: Vec<OracleVerdict>,
    pub errors: Vec<(String, String)>,
}

/// One generated part.
pub struct PartEntry {
    pub name: String,
    pub generator: String,
    pub detail: String,
    /// Labelled solids, e.g. `lamp/ring[3]`.
    pub solids: Vec<(String, Option<BoundingBox>)>,
}

impl GenerationReport {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Generation Report ===\n\n");

        let solid_total: usize = self.part_entries.iter().map(|p| p.solids.len()).sum();
        out.push_str(&format!(
            "Parts ({} parts, {} solids, {} curves, {} errors):\n",
            self.part_entries.len(),
            solid_total,
            self.curve_count,
            self.errors.len(),
        ));
        for part in &self.part_entries {
            out.push_str(&format!("  {} \"{}\"\n", part.generator, part.name));
            if !part.detail.is_empty() {
                out.push_str(&format!("      {}\n", part.detail));
            }
            for (label, bounds) in &part.solids {
                match bounds {
                    Some(bb) => out.push_str(&format!(
                        "      {}: ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})\n",
                        label, bb.min.x, bb.min.y, bb.min.z, bb.max.x, bb.max.y, bb.max.z,
                    )),
                    None => out.push_str(&format!("      {label}: MISSING\n")),
                }
            }
        }

        if !self.op_counts.is_empty() {
            out.push_str("\nKernel Calls:\n");
            for (kind, count) in &self.op_counts {
                out.push_str(&format!("  {kind:?}: {count}\n"));
            }
        }

        if let Some(bb) = &self.bounding_box {
            out.push_str(&format!(
                "\nBounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
                bb.min.x, bb.min.y, bb.min.z, bb.max.x, bb.max.y, bb.max.z,
            ));
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        if self.errors.is_empty() {
            out.push_str("\nErrors: none\n");
        } else {
            out.push_str(&format!("\nErrors ({}):\n", self.errors.len()));
            for (part, msg) in &self.errors {
                out.push_str(&format!("  {part}: {msg}\n"));
            }
        }

        out
    }

    /// True when every oracle passed and no generator failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.oracle_results.iter().all(|v| v.passed)
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

const ORACLE_TOL: f64 = 1e-6;

impl Workbench {
    /// Generate a report covering every part, with all applicable oracles run.
    pub fn report(&self) -> GenerationReport {
        let mut part_entries = Vec::new();
        let mut oracle_results = Vec::new();
        let mut overall: Option<BoundingBox> = None;

        let mut label = |kernel: &MockKernel, name: String, handle: &SolidHandle| {
            let bounds = kernel.bounds(handle);
            if let Some(bb) = &bounds {
                overall = Some(match &overall {
                    Some(acc) => acc.union(bb),
                    None => *bb,
                });
            }
            (name, bounds)
        };

        for (name, record) in &self.hinges {
            let p = &record.params;
            let solids = vec![
                label(&self.kernel, format!("{name}/left_leaf"), &record.solids.left_leaf),
                label(&self.kernel, format!("{name}/right_leaf"), &record.solids.right_leaf),
                label(&self.kernel, format!("{name}/pin"), &record.solids.pin),
            ];
            part_entries.push(PartEntry {
                name: name.clone(),
                generator: "Hinge".into(),
                detail: format!(
                    "{} knuckles x {:.3}, radius {:.3}, thickness {:.3}, leaf {:.3}, gap {:.3}, vents {}",
                    p.num_knuckles,
                    p.knuckle_height,
                    p.knuckle_radius,
                    p.thickness,
                    p.leaf_length,
                    p.gap,
                    if p.add_vents { "yes" } else { "no" },
                ),
                solids,
            });
            if let Ok(checks) = self.check_hinge(name, ORACLE_TOL) {
                oracle_results.extend(checks);
            }
        }

        for (name, record) in &self.lattices {
            let c = &record.config;
            let mut solids = Vec::new();
            for (i, ring) in record.solids.rings.iter().enumerate() {
                solids.push(label(&self.kernel, format!("{name}/ring[{i}]"), ring));
            }
            for (i, strut) in record.solids.struts.iter().enumerate() {
                solids.push(label(&self.kernel, format!("{name}/strut[{i}]"), strut));
            }
            part_entries.push(PartEntry {
                name: name.clone(),
                generator: "Lattice".into(),
                detail: format!(
                    "{} levels x {} sides, strut {:.3}, ring {:.3} (vertical x{:.2})",
                    c.num_levels, c.num_sides, c.strut_radius, c.ring_radius, c.ring_vertical_scale,
                ),
                solids,
            });
            if let Ok(checks) = self.check_lattice(name, false, ORACLE_TOL) {
                oracle_results.extend(checks);
            }
        }

        let mut op_counts: Vec<(OpKind, usize)> = Vec::new();
        for kind in self.kernel.log() {
            match op_counts.iter_mut().find(|(k, _)| k == kind) {
                Some((_, count)) => *count += 1,
                None => op_counts.push((*kind, 1)),
            }
        }

        GenerationReport {
            part_entries,
            op_counts,
            curve_count: self.kernel.curve_count(),
            bounding_box: overall,
            oracle_results,
            errors: self.errors.clone(),
        }
    }
}
