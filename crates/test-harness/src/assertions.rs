//! Rich assertion helpers with diagnostic output.
//!
//! Every failure carries expected vs actual values and enough context to
//! locate the offending object without re-running under a debugger.

use geom_types::{Axis, BoundingBox};
use solid_kernel::{MockKernel, OpKind};

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;

/// Assert a bounding box matches expected corners within tolerance.
pub fn assert_bounds_close(
    actual: &BoundingBox,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    for axis in Axis::ALL {
        let i = axis.index();
        let (lo, hi) = (actual.min[axis], actual.max[axis]);
        if (lo - expected_min[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{ctx}] min {axis:?}: expected {:.6}, got {lo:.6} (tol={tol})",
                    expected_min[i],
                ),
            });
        }
        if (hi - expected_max[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{ctx}] max {axis:?}: expected {:.6}, got {hi:.6} (tol={tol})",
                    expected_max[i],
                ),
            });
        }
    }
    Ok(())
}

/// Assert how many solids and curves are alive in the kernel.
pub fn assert_live_count(
    kernel: &MockKernel,
    solids: usize,
    curves: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let (s, c) = (kernel.solid_count(), kernel.curve_count());
    if s == solids && c == curves {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] expected {solids} solids and {curves} curves, got {s} and {c}. Live: {:?}",
                kernel.live_objects(),
            ),
        })
    }
}

/// Assert the kernel recorded `expected` calls of `kind`.
pub fn assert_op_count(
    kernel: &MockKernel,
    kind: OpKind,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = kernel.op_count(kind);
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{ctx}] expected {expected} {kind:?} calls, got {actual}"),
        })
    }
}

/// Turn the first failing verdict into an error.
pub fn assert_verdicts_pass(verdicts: &[OracleVerdict]) -> Result<(), HarnessError> {
    match verdicts.iter().find(|v| !v.passed) {
        None => Ok(()),
        Some(v) => Err(HarnessError::OracleFailure {
            oracle: v.oracle_name.clone(),
            detail: v.detail.clone(),
        }),
    }
}
