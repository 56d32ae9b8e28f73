//! Kernel contract for the knuckle-lattice generators, plus a deterministic
//! in-memory implementation used by tests and the scenario harness.

pub mod curve_geom;
pub mod mock_kernel;
pub mod traits;
pub mod types;

pub use curve_geom::{CurveSegment, MockCurve};
pub use mock_kernel::{MockKernel, MockShape, MockSolid};
pub use traits::*;
pub use types::*;
