use solid_kernel::{CurveHandle, KernelError, ObjectId, SolidHandle};

/// Final output of the hinge generator. Ownership of all three solids has
/// been handed to the caller's document.
#[derive(Debug)]
pub struct HingeSolids {
    pub left_leaf: SolidHandle,
    pub right_leaf: SolidHandle,
    pub pin: SolidHandle,
}

impl HingeSolids {
    pub fn ids(&self) -> [ObjectId; 3] {
        [self.left_leaf.id(), self.right_leaf.id(), self.pin.id()]
    }
}

/// Final output of the lattice generator.
#[derive(Debug)]
pub struct LatticeSolids {
    /// One ring per level, bottom to top.
    pub rings: Vec<SolidHandle>,
    /// Struts ordered copy-major: the base strand first, then each rotated copy.
    pub struts: Vec<SolidHandle>,
}

impl LatticeSolids {
    pub fn ids(&self) -> Vec<ObjectId> {
        self.rings
            .iter()
            .chain(self.struts.iter())
            .map(SolidHandle::id)
            .collect()
    }
}

/// The two curves a lattice is generated from.
#[derive(Debug)]
pub struct CurvePair {
    /// Open silhouette curve in the YZ plane.
    pub profile: CurveHandle,
    /// Closed rib section in the XY plane.
    pub cross_section: CurveHandle,
}

/// Problems with the curves handed to the lattice generator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputShapeError {
    #[error("cross section curve should be planar in XY plane (Z extent {extent:e})")]
    CrossSectionNotPlanar { extent: f64 },

    #[error("profile curve should be planar in YZ plane (X extent {extent:e})")]
    ProfileNotPlanar { extent: f64 },

    #[error("cross section curve must be closed")]
    CrossSectionNotClosed,

    #[error("cross section passes through its center (reference radius {radius:e})")]
    DegenerateCrossSection { radius: f64 },

    #[error("bad intersection at z = {z}: {points} point and {overlaps} overlap events")]
    BadIntersection {
        z: f64,
        points: usize,
        overlaps: usize,
    },

    #[error("profile reaches the axis at level {index} (z = {z})")]
    ZeroLevelRadius { index: usize, z: f64 },
}

/// Errors from the generators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpError {
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("bad input curve: {0}")]
    InputShape(#[from] InputShapeError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

impl OpError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        OpError::Configuration {
            reason: reason.into(),
        }
    }
}
