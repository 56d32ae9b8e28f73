use geom_types::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque handle to a solid owned by whoever holds it.
///
/// Not `Clone`: a Boolean operation consumes its input handles and returns a
/// new one, so two owners can never refer to the same solid. Valid only for
/// the kernel session that produced it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SolidHandle(u64);

impl SolidHandle {
    /// Wrap a raw kernel identifier. Only kernel implementations should call this.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::Solid(self.0)
    }
}

/// Opaque handle to a curve in the kernel session.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CurveHandle(u64);

impl CurveHandle {
    /// Wrap a raw kernel identifier. Only kernel implementations should call this.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::Curve(self.0)
    }
}

/// Copyable identity of a kernel object, used for bookkeeping only.
/// Holding an `ObjectId` does not grant ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectId {
    Solid(u64),
    Curve(u64),
}

/// Kind of a plane/curve intersection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionKind {
    /// Transversal crossing at a single point.
    Point,
    /// The curve runs inside the plane over a parameter interval.
    Overlap,
}

impl IntersectionKind {
    /// Numeric event type as reported by scripting kernels: 1 = point, 2 = overlap.
    pub fn code(self) -> u8 {
        match self {
            IntersectionKind::Point => 1,
            IntersectionKind::Overlap => 2,
        }
    }
}

/// One plane/curve intersection event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEvent {
    pub kind: IntersectionKind,
    /// Intersection point (start of the interval for overlaps).
    pub point: Vec3,
    /// Curve parameter at `point`.
    pub parameter: f64,
}

/// Pipe radius at a normalized rail parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeStation {
    /// Position along the rail, 0 at the start and 1 at the end.
    pub parameter: f64,
    pub radius: f64,
}

impl PipeStation {
    /// Constant radius over the whole rail.
    pub fn constant(radius: f64) -> [PipeStation; 2] {
        [
            PipeStation {
                parameter: 0.0,
                radius,
            },
            PipeStation {
                parameter: 1.0,
                radius,
            },
        ]
    }
}

/// How the open ends of a pipe are closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipeCap {
    None,
    Flat,
    Round,
}

/// Kernel operation kinds, for operation logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Cylinder,
    Box,
    Union,
    Difference,
    Mirror,
    TransformCopy,
    TransformInPlace,
    CurveCopy,
    Line,
    Sweep,
    MergeFaces,
    Select,
    Delete,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("sweep failed: {reason}")]
    SweepFailed { reason: String },

    #[error("degenerate {primitive}: {reason}")]
    DegeneratePrimitive { primitive: String, reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: ObjectId },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}
