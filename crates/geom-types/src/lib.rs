//! Value types shared by the kernel contract and the generators:
//! a fixed 3D vector, affine transforms, planes, bounding boxes and the
//! 8-corner box descriptor consumed by the kernel's box primitive.

pub mod boxspec;
pub mod plane;
pub mod transform;
pub mod vector;

pub use boxspec::BoxSpec;
pub use plane::Plane;
pub use transform::{BoundingBox, Transform};
pub use vector::{Axis, Vec3};
