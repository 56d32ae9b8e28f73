//! The 8-corner box descriptor consumed by the kernel's box primitive.

use serde::{Deserialize, Serialize};

use super::transform::BoundingBox;
use super::vector::Vec3;

/// Eight ordered corners of an axis-aligned box.
///
/// Bottom face `(x0,y0,z0) (x1,y0,z0) (x1,y1,z0) (x0,y1,z0)`, then the top
/// face in the same order, where `(x0,y0,z0)` is the component-wise minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub corners: [Vec3; 8],
}

impl BoxSpec {
    /// Box spanned by two opposite corners given in any order.
    pub fn from_corners(p0: Vec3, p1: Vec3) -> Self {
        Self::from_bounds(&BoundingBox::new(p0.min(&p1), p0.max(&p1)))
    }

    /// Box of size `extents` centered on `center`.
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let p0 = Vec3::axpy(-0.5, &extents, &center);
        let p1 = Vec3::axpy(0.5, &extents, &center);
        Self::from_corners(p0, p1)
    }

    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        Self {
            corners: bounds.corners(),
        }
    }

    /// Min/max reduction over all 8 corners.
    ///
    /// Works on corner lists returned by a kernel whatever their order.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.corners)
    }

    pub fn min(&self) -> Vec3 {
        self.bounds().min
    }

    pub fn max(&self) -> Vec3 {
        self.bounds().max
    }

    /// True when every extent is strictly positive.
    pub fn has_volume(&self) -> bool {
        let size = self.bounds().size();
        size.x > 0.0 && size.y > 0.0 && size.z > 0.0
    }
}
