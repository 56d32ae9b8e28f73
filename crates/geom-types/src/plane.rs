use serde::{Deserialize, Serialize};

use super::vector::Vec3;

/// An oriented plane: origin, unit normal and an in-plane x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Vec3,
    pub normal: Vec3,
    pub x_axis: Vec3,
}

impl Plane {
    /// Build a plane from an origin, a normal and a hint for the x axis.
    ///
    /// The hint is projected into the plane; when it is parallel to the
    /// normal a perpendicular axis is picked instead. Returns `None` for a
    /// zero-length normal.
    pub fn from_normal(origin: Vec3, normal: Vec3, x_hint: Vec3) -> Option<Self> {
        let normal = normal.normalized()?;
        let projected = x_hint - normal * x_hint.dot(&normal);
        let x_axis = match projected.normalized() {
            Some(x) => x,
            None => {
                let fallback = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
                fallback.cross(&normal).normalized()?
            }
        };
        Some(Self {
            origin,
            normal,
            x_axis,
        })
    }

    /// Horizontal plane at height `z`, normal +Z.
    pub fn horizontal(z: f64) -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, z),
            normal: Vec3::Z,
            x_axis: Vec3::X,
        }
    }

    pub fn y_axis(&self) -> Vec3 {
        self.normal.cross(&self.x_axis)
    }

    /// Signed distance from the plane along its normal.
    pub fn signed_distance(&self, p: &Vec3) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }
}
