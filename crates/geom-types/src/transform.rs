use serde::{Deserialize, Serialize};

use super::vector::{Axis, Vec3};

/// A 4x4 affine transformation matrix stored in column-major order.
///
/// Transforms compose as matrix products: `a.then(&b)` is `a * b`, so the
/// result applies `b` first and `a` second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Column-major 4x4 matrix entries.
    pub m: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    pub fn translation(v: Vec3) -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            v.x, v.y, v.z, 1.0,
        ];
        Self { m }
    }

    /// Non-uniform scale about the origin.
    pub fn scaling(s: Vec3) -> Self {
        #[rustfmt::skip]
        let m = [
            s.x, 0.0, 0.0, 0.0,
            0.0, s.y, 0.0, 0.0,
            0.0, 0.0, s.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    /// Rotation by `angle_deg` degrees about `axis` through `center`
    /// (Rodrigues' formula, right-handed).
    ///
    /// A zero-length axis yields the identity.
    pub fn rotation_about_axis(angle_deg: f64, axis: Vec3, center: Vec3) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::identity();
        };
        let angle = angle_deg.to_radians();
        let c = angle.cos();
        let s = angle.sin();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        #[rustfmt::skip]
        let m = [
            t*x*x + c,     t*x*y + s*z,   t*x*z - s*y,   0.0,
            t*x*y - s*z,   t*y*y + c,     t*y*z + s*x,   0.0,
            t*x*z + s*y,   t*y*z - s*x,   t*z*z + c,     0.0,
            0.0,           0.0,           0.0,           1.0,
        ];
        let rotation = Self { m };
        Self::translation(center)
            .then(&rotation)
            .then(&Self::translation(-center))
    }

    /// Reflection across the plane through `origin` with normal `normal`.
    ///
    /// A zero-length normal yields the identity.
    pub fn mirror(origin: Vec3, normal: Vec3) -> Self {
        let Some(n) = normal.normalized() else {
            return Self::identity();
        };
        // p' = p - 2((p - o).n) n
        let d = 2.0 * origin.dot(&n);
        #[rustfmt::skip]
        let m = [
            1.0 - 2.0*n.x*n.x, -2.0*n.y*n.x,      -2.0*n.z*n.x,      0.0,
            -2.0*n.x*n.y,      1.0 - 2.0*n.y*n.y, -2.0*n.z*n.y,      0.0,
            -2.0*n.x*n.z,      -2.0*n.y*n.z,      1.0 - 2.0*n.z*n.z, 0.0,
            d*n.x,             d*n.y,             d*n.z,             1.0,
        ];
        Self { m }
    }

    /// Matrix element access (row, col), 0-indexed.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    /// Transform a point (applies translation).
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        let x = self.at(0, 0) * p.x + self.at(0, 1) * p.y + self.at(0, 2) * p.z + self.at(0, 3);
        let y = self.at(1, 0) * p.x + self.at(1, 1) * p.y + self.at(1, 2) * p.z + self.at(1, 3);
        let z = self.at(2, 0) * p.x + self.at(2, 1) * p.y + self.at(2, 2) * p.z + self.at(2, 3);
        Vec3::new(x, y, z)
    }

    /// Transform a vector (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let x = self.at(0, 0) * v.x + self.at(0, 1) * v.y + self.at(0, 2) * v.z;
        let y = self.at(1, 0) * v.x + self.at(1, 1) * v.y + self.at(1, 2) * v.z;
        let z = self.at(2, 0) * v.x + self.at(2, 1) * v.y + self.at(2, 2) * v.z;
        Vec3::new(x, y, z)
    }

    /// Compose two transforms: self * other.
    pub fn then(&self, other: &Transform) -> Transform {
        let mut result = [0.0f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(row, k) * other.at(k, col);
                }
                result[col * 4 + row] = sum;
            }
        }
        Transform { m: result }
    }

    /// Determinant of the linear 3x3 part.
    fn linear_determinant(&self) -> f64 {
        let a = |r, c| self.at(r, c);
        a(0, 0) * (a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1))
            - a(0, 1) * (a(1, 0) * a(2, 2) - a(1, 2) * a(2, 0))
            + a(0, 2) * (a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0))
    }

    /// True for reflections: the transform flips handedness.
    pub fn is_orientation_reversing(&self) -> bool {
        self.linear_determinant() < 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.min.lerp(&self.max, 0.5)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Extent along a single axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max[axis] - self.min[axis]
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vec3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// The 8 corners, bottom face first.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// Smallest box containing the transformed corners of this one.
    pub fn transformed(&self, xform: &Transform) -> Self {
        if !self.is_valid() {
            return *self;
        }
        let corners: Vec<Vec3> = self
            .corners()
            .iter()
            .map(|c| xform.transform_point(c))
            .collect();
        Self::from_points(&corners)
    }
}
