//! Exact curve geometry backing `MockKernel` curves.
//!
//! A curve is a chain of segments, each a straight line or an elliptical arc
//! (`center + u cos θ + v sin θ`). Both stay exact under affine transforms,
//! so scaled copies of circles remain analytically queryable.
//! Segment `i` owns the global parameter interval `[i, i + 1]`.

use std::f64::consts::TAU;

use geom_types::{BoundingBox, Plane, Transform, Vec3};

use crate::types::{IntersectionEvent, IntersectionKind};

/// Distance below which a point counts as lying on a plane.
const PLANE_TOL: f64 = 1e-10;
/// Points closer than this are reported once.
const MERGE_TOL: f64 = 1e-9;
const ARC_SAMPLES: usize = 512;
const REFINE_ITERATIONS: usize = 100;

/// One segment of a mock curve.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSegment {
    Line {
        start: Vec3,
        end: Vec3,
    },
    Arc {
        center: Vec3,
        u: Vec3,
        v: Vec3,
        start_angle: f64,
        end_angle: f64,
    },
}

impl CurveSegment {
    /// Point at local parameter `s` in `[0, 1]`.
    pub fn point_at(&self, s: f64) -> Vec3 {
        match self {
            CurveSegment::Line { start, end } => start.lerp(end, s),
            CurveSegment::Arc {
                center,
                u,
                v,
                start_angle,
                end_angle,
            } => {
                let theta = start_angle + s * (end_angle - start_angle);
                *center + *u * theta.cos() + *v * theta.sin()
            }
        }
    }

    pub fn start(&self) -> Vec3 {
        self.point_at(0.0)
    }

    pub fn end(&self) -> Vec3 {
        self.point_at(1.0)
    }

    pub fn transformed(&self, xform: &Transform) -> Self {
        match self {
            CurveSegment::Line { start, end } => CurveSegment::Line {
                start: xform.transform_point(start),
                end: xform.transform_point(end),
            },
            CurveSegment::Arc {
                center,
                u,
                v,
                start_angle,
                end_angle,
            } => CurveSegment::Arc {
                center: xform.transform_point(center),
                u: xform.transform_vector(u),
                v: xform.transform_vector(v),
                start_angle: *start_angle,
                end_angle: *end_angle,
            },
        }
    }

    /// Exact axis-aligned bounds.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            CurveSegment::Line { start, end } => BoundingBox::from_points(&[*start, *end]),
            CurveSegment::Arc {
                center,
                u,
                v,
                start_angle,
                end_angle,
            } => {
                let mut bb = BoundingBox::from_points(&[self.start(), self.end()]);
                let span = end_angle - start_angle;
                for (uk, vk) in [(u.x, v.x), (u.y, v.y), (u.z, v.z)] {
                    if uk == 0.0 && vk == 0.0 {
                        continue;
                    }
                    // d/dθ (uk cos θ + vk sin θ) = 0
                    let extreme = vk.atan2(uk);
                    for theta in [extreme, extreme + std::f64::consts::PI] {
                        let rel = (theta - start_angle).rem_euclid(TAU);
                        if rel <= span {
                            let p = *center + *u * theta.cos() + *v * theta.sin();
                            bb.expand_to_include(&p);
                        }
                    }
                }
                bb
            }
        }
    }

    /// Local parameter of the point closest to `p`.
    pub fn closest(&self, p: &Vec3) -> f64 {
        match self {
            CurveSegment::Line { start, end } => {
                let dir = *end - *start;
                let len_sq = dir.length_squared();
                if len_sq < 1e-30 {
                    return 0.0;
                }
                ((*p - *start).dot(&dir) / len_sq).clamp(0.0, 1.0)
            }
            CurveSegment::Arc { .. } => {
                let dist = |s: f64| self.point_at(s).distance_to(p);
                let step = 1.0 / ARC_SAMPLES as f64;
                let mut best = 0;
                let mut best_d = dist(0.0);
                for i in 1..=ARC_SAMPLES {
                    let d = dist(i as f64 * step);
                    if d < best_d {
                        best = i;
                        best_d = d;
                    }
                }
                // golden-section refinement inside the bracketing samples
                let mut lo = (best as f64 - 1.0).max(0.0) * step;
                let mut hi = (best as f64 + 1.0).min(ARC_SAMPLES as f64) * step;
                let ratio = 0.5 * (5.0_f64.sqrt() - 1.0);
                for _ in 0..REFINE_ITERATIONS {
                    let a = hi - ratio * (hi - lo);
                    let b = lo + ratio * (hi - lo);
                    if dist(a) < dist(b) {
                        hi = b;
                    } else {
                        lo = a;
                    }
                }
                let refined = 0.5 * (lo + hi);
                if dist(refined) < best_d {
                    refined
                } else {
                    best as f64 * step
                }
            }
        }
    }

    /// Local parameters where the segment crosses `plane`, or `None` when the
    /// whole segment lies in the plane.
    fn plane_roots(&self, plane: &Plane) -> Option<Vec<f64>> {
        let f = |s: f64| plane.signed_distance(&self.point_at(s));
        match self {
            CurveSegment::Line { .. } => {
                let (d0, d1) = (f(0.0), f(1.0));
                let on0 = d0.abs() <= PLANE_TOL;
                let on1 = d1.abs() <= PLANE_TOL;
                if on0 && on1 {
                    return None;
                }
                let mut roots = Vec::new();
                if on0 {
                    roots.push(0.0);
                } else if on1 {
                    roots.push(1.0);
                } else if d0 * d1 < 0.0 {
                    roots.push(d0 / (d0 - d1));
                }
                Some(roots)
            }
            CurveSegment::Arc { .. } => {
                let step = 1.0 / ARC_SAMPLES as f64;
                let values: Vec<f64> = (0..=ARC_SAMPLES).map(|i| f(i as f64 * step)).collect();
                if values.iter().all(|d| d.abs() <= PLANE_TOL) {
                    return None;
                }
                let mut roots = Vec::new();
                for i in 0..=ARC_SAMPLES {
                    let s = i as f64 * step;
                    if values[i].abs() <= PLANE_TOL {
                        roots.push(s);
                    } else if i < ARC_SAMPLES
                        && values[i + 1].abs() > PLANE_TOL
                        && values[i] * values[i + 1] < 0.0
                    {
                        let (mut lo, mut hi) = (s, s + step);
                        let mut f_lo = values[i];
                        for _ in 0..REFINE_ITERATIONS {
                            let mid = 0.5 * (lo + hi);
                            let f_mid = f(mid);
                            if f_lo * f_mid <= 0.0 {
                                hi = mid;
                            } else {
                                lo = mid;
                                f_lo = f_mid;
                            }
                        }
                        roots.push(0.5 * (lo + hi));
                    }
                }
                Some(roots)
            }
        }
    }
}

/// A chain of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCurve {
    pub segments: Vec<CurveSegment>,
}

impl MockCurve {
    pub fn line(start: Vec3, end: Vec3) -> Self {
        Self {
            segments: vec![CurveSegment::Line { start, end }],
        }
    }

    /// Polyline through `points`; `None` with fewer than two points.
    pub fn polyline(points: &[Vec3]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let segments = points
            .windows(2)
            .map(|w| CurveSegment::Line {
                start: w[0],
                end: w[1],
            })
            .collect();
        Some(Self { segments })
    }

    /// Full circle in the plane through `center` with normal `normal`.
    pub fn circle(center: Vec3, normal: Vec3, radius: f64) -> Option<Self> {
        let plane = Plane::from_normal(center, normal, Vec3::X)?;
        Some(Self {
            segments: vec![CurveSegment::Arc {
                center,
                u: plane.x_axis * radius,
                v: plane.y_axis() * radius,
                start_angle: 0.0,
                end_angle: TAU,
            }],
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn domain(&self) -> (f64, f64) {
        (0.0, self.segments.len() as f64)
    }

    pub fn start(&self) -> Vec3 {
        self.segments.first().map(|s| s.start()).unwrap_or(Vec3::ZERO)
    }

    pub fn end(&self) -> Vec3 {
        self.segments.last().map(|s| s.end()).unwrap_or(Vec3::ZERO)
    }

    pub fn is_closed(&self) -> bool {
        !self.segments.is_empty() && self.start().distance_to(&self.end()) < MERGE_TOL
    }

    /// Split a global parameter into (segment index, local parameter).
    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.segments.len();
        let t = t.clamp(0.0, n as f64);
        let index = (t.floor() as usize).min(n.saturating_sub(1));
        (index, t - index as f64)
    }

    pub fn evaluate(&self, t: f64) -> Vec3 {
        let (index, s) = self.locate(t);
        self.segments[index].point_at(s)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.segments
            .iter()
            .fold(BoundingBox::empty(), |acc, seg| acc.union(&seg.bounds()))
    }

    /// Global parameter of the point on `segment` closest to `p`.
    pub fn closest_on_segment(&self, p: &Vec3, segment: usize) -> Option<f64> {
        let seg = self.segments.get(segment)?;
        Some(segment as f64 + seg.closest(p))
    }

    pub fn transformed(&self, xform: &Transform) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.transformed(xform)).collect(),
        }
    }

    /// Intersection events with `plane`, sorted by parameter.
    ///
    /// Crossings at segment joints (and at the seam of a closed curve) are
    /// reported once.
    pub fn intersect_plane(&self, plane: &Plane) -> Vec<IntersectionEvent> {
        let mut events: Vec<IntersectionEvent> = Vec::new();
        for (i, seg) in self.segments.iter().enumerate() {
            match seg.plane_roots(plane) {
                None => events.push(IntersectionEvent {
                    kind: IntersectionKind::Overlap,
                    point: seg.start(),
                    parameter: i as f64,
                }),
                Some(roots) => {
                    for s in roots {
                        let point = seg.point_at(s);
                        let duplicate = events.iter().any(|e| {
                            e.kind == IntersectionKind::Point && e.point.distance_to(&point) < MERGE_TOL
                        });
                        if !duplicate {
                            events.push(IntersectionEvent {
                                kind: IntersectionKind::Point,
                                point,
                                parameter: i as f64 + s,
                            });
                        }
                    }
                }
            }
        }
        events.sort_by(|a, b| a.parameter.total_cmp(&b.parameter));
        events
    }
}
