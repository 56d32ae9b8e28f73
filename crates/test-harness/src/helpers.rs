//! Helper functions: error type, fixture curves, scripted collaborators.

use std::collections::VecDeque;

use generator_ops::{CurvePicker, OpError, ParamAnswer, ParamSource, ParamSpec, SelectedObject};
use geom_types::{Transform, Vec3};
use solid_kernel::{CurveHandle, KernelError, MockCurve, MockKernel};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("curve not found: {name}")]
    CurveNotFound { name: String },

    #[error("no result named: {name}")]
    ResultNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("generator error: {0}")]
    Generator(#[from] OpError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },
}

// ── Fixture Curves ──────────────────────────────────────────────────────────

/// Profile polyline in the YZ plane through `(radius, z)` pairs.
pub fn profile_points(samples: &[(f64, f64)]) -> Vec<Vec3> {
    samples
        .iter()
        .map(|&(radius, z)| Vec3::new(0.0, radius, z))
        .collect()
}

/// A lamp-shade silhouette: wide at the bottom, waisted, flared at the top.
pub fn lamp_profile() -> Vec<Vec3> {
    profile_points(&[(6.0, 0.0), (4.5, 8.0), (3.5, 14.0), (5.0, 21.0)])
}

/// Closed axis-aligned rectangle in the horizontal plane at `z`.
pub fn rectangle_points(half_x: f64, half_y: f64, z: f64) -> Vec<Vec3> {
    vec![
        Vec3::new(-half_x, -half_y, z),
        Vec3::new(half_x, -half_y, z),
        Vec3::new(half_x, half_y, z),
        Vec3::new(-half_x, half_y, z),
        Vec3::new(-half_x, -half_y, z),
    ]
}

/// Closed regular polygon with `sides` vertices in the plane `z`.
pub fn polygon_points(sides: usize, radius: f64, z: f64) -> Vec<Vec3> {
    let mut points: Vec<Vec3> = (0..sides)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / sides as f64;
            Vec3::new(radius * a.cos(), radius * a.sin(), z)
        })
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

/// Horizontal circle of `radius` centered on the Z axis at height `z`.
pub fn circle_on_axis(kernel: &mut MockKernel, radius: f64, z: f64) -> Result<CurveHandle, KernelError> {
    kernel.add_circle(Vec3::new(0.0, 0.0, z), Vec3::Z, radius)
}

/// Horizontal ellipse with semi-axes `a` (X) and `b` (Y) at height `z`.
pub fn ellipse_on_axis(
    kernel: &mut MockKernel,
    a: f64,
    b: f64,
    z: f64,
) -> Result<CurveHandle, KernelError> {
    let unit = MockCurve::circle(Vec3::ZERO, Vec3::Z, 1.0).ok_or_else(|| KernelError::Other {
        message: "unit circle construction failed".into(),
    })?;
    let placement = Transform::translation(Vec3::new(0.0, 0.0, z))
        .then(&Transform::scaling(Vec3::new(a, b, 1.0)));
    Ok(kernel.add_curve(unit.transformed(&placement)))
}

// ── Scripted Collaborators ──────────────────────────────────────────────────

/// A [`CurvePicker`] that replays a fixed selection and pick sequence and
/// records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    selection: Vec<SelectedObject>,
    picks: VecDeque<Option<CurveHandle>>,
    pub prompts: Vec<String>,
}

impl ScriptedPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preselect(mut self, object: SelectedObject) -> Self {
        self.selection.push(object);
        self
    }

    /// Queue the answer to the next prompt; `None` cancels.
    pub fn then_pick(mut self, curve: Option<CurveHandle>) -> Self {
        self.picks.push_back(curve);
        self
    }
}

impl CurvePicker for ScriptedPicker {
    fn take_selection(&mut self) -> Vec<SelectedObject> {
        std::mem::take(&mut self.selection)
    }

    fn pick_curve(&mut self, prompt: &str) -> Option<CurveHandle> {
        self.prompts.push(prompt.to_string());
        self.picks.pop_front().flatten()
    }
}

/// A [`ParamSource`] answering prompts in order; `None` entries cancel and an
/// exhausted script falls back to defaults.
#[derive(Debug, Default)]
pub struct ScriptedParams {
    answers: VecDeque<Option<ParamAnswer>>,
    pub prompts: Vec<String>,
}

impl ScriptedParams {
    pub fn new(answers: impl IntoIterator<Item = Option<ParamAnswer>>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }
}

impl ParamSource for ScriptedParams {
    fn ask(&mut self, spec: &ParamSpec) -> Option<ParamAnswer> {
        self.prompts.push(spec.prompt.clone());
        match self.answers.pop_front() {
            Some(answer) => answer,
            None => Some(ParamAnswer::Value(spec.default)),
        }
    }
}
