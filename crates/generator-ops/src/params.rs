//! Ordered parameter request/response.
//!
//! A generator describes the values it needs as a list of [`ParamSpec`]s and a
//! [`ParamSource`] (an interactive prompt, a preset table, a script) answers
//! them one at a time. Cancelling any prompt cancels the whole request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::OpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Integer,
    Real,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Integer(_) => ParamKind::Integer,
            ParamValue::Real(_) => ParamKind::Real,
            ParamValue::Boolean(_) => ParamKind::Boolean,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            ParamValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Integers widen to reals.
    pub fn as_real(&self) -> Option<f64> {
        match *self {
            ParamValue::Real(v) => Some(v),
            ParamValue::Integer(v) => Some(v as f64),
            ParamValue::Boolean(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Parse a typed-in answer. Booleans are spelled `True` / `False`.
    pub fn parse(kind: ParamKind, text: &str) -> Result<Self, OpError> {
        let text = text.trim();
        let bad = || OpError::InvalidParameter {
            reason: format!("cannot read {text:?} as {kind:?}"),
        };
        match kind {
            ParamKind::Integer => text.parse().map(ParamValue::Integer).map_err(|_| bad()),
            ParamKind::Real => text.parse().map(ParamValue::Real).map_err(|_| bad()),
            ParamKind::Boolean => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(ParamValue::Boolean(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(ParamValue::Boolean(false))
                } else {
                    Err(bad())
                }
            }
        }
    }
}

/// One requested parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub prompt: String,
    pub default: ParamValue,
}

impl ParamSpec {
    pub fn integer(prompt: impl Into<String>, default: i64) -> Self {
        Self {
            kind: ParamKind::Integer,
            prompt: prompt.into(),
            default: ParamValue::Integer(default),
        }
    }

    pub fn real(prompt: impl Into<String>, default: f64) -> Self {
        Self {
            kind: ParamKind::Real,
            prompt: prompt.into(),
            default: ParamValue::Real(default),
        }
    }

    pub fn boolean(prompt: impl Into<String>, default: bool) -> Self {
        Self {
            kind: ParamKind::Boolean,
            prompt: prompt.into(),
            default: ParamValue::Boolean(default),
        }
    }

    /// Check an answer against this parameter's kind.
    pub fn accept(&self, answer: ParamAnswer) -> Result<ParamValue, OpError> {
        let value = match answer {
            ParamAnswer::Value(v) => v,
            ParamAnswer::Text(text) => ParamValue::parse(self.kind, &text)?,
        };
        match (self.kind, value) {
            (ParamKind::Real, ParamValue::Integer(v)) => Ok(ParamValue::Real(v as f64)),
            (kind, v) if v.kind() == kind => Ok(v),
            (kind, v) => Err(OpError::InvalidParameter {
                reason: format!("{:?}: expected {kind:?}, got {v:?}", self.prompt),
            }),
        }
    }
}

/// A response to one prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamAnswer {
    Value(ParamValue),
    /// Free text to be parsed according to the requested kind.
    Text(String),
}

/// Something that can answer parameter prompts.
pub trait ParamSource {
    /// `None` means the user cancelled.
    fn ask(&mut self, spec: &ParamSpec) -> Option<ParamAnswer>;
}

/// Accepts every default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultParams;

impl ParamSource for DefaultParams {
    fn ask(&mut self, spec: &ParamSpec) -> Option<ParamAnswer> {
        Some(ParamAnswer::Value(spec.default))
    }
}

/// Answers keyed by prompt text; unknown prompts get their default.
#[derive(Debug, Default, Clone)]
pub struct PresetParams {
    answers: HashMap<String, ParamAnswer>,
}

impl PresetParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prompt: impl Into<String>, answer: ParamAnswer) -> Self {
        self.answers.insert(prompt.into(), answer);
        self
    }
}

impl ParamSource for PresetParams {
    fn ask(&mut self, spec: &ParamSpec) -> Option<ParamAnswer> {
        Some(
            self.answers
                .get(&spec.prompt)
                .cloned()
                .unwrap_or(ParamAnswer::Value(spec.default)),
        )
    }
}

/// Ask for every parameter in order. Returns `Ok(None)` as soon as one prompt is
/// cancelled; later prompts are not asked.
pub fn collect_params(
    specs: &[ParamSpec],
    source: &mut dyn ParamSource,
) -> Result<Option<Vec<ParamValue>>, OpError> {
    let mut values = Vec::with_capacity(specs.len());
    for spec in specs {
        let Some(answer) = source.ask(spec) else {
            debug!(prompt = %spec.prompt, "parameter prompt cancelled");
            return Ok(None);
        };
        let value = spec.accept(answer)?;
        debug!(prompt = %spec.prompt, ?value, "got parameter");
        values.push(value);
    }
    Ok(Some(values))
}
