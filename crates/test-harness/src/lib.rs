//! Test harness for the knuckle-hinge and lattice generators.
//!
//! Scripts generator runs against the mock kernel, checks the results with
//! geometric oracles, and produces text diagnostics.
//!
//! # Key Components
//!
//! - [`Workbench`]: fluent API for building named curves and parts
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`report`]: text reports of a session
//! - [`helpers`]: fixture curves and scripted pickers and parameter sources
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::{HarnessError, ScriptedParams, ScriptedPicker};
pub use oracle::OracleVerdict;
pub use report::GenerationReport;
pub use workflow::{HingeRecord, LatticeRecord, Workbench};
