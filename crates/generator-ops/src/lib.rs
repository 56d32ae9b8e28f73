pub mod hinge;
pub mod lattice;
pub mod params;
pub mod scope;
pub mod selection;
pub mod types;

pub use hinge::{
    band_box, build_hinge, default_hinge, knuckle_bands, vent_box, HingeDimensions,
    HingeParameters, KnuckleBand, LeafSide,
};
pub use lattice::{
    anchor_point, build_lattice, generate_lattice, level_parameters, level_radius, level_table,
    reference_radius, LatticeConfig, Level,
};
pub use params::{
    collect_params, DefaultParams, ParamAnswer, ParamKind, ParamSource, ParamSpec, ParamValue,
    PresetParams,
};
pub use scope::KernelScope;
pub use selection::{acquire_curves, CurvePicker, SelectedObject};
pub use types::*;
