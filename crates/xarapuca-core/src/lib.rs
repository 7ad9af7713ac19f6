//! # X-ARAPUCA Core
//!
//! Core types shared by the layout engine crates:
//! - Error taxonomy (configuration, layout, sampling, toolkit)
//! - Axes, quarter-turn rotations and extent helpers
//! - Material and optical-surface descriptors handed to the external toolkit
//! - Typed parameter sets with per-variant parameter tables

pub mod error;
pub mod material;
pub mod params;
pub mod units;

pub use error::{ConfigError, Error, LayoutError, Result, SamplingError, ToolkitError};
pub use material::{Material, OpticalSurface, SurfaceFinish, SurfaceKind, SurfaceModel};
pub use params::{ParamKind, ParamSpec, ParamValue, ParameterSet};
pub use units::{Axis, Point3D, Rotation, Vec3};
