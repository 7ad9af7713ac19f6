//! # X-ARAPUCA
//!
//! Parametric layout engine for liquid-argon photon-detection assemblies:
//! - Per-variant layout calculators (test jig, dichroic filter sandwich,
//!   dimpled plate, multi-tile X-ARAPUCA cell, dual scintillator)
//! - Per-axis feasibility validation against the container
//! - Primary-vertex sampling from named regions
//! - Placement tree construction through an external geometry toolkit
//!
//! ## Architecture
//!
//! The workspace is organized as multiple crates:
//!
//! 1. **xarapuca-core** - Errors, units, materials, typed parameter sets
//! 2. **xarapuca-geometry** - Layout calculators, validator, sampler, placement builder
//! 3. **xarapuca-settings** - TOML/JSON geometry configuration files
//! 4. **xarapuca** - Command-line binary that integrates all crates

pub mod report;

pub use xarapuca_core::{
    Axis, ConfigError, Error, LayoutError, Material, OpticalSurface, ParamSpec, ParamValue,
    ParameterSet, Point3D, Result, Rotation, SamplingError, ToolkitError, Vec3,
};

pub use xarapuca_geometry::{
    build_layout, construct, sample_vertex, ConstructOptions, ConstructionStep, DerivedLayout,
    Detector, FeasibilityReport, GeometryToolkit, RecordingToolkit, SamplingMode, VariantKind,
    VertexSampler,
};

pub use xarapuca_settings::{ConfigFormat, GeometryConfig, SamplingSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(tracing::Level::INFO, LogFormat::Pretty)
}

/// Initialize logging at `level` in the given format
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init_logging_with(level: tracing::Level, format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
