//! X-ARAPUCA geometry CLI
//!
//! Usage:
//!     xarapuca params xarapuca
//!     xarapuca layout --variant dimpled_plate --set dimple_type=spherical
//!     xarapuca construct --config cell.toml
//!     xarapuca sample --config cell.toml --region window --events 1000 --seed 7

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;

use xarapuca::report::{layout_summary, overridden, params_table, write_vertices_csv};
use xarapuca::{
    build_layout, init_logging_with, GeometryConfig, LogFormat, ParamValue, RecordingToolkit,
    VariantKind,
};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Parametric layout engine for X-ARAPUCA photon-detection geometries
#[derive(Parser)]
#[command(name = "xarapuca")]
#[command(version = LONG_VERSION)]
#[command(about = "Derive, validate, construct and sample X-ARAPUCA geometries", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the parameter table of a variant (all variants when omitted)
    Params {
        /// Variant name or configuration code
        variant: Option<String>,
    },

    /// Derive a layout and report its feasibility
    Layout {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Print the layout as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the construction plan the toolkit would receive
    Construct {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Dichroic filter transmission table
        #[arg(long)]
        dichroic_data: Option<PathBuf>,
    },

    /// Sample primary vertices as CSV
    Sample {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Region tag
        #[arg(short, long)]
        region: Option<String>,

        /// Number of vertices
        #[arg(short = 'n', long)]
        events: Option<u32>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct GeometryArgs {
    /// Geometry configuration file (.toml or .json)
    #[arg(short, long, conflicts_with = "variant")]
    config: Option<PathBuf>,

    /// Variant name or configuration code
    #[arg(long)]
    variant: Option<String>,

    /// Parameter override, NAME=VALUE (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,
}

impl GeometryArgs {
    fn resolve(&self) -> anyhow::Result<GeometryConfig> {
        let mut config = match (&self.config, &self.variant) {
            (Some(path), _) => GeometryConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            (None, Some(name)) => GeometryConfig::new(name.parse::<VariantKind>()?),
            (None, None) => bail!("either --config or --variant is required"),
        };
        for assignment in &self.set {
            let (name, value) = assignment
                .split_once('=')
                .with_context(|| format!("override '{}' is not NAME=VALUE", assignment))?;
            config
                .parameters
                .insert(name.trim().to_string(), parse_value(value.trim()));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Read a command-line value the way a configuration file would spell it
fn parse_value(raw: &str) -> ParamValue {
    if let Ok(b) = raw.parse::<bool>() {
        ParamValue::Flag(b)
    } else if let Ok(n) = raw.parse::<u32>() {
        ParamValue::Count(n)
    } else if let Ok(v) = raw.parse::<f64>() {
        ParamValue::Length(v)
    } else {
        ParamValue::Choice(raw.to_string())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging_with(level, format)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Params { variant } => {
            let variants = match variant {
                Some(name) => vec![name.parse::<VariantKind>()?],
                None => VariantKind::ALL.to_vec(),
            };
            for v in variants {
                writeln!(out, "{}", params_table(v))?;
            }
        }

        Commands::Layout { geometry, json } => {
            let config = geometry.resolve()?;
            let params = config.parameter_set()?;
            let (layout, report) = build_layout(config.variant, &params)?;
            if json {
                writeln!(out, "{}", layout.to_json()?)?;
            } else {
                let changed = overridden(&params, config.variant);
                if !changed.is_empty() {
                    writeln!(out, "overrides: {}", changed.join(", "))?;
                }
                write!(out, "{}", layout_summary(&layout, &report))?;
            }
            report.ensure()?;
        }

        Commands::Construct {
            geometry,
            dichroic_data,
        } => {
            let mut config = geometry.resolve()?;
            if dichroic_data.is_some() {
                config.construct.dichroic_data = dichroic_data;
            }
            let detector = config.detector()?;
            let mut toolkit = RecordingToolkit::new();
            let summary = detector.construct(&config.construct, &mut toolkit)?;
            writeln!(out, "{}", toolkit.render())?;
            writeln!(
                out,
                "# {} materials, {} volumes, {} carvings, {} surfaces, {} detectors",
                summary.materials,
                summary.volumes,
                summary.carves,
                summary.surfaces,
                summary.detectors
            )?;
        }

        Commands::Sample {
            geometry,
            region,
            events,
            seed,
        } => {
            let config = geometry.resolve()?;
            let detector = config.detector()?;
            let region = match region.or_else(|| config.sampling.region.clone()) {
                Some(r) => r,
                None => detector
                    .layout()
                    .regions()
                    .keys()
                    .next()
                    .cloned()
                    .context("variant declares no vertex regions")?,
            };
            let events = events.unwrap_or(config.sampling.events);
            let seed = seed.unwrap_or(config.sampling.seed);
            tracing::info!(%region, events, seed, "sampling vertices");

            let sampler = detector.sampler(&region, StdRng::seed_from_u64(seed))?;
            write_vertices_csv(&mut out, sampler.take(events as usize))?;
        }
    }

    out.flush()?;
    Ok(())
}
