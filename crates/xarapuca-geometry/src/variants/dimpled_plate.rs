//! Dimpled WLS plate
//!
//! A long WLS plate inside a PTFE ring, with evenly spaced dimples carved into
//! one or both long edges. The dimple shape is chosen by `dimple_type`.

use crate::arrangement::linear_array_centers;
use crate::layout::{Component, DerivedLayout, Solid};
use crate::sampler::SamplingMode;
use crate::variants::{require_pitch, VariantKind, CARVE_MARGIN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use xarapuca_core::{
    Axis, ConfigError, Error, Material, OpticalSurface, ParamSpec, ParameterSet, Point3D, Result,
    Rotation,
};

pub static PARAMS: &[ParamSpec] = &[
    ParamSpec::length("volume_length", 520.0, "Enclosing volume length (x)"),
    ParamSpec::length("volume_height", 20.0, "Enclosing volume height (y)"),
    ParamSpec::length("volume_width", 120.0, "Enclosing volume width (z)"),
    ParamSpec::length("plate_length", 480.0, "WLS plate length"),
    ParamSpec::length("plate_width", 93.0, "WLS plate width"),
    ParamSpec::length("plate_thickness", 3.5, "WLS plate thickness"),
    ParamSpec::length_or_zero("ring_gap", 0.5, "Gap between plate and ring"),
    ParamSpec::length("ring_width", 5.0, "Ring wall width"),
    ParamSpec::length("ring_height", 6.0, "Ring height"),
    ParamSpec::count("dimple_count", 8, 0, "Dimples per edge"),
    ParamSpec::choice(
        "dimple_type",
        "flat",
        &["flat", "cylindrical", "spherical"],
        "Dimple shape",
    ),
    ParamSpec::flag("dimple_both_edges", false, "Carve dimples on both long edges"),
    ParamSpec::length_or_zero(
        "dimple_size",
        0.0,
        "Flat dimple width or round dimple radius; 0 selects the shape default",
    ),
];

/// Dimple shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimpleType {
    /// Rectangular notch through the plate thickness
    Flat,
    /// Half-cylinder notch with its axis across the plate thickness
    Cylindrical,
    /// Spherical cup centered on the edge
    Spherical,
}

impl DimpleType {
    /// Default size: notch width for flat dimples, radius otherwise
    pub fn default_size(&self) -> f64 {
        match self {
            DimpleType::Flat => 4.0,
            DimpleType::Cylindrical => 1.5,
            DimpleType::Spherical => 2.0,
        }
    }

    /// How far the dimple cuts into the plate from the edge
    pub fn depth(&self, size: f64) -> f64 {
        match self {
            DimpleType::Flat => FLAT_DEPTH,
            DimpleType::Cylindrical | DimpleType::Spherical => size,
        }
    }

    /// Extent of one dimple along the edge
    pub fn footprint(&self, size: f64) -> f64 {
        match self {
            DimpleType::Flat => size,
            DimpleType::Cylindrical | DimpleType::Spherical => 2.0 * size,
        }
    }
}

/// Depth of a flat dimple, mm
const FLAT_DEPTH: f64 = 1.0;

impl fmt::Display for DimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DimpleType::Flat => "flat",
            DimpleType::Cylindrical => "cylindrical",
            DimpleType::Spherical => "spherical",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DimpleType {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(DimpleType::Flat),
            "cylindrical" => Ok(DimpleType::Cylindrical),
            "spherical" => Ok(DimpleType::Spherical),
            other => Err(ConfigError::InvalidValue {
                name: "dimple_type".to_string(),
                reason: format!("unknown dimple type '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct DimpledPlateParams {
    volume: [f64; 3],
    plate_length: f64,
    plate_width: f64,
    plate_thickness: f64,
    ring_gap: f64,
    ring_width: f64,
    ring_height: f64,
    dimple_count: u32,
    dimple_type: DimpleType,
    both_edges: bool,
    dimple_size: f64,
}

impl DimpledPlateParams {
    fn from_set(p: &ParameterSet) -> Result<Self> {
        let dimple_type: DimpleType = p.choice("dimple_type")?.parse()?;
        let size = p.length("dimple_size")?;
        Ok(Self {
            volume: [
                p.length("volume_length")?,
                p.length("volume_height")?,
                p.length("volume_width")?,
            ],
            plate_length: p.length("plate_length")?,
            plate_width: p.length("plate_width")?,
            plate_thickness: p.length("plate_thickness")?,
            ring_gap: p.length("ring_gap")?,
            ring_width: p.length("ring_width")?,
            ring_height: p.length("ring_height")?,
            dimple_count: p.count("dimple_count")?,
            dimple_type,
            both_edges: p.flag("dimple_both_edges")?,
            dimple_size: if size > 0.0 {
                size
            } else {
                dimple_type.default_size()
            },
        })
    }

    fn dimple_solid(&self) -> Solid {
        let margin_y = self.plate_thickness + 2.0 * CARVE_MARGIN;
        match self.dimple_type {
            DimpleType::Flat => Solid::Box {
                x: self.dimple_size,
                y: margin_y,
                z: 2.0 * FLAT_DEPTH,
            },
            DimpleType::Cylindrical => Solid::Cylinder {
                radius: self.dimple_size,
                length: margin_y,
            },
            DimpleType::Spherical => Solid::Sphere {
                radius: self.dimple_size,
            },
        }
    }
}

/// Lay out the dimpled plate
pub fn layout(p: &ParameterSet) -> Result<DerivedLayout> {
    let p = DimpledPlateParams::from_set(p)?;
    let depth = p.dimple_type.depth(p.dimple_size);
    if p.dimple_count > 0 {
        if depth >= p.plate_width / 2.0 {
            return Err(Error::incompatible(format!(
                "{} dimple depth {} mm reaches the middle of a {} mm wide plate",
                p.dimple_type, depth, p.plate_width
            )));
        }
        require_pitch(
            "dimples",
            p.plate_length,
            p.dimple_count,
            p.dimple_type.footprint(p.dimple_size),
        )?;
    }

    let mut b = DerivedLayout::builder(VariantKind::DimpledPlate.name());
    b.push(Component::container(
        "volume",
        Solid::Box {
            x: p.volume[0],
            y: p.volume[1],
            z: p.volume[2],
        },
        Material::LiquidArgon,
    ))?;

    let wall = p.ring_gap + p.ring_width;
    b.push(Component::volume(
        "ring",
        Solid::RectRing {
            x: p.plate_length + 2.0 * wall,
            y: p.ring_height,
            z: p.plate_width + 2.0 * wall,
            inset: p.ring_width,
        },
        Material::Ptfe,
        "volume",
    ))?;
    b.push(
        Component::volume(
            "plate",
            Solid::Box {
                x: p.plate_length,
                y: p.plate_thickness,
                z: p.plate_width,
            },
            Material::WlsPmma,
            "volume",
        )
        .with_surface(OpticalSurface::polished()),
    )?;

    if p.dimple_count > 0 {
        let solid = p.dimple_solid();
        let rotation = match p.dimple_type {
            DimpleType::Cylindrical => Rotation::quarter(Axis::X, 1),
            _ => Rotation::IDENTITY,
        };
        let mut edges = vec![("north", p.plate_width / 2.0)];
        if p.both_edges {
            edges.push(("south", -p.plate_width / 2.0));
        }
        let xs = linear_array_centers(p.plate_length, p.dimple_count)?;
        for (edge, z) in edges {
            for (i, &x) in xs.iter().enumerate() {
                b.push(
                    Component::carve(format!("dimple_{}_{}", edge, i), solid, "plate")
                        .at(x, 0.0, z)
                        .rotated(rotation),
                )?;
            }
        }
        tracing::debug!(
            dimple_type = %p.dimple_type,
            size = p.dimple_size,
            count = p.dimple_count,
            both_edges = p.both_edges,
            "dimples carved"
        );
    }

    b.region(
        "plate_surface",
        SamplingMode::UniformOnRectangle {
            center: Point3D::new(0.0, p.plate_thickness / 2.0, 0.0),
            x_half: p.plate_length / 2.0,
            z_half: p.plate_width / 2.0,
        },
    );
    b.region(
        "center",
        SamplingMode::FixedPoint {
            point: Point3D::origin(),
        },
    );
    b.finish()
}
