//! Dichroic filter sandwich
//!
//! A dichroic filter, optionally coated with p-terphenyl, sits in the opening
//! of a ribbed PTFE frame. The shallowness fraction slides the filter between
//! the bottom and the top of the rib. Two variants share this layout and
//! differ only in which end `shallowness = 0` selects.

use crate::arrangement::{stack_offsets, BlendConvention};
use crate::layout::{Component, DerivedLayout, Solid};
use crate::sampler::SamplingMode;
use crate::variants::VariantKind;
use xarapuca_core::{Error, Material, OpticalSurface, ParamSpec, ParameterSet, Point3D, Result};

/// Roughness of the evaporated wavelength-shifter coating, rad
const COATING_ROUGHNESS: f64 = 0.1;

/// Depth of the beam spot below the holder top, mm
const BEAM_DEPTH: f64 = 1.0;

pub static PARAMS: &[ParamSpec] = &[
    ParamSpec::length("holder_length", 100.0, "Holder length (x)"),
    ParamSpec::length("holder_height", 20.0, "Holder height (y)"),
    ParamSpec::length("holder_width", 100.0, "Holder width (z)"),
    ParamSpec::length("frame_length", 80.0, "Frame outer length"),
    ParamSpec::length("frame_width", 80.0, "Frame outer width"),
    ParamSpec::length("rib_height", 5.0, "Frame rib height"),
    ParamSpec::length("rib_width", 4.0, "Frame rib width"),
    ParamSpec::length("filter_length", 70.0, "Filter length"),
    ParamSpec::length("filter_width", 70.0, "Filter width"),
    ParamSpec::length("filter_thickness", 1.0, "Filter thickness"),
    ParamSpec::flag("with_coating", true, "Deposit a p-terphenyl coating on the filter"),
    ParamSpec::length("coating_thickness", 0.2, "Coating thickness"),
    ParamSpec::fraction("shallowness", 0.0, "Filter position within the rib height"),
];

#[derive(Debug, Clone)]
struct DichroicParams {
    holder: [f64; 3],
    frame_length: f64,
    frame_width: f64,
    rib_height: f64,
    rib_width: f64,
    filter_length: f64,
    filter_width: f64,
    filter_thickness: f64,
    coating: Option<f64>,
    shallowness: f64,
}

impl DichroicParams {
    fn from_set(p: &ParameterSet) -> Result<Self> {
        let coating = if p.flag("with_coating")? {
            Some(p.length("coating_thickness")?)
        } else {
            None
        };
        Ok(Self {
            holder: [
                p.length("holder_length")?,
                p.length("holder_height")?,
                p.length("holder_width")?,
            ],
            frame_length: p.length("frame_length")?,
            frame_width: p.length("frame_width")?,
            rib_height: p.length("rib_height")?,
            rib_width: p.length("rib_width")?,
            filter_length: p.length("filter_length")?,
            filter_width: p.length("filter_width")?,
            filter_thickness: p.length("filter_thickness")?,
            coating,
            shallowness: p.fraction("shallowness")?,
        })
    }

    fn check_fit(&self) -> Result<()> {
        let opening_x = self.frame_length - 2.0 * self.rib_width;
        let opening_z = self.frame_width - 2.0 * self.rib_width;
        if opening_x <= 0.0 || opening_z <= 0.0 {
            return Err(Error::incompatible(format!(
                "rib width {} mm closes a {} x {} mm frame",
                self.rib_width, self.frame_length, self.frame_width
            )));
        }
        if self.filter_length > opening_x || self.filter_width > opening_z {
            return Err(Error::incompatible(format!(
                "filter {} x {} mm does not fit the {:.3} x {:.3} mm frame opening",
                self.filter_length, self.filter_width, opening_x, opening_z
            )));
        }
        if self.filter_thickness > self.rib_height {
            return Err(Error::incompatible(format!(
                "filter thickness {} mm exceeds rib height {} mm",
                self.filter_thickness, self.rib_height
            )));
        }
        Ok(())
    }
}

/// Filter center along y for a shallowness fraction
///
/// The deepest placement rests the filter on the bottom of the rib, the
/// shallowest flushes it with the top.
pub fn filter_offset(
    rib_height: f64,
    thickness: f64,
    shallowness: f64,
    convention: BlendConvention,
) -> f64 {
    let reach = (rib_height - thickness) / 2.0;
    convention.blend(-reach, reach, shallowness)
}

/// Layout where `shallowness = 0` is the deepest placement
pub fn layout_deep_at_zero(p: &ParameterSet) -> Result<DerivedLayout> {
    layout_with(p, VariantKind::DichroicFilter, BlendConvention::DeepAtZero)
}

/// Layout where `shallowness = 0` is the shallowest placement
pub fn layout_shallow_at_zero(p: &ParameterSet) -> Result<DerivedLayout> {
    layout_with(
        p,
        VariantKind::DichroicFilterInverted,
        BlendConvention::ShallowAtZero,
    )
}

fn layout_with(
    p: &ParameterSet,
    variant: VariantKind,
    convention: BlendConvention,
) -> Result<DerivedLayout> {
    let p = DichroicParams::from_set(p)?;
    p.check_fit()?;

    let mut b = DerivedLayout::builder(variant.name());
    b.push(Component::container(
        "holder",
        Solid::Box {
            x: p.holder[0],
            y: p.holder[1],
            z: p.holder[2],
        },
        Material::LiquidArgon,
    ))?;
    b.push(Component::volume(
        "frame",
        Solid::RectRing {
            x: p.frame_length,
            y: p.rib_height,
            z: p.frame_width,
            inset: p.rib_width,
        },
        Material::Ptfe,
        "holder",
    ))?;

    let filter_y = filter_offset(p.rib_height, p.filter_thickness, p.shallowness, convention);
    tracing::debug!(%variant, shallowness = p.shallowness, filter_y, "filter placement");
    b.push(
        Component::volume(
            "filter",
            Solid::Box {
                x: p.filter_length,
                y: p.filter_thickness,
                z: p.filter_width,
            },
            Material::DichroicGlass,
            "holder",
        )
        .at(0.0, filter_y, 0.0)
        .with_surface(OpticalSurface::dichroic()),
    )?;

    let base = filter_y - p.filter_thickness / 2.0;
    let mut top = base + p.filter_thickness;
    if let Some(coating) = p.coating {
        let centers = stack_offsets(base, &[p.filter_thickness, coating]);
        b.push(
            Component::volume(
                "coating",
                Solid::Box {
                    x: p.filter_length,
                    y: coating,
                    z: p.filter_width,
                },
                Material::PTerphenyl,
                "holder",
            )
            .at(0.0, centers[1], 0.0)
            .with_surface(OpticalSurface::ground(COATING_ROUGHNESS)),
        )?;
        top += coating;
    }

    b.region(
        "coating_surface",
        SamplingMode::UniformOnRectangle {
            center: Point3D::new(0.0, top, 0.0),
            x_half: p.filter_length / 2.0,
            z_half: p.filter_width / 2.0,
        },
    );
    b.region(
        "beam",
        SamplingMode::FixedPoint {
            point: Point3D::new(0.0, p.holder[1] / 2.0 - BEAM_DEPTH, 0.0),
        },
    );
    b.finish()
}
