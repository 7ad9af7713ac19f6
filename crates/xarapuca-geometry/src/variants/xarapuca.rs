//! Multi-tile X-ARAPUCA cell
//!
//! A PTFE frame with `count_x * count_z` windows closes the top of the cell,
//! each window holding a dichroic filter. Below it a WLS plate spans the
//! inner cavity and two SiPM rows read out its long edges. The bottom is
//! either a second windowed frame (double sided) or a reflector foil.

use crate::arrangement::{linear_array_centers, outward_offset, tile_centers};
use crate::layout::{Component, DerivedLayout, LayoutBuilder, Solid};
use crate::sampler::SamplingMode;
use crate::variants::{require_count, require_pitch, VariantKind, CARVE_MARGIN};
use xarapuca_core::{Error, Material, OpticalSurface, ParamSpec, ParameterSet, Point3D, Result};

/// Reflector foil thickness, mm
const REFLECTOR_THICKNESS: f64 = 0.065;

pub static PARAMS: &[ParamSpec] = &[
    ParamSpec::length("assembly_length", 600.0, "Cell length (x)"),
    ParamSpec::length("assembly_width", 120.0, "Cell width (z)"),
    ParamSpec::length("box_height", 16.0, "Cell height (y)"),
    ParamSpec::length_or_zero("outer_frame_width", 10.0, "Frame border around the windows"),
    ParamSpec::length_or_zero("inner_frame_width", 2.0, "Divider between windows"),
    ParamSpec::count("count_x", 2, 1, "Windows along x"),
    ParamSpec::count("count_z", 3, 1, "Windows along z"),
    ParamSpec::length("frame_thickness", 2.0, "Frame thickness"),
    ParamSpec::length("filter_thickness", 1.0, "Dichroic filter thickness"),
    ParamSpec::length("plate_thickness", 3.5, "WLS plate thickness"),
    ParamSpec::choice("wls_material", "pmma", &["pmma", "ej286"], "WLS plate material"),
    ParamSpec::count("sipm_count", 24, 1, "SiPMs per readout row"),
    ParamSpec::length("sipm_array_length", 480.0, "Length of each SiPM row"),
    ParamSpec::length("sipm_size", 6.0, "SiPM active square side"),
    ParamSpec::length("sipm_thickness", 1.0, "SiPM thickness"),
    ParamSpec::length_or_zero("sipm_gap", 0.2, "Gap between plate edge and SiPMs"),
    ParamSpec::length("board_thickness", 1.6, "Readout board thickness"),
    ParamSpec::flag("double_sided", false, "Windows on both faces instead of a reflector"),
];

#[derive(Debug, Clone)]
struct XArapucaParams {
    length: f64,
    width: f64,
    height: f64,
    outer_frame: f64,
    inner_frame: f64,
    count_x: u32,
    count_z: u32,
    frame_thickness: f64,
    filter_thickness: f64,
    plate_thickness: f64,
    wls: Material,
    sipm_count: u32,
    sipm_array_length: f64,
    sipm_size: f64,
    sipm_thickness: f64,
    sipm_gap: f64,
    board_thickness: f64,
    double_sided: bool,
}

impl XArapucaParams {
    fn from_set(p: &ParameterSet) -> Result<Self> {
        let wls = match p.choice("wls_material")? {
            "ej286" => Material::WlsEj286,
            _ => Material::WlsPmma,
        };
        Ok(Self {
            length: p.length("assembly_length")?,
            width: p.length("assembly_width")?,
            height: p.length("box_height")?,
            outer_frame: p.length("outer_frame_width")?,
            inner_frame: p.length("inner_frame_width")?,
            count_x: require_count("count_x", p.count("count_x")?)?,
            count_z: require_count("count_z", p.count("count_z")?)?,
            frame_thickness: p.length("frame_thickness")?,
            filter_thickness: p.length("filter_thickness")?,
            plate_thickness: p.length("plate_thickness")?,
            wls,
            sipm_count: require_count("sipm_count", p.count("sipm_count")?)?,
            sipm_array_length: p.length("sipm_array_length")?,
            sipm_size: p.length("sipm_size")?,
            sipm_thickness: p.length("sipm_thickness")?,
            sipm_gap: p.length("sipm_gap")?,
            board_thickness: p.length("board_thickness")?,
            double_sided: p.flag("double_sided")?,
        })
    }

    /// Clearance each SiPM row takes from the cavity width
    fn readout_depth(&self) -> f64 {
        self.sipm_gap + self.sipm_thickness + self.board_thickness
    }
}

/// Window grid shared by the top and bottom frames
struct Windows {
    tile_x: f64,
    tile_z: f64,
    xs: Vec<f64>,
    zs: Vec<f64>,
}

impl Windows {
    fn tiles(&self) -> Vec<(f64, f64)> {
        self.xs
            .iter()
            .flat_map(|&x| self.zs.iter().map(move |&z| (x, z)))
            .collect()
    }
}

fn push_frame(
    b: &mut LayoutBuilder,
    p: &XArapucaParams,
    windows: &Windows,
    side: &str,
    y: f64,
) -> Result<()> {
    let frame = format!("frame_{}", side);
    b.push(
        Component::volume(
            frame.as_str(),
            Solid::Box {
                x: p.length,
                y: p.frame_thickness,
                z: p.width,
            },
            Material::Ptfe,
            "xarapuca",
        )
        .at(0.0, y, 0.0),
    )?;
    let window = Solid::Box {
        x: windows.tile_x,
        y: p.frame_thickness + 2.0 * CARVE_MARGIN,
        z: windows.tile_z,
    };
    let filter = Solid::Box {
        x: windows.tile_x,
        y: p.filter_thickness,
        z: windows.tile_z,
    };
    for (i, &x) in windows.xs.iter().enumerate() {
        for (j, &z) in windows.zs.iter().enumerate() {
            b.push(
                Component::carve(format!("window_{}_{}_{}", side, i, j), window, frame.as_str())
                    .at(x, 0.0, z),
            )?;
        }
    }
    for (i, &x) in windows.xs.iter().enumerate() {
        for (j, &z) in windows.zs.iter().enumerate() {
            b.push(
                Component::volume(
                    format!("filter_{}_{}_{}", side, i, j),
                    filter,
                    Material::DichroicGlass,
                    "xarapuca",
                )
                .at(x, y, z)
                .with_surface(OpticalSurface::dichroic()),
            )?;
        }
    }
    Ok(())
}

/// Lay out the X-ARAPUCA cell
pub fn layout(p: &ParameterSet) -> Result<DerivedLayout> {
    let p = XArapucaParams::from_set(p)?;

    let (tile_x, xs) = tile_centers(p.length, p.outer_frame, p.inner_frame, p.count_x)?;
    let (tile_z, zs) = tile_centers(p.width, p.outer_frame, p.inner_frame, p.count_z)?;
    let windows = Windows {
        tile_x,
        tile_z,
        xs,
        zs,
    };

    if p.filter_thickness > p.frame_thickness {
        return Err(Error::incompatible(format!(
            "filter thickness {} mm exceeds frame thickness {} mm",
            p.filter_thickness, p.frame_thickness
        )));
    }
    let cavity = p.height - 2.0 * p.frame_thickness;
    let tallest = p.plate_thickness.max(p.sipm_size);
    if tallest > cavity {
        return Err(Error::incompatible(format!(
            "{} mm tall readout does not fit the {:.3} mm cavity between frames",
            tallest, cavity
        )));
    }

    let plate_length = p.length - 2.0 * p.outer_frame;
    let plate_width = p.width - 2.0 * p.outer_frame - 2.0 * p.readout_depth();
    if plate_width <= 0.0 {
        return Err(Error::incompatible(format!(
            "SiPM rows leave no room for the plate in a {} mm wide cell",
            p.width
        )));
    }
    if p.sipm_array_length > plate_length {
        return Err(Error::incompatible(format!(
            "SiPM row {} mm is longer than the {:.3} mm plate",
            p.sipm_array_length, plate_length
        )));
    }
    require_pitch("SiPMs", p.sipm_array_length, p.sipm_count, p.sipm_size)?;
    tracing::debug!(tile_x, tile_z, plate_length, plate_width, "x-arapuca tiling");

    let mut b = DerivedLayout::builder(VariantKind::XArapuca.name());
    b.push(Component::container(
        "xarapuca",
        Solid::Box {
            x: p.length,
            y: p.height,
            z: p.width,
        },
        Material::LiquidArgon,
    ))?;

    let frame_y = p.height / 2.0 - p.frame_thickness / 2.0;
    push_frame(&mut b, &p, &windows, "top", frame_y)?;

    b.push(
        Component::volume(
            "plate",
            Solid::Box {
                x: plate_length,
                y: p.plate_thickness,
                z: plate_width,
            },
            p.wls,
            "xarapuca",
        )
        .with_surface(OpticalSurface::polished()),
    )?;

    let sipm_z = outward_offset(plate_width / 2.0, p.sipm_gap, p.sipm_thickness);
    let board_z = outward_offset(
        plate_width / 2.0 + p.sipm_gap + p.sipm_thickness,
        0.0,
        p.board_thickness,
    );
    let sipm = Solid::Box {
        x: p.sipm_size,
        y: p.sipm_size,
        z: p.sipm_thickness,
    };
    let centers = linear_array_centers(p.sipm_array_length, p.sipm_count)?;
    for (side, sign) in [("north", 1.0), ("south", -1.0)] {
        for (k, &x) in centers.iter().enumerate() {
            b.push(
                Component::volume(
                    format!("sipm_{}_{}", side, k),
                    sipm,
                    Material::Silicon,
                    "xarapuca",
                )
                .at(x, 0.0, sign * sipm_z)
                .sensitive("sipm"),
            )?;
        }
        b.push(
            Component::volume(
                format!("board_{}", side),
                Solid::Box {
                    x: p.sipm_array_length,
                    y: p.sipm_size,
                    z: p.board_thickness,
                },
                Material::Fr4,
                "xarapuca",
            )
            .at(0.0, 0.0, sign * board_z),
        )?;
    }

    if p.double_sided {
        push_frame(&mut b, &p, &windows, "bottom", -frame_y)?;
    } else {
        b.push(
            Component::volume(
                "back_reflector",
                Solid::Box {
                    x: plate_length,
                    y: REFLECTOR_THICKNESS,
                    z: plate_width,
                },
                Material::Vikuiti,
                "xarapuca",
            )
            .at(0.0, -p.height / 2.0 + REFLECTOR_THICKNESS / 2.0, 0.0)
            .with_surface(OpticalSurface::reflector()),
        )?;
    }

    b.region(
        "window",
        SamplingMode::UniformInTileThenOnRectangle {
            tiles: windows.tiles(),
            x_half: tile_x / 2.0,
            z_half: tile_z / 2.0,
            y: p.height / 2.0,
        },
    );
    b.region(
        "plate_surface",
        SamplingMode::UniformOnRectangle {
            center: Point3D::new(0.0, p.plate_thickness / 2.0, 0.0),
            x_half: plate_length / 2.0,
            z_half: plate_width / 2.0,
        },
    );
    b.region(
        "plate_center",
        SamplingMode::FixedPoint {
            point: Point3D::origin(),
        },
    );
    b.finish()
}
