//! Dual scintillator assembly
//!
//! Two scintillator slabs stacked with a small gap, each read out by its own
//! SiPM row on the +x edge. A source disk sits above the stack under a steel
//! collimator.

use crate::arrangement::{linear_array_centers, outward_offset, stack_offsets};
use crate::layout::{Component, DerivedLayout, Solid};
use crate::sampler::SamplingMode;
use crate::variants::{require_count, require_pitch, require_row_spacing, VariantKind};
use xarapuca_core::{
    Axis, Material, OpticalSurface, ParamSpec, ParameterSet, Point3D, Result, Rotation,
};

/// Collimator wall beyond the source radius, mm
const COLLIMATOR_WALL: f64 = 2.0;
/// Collimator plate thickness, mm
const COLLIMATOR_THICKNESS: f64 = 1.0;

pub static PARAMS: &[ParamSpec] = &[
    ParamSpec::length("enclosure_length", 140.0, "Enclosure length (x)"),
    ParamSpec::length("enclosure_height", 40.0, "Enclosure height (y)"),
    ParamSpec::length("enclosure_width", 140.0, "Enclosure width (z)"),
    ParamSpec::length("plate_length", 100.0, "Slab length"),
    ParamSpec::length("plate_width", 100.0, "Slab width"),
    ParamSpec::length("upper_thickness", 5.0, "Upper slab thickness"),
    ParamSpec::length("lower_thickness", 5.0, "Lower slab thickness"),
    ParamSpec::length_or_zero("stack_gap", 1.0, "Gap between the slabs"),
    ParamSpec::count("sipm_count", 8, 1, "SiPMs per slab"),
    ParamSpec::length("sipm_size", 6.0, "SiPM active square side"),
    ParamSpec::length("sipm_thickness", 1.0, "SiPM thickness"),
    ParamSpec::length_or_zero("sipm_gap", 0.2, "Gap between slab edge and SiPMs"),
    ParamSpec::length("source_radius", 10.0, "Source disk radius"),
    ParamSpec::length_or_zero("source_height", 5.0, "Source height above the stack"),
    ParamSpec::flag(
        "area_uniform",
        false,
        "Sample the source uniformly in area instead of uniformly in radius",
    ),
];

#[derive(Debug, Clone)]
struct DualScintillatorParams {
    enclosure: [f64; 3],
    plate_length: f64,
    plate_width: f64,
    upper_thickness: f64,
    lower_thickness: f64,
    stack_gap: f64,
    sipm_count: u32,
    sipm_size: f64,
    sipm_thickness: f64,
    sipm_gap: f64,
    source_radius: f64,
    source_height: f64,
    area_uniform: bool,
}

impl DualScintillatorParams {
    fn from_set(p: &ParameterSet) -> Result<Self> {
        Ok(Self {
            enclosure: [
                p.length("enclosure_length")?,
                p.length("enclosure_height")?,
                p.length("enclosure_width")?,
            ],
            plate_length: p.length("plate_length")?,
            plate_width: p.length("plate_width")?,
            upper_thickness: p.length("upper_thickness")?,
            lower_thickness: p.length("lower_thickness")?,
            stack_gap: p.length("stack_gap")?,
            sipm_count: require_count("sipm_count", p.count("sipm_count")?)?,
            sipm_size: p.length("sipm_size")?,
            sipm_thickness: p.length("sipm_thickness")?,
            sipm_gap: p.length("sipm_gap")?,
            source_radius: p.length("source_radius")?,
            source_height: p.length("source_height")?,
            area_uniform: p.flag("area_uniform")?,
        })
    }
}

/// Lay out the dual scintillator assembly
pub fn layout(p: &ParameterSet) -> Result<DerivedLayout> {
    let p = DualScintillatorParams::from_set(p)?;
    require_pitch("SiPMs", p.plate_width, p.sipm_count, p.sipm_size)?;

    let total = p.lower_thickness + p.stack_gap + p.upper_thickness;
    let centers = stack_offsets(
        -total / 2.0,
        &[p.lower_thickness, p.stack_gap, p.upper_thickness],
    );
    let (lower_y, upper_y) = (centers[0], centers[2]);
    tracing::debug!(lower_y, upper_y, "scintillator stack");
    require_row_spacing("SiPM", upper_y - lower_y, p.sipm_size)?;

    let mut b = DerivedLayout::builder(VariantKind::DualScintillator.name());
    b.push(Component::container(
        "enclosure",
        Solid::Box {
            x: p.enclosure[0],
            y: p.enclosure[1],
            z: p.enclosure[2],
        },
        Material::LiquidArgon,
    ))?;

    let sipm_x = outward_offset(p.plate_length / 2.0, p.sipm_gap, p.sipm_thickness);
    let zs = linear_array_centers(p.plate_width, p.sipm_count)?;
    for (slab, thickness, y) in [
        ("lower", p.lower_thickness, lower_y),
        ("upper", p.upper_thickness, upper_y),
    ] {
        b.push(
            Component::volume(
                format!("{}_plate", slab),
                Solid::Box {
                    x: p.plate_length,
                    y: thickness,
                    z: p.plate_width,
                },
                Material::Scintillator,
                "enclosure",
            )
            .at(0.0, y, 0.0)
            .with_surface(OpticalSurface::polished()),
        )?;
        for (k, &z) in zs.iter().enumerate() {
            b.push(
                Component::volume(
                    format!("sipm_{}_{}", slab, k),
                    Solid::Box {
                        x: p.sipm_thickness,
                        y: p.sipm_size,
                        z: p.sipm_size,
                    },
                    Material::Silicon,
                    "enclosure",
                )
                .at(sipm_x, y, z)
                .sensitive(format!("sipm_{}", slab)),
            )?;
        }
    }

    let source_y = total / 2.0 + p.source_height;
    b.push(
        Component::volume(
            "collimator",
            Solid::Cylinder {
                radius: p.source_radius + COLLIMATOR_WALL,
                length: COLLIMATOR_THICKNESS,
            },
            Material::Steel,
            "enclosure",
        )
        .at(0.0, source_y + COLLIMATOR_THICKNESS / 2.0, 0.0)
        .rotated(Rotation::quarter(Axis::X, 1)),
    )?;

    b.region(
        "source",
        SamplingMode::UniformOnDisk {
            center: Point3D::new(0.0, source_y, 0.0),
            radius: p.source_radius,
            area_uniform: p.area_uniform,
        },
    );
    b.region(
        "upper_surface",
        SamplingMode::UniformOnRectangle {
            center: Point3D::new(0.0, total / 2.0, 0.0),
            x_half: p.plate_length / 2.0,
            z_half: p.plate_width / 2.0,
        },
    );
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ParameterSet {
        VariantKind::DualScintillator.default_parameters()
    }

    #[test]
    fn test_stack_is_centered() {
        let layout = layout(&defaults()).unwrap();
        let lower = layout.component("lower_plate").unwrap();
        let upper = layout.component("upper_plate").unwrap();
        assert!((lower.offset.y + 3.0).abs() < 1e-12);
        assert!((upper.offset.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_each_slab_has_its_own_detector() {
        let layout = layout(&defaults()).unwrap();
        assert_eq!(
            layout.component("sipm_upper_7").unwrap().detector.as_deref(),
            Some("sipm_upper")
        );
        assert_eq!(
            layout.component("sipm_lower_0").unwrap().detector.as_deref(),
            Some("sipm_lower")
        );
    }

    #[test]
    fn test_collimator_lies_flat() {
        let layout = layout(&defaults()).unwrap();
        let idx = layout
            .components()
            .iter()
            .position(|c| c.name == "collimator")
            .unwrap();
        let half = layout.world_half_extent(idx);
        assert!((half.y - 0.5).abs() < 1e-12);
        assert!((half.x - 12.0).abs() < 1e-12);
        assert!((layout.world_center(idx).y - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_area_uniform_flag_reaches_region() {
        let p = defaults().with("area_uniform", true).unwrap();
        let layout = layout(&p).unwrap();
        assert!(matches!(
            layout.region("source").unwrap().mode,
            SamplingMode::UniformOnDisk {
                area_uniform: true,
                ..
            }
        ));
    }

    #[test]
    fn test_touching_sipm_rows_are_accepted() {
        let layout = layout(&defaults()).unwrap();
        let lower = layout.component("sipm_lower_0").unwrap();
        let upper = layout.component("sipm_upper_0").unwrap();
        assert!((upper.offset.y - lower.offset.y - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_sipm_rows_are_rejected() {
        let p = defaults().with("stack_gap", 0.0).unwrap();
        let err = layout(&p).unwrap_err();
        assert!(err.to_string().contains("overlap by 1.000 mm"));

        let p = defaults().with("sipm_size", 7.0).unwrap();
        assert!(layout(&p).is_err());
    }
}
