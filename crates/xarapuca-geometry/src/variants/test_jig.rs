//! Simple test jig
//!
//! A WLS plate lies flat in a jig slot. A row of SiPMs faces the plate's +x
//! end across a small gap, mounted on a readout board behind them.

use crate::arrangement::{linear_array_centers, outward_offset};
use crate::layout::{Component, DerivedLayout, Solid};
use crate::sampler::SamplingMode;
use crate::variants::{require_count, require_pitch, VariantKind};
use xarapuca_core::{Error, Material, OpticalSurface, ParamSpec, ParameterSet, Point3D, Result};

pub static PARAMS: &[ParamSpec] = &[
    ParamSpec::length("jig_length", 100.0, "Jig slot length (x)"),
    ParamSpec::length("jig_thickness", 12.0, "Jig slot thickness (y)"),
    ParamSpec::length("jig_width", 60.0, "Jig slot width (z)"),
    ParamSpec::length("plate_length", 80.0, "WLS plate length"),
    ParamSpec::length("plate_thickness", 3.5, "WLS plate thickness"),
    ParamSpec::length("plate_width", 40.0, "WLS plate width"),
    ParamSpec::length("board_height", 10.0, "Readout board height (y)"),
    ParamSpec::length("board_thickness", 1.6, "Readout board thickness (x)"),
    ParamSpec::length("board_width", 40.0, "Readout board width (z)"),
    ParamSpec::count("sipm_count", 4, 1, "SiPMs along the plate end"),
    ParamSpec::length("sipm_size", 6.0, "SiPM active square side"),
    ParamSpec::length("sipm_thickness", 1.0, "SiPM thickness"),
    ParamSpec::length_or_zero("sipm_gap", 0.5, "Gap between plate end and SiPMs"),
    ParamSpec::length_or_zero("source_height", 2.0, "Source height above the plate"),
];

#[derive(Debug, Clone)]
struct TestJigParams {
    jig: [f64; 3],
    plate_length: f64,
    plate_thickness: f64,
    plate_width: f64,
    board_height: f64,
    board_thickness: f64,
    board_width: f64,
    sipm_count: u32,
    sipm_size: f64,
    sipm_thickness: f64,
    sipm_gap: f64,
    source_height: f64,
}

impl TestJigParams {
    fn from_set(p: &ParameterSet) -> Result<Self> {
        Ok(Self {
            jig: [
                p.length("jig_length")?,
                p.length("jig_thickness")?,
                p.length("jig_width")?,
            ],
            plate_length: p.length("plate_length")?,
            plate_thickness: p.length("plate_thickness")?,
            plate_width: p.length("plate_width")?,
            board_height: p.length("board_height")?,
            board_thickness: p.length("board_thickness")?,
            board_width: p.length("board_width")?,
            sipm_count: require_count("sipm_count", p.count("sipm_count")?)?,
            sipm_size: p.length("sipm_size")?,
            sipm_thickness: p.length("sipm_thickness")?,
            sipm_gap: p.length("sipm_gap")?,
            source_height: p.length("source_height")?,
        })
    }
}

/// Lay out the test jig
pub fn layout(p: &ParameterSet) -> Result<DerivedLayout> {
    let p = TestJigParams::from_set(p)?;
    require_pitch("SiPMs", p.plate_width, p.sipm_count, p.sipm_size)?;
    if p.board_width < p.sipm_size {
        return Err(Error::incompatible(format!(
            "board width {} mm is narrower than a {} mm SiPM",
            p.board_width, p.sipm_size
        )));
    }

    let mut b = DerivedLayout::builder(VariantKind::TestJig.name());
    b.push(Component::container(
        "jig",
        Solid::Box {
            x: p.jig[0],
            y: p.jig[1],
            z: p.jig[2],
        },
        Material::LiquidArgon,
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
            "jig",
        )
        .with_surface(OpticalSurface::polished()),
    )?;

    let plate_end = p.plate_length / 2.0;
    let sipm_x = outward_offset(plate_end, p.sipm_gap, p.sipm_thickness);
    for (i, z) in linear_array_centers(p.plate_width, p.sipm_count)?
        .into_iter()
        .enumerate()
    {
        b.push(
            Component::volume(
                format!("sipm_{}", i),
                Solid::Box {
                    x: p.sipm_thickness,
                    y: p.sipm_size,
                    z: p.sipm_size,
                },
                Material::Silicon,
                "jig",
            )
            .at(sipm_x, 0.0, z)
            .sensitive("sipm"),
        )?;
    }

    let board_x = outward_offset(plate_end + p.sipm_gap + p.sipm_thickness, 0.0, p.board_thickness);
    b.push(
        Component::volume(
            "board",
            Solid::Box {
                x: p.board_thickness,
                y: p.board_height,
                z: p.board_width,
            },
            Material::Fr4,
            "jig",
        )
        .at(board_x, 0.0, 0.0),
    )?;

    let top = p.plate_thickness / 2.0;
    b.region(
        "source",
        SamplingMode::FixedPoint {
            point: Point3D::new(0.0, top + p.source_height, 0.0),
        },
    );
    b.region(
        "plate_surface",
        SamplingMode::UniformOnRectangle {
            center: Point3D::new(0.0, top, 0.0),
            x_half: p.plate_length / 2.0,
            z_half: p.plate_width / 2.0,
        },
    );

    tracing::debug!(sipm_x, board_x, "test jig readout offsets");
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ParameterSet {
        VariantKind::TestJig.default_parameters()
    }

    #[test]
    fn test_sipm_row_faces_plate_end() {
        let layout = layout(&defaults()).unwrap();
        let sipm = layout.component("sipm_0").unwrap();
        assert!((sipm.offset.x - 41.0).abs() < 1e-12);
        assert!((sipm.offset.z + 15.0).abs() < 1e-12);
        let last = layout.component("sipm_3").unwrap();
        assert!((last.offset.z - 15.0).abs() < 1e-12);
        assert_eq!(sipm.detector.as_deref(), Some("sipm"));
    }

    #[test]
    fn test_board_sits_behind_sipms() {
        let layout = layout(&defaults()).unwrap();
        let board = layout.component("board").unwrap();
        assert!((board.offset.x - 42.3).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_sipms_rejected() {
        let p = defaults().with("sipm_count", 8u32).unwrap();
        assert!(layout(&p).is_err());
    }
}
