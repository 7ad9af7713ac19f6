use std::collections::HashSet;
use xarapuca_core::{ConfigError, Error, Material};
use xarapuca_geometry::{
    ConstructOptions, ConstructionStep, Detector, RecordingToolkit, VariantKind,
};

fn options() -> ConstructOptions {
    ConstructOptions::with_dichroic_data("data/dichroic_transmission.txt")
}

#[test]
fn test_every_variant_constructs() {
    for variant in VariantKind::ALL {
        let detector = Detector::with_defaults(variant).unwrap();
        let mut toolkit = RecordingToolkit::new();
        let summary = detector.construct(&options(), &mut toolkit).unwrap();
        assert!(summary.volumes > 1, "{} placed nothing", variant);
        let readout = !matches!(
            variant,
            VariantKind::DichroicFilter | VariantKind::DichroicFilterInverted
        );
        assert_eq!(summary.detectors > 0, readout, "{}", variant);
    }
}

#[test]
fn test_parents_are_placed_before_children() {
    let detector = Detector::with_defaults(VariantKind::XArapuca).unwrap();
    let mut toolkit = RecordingToolkit::new();
    detector.construct(&options(), &mut toolkit).unwrap();

    let mut placed = HashSet::new();
    let mut worlds = 0;
    for step in toolkit.steps() {
        if let ConstructionStep::Place { logical, parent, .. } = step {
            match parent {
                Some(p) => assert!(placed.contains(p)),
                None => worlds += 1,
            }
            placed.insert(*logical);
        }
    }
    assert_eq!(worlds, 1);
}

#[test]
fn test_materials_defined_once_and_first() {
    let detector = Detector::with_defaults(VariantKind::XArapuca).unwrap();
    let mut toolkit = RecordingToolkit::new();
    let summary = detector.construct(&options(), &mut toolkit).unwrap();

    let materials: Vec<Material> = toolkit
        .steps()
        .iter()
        .take_while(|s| matches!(s, ConstructionStep::DefineMaterial { .. }))
        .map(|s| match s {
            ConstructionStep::DefineMaterial { material } => *material,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(materials.len(), summary.materials);
    assert!(materials.contains(&Material::DichroicGlass));
    assert!(materials.contains(&Material::Vikuiti));
}

#[test]
fn test_windows_are_carved_from_frame() {
    let detector = Detector::with_defaults(VariantKind::XArapuca).unwrap();
    let mut toolkit = RecordingToolkit::new();
    let summary = detector.construct(&options(), &mut toolkit).unwrap();
    assert_eq!(summary.carves, 6);
    let subtractions = toolkit
        .steps()
        .iter()
        .filter(|s| {
            matches!(
                s,
                ConstructionStep::Subtract { name, .. } if name.starts_with("frame_top-window_top")
            )
        })
        .count();
    assert_eq!(subtractions, 6);
}

#[test]
fn test_dichroic_variants_need_data_path() {
    let detector = Detector::with_defaults(VariantKind::DichroicFilter).unwrap();
    let mut toolkit = RecordingToolkit::new();
    let err = detector
        .construct(&ConstructOptions::default(), &mut toolkit)
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingParameter(_))));

    let detector = Detector::with_defaults(VariantKind::TestJig).unwrap();
    let mut toolkit = RecordingToolkit::new();
    assert!(detector
        .construct(&ConstructOptions::default(), &mut toolkit)
        .is_ok());
}

#[test]
fn test_sipms_register_detectors() {
    let detector = Detector::with_defaults(VariantKind::XArapuca).unwrap();
    let mut toolkit = RecordingToolkit::new();
    let summary = detector.construct(&options(), &mut toolkit).unwrap();
    assert_eq!(summary.detectors, 48);
}
