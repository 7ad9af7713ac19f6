use xarapuca_core::{Axis, Error, LayoutError};
use xarapuca_geometry::{
    build_layout, linear_array_centers, tile_span, BlendConvention, Detector, Solid, VariantKind,
};
use xarapuca_geometry::variants::dichroic::filter_offset;

#[test]
fn test_tile_span_for_two_by_three_cell() {
    assert_eq!(tile_span(600.0, 10.0, 2.0, 2).unwrap(), 289.0);

    let (layout, report) =
        build_layout(VariantKind::XArapuca, &VariantKind::XArapuca.default_parameters()).unwrap();
    assert!(report.ok);
    let window = layout.component("window_top_1_2").unwrap();
    match window.solid {
        Solid::Box { x, .. } => assert_eq!(x, 289.0),
        other => panic!("unexpected window solid {:?}", other),
    }
}

#[test]
fn test_sandwich_blend_extremes() {
    assert_eq!(filter_offset(5.0, 1.0, 0.0, BlendConvention::DeepAtZero), -2.0);
    assert_eq!(filter_offset(5.0, 1.0, 1.0, BlendConvention::DeepAtZero), 2.0);

    let params = VariantKind::DichroicFilter
        .default_parameters()
        .with("shallowness", 1.0)
        .unwrap();
    let (layout, _) = build_layout(VariantKind::DichroicFilter, &params).unwrap();
    assert_eq!(layout.component("filter").unwrap().offset.y, 2.0);
}

#[test]
fn test_linear_array_end_items() {
    let centers = linear_array_centers(480.0, 24).unwrap();
    assert_eq!(centers[0], -230.0);
    assert_eq!(centers[23], 230.0);
}

#[test]
fn test_board_taller_than_jig_is_infeasible() {
    let params = VariantKind::TestJig
        .default_parameters()
        .with("jig_thickness", 8.0)
        .unwrap()
        .with("plate_thickness", 3.5)
        .unwrap()
        .with("board_height", 10.0)
        .unwrap();

    let (_, report) = build_layout(VariantKind::TestJig, &params).unwrap();
    assert!(!report.ok);
    assert_eq!(report.failing_axis, Some(Axis::Y));
    let y = report.check(Axis::Y).unwrap();
    assert_eq!(y.required, 10.0);
    assert_eq!(y.available, 8.0);
    assert_eq!(y.limiting.as_deref(), Some("board"));

    let err = Detector::new(VariantKind::TestJig, params).unwrap_err();
    match err {
        Error::Layout(LayoutError::Infeasible {
            axis,
            required,
            available,
        }) => {
            assert_eq!(axis, Axis::Y);
            assert_eq!(required, 10.0);
            assert_eq!(available, 8.0);
        }
        other => panic!("expected an infeasible layout, got {}", other),
    }
}

#[test]
fn test_unknown_configuration_code_is_fatal() {
    assert!(VariantKind::try_from(7).is_err());
    assert_eq!(VariantKind::try_from(4).unwrap(), VariantKind::XArapuca);
}
