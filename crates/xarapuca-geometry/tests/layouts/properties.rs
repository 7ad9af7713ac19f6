use proptest::prelude::*;
use xarapuca_core::Vec3;
use xarapuca_geometry::feasibility::check_extents;
use xarapuca_geometry::{
    build_layout, tile_centers, tile_span, BlendConvention, ComponentExtent, VariantKind,
};

fn extent_strategy() -> impl Strategy<Value = ComponentExtent> {
    (
        prop::array::uniform3(-50.0f64..50.0),
        prop::array::uniform3(0.1f64..30.0),
    )
        .prop_map(|(center, half)| ComponentExtent {
            name: "part".to_string(),
            center: Vec3::from(center),
            half: Vec3::from(half),
        })
}

proptest! {
    #[test]
    fn prop_tiles_and_frames_fill_the_span(
        span in 50.0f64..2000.0,
        outer in 0.0f64..10.0,
        inner in 0.0f64..5.0,
        count in 1u32..8,
    ) {
        if let Ok(tile) = tile_span(span, outer, inner, count) {
            let n = f64::from(count);
            let total = n * tile + (n - 1.0) * inner + 2.0 * outer;
            prop_assert!((total - span).abs() < 1e-9 * span.max(1.0));

            let (_, centers) = tile_centers(span, outer, inner, count).unwrap();
            let last = centers[centers.len() - 1];
            prop_assert!((last + tile / 2.0 + outer - span / 2.0).abs() < 1e-9 * span.max(1.0));
        }
    }

    #[test]
    fn prop_blend_hits_extremes_and_is_monotonic(
        deep in -20.0f64..0.0,
        reach in 0.0f64..20.0,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let shallow = deep + reach;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let d = BlendConvention::DeepAtZero;
        prop_assert_eq!(d.blend(deep, shallow, 0.0), deep);
        prop_assert!((d.blend(deep, shallow, 1.0) - shallow).abs() < 1e-12);
        prop_assert!(d.blend(deep, shallow, lo) <= d.blend(deep, shallow, hi) + 1e-12);

        let s = BlendConvention::ShallowAtZero;
        prop_assert_eq!(s.blend(deep, shallow, 0.0), shallow);
        prop_assert!((s.blend(deep, shallow, 1.0) - deep).abs() < 1e-12);
        prop_assert!(s.blend(deep, shallow, lo) + 1e-12 >= s.blend(deep, shallow, hi));
    }

    #[test]
    fn prop_feasibility_survives_a_larger_container(
        extents in prop::collection::vec(extent_strategy(), 1..6),
        available in prop::array::uniform3(1.0f64..200.0),
        growth in prop::array::uniform3(0.0f64..50.0),
    ) {
        let small = Vec3::from(available);
        let large = small + Vec3::from(growth);
        if check_extents(&extents, &small).ok {
            prop_assert!(check_extents(&extents, &large).ok);
        }
    }

    #[test]
    fn prop_feasibility_survives_smaller_components(
        extents in prop::collection::vec(extent_strategy(), 1..6),
        available in prop::array::uniform3(1.0f64..200.0),
        shrink in 0.0f64..1.0,
    ) {
        let available = Vec3::from(available);
        let shrunk: Vec<_> = extents
            .iter()
            .map(|e| ComponentExtent {
                half: e.half * shrink,
                ..e.clone()
            })
            .collect();
        if check_extents(&extents, &available).ok {
            prop_assert!(check_extents(&shrunk, &available).ok);
        }
    }

    #[test]
    fn prop_growing_the_jig_keeps_it_feasible(
        thickness in 8.0f64..20.0,
        extra in 0.0f64..20.0,
    ) {
        let base = VariantKind::TestJig.default_parameters();
        let small = base.clone().with("jig_thickness", thickness).unwrap();
        let large = base.with("jig_thickness", thickness + extra).unwrap();
        let (_, small_report) = build_layout(VariantKind::TestJig, &small).unwrap();
        let (_, large_report) = build_layout(VariantKind::TestJig, &large).unwrap();
        if small_report.ok {
            prop_assert!(large_report.ok);
        }
    }
}
