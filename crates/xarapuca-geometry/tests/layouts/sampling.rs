use rand::rngs::StdRng;
use rand::SeedableRng;
use xarapuca_core::Point3D;
use xarapuca_geometry::{Detector, SamplingMode, VariantKind, EDGE_TOLERANCE};

fn detector(variant: VariantKind) -> Detector {
    Detector::with_defaults(variant).unwrap()
}

#[test]
fn test_rectangle_samples_stay_inside_tolerance_band() {
    let detector = detector(VariantKind::XArapuca);
    let (center, x_half, z_half) = match detector.layout().region("plate_surface").unwrap().mode {
        SamplingMode::UniformOnRectangle {
            center,
            x_half,
            z_half,
        } => (center, x_half, z_half),
        ref other => panic!("unexpected mode {:?}", other),
    };

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..10_000 {
        let p = detector.sample_vertex("plate_surface", &mut rng).unwrap();
        assert_eq!(p.y, center.y);
        assert!((p.x - center.x).abs() <= x_half - EDGE_TOLERANCE);
        assert!((p.z - center.z).abs() <= z_half - EDGE_TOLERANCE);
    }
}

#[test]
fn test_window_samples_land_in_a_window() {
    let detector = detector(VariantKind::XArapuca);
    let (tiles, x_half, z_half) = match &detector.layout().region("window").unwrap().mode {
        SamplingMode::UniformInTileThenOnRectangle {
            tiles,
            x_half,
            z_half,
            ..
        } => (tiles.clone(), *x_half, *z_half),
        other => panic!("unexpected mode {:?}", other),
    };
    assert_eq!(tiles.len(), 6);

    let mut hits = vec![0usize; tiles.len()];
    let sampler = detector.sampler("window", StdRng::seed_from_u64(5)).unwrap();
    for p in sampler.take(6_000) {
        let tile = tiles
            .iter()
            .position(|&(x, z)| (p.x - x).abs() < x_half && (p.z - z).abs() < z_half)
            .expect("vertex outside every window");
        hits[tile] += 1;
    }
    // Each tile expects 1000 hits
    assert!(hits.iter().all(|&h| h > 850 && h < 1150), "{:?}", hits);
}

fn radius_fractions(area_uniform: bool, n: usize) -> Vec<f64> {
    let params = VariantKind::DualScintillator
        .default_parameters()
        .with("area_uniform", area_uniform)
        .unwrap();
    let detector = Detector::new(VariantKind::DualScintillator, params).unwrap();
    let (center, radius) = match detector.layout().region("source").unwrap().mode {
        SamplingMode::UniformOnDisk { center, radius, .. } => (center, radius),
        ref other => panic!("unexpected mode {:?}", other),
    };

    let mut rng = StdRng::seed_from_u64(2024);
    (0..n)
        .map(|_| {
            let p: Point3D = detector.sample_vertex("source", &mut rng).unwrap();
            assert_eq!(p.y, center.y);
            let r = ((p.x - center.x).powi(2) + (p.z - center.z).powi(2)).sqrt();
            assert!(r <= radius);
            r / radius
        })
        .collect()
}

/// Share of samples in each of `bins` equal-width radius bins
fn radial_histogram(fractions: &[f64], bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; bins];
    for &f in fractions {
        let bin = ((f * bins as f64) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
        .into_iter()
        .map(|c| c as f64 / fractions.len() as f64)
        .collect()
}

#[test]
fn test_disk_radius_is_linear_by_default() {
    let fractions = radius_fractions(false, 20_000);
    let mean = fractions.iter().sum::<f64>() / fractions.len() as f64;
    assert!((mean - 0.5).abs() < 0.02, "mean r/R = {}", mean);

    // Flat in r: every bin holds a tenth of the samples
    let shares = radial_histogram(&fractions, 10);
    for (i, share) in shares.iter().enumerate() {
        assert!((share - 0.1).abs() < 0.01, "bin {} holds {:.4}: {:?}", i, share, shares);
    }
}

#[test]
fn test_disk_radius_is_area_uniform_on_request() {
    let fractions = radius_fractions(true, 20_000);
    let mean = fractions.iter().sum::<f64>() / fractions.len() as f64;
    assert!((mean - 2.0 / 3.0).abs() < 0.02, "mean r/R = {}", mean);

    // Density grows with r: bin i holds (2i + 1) / 100
    let shares = radial_histogram(&fractions, 10);
    for (i, share) in shares.iter().enumerate() {
        let expected = (2 * i + 1) as f64 / 100.0;
        assert!(
            (share - expected).abs() < 0.01,
            "bin {} holds {:.4}, expected {:.2}",
            i,
            share,
            expected
        );
    }
}

#[test]
fn test_fixed_point_region() {
    let detector = detector(VariantKind::TestJig);
    let mut rng = StdRng::seed_from_u64(1);
    let p = detector.sample_vertex("source", &mut rng).unwrap();
    assert_eq!(p, Point3D::new(0.0, 3.75, 0.0));
}

#[test]
fn test_same_seed_same_vertices() {
    let detector = detector(VariantKind::DimpledPlate);
    let a: Vec<_> = detector
        .sampler("plate_surface", StdRng::seed_from_u64(9))
        .unwrap()
        .take(100)
        .collect();
    let b: Vec<_> = detector
        .sampler("plate_surface", StdRng::seed_from_u64(9))
        .unwrap()
        .take(100)
        .collect();
    assert_eq!(a, b);
}
