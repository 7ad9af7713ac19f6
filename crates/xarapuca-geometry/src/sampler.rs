//! # Vertex Sampling
//!
//! Produces the origin point of one simulated event's primary particle from a
//! named region of a [`DerivedLayout`]. Each draw is independent and reads
//! the frozen layout only; the random stream is owned by the caller.
//!
//! Sampling modes:
//! - Fixed point
//! - Uniform on an x/z rectangle at fixed y, kept [`EDGE_TOLERANCE`] away from the edges
//! - Uniform on a disk in the x/z plane (radius drawn linearly unless `area_uniform`)
//! - Uniform tile choice followed by uniform sampling within that tile

use crate::layout::DerivedLayout;
use rand::Rng;
use serde::Serialize;
use std::f64::consts::TAU;
use xarapuca_core::{Point3D, Result, SamplingError, Vec3};

/// Distance kept from rectangle edges, mm
pub const EDGE_TOLERANCE: f64 = 0.1;

/// How a region produces points
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingMode {
    FixedPoint {
        point: Point3D,
    },
    /// Rectangle in the x/z plane at `center.y`
    UniformOnRectangle {
        center: Point3D,
        x_half: f64,
        z_half: f64,
    },
    /// Disk in the x/z plane
    ///
    /// With `area_uniform == false` the radius is drawn uniformly on
    /// `[0, radius)`, which concentrates points toward the center.
    UniformOnDisk {
        center: Point3D,
        radius: f64,
        area_uniform: bool,
    },
    /// One of several equal tiles, then a point inside it
    UniformInTileThenOnRectangle {
        /// Tile centers as (x, z)
        tiles: Vec<(f64, f64)>,
        x_half: f64,
        z_half: f64,
        y: f64,
    },
}

impl SamplingMode {
    pub fn name(&self) -> &'static str {
        match self {
            SamplingMode::FixedPoint { .. } => "fixed_point",
            SamplingMode::UniformOnRectangle { .. } => "uniform_on_rectangle",
            SamplingMode::UniformOnDisk { .. } => "uniform_on_disk",
            SamplingMode::UniformInTileThenOnRectangle { .. } => {
                "uniform_in_tile_then_on_rectangle"
            }
        }
    }
}

/// A named region and its sampling rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexSpec {
    pub region: String,
    pub mode: SamplingMode,
}

impl VertexSpec {
    fn degenerate(&self, reason: impl Into<String>) -> SamplingError {
        SamplingError::DegenerateRegion {
            region: self.region.clone(),
            reason: reason.into(),
        }
    }

    fn check_half(&self, axis: &str, half: f64) -> std::result::Result<(), SamplingError> {
        if !(half.is_finite() && half > EDGE_TOLERANCE) {
            return Err(self.degenerate(format!(
                "{} half-width {} mm must exceed the {} mm edge tolerance",
                axis, half, EDGE_TOLERANCE
            )));
        }
        Ok(())
    }

    fn check_inside(
        &self,
        center: &Vec3,
        reach: &Vec3,
        container_half: &Vec3,
    ) -> std::result::Result<(), SamplingError> {
        for i in 0..3 {
            if center[i].abs() + reach[i] > container_half[i] + 1e-9 {
                return Err(self.degenerate(format!(
                    "region reaches {:.3} mm from the center along axis {}, container half-span is {:.3} mm",
                    center[i].abs() + reach[i],
                    i,
                    container_half[i]
                )));
            }
        }
        Ok(())
    }

    /// Check that the region can produce points inside the container
    pub fn validate(&self, container_half: &Vec3) -> std::result::Result<(), SamplingError> {
        match &self.mode {
            SamplingMode::FixedPoint { point } => {
                self.check_inside(&point.coords, &Vec3::zeros(), container_half)
            }
            SamplingMode::UniformOnRectangle {
                center,
                x_half,
                z_half,
            } => {
                self.check_half("x", *x_half)?;
                self.check_half("z", *z_half)?;
                self.check_inside(
                    &center.coords,
                    &Vec3::new(*x_half, 0.0, *z_half),
                    container_half,
                )
            }
            SamplingMode::UniformOnDisk { center, radius, .. } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(self.degenerate(format!("radius {} mm must be positive", radius)));
                }
                self.check_inside(
                    &center.coords,
                    &Vec3::new(*radius, 0.0, *radius),
                    container_half,
                )
            }
            SamplingMode::UniformInTileThenOnRectangle {
                tiles,
                x_half,
                z_half,
                y,
            } => {
                if tiles.is_empty() {
                    return Err(self.degenerate("no tiles to choose from"));
                }
                self.check_half("x", *x_half)?;
                self.check_half("z", *z_half)?;
                tiles.iter().try_for_each(|&(x, z)| {
                    self.check_inside(
                        &Vec3::new(x, *y, z),
                        &Vec3::new(*x_half, 0.0, *z_half),
                        container_half,
                    )
                })
            }
        }
    }

    /// Draw one point
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> std::result::Result<Point3D, SamplingError> {
        match &self.mode {
            SamplingMode::FixedPoint { point } => Ok(*point),
            SamplingMode::UniformOnRectangle {
                center,
                x_half,
                z_half,
            } => {
                self.check_half("x", *x_half)?;
                self.check_half("z", *z_half)?;
                Ok(on_rectangle(rng, center.x, center.z, *x_half, *z_half, center.y))
            }
            SamplingMode::UniformOnDisk {
                center,
                radius,
                area_uniform,
            } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(self.degenerate(format!("radius {} mm must be positive", radius)));
                }
                let r = if *area_uniform {
                    radius * rng.gen::<f64>().sqrt()
                } else {
                    rng.gen_range(0.0..*radius)
                };
                let theta = rng.gen_range(0.0..TAU);
                Ok(Point3D::new(
                    center.x + r * theta.sin(),
                    center.y,
                    center.z + r * theta.cos(),
                ))
            }
            SamplingMode::UniformInTileThenOnRectangle {
                tiles,
                x_half,
                z_half,
                y,
            } => {
                if tiles.is_empty() {
                    return Err(self.degenerate("no tiles to choose from"));
                }
                self.check_half("x", *x_half)?;
                self.check_half("z", *z_half)?;
                let (x, z) = tiles[rng.gen_range(0..tiles.len())];
                Ok(on_rectangle(rng, x, z, *x_half, *z_half, *y))
            }
        }
    }
}

fn on_rectangle<R: Rng + ?Sized>(
    rng: &mut R,
    cx: f64,
    cz: f64,
    x_half: f64,
    z_half: f64,
    y: f64,
) -> Point3D {
    let x = rng.gen_range(-x_half + EDGE_TOLERANCE..x_half - EDGE_TOLERANCE);
    let z = rng.gen_range(-z_half + EDGE_TOLERANCE..z_half - EDGE_TOLERANCE);
    Point3D::new(cx + x, y, cz + z)
}

/// Check every region a layout declares
pub fn validate_regions(layout: &DerivedLayout) -> Result<()> {
    let half = layout.container_span() / 2.0;
    for spec in layout.regions().values() {
        spec.validate(&half)?;
        if let SamplingMode::UniformOnDisk {
            area_uniform: false,
            ..
        } = spec.mode
        {
            tracing::warn!(
                region = %spec.region,
                "disk region draws its radius linearly; vertices concentrate toward the center"
            );
        }
    }
    Ok(())
}

/// Draw one vertex from the named region of `layout`
pub fn sample_vertex<R: Rng + ?Sized>(
    layout: &DerivedLayout,
    region: &str,
    rng: &mut R,
) -> Result<Point3D> {
    let spec = layout
        .region(region)
        .ok_or_else(|| SamplingError::UnknownRegion {
            region: region.to_string(),
            available: layout.region_names(),
        })?;
    Ok(spec.sample(rng)?)
}

/// Endless stream of vertices from one region with its own random source
#[derive(Debug, Clone)]
pub struct VertexSampler<R> {
    spec: VertexSpec,
    rng: R,
}

impl<R: Rng> VertexSampler<R> {
    /// Bind a region of `layout` to `rng`; fails for unknown or degenerate regions
    pub fn new(layout: &DerivedLayout, region: &str, rng: R) -> Result<Self> {
        let spec = layout
            .region(region)
            .cloned()
            .ok_or_else(|| SamplingError::UnknownRegion {
                region: region.to_string(),
                available: layout.region_names(),
            })?;
        spec.validate(&(layout.container_span() / 2.0))?;
        Ok(Self { spec, rng })
    }

    pub fn spec(&self) -> &VertexSpec {
        &self.spec
    }

    pub fn next_vertex(&mut self) -> Result<Point3D> {
        Ok(self.spec.sample(&mut self.rng)?)
    }
}

impl<R: Rng> Iterator for VertexSampler<R> {
    type Item = Point3D;

    fn next(&mut self) -> Option<Self::Item> {
        // Validated in `new`, so sampling cannot fail here
        self.spec.sample(&mut self.rng).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec(mode: SamplingMode) -> VertexSpec {
        VertexSpec {
            region: "r".to_string(),
            mode,
        }
    }

    #[test]
    fn test_fixed_point_repeats() {
        let s = spec(SamplingMode::FixedPoint {
            point: Point3D::new(1.0, 2.0, 3.0),
        });
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..5 {
            assert_eq!(s.sample(&mut rng).unwrap(), Point3D::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_rectangle_keeps_y_fixed() {
        let s = spec(SamplingMode::UniformOnRectangle {
            center: Point3D::new(0.0, 1.75, 0.0),
            x_half: 40.0,
            z_half: 20.0,
        });
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(s.sample(&mut rng).unwrap().y, 1.75);
        }
    }

    #[test]
    fn test_degenerate_rectangle_rejected() {
        let s = spec(SamplingMode::UniformOnRectangle {
            center: Point3D::origin(),
            x_half: 0.05,
            z_half: 20.0,
        });
        let mut rng = StdRng::seed_from_u64(7);
        assert!(s.sample(&mut rng).is_err());
        assert!(s.validate(&Vec3::new(100.0, 100.0, 100.0)).is_err());
    }

    #[test]
    fn test_region_outside_container_rejected() {
        let s = spec(SamplingMode::UniformOnDisk {
            center: Point3D::new(0.0, 0.0, 45.0),
            radius: 10.0,
            area_uniform: false,
        });
        let err = s.validate(&Vec3::new(50.0, 50.0, 50.0)).unwrap_err();
        assert!(matches!(err, SamplingError::DegenerateRegion { .. }));
    }

    #[test]
    fn test_disk_stays_in_plane() {
        let s = spec(SamplingMode::UniformOnDisk {
            center: Point3D::new(1.0, 5.0, -1.0),
            radius: 3.0,
            area_uniform: true,
        });
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let p = s.sample(&mut rng).unwrap();
            assert_eq!(p.y, 5.0);
            assert!(((p.x - 1.0).powi(2) + (p.z + 1.0).powi(2)).sqrt() <= 3.0);
        }
    }
}
