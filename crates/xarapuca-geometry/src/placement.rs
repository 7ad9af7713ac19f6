//! Placement tree construction
//!
//! Walks a validated [`DerivedLayout`] and issues the corresponding calls to a
//! [`GeometryToolkit`]: materials first, then solids, carvings, logical
//! volumes and placements in parent-before-child order, then optical surfaces
//! and sensitive detectors.

use crate::feasibility::FeasibilityReport;
use crate::layout::{Component, DerivedLayout, Role, Solid};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use xarapuca_core::{ConfigError, Material, OpticalSurface, Result, Rotation, ToolkitError, Vec3};

/// Handle to a solid built by the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolidId(pub usize);

/// Handle to a logical volume created by the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalId(pub usize);

/// External geometry/transport toolkit
///
/// The builder only ever talks to the toolkit through this trait.
pub trait GeometryToolkit {
    /// Start a new placement tree rooted at `world`
    ///
    /// Called once per construction before any other method. Toolkits that
    /// keep per-tree state drop it here.
    fn begin(&mut self, _world: &str) -> Result<()> {
        Ok(())
    }

    /// Register a bulk material; called once per distinct material in a tree
    fn define_material(&mut self, material: Material) -> Result<()>;

    /// Build a primitive solid
    fn build_solid(&mut self, name: &str, solid: &Solid) -> Result<SolidId>;

    /// Subtract `tool`, placed at `offset`/`rotation` in `base`'s frame, from `base`
    fn subtract(
        &mut self,
        name: &str,
        base: SolidId,
        tool: SolidId,
        offset: Vec3,
        rotation: Rotation,
    ) -> Result<SolidId>;

    /// Pair a solid with a material
    fn create_logical(
        &mut self,
        name: &str,
        solid: SolidId,
        material: Material,
    ) -> Result<LogicalId>;

    /// Place a logical volume in its mother; `None` places the world volume
    fn place(
        &mut self,
        name: &str,
        logical: LogicalId,
        offset: Vec3,
        rotation: Rotation,
        parent: Option<LogicalId>,
    ) -> Result<()>;

    /// Attach an optical surface to a logical volume
    ///
    /// `dichroic_data` is set exactly when the surface is dichroic.
    fn create_optical_surface(
        &mut self,
        name: &str,
        logical: LogicalId,
        surface: &OpticalSurface,
        dichroic_data: Option<&Path>,
    ) -> Result<()>;

    /// Make a logical volume a sensitive detector
    fn register_sensitive_detector(&mut self, logical: LogicalId, name: &str) -> Result<()>;
}

/// Construction inputs that do not come from the parameter set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructOptions {
    /// Dichroic filter transmission table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dichroic_data: Option<PathBuf>,
}

impl ConstructOptions {
    pub fn with_dichroic_data(path: impl Into<PathBuf>) -> Self {
        Self {
            dichroic_data: Some(path.into()),
        }
    }
}

/// Counts of what a construction created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstructionSummary {
    pub materials: usize,
    pub volumes: usize,
    pub carves: usize,
    pub surfaces: usize,
    pub detectors: usize,
}

/// Drives a [`GeometryToolkit`] from a layout
pub struct PlacementTreeBuilder<'a, T: GeometryToolkit + ?Sized> {
    toolkit: &'a mut T,
    options: &'a ConstructOptions,
    logicals: HashMap<String, LogicalId>,
    summary: ConstructionSummary,
}

impl<'a, T: GeometryToolkit + ?Sized> PlacementTreeBuilder<'a, T> {
    pub fn new(toolkit: &'a mut T, options: &'a ConstructOptions) -> Self {
        Self {
            toolkit,
            options,
            logicals: HashMap::new(),
            summary: ConstructionSummary::default(),
        }
    }

    /// Build the whole placement tree; refuses infeasible layouts
    pub fn construct(
        mut self,
        layout: &DerivedLayout,
        report: &FeasibilityReport,
    ) -> Result<ConstructionSummary> {
        report.ensure()?;
        self.check_dichroic_data(layout)?;
        self.toolkit.begin(&layout.container().name)?;

        let materials: BTreeSet<Material> = layout
            .components()
            .iter()
            .filter(|c| c.role != Role::Carve)
            .filter_map(|c| c.material)
            .collect();
        for material in &materials {
            self.toolkit.define_material(*material)?;
        }
        self.summary.materials = materials.len();

        for component in layout.components().iter().filter(|c| c.role != Role::Carve) {
            self.place_component(layout, component)?;
        }

        tracing::info!(
            variant = layout.variant(),
            volumes = self.summary.volumes,
            carves = self.summary.carves,
            surfaces = self.summary.surfaces,
            detectors = self.summary.detectors,
            "placement tree constructed"
        );
        Ok(self.summary)
    }

    fn check_dichroic_data(&self, layout: &DerivedLayout) -> Result<()> {
        let needs = layout
            .components()
            .iter()
            .find(|c| c.surface.as_ref().is_some_and(|s| s.needs_dichroic_data()));
        match (needs, &self.options.dichroic_data) {
            (Some(c), None) => Err(ConfigError::MissingParameter(format!(
                "dichroic_data (required by the dichroic surface of '{}')",
                c.name
            ))
            .into()),
            _ => Ok(()),
        }
    }

    fn place_component(&mut self, layout: &DerivedLayout, component: &Component) -> Result<()> {
        let name = component.name.as_str();
        let material = component.material.ok_or_else(|| ToolkitError::Rejected {
            operation: "create_logical".to_string(),
            reason: format!("'{}' has no material", name),
        })?;

        let mut solid = self.toolkit.build_solid(name, &component.solid)?;
        for carve in layout.carves_of(name) {
            let tool = self.toolkit.build_solid(&carve.name, &carve.solid)?;
            solid = self.toolkit.subtract(
                &format!("{}-{}", name, carve.name),
                solid,
                tool,
                carve.offset,
                carve.rotation,
            )?;
            self.summary.carves += 1;
        }

        let logical = self.toolkit.create_logical(name, solid, material)?;
        let parent = match &component.parent {
            Some(p) => Some(*self.logicals.get(p).ok_or_else(|| ToolkitError::Rejected {
                operation: "place".to_string(),
                reason: format!("mother '{}' of '{}' was never created", p, name),
            })?),
            None => None,
        };
        self.toolkit
            .place(name, logical, component.offset, component.rotation, parent)?;
        self.logicals.insert(component.name.clone(), logical);
        self.summary.volumes += 1;

        if let Some(surface) = &component.surface {
            let data = if surface.needs_dichroic_data() {
                self.options.dichroic_data.as_deref()
            } else {
                None
            };
            self.toolkit
                .create_optical_surface(&format!("{}_surface", name), logical, surface, data)?;
            self.summary.surfaces += 1;
        }
        if let Some(detector) = &component.detector {
            self.toolkit.register_sensitive_detector(logical, detector)?;
            self.summary.detectors += 1;
        }
        tracing::debug!(component = name, solid = %component.solid.describe(), "placed");
        Ok(())
    }
}

/// Construct `layout` with `toolkit`, gated on `report`
pub fn construct<T: GeometryToolkit + ?Sized>(
    layout: &DerivedLayout,
    report: &FeasibilityReport,
    options: &ConstructOptions,
    toolkit: &mut T,
) -> Result<ConstructionSummary> {
    PlacementTreeBuilder::new(toolkit, options).construct(layout, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility;
    use crate::recording::{ConstructionStep, RecordingToolkit};
    use crate::sampler::SamplingMode;
    use xarapuca_core::{Axis, Error, Point3D};

    fn holder(with_dichroic: bool) -> DerivedLayout {
        let mut b = DerivedLayout::builder("unit");
        b.push(Component::container(
            "world",
            Solid::Box {
                x: 50.0,
                y: 10.0,
                z: 50.0,
            },
            Material::LiquidArgon,
        ))
        .unwrap();
        let mut frame = Component::volume(
            "frame",
            Solid::Box {
                x: 40.0,
                y: 2.0,
                z: 40.0,
            },
            Material::Ptfe,
            "world",
        );
        if with_dichroic {
            frame = frame.with_surface(OpticalSurface::dichroic());
        }
        b.push(frame).unwrap();
        b.push(
            Component::carve(
                "hole",
                Solid::Cylinder {
                    radius: 3.0,
                    length: 2.2,
                },
                "frame",
            )
            .rotated(Rotation::quarter(Axis::X, 1)),
        )
        .unwrap();
        b.push(
            Component::volume(
                "sensor",
                Solid::Box {
                    x: 6.0,
                    y: 1.0,
                    z: 6.0,
                },
                Material::Silicon,
                "world",
            )
            .at(0.0, -3.0, 0.0)
            .sensitive("sipm"),
        )
        .unwrap();
        b.region(
            "center",
            SamplingMode::FixedPoint {
                point: Point3D::origin(),
            },
        );
        b.finish().unwrap()
    }

    #[test]
    fn test_construction_order() {
        let layout = holder(false);
        let report = feasibility::validate(&layout);
        let mut toolkit = RecordingToolkit::new();
        let summary =
            construct(&layout, &report, &ConstructOptions::default(), &mut toolkit).unwrap();
        assert_eq!(summary.materials, 3);
        assert_eq!(summary.volumes, 3);
        assert_eq!(summary.carves, 1);
        assert_eq!(summary.detectors, 1);

        let steps = toolkit.steps();
        let first_solid = steps
            .iter()
            .position(|s| matches!(s, ConstructionStep::BuildSolid { .. }))
            .unwrap();
        assert!(steps[..first_solid]
            .iter()
            .all(|s| matches!(s, ConstructionStep::DefineMaterial { .. })));
        let subtract = steps
            .iter()
            .position(|s| matches!(s, ConstructionStep::Subtract { .. }))
            .unwrap();
        let frame_logical = steps
            .iter()
            .position(
                |s| matches!(s, ConstructionStep::CreateLogical { name, .. } if name == "frame"),
            )
            .unwrap();
        assert!(subtract < frame_logical);
    }

    #[test]
    fn test_toolkit_can_be_reused() {
        let layout = holder(false);
        let report = feasibility::validate(&layout);
        let options = ConstructOptions::default();
        let mut toolkit = RecordingToolkit::new();

        let first = construct(&layout, &report, &options, &mut toolkit).unwrap();
        let first_steps = toolkit.steps().to_vec();
        let second = construct(&layout, &report, &options, &mut toolkit).unwrap();

        assert_eq!(first, second);
        assert_eq!(toolkit.steps(), first_steps.as_slice());
    }

    #[test]
    fn test_dichroic_surface_needs_data_path() {
        let layout = holder(true);
        let report = feasibility::validate(&layout);
        let mut toolkit = RecordingToolkit::new();
        let err =
            construct(&layout, &report, &ConstructOptions::default(), &mut toolkit).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingParameter(_))));
        assert!(toolkit.steps().is_empty());

        let options = ConstructOptions::with_dichroic_data("/data/dichroic.txt");
        construct(&layout, &report, &options, &mut toolkit).unwrap();
        assert!(toolkit.steps().iter().any(|s| matches!(
            s,
            ConstructionStep::OpticalSurface {
                dichroic_data: Some(p),
                ..
            } if p.ends_with("dichroic.txt")
        )));
    }

    #[test]
    fn test_infeasible_layout_is_refused() {
        let mut b = DerivedLayout::builder("unit");
        b.push(Component::container(
            "world",
            Solid::Box {
                x: 10.0,
                y: 10.0,
                z: 10.0,
            },
            Material::LiquidArgon,
        ))
        .unwrap();
        b.push(Component::volume(
            "slab",
            Solid::Box {
                x: 20.0,
                y: 1.0,
                z: 1.0,
            },
            Material::Ptfe,
            "world",
        ))
        .unwrap();
        let layout = b.finish().unwrap();
        let report = feasibility::validate(&layout);
        let mut toolkit = RecordingToolkit::new();
        let err =
            construct(&layout, &report, &ConstructOptions::default(), &mut toolkit).unwrap_err();
        assert!(err.to_string().contains("along x"));
        assert!(toolkit.steps().is_empty());
    }
}
