//! Derived layouts
//!
//! A [`DerivedLayout`] is the fully resolved set of components for one
//! parameter configuration: solids, offsets in the parent frame, rotations,
//! materials and surfaces, plus the named vertex regions the variant offers.
//! Layouts are built once through [`LayoutBuilder`] and never mutated.

use crate::sampler::{SamplingMode, VertexSpec};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use xarapuca_core::{LayoutError, Material, OpticalSurface, Result, Rotation, Vec3};

/// Solid primitive handed to the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Solid {
    /// Full lengths along x, y, z
    Box { x: f64, y: f64, z: f64 },
    /// Axis along local z
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
    /// Box of full lengths x, y, z minus an inner box inset by `inset` on x and z
    RectRing { x: f64, y: f64, z: f64, inset: f64 },
}

impl Solid {
    /// Half extent along each local axis
    pub fn half_extent(&self) -> Vec3 {
        match *self {
            Solid::Box { x, y, z } | Solid::RectRing { x, y, z, .. } => {
                Vec3::new(x / 2.0, y / 2.0, z / 2.0)
            }
            Solid::Cylinder { radius, length } => Vec3::new(radius, radius, length / 2.0),
            Solid::Sphere { radius } => Vec3::new(radius, radius, radius),
        }
    }

    /// Short description for construction logs
    pub fn describe(&self) -> String {
        match *self {
            Solid::Box { x, y, z } => format!("box {:.3} x {:.3} x {:.3}", x, y, z),
            Solid::Cylinder { radius, length } => {
                format!("cylinder r={:.3} l={:.3}", radius, length)
            }
            Solid::Sphere { radius } => format!("sphere r={:.3}", radius),
            Solid::RectRing { x, y, z, inset } => {
                format!("ring {:.3} x {:.3} x {:.3} inset {:.3}", x, y, z, inset)
            }
        }
    }
}

/// How a component takes part in construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Mother volume bounding the whole assembly
    Container,
    /// Ordinary placed volume
    Volume,
    /// Removed from the parent's solid instead of placed
    Carve,
}

/// One resolved sub-component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub solid: Solid,
    /// Center in the parent's local frame
    pub offset: Vec3,
    pub rotation: Rotation,
    pub parent: Option<String>,
    pub role: Role,
    pub material: Option<Material>,
    pub surface: Option<OpticalSurface>,
    /// Sensitive-detector name, for photosensors
    pub detector: Option<String>,
}

impl Component {
    /// Root mother volume
    pub fn container(name: impl Into<String>, solid: Solid, material: Material) -> Self {
        Self {
            name: name.into(),
            solid,
            offset: Vec3::zeros(),
            rotation: Rotation::IDENTITY,
            parent: None,
            role: Role::Container,
            material: Some(material),
            surface: None,
            detector: None,
        }
    }

    /// Placed volume inside `parent`
    pub fn volume(
        name: impl Into<String>,
        solid: Solid,
        material: Material,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            solid,
            offset: Vec3::zeros(),
            rotation: Rotation::IDENTITY,
            parent: Some(parent.into()),
            role: Role::Volume,
            material: Some(material),
            surface: None,
            detector: None,
        }
    }

    /// Carving subtracted from `parent`
    pub fn carve(name: impl Into<String>, solid: Solid, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid,
            offset: Vec3::zeros(),
            rotation: Rotation::IDENTITY,
            parent: Some(parent.into()),
            role: Role::Carve,
            material: None,
            surface: None,
            detector: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.offset = Vec3::new(x, y, z);
        self
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_surface(mut self, surface: OpticalSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn sensitive(mut self, detector: impl Into<String>) -> Self {
        self.detector = Some(detector.into());
        self
    }
}

/// Fully resolved layout of one geometry variant
#[derive(Debug, Clone, Serialize)]
pub struct DerivedLayout {
    variant: String,
    components: Vec<Component>,
    regions: BTreeMap<String, VertexSpec>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DerivedLayout {
    /// Start a layout for `variant`
    pub fn builder(variant: impl Into<String>) -> LayoutBuilder {
        LayoutBuilder {
            variant: variant.into(),
            components: Vec::new(),
            regions: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Components in parent-before-child order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    /// Root mother volume
    pub fn container(&self) -> &Component {
        // The builder guarantees the first component is the container
        &self.components[0]
    }

    /// Full container lengths along x, y, z
    pub fn container_span(&self) -> Vec3 {
        self.container().solid.half_extent() * 2.0
    }

    /// Declared vertex regions
    pub fn regions(&self) -> &BTreeMap<String, VertexSpec> {
        &self.regions
    }

    pub fn region(&self, tag: &str) -> Option<&VertexSpec> {
        self.regions.get(tag)
    }

    /// Comma-separated region tags, for diagnostics
    pub fn region_names(&self) -> String {
        self.regions.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Pretty JSON of components and regions, for inspection
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Children carved out of `parent`
    pub fn carves_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a Component> + 'a {
        self.components
            .iter()
            .filter(move |c| c.role == Role::Carve && c.parent.as_deref() == Some(parent))
    }

    fn parent_index(&self, idx: usize) -> Option<usize> {
        self.components[idx]
            .parent
            .as_ref()
            .and_then(|p| self.index.get(p).copied())
    }

    /// Express a vector given in component `idx`'s frame in the container frame
    fn rotate_to_world(&self, idx: usize, v: Vec3) -> Vec3 {
        let v = self.components[idx].rotation.apply(&v);
        match self.parent_index(idx) {
            Some(p) => self.rotate_to_world(p, v),
            None => v,
        }
    }

    /// Center of component `idx` in the container frame
    pub fn world_center(&self, idx: usize) -> Vec3 {
        let c = &self.components[idx];
        match self.parent_index(idx) {
            Some(p) => self.world_center(p) + self.rotate_to_world(p, c.offset),
            None => c.offset,
        }
    }

    /// Half extent of component `idx` along the container axes
    pub fn world_half_extent(&self, idx: usize) -> Vec3 {
        let mut half = self.components[idx].solid.half_extent();
        let mut at = Some(idx);
        while let Some(i) = at {
            half = self.components[i].rotation.apply_extent(&half);
            at = self.parent_index(i);
        }
        half
    }
}

/// Incremental, order-checking layout construction
#[derive(Debug)]
pub struct LayoutBuilder {
    variant: String,
    components: Vec<Component>,
    regions: BTreeMap<String, VertexSpec>,
    index: HashMap<String, usize>,
}

impl LayoutBuilder {
    /// Append a component; its parent must already be present
    pub fn push(&mut self, component: Component) -> Result<&mut Self> {
        if self.index.contains_key(&component.name) {
            return Err(LayoutError::DuplicateComponent(component.name).into());
        }
        match (&component.parent, component.role) {
            (None, Role::Container) if self.components.is_empty() => {}
            (None, _) => return Err(LayoutError::MissingContainer.into()),
            (Some(parent), _) => {
                let parent_is_volume = self
                    .index
                    .get(parent)
                    .map(|&i| self.components[i].role != Role::Carve)
                    .unwrap_or(false);
                if !parent_is_volume {
                    return Err(LayoutError::DanglingParent {
                        component: component.name,
                        parent: parent.clone(),
                    }
                    .into());
                }
            }
        }
        self.index
            .insert(component.name.clone(), self.components.len());
        self.components.push(component);
        Ok(self)
    }

    /// Declare a vertex region
    pub fn region(&mut self, tag: impl Into<String>, mode: SamplingMode) -> &mut Self {
        let tag = tag.into();
        self.regions.insert(
            tag.clone(),
            VertexSpec {
                region: tag,
                mode,
            },
        );
        self
    }

    pub fn finish(self) -> Result<DerivedLayout> {
        match self.components.first() {
            Some(c) if c.role == Role::Container => {}
            _ => return Err(LayoutError::MissingContainer.into()),
        }
        Ok(DerivedLayout {
            variant: self.variant,
            components: self.components,
            regions: self.regions,
            index: self.index,
        })
    }
}
