//! Detector facade
//!
//! Ties the pieces together: derive a layout from a variant and its
//! parameters, validate it, then construct it or sample vertices from it.

use crate::feasibility::{self, FeasibilityReport};
use crate::layout::DerivedLayout;
use crate::placement::{self, ConstructOptions, ConstructionSummary, GeometryToolkit};
use crate::sampler::{self, VertexSampler};
use crate::variants::VariantKind;
use rand::Rng;
use xarapuca_core::{ConfigError, ParameterSet, Point3D, Result};

/// Derive and validate the layout of `variant`
///
/// Region specs are checked here; an infeasible layout is still returned
/// together with its failing report so callers can inspect it.
pub fn build_layout(
    variant: VariantKind,
    params: &ParameterSet,
) -> Result<(DerivedLayout, FeasibilityReport)> {
    if params.variant() != variant.name() {
        return Err(ConfigError::Incompatible(format!(
            "parameters for '{}' handed to variant '{}'",
            params.variant(),
            variant
        ))
        .into());
    }
    let layout = (variant.calculator())(params)?;
    sampler::validate_regions(&layout)?;
    let report = feasibility::validate(&layout);
    tracing::info!(
        %variant,
        components = layout.components().len(),
        regions = layout.regions().len(),
        feasible = report.ok,
        "layout derived"
    );
    Ok((layout, report))
}

/// A validated, feasible detector layout
#[derive(Debug, Clone)]
pub struct Detector {
    variant: VariantKind,
    params: ParameterSet,
    layout: DerivedLayout,
    report: FeasibilityReport,
}

impl Detector {
    /// Build and gate; fails when the layout is infeasible
    pub fn new(variant: VariantKind, params: ParameterSet) -> Result<Self> {
        let (layout, report) = build_layout(variant, &params)?;
        let report = report.into_result()?;
        Ok(Self {
            variant,
            params,
            layout,
            report,
        })
    }

    /// Detector with every parameter at its default
    pub fn with_defaults(variant: VariantKind) -> Result<Self> {
        Self::new(variant, variant.default_parameters())
    }

    pub fn variant(&self) -> VariantKind {
        self.variant
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn layout(&self) -> &DerivedLayout {
        &self.layout
    }

    pub fn report(&self) -> &FeasibilityReport {
        &self.report
    }

    /// Issue the placement tree to `toolkit`
    pub fn construct<T: GeometryToolkit + ?Sized>(
        &self,
        options: &ConstructOptions,
        toolkit: &mut T,
    ) -> Result<ConstructionSummary> {
        placement::construct(&self.layout, &self.report, options, toolkit)
    }

    /// Draw one vertex from `region`
    pub fn sample_vertex<R: Rng + ?Sized>(&self, region: &str, rng: &mut R) -> Result<Point3D> {
        sampler::sample_vertex(&self.layout, region, rng)
    }

    /// Vertex stream from `region` owning `rng`
    pub fn sampler<R: Rng>(&self, region: &str, rng: R) -> Result<VertexSampler<R>> {
        VertexSampler::new(&self.layout, region, rng)
    }
}
