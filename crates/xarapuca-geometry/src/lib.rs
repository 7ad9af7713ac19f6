//! # X-ARAPUCA Geometry
//!
//! Parametric layout engine for X-ARAPUCA photon-detection assemblies.
//! Provides the per-variant layout calculators, the feasibility validator,
//! the vertex sampler and the placement tree builder that drives an external
//! geometry toolkit.

pub mod arrangement;
pub mod detector;
pub mod feasibility;
pub mod layout;
pub mod placement;
pub mod recording;
pub mod sampler;
pub mod variants;

pub use arrangement::{
    linear_array_centers, outward_offset, stack_offsets, tile_centers, tile_span, BlendConvention,
};
pub use detector::{build_layout, Detector};
pub use feasibility::{AxisCheck, ComponentExtent, FeasibilityReport};
pub use layout::{Component, DerivedLayout, LayoutBuilder, Role, Solid};
pub use placement::{
    construct, ConstructOptions, ConstructionSummary, GeometryToolkit, LogicalId,
    PlacementTreeBuilder, SolidId,
};
pub use recording::{ConstructionStep, RecordingToolkit};
pub use sampler::{sample_vertex, SamplingMode, VertexSampler, VertexSpec, EDGE_TOLERANCE};
pub use variants::dimpled_plate::DimpleType;
pub use variants::VariantKind;
