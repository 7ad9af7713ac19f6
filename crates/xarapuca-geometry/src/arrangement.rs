//! # Arrangement Arithmetic
//!
//! Closed-form placement rules shared by the variant calculators:
//! - Linear arrays (identical items evenly spread along one edge)
//! - Tiling (N identical tiles inside an outer frame with inner dividers)
//! - Stacking (layers piled along the thickness axis)
//! - Blending (interpolating a layer between two extremal positions)
//!
//! All functions are pure. Counts must be at least one; callers reject zero
//! counts before reaching these helpers.

use serde::{Deserialize, Serialize};
use xarapuca_core::{Error, Result};

/// Centers of `count` items spread along a span of length `length`
///
/// Item `i` sits at `-L/2 + (i + 0.5) * L / count`.
pub fn linear_array_centers(length: f64, count: u32) -> Result<Vec<f64>> {
    if count == 0 {
        return Err(Error::invalid("count", "array needs at least one item"));
    }
    let pitch = length / f64::from(count);
    Ok((0..count)
        .map(|i| -length / 2.0 + (f64::from(i) + 0.5) * pitch)
        .collect())
}

/// Span of one tile when `count` tiles share `span` with frames around and between them
pub fn tile_span(span: f64, outer_frame: f64, inner_frame: f64, count: u32) -> Result<f64> {
    if count == 0 {
        return Err(Error::invalid("count", "tiling needs at least one tile"));
    }
    let tile = (span - 2.0 * outer_frame - f64::from(count - 1) * inner_frame) / f64::from(count);
    if tile <= 0.0 {
        return Err(Error::incompatible(format!(
            "{} tiles with outer frame {} mm and inner frame {} mm leave no room in a {} mm span",
            count, outer_frame, inner_frame, span
        )));
    }
    Ok(tile)
}

/// Tile span and tile centers along one axis
pub fn tile_centers(
    span: f64,
    outer_frame: f64,
    inner_frame: f64,
    count: u32,
) -> Result<(f64, Vec<f64>)> {
    let tile = tile_span(span, outer_frame, inner_frame, count)?;
    let start = -span / 2.0 + outer_frame + tile / 2.0;
    let stride = tile + inner_frame;
    let centers = (0..count).map(|i| start + f64::from(i) * stride).collect();
    Ok((tile, centers))
}

/// Which extremal placement a blend factor of zero selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendConvention {
    /// `s = 0` is the deepest placement, `s = 1` the shallowest
    DeepAtZero,
    /// `s = 0` is the shallowest placement, `s = 1` the deepest
    ShallowAtZero,
}

impl BlendConvention {
    /// Linear interpolation between the two extremal offsets
    pub fn blend(self, deep: f64, shallow: f64, s: f64) -> f64 {
        match self {
            BlendConvention::DeepAtZero => deep + s * (shallow - deep),
            BlendConvention::ShallowAtZero => shallow + s * (deep - shallow),
        }
    }
}

/// Centers of layers stacked upward from `base`
///
/// Each layer's center is the running sum of half-thicknesses of itself and
/// every layer beneath it.
pub fn stack_offsets(base: f64, thicknesses: &[f64]) -> Vec<f64> {
    let mut top = base;
    thicknesses
        .iter()
        .map(|t| {
            let center = top + t / 2.0;
            top += t;
            center
        })
        .collect()
}

/// Center of an item sitting `gap` outside a surface at `surface`
pub fn outward_offset(surface: f64, gap: f64, thickness: f64) -> f64 {
    surface + gap + thickness / 2.0
}
