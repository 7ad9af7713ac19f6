//! Feasibility validation
//!
//! Decides whether every placed component fits inside the container, one axis
//! at a time. The required span on an axis is twice the largest distance any
//! component reaches from the container center, so an off-center small part
//! can be the limiting one. Carvings and the container itself are ignored.

use crate::layout::{DerivedLayout, Role};
use serde::Serialize;
use xarapuca_core::{Axis, LayoutError, Result, Vec3};

/// Slack allowed when comparing spans, mm
pub const SPAN_TOLERANCE: f64 = 1e-9;

/// Extent of one component in the container frame
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentExtent {
    pub name: String,
    pub center: Vec3,
    pub half: Vec3,
}

impl ComponentExtent {
    /// Distance from the container center to the far face along `axis`
    pub fn reach(&self, axis: Axis) -> f64 {
        axis.of(&self.center).abs() + axis.of(&self.half)
    }
}

/// Outcome of the check along one axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisCheck {
    pub axis: Axis,
    pub required: f64,
    pub available: f64,
    /// Component that sets `required`
    pub limiting: Option<String>,
}

impl AxisCheck {
    pub fn passes(&self) -> bool {
        self.required <= self.available + SPAN_TOLERANCE
    }
}

/// Verdict for one layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityReport {
    pub ok: bool,
    pub failing_axis: Option<Axis>,
    pub message: String,
    pub checks: Vec<AxisCheck>,
}

impl FeasibilityReport {
    fn from_checks(checks: Vec<AxisCheck>) -> Self {
        let failing = checks.iter().find(|c| !c.passes());
        let (ok, failing_axis, message) = match failing {
            Some(check) => (
                false,
                Some(check.axis),
                format!(
                    "geometry is ill-formed along {}: required span {:.3} mm{} exceeds available {:.3} mm",
                    check.axis,
                    check.required,
                    check
                        .limiting
                        .as_ref()
                        .map(|n| format!(" ({})", n))
                        .unwrap_or_default(),
                    check.available
                ),
            ),
            None => (
                true,
                None,
                checks
                    .iter()
                    .map(|c| format!("{} {:.3}/{:.3} mm", c.axis, c.required, c.available))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        };
        Self {
            ok,
            failing_axis,
            message,
            checks,
        }
    }

    /// The check for one axis
    pub fn check(&self, axis: Axis) -> Option<&AxisCheck> {
        self.checks.iter().find(|c| c.axis == axis)
    }

    /// Fail with [`LayoutError::Infeasible`] unless every axis passed
    pub fn ensure(&self) -> Result<()> {
        match self.checks.iter().find(|c| !c.passes()) {
            Some(check) => Err(LayoutError::Infeasible {
                axis: check.axis,
                required: check.required,
                available: check.available,
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Consume the report, keeping it only if the layout is feasible
    pub fn into_result(self) -> Result<Self> {
        self.ensure()?;
        Ok(self)
    }
}

/// Compare component extents against the available span on each axis
pub fn check_extents(extents: &[ComponentExtent], available: &Vec3) -> FeasibilityReport {
    let checks = Axis::ALL
        .iter()
        .map(|&axis| {
            let limiting = extents.iter().max_by(|a, b| a.reach(axis).total_cmp(&b.reach(axis)));
            AxisCheck {
                axis,
                required: limiting.map(|e| 2.0 * e.reach(axis)).unwrap_or(0.0),
                available: axis.of(available),
                limiting: limiting.map(|e| e.name.clone()),
            }
        })
        .collect();
    FeasibilityReport::from_checks(checks)
}

/// Extents of every placed (non-container, non-carve) component
pub fn component_extents(layout: &DerivedLayout) -> Vec<ComponentExtent> {
    layout
        .components()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.role == Role::Volume)
        .map(|(i, c)| ComponentExtent {
            name: c.name.clone(),
            center: layout.world_center(i),
            half: layout.world_half_extent(i),
        })
        .collect()
}

/// Validate a layout against its container
pub fn validate(layout: &DerivedLayout) -> FeasibilityReport {
    let report = check_extents(&component_extents(layout), &layout.container_span());
    if report.ok {
        tracing::debug!(
            variant = layout.variant(),
            spans = %report.message,
            "layout is feasible"
        );
    } else {
        tracing::error!(
            variant = layout.variant(),
            reason = %report.message,
            "layout is infeasible"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(name: &str, center: [f64; 3], half: [f64; 3]) -> ComponentExtent {
        ComponentExtent {
            name: name.to_string(),
            center: Vec3::from(center),
            half: Vec3::from(half),
        }
    }

    #[test]
    fn test_scenario_board_taller_than_container() {
        let extents = vec![
            extent("plate", [0.0, 0.0, 0.0], [40.0, 1.75, 20.0]),
            extent("board", [45.0, 0.0, 0.0], [0.8, 5.0, 20.0]),
        ];
        let report = check_extents(&extents, &Vec3::new(100.0, 8.0, 60.0));
        assert!(!report.ok);
        assert_eq!(report.failing_axis, Some(Axis::Y));
        let y = report.check(Axis::Y).unwrap();
        assert_eq!(y.required, 10.0);
        assert_eq!(y.available, 8.0);
        assert_eq!(y.limiting.as_deref(), Some("board"));
        assert!(report.message.contains("10.000"));
        assert!(report.message.contains("8.000"));
        assert!(report.ensure().is_err());
    }

    #[test]
    fn test_off_center_component_limits_span() {
        let extents = vec![
            extent("big", [0.0, 0.0, 0.0], [10.0, 1.0, 1.0]),
            extent("small", [12.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
        ];
        let report = check_extents(&extents, &Vec3::new(30.0, 10.0, 10.0));
        let x = report.check(Axis::X).unwrap();
        assert_eq!(x.required, 26.0);
        assert_eq!(x.limiting.as_deref(), Some("small"));
        assert!(report.ok);
    }

    #[test]
    fn test_exact_fit_passes() {
        let extents = vec![extent("a", [0.0, 0.0, 0.0], [5.0, 5.0, 5.0])];
        let report = check_extents(&extents, &Vec3::new(10.0, 10.0, 10.0));
        assert!(report.ok);
        assert!(report.into_result().is_ok());
    }
}
