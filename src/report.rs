//! Plain-text and CSV rendering for the command-line tool

use std::fmt::Write as _;
use std::io;
use xarapuca_core::{ParamKind, ParameterSet, Point3D};
use xarapuca_geometry::{DerivedLayout, FeasibilityReport, Role, VariantKind};

/// Parameter table of `variant`: name, kind, default, valid range, description
pub fn params_table(variant: VariantKind) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} (code {})", variant, variant.code());
    let _ = writeln!(
        out,
        "{:<22} {:<9} {:>10}  {:<28} description",
        "name", "kind", "default", "range"
    );
    for spec in variant.param_specs() {
        let kind = match spec.kind {
            ParamKind::Length { .. } => "length",
            ParamKind::Fraction { .. } => "fraction",
            ParamKind::Count { .. } => "count",
            ParamKind::Flag { .. } => "flag",
            ParamKind::Choice { .. } => "choice",
        };
        let _ = writeln!(
            out,
            "{:<22} {:<9} {:>10}  {:<28} {}",
            spec.name,
            kind,
            spec.default_value().to_string(),
            spec.range(),
            spec.description
        );
    }
    out
}

/// Parameters that differ from the variant defaults, as `name=value` pairs
pub fn overridden(params: &ParameterSet, variant: VariantKind) -> Vec<String> {
    let defaults = variant.default_parameters();
    params
        .iter()
        .filter(|(name, value)| defaults.get(name) != Some(*value))
        .map(|(name, value)| format!("{}={}", name, value))
        .collect()
}

/// Human-readable layout summary with the feasibility verdict
pub fn layout_summary(layout: &DerivedLayout, report: &FeasibilityReport) -> String {
    let mut out = String::new();
    let span = layout.container_span();
    let _ = writeln!(
        out,
        "variant {}: container '{}' {:.3} x {:.3} x {:.3} mm",
        layout.variant(),
        layout.container().name,
        span.x,
        span.y,
        span.z
    );
    for (idx, c) in layout.components().iter().enumerate().skip(1) {
        let center = layout.world_center(idx);
        let role = match c.role {
            Role::Carve => "carve ",
            _ => "volume",
        };
        let _ = write!(
            out,
            "  {} {:<22} {:<40} at ({:9.3}, {:9.3}, {:9.3})",
            role,
            c.name,
            c.solid.describe(),
            center.x,
            center.y,
            center.z
        );
        if !c.rotation.is_identity() {
            let _ = write!(out, " rot {}", c.rotation);
        }
        if let Some(m) = c.material {
            let _ = write!(out, " {}", m);
        }
        if let Some(d) = &c.detector {
            let _ = write!(out, " [{}]", d);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "regions: {}", layout.region_names());
    for check in &report.checks {
        let _ = writeln!(
            out,
            "  {}: required {:.3} mm, available {:.3} mm{}",
            check.axis,
            check.required,
            check.available,
            check
                .limiting
                .as_ref()
                .map(|n| format!(" (limited by {})", n))
                .unwrap_or_default()
        );
    }
    let verdict = if report.ok { "feasible" } else { "INFEASIBLE" };
    let _ = writeln!(out, "{}: {}", verdict, report.message);
    out
}

/// Write vertices as `event,x,y,z` CSV rows; returns the number of rows
pub fn write_vertices_csv<W, I>(writer: &mut W, vertices: I) -> io::Result<usize>
where
    W: io::Write,
    I: IntoIterator<Item = Point3D>,
{
    writeln!(writer, "event,x_mm,y_mm,z_mm")?;
    let mut rows = 0;
    for (event, p) in vertices.into_iter().enumerate() {
        writeln!(writer, "{},{:.6},{:.6},{:.6}", event, p.x, p.y, p.z)?;
        rows += 1;
    }
    Ok(rows)
}
