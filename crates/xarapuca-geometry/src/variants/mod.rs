//! Geometry variants
//!
//! The set of variants is closed. Each one publishes a parameter table and a
//! pure calculator `&ParameterSet -> DerivedLayout`; the calculator is picked
//! once from the variant tag and never re-dispatched.

pub mod dichroic;
pub mod dimpled_plate;
pub mod dual_scintillator;
pub mod test_jig;
pub mod xarapuca;

use crate::layout::DerivedLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use xarapuca_core::{ConfigError, ParamSpec, ParameterSet, Result};

/// Layout calculator signature
pub type Calculator = fn(&ParameterSet) -> Result<DerivedLayout>;

/// Extra length added to carving tools so they cut cleanly through a face, mm
pub(crate) const CARVE_MARGIN: f64 = 0.1;

/// Closed set of geometry variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// WLS plate in a test jig read out by a SiPM board
    TestJig,
    /// Dichroic filter and coating in a ribbed frame; shallowness 0 is deepest
    DichroicFilter,
    /// Same sandwich with the opposite shallowness convention
    DichroicFilterInverted,
    /// WLS plate with edge dimples inside a rectangular ring
    DimpledPlate,
    /// Multi-tile X-ARAPUCA cell
    #[serde(rename = "xarapuca")]
    XArapuca,
    /// Two stacked scintillator slabs under a disk source
    DualScintillator,
}

impl VariantKind {
    pub const ALL: [VariantKind; 6] = [
        VariantKind::TestJig,
        VariantKind::DichroicFilter,
        VariantKind::DichroicFilterInverted,
        VariantKind::DimpledPlate,
        VariantKind::XArapuca,
        VariantKind::DualScintillator,
    ];

    /// Configuration name
    pub fn name(&self) -> &'static str {
        match self {
            VariantKind::TestJig => "test_jig",
            VariantKind::DichroicFilter => "dichroic_filter",
            VariantKind::DichroicFilterInverted => "dichroic_filter_inverted",
            VariantKind::DimpledPlate => "dimpled_plate",
            VariantKind::XArapuca => "xarapuca",
            VariantKind::DualScintillator => "dual_scintillator",
        }
    }

    /// Numeric configuration code
    pub fn code(&self) -> u32 {
        match self {
            VariantKind::TestJig => 0,
            VariantKind::DichroicFilter => 1,
            VariantKind::DichroicFilterInverted => 2,
            VariantKind::DimpledPlate => 3,
            VariantKind::XArapuca => 4,
            VariantKind::DualScintillator => 5,
        }
    }

    /// Parameter table
    pub fn param_specs(&self) -> &'static [ParamSpec] {
        match self {
            VariantKind::TestJig => test_jig::PARAMS,
            VariantKind::DichroicFilter | VariantKind::DichroicFilterInverted => dichroic::PARAMS,
            VariantKind::DimpledPlate => dimpled_plate::PARAMS,
            VariantKind::XArapuca => xarapuca::PARAMS,
            VariantKind::DualScintillator => dual_scintillator::PARAMS,
        }
    }

    /// Parameter set holding the table defaults
    pub fn default_parameters(&self) -> ParameterSet {
        ParameterSet::from_specs(self.name(), self.param_specs())
    }

    /// The variant's layout calculator
    pub fn calculator(&self) -> Calculator {
        match self {
            VariantKind::TestJig => test_jig::layout,
            VariantKind::DichroicFilter => dichroic::layout_deep_at_zero,
            VariantKind::DichroicFilterInverted => dichroic::layout_shallow_at_zero,
            VariantKind::DimpledPlate => dimpled_plate::layout,
            VariantKind::XArapuca => xarapuca::layout,
            VariantKind::DualScintillator => dual_scintillator::layout,
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u32> for VariantKind {
    type Error = ConfigError;

    fn try_from(code: u32) -> std::result::Result<Self, Self::Error> {
        VariantKind::ALL
            .iter()
            .copied()
            .find(|v| v.code() == code)
            .ok_or_else(|| ConfigError::UnknownVariant(format!("configuration code {}", code)))
    }
}

impl FromStr for VariantKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        if let Ok(code) = normalized.parse::<u32>() {
            return VariantKind::try_from(code);
        }
        VariantKind::ALL
            .iter()
            .copied()
            .find(|v| v.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownVariant(s.to_string()))
    }
}

/// Reject a zero count before it reaches an array or tiling calculator
pub(crate) fn require_count(name: &str, count: u32) -> Result<u32> {
    if count == 0 {
        return Err(xarapuca_core::Error::invalid(name, "must be at least 1"));
    }
    Ok(count)
}

/// Reject items that would overlap when spread along a span
pub(crate) fn require_pitch(what: &str, span: f64, count: u32, item: f64) -> Result<()> {
    let pitch = span / f64::from(count);
    if item > pitch + 1e-9 {
        return Err(xarapuca_core::Error::incompatible(format!(
            "{} {} of size {} mm overlap along {} mm (pitch {:.3} mm)",
            count, what, item, span, pitch
        )));
    }
    Ok(())
}

/// Two rows of `item`-sized parts whose centers are `separation` apart must not overlap
pub(crate) fn require_row_spacing(what: &str, separation: f64, item: f64) -> Result<()> {
    if item > separation + 1e-9 {
        return Err(xarapuca_core::Error::incompatible(format!(
            "{} rows of size {} mm are only {} mm apart and overlap by {:.3} mm",
            what,
            item,
            separation,
            item - separation
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for v in VariantKind::ALL {
            assert_eq!(VariantKind::try_from(v.code()).unwrap(), v);
            assert_eq!(v.name().parse::<VariantKind>().unwrap(), v);
        }
    }

    #[test]
    fn test_row_spacing() {
        assert!(require_row_spacing("SiPM", 6.0, 6.0).is_ok());
        let err = require_row_spacing("SiPM", 5.0, 6.0).unwrap_err();
        assert!(err.to_string().contains("overlap by 1.000 mm"));
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let err = VariantKind::try_from(6).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown geometry variant: configuration code 6"
        );
        assert!("hexapuca".parse::<VariantKind>().is_err());
    }

    #[test]
    fn test_parse_accepts_codes_and_dashes() {
        assert_eq!("4".parse::<VariantKind>().unwrap(), VariantKind::XArapuca);
        assert_eq!(
            "Dual-Scintillator".parse::<VariantKind>().unwrap(),
            VariantKind::DualScintillator
        );
    }

    #[test]
    fn test_every_default_set_lays_out() {
        for v in VariantKind::ALL {
            let params = v.default_parameters();
            let layout = (v.calculator())(&params).unwrap();
            assert_eq!(layout.variant(), v.name());
        }
    }

    #[test]
    fn test_serde_names_match_config_names() {
        for v in VariantKind::ALL {
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, format!("\"{}\"", v.name()));
        }
    }
}
