//! Typed parameter sets
//!
//! Each geometry variant publishes a static table of [`ParamSpec`]s. A
//! [`ParameterSet`] starts from the table's defaults and accepts overrides
//! before layout computation; every override is checked for kind and range
//! against the table, so calculators only ever see valid values.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value
///
/// Deserialises untagged so configuration files can write plain
/// `plate_length = 80` or `dimple_type = "flat"`; integer literals given for
/// length parameters are coerced when the override is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Count(u32),
    Length(f64),
    Fraction(f64),
    Choice(String),
}

impl ParamValue {
    /// Kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParamValue::Flag(_) => "flag",
            ParamValue::Count(_) => "count",
            ParamValue::Length(_) => "length",
            ParamValue::Fraction(_) => "fraction",
            ParamValue::Choice(_) => "choice",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Flag(v) => write!(f, "{}", v),
            ParamValue::Count(v) => write!(f, "{}", v),
            ParamValue::Length(v) => write!(f, "{} mm", v),
            ParamValue::Fraction(v) => write!(f, "{}", v),
            ParamValue::Choice(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Length(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Count(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Choice(value.to_string())
    }
}

/// Kind, default and valid range of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Length in mm; strictly positive unless `allow_zero`
    Length { default: f64, allow_zero: bool },
    /// Blend factor in [0, 1]
    Fraction { default: f64 },
    /// Integer count, at least `min`
    Count { default: u32, min: u32 },
    /// Boolean toggle
    Flag { default: bool },
    /// One of a fixed set of names
    Choice {
        default: &'static str,
        options: &'static [&'static str],
    },
}

/// Entry of a variant's parameter table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

impl ParamSpec {
    /// Strictly positive length
    pub const fn length(name: &'static str, default: f64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Length {
                default,
                allow_zero: false,
            },
            description,
        }
    }

    /// Non-negative length, where zero usually means "use the default"
    pub const fn length_or_zero(
        name: &'static str,
        default: f64,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Length {
                default,
                allow_zero: true,
            },
            description,
        }
    }

    pub const fn fraction(name: &'static str, default: f64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Fraction { default },
            description,
        }
    }

    pub const fn count(
        name: &'static str,
        default: u32,
        min: u32,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Count { default, min },
            description,
        }
    }

    pub const fn flag(name: &'static str, default: bool, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Flag { default },
            description,
        }
    }

    pub const fn choice(
        name: &'static str,
        default: &'static str,
        options: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Choice { default, options },
            description,
        }
    }

    /// The table default as a value
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Length { default, .. } => ParamValue::Length(default),
            ParamKind::Fraction { default } => ParamValue::Fraction(default),
            ParamKind::Count { default, .. } => ParamValue::Count(default),
            ParamKind::Flag { default } => ParamValue::Flag(default),
            ParamKind::Choice { default, .. } => ParamValue::Choice(default.to_string()),
        }
    }

    /// Human-readable valid range
    pub fn range(&self) -> String {
        match self.kind {
            ParamKind::Length {
                allow_zero: false, ..
            } => "> 0 mm".to_string(),
            ParamKind::Length {
                allow_zero: true, ..
            } => ">= 0 mm".to_string(),
            ParamKind::Fraction { .. } => "0..=1".to_string(),
            ParamKind::Count { min, .. } => format!(">= {}", min),
            ParamKind::Flag { .. } => "true|false".to_string(),
            ParamKind::Choice { options, .. } => options.join("|"),
        }
    }

    /// Coerce `value` to this parameter's kind and check its range
    pub fn check(&self, value: ParamValue) -> Result<ParamValue, ConfigError> {
        let mismatch = |found: &ParamValue| ConfigError::TypeMismatch {
            name: self.name.to_string(),
            expected: self.default_value().kind_name().to_string(),
            found: found.kind_name().to_string(),
        };
        let out_of_range = |value: f64| ConfigError::OutOfRange {
            name: self.name.to_string(),
            value,
            range: self.range(),
        };

        match self.kind {
            ParamKind::Length { allow_zero, .. } => {
                let v = match value {
                    ParamValue::Length(v) | ParamValue::Fraction(v) => v,
                    ParamValue::Count(n) => f64::from(n),
                    other => return Err(mismatch(&other)),
                };
                let ok = v.is_finite() && if allow_zero { v >= 0.0 } else { v > 0.0 };
                if !ok {
                    return Err(out_of_range(v));
                }
                Ok(ParamValue::Length(v))
            }
            ParamKind::Fraction { .. } => {
                let v = match value {
                    ParamValue::Length(v) | ParamValue::Fraction(v) => v,
                    ParamValue::Count(n) => f64::from(n),
                    other => return Err(mismatch(&other)),
                };
                if !(0.0..=1.0).contains(&v) {
                    return Err(out_of_range(v));
                }
                Ok(ParamValue::Fraction(v))
            }
            ParamKind::Count { min, .. } => match value {
                ParamValue::Count(n) if n >= min => Ok(ParamValue::Count(n)),
                ParamValue::Count(n) => Err(out_of_range(f64::from(n))),
                // Negative or fractional counts arrive as lengths from untagged input
                ParamValue::Length(v) => Err(out_of_range(v)),
                other => Err(mismatch(&other)),
            },
            ParamKind::Flag { .. } => match value {
                ParamValue::Flag(b) => Ok(ParamValue::Flag(b)),
                other => Err(mismatch(&other)),
            },
            ParamKind::Choice { options, .. } => match value {
                ParamValue::Choice(s) => {
                    let normalized = s.trim().to_lowercase();
                    if options.contains(&normalized.as_str()) {
                        Ok(ParamValue::Choice(normalized))
                    } else {
                        Err(ConfigError::InvalidValue {
                            name: self.name.to_string(),
                            reason: format!("'{}' is not one of {}", s, options.join("|")),
                        })
                    }
                }
                other => Err(mismatch(&other)),
            },
        }
    }
}

/// Named parameter values for one geometry variant
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    variant: String,
    specs: &'static [ParamSpec],
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    /// Create a set populated with the table defaults
    pub fn from_specs(variant: impl Into<String>, specs: &'static [ParamSpec]) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.name.to_string(), spec.default_value()))
            .collect();
        Self {
            variant: variant.into(),
            specs,
            values,
        }
    }

    /// Variant the table belongs to
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// The parameter table
    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    /// Look up a parameter definition
    pub fn spec(&self, name: &str) -> Result<&'static ParamSpec, ConfigError> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ConfigError::UnknownParameter {
                name: name.to_string(),
                variant: self.variant.clone(),
            })
    }

    /// Override one parameter
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), ConfigError> {
        let spec = self.spec(name)?;
        let checked = spec.check(value.into())?;
        tracing::debug!(
            variant = %self.variant,
            parameter = name,
            value = %checked,
            "parameter override"
        );
        self.values.insert(name.to_string(), checked);
        Ok(())
    }

    /// Builder-style override
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ConfigError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Apply a batch of overrides, stopping at the first invalid one
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (&'a String, &'a ParamValue)>,
    {
        for (name, value) in overrides {
            self.set(name, value.clone())?;
        }
        Ok(())
    }

    /// Raw value lookup
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Iterate values in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&ParamValue, ConfigError> {
        self.values
            .get(name)
            .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
    }

    fn wrong_kind(name: &str, expected: &str, found: &ParamValue) -> ConfigError {
        ConfigError::TypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }

    /// Length in mm
    pub fn length(&self, name: &str) -> Result<f64, ConfigError> {
        match self.require(name)? {
            ParamValue::Length(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, "length", other)),
        }
    }

    /// Blend factor in [0, 1]
    pub fn fraction(&self, name: &str) -> Result<f64, ConfigError> {
        match self.require(name)? {
            ParamValue::Fraction(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, "fraction", other)),
        }
    }

    pub fn count(&self, name: &str) -> Result<u32, ConfigError> {
        match self.require(name)? {
            ParamValue::Count(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, "count", other)),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, ConfigError> {
        match self.require(name)? {
            ParamValue::Flag(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, "flag", other)),
        }
    }

    pub fn choice(&self, name: &str) -> Result<&str, ConfigError> {
        match self.require(name)? {
            ParamValue::Choice(v) => Ok(v.as_str()),
            other => Err(Self::wrong_kind(name, "choice", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPECS: &[ParamSpec] = &[
        ParamSpec::length("plate_length", 80.0, "plate length"),
        ParamSpec::length_or_zero("dimple_size", 0.0, "dimple size"),
        ParamSpec::fraction("shallowness", 0.0, "blend factor"),
        ParamSpec::count("sipm_count", 4, 1, "SiPMs per row"),
        ParamSpec::flag("with_coating", true, "coat the filter"),
        ParamSpec::choice(
            "dimple_type",
            "flat",
            &["flat", "cylindrical", "spherical"],
            "dimple shape",
        ),
    ];

    fn set() -> ParameterSet {
        ParameterSet::from_specs("test", SPECS)
    }

    #[test]
    fn test_defaults_are_populated() {
        let p = set();
        assert_eq!(p.length("plate_length").unwrap(), 80.0);
        assert_eq!(p.count("sipm_count").unwrap(), 4);
        assert!(p.flag("with_coating").unwrap());
        assert_eq!(p.choice("dimple_type").unwrap(), "flat");
    }

    #[test]
    fn test_integer_literal_coerces_to_length() {
        let p = set().with("plate_length", 120u32).unwrap();
        assert_eq!(p.length("plate_length").unwrap(), 120.0);
    }

    #[test]
    fn test_length_must_be_positive() {
        let err = set().with("plate_length", -1.0).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        let err = set().with("plate_length", 0.0).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert!(set().with("dimple_size", 0.0).is_ok());
    }

    #[test]
    fn test_fraction_range() {
        assert!(set().with("shallowness", 1.0).is_ok());
        let err = set().with("shallowness", 1.01).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'shallowness' out of range: 1.01 (valid: 0..=1)"
        );
    }

    #[test]
    fn test_count_minimum() {
        let err = set().with("sipm_count", 0u32).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_unknown_and_mismatched() {
        let err = set().with("plate_colour", "red").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownParameter { .. }));
        let err = set().with("with_coating", 3.0).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn test_choice_is_normalized() {
        let p = set().with("dimple_type", " Spherical ").unwrap();
        assert_eq!(p.choice("dimple_type").unwrap(), "spherical");
        assert!(set().with("dimple_type", "conical").is_err());
    }

    #[test]
    fn test_untagged_deserialization() {
        let v: BTreeMap<String, ParamValue> =
            serde_json::from_str(r#"{"a": true, "b": 3, "c": 2.5, "d": "flat", "e": -1}"#)
                .unwrap();
        assert_eq!(v["a"], ParamValue::Flag(true));
        assert_eq!(v["b"], ParamValue::Count(3));
        assert_eq!(v["c"], ParamValue::Length(2.5));
        assert_eq!(v["d"], ParamValue::Choice("flat".to_string()));
        assert_eq!(v["e"], ParamValue::Length(-1.0));
    }
}
