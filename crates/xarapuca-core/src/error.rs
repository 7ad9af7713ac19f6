//! Error handling for the X-ARAPUCA layout engine
//!
//! Every failure in this workspace stems from static configuration, so none
//! of these errors is retryable:
//! - Configuration errors (bad parameter values, unknown variants)
//! - Layout errors (infeasible spans, malformed component trees)
//! - Sampling errors (unknown or degenerate vertex regions)
//! - Toolkit errors (reported by the external geometry collaborator)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::units::Axis;
use thiserror::Error;

/// Configuration error type
///
/// Raised while a parameter set is assembled or when a variant calculator
/// rejects a combination of parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The parameter name is not part of the variant's table
    #[error("Unknown parameter '{name}' for variant {variant}")]
    UnknownParameter {
        /// The offending parameter name.
        name: String,
        /// The variant whose table was consulted.
        variant: String,
    },

    /// A required parameter is missing from the set
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// The value has the wrong kind for the parameter
    #[error("Parameter '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        /// The parameter name.
        name: String,
        /// The expected value kind.
        expected: String,
        /// The supplied value kind.
        found: String,
    },

    /// A numeric value is outside its documented range
    #[error("Parameter '{name}' out of range: {value} (valid: {range})")]
    OutOfRange {
        /// The parameter name.
        name: String,
        /// The supplied value.
        value: f64,
        /// Human-readable valid range.
        range: String,
    },

    /// The value is of the right kind but unusable
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The variant name or numeric configuration code is not recognised
    #[error("Unknown geometry variant: {0}")]
    UnknownVariant(String),

    /// Parameters are individually valid but mutually contradictory
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),
}

/// Layout error type
///
/// Raised when a derived layout cannot be realised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Components do not fit the container along an axis
    #[error("Geometry is ill-formed along {axis}: required span {required:.3} mm exceeds available {available:.3} mm")]
    Infeasible {
        /// The first failing axis.
        axis: Axis,
        /// Span the components need.
        required: f64,
        /// Span the container offers.
        available: f64,
    },

    /// A component names a parent that does not exist or comes after it
    #[error("Component '{component}' references parent '{parent}' which is not placed before it")]
    DanglingParent {
        /// The child component.
        component: String,
        /// The missing parent.
        parent: String,
    },

    /// Two components share a name
    #[error("Duplicate component name: {0}")]
    DuplicateComponent(String),

    /// The layout has no container component at its root
    #[error("Layout has no container component")]
    MissingContainer,
}

/// Sampling error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// The region tag is not declared by the layout
    #[error("Unknown vertex region '{region}' (available: {available})")]
    UnknownRegion {
        /// The requested tag.
        region: String,
        /// Comma-separated list of declared tags.
        available: String,
    },

    /// The region cannot produce points
    #[error("Degenerate vertex region '{region}': {reason}")]
    DegenerateRegion {
        /// The region tag.
        region: String,
        /// What makes it degenerate.
        reason: String,
    },
}

/// Errors reported by the external geometry toolkit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolkitError {
    /// A handle passed back to the toolkit is unknown to it
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle {
        /// Handle kind (solid, logical volume).
        kind: &'static str,
        /// Raw handle value.
        id: usize,
    },

    /// The toolkit refused an operation
    #[error("Toolkit rejected '{operation}': {reason}")]
    Rejected {
        /// The refused operation.
        operation: String,
        /// Reason given by the toolkit.
        reason: String,
    },
}

/// Main error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Layout error
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Sampling error
    #[error(transparent)]
    Sampling(#[from] SamplingError),

    /// Toolkit error
    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
}

impl Error {
    /// Shorthand for an [`ConfigError::InvalidValue`]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
        .into()
    }

    /// Shorthand for an [`ConfigError::Incompatible`]
    pub fn incompatible(message: impl Into<String>) -> Self {
        ConfigError::Incompatible(message.into()).into()
    }
}

/// Result type for layout engine operations
pub type Result<T> = std::result::Result<T, Error>;
