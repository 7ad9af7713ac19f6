//! X-ARAPUCA Settings Crate
//!
//! Loads, validates and saves geometry configuration files.

pub mod config;
pub mod error;

pub use config::{ConfigFormat, GeometryConfig, SamplingSettings};
pub use error::{Result, SettingsError};
