//! Material and optical-surface descriptors
//!
//! These are names handed to the external geometry toolkit; the property
//! tables behind them live in the toolkit, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bulk material of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Liquid argon, the medium every assembly sits in
    LiquidArgon,
    /// PMMA wavelength-shifting bar
    WlsPmma,
    /// Eljen EJ-286 wavelength-shifting plate
    WlsEj286,
    /// Fused-silica dichroic filter substrate
    DichroicGlass,
    /// p-Terphenyl evaporated coating
    PTerphenyl,
    /// Plastic scintillator slab
    Scintillator,
    /// SiPM active silicon
    Silicon,
    /// FR-4 readout board
    Fr4,
    /// Vikuiti specular reflector foil
    Vikuiti,
    /// Frame and holder plastic
    Ptfe,
    /// Stainless steel
    Steel,
}

impl Material {
    /// Name registered with the toolkit
    pub fn name(&self) -> &'static str {
        match self {
            Material::LiquidArgon => "LAr",
            Material::WlsPmma => "PMMA_WLS",
            Material::WlsEj286 => "EJ286",
            Material::DichroicGlass => "FusedSilica",
            Material::PTerphenyl => "pTP",
            Material::Scintillator => "PlasticScint",
            Material::Silicon => "Silicon",
            Material::Fr4 => "FR4",
            Material::Vikuiti => "Vikuiti",
            Material::Ptfe => "PTFE",
            Material::Steel => "StainlessSteel",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Optical surface model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceModel {
    Glisur,
    Unified,
    Dichroic,
}

/// Surface finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceFinish {
    Polished,
    Ground,
    PolishedFrontPainted,
}

/// Interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    DielectricDielectric,
    DielectricMetal,
    DielectricDichroic,
}

/// Optical surface attached to a volume's skin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalSurface {
    pub model: SurfaceModel,
    pub finish: SurfaceFinish,
    pub kind: SurfaceKind,
    /// Micro-facet roughness (sigma alpha), radians
    pub roughness: f64,
}

impl OpticalSurface {
    /// Polished dielectric interface, used for WLS bars and scintillators
    pub fn polished() -> Self {
        Self {
            model: SurfaceModel::Glisur,
            finish: SurfaceFinish::Polished,
            kind: SurfaceKind::DielectricDielectric,
            roughness: 0.0,
        }
    }

    /// Rough evaporated coating
    pub fn ground(roughness: f64) -> Self {
        Self {
            model: SurfaceModel::Unified,
            finish: SurfaceFinish::Ground,
            kind: SurfaceKind::DielectricDielectric,
            roughness,
        }
    }

    /// Dichroic filter; transmission comes from an external data file
    pub fn dichroic() -> Self {
        Self {
            model: SurfaceModel::Dichroic,
            finish: SurfaceFinish::Polished,
            kind: SurfaceKind::DielectricDichroic,
            roughness: 0.0,
        }
    }

    /// Specular reflector foil
    pub fn reflector() -> Self {
        Self {
            model: SurfaceModel::Unified,
            finish: SurfaceFinish::PolishedFrontPainted,
            kind: SurfaceKind::DielectricMetal,
            roughness: 0.0,
        }
    }

    /// Whether the toolkit needs the dichroic transmission table
    pub fn needs_dichroic_data(&self) -> bool {
        self.kind == SurfaceKind::DielectricDichroic
    }
}
