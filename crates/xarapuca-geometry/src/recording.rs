//! In-memory toolkit that records every construction call
//!
//! Used by the CLI to print a construction plan and by tests to check call
//! order without a real transport toolkit.

use crate::layout::Solid;
use crate::placement::{GeometryToolkit, LogicalId, SolidId};
use std::fmt;
use std::path::{Path, PathBuf};
use xarapuca_core::{Material, OpticalSurface, Result, Rotation, ToolkitError, Vec3};

/// One recorded toolkit call
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructionStep {
    DefineMaterial {
        material: Material,
    },
    BuildSolid {
        id: SolidId,
        name: String,
        solid: Solid,
    },
    Subtract {
        id: SolidId,
        name: String,
        base: SolidId,
        tool: SolidId,
        offset: Vec3,
        rotation: Rotation,
    },
    CreateLogical {
        id: LogicalId,
        name: String,
        solid: SolidId,
        material: Material,
    },
    Place {
        name: String,
        logical: LogicalId,
        offset: Vec3,
        rotation: Rotation,
        parent: Option<LogicalId>,
    },
    OpticalSurface {
        name: String,
        logical: LogicalId,
        surface: OpticalSurface,
        dichroic_data: Option<PathBuf>,
    },
    SensitiveDetector {
        logical: LogicalId,
        name: String,
    },
}

impl fmt::Display for ConstructionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionStep::DefineMaterial { material } => write!(f, "material  {}", material),
            ConstructionStep::BuildSolid { id, name, solid } => {
                write!(f, "solid     #{} {} ({})", id.0, name, solid.describe())
            }
            ConstructionStep::Subtract {
                id,
                name,
                base,
                tool,
                offset,
                rotation,
            } => write!(
                f,
                "subtract  #{} {} = #{} - #{} at ({:.3}, {:.3}, {:.3}) rot {}",
                id.0, name, base.0, tool.0, offset.x, offset.y, offset.z, rotation
            ),
            ConstructionStep::CreateLogical {
                id,
                name,
                solid,
                material,
            } => write!(f, "logical   @{} {} = #{} in {}", id.0, name, solid.0, material),
            ConstructionStep::Place {
                name,
                logical,
                offset,
                rotation,
                parent,
            } => {
                write!(
                    f,
                    "place     {} (@{}) at ({:.3}, {:.3}, {:.3}) rot {}",
                    name, logical.0, offset.x, offset.y, offset.z, rotation
                )?;
                match parent {
                    Some(p) => write!(f, " in @{}", p.0),
                    None => write!(f, " as world"),
                }
            }
            ConstructionStep::OpticalSurface {
                name,
                logical,
                surface,
                dichroic_data,
            } => {
                write!(
                    f,
                    "surface   {} on @{} {:?}/{:?}",
                    name, logical.0, surface.model, surface.finish
                )?;
                if let Some(path) = dichroic_data {
                    write!(f, " data {}", path.display())?;
                }
                Ok(())
            }
            ConstructionStep::SensitiveDetector { logical, name } => {
                write!(f, "detector  {} on @{}", name, logical.0)
            }
        }
    }
}

/// Toolkit that records calls instead of building anything
#[derive(Debug, Default)]
pub struct RecordingToolkit {
    steps: Vec<ConstructionStep>,
    solids: usize,
    logicals: usize,
    materials: Vec<Material>,
}

impl RecordingToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[ConstructionStep] {
        &self.steps
    }

    /// One line per recorded call
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn check_solid(&self, id: SolidId) -> Result<()> {
        if id.0 >= self.solids {
            return Err(ToolkitError::UnknownHandle {
                kind: "solid",
                id: id.0,
            }
            .into());
        }
        Ok(())
    }

    fn check_logical(&self, id: LogicalId) -> Result<()> {
        if id.0 >= self.logicals {
            return Err(ToolkitError::UnknownHandle {
                kind: "logical volume",
                id: id.0,
            }
            .into());
        }
        Ok(())
    }

    fn next_solid(&mut self) -> SolidId {
        self.solids += 1;
        SolidId(self.solids - 1)
    }
}

impl GeometryToolkit for RecordingToolkit {
    fn begin(&mut self, _world: &str) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn define_material(&mut self, material: Material) -> Result<()> {
        if self.materials.contains(&material) {
            return Err(ToolkitError::Rejected {
                operation: "define_material".to_string(),
                reason: format!("{} defined twice", material),
            }
            .into());
        }
        self.materials.push(material);
        self.steps.push(ConstructionStep::DefineMaterial { material });
        Ok(())
    }

    fn build_solid(&mut self, name: &str, solid: &Solid) -> Result<SolidId> {
        let id = self.next_solid();
        self.steps.push(ConstructionStep::BuildSolid {
            id,
            name: name.to_string(),
            solid: *solid,
        });
        Ok(id)
    }

    fn subtract(
        &mut self,
        name: &str,
        base: SolidId,
        tool: SolidId,
        offset: Vec3,
        rotation: Rotation,
    ) -> Result<SolidId> {
        self.check_solid(base)?;
        self.check_solid(tool)?;
        let id = self.next_solid();
        self.steps.push(ConstructionStep::Subtract {
            id,
            name: name.to_string(),
            base,
            tool,
            offset,
            rotation,
        });
        Ok(id)
    }

    fn create_logical(
        &mut self,
        name: &str,
        solid: SolidId,
        material: Material,
    ) -> Result<LogicalId> {
        self.check_solid(solid)?;
        if !self.materials.contains(&material) {
            return Err(ToolkitError::Rejected {
                operation: "create_logical".to_string(),
                reason: format!("material {} used before definition", material),
            }
            .into());
        }
        let id = LogicalId(self.logicals);
        self.logicals += 1;
        self.steps.push(ConstructionStep::CreateLogical {
            id,
            name: name.to_string(),
            solid,
            material,
        });
        Ok(id)
    }

    fn place(
        &mut self,
        name: &str,
        logical: LogicalId,
        offset: Vec3,
        rotation: Rotation,
        parent: Option<LogicalId>,
    ) -> Result<()> {
        self.check_logical(logical)?;
        if let Some(p) = parent {
            self.check_logical(p)?;
        }
        self.steps.push(ConstructionStep::Place {
            name: name.to_string(),
            logical,
            offset,
            rotation,
            parent,
        });
        Ok(())
    }

    fn create_optical_surface(
        &mut self,
        name: &str,
        logical: LogicalId,
        surface: &OpticalSurface,
        dichroic_data: Option<&Path>,
    ) -> Result<()> {
        self.check_logical(logical)?;
        self.steps.push(ConstructionStep::OpticalSurface {
            name: name.to_string(),
            logical,
            surface: *surface,
            dichroic_data: dichroic_data.map(Path::to_path_buf),
        });
        Ok(())
    }

    fn register_sensitive_detector(&mut self, logical: LogicalId, name: &str) -> Result<()> {
        self.check_logical(logical)?;
        self.steps.push(ConstructionStep::SensitiveDetector {
            logical,
            name: name.to_string(),
        });
        Ok(())
    }
}
