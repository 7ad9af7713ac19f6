//! Axes and discrete rotations
//!
//! All lengths in this workspace are millimetres. The frame convention is:
//! x = length, y = thickness/height (the stacking axis), z = width.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in millimetres
pub type Point3D = Point3<f64>;

/// A displacement or extent in millimetres
pub type Vec3 = Vector3<f64>;

/// Cartesian axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Length axis
    X,
    /// Thickness / stacking axis
    Y,
    /// Width axis
    Z,
}

impl Axis {
    /// All axes in checking order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a vector
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Extract this axis' component
    pub fn of(self, v: &Vec3) -> f64 {
        v[self.index()]
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            _ => Err(format!("Unknown axis: {}", s)),
        }
    }
}

/// Rotation by a whole number of quarter turns about one axis
///
/// Right-handed: one quarter turn about x maps +y onto +z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub axis: Axis,
    pub quarter_turns: u8,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rotation {
    /// No rotation
    pub const IDENTITY: Rotation = Rotation {
        axis: Axis::Z,
        quarter_turns: 0,
    };

    /// Rotation of `quarter_turns * 90` degrees about `axis`
    pub fn quarter(axis: Axis, quarter_turns: u8) -> Self {
        Self {
            axis,
            quarter_turns: quarter_turns % 4,
        }
    }

    /// Whether this rotation leaves every vector unchanged
    pub fn is_identity(&self) -> bool {
        self.quarter_turns % 4 == 0
    }

    /// Rotation angle in degrees
    pub fn degrees(&self) -> f64 {
        f64::from(self.quarter_turns % 4) * 90.0
    }

    /// Rotate a vector
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        let mut out = *v;
        for _ in 0..(self.quarter_turns % 4) {
            out = match self.axis {
                Axis::X => Vec3::new(out.x, -out.z, out.y),
                Axis::Y => Vec3::new(out.z, out.y, -out.x),
                Axis::Z => Vec3::new(-out.y, out.x, out.z),
            };
        }
        out
    }

    /// Rotate a half-extent; the result stays non-negative
    pub fn apply_extent(&self, half: &Vec3) -> Vec3 {
        self.apply(half).abs()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            write!(f, "none")
        } else {
            write!(f, "{}deg about {}", self.degrees(), self.axis)
        }
    }
}
