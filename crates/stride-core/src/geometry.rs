//! Physical foot parameters.
//!
//! The foot-local frame has its origin at the centre of the sole on the
//! ground, the x-axis pointing forward (towards the toe), the y-axis pointing
//! left and the z-axis up.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable per-foot geometry used to locate the toe and heel pivots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FootGeometryDef")]
pub struct FootGeometry {
    ankle_position: Vector3<f64>,
    sole_width: f64,
    sole_length: f64,
}

impl FootGeometry {
    /// Create a descriptor. The ankle must lie above the sole footprint.
    pub fn new(
        ankle_position: Vector3<f64>,
        sole_width: f64,
        sole_length: f64,
    ) -> Result<Self, ConfigError> {
        if !(sole_width.is_finite() && sole_width > 0.0) {
            return Err(ConfigError::InvalidGeometry("sole_width must be > 0"));
        }
        if !(sole_length.is_finite() && sole_length > 0.0) {
            return Err(ConfigError::InvalidGeometry("sole_length must be > 0"));
        }
        if !ankle_position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidGeometry("ankle_position must be finite"));
        }
        if ankle_position.z <= 0.0 {
            return Err(ConfigError::InvalidGeometry(
                "ankle must be above the sole (z > 0)",
            ));
        }
        if ankle_position.x.abs() >= sole_length * 0.5 || ankle_position.y.abs() >= sole_width * 0.5
        {
            return Err(ConfigError::InvalidGeometry(
                "ankle must project inside the sole",
            ));
        }
        Ok(Self {
            ankle_position,
            sole_width,
            sole_length,
        })
    }

    /// Sole `(width, length)` in meters.
    #[must_use]
    pub const fn sole_size(&self) -> (f64, f64) {
        (self.sole_width, self.sole_length)
    }

    /// Ankle position in the foot-local frame.
    #[must_use]
    pub const fn ankle_position_in_local_frame(&self) -> Vector3<f64> {
        self.ankle_position
    }

    /// Height of the ankle above the sole.
    #[must_use]
    pub fn ankle_height(&self) -> f64 {
        self.ankle_position.z
    }

    /// Horizontal distance from the ankle forward to the toe edge.
    #[must_use]
    pub fn toe_lever(&self) -> f64 {
        self.sole_length * 0.5 - self.ankle_position.x
    }

    /// Horizontal distance from the ankle back to the heel edge.
    #[must_use]
    pub fn heel_lever(&self) -> f64 {
        self.sole_length * 0.5 + self.ankle_position.x
    }
}

/// Unvalidated wire form of [`FootGeometry`].
#[derive(Deserialize)]
struct FootGeometryDef {
    ankle_position: Vector3<f64>,
    sole_width: f64,
    sole_length: f64,
}

impl TryFrom<FootGeometryDef> for FootGeometry {
    type Error = ConfigError;

    fn try_from(def: FootGeometryDef) -> Result<Self, ConfigError> {
        Self::new(def.ankle_position, def.sole_width, def.sole_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hrp2_like() -> FootGeometry {
        FootGeometry::new(Vector3::new(0.0, 0.0, 0.105), 0.138, 0.2172).unwrap()
    }

    #[test]
    fn accessors_return_construction_values() {
        let foot = hrp2_like();
        let (w, l) = foot.sole_size();
        assert_relative_eq!(w, 0.138);
        assert_relative_eq!(l, 0.2172);
        assert_relative_eq!(foot.ankle_position_in_local_frame().z, 0.105);
        assert_relative_eq!(foot.ankle_height(), 0.105);
    }

    #[test]
    fn levers_split_sole_length() {
        let foot = FootGeometry::new(Vector3::new(0.02, 0.0, 0.1), 0.1, 0.2).unwrap();
        assert_relative_eq!(foot.toe_lever(), 0.08, epsilon = 1e-12);
        assert_relative_eq!(foot.heel_lever(), 0.12, epsilon = 1e-12);
        assert_relative_eq!(foot.toe_lever() + foot.heel_lever(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn rejects_degenerate_soles() {
        assert!(FootGeometry::new(Vector3::new(0.0, 0.0, 0.1), 0.0, 0.2).is_err());
        assert!(FootGeometry::new(Vector3::new(0.0, 0.0, 0.1), 0.1, -0.2).is_err());
        assert!(FootGeometry::new(Vector3::new(0.0, 0.0, 0.0), 0.1, 0.2).is_err());
        assert!(FootGeometry::new(Vector3::new(0.15, 0.0, 0.1), 0.1, 0.2).is_err());
        assert!(FootGeometry::new(Vector3::new(0.0, f64::NAN, 0.1), 0.1, 0.2).is_err());
    }

    #[test]
    fn deserializes_from_toml() {
        let foot: FootGeometry = toml::from_str(
            "ankle_position = [0.0, 0.0, 0.105]\nsole_width = 0.138\nsole_length = 0.2172\n",
        )
        .unwrap();
        assert_eq!(foot, hrp2_like());
    }

    #[test]
    fn deserialization_validates() {
        let result: Result<FootGeometry, _> = toml::from_str(
            "ankle_position = [0.0, 0.0, 0.105]\nsole_width = -1.0\nsole_length = 0.2172\n",
        );
        assert!(result.is_err());
    }
}
