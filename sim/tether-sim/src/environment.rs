//! Ambient physical constants for the surrounding fluid.
//!
//! Gravity and water density are configuration, not globals: every chain
//! captures an [`Environment`] at construction, so tests can vary the
//! ambient parameters deterministically.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gravity and fluid properties acting on every element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Environment {
    /// Acceleration due to gravity (m/s²), acting along −Z.
    pub gravity: f64,
    /// Density of the surrounding water (kg/m³).
    pub water_density: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self::freshwater()
    }
}

impl Environment {
    /// Earth gravity in fresh water (9.81 m/s², 997 kg/m³).
    #[must_use]
    pub const fn freshwater() -> Self {
        Self {
            gravity: 9.81,
            water_density: 997.0,
        }
    }

    /// Earth gravity in sea water (9.81 m/s², 1025 kg/m³).
    #[must_use]
    pub const fn seawater() -> Self {
        Self {
            gravity: 9.81,
            water_density: 1025.0,
        }
    }

    /// No gravity, fresh-water density.
    ///
    /// Gravity and buoyancy both vanish, which isolates drag and tension
    /// effects.
    #[must_use]
    pub const fn zero_gravity() -> Self {
        Self {
            gravity: 0.0,
            water_density: 997.0,
        }
    }

    /// Custom gravity and water density.
    #[must_use]
    pub const fn custom(gravity: f64, water_density: f64) -> Self {
        Self {
            gravity,
            water_density,
        }
    }

    /// Weight force on a point mass (N, along −Z).
    #[must_use]
    pub fn weight_on(&self, mass: f64) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -mass * self.gravity)
    }

    /// Buoyant force on a displaced volume (N, along +Z).
    #[must_use]
    pub fn buoyancy_on(&self, volume: f64) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.water_density * volume * self.gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_freshwater() {
        assert_eq!(Environment::default(), Environment::freshwater());
    }

    #[test]
    fn test_seawater_is_denser() {
        assert!(Environment::seawater().water_density > Environment::freshwater().water_density);
    }

    #[test]
    fn test_weight_opposes_buoyancy() {
        let env = Environment::freshwater();
        let weight = env.weight_on(2.0);
        let buoyancy = env.buoyancy_on(0.001);

        assert_relative_eq!(weight.z, -2.0 * 9.81, epsilon = 1e-12);
        assert_relative_eq!(buoyancy.z, 997.0 * 0.001 * 9.81, epsilon = 1e-12);
        assert!(weight.z < 0.0 && buoyancy.z > 0.0);
    }

    #[test]
    fn test_zero_gravity_kills_both() {
        let env = Environment::zero_gravity();
        assert_eq!(env.weight_on(5.0), Vector3::zeros());
        assert_eq!(env.buoyancy_on(5.0), Vector3::zeros());
    }
}
