//! The tether: an ordered chain of point-mass elements.
//!
//! A [`Tether`] owns all of its [`TetherElement`]s in one contiguous
//! arena; neighbors are simply the adjacent indices, so there are no
//! ownership cycles to break. The element at index 0 is the head, the
//! element at index `n - 1` is the tail, and both are pinned: only
//! interior elements are advanced by [`step`](Tether::step).
//!
//! # Update ordering
//!
//! [`step`](Tether::step) advances elements in place from head to tail.
//! An element therefore reads the *already updated* position of its
//! previous neighbor and the not-yet-updated position of its next
//! neighbor within the same tick. This is the documented policy (and the
//! cheaper one); synchronous semantics would require double-buffering
//! element state, which this single-threaded core does not need.
//!
//! # Construction
//!
//! Without endpoint positions, elements start on a deterministic
//! sagging curve (fixed horizontal spacing, sinusoidal vertical offset)
//! that is purely cosmetic. With endpoint positions, the interior
//! elements are placed on a fitted catenary (see [`crate::catenary`])
//! and the endpoints are pinned exactly to the given positions.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catenary::{CatenaryFit, CatenarySolver};
use crate::element::{DEFAULT_DRAG_COEFFICIENT, DEFAULT_LENGTH_GAINS, TetherElement};
use crate::environment::Environment;
use crate::error::TetherError;
use crate::pid::Pid;

/// Relative amplitude of the cosmetic vertical sag used by
/// [`Tether::new`].
const DEFAULT_SAG_RATIO: f64 = 0.1;

/// Per-element physical configuration for a tether.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TetherConfig {
    /// Mass of each element (kg).
    pub mass: f64,
    /// Displaced volume of each element (m³).
    pub volume: f64,
    /// Quadratic drag coefficient of each element.
    pub drag_coefficient: f64,
    /// Proportional/integral/derivative gains of the length controllers.
    pub length_gains: (f64, f64, f64),
    /// Ambient constants captured by the tether.
    pub environment: Environment,
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            volume: 1e-4,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            length_gains: DEFAULT_LENGTH_GAINS,
            environment: Environment::freshwater(),
        }
    }
}

impl TetherConfig {
    /// Set the per-element mass.
    #[must_use]
    pub const fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set the per-element displaced volume.
    #[must_use]
    pub const fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Set the per-element drag coefficient.
    #[must_use]
    pub const fn with_drag_coefficient(mut self, drag_coefficient: f64) -> Self {
        self.drag_coefficient = drag_coefficient;
        self
    }

    /// Set the length-controller gains.
    #[must_use]
    pub const fn with_length_gains(mut self, p: f64, i: f64, d: f64) -> Self {
        self.length_gains = (p, i, d);
        self
    }

    /// Set the ambient environment.
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Check the configuration for physically meaningless values.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::InvalidConfig`] when the mass is not
    /// positive and finite, or the volume or drag coefficient is
    /// negative.
    pub fn validate(&self) -> Result<(), TetherError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(TetherError::invalid_config(format!(
                "element mass must be positive and finite, got {}",
                self.mass
            )));
        }
        if !(self.volume.is_finite() && self.volume >= 0.0) {
            return Err(TetherError::invalid_config(format!(
                "element volume must be non-negative, got {}",
                self.volume
            )));
        }
        if !(self.drag_coefficient.is_finite() && self.drag_coefficient >= 0.0) {
            return Err(TetherError::invalid_config(format!(
                "drag coefficient must be non-negative, got {}",
                self.drag_coefficient
            )));
        }
        Ok(())
    }
}

/// A tether simulated as a chain of point masses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tether {
    /// All elements, head first. Neighbors are adjacent indices.
    elements: Vec<TetherElement>,
    /// Nominal total length (m).
    nominal_length: f64,
    /// Ambient constants captured at construction.
    environment: Environment,
    /// The catenary fit used to place the interior elements, when the
    /// tether was built from endpoint positions.
    catenary_fit: Option<CatenaryFit>,
}

impl Tether {
    /// Create a tether of `n` elements on the default sagging curve.
    ///
    /// The rest length of every link is `length / (n - 1)`. The initial
    /// shape is deterministic and purely cosmetic: elements are spaced
    /// evenly along X with a sinusoidal dip in Z.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::InvalidElementCount`] when `n < 2`,
    /// [`TetherError::InvalidLength`] when `length` is not positive and
    /// finite, or [`TetherError::InvalidConfig`] for meaningless element
    /// properties.
    pub fn new(length: f64, n: usize, config: TetherConfig) -> Result<Self, TetherError> {
        let rest_length = validate(length, n, &config)?;

        let span = (n - 1) as f64;
        let elements = (0..n)
            .map(|i| {
                let t = i as f64 / span;
                let position = Point3::new(
                    t * length,
                    0.0,
                    -DEFAULT_SAG_RATIO * length * (std::f64::consts::PI * t).sin(),
                );
                build_element(&config, rest_length, position)
            })
            .collect();

        Ok(Self {
            elements,
            nominal_length: length,
            environment: config.environment,
            catenary_fit: None,
        })
    }

    /// Create a tether between two fixed endpoints, with the interior
    /// elements placed on a fitted catenary.
    ///
    /// The head and tail are pinned exactly to `head` and `tail`; the
    /// catenary fit never perturbs them. The fit itself is available
    /// through [`catenary_fit`](Self::catenary_fit) so callers can check
    /// its residual; a fit that stopped at the iteration cap is reported
    /// there (and logged) rather than treated as an error.
    ///
    /// # Errors
    ///
    /// Construction errors as for [`new`](Self::new), plus
    /// [`TetherError::DegenerateEndpoints`] when the endpoints have no
    /// horizontal separation.
    pub fn with_endpoints(
        length: f64,
        n: usize,
        head: Point3<f64>,
        tail: Point3<f64>,
        config: TetherConfig,
    ) -> Result<Self, TetherError> {
        let rest_length = validate(length, n, &config)?;

        let fit = CatenarySolver::default().solve(head, tail, length)?;

        let dx = tail.x - head.x;
        let dy = tail.y - head.y;
        let rmax = dx.hypot(dy);
        let bearing = (dx / rmax, dy / rmax);

        let elements = (0..n)
            .map(|i| {
                let position = if i == 0 {
                    head
                } else if i == n - 1 {
                    tail
                } else {
                    let s = i as f64 * length / n as f64;
                    let r = fit.radius_at_arclength(s);
                    Point3::new(
                        head.x + r * bearing.0,
                        head.y + r * bearing.1,
                        fit.height_at(r),
                    )
                };
                build_element(&config, rest_length, position)
            })
            .collect();

        Ok(Self {
            elements,
            nominal_length: length,
            environment: config.environment,
            catenary_fit: Some(fit),
        })
    }

    /// Advance the whole chain by one tick of `dt` seconds.
    ///
    /// Elements are updated in place from head to tail; the endpoint
    /// guard in [`TetherElement::step`] keeps head and tail fixed. This
    /// call is blocking and non-reentrant — external readers must only
    /// observe the chain between ticks.
    pub fn step(&mut self, dt: f64) {
        for i in 0..self.elements.len() {
            let previous = if i > 0 {
                Some(self.elements[i - 1].position())
            } else {
                None
            };
            let next = if i + 1 < self.elements.len() {
                Some(self.elements[i + 1].position())
            } else {
                None
            };
            self.elements[i].step(previous, next, &self.environment, dt);
        }
    }

    /// Number of elements in the chain.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The nominal total length the tether was built with.
    #[must_use]
    pub const fn nominal_length(&self) -> f64 {
        self.nominal_length
    }

    /// The current total length: the sum of the distances between every
    /// adjacent pair of elements.
    ///
    /// Drifts away from [`nominal_length`](Self::nominal_length) as the
    /// links stretch and contract.
    #[must_use]
    pub fn measured_length(&self) -> f64 {
        self.elements
            .windows(2)
            .map(|pair| pair[0].distance_to(pair[1].position()))
            .sum()
    }

    /// The head element.
    #[must_use]
    pub fn head(&self) -> &TetherElement {
        &self.elements[0]
    }

    /// The tail element.
    #[must_use]
    pub fn tail(&self) -> &TetherElement {
        &self.elements[self.elements.len() - 1]
    }

    /// Mutable access to the head, for externally driven endpoints.
    pub fn head_mut(&mut self) -> &mut TetherElement {
        &mut self.elements[0]
    }

    /// Mutable access to the tail, for externally driven endpoints.
    pub fn tail_mut(&mut self) -> &mut TetherElement {
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }

    /// The element at `index`, head first.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&TetherElement> {
        self.elements.get(index)
    }

    /// Mutable access to the element at `index`.
    pub fn element_mut(&mut self, index: usize) -> Option<&mut TetherElement> {
        self.elements.get_mut(index)
    }

    /// All elements, head first.
    #[must_use]
    pub fn elements(&self) -> &[TetherElement] {
        &self.elements
    }

    /// The previous neighbor of the element at `index`, if any.
    #[must_use]
    pub fn previous(&self, index: usize) -> Option<&TetherElement> {
        index.checked_sub(1).and_then(|i| self.elements.get(i))
    }

    /// The next neighbor of the element at `index`, if any.
    #[must_use]
    pub fn next(&self, index: usize) -> Option<&TetherElement> {
        self.elements.get(index + 1)
    }

    /// A snapshot of every element position, head first.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.elements.iter().map(TetherElement::position).collect()
    }

    /// The ambient constants captured at construction.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The catenary fit used to place the interior elements, when the
    /// tether was constructed from endpoint positions.
    #[must_use]
    pub const fn catenary_fit(&self) -> Option<&CatenaryFit> {
        self.catenary_fit.as_ref()
    }

    /// Total kinetic energy of the chain.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.elements.iter().map(TetherElement::kinetic_energy).sum()
    }
}

/// Validate construction parameters and return the per-link rest length.
fn validate(length: f64, n: usize, config: &TetherConfig) -> Result<f64, TetherError> {
    if n < 2 {
        return Err(TetherError::InvalidElementCount(n));
    }
    if !(length.is_finite() && length > 0.0) {
        return Err(TetherError::InvalidLength(length));
    }
    config.validate()?;
    Ok(length / (n - 1) as f64)
}

/// Build one element from the shared configuration.
fn build_element(config: &TetherConfig, rest_length: f64, position: Point3<f64>) -> TetherElement {
    let mut element =
        TetherElement::with_position(config.mass, config.volume, rest_length, position);
    element.set_drag_coefficient(config.drag_coefficient);
    let (p, i, d) = config.length_gains;
    element.set_length_controllers(Pid::new(p, i, d));
    element
}
