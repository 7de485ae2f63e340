//! A single discretized element of a tether.
//!
//! A [`TetherElement`] is a point mass with a position, a velocity, and
//! the physical properties needed to compute the forces acting on it:
//! weight, buoyancy, quadratic drag, and the tension toward each
//! neighbor. Tension is not a stiff spring: each element owns two [`Pid`]
//! controllers that steer the distance to the previous and next element
//! toward the shared rest length, and the controller commands are read
//! back as force magnitudes.
//!
//! Elements do not hold references to their neighbors. The owning chain
//! stores all elements contiguously and hands neighbor positions into the
//! force and integration methods; an endpoint simply has no neighbor on
//! one side and is never advanced by [`step`](TetherElement::step).

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::pid::Pid;

/// Direction vectors shorter than this are treated as degenerate and
/// produce no tension force.
const MIN_SEPARATION: f64 = 1e-10;

/// Default drag coefficient for a tether element.
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 10.0;

/// Default proportional/integral/derivative gains for the length
/// controllers.
pub const DEFAULT_LENGTH_GAINS: (f64, f64, f64) = (30.0, 0.0, 2.0);

/// A point mass in the discretized tether.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TetherElement {
    /// Mass (kg).
    mass: f64,
    /// Displaced volume (m³).
    volume: f64,
    /// Rest length of the links to both neighbors (m).
    rest_length: f64,
    /// Quadratic drag coefficient.
    drag_coefficient: f64,
    /// Current position.
    position: Point3<f64>,
    /// Current velocity.
    velocity: Vector3<f64>,
    /// Controller steering the distance to the previous element.
    length_to_previous: Pid,
    /// Controller steering the distance to the next element.
    length_to_next: Pid,
}

impl TetherElement {
    /// Create an element at the origin, at rest.
    ///
    /// `mass` must be positive, `volume` non-negative and `rest_length`
    /// positive; the owning chain validates its configuration before
    /// constructing elements.
    #[must_use]
    pub fn new(mass: f64, volume: f64, rest_length: f64) -> Self {
        Self::with_position(mass, volume, rest_length, Point3::origin())
    }

    /// Create an element at rest at the given position.
    #[must_use]
    pub fn with_position(mass: f64, volume: f64, rest_length: f64, position: Point3<f64>) -> Self {
        let (p, i, d) = DEFAULT_LENGTH_GAINS;
        Self {
            mass,
            volume,
            rest_length,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            position,
            velocity: Vector3::zeros(),
            length_to_previous: Pid::new(p, i, d),
            length_to_next: Pid::new(p, i, d),
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// X coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Y coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Z coordinate (height).
    #[must_use]
    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    /// Mass (kg).
    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Displaced volume (m³).
    #[must_use]
    pub const fn volume(&self) -> f64 {
        self.volume
    }

    /// Rest length of the links to both neighbors (m).
    #[must_use]
    pub const fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Quadratic drag coefficient.
    #[must_use]
    pub const fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    /// Move the element. Intended for endpoints, which are otherwise
    /// never touched by integration.
    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    /// Overwrite the velocity.
    pub fn set_velocity(&mut self, velocity: Vector3<f64>) {
        self.velocity = velocity;
    }

    /// Replace the drag coefficient.
    pub const fn set_drag_coefficient(&mut self, drag_coefficient: f64) {
        self.drag_coefficient = drag_coefficient;
    }

    /// Replace both length controllers with copies of `controller`.
    pub fn set_length_controllers(&mut self, controller: Pid) {
        self.length_to_previous = controller.clone();
        self.length_to_next = controller;
    }

    /// Controller steering the distance to the previous element.
    #[must_use]
    pub const fn length_to_previous(&self) -> &Pid {
        &self.length_to_previous
    }

    /// Controller steering the distance to the next element.
    #[must_use]
    pub const fn length_to_next(&self) -> &Pid {
        &self.length_to_next
    }

    /// Euclidean distance from this element to `point`.
    #[must_use]
    pub fn distance_to(&self, point: Point3<f64>) -> f64 {
        (point - self.position).norm()
    }

    /// Weight force `(0, 0, -m g)`.
    #[must_use]
    pub fn gravity(&self, env: &Environment) -> Vector3<f64> {
        env.weight_on(self.mass)
    }

    /// Buoyant force `(0, 0, ρ V g)` from the displaced water.
    #[must_use]
    pub fn buoyancy(&self, env: &Environment) -> Vector3<f64> {
        env.buoyancy_on(self.volume)
    }

    /// Per-axis quadratic drag `-f · |v| v`.
    ///
    /// Magnitude grows with the square of the speed and each component
    /// opposes the velocity on that axis.
    #[must_use]
    pub fn drag(&self) -> Vector3<f64> {
        self.velocity.map(|v| -self.drag_coefficient * v.abs() * v)
    }

    /// Tension toward the previous element from the last controller
    /// command, without updating the controller.
    ///
    /// Zero when there is no previous neighbor.
    #[must_use]
    pub fn tension_to_previous(&self, previous: Option<Point3<f64>>) -> Vector3<f64> {
        previous.map_or_else(Vector3::zeros, |prev| {
            -self.length_to_previous.cmd() * unit_toward(self.position, prev)
        })
    }

    /// Tension toward the next element from the last controller command,
    /// without updating the controller.
    ///
    /// Zero when there is no next neighbor. Note the sign convention is
    /// the mirror of [`tension_to_previous`](Self::tension_to_previous).
    #[must_use]
    pub fn tension_to_next(&self, next: Option<Point3<f64>>) -> Vector3<f64> {
        next.map_or_else(Vector3::zeros, |next| {
            self.length_to_next.cmd() * unit_toward(self.position, next)
        })
    }

    /// Update the previous-length controller with the current distance
    /// error and return the resulting tension force.
    ///
    /// This is the variant used during integration.
    pub fn regulate_tension_to_previous(
        &mut self,
        previous: Option<Point3<f64>>,
        dt: f64,
    ) -> Vector3<f64> {
        if let Some(prev) = previous {
            let error = self.distance_to(prev) - self.rest_length;
            self.length_to_previous.update(error, dt);
        }
        self.tension_to_previous(previous)
    }

    /// Update the next-length controller with the current distance error
    /// and return the resulting tension force.
    pub fn regulate_tension_to_next(&mut self, next: Option<Point3<f64>>, dt: f64) -> Vector3<f64> {
        if let Some(next_pos) = next {
            let error = self.distance_to(next_pos) - self.rest_length;
            self.length_to_next.update(error, dt);
        }
        self.tension_to_next(next)
    }

    /// Acceleration from the current controller commands, without
    /// updating the controllers.
    #[must_use]
    pub fn current_acceleration(
        &self,
        previous: Option<Point3<f64>>,
        next: Option<Point3<f64>>,
        env: &Environment,
    ) -> Vector3<f64> {
        let force = self.gravity(env)
            + self.buoyancy(env)
            + self.drag()
            + self.tension_to_previous(previous)
            + self.tension_to_next(next);
        force / self.mass
    }

    /// Acceleration for this timestep: both length controllers are
    /// stepped with the current distance errors, then the five forces are
    /// summed and divided by the mass.
    pub fn acceleration(
        &mut self,
        previous: Option<Point3<f64>>,
        next: Option<Point3<f64>>,
        env: &Environment,
        dt: f64,
    ) -> Vector3<f64> {
        let tension_previous = self.regulate_tension_to_previous(previous, dt);
        let tension_next = self.regulate_tension_to_next(next, dt);
        let force =
            self.gravity(env) + self.buoyancy(env) + self.drag() + tension_previous + tension_next;
        force / self.mass
    }

    /// Advance the element by one Euler increment.
    ///
    /// Only interior elements move: when either neighbor is absent the
    /// element is an endpoint and its state is left untouched. Velocity
    /// is updated first and the position uses the updated velocity.
    pub fn step(
        &mut self,
        previous: Option<Point3<f64>>,
        next: Option<Point3<f64>>,
        env: &Environment,
        dt: f64,
    ) {
        if previous.is_none() || next.is_none() {
            return;
        }

        let acceleration = self.acceleration(previous, next, env, dt);
        self.velocity += dt * acceleration;
        self.position += dt * self.velocity;
    }

    /// Kinetic energy `½ m |v|²`.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }
}

/// Unit vector pointing from `from` toward `to`, or zero when the two
/// points (nearly) coincide.
fn unit_toward(from: Point3<f64>, to: Point3<f64>) -> Vector3<f64> {
    let direction = to - from;
    let norm = direction.norm();
    if norm > MIN_SEPARATION {
        direction / norm
    } else {
        Vector3::zeros()
    }
}
