//! End-to-end simulation scenarios.
//!
//! These exercise the public API the way a simulation driver would:
//! build a tether, tick it, and read element state between ticks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use tether_sim::{Environment, Tether, TetherConfig, TetherElement};

#[test]
fn default_shape_chain_falls_but_endpoints_hold() {
    let mut tether = Tether::new(10.0, 100, TetherConfig::default()).unwrap();
    let head = tether.head().position();
    let tail = tether.tail().position();

    let mut interior_moved = false;
    for _ in 0..10 {
        tether.step(0.01);
    }
    for (index, element) in tether.elements().iter().enumerate() {
        if index != 0 && index != 99 && element.velocity() != Vector3::zeros() {
            interior_moved = true;
        }
    }

    assert_eq!(tether.head().position(), head);
    assert_eq!(tether.tail().position(), tail);
    assert!(interior_moved, "gravity should move the interior");
}

#[test]
fn catenary_chain_keeps_its_endpoints_through_simulation() {
    let head = Point3::new(-5.0, 3.0, 1.0);
    let tail = Point3::new(5.0, 3.0, 1.0);
    let mut tether = Tether::with_endpoints(10.0, 100, head, tail, TetherConfig::default()).unwrap();

    assert_eq!(tether.head().position(), head);
    assert_eq!(tether.tail().position(), tail);

    for _ in 0..100 {
        tether.step(0.005);
    }

    assert_eq!(tether.head().position(), head);
    assert_eq!(tether.tail().position(), tail);
}

#[test]
fn catenary_fit_residual_is_tight() {
    let head = Point3::new(-5.0, 3.0, 1.0);
    let tail = Point3::new(5.0, 3.0, 1.0);
    let tether = Tether::with_endpoints(10.0, 100, head, tail, TetherConfig::default()).unwrap();

    let fit = tether.catenary_fit().unwrap();
    assert!(
        fit.residual <= 1e-6,
        "catenary residual {} exceeds 1e-6",
        fit.residual
    );
}

#[test]
fn drag_only_chain_never_gains_kinetic_energy() {
    // Gravity and buoyancy off, controllers disabled: drag is the only
    // force left, so kinetic energy must bleed monotonically.
    let config = TetherConfig::default()
        .with_environment(Environment::zero_gravity())
        .with_length_gains(0.0, 0.0, 0.0);
    let mut tether = Tether::new(5.0, 20, config).unwrap();

    for index in 1..19 {
        let element = tether.element_mut(index).unwrap();
        element.set_velocity(Vector3::new(0.5, -0.3, 0.2));
    }

    let mut energy = tether.kinetic_energy();
    assert!(energy > 0.0);
    for _ in 0..200 {
        tether.step(0.01);
        let next_energy = tether.kinetic_energy();
        assert!(
            next_energy <= energy + 1e-12,
            "kinetic energy rose from {energy} to {next_energy}"
        );
        energy = next_energy;
    }
}

#[test]
fn zero_dt_steps_are_idempotent() {
    let mut tether = Tether::new(10.0, 50, TetherConfig::default()).unwrap();
    let positions = tether.positions();

    for _ in 0..10 {
        tether.step(0.0);
    }

    assert_eq!(tether.positions(), positions);
}

#[test]
fn fresh_element_state_matches_its_parameters() {
    let element = TetherElement::new(0.5, 0.1, 0.02);
    assert_eq!(element.x(), 0.0);
    assert_eq!(element.y(), 0.0);
    assert_eq!(element.z(), 0.0);
    assert_relative_eq!(element.mass(), 0.5);
    assert_relative_eq!(element.volume(), 0.1);
    assert_relative_eq!(element.rest_length(), 0.02);
}

#[test]
fn externally_driven_head_is_respected() {
    let mut tether = Tether::new(5.0, 10, TetherConfig::default()).unwrap();

    // The driver owns the endpoints: drag the head along X each tick.
    for tick in 1..=10 {
        let x = f64::from(tick) * 0.1;
        tether.head_mut().set_position(Point3::new(x, 0.0, 0.0));
        tether.step(0.01);
        assert_relative_eq!(tether.head().x(), x, epsilon = 1e-12);
    }
}

#[test]
fn measured_length_tracks_the_chain_shape() {
    let head = Point3::new(0.0, 0.0, 0.0);
    let tail = Point3::new(6.0, 0.0, 0.0);
    let tether = Tether::with_endpoints(8.0, 40, head, tail, TetherConfig::default()).unwrap();

    // A slack rope laid on a catenary measures close to its nominal
    // length and strictly more than the straight chord.
    let measured = tether.measured_length();
    assert!(measured > 6.0);
    assert_relative_eq!(measured, 8.0, epsilon = 0.2);
}
