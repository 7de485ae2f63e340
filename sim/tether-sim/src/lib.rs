//! Discrete point-mass tether dynamics.
//!
//! `tether-sim` simulates a flexible tether (cable, rope) as a chain of
//! point masses connected by compliant links:
//!
//! - [`Tether`] - the chain itself: element storage, global lengths, and
//!   the per-tick [`step`](Tether::step)
//! - [`TetherElement`] - one point mass: state, physical properties, and
//!   the five force contributions (weight, buoyancy, drag, tension to
//!   each neighbor)
//! - [`Pid`] - the feedback controller regulating each link's length
//! - [`CatenarySolver`] - nonlinear fit of the initial catenary shape
//!   between two fixed endpoints
//! - [`Environment`] - gravity and water density, passed in rather than
//!   read from globals
//!
//! # Design
//!
//! The core is single-threaded and synchronous: [`Tether::step`] runs to
//! completion before the next tick or any external read. Consumers such
//! as renderers or bounding-region contractors read element positions
//! between ticks and never mutate them. Tension is behavioral rather
//! than elastic: each element's two [`Pid`] controllers steer the link
//! distances toward the shared rest length, and their commands are
//! applied as force magnitudes along the link directions.
//!
//! # Coordinate System
//!
//! X right, Y forward, Z up, right-handed. Gravity acts along −Z.
//!
//! # Example
//!
//! ```
//! use nalgebra::Point3;
//! use tether_sim::{Tether, TetherConfig};
//!
//! // A 10 m tether of 50 elements slung between two fixed points.
//! let mut tether = Tether::with_endpoints(
//!     10.0,
//!     50,
//!     Point3::new(-4.0, 0.0, 0.0),
//!     Point3::new(4.0, 0.0, 0.0),
//!     TetherConfig::default(),
//! )?;
//!
//! for _ in 0..100 {
//!     tether.step(0.01);
//! }
//!
//! // Endpoints stay pinned; the interior evolves.
//! assert_eq!(tether.head().position(), Point3::new(-4.0, 0.0, 0.0));
//! assert_eq!(tether.element_count(), 50);
//! # Ok::<(), tether_sim::TetherError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

mod catenary;
mod chain;
mod element;
mod environment;
mod error;
mod pid;

pub use catenary::{CatenaryFit, CatenarySolver, CatenarySolverConfig};
pub use chain::{Tether, TetherConfig};
pub use element::{DEFAULT_DRAG_COEFFICIENT, DEFAULT_LENGTH_GAINS, TetherElement};
pub use environment::Environment;
pub use error::TetherError;
pub use pid::Pid;
