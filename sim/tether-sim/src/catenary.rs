//! Catenary shape fitting for tether initialization.
//!
//! Given the two endpoint positions and the total rope length, the solver
//! finds the parameters `(c1, c2, c3)` of the catenary hanging in the
//! vertical plane through both endpoints:
//!
//! ```text
//! c1 * (sinh((rmax + c2) / c1) - sinh(c2 / c1)) - L       = 0
//! c1 * cosh(c2 / c1)          + c3 - z_head               = 0
//! c1 * cosh((rmax + c2) / c1) + c3 - z_tail               = 0
//! ```
//!
//! where `rmax` is the horizontal distance between the endpoints. The
//! 3×3 nonlinear system is solved with damped Newton-Raphson: an
//! analytic Jacobian, an LU solve for the step, and backtracking step
//! halving whenever a full step fails to reduce the residual.
//!
//! Hitting the iteration cap is a soft failure: the best available
//! estimate is returned with [`CatenaryFit::converged`] cleared and a
//! warning is logged, so callers that need a guaranteed shape can
//! inspect the residual.

use nalgebra::{Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TetherError;

/// Endpoints closer than this in the horizontal plane have no usable
/// catenary plane.
const MIN_HORIZONTAL_SEPARATION: f64 = 1e-9;

/// Maximum number of step halvings per Newton iteration.
const MAX_BACKTRACKS: usize = 16;

/// Configuration for the catenary solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatenarySolverConfig {
    /// Convergence tolerance on the residual norm.
    pub tolerance: f64,
    /// Maximum number of Newton iterations.
    pub max_iterations: usize,
}

impl Default for CatenarySolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 1000,
        }
    }
}

/// A fitted catenary, with convergence diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatenaryFit {
    /// Curvature parameter (the catenary's characteristic length).
    pub c1: f64,
    /// Horizontal offset parameter.
    pub c2: f64,
    /// Vertical offset parameter.
    pub c3: f64,
    /// Residual norm at the returned parameters.
    pub residual: f64,
    /// Newton iterations used.
    pub iterations: usize,
    /// Whether the residual reached the configured tolerance.
    pub converged: bool,
}

impl CatenaryFit {
    /// Horizontal radius from the head for a point at arclength `s`
    /// along the curve.
    #[must_use]
    pub fn radius_at_arclength(&self, s: f64) -> f64 {
        self.c1 * (s / self.c1 + (self.c2 / self.c1).sinh()).asinh() - self.c2
    }

    /// Height of the curve at horizontal radius `r` from the head.
    #[must_use]
    pub fn height_at(&self, r: f64) -> f64 {
        self.c1 * ((r + self.c2) / self.c1).cosh() + self.c3
    }
}

/// Damped Newton-Raphson solver for the catenary equations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatenarySolver {
    /// Solver configuration.
    config: CatenarySolverConfig,
}

impl CatenarySolver {
    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: CatenarySolverConfig) -> Self {
        Self { config }
    }

    /// The solver configuration.
    #[must_use]
    pub const fn config(&self) -> &CatenarySolverConfig {
        &self.config
    }

    /// Fit a catenary of total length `length` between `head` and
    /// `tail`.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::DegenerateEndpoints`] when the endpoints
    /// have no horizontal separation. Non-convergence is *not* an error:
    /// the best estimate is returned with
    /// [`CatenaryFit::converged`] cleared.
    pub fn solve(
        &self,
        head: Point3<f64>,
        tail: Point3<f64>,
        length: f64,
    ) -> Result<CatenaryFit, TetherError> {
        let rmax = horizontal_separation(head, tail);
        if rmax < MIN_HORIZONTAL_SEPARATION {
            return Err(TetherError::DegenerateEndpoints { separation: rmax });
        }

        let mut c = Vector3::new(
            1.0,
            -(head.x + tail.x) / 2.0,
            (head.z + tail.z) / 2.0,
        );
        let mut residual = residuals(c, rmax, length, head.z, tail.z);
        let mut iterations = 0;

        while iterations < self.config.max_iterations && residual.norm() >= self.config.tolerance {
            let Some(step) = jacobian(c, rmax).lu().solve(&-residual) else {
                // Singular Jacobian: keep the best estimate found so far.
                break;
            };

            let mut scale = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = c + scale * step;
                let candidate_residual = residuals(candidate, rmax, length, head.z, tail.z);
                let norm = candidate_residual.norm();
                if norm.is_finite() && norm < residual.norm() {
                    c = candidate;
                    residual = candidate_residual;
                    accepted = true;
                    break;
                }
                scale *= 0.5;
            }
            if !accepted {
                break;
            }
            iterations += 1;
        }

        let converged = residual.norm() < self.config.tolerance;
        if !converged {
            tracing::warn!(
                "catenary fit stopped at residual {:.3e} after {} iterations (tolerance {:.1e})",
                residual.norm(),
                iterations,
                self.config.tolerance,
            );
        }

        Ok(CatenaryFit {
            c1: c.x,
            c2: c.y,
            c3: c.z,
            residual: residual.norm(),
            iterations,
            converged,
        })
    }
}

/// Horizontal (XY-plane) distance between two points.
fn horizontal_separation(head: Point3<f64>, tail: Point3<f64>) -> f64 {
    let dx = tail.x - head.x;
    let dy = tail.y - head.y;
    dx.hypot(dy)
}

/// The three catenary equation residuals at `c = (c1, c2, c3)`.
fn residuals(c: Vector3<f64>, rmax: f64, length: f64, z_head: f64, z_tail: f64) -> Vector3<f64> {
    let (c1, c2, c3) = (c.x, c.y, c.z);
    let a = (rmax + c2) / c1;
    let b = c2 / c1;
    Vector3::new(
        c1 * (a.sinh() - b.sinh()) - length,
        c1 * b.cosh() + c3 - z_head,
        c1 * a.cosh() + c3 - z_tail,
    )
}

/// Analytic Jacobian of [`residuals`] with respect to `(c1, c2, c3)`.
fn jacobian(c: Vector3<f64>, rmax: f64) -> Matrix3<f64> {
    let (c1, c2) = (c.x, c.y);
    let a = (rmax + c2) / c1;
    let b = c2 / c1;

    Matrix3::new(
        a.sinh() - b.sinh() - a * a.cosh() + b * b.cosh(),
        a.cosh() - b.cosh(),
        0.0,
        b.cosh() - b * b.sinh(),
        b.sinh(),
        1.0,
        a.cosh() - a * a.sinh(),
        a.sinh(),
        1.0,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fit_symmetric_slack() -> CatenaryFit {
        let solver = CatenarySolver::default();
        solver
            .solve(
                Point3::new(-5.0, 3.0, 1.0),
                Point3::new(5.0, 3.0, 1.0),
                12.0,
            )
            .unwrap()
    }

    #[test]
    fn test_residual_below_tolerance() {
        // Hardest well-posed case: a rope exactly as long as the
        // endpoint separation, where the curve degenerates toward a
        // straight line and c1 grows very large.
        let solver = CatenarySolver::default();
        let fit = solver
            .solve(
                Point3::new(-5.0, 3.0, 1.0),
                Point3::new(5.0, 3.0, 1.0),
                10.0,
            )
            .unwrap();
        assert!(fit.residual <= 1e-6, "residual {} too large", fit.residual);
    }

    #[test]
    fn test_slack_rope_converges() {
        let fit = fit_symmetric_slack();
        assert!(fit.converged);
        assert!(fit.residual < 1e-7);
        assert!(fit.iterations < 1000);
    }

    #[test]
    fn test_fit_interpolates_endpoints() {
        let fit = fit_symmetric_slack();
        // r = 0 at the head, r = rmax at the tail.
        assert_relative_eq!(fit.height_at(0.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(fit.height_at(10.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_arclength_spans_the_rope() {
        let fit = fit_symmetric_slack();
        assert_relative_eq!(fit.radius_at_arclength(0.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.radius_at_arclength(12.0), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_symmetric_rope_sags_at_midpoint() {
        let fit = fit_symmetric_slack();
        let mid = fit.height_at(5.0);
        assert!(mid < 1.0, "midpoint {mid} should sag below the endpoints");
        // Sag is symmetric.
        assert_relative_eq!(fit.height_at(2.0), fit.height_at(8.0), epsilon = 1e-6);
    }

    #[test]
    fn test_vertically_aligned_endpoints_rejected() {
        let solver = CatenarySolver::default();
        let result = solver.solve(
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(1.0, 2.0, 5.0),
            10.0,
        );
        assert!(matches!(
            result,
            Err(TetherError::DegenerateEndpoints { .. })
        ));
    }

    #[test]
    fn test_too_short_rope_is_soft_failure() {
        // A rope shorter than the chord has no catenary; the solver must
        // still return its best estimate rather than fail.
        let solver = CatenarySolver::default();
        let fit = solver
            .solve(Point3::origin(), Point3::new(10.0, 0.0, 0.0), 5.0)
            .unwrap();
        assert!(!fit.converged);
    }

    #[test]
    fn test_asymmetric_heights() {
        let solver = CatenarySolver::default();
        let head = Point3::new(0.0, 0.0, 0.0);
        let tail = Point3::new(6.0, 0.0, 3.0);
        let fit = solver.solve(head, tail, 9.0).unwrap();
        assert!(fit.converged);
        assert_relative_eq!(fit.height_at(0.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(fit.height_at(6.0), 3.0, epsilon = 1e-6);
    }
}
