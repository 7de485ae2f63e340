//! Proportional-integral-derivative regulation.
//!
//! [`Pid`] is a scalar PID controller with anti-windup clamping on the
//! integral accumulator, clamping on the output command, and a
//! feed-forward command offset. Each tether element owns two of these to
//! hold its links near their rest length, but the controller itself knows
//! nothing about tethers: it maps an error signal and a timestep to a
//! command.
//!
//! A clamp range is *disabled* whenever its minimum exceeds its maximum;
//! both clamps are disabled by default.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar PID controller with integral and output clamping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pid {
    /// Proportional gain.
    p_gain: f64,
    /// Integral gain.
    i_gain: f64,
    /// Derivative gain.
    d_gain: f64,
    /// Upper clamp for the integral accumulator.
    i_max: f64,
    /// Lower clamp for the integral accumulator.
    i_min: f64,
    /// Upper clamp for the command.
    cmd_max: f64,
    /// Lower clamp for the command.
    cmd_min: f64,
    /// Feed-forward offset added to every command.
    cmd_offset: f64,

    /// Error at the previous update.
    p_err_last: f64,
    /// Error at the latest update.
    p_err: f64,
    /// Integral of gain times error.
    i_err: f64,
    /// Derivative error.
    d_err: f64,
    /// Latest command.
    cmd: f64,
}

impl Default for Pid {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Pid {
    /// Create a controller from its three gains.
    ///
    /// Integral and command clamping start out disabled, the command
    /// offset is zero, and all error state is zeroed.
    #[must_use]
    pub const fn new(p_gain: f64, i_gain: f64, d_gain: f64) -> Self {
        Self {
            p_gain,
            i_gain,
            d_gain,
            i_max: -1.0,
            i_min: 0.0,
            cmd_max: -1.0,
            cmd_min: 0.0,
            cmd_offset: 0.0,
            p_err_last: 0.0,
            p_err: 0.0,
            i_err: 0.0,
            d_err: 0.0,
            cmd: 0.0,
        }
    }

    /// Clamp the integral accumulator to `[min, max]`.
    ///
    /// Pass `min > max` to disable the clamp.
    #[must_use]
    pub const fn with_integral_limits(mut self, min: f64, max: f64) -> Self {
        self.i_min = min;
        self.i_max = max;
        self
    }

    /// Clamp the output command to `[min, max]`.
    ///
    /// Pass `min > max` to disable the clamp.
    #[must_use]
    pub const fn with_command_limits(mut self, min: f64, max: f64) -> Self {
        self.cmd_min = min;
        self.cmd_max = max;
        self
    }

    /// Add a feed-forward offset to every command.
    #[must_use]
    pub const fn with_command_offset(mut self, offset: f64) -> Self {
        self.cmd_offset = offset;
        self
    }

    /// Update the loop with a nonuniform timestep and return the command.
    ///
    /// `error` is `state - target`. A zero `dt` or a non-finite `error`
    /// returns `0.0` and leaves every piece of internal state untouched,
    /// so invalid samples cannot poison the integral or derivative
    /// accumulators.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        if dt == 0.0 || !error.is_finite() {
            return 0.0;
        }

        self.p_err = error;
        let p_term = self.p_gain * self.p_err;

        self.i_err += self.i_gain * dt * self.p_err;
        if self.i_max >= self.i_min {
            self.i_err = self.i_err.clamp(self.i_min, self.i_max);
        }

        self.d_err = (self.p_err - self.p_err_last) / dt;
        self.p_err_last = self.p_err;
        let d_term = self.d_gain * self.d_err;

        self.cmd = self.cmd_offset - p_term - self.i_err - d_term;
        if self.cmd_max >= self.cmd_min {
            self.cmd = self.cmd.clamp(self.cmd_min, self.cmd_max);
        }

        self.cmd
    }

    /// The last command computed by [`update`](Self::update).
    #[must_use]
    pub const fn cmd(&self) -> f64 {
        self.cmd
    }

    /// Override the current command.
    pub const fn set_cmd(&mut self, cmd: f64) {
        self.cmd = cmd;
    }

    /// The (proportional, integral, derivative) error terms.
    #[must_use]
    pub const fn errors(&self) -> (f64, f64, f64) {
        (self.p_err, self.i_err, self.d_err)
    }

    /// Zero all error state and the command, keeping gains and limits.
    pub const fn reset(&mut self) {
        self.p_err_last = 0.0;
        self.p_err = 0.0;
        self.i_err = 0.0;
        self.d_err = 0.0;
        self.cmd = 0.0;
    }

    /// Proportional gain.
    #[must_use]
    pub const fn p_gain(&self) -> f64 {
        self.p_gain
    }

    /// Integral gain.
    #[must_use]
    pub const fn i_gain(&self) -> f64 {
        self.i_gain
    }

    /// Derivative gain.
    #[must_use]
    pub const fn d_gain(&self) -> f64 {
        self.d_gain
    }

    /// Integral clamp as `(min, max)`.
    #[must_use]
    pub const fn integral_limits(&self) -> (f64, f64) {
        (self.i_min, self.i_max)
    }

    /// Command clamp as `(min, max)`.
    #[must_use]
    pub const fn command_limits(&self) -> (f64, f64) {
        (self.cmd_min, self.cmd_max)
    }

    /// Feed-forward command offset.
    #[must_use]
    pub const fn cmd_offset(&self) -> f64 {
        self.cmd_offset
    }
}
