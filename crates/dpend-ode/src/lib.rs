//! Adaptive explicit Runge–Kutta integration.
//!
//! Implements the Dormand–Prince 5(4) embedded pair: each step produces a
//! 5th-order solution plus a 4th-order error estimate, and the step size is
//! adjusted to hold the local error inside a per-component tolerance. The
//! interval handed to `integrate` varies frame to frame, so the solver must
//! work without fixed-step tuning.
//!
//! The integrator holds no state between calls; continuity across frames is
//! the caller's responsibility.

use dpend_model::StateVec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OdeError {
    #[error("integration diverged: non-finite state at t = {t}")]
    Diverged { t: f64 },

    #[error("step size underflow at t = {t} (h = {h:.3e})")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("step budget exhausted after {max_steps} steps at t = {t}")]
    TooManySteps { t: f64, max_steps: usize },
}

/// Tolerances and bounds for the adaptive step loop.
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// Relative tolerance per component.
    pub rtol: f64,
    /// Absolute tolerance per component.
    pub atol: f64,
    /// Step size tried first on each call.
    pub h_init: f64,
    /// Below this step size a rejected step is reported as underflow.
    pub h_min: f64,
    /// Upper bound on attempted steps per call.
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            h_init: 1e-3,
            h_min: 1e-12,
            max_steps: 100_000,
        }
    }
}

fn is_finite(y: &StateVec) -> bool {
    y.iter().all(|c| c.is_finite())
}

/// One Dormand–Prince 5(4) step of size `h` from `(t, y)`.
///
/// Returns the 5th-order solution and the scaled error norm (error divided
/// by `atol + rtol·|y|`, so values ≤ 1 are within tolerance).
fn dopri45_step<F>(f: &F, t: f64, y: &StateVec, h: f64, opts: &SolverOptions) -> (StateVec, f64)
where
    F: Fn(f64, &StateVec) -> StateVec,
{
    let y = *y;

    // k1
    let k1 = f(t, &y);

    // k2
    let y2 = y + k1 * (h / 5.0);
    let k2 = f(t + h / 5.0, &y2);

    // k3
    let y3 = y + k1 * (3.0 * h / 40.0) + k2 * (9.0 * h / 40.0);
    let k3 = f(t + 3.0 * h / 10.0, &y3);

    // k4
    let y4 = y + k1 * (44.0 * h / 45.0) - k2 * (56.0 * h / 15.0) + k3 * (32.0 * h / 9.0);
    let k4 = f(t + 4.0 * h / 5.0, &y4);

    // k5
    let y5 = y + k1 * (19372.0 * h / 6561.0) - k2 * (25360.0 * h / 2187.0)
        + k3 * (64448.0 * h / 6561.0)
        - k4 * (212.0 * h / 729.0);
    let k5 = f(t + 8.0 * h / 9.0, &y5);

    // k6
    let y6 = y + k1 * (9017.0 * h / 3168.0) - k2 * (355.0 * h / 33.0)
        + k3 * (46732.0 * h / 5247.0)
        + k4 * (49.0 * h / 176.0)
        - k5 * (5103.0 * h / 18656.0);
    let k6 = f(t + h, &y6);

    // 5th-order solution
    let y_new = y + (k1 * (35.0 / 384.0) + k3 * (500.0 / 1113.0) + k4 * (125.0 / 192.0)
        - k5 * (2187.0 / 6784.0)
        + k6 * (11.0 / 84.0))
        * h;

    // k7 (first-same-as-last stage, used only by the error estimate here)
    let k7 = f(t + h, &y_new);

    // Difference between the embedded 4th- and 5th-order solutions
    let err_vec = (k1 * (71.0 / 57600.0) - k3 * (71.0 / 16695.0) + k4 * (71.0 / 1920.0)
        - k5 * (17253.0 / 339200.0)
        + k6 * (22.0 / 525.0)
        - k7 * (1.0 / 40.0))
        * h;

    let mut err_norm = 0.0_f64;
    for i in 0..4 {
        let scale = opts.atol + opts.rtol * y[i].abs().max(y_new[i].abs());
        err_norm = err_norm.max(err_vec[i].abs() / scale);
    }

    (y_new, err_norm)
}

/// Integrate `y' = f(t, y)` from `t_start` to `t_end`.
///
/// Deterministic for fixed inputs and options. A zero-length (or negative)
/// interval returns `y_start` unchanged. Non-finite values are never clamped
/// or discarded: they surface as [`OdeError::Diverged`].
pub fn integrate<F>(
    f: F,
    t_start: f64,
    t_end: f64,
    y_start: StateVec,
    opts: &SolverOptions,
) -> Result<StateVec, OdeError>
where
    F: Fn(f64, &StateVec) -> StateVec,
{
    if !is_finite(&y_start) {
        return Err(OdeError::Diverged { t: t_start });
    }
    if t_end <= t_start {
        return Ok(y_start);
    }

    let mut t = t_start;
    let mut y = y_start;
    let mut h = opts.h_init.min(t_end - t_start);
    let mut steps = 0usize;

    while t < t_end {
        steps += 1;
        if steps > opts.max_steps {
            return Err(OdeError::TooManySteps {
                t,
                max_steps: opts.max_steps,
            });
        }

        // Clamp the final step to land exactly on t_end.
        let last = t + h >= t_end;
        let h_step = if last { t_end - t } else { h };

        let (y_new, err) = dopri45_step(&f, t, &y, h_step, opts);

        if !err.is_finite() || !is_finite(&y_new) {
            // Stage arithmetic blew up; shrink hard and retry.
            h = h_step * 0.1;
            if h < opts.h_min {
                return Err(OdeError::Diverged { t });
            }
            continue;
        }

        let accept = err <= 1.0;
        if accept {
            y = y_new;
            if last {
                t = t_end;
            } else {
                t += h_step;
            }
        }

        // Step controller: safety factor, 5th-order shrink/grow exponent,
        // growth clamped to avoid wild swings (err = 0 hits the upper clamp).
        let factor = (0.9 * err.powf(-0.2)).clamp(0.1, 5.0);
        h = h_step * factor;

        if !accept && h < opts.h_min {
            return Err(OdeError::StepSizeUnderflow { t, h });
        }
    }

    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dpend_model::{derivative, Params};
    use std::f64::consts::PI;

    #[test]
    fn zero_length_interval_is_identity() {
        let y = StateVec::new(0.3, -1.2, 2.0, 0.5);
        let opts = SolverOptions::default();
        let out = integrate(|t, s| derivative(t, s, &Params::default()), 4.2, 4.2, y, &opts)
            .expect("zero-length interval");
        assert_eq!(out, y);
    }

    #[test]
    fn negative_interval_is_identity() {
        let y = StateVec::new(1.0, 2.0, 3.0, 4.0);
        let opts = SolverOptions::default();
        let out = integrate(|_, s| *s, 1.0, 0.5, y, &opts).expect("negative interval");
        assert_eq!(out, y);
    }

    #[test]
    fn matches_exponential_decay() {
        // y' = -y, exact solution y0 * e^(-t)
        let y0 = StateVec::new(1.0, 2.0, -3.0, 0.5);
        let opts = SolverOptions::default();
        let out = integrate(|_, y| -y, 0.0, 1.0, y0, &opts).expect("decay");
        for i in 0..4 {
            assert_relative_eq!(out[i], y0[i] * (-1.0_f64).exp(), epsilon = 1e-6);
        }
    }

    #[test]
    fn harmonic_oscillator_returns_after_full_period() {
        // y0' = y1, y1' = -y0 in the first two components
        let f = |_: f64, y: &StateVec| StateVec::new(y[1], -y[0], 0.0, 0.0);
        let y0 = StateVec::new(1.0, 0.0, 0.0, 0.0);
        let opts = SolverOptions::default();
        let out = integrate(f, 0.0, 2.0 * PI, y0, &opts).expect("oscillator");
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(out[1], 0.0, epsilon = 1e-4);
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let p = Params::default();
        let y0 = StateVec::new(PI / 4.0, 4.0, PI / 18.0, 4.0);
        let opts = SolverOptions::default();
        let a = integrate(|t, s| derivative(t, s, &p), 0.0, 0.02, y0, &opts).unwrap();
        let b = integrate(|t, s| derivative(t, s, &p), 0.0, 0.02, y0, &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn finite_time_blowup_is_reported() {
        // y' = y² escapes to infinity at t = 1 for y(0) = 1.
        let f = |_: f64, y: &StateVec| y.component_mul(y);
        let y0 = StateVec::new(1.0, 1.0, 1.0, 1.0);
        let opts = SolverOptions::default();
        assert!(integrate(f, 0.0, 2.0, y0, &opts).is_err());
    }

    #[test]
    fn non_finite_initial_state_is_diverged() {
        let y0 = StateVec::new(f64::NAN, 0.0, 0.0, 0.0);
        let opts = SolverOptions::default();
        match integrate(|_, s| *s, 0.0, 1.0, y0, &opts) {
            Err(OdeError::Diverged { t }) => assert_eq!(t, 0.0),
            other => panic!("expected Diverged, got {other:?}"),
        }
    }
}
