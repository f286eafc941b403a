//! Physical model of the planar double pendulum.
//!
//! `Params` is the static description of the system (rod lengths, point
//! masses, gravity). The generalized state is a 4-vector `[θ1, ω1, θ2, ω2]`
//! with angles measured from the downward vertical. `derivative` is the pure
//! right-hand side of the equations of motion; `total_energy` gives the
//! conserved mechanical energy used by drift monitoring and tests.

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Generalized state `[θ1, ω1, θ2, ω2]` (radians, rad/s).
///
/// Angles are never wrapped to a fixed range; only their sine/cosine enter
/// the dynamics.
pub type StateVec = na::Vector4<f64>;

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Physical parameters, fixed at startup.
///
/// Point masses at the rod ends, massless rigid rods, uniform gravity field,
/// no damping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Length of rod 1 (m).
    pub l1: f64,
    /// Length of rod 2 (m).
    pub l2: f64,
    /// Mass of bob 1 (kg).
    pub m1: f64,
    /// Mass of bob 2 (kg).
    pub m2: f64,
    /// Gravitational acceleration (m/s²).
    pub g: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            l1: 0.3,
            l2: 0.3,
            m1: 0.5,
            m2: 0.5,
            g: GRAVITY,
        }
    }
}

/// Right-hand side of the equations of motion: `(θ1', ω1', θ2', ω2')`.
///
/// Standard Lagrangian derivation for two point masses. The shared
/// denominator `2m1 + m2 - m2·cos(2θ1 - 2θ2)` is never exactly zero for
/// positive masses; near-singular configurations simply produce large
/// accelerations and are left to the integrator's step control.
///
/// The time argument is unused (the system is autonomous) but kept so the
/// function matches the integrator's `f(t, y)` signature directly.
pub fn derivative(_t: f64, y: &StateVec, p: &Params) -> StateVec {
    let (th1, w1, th2, w2) = (y[0], y[1], y[2], y[3]);
    let delta = th1 - th2;
    let den = 2.0 * p.m1 + p.m2 - p.m2 * (2.0 * delta).cos();

    let dw1 = (-p.g * (2.0 * p.m1 + p.m2) * th1.sin()
        - p.m2 * p.g * (th1 - 2.0 * th2).sin()
        - 2.0 * delta.sin() * p.m2 * (w2 * w2 * p.l2 + w1 * w1 * p.l1 * delta.cos()))
        / (p.l1 * den);

    let dw2 = (2.0
        * delta.sin()
        * (w1 * w1 * p.l1 * (p.m1 + p.m2)
            + p.g * (p.m1 + p.m2) * th1.cos()
            + w2 * w2 * p.l2 * p.m2 * delta.cos()))
        / (p.l2 * den);

    StateVec::new(w1, dw1, w2, dw2)
}

/// Total mechanical energy (kinetic + potential, J).
///
/// Potential is measured from the pivot, so the rest configuration has
/// energy `-(m1+m2)·g·l1 - m2·g·l2`.
pub fn total_energy(y: &StateVec, p: &Params) -> f64 {
    let (th1, w1, th2, w2) = (y[0], y[1], y[2], y[3]);

    let v1_sq = p.l1 * p.l1 * w1 * w1;
    let v2_sq = v1_sq + p.l2 * p.l2 * w2 * w2 + 2.0 * p.l1 * p.l2 * w1 * w2 * (th1 - th2).cos();
    let kinetic = 0.5 * p.m1 * v1_sq + 0.5 * p.m2 * v2_sq;

    let potential = -(p.m1 + p.m2) * p.g * p.l1 * th1.cos() - p.m2 * p.g * p.l2 * th2.cos();

    kinetic + potential
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hanging_equilibrium_has_zero_derivative() {
        let p = Params::default();
        let dy = derivative(0.0, &StateVec::zeros(), &p);
        for i in 0..4 {
            assert_relative_eq!(dy[i], 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn derivative_is_finite_for_generic_states() {
        let p = Params::default();
        let states = [
            StateVec::new(std::f64::consts::FRAC_PI_4, 4.0, std::f64::consts::PI / 18.0, 4.0),
            StateVec::new(3.0, -10.0, -2.5, 7.0),
            StateVec::new(100.0 * std::f64::consts::PI, 0.1, -50.0, -0.1),
        ];
        for y in &states {
            let dy = derivative(0.0, y, &p);
            for i in 0..4 {
                assert!(dy[i].is_finite(), "component {i} not finite for {y:?}");
            }
        }
    }

    #[test]
    fn derivative_passes_velocities_through() {
        let p = Params::default();
        let y = StateVec::new(0.7, 1.3, -0.2, -2.1);
        let dy = derivative(0.0, &y, &p);
        assert_relative_eq!(dy[0], 1.3);
        assert_relative_eq!(dy[2], -2.1);
    }

    #[test]
    fn rest_energy_matches_closed_form() {
        let p = Params::default();
        let e = total_energy(&StateVec::zeros(), &p);
        let expected = -(p.m1 + p.m2) * p.g * p.l1 - p.m2 * p.g * p.l2;
        assert_relative_eq!(e, expected, epsilon = 1e-12);
    }

    #[test]
    fn energy_grows_with_speed() {
        let p = Params::default();
        let slow = total_energy(&StateVec::new(0.5, 1.0, 0.2, 1.0), &p);
        let fast = total_energy(&StateVec::new(0.5, 3.0, 0.2, 3.0), &p);
        assert!(fast > slow);
    }
}
