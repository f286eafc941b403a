//! Simulation loop for the double pendulum.
//!
//! Owns the running physical state and advances it each frame by the frame's
//! measured elapsed time, then converts the angular state into screen
//! geometry and records the second bob's trail. Rendering itself is the
//! viewer's job; this crate only produces geometry.

pub mod config;
pub mod screen;
pub mod trail;

pub use config::{Color, ConfigError, SimConfig, TrailMode};
pub use screen::{project, ScreenPoint};
pub use trail::{dot_radius, RingBuffer, Trail};

use dpend_model::{derivative, total_energy, Params, StateVec};
use dpend_ode::{integrate, OdeError, SolverOptions};

/// Simulation time and the state reached at that time.
///
/// Mutated exactly once per frame; time never decreases.
#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    pub time: f64,
    pub state: StateVec,
}

/// Screen geometry for one frame: the pivot and both bob positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub pivot: ScreenPoint,
    pub bob1: ScreenPoint,
    pub bob2: ScreenPoint,
}

/// Per-frame driver owning clock, trail, and solver settings.
pub struct SimulationLoop {
    params: Params,
    solver: SolverOptions,
    clock: SimulationClock,
    trail: Trail,
    pivot: ScreenPoint,
    scale: f64,
}

impl SimulationLoop {
    /// Build the loop from a validated configuration, starting at t = 0.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            params: config.params,
            solver: SolverOptions::default(),
            clock: SimulationClock {
                time: 0.0,
                state: config.initial_state_vec(),
            },
            trail: Trail::new(config.trail_mode, config.trail_capacity),
            pivot: ScreenPoint::new(config.width as i32 / 2, config.pivot_y),
            scale: config.scale,
        })
    }

    /// Advance the simulation by `dt` seconds of real time and return the
    /// frame's geometry.
    ///
    /// A diverged integration leaves the clock untouched and surfaces the
    /// error before any geometry is produced, so non-finite coordinates
    /// never reach the renderer.
    pub fn advance(&mut self, dt: f64) -> Result<FrameGeometry, OdeError> {
        let t0 = self.clock.time;
        let params = self.params;
        let state = integrate(
            |t, y| derivative(t, y, &params),
            t0,
            t0 + dt,
            self.clock.state,
            &self.solver,
        )?;

        self.clock = SimulationClock {
            time: t0 + dt,
            state,
        };

        let (bob1, bob2) = project(&state, &self.params, self.pivot, self.scale);
        self.trail.push(bob2);

        Ok(FrameGeometry {
            pivot: self.pivot,
            bob1,
            bob2,
        })
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Current total mechanical energy, for drift monitoring.
    pub fn energy(&self) -> f64 {
        total_energy(&self.clock.state, &self.params)
    }
}
