//! Real-time double-pendulum viewer.
//!
//! Opens a window, advances the simulation by the measured wall-clock time
//! each frame, and rasterizes rods, bobs, and the second bob's trail. The
//! frame limiter targets the configured rate, but physics always advances by
//! the true elapsed time, so the motion stays real-time-accurate under frame
//! jitter.

mod render;

use anyhow::{Context, Result};
use dpend_sim::{SimConfig, SimulationLoop};
use minifb::{Key, Window, WindowOptions};
use std::path::Path;
use std::time::Instant;

fn load_config() -> Result<SimConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = SimConfig::from_json_file(Path::new(&path))
                .with_context(|| format!("failed to load config from {path}"))?;
            log::info!("loaded configuration from {path}");
            Ok(config)
        }
        None => {
            let config = SimConfig::default();
            config.validate().context("default configuration invalid")?;
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // Configuration errors are fatal before any window exists.
    let config = load_config()?;
    let mut sim = SimulationLoop::new(&config).context("invalid configuration")?;

    log::info!(
        "double pendulum: l=({}, {}) m, m=({}, {}) kg, g={} m/s², {} Hz target, {:?} trail",
        config.params.l1,
        config.params.l2,
        config.params.m1,
        config.params.m2,
        config.params.g,
        config.target_fps,
        config.trail_mode,
    );

    let mut window = Window::new(
        "Double Pendulum",
        config.width,
        config.height,
        WindowOptions::default(),
    )
    .context("failed to create window")?;
    window.set_target_fps(config.target_fps);

    let e0 = sim.energy();
    let mut last_frame = Instant::now();
    let mut last_report = 0.0_f64;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // Actual elapsed time, not the nominal frame interval. A slow frame
        // produces one larger physics step, never a dropped or repeated one.
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        let geometry = match sim.advance(dt) {
            Ok(geometry) => geometry,
            Err(e) => {
                log::error!("halting at t = {:.3}: {e}", sim.clock().time);
                return Err(e.into());
            }
        };

        let img = render::draw_frame(&config, &geometry, sim.trail());
        window
            .update_with_buffer(&render::to_argb_buffer(&img), config.width, config.height)
            .context("failed to present frame")?;

        let t = sim.clock().time;
        if t - last_report >= 1.0 {
            last_report = t;
            let state = sim.clock().state;
            let drift = ((sim.energy() - e0) / e0).abs();
            log::debug!(
                "t={t:.2}s θ1={:.3} θ2={:.3} energy drift={drift:.2e}",
                state[0],
                state[2],
            );
        }
    }

    log::info!("quit requested at t = {:.3}s", sim.clock().time);
    Ok(())
}
