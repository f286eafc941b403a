//! Conversion from generalized coordinates to pixel coordinates.

use dpend_model::{Params, StateVec};
use serde::{Deserialize, Serialize};

/// Integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Project the angular state onto the screen.
///
/// Returns the positions of bob 1 and bob 2. `scale` converts meters to
/// pixels. Convention: θ is measured from the downward vertical, positive θ
/// deflects the bob toward +x (screen right); screen y grows downward, so a
/// hanging rod extends below the pivot.
pub fn project(y: &StateVec, p: &Params, pivot: ScreenPoint, scale: f64) -> (ScreenPoint, ScreenPoint) {
    let (th1, th2) = (y[0], y[2]);

    let p1 = ScreenPoint::new(
        pivot.x + (p.l1 * th1.sin() * scale).round() as i32,
        pivot.y + (p.l1 * th1.cos() * scale).round() as i32,
    );
    let p2 = ScreenPoint::new(
        p1.x + (p.l2 * th2.sin() * scale).round() as i32,
        p1.y + (p.l2 * th2.cos() * scale).round() as i32,
    );

    (p1, p2)
}
