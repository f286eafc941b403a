//! Trailing history of the second bob's screen position.

use crate::config::TrailMode;
use crate::screen::ScreenPoint;

/// Fixed-capacity ring of screen points, overwrite-oldest on push.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    points: Vec<ScreenPoint>,
    capacity: usize,
    /// Slot the next push writes to.
    head: usize,
}

impl RingBuffer {
    /// Capacity must be nonzero (enforced by config validation upstream).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be nonzero");
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, point: ScreenPoint) {
        if self.points.len() < self.capacity {
            self.points.push(point);
        } else {
            self.points[self.head] = point;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        let split = if self.points.len() < self.capacity {
            0
        } else {
            self.head
        };
        self.points[split..].iter().chain(&self.points[..split]).copied()
    }
}

/// Radius of a trail dot, `age` counted back from the newest point (age 0 is
/// the newest and largest). Clamped so even the oldest dot stays visible.
pub fn dot_radius(base_radius: i32, age: usize) -> i32 {
    (base_radius - age as i32).max(1)
}

/// Recorded path of the second bob.
///
/// `Lines` keeps every point ever recorded — unbounded growth is the
/// documented trade-off of that mode. `Dots` keeps the last K points.
#[derive(Debug, Clone)]
pub enum Trail {
    Lines(Vec<ScreenPoint>),
    Dots(RingBuffer),
}

impl Trail {
    pub fn new(mode: TrailMode, capacity: usize) -> Self {
        match mode {
            TrailMode::Lines => Trail::Lines(Vec::new()),
            TrailMode::Dots => Trail::Dots(RingBuffer::new(capacity)),
        }
    }

    pub fn push(&mut self, point: ScreenPoint) {
        match self {
            Trail::Lines(points) => points.push(point),
            Trail::Dots(ring) => ring.push(point),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Trail::Lines(points) => points.len(),
            Trail::Dots(ring) => ring.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
