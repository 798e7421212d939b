//! Frame timing
//!
//! The scheduler hands each frame a timestamp; [`FrameTimer`] turns the
//! stream of timestamps into [`FrameClock`] values for the simulator.

use std::time::Duration;

/// Largest `dt` handed to the simulator by default (seconds)
pub const DEFAULT_MAX_FRAME_DT: f32 = 0.25;

/// Timing information for a single frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    /// Seconds since the previous frame (never negative)
    pub dt: f32,
    /// Seconds of active loop time since the first start
    pub total: f64,
    /// Frames run so far, counting this one
    pub frame: u64,
}

/// Derives [`FrameClock`] values from scheduler timestamps
///
/// The first frame after construction or [`pause`](Self::pause) has `dt = 0`,
/// so time spent stopped is never fed to the simulator. `dt` is capped to
/// avoid huge steps after a stall (window hidden, debugger break).
#[derive(Clone, Debug)]
pub struct FrameTimer {
    last_timestamp: Option<Duration>,
    total: f64,
    frames: u64,
    max_dt: f32,
}

impl FrameTimer {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_timestamp: None,
            total: 0.0,
            frames: 0,
            max_dt,
        }
    }

    /// Advance to the given timestamp
    pub fn tick(&mut self, timestamp: Duration) -> FrameClock {
        let dt = match self.last_timestamp {
            Some(previous) => timestamp.saturating_sub(previous).as_secs_f32().min(self.max_dt),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp);
        self.total += dt as f64;
        self.frames += 1;

        FrameClock {
            dt,
            total: self.total,
            frame: self.frames,
        }
    }

    /// Forget the last timestamp; the next tick starts with `dt = 0`
    pub fn pause(&mut self) {
        self.last_timestamp = None;
    }

    /// Total active time so far
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DT)
    }
}
