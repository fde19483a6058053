//! Frame timestamp → step multiplier
//!
//! Motion constants are tuned per 1/60 s update. Each frame scales them by
//! `elapsed_ms / (1000 / TARGET_FPS)`, clamped to `MAX_STEP` so a long stall
//! (backgrounded tab, slow frame) never integrates more than one update.

use crate::consts::{MAX_STEP, TARGET_FPS};

/// Milliseconds covered by one unit step
pub const FRAME_MS: f64 = 1000.0 / TARGET_FPS;

/// Converts wall-clock frame timestamps into step multipliers
#[derive(Debug, Clone, Default)]
pub struct Timebase {
    /// Previous frame timestamp in ms
    last_time: Option<f64>,
}

impl Timebase {
    pub fn new() -> Self {
        Self { last_time: None }
    }

    /// Step multiplier for a frame at `now` (ms). The first call after
    /// construction or `reset` returns 0 so there is no backlog catch-up.
    pub fn step(&mut self, now: f64) -> f32 {
        let elapsed = self.last_time.map_or(0.0, |last| now - last);
        self.last_time = Some(now);
        step_for_elapsed(elapsed)
    }

    /// Forget the previous timestamp (used on restart)
    pub fn reset(&mut self) {
        self.last_time = None;
    }
}

/// Clamped step multiplier for an elapsed duration in ms
#[inline]
pub fn step_for_elapsed(elapsed_ms: f64) -> f32 {
    ((elapsed_ms / FRAME_MS) as f32).clamp(0.0, MAX_STEP)
}
