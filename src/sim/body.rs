//! Player body: vertical integrator with discrete upward impulses

use crate::consts::*;

/// The player-controlled body. Horizontal position is pinned to `BIRD_X`.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top edge of the body box (world units, +y is down)
    pub y: f32,
    /// Vertical velocity (units per unit step)
    pub vel: f32,
    /// Wing animation frame in `0..BIRD_FRAMES`
    pub frame: u8,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            y: BIRD_START_Y,
            vel: 0.0,
            frame: 0,
        }
    }
}

impl Body {
    /// Apply gravity then move, both scaled by the step multiplier
    pub fn integrate(&mut self, step: f32) {
        self.vel += GRAVITY * step;
        self.y += self.vel * step;
    }

    /// Replace (not add to) the current velocity with the jump impulse
    pub fn flap(&mut self) {
        self.vel = -JUMP_STRENGTH;
    }

    /// Advance the wing animation every `BIRD_FRAME_INTERVAL` simulated frames
    pub fn animate(&mut self, frame_counter: u64) {
        if frame_counter % BIRD_FRAME_INTERVAL == 0 {
            self.frame = (self.frame + 1) % BIRD_FRAMES;
        }
    }

    /// Visual tilt in degrees, nose-up negative. Presentation only.
    pub fn tilt_degrees(&self) -> f32 {
        (self.vel * TILT_PER_VELOCITY_DEG).clamp(-MAX_TILT_DEG, MAX_TILT_DEG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_unit_step() {
        let mut body = Body::default();
        body.integrate(1.0);
        assert!((body.vel - GRAVITY).abs() < 1e-6);
        assert!((body.y - (BIRD_START_Y + GRAVITY)).abs() < 1e-6);
    }

    #[test]
    fn test_zero_step_is_frozen() {
        let mut body = Body::default();
        body.vel = 3.0;
        body.integrate(0.0);
        assert_eq!(body.y, BIRD_START_Y);
        assert_eq!(body.vel, 3.0);
    }

    #[test]
    fn test_flap_replaces_velocity() {
        let mut body = Body::default();
        body.vel = 7.5;
        body.flap();
        assert_eq!(body.vel, -JUMP_STRENGTH);
        body.vel = -2.0;
        body.flap();
        assert_eq!(body.vel, -JUMP_STRENGTH);
    }

    #[test]
    fn test_animation_cycles() {
        let mut body = Body::default();
        let mut seen = Vec::new();
        for counter in 1..=(BIRD_FRAME_INTERVAL * 4) {
            body.animate(counter);
            if counter % BIRD_FRAME_INTERVAL == 0 {
                seen.push(body.frame);
            }
        }
        assert_eq!(seen, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let mut body = Body::default();
        body.vel = 100.0;
        assert_eq!(body.tilt_degrees(), MAX_TILT_DEG);
        body.vel = -100.0;
        assert_eq!(body.tilt_degrees(), -MAX_TILT_DEG);
        body.vel = 1.0;
        assert!((body.tilt_degrees() - TILT_PER_VELOCITY_DEG).abs() < 1e-6);
    }
}
