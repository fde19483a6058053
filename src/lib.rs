//! Skyflap - A side-scrolling flap-through-the-gates game
//!
//! Core modules:
//! - `sim`: Simulation (timebase, body physics, obstacle stream, collisions, session state)
//! - `game`: Per-frame driver tying the simulation to presentation
//! - `renderer`: Sprite composition and the WebGPU blitter
//! - `assets`: Sprite/clip manifest, decoding and readiness
//! - `leaderboard`: Remote score service client and ranked snapshots
//! - `settings`: Persisted user preferences
//! - `web`: Browser fetch helpers (wasm only)

pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod game;
pub mod leaderboard;
pub mod renderer;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::{FrameOutput, Game};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use settings::Settings;

/// World constants. Fixed for behavioral parity; never configurable at runtime.
pub mod consts {
    /// World dimensions
    pub const WORLD_WIDTH: f32 = 288.0;
    pub const WORLD_HEIGHT: f32 = 512.0;

    /// Velocity added per unit step
    pub const GRAVITY: f32 = 0.25;
    /// Impulse replaces velocity with `-JUMP_STRENGTH`
    pub const JUMP_STRENGTH: f32 = 4.6;
    /// Minimum wall-clock time between accepted impulses (ms)
    pub const JUMP_COOLDOWN_MS: f64 = 200.0;

    /// Obstacle defaults
    pub const PIPE_WIDTH: f32 = 52.0;
    pub const PIPE_GAP: f32 = 150.0;
    pub const PIPE_SPEED: f32 = 2.0;
    /// Spawn once the newest obstacle is this far in from the right edge
    pub const PIPE_SPAWN_THRESHOLD: f32 = 150.0;
    /// Minimum clearance between the gap and the top/bottom of the world
    pub const PIPE_MARGIN: f32 = 50.0;

    /// Body defaults - left edge is pinned to the anchor
    pub const BIRD_X: f32 = 50.0;
    pub const BIRD_WIDTH: f32 = 34.0;
    pub const BIRD_HEIGHT: f32 = 24.0;
    pub const BIRD_START_Y: f32 = 150.0;
    /// Wing animation frames and simulated frames per advance
    pub const BIRD_FRAMES: u8 = 3;
    pub const BIRD_FRAME_INTERVAL: u64 = 5;

    /// Step multiplier baseline (updates per second)
    pub const TARGET_FPS: f64 = 60.0;
    /// Step multiplier clamp
    pub const MAX_STEP: f32 = 1.0;

    /// Visual tilt (degrees)
    pub const MAX_TILT_DEG: f32 = 45.0;
    pub const TILT_PER_VELOCITY_DEG: f32 = 10.0;

    /// Score glyph layout
    pub const DIGIT_WIDTH: f32 = 24.0;
    pub const DIGIT_HEIGHT: f32 = 36.0;
    pub const SCORE_Y: f32 = 30.0;

    /// Start prompt size
    pub const PROMPT_WIDTH: f32 = 184.0;
    pub const PROMPT_HEIGHT: f32 = 267.0;
}
