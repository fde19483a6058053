//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time enters only as a step multiplier (and wall-clock ms for the impulse cooldown)
//! - Seeded RNG only
//! - Single owned `Session`, no globals
//! - No rendering, audio or platform dependencies

pub mod body;
pub mod collision;
pub mod obstacles;
pub mod state;
pub mod tick;
pub mod timebase;

pub use body::Body;
pub use collision::{Collision, Rect, body_rect, detect};
pub use obstacles::{Obstacle, ObstacleStream};
pub use state::{GamePhase, Session, SoundCue, SoundQueue};
pub use tick::{ImpulseOutcome, TickReport, press, tick};
pub use timebase::Timebase;
