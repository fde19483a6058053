//! Game session and core simulation types
//!
//! One `Session` is the whole mutable document for a run. Restart builds a
//! new one rather than resetting fields in place.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::collision::Collision;
use super::obstacles::ObstacleStream;

/// Coarse game state. Only ever moves forward within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first impulse; simulation frozen, start prompt shown
    NotStarted,
    /// Active gameplay
    Running,
    /// Run ended; score is final
    Over,
}

/// Audio cues raised by gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Passed an obstacle
    Point,
    /// Collision ended the run
    Hit,
    /// Accepted impulse
    Wing,
}

/// Pending-sound mailbox
///
/// Gameplay pushes cues while stepping; the presentation pass drains them at
/// the start of its next draw. A cue raised twice before a drain plays once.
#[derive(Debug, Clone, Default)]
pub struct SoundQueue {
    pending: Vec<SoundCue>,
}

impl SoundQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, cue: SoundCue) {
        if !self.pending.contains(&cue) {
            self.pending.push(cue);
        }
    }

    /// Take everything queued, in the order first raised. Empty queue → empty vec.
    pub fn drain(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Session {
    /// Seed the obstacle RNG was built from
    pub seed: u64,
    /// Obstacle placement source
    pub rng: Pcg32,
    /// Player body
    pub body: Body,
    /// Live obstacles, leftmost first
    pub obstacles: ObstacleStream,
    /// Obstacles passed this run
    pub score: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Running frames simulated so far
    pub frame_counter: u64,
    /// Wall-clock time (ms) of the last accepted impulse
    pub last_impulse_ms: Option<f64>,
    /// What ended the run, once `phase == Over`
    pub collision: Option<Collision>,
    /// Cues waiting for the next presentation pass
    pub sounds: SoundQueue,
}

impl Session {
    /// A fresh session waiting for its first impulse
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            body: Body::default(),
            obstacles: ObstacleStream::new(),
            score: 0,
            phase: GamePhase::NotStarted,
            frame_counter: 0,
            last_impulse_ms: None,
            collision: None,
            sounds: SoundQueue::new(),
        }
    }

    /// A fresh session that skips the start prompt (restart from game over)
    pub fn restarted(seed: u64) -> Self {
        Self {
            phase: GamePhase::Running,
            ..Self::new(seed)
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// End the run. Score is frozen from here on.
    pub fn finish(&mut self, cause: Collision) {
        if self.phase == GamePhase::Over {
            return;
        }
        self.phase = GamePhase::Over;
        self.collision = Some(cause);
        self.sounds.push(SoundCue::Hit);
    }
}
