//! Per-frame driver
//!
//! Owns the session and the timebase and runs one frame at a time:
//! step, tick, present. Restart swaps in a fresh session rather than
//! resetting fields on the old one.

use crate::renderer::{Frame, present};
use crate::sim::{GamePhase, ImpulseOutcome, Session, Timebase, press, tick};

/// Result of one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub frame: Frame,
    /// Step multiplier the simulation advanced by
    pub step: f32,
    /// Final score, set only on the frame the run ended
    pub game_over: Option<u64>,
}

pub struct Game {
    session: Session,
    timebase: Timebase,
    last_phase: GamePhase,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        let session = Session::new(seed);
        let last_phase = session.phase;
        Self {
            session,
            timebase: Timebase::new(),
            last_phase,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    /// Impulse input at wall-clock `now_ms`
    pub fn press(&mut self, now_ms: f64) -> ImpulseOutcome {
        let outcome = press(&mut self.session, now_ms);
        if outcome == ImpulseOutcome::Started {
            log::info!("Run started (seed {})", self.session.seed);
        }
        outcome
    }

    /// Start a new run. Only honored once the current run is over.
    pub fn restart(&mut self, seed: u64) -> bool {
        if !self.session.is_over() {
            return false;
        }
        self.session = Session::restarted(seed);
        self.last_phase = self.session.phase;
        self.timebase.reset();
        log::info!("Restarted (seed {})", seed);
        true
    }

    /// Pick up after the loop was suspended. The next frame does not
    /// advance the world, however long the page was away.
    pub fn resume(&mut self) {
        self.timebase.reset();
        log::debug!("Resumed in phase {:?}", self.session.phase);
    }

    /// Run one frame at host timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> FrameOutput {
        let step = self.timebase.step(now_ms);
        tick(&mut self.session, step);

        let mut game_over = None;
        let phase = self.session.phase;
        if phase != self.last_phase {
            log::info!("Phase {:?} -> {:?}", self.last_phase, phase);
            if phase == GamePhase::Over {
                game_over = Some(self.session.score);
            }
            self.last_phase = phase;
        }

        FrameOutput {
            frame: present(&mut self.session),
            step,
            game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::renderer::Sprite;
    use crate::sim::{Body, Collision, SoundCue};

    const FRAME: f64 = 1000.0 / 60.0;

    #[test]
    fn test_prompt_until_first_impulse() {
        let mut game = Game::new(7);
        for i in 0..5 {
            let out = game.frame(i as f64 * FRAME);
            assert_eq!(out.frame.commands.len(), 2);
            assert_eq!(out.frame.commands[1].sprite, Sprite::StartPrompt);
        }
        assert_eq!(game.press(100.0), ImpulseOutcome::Started);
        let out = game.frame(5.0 * FRAME);
        assert!(out.frame.commands.iter().any(|c| c.sprite == Sprite::Pipe));
        assert_eq!(game.phase(), GamePhase::Running);
    }

    #[test]
    fn test_game_over_reported_once() {
        let mut game = Game::new(3);
        game.press(0.0);
        let mut reports = Vec::new();
        let mut now = 0.0;
        // No flaps: the body falls to the ground
        for _ in 0..400 {
            now += FRAME;
            let out = game.frame(now);
            if let Some(score) = out.game_over {
                reports.push(score);
            }
        }
        assert_eq!(reports, vec![0]);
        assert_eq!(game.phase(), GamePhase::Over);
        assert_eq!(game.session().collision, Some(Collision::Ground));
    }

    #[test]
    fn test_hit_sound_presented_on_game_over_frame() {
        let mut game = Game::new(3);
        game.press(0.0);
        game.frame(0.0);
        game.session.body.y = WORLD_HEIGHT + 1.0;
        let out = game.frame(FRAME);
        assert_eq!(out.game_over, Some(0));
        assert_eq!(out.frame.sounds, vec![SoundCue::Hit]);
        assert!(game.frame(2.0 * FRAME).frame.sounds.is_empty());
    }

    #[test]
    fn test_restart_only_when_over() {
        let mut game = Game::new(1);
        assert!(!game.restart(2));
        game.press(0.0);
        assert!(!game.restart(2));
        assert_eq!(game.session().seed, 1);
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut game = Game::new(11);
        game.press(0.0);
        let mut now = 0.0;
        for _ in 0..60 {
            // Hold the body mid-air so the run survives long enough to spawn
            game.session.body.y = 200.0;
            game.session.body.vel = 0.0;
            now += FRAME;
            game.frame(now);
        }
        assert!(game.session().is_running());
        game.session.score = 7;
        game.session.body.y = WORLD_HEIGHT + 5.0;
        now += FRAME;
        assert_eq!(game.frame(now).game_over, Some(7));
        assert!(!game.session().obstacles.is_empty());

        assert!(game.restart(12));
        let session = game.session();
        assert_eq!(session.score, 0);
        assert!(session.obstacles.is_empty());
        assert_eq!(session.phase, GamePhase::Running);
        assert_eq!(session.body, Body::default());
        assert!(session.sounds.is_empty());
        assert_eq!(session.last_impulse_ms, None);

        // First frame after restart does not advance the world
        let out = game.frame(now + 5000.0);
        assert_eq!(out.step, 0.0);
        assert_eq!(game.session().body.y, BIRD_START_Y);
    }

    #[test]
    fn test_resume_after_suspend_does_not_jump() {
        let mut game = Game::new(9);
        game.press(0.0);
        game.frame(0.0);
        game.frame(FRAME);
        let (y, vel) = (game.session().body.y, game.session().body.vel);
        let score = game.score();

        // Page came back from the back/forward cache ten minutes later
        game.resume();
        let out = game.frame(FRAME + 600_000.0);
        assert_eq!(out.step, 0.0);
        assert_eq!(out.game_over, None);
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!((game.session().body.y, game.session().body.vel), (y, vel));
        assert_eq!(game.score(), score);

        let out = game.frame(2.0 * FRAME + 600_000.0);
        assert!(out.step > 0.0 && out.step <= MAX_STEP);
    }

    #[test]
    fn test_step_clamped_after_stall() {
        let mut game = Game::new(5);
        game.press(0.0);
        game.frame(0.0);
        let out = game.frame(30_000.0);
        assert_eq!(out.step, MAX_STEP);
    }
}
