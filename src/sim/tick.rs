//! Per-frame simulation step and the impulse action
//!
//! `tick` is the only place simulated time moves. `press` is the only input.

use super::collision;
use super::collision::Collision;
use super::state::{GamePhase, Session, SoundCue};
use crate::consts::*;

/// What an impulse request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpulseOutcome {
    /// Started the run (no velocity change)
    Started,
    /// Applied the jump impulse
    Flapped,
    /// Dropped: inside the cooldown window
    Throttled,
    /// Dropped: run is over
    Ignored,
}

/// Result of one simulation step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Obstacles passed this frame
    pub scored: u32,
    /// Set on the frame the run ended
    pub collision: Option<Collision>,
}

/// Handle an impulse at wall-clock time `now_ms`.
///
/// The cooldown is checked before the phase, so it also throttles the
/// impulse that starts the run.
pub fn press(session: &mut Session, now_ms: f64) -> ImpulseOutcome {
    if let Some(last) = session.last_impulse_ms {
        if now_ms - last < JUMP_COOLDOWN_MS {
            return ImpulseOutcome::Throttled;
        }
    }
    session.last_impulse_ms = Some(now_ms);

    match session.phase {
        GamePhase::NotStarted => {
            session.phase = GamePhase::Running;
            ImpulseOutcome::Started
        }
        GamePhase::Running => {
            session.body.flap();
            session.sounds.push(SoundCue::Wing);
            ImpulseOutcome::Flapped
        }
        GamePhase::Over => ImpulseOutcome::Ignored,
    }
}

/// Advance a running session by one frame scaled by `step`
pub fn tick(session: &mut Session, step: f32) -> TickReport {
    let mut report = TickReport::default();
    if session.phase != GamePhase::Running {
        return report;
    }

    session.frame_counter += 1;
    session.body.animate(session.frame_counter);
    session.body.integrate(step);

    session.obstacles.spawn_if_due(&mut session.rng);
    session.obstacles.advance(step);

    // Checks run before retirement so nothing leaving this frame is skipped
    if let Some(cause) = collision::detect(&session.body, session.obstacles.iter()) {
        log::info!(
            "Run over: {:?} at frame {} with score {}",
            cause,
            session.frame_counter,
            session.score
        );
        session.finish(cause);
        report.collision = Some(cause);
        return report;
    }

    let scored = session.obstacles.score_passes();
    if scored > 0 {
        session.score += u64::from(scored);
        session.sounds.push(SoundCue::Point);
    }
    report.scored = scored;

    session.obstacles.retire();

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::Obstacle;
    use proptest::prelude::*;

    #[test]
    fn test_first_impulse_starts_without_velocity_change() {
        let mut session = Session::new(12345);
        assert_eq!(press(&mut session, 1000.0), ImpulseOutcome::Started);
        assert_eq!(session.phase, GamePhase::Running);
        assert_eq!(session.body.vel, 0.0);
        assert!(session.sounds.is_empty());
    }

    #[test]
    fn test_not_started_is_frozen() {
        let mut session = Session::new(12345);
        for _ in 0..10 {
            tick(&mut session, 1.0);
        }
        assert_eq!(session.body.y, BIRD_START_Y);
        assert!(session.obstacles.is_empty());
        assert_eq!(session.frame_counter, 0);
    }

    #[test]
    fn test_cooldown_50ms_apart() {
        let mut session = Session::restarted(1);
        assert_eq!(press(&mut session, 1000.0), ImpulseOutcome::Flapped);
        session.body.vel = 2.0;
        assert_eq!(press(&mut session, 1050.0), ImpulseOutcome::Throttled);
        assert_eq!(session.body.vel, 2.0);
    }

    #[test]
    fn test_cooldown_250ms_apart() {
        let mut session = Session::restarted(1);
        assert_eq!(press(&mut session, 1000.0), ImpulseOutcome::Flapped);
        session.body.vel = 2.0;
        assert_eq!(press(&mut session, 1250.0), ImpulseOutcome::Flapped);
        assert_eq!(session.body.vel, -JUMP_STRENGTH);
    }

    #[test]
    fn test_cooldown_applies_to_start() {
        let mut session = Session::new(1);
        assert_eq!(press(&mut session, 1000.0), ImpulseOutcome::Started);
        // Double-tap: the second tap is swallowed by the cooldown
        assert_eq!(press(&mut session, 1100.0), ImpulseOutcome::Throttled);
        assert_eq!(session.body.vel, 0.0);
    }

    #[test]
    fn test_impulse_when_over_is_noop() {
        let mut session = Session::restarted(1);
        session.finish(Collision::Ground);
        let body = session.body.clone();
        assert_eq!(press(&mut session, 5000.0), ImpulseOutcome::Ignored);
        assert_eq!(session.body, body);
        assert_eq!(session.phase, GamePhase::Over);
    }

    #[test]
    fn test_flap_queues_wing() {
        let mut session = Session::restarted(1);
        press(&mut session, 1000.0);
        assert_eq!(session.sounds.drain(), vec![SoundCue::Wing]);
    }

    #[test]
    fn test_first_running_frame_spawns() {
        let mut session = Session::restarted(9);
        tick(&mut session, 1.0);
        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.obstacles.obstacles[0].x, WORLD_WIDTH - PIPE_SPEED);
    }

    #[test]
    fn test_pass_through_scenario() {
        let mut session = Session::restarted(42);
        session.obstacles.obstacles.push(Obstacle::new(288.0, 200.0));

        let mut previous_trailing = session.obstacles.obstacles[0].trailing_edge();
        let mut crossed_at = None;
        for frame in 0..200 {
            // Hover inside the gap
            session.body.y = 260.0;
            session.body.vel = 0.0;
            let report = tick(&mut session, 1.0);
            assert_eq!(report.collision, None);
            assert_eq!(session.phase, GamePhase::Running);

            let trailing = session.obstacles.obstacles[0].trailing_edge();
            if report.scored > 0 {
                assert!(previous_trailing >= BIRD_X && trailing < BIRD_X);
                crossed_at = Some(frame);
                break;
            }
            previous_trailing = trailing;
        }
        assert!(crossed_at.is_some());
        assert_eq!(session.score, 1);
        assert!(session.obstacles.obstacles[0].passed);
        assert!(session.sounds.drain().contains(&SoundCue::Point));

        // Further frames do not re-score the same obstacle
        for _ in 0..5 {
            session.body.y = 260.0;
            session.body.vel = 0.0;
            tick(&mut session, 1.0);
        }
        assert_eq!(session.score, 1);
    }

    #[test]
    fn test_ground_out_scenario() {
        let mut session = Session::restarted(3);
        session.body.y = 513.0;
        let report = tick(&mut session, 1.0);
        assert_eq!(report.collision, Some(Collision::Ground));
        assert_eq!(session.phase, GamePhase::Over);
        assert_eq!(session.sounds.drain(), vec![SoundCue::Hit]);
    }

    #[test]
    fn test_over_freezes_everything() {
        let mut session = Session::restarted(3);
        session.score = 4;
        session.body.y = 600.0;
        tick(&mut session, 1.0);
        let snapshot = (session.body.clone(), session.obstacles.len(), session.score);
        for _ in 0..10 {
            tick(&mut session, 1.0);
        }
        assert_eq!(
            snapshot,
            (session.body.clone(), session.obstacles.len(), session.score)
        );
    }

    #[test]
    fn test_collision_blocks_scoring_that_frame() {
        let mut session = Session::restarted(5);
        // Already past the anchor but unscored, with the body on the ground
        session.obstacles.obstacles.push(Obstacle::new(-10.0, 200.0));
        session.body.y = 520.0;
        tick(&mut session, 1.0);
        assert_eq!(session.score, 0);
        assert!(session.is_over());
    }

    #[test]
    fn test_long_pause_moves_one_unit() {
        use crate::sim::timebase::Timebase;

        let mut paused = Session::restarted(8);
        let mut nominal = Session::restarted(8);
        let mut timebase = Timebase::new();
        timebase.step(1000.0);
        let step = timebase.step(11_000.0);
        tick(&mut paused, step);
        tick(&mut nominal, 1.0);
        assert_eq!(paused.body, nominal.body);
        assert_eq!(paused.obstacles.obstacles, nominal.obstacles.obstacles);
    }

    #[test]
    fn test_determinism() {
        let mut a = Session::restarted(99999);
        let mut b = Session::restarted(99999);
        for frame in 0..300 {
            if frame % 20 == 0 {
                press(&mut a, frame as f64 * 16.0 + 1000.0);
                press(&mut b, frame as f64 * 16.0 + 1000.0);
            }
            tick(&mut a, 1.0);
            tick(&mut b, 1.0);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score, b.score);
        assert_eq!(a.obstacles.obstacles, b.obstacles.obstacles);
    }

    proptest! {
        #[test]
        fn prop_score_and_phase_are_monotonic(
            seed in any::<u64>(),
            events in proptest::collection::vec((any::<bool>(), 0.0f32..1.0), 1..400),
        ) {
            let mut session = Session::new(seed);
            let mut now = 1000.0;
            let mut last_score = 0;
            let mut last_phase = session.phase;
            for (flap, step) in events {
                now += 16.7;
                if flap {
                    press(&mut session, now);
                }
                tick(&mut session, step);
                prop_assert!(session.score >= last_score);
                prop_assert!(session.phase >= last_phase);
                last_score = session.score;
                last_phase = session.phase;
            }
        }
    }
}
