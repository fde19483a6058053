//! Per-frame draw sequence
//!
//! Turns a session into an ordered list of sprite blits. Reads the session,
//! never decides outcomes; the only thing it takes from the session is the
//! pending-sound mailbox, which it drains before drawing.

use crate::consts::*;
use crate::sim::{GamePhase, Rect, Session, SoundCue};

/// Height of the pipe sprite; segments show as much of it as fits
pub const PIPE_IMAGE_HEIGHT: f32 = 320.0;

/// Every drawable the game uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sprite {
    Background,
    Pipe,
    StartPrompt,
    /// Wing animation frame `0..BIRD_FRAMES`
    Bird(u8),
    /// Score glyph `0..=9`
    Digit(u8),
}

impl Sprite {
    /// All sprites, in a fixed order
    pub fn all() -> Vec<Sprite> {
        let mut sprites = vec![Sprite::Background, Sprite::Pipe, Sprite::StartPrompt];
        sprites.extend((0..BIRD_FRAMES).map(Sprite::Bird));
        sprites.extend((0..10).map(Sprite::Digit));
        sprites
    }
}

/// One sprite blit in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub sprite: Sprite,
    pub dest: Rect,
    /// Clockwise rotation about the rect center, degrees
    pub rotation_deg: f32,
    /// Mirror vertically (top pipe segments)
    pub flip_y: bool,
}

impl DrawCommand {
    pub fn new(sprite: Sprite, dest: Rect) -> Self {
        Self {
            sprite,
            dest,
            rotation_deg: 0.0,
            flip_y: false,
        }
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation_deg = degrees;
        self
    }

    pub fn flipped(mut self) -> Self {
        self.flip_y = true;
        self
    }
}

/// Everything the host needs to present one frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Draw order, back to front. The target is cleared before the first.
    pub commands: Vec<DrawCommand>,
    /// Cues flushed from the mailbox at the start of this pass
    pub sounds: Vec<SoundCue>,
}

/// Flush pending sounds, then compose the draw list
pub fn present(session: &mut Session) -> Frame {
    let sounds = session.sounds.drain();
    Frame {
        commands: compose(session),
        sounds,
    }
}

/// Draw list for the current session state
pub fn compose(session: &Session) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::new(
        Sprite::Background,
        Rect::new(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT),
    )];

    if session.phase == GamePhase::NotStarted {
        commands.push(DrawCommand::new(
            Sprite::StartPrompt,
            Rect::new(
                (WORLD_WIDTH - PROMPT_WIDTH) / 2.0,
                (WORLD_HEIGHT - PROMPT_HEIGHT) / 2.0,
                PROMPT_WIDTH,
                PROMPT_HEIGHT,
            ),
        ));
        return commands;
    }

    for obstacle in session.obstacles.iter() {
        // Cap of the upper pipe faces down into the gap
        commands.push(
            DrawCommand::new(
                Sprite::Pipe,
                Rect::new(
                    obstacle.x,
                    obstacle.gap_top - PIPE_IMAGE_HEIGHT,
                    PIPE_WIDTH,
                    PIPE_IMAGE_HEIGHT,
                ),
            )
            .flipped(),
        );
        commands.push(DrawCommand::new(
            Sprite::Pipe,
            Rect::new(
                obstacle.x,
                obstacle.gap_bottom(),
                PIPE_WIDTH,
                PIPE_IMAGE_HEIGHT,
            ),
        ));
    }

    let body = &session.body;
    commands.push(
        DrawCommand::new(
            Sprite::Bird(body.frame),
            Rect::new(BIRD_X, body.y, BIRD_WIDTH, BIRD_HEIGHT),
        )
        .rotated(body.tilt_degrees()),
    );

    commands.extend(score_glyphs(session.score));
    commands
}

/// Score digits, left to right, centered horizontally
pub fn score_glyphs(score: u64) -> Vec<DrawCommand> {
    let digits: Vec<u8> = score
        .to_string()
        .bytes()
        .map(|b| b - b'0')
        .collect();
    let total_width = digits.len() as f32 * DIGIT_WIDTH;
    let start_x = (WORLD_WIDTH - total_width) / 2.0;

    digits
        .into_iter()
        .enumerate()
        .map(|(i, digit)| {
            DrawCommand::new(
                Sprite::Digit(digit),
                Rect::new(
                    start_x + i as f32 * DIGIT_WIDTH,
                    SCORE_Y,
                    DIGIT_WIDTH,
                    DIGIT_HEIGHT,
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Collision, Obstacle, press};

    #[test]
    fn test_not_started_draws_prompt_only() {
        let session = Session::new(1);
        let commands = compose(&session);
        let sprites: Vec<Sprite> = commands.iter().map(|c| c.sprite).collect();
        assert_eq!(sprites, vec![Sprite::Background, Sprite::StartPrompt]);
        let prompt = commands[1].dest;
        assert_eq!(prompt.x + prompt.w / 2.0, WORLD_WIDTH / 2.0);
    }

    #[test]
    fn test_running_draw_order() {
        let mut session = Session::restarted(1);
        session.obstacles.obstacles.push(Obstacle::new(150.0, 200.0));
        session.score = 3;
        let commands = compose(&session);
        let sprites: Vec<Sprite> = commands.iter().map(|c| c.sprite).collect();
        assert_eq!(
            sprites,
            vec![
                Sprite::Background,
                Sprite::Pipe,
                Sprite::Pipe,
                Sprite::Bird(0),
                Sprite::Digit(3),
            ]
        );
        // Top pipe ends exactly at the gap, bottom pipe starts at its far side
        assert!(commands[1].flip_y);
        assert_eq!(commands[1].dest.bottom(), 200.0);
        assert!(!commands[2].flip_y);
        assert_eq!(commands[2].dest.y, 350.0);
    }

    #[test]
    fn test_over_still_draws_world() {
        let mut session = Session::restarted(1);
        session.obstacles.obstacles.push(Obstacle::new(150.0, 200.0));
        session.finish(Collision::Obstacle);
        let commands = compose(&session);
        assert!(commands.iter().any(|c| c.sprite == Sprite::Pipe));
        assert!(commands.iter().all(|c| c.sprite != Sprite::StartPrompt));
    }

    #[test]
    fn test_body_tilt_follows_velocity() {
        let mut session = Session::restarted(1);
        session.body.vel = -JUMP_STRENGTH;
        let commands = compose(&session);
        let bird = commands
            .iter()
            .find(|c| matches!(c.sprite, Sprite::Bird(_)))
            .unwrap();
        assert!(bird.rotation_deg < 0.0);
        assert!(bird.rotation_deg >= -MAX_TILT_DEG);
    }

    #[test]
    fn test_score_glyphs_centered() {
        let glyphs = score_glyphs(120);
        let digits: Vec<Sprite> = glyphs.iter().map(|c| c.sprite).collect();
        assert_eq!(
            digits,
            vec![Sprite::Digit(1), Sprite::Digit(2), Sprite::Digit(0)]
        );
        let left = glyphs[0].dest.x;
        let right = glyphs[2].dest.right();
        assert!(((left + right) / 2.0 - WORLD_WIDTH / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_present_flushes_sounds_once() {
        let mut session = Session::restarted(1);
        press(&mut session, 1000.0);
        let frame = present(&mut session);
        assert_eq!(frame.sounds, vec![SoundCue::Wing]);
        assert!(present(&mut session).sounds.is_empty());
    }

    #[test]
    fn test_sprite_catalogue() {
        let sprites = Sprite::all();
        assert_eq!(sprites.len(), 3 + BIRD_FRAMES as usize + 10);
        assert!(sprites.contains(&Sprite::Digit(9)));
        assert!(sprites.contains(&Sprite::Bird(BIRD_FRAMES - 1)));
    }
}
