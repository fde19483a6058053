//! Obstacle stream: spawn on cadence, scroll, score passes, retire off-screen
//!
//! Obstacles are appended at the right edge and only ever move left at the
//! same speed, so insertion order is also left-to-right order.

use rand::Rng;

use super::collision::Rect;
use crate::consts::*;

/// A gated obstacle: a top segment and a bottom segment around a gap
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Leading (left) edge
    pub x: f32,
    /// Height of the top segment; the gap spans `gap_top..gap_top + PIPE_GAP`
    pub gap_top: f32,
    /// Set once, the first frame the trailing edge clears the body anchor
    pub passed: bool,
}

impl Obstacle {
    pub fn new(x: f32, gap_top: f32) -> Self {
        Self {
            x,
            gap_top,
            passed: false,
        }
    }

    /// Trailing (right) edge
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + PIPE_WIDTH
    }

    /// Bottom of the gap / top of the lower segment
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + PIPE_GAP
    }

    /// Segment above the gap
    pub fn top_segment(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.gap_top)
    }

    /// Segment below the gap
    pub fn bottom_segment(&self) -> Rect {
        let top = self.gap_bottom();
        Rect::new(self.x, top, PIPE_WIDTH, WORLD_HEIGHT - top)
    }

    /// Mark passed if the trailing edge has cleared the anchor.
    /// Returns true only on the transition, so re-checking is a no-op.
    pub fn check_passed(&mut self) -> bool {
        if !self.passed && self.trailing_edge() < BIRD_X {
            self.passed = true;
            return true;
        }
        false
    }
}

/// Inclusive range of valid `gap_top` values
pub fn gap_top_range() -> (f32, f32) {
    (PIPE_MARGIN, WORLD_HEIGHT - PIPE_GAP - PIPE_MARGIN)
}

/// Uniform random gap position keeping both segments at least `PIPE_MARGIN` tall
pub fn random_gap_top<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let (min, max) = gap_top_range();
    rng.random_range(min..=max)
}

/// Live obstacles, leftmost first
#[derive(Debug, Clone, Default)]
pub struct ObstacleStream {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleStream {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
        }
    }

    /// Whether a new obstacle should enter at the right edge
    pub fn spawn_due(&self) -> bool {
        match self.obstacles.last() {
            None => true,
            Some(newest) => newest.x < WORLD_WIDTH - PIPE_SPAWN_THRESHOLD,
        }
    }

    /// Append an obstacle at the right edge if the cadence calls for one
    pub fn spawn_if_due<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.spawn_due() {
            return false;
        }
        let gap_top = random_gap_top(rng);
        self.obstacles.push(Obstacle::new(WORLD_WIDTH, gap_top));
        true
    }

    /// Scroll every obstacle left
    pub fn advance(&mut self, step: f32) {
        let dx = PIPE_SPEED * step;
        for obstacle in &mut self.obstacles {
            obstacle.x -= dx;
        }
    }

    /// Mark newly passed obstacles; returns how many passed this call
    pub fn score_passes(&mut self) -> u32 {
        self.obstacles
            .iter_mut()
            .map(|o| o.check_passed())
            .filter(|&newly| newly)
            .count() as u32
    }

    /// Drop obstacles whose trailing edge is at or past the left bound.
    /// `retain` keeps survivors in order.
    pub fn retire(&mut self) -> usize {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.trailing_edge() > 0.0);
        before - self.obstacles.len()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawns_when_empty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut stream = ObstacleStream::new();
        assert!(stream.spawn_if_due(&mut rng));
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.obstacles[0].x, WORLD_WIDTH);
        assert!(!stream.obstacles[0].passed);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut stream = ObstacleStream::new();
        stream.spawn_if_due(&mut rng);

        // Newest has not moved far enough yet
        stream.obstacles[0].x = WORLD_WIDTH - PIPE_SPAWN_THRESHOLD;
        assert!(!stream.spawn_if_due(&mut rng));

        stream.obstacles[0].x = WORLD_WIDTH - PIPE_SPAWN_THRESHOLD - 0.5;
        assert!(stream.spawn_if_due(&mut rng));
        assert_eq!(stream.len(), 2);
        assert!(stream.obstacles[0].x < stream.obstacles[1].x);
    }

    #[test]
    fn test_gap_always_within_margins() {
        let mut rng = Pcg32::seed_from_u64(3);
        let (min, max) = gap_top_range();
        for _ in 0..1000 {
            let gap_top = random_gap_top(&mut rng);
            assert!(gap_top >= min && gap_top <= max);
            let obstacle = Obstacle::new(0.0, gap_top);
            assert!(obstacle.top_segment().h >= PIPE_MARGIN);
            assert!(obstacle.bottom_segment().h >= PIPE_MARGIN - 1e-3);
        }
    }

    #[test]
    fn test_advance_moves_left() {
        let mut stream = ObstacleStream::new();
        stream.obstacles.push(Obstacle::new(100.0, 200.0));
        stream.obstacles.push(Obstacle::new(250.0, 100.0));
        stream.advance(0.5);
        assert_eq!(stream.obstacles[0].x, 100.0 - PIPE_SPEED * 0.5);
        assert_eq!(stream.obstacles[1].x, 250.0 - PIPE_SPEED * 0.5);
    }

    #[test]
    fn test_pass_scoring_is_idempotent() {
        let mut stream = ObstacleStream::new();
        stream.obstacles.push(Obstacle::new(BIRD_X - PIPE_WIDTH - 1.0, 200.0));
        assert_eq!(stream.score_passes(), 1);
        assert_eq!(stream.score_passes(), 0);
        assert!(stream.obstacles[0].passed);
    }

    #[test]
    fn test_trailing_edge_on_anchor_not_yet_passed() {
        let mut obstacle = Obstacle::new(BIRD_X - PIPE_WIDTH, 200.0);
        assert!(!obstacle.check_passed());
        obstacle.x -= 0.1;
        assert!(obstacle.check_passed());
    }

    #[test]
    fn test_retire_preserves_order() {
        let mut stream = ObstacleStream::new();
        stream.obstacles.push(Obstacle::new(-PIPE_WIDTH, 60.0));
        stream.obstacles.push(Obstacle::new(-PIPE_WIDTH + 1.0, 70.0));
        stream.obstacles.push(Obstacle::new(120.0, 80.0));
        stream.obstacles.push(Obstacle::new(270.0, 90.0));
        assert_eq!(stream.retire(), 1);
        let gaps: Vec<f32> = stream.iter().map(|o| o.gap_top).collect();
        assert_eq!(gaps, vec![70.0, 80.0, 90.0]);
    }

    #[test]
    fn test_segments_frame_the_gap() {
        let obstacle = Obstacle::new(288.0, 200.0);
        let top = obstacle.top_segment();
        let bottom = obstacle.bottom_segment();
        assert_eq!((top.y, top.h), (0.0, 200.0));
        assert_eq!((bottom.y, bottom.h), (350.0, WORLD_HEIGHT - 350.0));
        assert_eq!(top.w, PIPE_WIDTH);
    }
}
