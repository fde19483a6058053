//! Collision detection for the body against obstacles and world bounds
//!
//! Everything is an axis-aligned box. Overlap uses strict inequalities on
//! every side, so boxes that only share an edge do not collide.

use super::body::Body;
use super::obstacles::Obstacle;
use crate::consts::*;

/// Axis-aligned rectangle, top-left origin, +y down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict AABB overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Why a frame ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Flew above the top of the world
    Ceiling,
    /// Fell past the bottom of the world
    Ground,
    /// Hit an obstacle segment
    Obstacle,
}

/// Collision box of the body
pub fn body_rect(body: &Body) -> Rect {
    Rect::new(BIRD_X, body.y, BIRD_WIDTH, BIRD_HEIGHT)
}

/// Body position outside `[0, WORLD_HEIGHT]`
pub fn out_of_bounds(body: &Body) -> Option<Collision> {
    if body.y < 0.0 {
        Some(Collision::Ceiling)
    } else if body.y > WORLD_HEIGHT {
        Some(Collision::Ground)
    } else {
        None
    }
}

/// Check the body against one obstacle's two segments
pub fn hits_obstacle(body: &Rect, obstacle: &Obstacle) -> bool {
    body.overlaps(&obstacle.top_segment()) || body.overlaps(&obstacle.bottom_segment())
}

/// Terminal verdict for a frame. Short-circuits on the first hit; which
/// obstacle caused it is irrelevant.
pub fn detect<'a, I>(body: &Body, obstacles: I) -> Option<Collision>
where
    I: IntoIterator<Item = &'a Obstacle>,
{
    if let Some(bounds) = out_of_bounds(body) {
        return Some(bounds);
    }
    let rect = body_rect(body);
    obstacles
        .into_iter()
        .any(|o| hits_obstacle(&rect, o))
        .then_some(Collision::Obstacle)
}
