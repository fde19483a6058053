//! Quad generation for sprite blits

use std::ops::Range;

use glam::Vec2;

use super::frame::{DrawCommand, Sprite};
use super::vertex::SpriteVertex;
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Map world coordinates (+y down) to normalized device coordinates (+y up)
#[inline]
pub fn world_to_ndc(p: Vec2) -> Vec2 {
    Vec2::new(
        p.x / WORLD_WIDTH * 2.0 - 1.0,
        1.0 - p.y / WORLD_HEIGHT * 2.0,
    )
}

/// Two triangles for one blit, rotated about the rect center
pub fn sprite_quad(cmd: &DrawCommand) -> [SpriteVertex; 6] {
    let rect = cmd.dest;
    let half = Vec2::new(rect.w / 2.0, rect.h / 2.0);
    let center = Vec2::new(rect.x, rect.y) + half;
    // Screen y points down, so a positive angle turns clockwise
    let rotation = Vec2::from_angle(cmd.rotation_deg.to_radians());

    let corner = |offset: Vec2, u: f32, v: f32| {
        let p = world_to_ndc(center + rotation.rotate(offset));
        let v = if cmd.flip_y { 1.0 - v } else { v };
        SpriteVertex::new(p.x, p.y, u, v)
    };

    let tl = corner(Vec2::new(-half.x, -half.y), 0.0, 0.0);
    let tr = corner(Vec2::new(half.x, -half.y), 1.0, 0.0);
    let bl = corner(Vec2::new(-half.x, half.y), 0.0, 1.0);
    let br = corner(Vec2::new(half.x, half.y), 1.0, 1.0);

    [tl, bl, tr, tr, bl, br]
}

/// A run of consecutive blits sharing one texture
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub sprite: Sprite,
    pub vertices: Range<u32>,
}

/// All vertices for a frame plus the draw calls that cover them
#[derive(Debug, Clone, Default)]
pub struct SpriteMesh {
    pub vertices: Vec<SpriteVertex>,
    pub batches: Vec<Batch>,
}

/// Build the frame mesh, merging neighbours with the same sprite.
/// Draw order is preserved.
pub fn build_mesh(commands: &[DrawCommand]) -> SpriteMesh {
    let mut mesh = SpriteMesh {
        vertices: Vec::with_capacity(commands.len() * 6),
        batches: Vec::new(),
    };

    for cmd in commands {
        let start = mesh.vertices.len() as u32;
        mesh.vertices.extend_from_slice(&sprite_quad(cmd));
        let end = mesh.vertices.len() as u32;

        match mesh.batches.last_mut() {
            Some(batch) if batch.sprite == cmd.sprite => batch.vertices.end = end,
            _ => mesh.batches.push(Batch {
                sprite: cmd.sprite,
                vertices: start..end,
            }),
        }
    }

    mesh
}

/// Letterboxed region of the canvas the world is drawn into (pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Largest world-aspect viewport that fits the canvas, centered
pub fn fit_viewport(width: u32, height: u32) -> Viewport {
    let (w, h) = (width as f32, height as f32);
    let scale = (w / WORLD_WIDTH).min(h / WORLD_HEIGHT);
    let vw = WORLD_WIDTH * scale;
    let vh = WORLD_HEIGHT * scale;
    Viewport {
        x: (w - vw) / 2.0,
        y: (h - vh) / 2.0,
        width: vw,
        height: vh,
    }
}
