//! Presentation module
//!
//! `frame` turns a session into an ordered draw list with no GPU in sight;
//! `pipeline` blits that list with WebGPU.

pub mod frame;
pub mod pipeline;
pub mod quads;
pub mod vertex;

pub use frame::{DrawCommand, Frame, Sprite, compose, present};
pub use pipeline::{RenderError, SpriteRenderer};
