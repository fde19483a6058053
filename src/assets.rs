//! Asset manifest, decoding and readiness tracking
//!
//! The game never starts on a partial set: every manifest entry must arrive,
//! and the first failure is terminal.

use std::collections::HashMap;

use thiserror::Error;

use crate::renderer::Sprite;
use crate::sim::SoundCue;

/// Root the asset paths are relative to
pub const ASSET_ROOT: &str = "assets";

/// Something the game needs loaded before it can start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Sprite(Sprite),
    Clip(SoundCue),
}

impl AssetId {
    /// Path relative to the page
    pub fn path(&self) -> String {
        match self {
            AssetId::Sprite(sprite) => {
                let name = match sprite {
                    Sprite::Background => "background".to_string(),
                    Sprite::Pipe => "pipe".to_string(),
                    Sprite::StartPrompt => "message".to_string(),
                    Sprite::Bird(frame) => format!("bird-{frame}"),
                    Sprite::Digit(digit) => digit.to_string(),
                };
                format!("{ASSET_ROOT}/sprites/{name}.png")
            }
            AssetId::Clip(cue) => {
                let name = match cue {
                    SoundCue::Point => "point",
                    SoundCue::Hit => "hit",
                    SoundCue::Wing => "wing",
                };
                format!("{ASSET_ROOT}/audio/{name}.wav")
            }
        }
    }
}

/// Every asset the game needs
pub fn manifest() -> Vec<AssetId> {
    let mut ids: Vec<AssetId> = Sprite::all().into_iter().map(AssetId::Sprite).collect();
    ids.extend(
        [SoundCue::Point, SoundCue::Hit, SoundCue::Wing]
            .into_iter()
            .map(AssetId::Clip),
    );
    ids
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("failed to decode image {path}: {source}")]
    DecodeImage {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode audio {path}: {reason}")]
    DecodeAudio { path: String, reason: String },
}

/// Decoded RGBA8 sprite pixels
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode PNG bytes into RGBA8
pub fn decode_image(path: &str, bytes: &[u8]) -> Result<DecodedImage, AssetError> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| AssetError::DecodeImage {
            path: path.to_string(),
            source,
        })?
        .to_rgba8();
    Ok(DecodedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Loading progress as seen by the frame loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Loading { loaded: usize, total: usize },
    Ready,
    /// Terminal; carries a human-readable message
    Failed(String),
}

/// Loaded handles, keyed by id. `C` is the platform's audio clip handle.
#[derive(Debug)]
pub struct Assets<C> {
    pub sprites: HashMap<Sprite, DecodedImage>,
    pub clips: HashMap<SoundCue, C>,
    total: usize,
    failure: Option<String>,
}

impl<C> Default for Assets<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Assets<C> {
    pub fn new() -> Self {
        Self {
            sprites: HashMap::new(),
            clips: HashMap::new(),
            total: manifest().len(),
            failure: None,
        }
    }

    pub fn insert_sprite(&mut self, sprite: Sprite, image: DecodedImage) {
        if self.failure.is_none() {
            self.sprites.insert(sprite, image);
        }
    }

    pub fn insert_clip(&mut self, cue: SoundCue, clip: C) {
        if self.failure.is_none() {
            self.clips.insert(cue, clip);
        }
    }

    /// Record a load failure. The first one wins and nothing loads after it.
    pub fn fail(&mut self, error: &AssetError) {
        if self.failure.is_none() {
            log::error!("Asset load failed: {}", error);
            self.failure = Some(error.to_string());
            self.sprites.clear();
            self.clips.clear();
        }
    }

    pub fn status(&self) -> AssetStatus {
        if let Some(message) = &self.failure {
            return AssetStatus::Failed(message.clone());
        }
        let loaded = self.sprites.len() + self.clips.len();
        if loaded >= self.total {
            AssetStatus::Ready
        } else {
            AssetStatus::Loading {
                loaded,
                total: self.total,
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == AssetStatus::Ready
    }
}
