//! Audio playback using the Web Audio API
//!
//! Clips are decoded once at load time and played fire-and-forget. A failed
//! or missing context only means silence; gameplay never waits on audio.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioBuffer, AudioBufferSourceNode, AudioContext, GainNode};

use crate::assets::AssetError;
use crate::settings::Settings;
use crate::web::js_message;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Gain applied to every clip, zero when muted
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: Settings::default().effective_volume(),
        }
    }

    /// Context used for decoding, if audio is available
    pub fn context(&self) -> Option<AudioContext> {
        self.ctx.clone()
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }

    /// Start a clip now. Overlapping plays of the same clip are allowed.
    pub fn play(&self, clip: &AudioBuffer) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        self.resume();

        let Some((source, gain)) = Self::create_voice(ctx, clip) else {
            log::warn!("Failed to start audio clip");
            return;
        };
        gain.gain().set_value(vol);
        if source.start().is_err() {
            log::warn!("Failed to start audio clip");
        }
    }

    fn create_voice(
        ctx: &AudioContext,
        clip: &AudioBuffer,
    ) -> Option<(AudioBufferSourceNode, GainNode)> {
        let source = ctx.create_buffer_source().ok()?;
        let gain = ctx.create_gain().ok()?;

        source.set_buffer(Some(clip));
        source.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((source, gain))
    }
}

/// Decode an encoded clip (wav/ogg/mp3) into a playable buffer
pub async fn decode_clip(
    ctx: &AudioContext,
    path: &str,
    data: &js_sys::ArrayBuffer,
) -> Result<AudioBuffer, AssetError> {
    let decode_err = |reason: String| AssetError::DecodeAudio {
        path: path.to_string(),
        reason,
    };

    let promise = ctx
        .decode_audio_data(data)
        .map_err(|e| decode_err(js_message(&e)))?;
    let decoded = JsFuture::from(promise)
        .await
        .map_err(|e| decode_err(js_message(&e)))?;
    decoded
        .dyn_into::<AudioBuffer>()
        .map_err(|e| decode_err(js_message(&e)))
}
