use std::sync::Arc;

use crate::audio::types::AudioData;
use crate::audio::{decoder, fetch};
use crate::error::Result;
use crate::sampler;

/// What a finished load hands to the UI.
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    pub audio: Arc<AudioData>,
    /// Normalized block amplitudes, ready to draw.
    pub summary: Vec<f32>,
}

/// Fetch, decode and summarize one source. Blocking.
pub fn load(location: &str, sample_count: usize, channel: usize) -> Result<LoadedAudio> {
    let raw = fetch::fetch(location)?;
    let audio = decoder::decode(raw)?;
    let summary = sampler::summarize(&audio.channel(channel), sample_count);

    Ok(LoadedAudio {
        audio: Arc::new(audio),
        summary,
    })
}
