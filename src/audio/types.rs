use std::sync::Arc;

/// Decoded audio data stored entirely in memory.
#[derive(Clone, Debug)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Duration in seconds.
    pub duration: f64,
}

impl AudioData {
    /// Total number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// De-interleave a single channel. Out-of-range indices fall back to the
    /// last channel.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        let ch = self.channels as usize;
        if ch <= 1 {
            return self.samples.clone();
        }
        let index = index.min(ch - 1);
        self.samples
            .chunks_exact(ch)
            .map(|frame| frame[index])
            .collect()
    }
}

/// Commands sent from the UI thread to the audio thread.
#[derive(Debug, Clone)]
pub enum AudioCommand {
    LoadAudio(Arc<AudioData>),
    Play,
    Pause,
    /// Pause and rewind; used before a reload.
    Stop,
}

/// Events sent from the audio thread to the UI thread.
#[derive(Debug, Clone)]
pub enum AudioEvent {
    PositionChanged(f64),
    PlaybackFinished,
    Error(String),
}

/// Current playback status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

/// Elapsed time and total duration in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackPosition {
    elapsed: f64,
    duration: f64,
}

impl PlaybackPosition {
    pub fn new(duration: f64) -> Self {
        Self {
            elapsed: 0.0,
            duration: sanitize(duration),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Keeps `0 <= elapsed <= duration`.
    pub fn set_elapsed(&mut self, secs: f64) {
        self.elapsed = sanitize(secs).min(self.duration);
    }

    pub fn rewind(&mut self) {
        self.elapsed = 0.0;
    }
}

fn sanitize(secs: f64) -> f64 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}
