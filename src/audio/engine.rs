use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use super::types::{AudioCommand, AudioData, AudioEvent};
use crate::error::{PlayerError, Result};

/// How often (in output frames) to send position updates.
const POSITION_UPDATE_INTERVAL: usize = 4096;

struct EngineState {
    audio: Option<Arc<AudioData>>,
    /// Fractional frame position in the source.
    cursor: f64,
    /// Source frames advanced per output frame.
    step: f64,
    playing: bool,
    output_sample_rate: u32,
    frames_since_update: usize,
}

impl EngineState {
    fn new(output_sample_rate: u32) -> Self {
        Self {
            audio: None,
            cursor: 0.0,
            step: 1.0,
            playing: false,
            output_sample_rate,
            frames_since_update: 0,
        }
    }

    fn position_secs(&self) -> f64 {
        match &self.audio {
            Some(audio) if audio.sample_rate > 0 => self.cursor / audio.sample_rate as f64,
            _ => 0.0,
        }
    }

    fn handle_command(&mut self, cmd: AudioCommand, event_tx: &Sender<AudioEvent>) {
        match cmd {
            AudioCommand::LoadAudio(data) => {
                self.step = data.sample_rate as f64 / self.output_sample_rate.max(1) as f64;
                self.audio = Some(data);
                self.cursor = 0.0;
                self.playing = false;
                self.frames_since_update = 0;
            }
            AudioCommand::Play => {
                if self.audio.is_some() {
                    self.playing = true;
                }
            }
            AudioCommand::Pause => {
                if self.playing {
                    self.playing = false;
                    let _ = event_tx.send(AudioEvent::PositionChanged(self.position_secs()));
                }
            }
            AudioCommand::Stop => {
                self.playing = false;
                self.cursor = 0.0;
                let _ = event_tx.send(AudioEvent::PositionChanged(0.0));
            }
        }
    }

    /// Fill the output buffer with the source, converting rate and channel count.
    fn fill_buffer(&mut self, output: &mut [f32], channels: u16, event_tx: &Sender<AudioEvent>) {
        if !self.playing {
            output.fill(0.0);
            return;
        }

        let audio = match &self.audio {
            Some(a) => a.clone(),
            None => {
                output.fill(0.0);
                return;
            }
        };

        let audio_channels = audio.channels.max(1) as usize;
        let out_channels = channels.max(1) as usize;
        let total_frames = audio.num_frames();

        let mut written = 0;
        for frame in output.chunks_mut(out_channels) {
            let src = self.cursor as usize;
            if src >= total_frames {
                break;
            }
            for (c, out) in frame.iter_mut().enumerate() {
                *out = audio.samples[src * audio_channels + c % audio_channels];
            }
            self.cursor += self.step;
            written += 1;
        }

        if self.cursor as usize >= total_frames {
            self.playing = false;
            self.cursor = 0.0;
            self.frames_since_update = 0;
            let _ = event_tx.send(AudioEvent::PlaybackFinished);
            output[written * out_channels..].fill(0.0);
            return;
        }

        self.frames_since_update += written;
        if self.frames_since_update >= POSITION_UPDATE_INTERVAL {
            self.frames_since_update = 0;
            let _ = event_tx.send(AudioEvent::PositionChanged(self.position_secs()));
        }
    }
}

/// Spawn the audio engine and return command/event channels.
pub fn spawn_engine() -> Result<(Sender<AudioCommand>, Receiver<AudioEvent>)> {
    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded::<AudioCommand>(64);
    let (event_tx, event_rx) = crossbeam_channel::bounded::<AudioEvent>(256);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| PlayerError::Engine("no audio output device found".into()))?;

    let config = device
        .default_output_config()
        .map_err(|e| PlayerError::Engine(format!("failed to get output config: {e}")))?;

    let sample_rate = config.sample_rate();
    let channels = config.channels();
    let sample_format = config.sample_format();
    log::info!("Audio output: {channels} ch @ {sample_rate}Hz ({sample_format:?})");

    let mut state = EngineState::new(sample_rate);
    let event_tx_clone = event_tx.clone();
    let error_tx = event_tx.clone();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    while let Ok(cmd) = cmd_rx.try_recv() {
                        state.handle_command(cmd, &event_tx_clone);
                    }
                    state.fill_buffer(data, channels, &event_tx_clone);
                },
                move |err| {
                    log::error!("Audio stream error: {err}");
                    let _ = error_tx.try_send(AudioEvent::Error(err.to_string()));
                },
                None,
            )
            .map_err(|e| PlayerError::Engine(format!("failed to build output stream: {e}")))?,
        _ => {
            return Err(PlayerError::Engine(format!(
                "unsupported sample format: {sample_format:?}"
            )))
        }
    };

    stream
        .play()
        .map_err(|e| PlayerError::Engine(format!("failed to start stream: {e}")))?;

    // The stream stops when dropped, so park it on its own thread.
    std::thread::Builder::new()
        .name("audio-keepalive".into())
        .spawn(move || {
            let _stream = stream;
            loop {
                std::thread::park();
            }
        })?;

    Ok((cmd_tx, event_rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, sample_rate: u32) -> Arc<AudioData> {
        Arc::new(AudioData {
            samples: (0..frames).map(|i| i as f32 / frames as f32).collect(),
            sample_rate,
            channels: 1,
            duration: frames as f64 / sample_rate as f64,
        })
    }

    fn channel() -> (Sender<AudioEvent>, Receiver<AudioEvent>) {
        crossbeam_channel::unbounded()
    }

    #[test]
    fn play_without_audio_is_ignored() {
        let (tx, _rx) = channel();
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::Play, &tx);
        assert!(!state.playing);
    }

    #[test]
    fn paused_output_is_silent() {
        let (tx, _rx) = channel();
        let mut state = EngineState::new(1000);
        state.handle_command(AudioCommand::LoadAudio(ramp(100, 1000)), &tx);

        let mut out = vec![1.0f32; 8];
        state.fill_buffer(&mut out, 2, &tx);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(state.cursor, 0.0);
    }

    #[test]
    fn mono_source_fills_every_output_channel() {
        let (tx, _rx) = channel();
        let mut state = EngineState::new(1000);
        state.handle_command(AudioCommand::LoadAudio(ramp(100, 1000)), &tx);
        state.handle_command(AudioCommand::Play, &tx);

        let mut out = vec![0.0f32; 6];
        state.fill_buffer(&mut out, 2, &tx);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[2], out[3]);
        assert!((out[2] - 0.01).abs() < 1e-6);
        assert_eq!(state.cursor, 3.0);
    }

    #[test]
    fn steps_by_rate_ratio() {
        let (tx, _rx) = channel();
        let mut state = EngineState::new(1000);
        state.handle_command(AudioCommand::LoadAudio(ramp(100, 2000)), &tx);
        state.handle_command(AudioCommand::Play, &tx);

        let mut out = vec![0.0f32; 4];
        state.fill_buffer(&mut out, 1, &tx);
        assert_eq!(state.cursor, 8.0);
        assert!((out[1] - 0.02).abs() < 1e-6);
    }

    #[test]
    fn end_of_audio_reports_finished_and_rewinds() {
        let (tx, rx) = channel();
        let mut state = EngineState::new(1000);
        state.handle_command(AudioCommand::LoadAudio(ramp(4, 1000)), &tx);
        state.handle_command(AudioCommand::Play, &tx);

        let mut out = vec![1.0f32; 10];
        state.fill_buffer(&mut out, 1, &tx);
        assert!(!state.playing);
        assert_eq!(state.cursor, 0.0);
        assert!(out[4..].iter().all(|&s| s == 0.0));
        assert!(rx.try_iter().any(|e| matches!(e, AudioEvent::PlaybackFinished)));
    }

    #[test]
    fn pause_reports_position() {
        let (tx, rx) = channel();
        let mut state = EngineState::new(1000);
        state.handle_command(AudioCommand::LoadAudio(ramp(1000, 1000)), &tx);
        state.handle_command(AudioCommand::Play, &tx);
        let mut out = vec![0.0f32; 500];
        state.fill_buffer(&mut out, 1, &tx);
        state.handle_command(AudioCommand::Pause, &tx);

        let last = rx
            .try_iter()
            .filter_map(|e| match e {
                AudioEvent::PositionChanged(p) => Some(p),
                _ => None,
            })
            .last();
        assert_eq!(last, Some(0.5));
    }
}
