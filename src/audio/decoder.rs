use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::fetch::RawAudio;
use super::types::AudioData;
use crate::error::{PlayerError, Result};

/// Decode fetched bytes into an `AudioData` struct with all samples in memory.
pub fn decode(raw: RawAudio) -> Result<AudioData> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(raw.bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = raw.extension.as_deref() {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PlayerError::Probe(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(PlayerError::NoTrack)?
        .clone();

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| PlayerError::Decode("no sample rate in track".into()))?;
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PlayerError::Decode(format!("failed to create decoder: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(PlayerError::Decode(format!("error reading packet: {e}"))),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet: {e}");
                continue;
            }
            Err(e) => return Err(PlayerError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        if channels == 0 {
            channels = spec.channels.count() as u16;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if channels == 0 || samples.is_empty() {
        return Err(PlayerError::Decode("stream contained no audio".into()));
    }

    let num_frames = samples.len() / channels as usize;
    let duration = num_frames as f64 / sample_rate as f64;

    log::info!(
        "Decoded audio: {num_frames} frames, {channels} ch, {sample_rate}Hz, {duration:.1}s"
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
        duration,
    })
}
