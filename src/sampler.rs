//! Reduction of a decoded channel into the short amplitude summary the
//! waveform is drawn from.

/// Mean absolute amplitude of `sample_count` equal, contiguous blocks.
///
/// Block size is `len / sample_count` (integer division); trailing samples
/// that do not fill a whole block are dropped. A channel shorter than
/// `sample_count` is reduced to one block per sample instead.
pub fn reduce(channel: &[f32], sample_count: usize) -> Vec<f32> {
    let count = sample_count.min(channel.len());
    if count == 0 {
        return Vec::new();
    }
    let block_size = channel.len() / count;

    channel
        .chunks_exact(block_size)
        .take(count)
        .map(|block| block.iter().map(|s| s.abs()).sum::<f32>() / block_size as f32)
        .collect()
}

/// Scale so the loudest block equals 1.0. Silence stays silence.
pub fn normalize(summary: &[f32]) -> Vec<f32> {
    let max = summary.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 || !max.is_finite() {
        return vec![0.0; summary.len()];
    }
    let multiplier = max.recip();
    summary.iter().map(|n| n * multiplier).collect()
}

/// `reduce` followed by `normalize`.
pub fn summarize(channel: &[f32], sample_count: usize) -> Vec<f32> {
    normalize(&reduce(channel, sample_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-6, "{x} != {y}");
        }
    }

    #[test]
    fn reduce_returns_requested_count() {
        let channel: Vec<f32> = (0..1000).map(|i| ((i as f32) * 0.1).sin()).collect();
        for n in [1, 7, 120, 999, 1000] {
            let summary = reduce(&channel, n);
            assert_eq!(summary.len(), n);
            assert!(summary.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn reduce_averages_absolute_values() {
        let channel = [0.5, -0.5, 1.0, -0.0, -0.2, 0.4];
        assert_close(&reduce(&channel, 3), &[0.5, 0.5, 0.3]);
    }

    #[test]
    fn reduce_drops_remainder() {
        // block size 2; the trailing 9.0 belongs to no block
        let channel = [1.0, 1.0, 2.0, 2.0, 9.0];
        assert_close(&reduce(&channel, 2), &[1.0, 2.0]);
    }

    #[test]
    fn reduce_single_sample_blocks_is_identity() {
        let channel: Vec<f32> = (0..120).map(|i| i as f32 / 119.0).collect();
        assert_close(&reduce(&channel, 120), &channel);
    }

    #[test]
    fn reduce_short_buffer_clamps_count() {
        let summary = reduce(&[0.1, -0.2, 0.3], 120);
        assert_close(&summary, &[0.1, 0.2, 0.3]);
        assert!(summary.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn reduce_empty_inputs() {
        assert!(reduce(&[], 120).is_empty());
        assert!(reduce(&[0.5, 0.5], 0).is_empty());
    }

    #[test]
    fn normalize_peaks_at_one() {
        let normalized = normalize(&[0.1, 0.4, 0.2]);
        assert_close(&normalized, &[0.25, 1.0, 0.5]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(&[0.3, 0.9, 0.05, 0.6]);
        let twice = normalize(&once);
        assert_close(&once, &twice);
    }

    #[test]
    fn normalize_silence_stays_zero() {
        let normalized = normalize(&[0.0; 5]);
        assert_eq!(normalized, vec![0.0; 5]);
    }

    #[test]
    fn summarize_silent_channel_is_finite() {
        let summary = summarize(&vec![0.0; 4800], 120);
        assert_eq!(summary.len(), 120);
        assert!(summary.iter().all(|&v| v == 0.0));
    }
}
