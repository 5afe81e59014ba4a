//! Silence-threshold chunking.
//!
//! The audio track is split into fixed-length chunks; a chunk whose loudness
//! is at or below the threshold is dropped and the survivors are
//! concatenated. Loudness is dBFS relative to i16 full scale, so an all-zero
//! chunk measures negative infinity.

use std::ops::Range;

use vidmill_core::ProcessingConfig;

/// Parameters for silence cutting.
#[derive(Debug, Clone, Copy)]
pub struct SilenceConfig {
    /// Chunks at or below this loudness are dropped.
    pub threshold_dbfs: f64,
    /// Chunk length evaluated at a time.
    pub chunk_ms: u64,
    /// Chunks shorter than this (the trailing remainder) are kept
    /// regardless of loudness.
    pub min_silence_ms: u64,
}

impl From<&ProcessingConfig> for SilenceConfig {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            threshold_dbfs: config.silence_threshold_dbfs,
            chunk_ms: config.silence_chunk_ms,
            min_silence_ms: config.min_silence_ms,
        }
    }
}

/// Loudness of a chunk in dBFS relative to i16 full scale.
///
/// Returns negative infinity for an empty or all-zero chunk.
pub fn chunk_dbfs(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    let rms = (sum_squares / samples.len() as f64).sqrt();

    if rms == 0.0 {
        return f64::NEG_INFINITY;
    }

    20.0 * (rms / i16::MAX as f64).log10()
}

/// Sample ranges of the chunks loud enough to keep.
pub fn select_audible_chunks(
    samples: &[i16],
    sample_rate: u32,
    config: &SilenceConfig,
) -> Vec<Range<usize>> {
    let chunk_len = (sample_rate as u64 * config.chunk_ms / 1000) as usize;
    let min_len = (sample_rate as u64 * config.min_silence_ms / 1000) as usize;
    if chunk_len == 0 {
        return vec![0..samples.len()];
    }

    let mut kept = Vec::new();
    let mut start = 0;
    while start < samples.len() {
        let end = (start + chunk_len).min(samples.len());
        let chunk = &samples[start..end];
        // A remainder too short to judge is kept as-is.
        if chunk.len() < min_len || chunk_dbfs(chunk) > config.threshold_dbfs {
            kept.push(start..end);
        }
        start = end;
    }
    kept
}

/// Concatenate the audible chunks of `samples`.
pub fn cut_silence(samples: &[i16], sample_rate: u32, config: &SilenceConfig) -> Vec<i16> {
    let ranges = select_audible_chunks(samples, sample_rate, config);
    let total: usize = ranges.iter().map(|r| r.len()).sum();

    tracing::debug!(
        input_samples = samples.len(),
        kept_samples = total,
        kept_chunks = ranges.len(),
        "Silence cut selection"
    );

    let mut out = Vec::with_capacity(total);
    for range in ranges {
        out.extend_from_slice(&samples[range]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    fn config() -> SilenceConfig {
        SilenceConfig {
            threshold_dbfs: -40.0,
            chunk_ms: 1000,
            min_silence_ms: 100,
        }
    }

    /// A loud chunk: full-scale square wave.
    fn loud(len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect()
    }

    #[test]
    fn test_dbfs_of_silence_is_negative_infinity() {
        assert_eq!(chunk_dbfs(&[]), f64::NEG_INFINITY);
        assert_eq!(chunk_dbfs(&[0; 100]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_dbfs_of_full_scale_is_zero() {
        let dbfs = chunk_dbfs(&loud(1000));
        assert!(dbfs.abs() < 0.01, "full scale measured {} dBFS", dbfs);
    }

    #[test]
    fn test_quiet_signal_is_below_threshold() {
        // ~1/256 of full scale is about -48 dBFS.
        let quiet: Vec<i16> = (0..1000).map(|i| if i % 2 == 0 { 128 } else { -128 }).collect();
        let dbfs = chunk_dbfs(&quiet);
        assert!(dbfs < -40.0, "quiet signal measured {} dBFS", dbfs);
    }

    #[test]
    fn test_cut_silence_drops_silent_chunks() {
        // loud second, silent second, loud second
        let mut samples = loud(1000);
        samples.extend_from_slice(&[0; 1000]);
        samples.extend_from_slice(&loud(1000));

        let result = cut_silence(&samples, RATE, &config());
        assert_eq!(result.len(), 2000);
    }

    #[test]
    fn test_cut_silence_keeps_everything_when_loud() {
        let samples = loud(3500);
        let result = cut_silence(&samples, RATE, &config());
        assert_eq!(result.len(), 3500);
    }

    #[test]
    fn test_short_trailing_remainder_is_kept() {
        // 1s of silence then a 50ms silent tail: the tail is below
        // min_silence_ms and survives, the full chunk does not.
        let samples = vec![0i16; 1050];
        let result = cut_silence(&samples, RATE, &config());
        assert_eq!(result.len(), 50);
    }

    #[test]
    fn test_all_silent_input_collapses() {
        let samples = vec![0i16; 3000];
        let result = cut_silence(&samples, RATE, &config());
        assert!(result.is_empty());
    }

    #[test]
    fn test_chunk_selection_ranges() {
        let mut samples = vec![0i16; 1000];
        samples.extend_from_slice(&loud(1000));

        let ranges = select_audible_chunks(&samples, RATE, &config());
        assert_eq!(ranges, vec![1000..2000]);
    }
}
