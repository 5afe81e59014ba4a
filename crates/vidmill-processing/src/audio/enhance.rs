//! Audio enhancement profiles.
//!
//! Each profile maps to an ffmpeg audio filter chain applied by the codec:
//! loudness normalization everywhere, plus a high-pass against low-frequency
//! noise for speech and dynamic-range compression for music.

use vidmill_core::AudioEnhancement;

/// ffmpeg `-af` filter chain for an enhancement profile.
pub fn filter_chain(enhancement: AudioEnhancement) -> &'static str {
    match enhancement {
        AudioEnhancement::Clear => "loudnorm,highpass=f=80",
        AudioEnhancement::Music => "loudnorm,acompressor",
        AudioEnhancement::Full => "loudnorm,acompressor,highpass=f=80",
    }
}
