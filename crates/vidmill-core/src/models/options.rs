use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Audio enhancement profile applied by the enhance-audio step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioEnhancement {
    /// Speech clarity: loudness normalize + high-pass.
    Clear,
    /// Music: normalize + dynamic range compression.
    Music,
    /// Everything: normalize + compression + high-pass.
    #[default]
    Full,
}

impl Display for AudioEnhancement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AudioEnhancement::Clear => write!(f, "clear"),
            AudioEnhancement::Music => write!(f, "music"),
            AudioEnhancement::Full => write!(f, "full"),
        }
    }
}

/// Stabilization mode. `Standard` is accepted but currently a no-op
/// placeholder in the pixel-enhancement step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stabilization {
    #[default]
    None,
    Standard,
}

/// Options chosen by the caller for one processing run.
///
/// All fields default so a partial JSON body deserializes; `brightness` and
/// `contrast` are percentages where 100 means unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingOptions {
    pub cut_silence: bool,
    pub enhance_audio: bool,
    pub audio_enhancement: AudioEnhancement,
    pub generate_thumbnail: bool,
    pub generate_subtitles: bool,
    pub summarize: bool,
    pub stabilization: Stabilization,
    pub brightness: u32,
    pub contrast: u32,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            cut_silence: false,
            enhance_audio: false,
            audio_enhancement: AudioEnhancement::default(),
            generate_thumbnail: false,
            generate_subtitles: false,
            summarize: false,
            stabilization: Stabilization::default(),
            brightness: 100,
            contrast: 100,
        }
    }
}

impl ProcessingOptions {
    /// Whether any pixel-level enhancement was requested.
    pub fn wants_pixel_enhancement(&self) -> bool {
        self.stabilization != Stabilization::None || self.brightness != 100 || self.contrast != 100
    }
}
