use crate::Settings;

/// Capture quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityProfile {
    /// Device sample rate and channel count, 32-bit float samples.
    High,
    /// Device sample rate, mono, 16-bit integer samples.
    Minimal,
}

impl From<Settings> for QualityProfile {
    fn from(settings: Settings) -> Self {
        if settings.high_quality {
            QualityProfile::High
        } else {
            QualityProfile::Minimal
        }
    }
}
