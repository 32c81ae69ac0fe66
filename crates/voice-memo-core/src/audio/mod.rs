mod backend;
pub(crate) mod capture;
pub(crate) mod cpal_backend;
pub(crate) mod playback;
mod quality_profile;
pub(crate) mod wav;

pub(crate) use {capture::CpalCapture, playback::CpalPlayback};

pub use {
    backend::{
        AudioBackend, CaptureResource, CapturedAudio, PermissionStatus, PlaybackEvent,
        PlaybackResource,
    },
    cpal_backend::CpalBackend,
    quality_profile::QualityProfile,
};
