/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

pub const MODULE_NAME: &str = "jitsirtc";

pub const DEFAULT_SERVER: &str = "beta.meet.jit.si";

/// Participant property carrying the host user id of the sender.
pub const HOST_USER_ID_PROPERTY: &str = "fvttUserId";
pub const REQUESTING_TRANSCRIPTION_PROPERTY: &str = "requestingTranscription";

pub const RENDER_DEBOUNCE_MS: u64 = 2000;
pub const CONNECT_TIMEOUT_MS: u64 = 30_000;

/// Audio level above which a participant counts as speaking.
pub const SPEAKING_THRESHOLD: f64 = 0.01;

pub const ROOM_NAME_LENGTH: usize = 32;
pub const GUEST_ID_LENGTH: usize = 16;
pub const DEFAULT_GUEST_NAME: &str = "Jitsi User";

pub const VIDEO_RESOLUTION: u32 = 240;
pub const MAX_FRAME_RATE: u32 = 30;
pub const AUDIO_LEVELS_INTERVAL_MS: u32 = 500;

pub mod i18n {
    pub const UNKNOWN_DEVICE: &str = "WEBRTC.UnknownDevice";
    pub const CAPTURE_WARNING_AUDIO: &str = "WEBRTC.CaptureWarningAudio";
    pub const CAPTURE_WARNING_VIDEO: &str = "WEBRTC.CaptureWarningVideo";
    pub const CAPTURE_ERROR_AUDIO_VIDEO: &str = "WEBRTC.CaptureErrorAudioVideo";
    pub const LOGIN_ERROR: &str = "JITSIRTC.loginError";
}
