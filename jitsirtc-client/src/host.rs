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

//! What the client needs from the host application.
//!
//! A host implements these traits once; [`AvHost`] is blanket-implemented for
//! any type that provides all of them, so a single `Arc<H>` can be handed to
//! [`JitsiAvClient::new`](crate::JitsiAvClient::new).

use jitsirtc_types::{AvSettings, CustomUrls, HostUserId, MediaKind, RoomName, VoiceMode};

use crate::constants::i18n;
use crate::library::MediaElement;

/// A user as known to the host's user directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUser {
    pub id: HostUserId,
    pub name: String,
    pub active: bool,
    /// Created by this client for an external guest; never persisted.
    pub temporary: bool,
}

pub trait UserDirectory: Send + Sync {
    fn user(&self, id: &HostUserId) -> Option<HostUser>;

    fn insert_temporary_user(&self, user: HostUser);

    fn remove_user(&self, id: &HostUserId);

    fn set_user_active(&self, id: &HostUserId, active: bool);

    fn local_user(&self) -> HostUser;
}

/// Per-user A/V permissions.
pub trait BroadcastPolicy: Send + Sync {
    /// Whether the user's role allows broadcasting `kind` at all.
    fn can_broadcast(&self, user: &HostUserId, kind: MediaKind) -> bool;

    /// Whether the user may share `kind` right now, which also takes the
    /// world A/V mode and any per-user block into account.
    fn can_share(&self, user: &HostUserId, kind: MediaKind) -> bool;
}

/// User-facing notifications raised by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Only audio could be captured.
    CaptureAudioOnly,
    /// Only video could be captured.
    CaptureVideoOnly,
    CaptureFailed,
    LoginError,
}

impl Notice {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Notice::CaptureAudioOnly => i18n::CAPTURE_WARNING_AUDIO,
            Notice::CaptureVideoOnly => i18n::CAPTURE_WARNING_VIDEO,
            Notice::CaptureFailed => i18n::CAPTURE_ERROR_AUDIO_VIDEO,
            Notice::LoginError => i18n::LOGIN_ERROR,
        }
    }
}

pub trait HostNotifier: Send + Sync {
    /// Re-render the A/V UI.
    fn render(&self);

    fn set_user_speaking(&self, user: &HostUserId, speaking: bool);

    fn notify(&self, notice: Notice, message: &str);

    /// Generic error channel.
    fn report_error(&self, message: &str);

    /// Show a caption line. Lines with the same `message_id` replace each other.
    fn caption(&self, message_id: &str, user: &HostUserId, text: &str);

    fn set_remote_audio_muted(&self, muted: bool);

    /// Offer the user a link to the full meeting web app.
    fn offer_join_link(&self, url: &str);

    /// Audio element the host has created for `user`, attached next to the
    /// given video element.
    fn audio_element_for(&self, user: &HostUserId, video: &MediaElement) -> Option<MediaElement>;

    /// A track was attached to a video element.
    fn video_set(&self, user: &HostUserId, element: &MediaElement);
}

/// The host's opaque settings store.
pub trait SettingsStore: Send + Sync {
    fn settings(&self) -> AvSettings;

    fn set_room(&self, room: &RoomName);

    fn set_voice_mode(&self, mode: VoiceMode);

    fn user_breakout_room(&self, user: &HostUserId) -> Option<RoomName>;

    fn set_user_breakout_room(&self, user: &HostUserId, room: Option<&RoomName>);

    fn set_external_users_url(&self, url: &str);

    fn set_captions_enabled(&self, enabled: bool);

    fn set_custom_urls(&self, urls: Option<CustomUrls>);
}

pub trait Localizer: Send + Sync {
    fn localize(&self, key: &str) -> String {
        key.to_string()
    }
}

pub trait AvHost: UserDirectory + BroadcastPolicy + HostNotifier + SettingsStore + Localizer {}

impl<T> AvHost for T where T: UserDirectory + BroadcastPolicy + HostNotifier + SettingsStore + Localizer {}
