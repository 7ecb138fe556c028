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

//! Capability surface of the wrapped conferencing library.
//!
//! The client never reaches into the library directly; a backend implements
//! these traits once and the client drives it through them. Signaling, ICE
//! and media transport all stay behind this boundary.

use anyhow::Result;
use async_broadcast::Receiver;
use async_trait::async_trait;
use jitsirtc_types::{ExternalParticipantId, MediaKind, RoomName};
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::ConnectionOptions;
use crate::events::{ConferenceEvent, TransportEvent};

pub type TrackRef = Arc<dyn MediaTrack>;
pub type ParticipantRef = Arc<dyn RemoteParticipant>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    AudioInput,
    VideoInput,
    AudioOutput,
}

impl From<MediaKind> for DeviceKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio => DeviceKind::AudioInput,
            MediaKind::Video => DeviceKind::VideoInput,
        }
    }
}

/// One entry of a device enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_id: String,
    /// Empty when the platform withholds device names (no permission yet).
    pub label: String,
    pub kind: DeviceKind,
}

/// What to capture in a single `create_local_tracks` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackRequest {
    /// Microphone to capture, if any.
    pub audio_device: Option<String>,
    /// Camera to capture, if any.
    pub video_device: Option<String>,
    /// Capture the screen instead of a camera.
    pub desktop: bool,
    pub resolution: u32,
}

impl TrackRequest {
    pub fn kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::new();
        if self.audio_device.is_some() {
            kinds.push(MediaKind::Audio);
        }
        if self.video_device.is_some() || self.desktop {
            kinds.push(MediaKind::Video);
        }
        kinds
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub password: String,
}

/// Opaque reference to a host media element (video or audio) a track can be
/// attached to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaElement(pub String);

/// Receiver-side video allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiverConstraints {
    /// `-1` means "no limit".
    pub last_n: i32,
    pub on_stage: Vec<ExternalParticipantId>,
    pub max_height: u32,
    pub max_frame_rate: u32,
}

/// Library entry points that exist before any connection.
#[async_trait]
pub trait RtcLibrary: Send + Sync {
    async fn init(&self, options: &ConnectionOptions) -> Result<()>;

    fn set_debug_logging(&self, enabled: bool);

    /// Create an unconnected transport for `options`.
    fn create_connection(&self, options: &ConnectionOptions) -> Arc<dyn Transport>;

    async fn create_local_tracks(&self, request: &TrackRequest) -> Result<Vec<TrackRef>>;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Whether the audio output device of a track can be changed.
    fn output_device_change_available(&self) -> bool;
}

/// A signaling connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Subscribe to this transport's events. Only events emitted after the
    /// call are delivered.
    fn events(&self) -> Receiver<TransportEvent>;

    /// Start connecting. The outcome arrives as a [`TransportEvent`].
    async fn connect(&self, credentials: Option<Credentials>);

    async fn disconnect(&self) -> Result<()>;

    fn init_conference(&self, room: &RoomName, options: &ConnectionOptions) -> Arc<dyn Conference>;
}

/// A conference room on a connected transport.
#[async_trait]
pub trait Conference: Send + Sync {
    fn events(&self) -> Receiver<ConferenceEvent>;

    /// Start joining. The outcome arrives as [`ConferenceEvent::Joined`] or
    /// [`ConferenceEvent::Error`].
    fn join(&self);

    async fn leave(&self) -> Result<()>;

    /// Id the conference assigned to the local participant.
    fn my_user_id(&self) -> ExternalParticipantId;

    async fn add_track(&self, track: TrackRef) -> Result<()>;

    fn local_tracks(&self) -> Vec<TrackRef>;

    fn set_display_name(&self, name: &str);

    fn set_local_participant_property(&self, key: &str, value: &str);

    fn participant(&self, id: &ExternalParticipantId) -> Option<ParticipantRef>;

    fn kick_participant(&self, id: &ExternalParticipantId);

    fn select_participants(&self, ids: &[ExternalParticipantId]);

    fn set_receiver_constraints(&self, constraints: &ReceiverConstraints) -> Result<()>;
}

pub trait RemoteParticipant: Send + Sync + Debug {
    fn id(&self) -> ExternalParticipantId;

    fn display_name(&self) -> Option<String>;

    fn property(&self, key: &str) -> Option<String>;

    /// Hidden participants are service accounts such as transcribers.
    fn is_hidden(&self) -> bool;

    fn tracks_by_media_type(&self, kind: MediaKind) -> Vec<TrackRef>;
}

/// A single audio or video track, local or remote.
#[async_trait]
pub trait MediaTrack: Send + Sync + Debug {
    fn kind(&self) -> MediaKind;

    fn is_local(&self) -> bool;

    /// Owner of a remote track; `None` for local tracks.
    fn participant_id(&self) -> Option<ExternalParticipantId>;

    fn is_muted(&self) -> bool;

    async fn mute(&self) -> Result<()>;

    async fn unmute(&self) -> Result<()>;

    /// Stop the track and free its device.
    async fn dispose(&self) -> Result<()>;

    async fn attach(&self, element: &MediaElement) -> Result<()>;

    fn set_audio_output(&self, device_id: &str) -> Result<()>;
}
