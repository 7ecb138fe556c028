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

//! Events emitted by the wrapped conferencing library.
//!
//! A backend publishes these on `async_broadcast` channels handed out by
//! [`Transport::events`](crate::Transport::events) and
//! [`Conference::events`](crate::Conference::events). Delivery is in order per
//! channel; the [`EventBridge`](crate::EventBridge) merges both channels into a
//! single serialized stream.

use crate::library::{ParticipantRef, TrackRef};
use jitsirtc_types::ExternalParticipantId;

/// Events of the signaling connection, before and outside any conference.
#[derive(Clone, Debug)]
pub enum TransportEvent {
    /// The connection is up and a conference may be initialized.
    Established,

    /// The connection could not be established (bad credentials, unreachable host).
    Failed {
        code: String,
        message: Option<String>,
    },

    /// The connection dropped.
    Disconnected(Option<String>),
}

/// Events of a joined (or joining) conference.
#[derive(Clone, Debug)]
pub enum ConferenceEvent {
    // === Lifecycle ===
    /// The local participant joined the conference.
    Joined,

    /// The conference reported an error.
    Error(String),

    /// The media connection was interrupted.
    ConnectionInterrupted,

    /// The browser/device was suspended.
    SuspendDetected,

    // === Participants ===
    /// A remote participant joined.
    ParticipantJoined(ParticipantRef),

    /// A remote participant left.
    ParticipantLeft(ExternalParticipantId),

    /// A remote participant's connection quality changed.
    ParticipantConnectionStatusChanged {
        participant_id: ExternalParticipantId,
        status: String,
    },

    // === Tracks ===
    TrackAdded(TrackRef),
    TrackRemoved(TrackRef),
    TrackMuteChanged(TrackRef),

    /// Audio level of a participant, between 0.0 and 1.0.
    AudioLevelChanged {
        participant_id: ExternalParticipantId,
        level: f64,
    },

    // === Messages ===
    /// A data-channel message from another endpoint.
    EndpointMessage {
        from: ExternalParticipantId,
        payload: serde_json::Value,
    },

    /// A text chat message.
    MessageReceived {
        from: ExternalParticipantId,
        text: String,
    },
}
