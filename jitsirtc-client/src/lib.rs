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

//! This crate adapts a Jitsi-style conferencing library to the A/V client
//! interface of a host application (a virtual tabletop). It owns the
//! connection lifecycle, reconciles conference participants with host users,
//! manages the local camera and microphone, and turns library events into
//! host UI updates.
//!
//! The crate makes no assumptions about the UI. The conferencing library is
//! reached through [`RtcLibrary`] and its companion traits, the host through
//! [`AvHost`]. A binding implements both once and drives a [`JitsiAvClient`].
//!
//! # Outline of usage
//!
//! For more detailed documentation see the doc for each struct.
//!
//! ## Client creation and connection:
//! ```ignore
//! let client = JitsiAvClient::new(library, host, ClientConfig::default());
//!
//! client.initialize().await;
//! client.connect().await;
//! ```
//!
//! ## Local media:
//! ```ignore
//! client.toggle_audio(true).await;
//! client.toggle_broadcast(false).await; // push-to-talk released
//! client.toggle_video(false).await;
//! ```
//!
//! ### Device query and listing:
//! ```ignore
//! let microphones = client.get_audio_sources().await;
//! let cameras = client.get_video_sources().await;
//! let speakers = client.get_audio_sinks().await;
//! ```
//!
//! ## Settings changes:
//! ```ignore
//! client.on_settings_changed(&SettingsDiff::from_value(&changed));
//! ```

mod client;
mod config;
mod connection;
mod constants;
mod debounce;
mod encode;
mod error;
mod event_bridge;
mod events;
mod host;
mod library;
mod logging;
mod media_devices;
mod registry;
mod utils;

pub use client::JitsiAvClient;
pub use config::{join_url, ClientConfig, ConnectionOptions, Hosts};
pub use connection::{SessionController, SessionHandle, SessionState, Subscription};
pub use debounce::Debouncer;
pub use encode::{DeviceSelection, LocalTrackSet, TrackSet};
pub use error::AvError;
pub use event_bridge::{BridgeContext, EventBridge};
pub use events::{ConferenceEvent, TransportEvent};
pub use host::{
    AvHost, BroadcastPolicy, HostNotifier, HostUser, Localizer, Notice, SettingsStore,
    UserDirectory,
};
pub use library::{
    Conference, Credentials, DeviceInfo, DeviceKind, MediaElement, MediaTrack, ParticipantRef,
    ReceiverConstraints, RemoteParticipant, RtcLibrary, TrackRef, TrackRequest, Transport,
};
pub use logging::{debug_enabled, set_debug};
pub use media_devices::{DeviceCatalog, DeviceMap};
pub use registry::{
    parse_display_name, JoinOutcome, MediaTracks, ParticipantRecord, ParticipantRegistry,
    RecordStore,
};
pub use utils::random_id;

pub use jitsirtc_types as types;
