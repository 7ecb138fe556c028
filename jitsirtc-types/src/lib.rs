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

//! Plain data shared between the jitsirtc client and its hosts.
//!
//! Nothing in here talks to the conferencing library or to the host
//! application; it only names things (participants, users, rooms, media kinds)
//! and describes the settings the host hands to the client.

pub mod callback;
pub mod diff;
pub mod ids;
pub mod settings;

pub use callback::Callback;
pub use diff::SettingsDiff;
pub use ids::{ExternalParticipantId, HostUserId, MediaKind, RecordId, RoomName};
pub use settings::{
    AvMode, AvSettings, ClientSettings, CustomUrls, ModuleSettings, ServerKind, ServerSettings,
    VoiceMode, VoiceSettings, WorldSettings,
};
