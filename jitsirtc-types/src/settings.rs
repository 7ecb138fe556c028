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

//! Settings snapshot handed to the client by the host's configuration store.
//!
//! Field names follow the host's camelCase keys so a snapshot can be
//! deserialized straight from the store's JSON.

use serde::{Deserialize, Serialize};

use crate::ids::RoomName;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvSettings {
    pub world: WorldSettings,
    pub client: ClientSettings,
    pub module: ModuleSettings,
}

/// World-scoped settings, shared by every user of the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldSettings {
    pub mode: AvMode,
    pub server: ServerSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    #[serde(rename = "type")]
    pub kind: ServerKind,
    pub url: String,
    pub room: Option<RoomName>,
    pub username: String,
    pub password: String,
}

impl ServerSettings {
    /// The configured room, treating an empty name as unset.
    pub fn configured_room(&self) -> Option<&RoomName> {
        self.room.as_ref().filter(|room| !room.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    /// The public server bundled with the module.
    #[default]
    Fvtt,
    /// A self-hosted server with its own credentials.
    Custom,
}

/// Which media the host has A/V enabled for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AvMode {
    Disabled,
    Audio,
    Video,
    #[default]
    AudioVideo,
}

impl AvMode {
    pub fn audio_enabled(&self) -> bool {
        matches!(self, AvMode::Audio | AvMode::AudioVideo)
    }

    pub fn video_enabled(&self) -> bool {
        matches!(self, AvMode::Video | AvMode::AudioVideo)
    }
}

/// Per-client settings of the local user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    pub audio_src: Option<String>,
    pub video_src: Option<String>,
    pub audio_sink: String,
    pub voice: VoiceSettings,
    pub mute_all: bool,
    pub captions_enabled: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            audio_src: Some("default".to_string()),
            video_src: Some("default".to_string()),
            audio_sink: "default".to_string(),
            voice: VoiceSettings::default(),
            mute_all: false,
            captions_enabled: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    pub mode: VoiceMode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceMode {
    #[default]
    Always,
    Activity,
    Ptt,
}

/// Settings registered by the module itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleSettings {
    /// Accept participants that join the conference without a host account.
    pub allow_external_users: bool,
    /// Hand users a link to the full meeting web app instead of connecting.
    pub use_jitsi_meet: bool,
    /// Use the URLs below instead of the ones derived from the server name.
    pub custom_urls: bool,
    #[serde(flatten)]
    pub urls: CustomUrls,
    pub debug: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomUrls {
    pub domain_url: String,
    pub muc_url: String,
    pub focus_url: String,
    pub bosh_url: String,
    pub websocket_url: String,
}

impl CustomUrls {
    /// Default endpoint layout of a self-hosted server.
    pub fn for_server(server: &str) -> Self {
        Self {
            domain_url: server.to_string(),
            muc_url: format!("conference.{server}"),
            focus_url: format!("focus.{server}"),
            bosh_url: format!("//{server}/http-bind"),
            websocket_url: format!("wss://{server}/xmpp-websocket"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_host_snapshot() {
        let json = serde_json::json!({
            "world": {
                "mode": "audioVideo",
                "server": { "type": "custom", "url": "meet.example.org", "room": "tavern" }
            },
            "client": {
                "audioSrc": "mic1",
                "videoSrc": null,
                "voice": { "mode": "ptt" }
            },
            "module": { "allowExternalUsers": true, "domainUrl": "meet.example.org" }
        });
        let settings: AvSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.world.server.kind, ServerKind::Custom);
        assert_eq!(
            settings.world.server.configured_room(),
            Some(&RoomName::from("tavern"))
        );
        assert_eq!(settings.client.audio_src.as_deref(), Some("mic1"));
        assert_eq!(settings.client.video_src, None);
        assert_eq!(settings.client.audio_sink, "default");
        assert_eq!(settings.client.voice.mode, VoiceMode::Ptt);
        assert!(settings.module.allow_external_users);
        assert_eq!(settings.module.urls.domain_url, "meet.example.org");
    }

    #[test]
    fn empty_room_counts_as_unset() {
        let server = ServerSettings {
            room: Some(RoomName::from("")),
            ..Default::default()
        };
        assert!(server.configured_room().is_none());
    }

    #[test]
    fn custom_url_defaults_follow_server() {
        let urls = CustomUrls::for_server("meet.example.org");
        assert_eq!(urls.muc_url, "conference.meet.example.org");
        assert_eq!(urls.focus_url, "focus.meet.example.org");
        assert_eq!(urls.bosh_url, "//meet.example.org/http-bind");
        assert_eq!(urls.websocket_url, "wss://meet.example.org/xmpp-websocket");
    }

    #[test]
    fn av_mode_flags() {
        assert!(AvMode::AudioVideo.audio_enabled() && AvMode::AudioVideo.video_enabled());
        assert!(!AvMode::Audio.video_enabled());
        assert!(!AvMode::Disabled.audio_enabled());
    }
}
