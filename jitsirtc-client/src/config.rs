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

//! Connection options handed to the library, and the client's own tunables.

use std::time::Duration;

use jitsirtc_types::{CustomUrls, HostUserId, ModuleSettings, RoomName};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    AUDIO_LEVELS_INTERVAL_MS, CONNECT_TIMEOUT_MS, MODULE_NAME, RENDER_DEBOUNCE_MS,
    SPEAKING_THRESHOLD, VIDEO_RESOLUTION,
};
use crate::error::AvError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hosts {
    pub domain: String,
    pub muc: String,
    pub focus: String,
}

/// Options passed to the library when connecting and joining a conference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionOptions {
    pub hosts: Hosts,
    pub bosh: String,
    pub websocket: String,
    #[serde(rename = "enableP2P")]
    pub enable_p2p: bool,
    pub enable_no_audio_detection: bool,
    pub enable_noisy_mic_detection: bool,
    pub disable_audio_levels: bool,
    pub audio_levels_interval: u32,
    pub channel_last_n: i32,
    pub adaptive_last_n: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_audio_muted: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_video_muted: Option<u32>,
    pub application_name: String,
    pub resolution: u32,
}

impl ConnectionOptions {
    /// Options for the standard endpoint layout of `server`.
    pub fn for_server(server: &str) -> Self {
        Self::from_urls(&CustomUrls::for_server(server))
    }

    fn from_urls(urls: &CustomUrls) -> Self {
        Self {
            hosts: Hosts {
                domain: urls.domain_url.clone(),
                muc: urls.muc_url.clone(),
                focus: urls.focus_url.clone(),
            },
            bosh: urls.bosh_url.clone(),
            websocket: urls.websocket_url.clone(),
            enable_p2p: false,
            enable_no_audio_detection: false,
            enable_noisy_mic_detection: false,
            disable_audio_levels: false,
            audio_levels_interval: AUDIO_LEVELS_INTERVAL_MS,
            channel_last_n: -1,
            adaptive_last_n: false,
            start_audio_muted: None,
            start_video_muted: None,
            application_name: format!("{MODULE_NAME}-{}", env!("CARGO_PKG_VERSION")),
            resolution: VIDEO_RESOLUTION,
        }
    }

    /// Options for `server`, overridden by the module's custom URLs when
    /// those are enabled.
    pub fn from_settings(server: &str, module: &ModuleSettings) -> Self {
        if module.custom_urls {
            Self::from_urls(&module.urls)
        } else {
            Self::for_server(server)
        }
    }

    /// Copy of these options with the room pinned on the BOSH and websocket
    /// URLs, so every participant lands on the same shard.
    pub fn with_room(&self, room: &RoomName) -> Result<Self, AvError> {
        let mut options = self.clone();
        options.bosh = append_room(&self.bosh, room)?;
        options.websocket = append_room(&self.websocket, room)?;
        Ok(options)
    }

    /// Link to the room in the full meeting web app.
    pub fn meeting_url(&self, room: &RoomName) -> String {
        format!("https://{}/{}", self.hosts.domain, room)
    }
}

fn append_room(endpoint: &str, room: &RoomName) -> Result<String, AvError> {
    if endpoint.is_empty() {
        return Ok(String::new());
    }
    // Protocol-relative endpoints are resolved against https and stripped again.
    let relative = endpoint.starts_with("//");
    let mut url = if relative {
        Url::parse(&format!("https:{endpoint}"))?
    } else {
        Url::parse(endpoint)?
    };
    url.query_pairs_mut().append_pair("room", room.as_str());
    let url = url.to_string();
    Ok(match url.strip_prefix("https:") {
        Some(rest) if relative => rest.to_string(),
        _ => url,
    })
}

/// Join link for the full meeting web app, with the display name carrying the
/// host user id so the participant is reconciled on join.
pub fn join_url(
    server: &str,
    room: &RoomName,
    user_name: &str,
    user_id: &HostUserId,
) -> Result<String, AvError> {
    let mut url = Url::parse(&format!("https://{server}/"))?.join(room.as_str())?;
    url.set_fragment(Some(&format!(
        "userInfo.displayName=\"{user_name} ({user_id})\"&config.prejoinPageEnabled=false"
    )));
    Ok(url.to_string())
}

/// Tunables of the client itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Upper bound on transport and conference establishment.
    pub connect_timeout: Duration,
    /// Quiet period of the trailing-edge render debounce.
    pub render_debounce: Duration,
    /// Audio level above which a participant counts as speaking.
    pub speaking_threshold: f64,
    pub video_resolution: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT_MS),
            render_debounce: Duration::from_millis(RENDER_DEBOUNCE_MS),
            speaking_threshold: SPEAKING_THRESHOLD,
            video_resolution: VIDEO_RESOLUTION,
        }
    }
}
