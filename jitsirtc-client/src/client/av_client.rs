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

use std::sync::{Arc, Mutex};

use jitsirtc_types::{
    AvSettings, CustomUrls, HostUserId, MediaKind, RoomName, ServerKind, SettingsDiff, VoiceMode,
};
use log::{debug, error, info, warn};
use tokio::runtime::Handle;

use crate::config::{join_url, ClientConfig, ConnectionOptions};
use crate::connection::{SessionController, SessionState};
use crate::constants::{DEFAULT_SERVER, REQUESTING_TRANSCRIPTION_PROPERTY, ROOM_NAME_LENGTH};
use crate::encode::TrackSet;
use crate::error::AvError;
use crate::event_bridge::EventBridge;
use crate::host::{AvHost, HostNotifier, HostUser, SettingsStore, UserDirectory};
use crate::library::{MediaElement, RtcLibrary, TrackRef};
use crate::logging;
use crate::media_devices::{DeviceCatalog, DeviceMap};
use crate::registry::ParticipantRegistry;
use crate::utils::{lock, random_id};

#[derive(Debug, Default)]
struct ClientState {
    initialized: bool,
    server: String,
    /// Users join through the full meeting web app instead of this client.
    use_jitsi_meet: bool,
}

struct Inner {
    library: Arc<dyn RtcLibrary>,
    host: Arc<dyn AvHost>,
    local_user: HostUser,
    devices: DeviceCatalog,
    registry: Arc<Mutex<ParticipantRegistry>>,
    tracks: Arc<TrackSet>,
    bridge: Arc<EventBridge>,
    controller: SessionController,
    state: Mutex<ClientState>,
}

/// The A/V client a host application drives.
///
/// To use it, construct it with [new(library, host, config)][Self::new], call
/// [initialize()][Self::initialize] once, then [connect()][Self::connect].
/// From then on the client keeps the host's A/V UI in step with the
/// conference through the host traits, and reconnects on its own when the
/// connection is interrupted.
///
/// Cloning yields another handle on the same client.
#[derive(Clone)]
pub struct JitsiAvClient {
    inner: Arc<Inner>,
}

impl PartialEq for JitsiAvClient {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl JitsiAvClient {
    /// Wire up every component around `library` and `host`.
    pub fn new<H: AvHost + 'static>(
        library: Arc<dyn RtcLibrary>,
        host: Arc<H>,
        config: ClientConfig,
    ) -> Self {
        let local_user = host.local_user();
        let settings = host.settings();
        let registry = Arc::new(Mutex::new(ParticipantRegistry::new(
            host.clone(),
            settings.module.allow_external_users,
        )));
        let tracks = Arc::new(TrackSet::new(
            library.clone(),
            host.clone(),
            host.clone(),
            host.clone(),
            local_user.id.clone(),
            config.video_resolution,
        ));
        let bridge = Arc::new(EventBridge::new(
            registry.clone(),
            host.clone(),
            host.clone(),
            config.render_debounce,
            config.speaking_threshold,
            config.video_resolution,
        ));
        let controller = SessionController::new(
            library.clone(),
            host.clone(),
            registry.clone(),
            tracks.clone(),
            bridge.clone(),
            config,
        );
        let devices = DeviceCatalog::new(library.clone(), host.clone());

        Self {
            inner: Arc::new(Inner {
                library,
                host,
                local_user,
                devices,
                registry,
                tracks,
                bridge,
                controller,
                state: Mutex::new(ClientState::default()),
            }),
        }
    }

    fn settings(&self) -> AvSettings {
        self.inner.host.settings()
    }

    fn server_for(settings: &AvSettings) -> String {
        match settings.world.server.kind {
            ServerKind::Custom if !settings.world.server.url.is_empty() => {
                settings.world.server.url.clone()
            }
            _ => DEFAULT_SERVER.to_string(),
        }
    }

    /// Server picked at initialize, or the one the settings name now.
    fn server(&self) -> String {
        let server = lock(&self.inner.state).server.clone();
        if server.is_empty() {
            Self::server_for(&self.settings())
        } else {
            server
        }
    }

    fn uses_jitsi_meet(&self) -> bool {
        lock(&self.inner.state).use_jitsi_meet
    }

    //
    // Connection
    //

    /// Pick the server, derive the connection options and initialize the
    /// library. In meeting-link mode the library is left untouched.
    pub async fn initialize(&self) -> bool {
        debug!("JitsiAvClient initialize");
        let settings = self.settings();
        logging::set_debug(settings.module.debug);

        let server = Self::server_for(&settings);
        {
            let mut state = lock(&self.inner.state);
            state.server = server.clone();
            state.use_jitsi_meet = settings.module.use_jitsi_meet;
        }
        if settings.module.use_jitsi_meet {
            debug!("useJitsiMeet set, not initializing the library");
            lock(&self.inner.state).initialized = true;
            return true;
        }

        let options = ConnectionOptions::from_settings(&server, &settings.module);
        if settings.client.voice.mode == VoiceMode::Activity {
            debug!("Disabling voice activation mode as it is handled natively by the library");
            self.inner.host.set_voice_mode(VoiceMode::Always);
        }
        lock(&self.inner.registry).set_allow_external_users(settings.module.allow_external_users);

        if let Err(e) = self.inner.library.init(&options).await {
            error!("Library initialization failed: {e:?}");
            return false;
        }
        self.inner.library.set_debug_logging(settings.module.debug);
        self.inner.controller.configure(options);
        lock(&self.inner.state).initialized = true;
        info!("Initialized for server {server}");
        true
    }

    /// Connect to the conference. In meeting-link mode the user is offered a
    /// link to the web app instead.
    pub async fn connect(&self) -> bool {
        debug!("JitsiAvClient connect");
        let (initialized, use_jitsi_meet) = {
            let state = lock(&self.inner.state);
            (state.initialized, state.use_jitsi_meet)
        };
        if use_jitsi_meet {
            return match self.join_url() {
                Ok(url) => {
                    debug!("useJitsiMeet set, offering join link");
                    self.inner.host.offer_join_link(&url);
                    true
                }
                Err(e) => {
                    error!("Cannot build join link: {e}");
                    false
                }
            };
        }
        if !initialized {
            error!("connect called before initialize");
            return false;
        }
        self.inner.controller.connect().await
    }

    pub async fn disconnect(&self) -> bool {
        debug!("JitsiAvClient disconnect");
        self.inner.controller.disconnect().await
    }

    pub fn state(&self) -> SessionState {
        self.inner.controller.state()
    }

    /// Link to the current room in the full meeting web app, with the local
    /// user's identity in the display name.
    pub fn join_url(&self) -> Result<String, AvError> {
        let settings = self.settings();
        let room = self
            .inner
            .controller
            .breakout_room()
            .or_else(|| settings.world.server.configured_room().cloned())
            .ok_or_else(|| AvError::InvalidConfig("no meeting room configured".to_string()))?;
        let user = &self.inner.local_user;
        join_url(&self.server(), &room, &user.name, &user.id)
    }

    //
    // Device discovery
    //

    pub async fn get_audio_sinks(&self) -> DeviceMap {
        self.inner.devices.list_outputs().await
    }

    pub async fn get_audio_sources(&self) -> DeviceMap {
        self.inner.devices.list_inputs(MediaKind::Audio).await
    }

    pub async fn get_video_sources(&self) -> DeviceMap {
        self.inner.devices.list_inputs(MediaKind::Video).await
    }

    //
    // Track manipulation
    //

    /// Host users in the conference, the local user included.
    pub fn get_connected_users(&self) -> Vec<HostUserId> {
        lock(&self.inner.registry).connected_users()
    }

    pub fn is_audio_enabled(&self) -> bool {
        self.inner.tracks.is_audio_enabled()
    }

    pub fn is_video_enabled(&self) -> bool {
        self.inner.tracks.is_video_enabled()
    }

    pub async fn toggle_audio(&self, enable: bool) {
        if self.uses_jitsi_meet() {
            return;
        }
        let mode = self.settings().client.voice.mode;
        self.inner.tracks.toggle_audio(enable, mode).await;
    }

    /// Whether outbound audio is sent to peers right now. Push-to-talk and
    /// voice activation toggle this while audio stays enabled.
    pub async fn toggle_broadcast(&self, broadcast: bool) {
        if self.uses_jitsi_meet() {
            return;
        }
        self.inner.tracks.toggle_broadcast(broadcast).await;
    }

    pub async fn toggle_video(&self, enable: bool) {
        if self.uses_jitsi_meet() {
            return;
        }
        self.inner.tracks.toggle_video(enable).await;
    }

    /// Attach `user`'s video to `element`, and their audio to the audio
    /// element the host keeps next to it.
    pub async fn set_user_video(&self, user: &HostUserId, element: &MediaElement) {
        debug!("Setting video element {element:?} for user {user}");
        let Some(conference) = self.inner.controller.conference() else {
            warn!("Attempted to set user video with no active conference; skipping");
            return;
        };

        if *user == self.inner.local_user.id {
            if let Some(track) = self.inner.tracks.local(MediaKind::Video) {
                attach(&track, element).await;
            }
            return;
        }

        let Some((external_id, recorded)) = lock(&self.inner.registry)
            .resolve(user)
            .map(|record| (record.external_id.clone(), record.media.clone()))
        else {
            warn!("No conference participant for user {user}; skipping");
            return;
        };

        // Current tracks come from the conference; the record is a fallback.
        let participant = conference.participant(&external_id);
        let track_of = |kind: MediaKind| {
            participant
                .as_ref()
                .and_then(|p| p.tracks_by_media_type(kind).into_iter().next())
                .or_else(|| recorded.get(kind).cloned())
        };

        if let Some(video) = track_of(MediaKind::Video) {
            attach(&video, element).await;
        }

        let audio_element = self.inner.host.audio_element_for(user, element);
        if let (Some(audio), Some(audio_element)) = (track_of(MediaKind::Audio), audio_element) {
            let sink = self.settings().client.audio_sink;
            if self.inner.library.output_device_change_available() {
                if let Err(e) = audio.set_audio_output(&sink) {
                    warn!("Failed to set audio output {sink}: {e:?}");
                }
            } else if sink != "default" {
                warn!("Setting the audio output device is not available");
            }
            attach(&audio, &audio_element).await;
        }

        self.inner.host.video_set(user, element);
    }

    /// Replace the local video (and audio, when shared) with a screen capture.
    pub async fn share_desktop(&self) -> Result<bool, AvError> {
        let conference = self
            .inner
            .controller
            .conference()
            .ok_or(AvError::NotConnected)?;
        let shared = self.inner.tracks.acquire_desktop(conference.as_ref()).await;
        if shared {
            self.inner.bridge.request_render();
        }
        Ok(shared)
    }

    //
    // Settings and configuration
    //

    /// React to changed settings: device, voice mode or permission changes
    /// reconnect, `muteAll` mutes remote audio.
    pub fn on_settings_changed(&self, diff: &SettingsDiff) {
        debug!("onSettingsChanged: {:?}", diff.keys().collect::<Vec<_>>());
        let me = &self.inner.local_user.id;
        let can_video = format!("users.{me}.canBroadcastVideo");
        let can_audio = format!("users.{me}.canBroadcastAudio");

        if diff.touches_any(&[
            "client.videoSrc",
            "client.audioSrc",
            "client.voice.mode",
            "client.audioSink",
            can_video.as_str(),
            can_audio.as_str(),
        ]) {
            self.spawn_reconnect();
        }

        if diff.touches("client.muteAll") {
            self.mute_all();
        }

        let settings = self.settings();
        if diff.touches("module.allowExternalUsers") {
            lock(&self.inner.registry).set_allow_external_users(settings.module.allow_external_users);
        }
        if diff.touches("module.debug") {
            logging::set_debug(settings.module.debug);
            self.inner.library.set_debug_logging(settings.module.debug);
        }
    }

    fn spawn_reconnect(&self) {
        if self.uses_jitsi_meet() {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("No runtime to reconnect on after settings change");
            return;
        };
        let controller = self.inner.controller.clone();
        runtime.spawn(async move {
            if !controller.connect().await {
                warn!("Reconnect after settings change failed");
            }
        });
    }

    /// Apply the `muteAll` setting to every remote audio element.
    pub fn mute_all(&self) {
        let muted = self.settings().client.mute_all;
        debug!("Muting all users: {muted}");
        self.inner.host.set_remote_audio_muted(muted);
    }

    /// Move the local user into a breakout room, or back to the main room
    /// with `None`. Does nothing when already there.
    pub async fn breakout(&self, room: Option<RoomName>) -> bool {
        self.inner.controller.switch_room(room).await
    }

    /// Flip captions and tell the transcriber whether we want them. Returns
    /// the new state.
    pub fn toggle_captions(&self) -> Result<bool, AvError> {
        let conference = self
            .inner
            .controller
            .conference()
            .ok_or(AvError::NotConnected)?;
        let enabled = !self.settings().client.captions_enabled;
        debug!("Toggling captions to: {enabled}");
        self.inner.host.set_captions_enabled(enabled);
        conference.set_local_participant_property(
            REQUESTING_TRANSCRIPTION_PROPERTY,
            if enabled { "true" } else { "false" },
        );
        Ok(enabled)
    }

    /// Fill the custom URL settings with the defaults for the current server,
    /// or clear them.
    pub fn use_custom_urls(&self, enable: bool) {
        let urls = enable.then(|| CustomUrls::for_server(&self.server()));
        self.inner.host.set_custom_urls(urls);
    }

    /// Generate and persist a new random room name.
    pub fn reset_room(&self) -> RoomName {
        let room = RoomName::new(random_id(ROOM_NAME_LENGTH));
        info!("Resetting meeting room to {room}");
        self.inner.host.set_room(&room);
        room
    }

    pub fn is_guest(&self, user: &HostUserId) -> bool {
        lock(&self.inner.registry).is_guest(user)
    }
}

async fn attach(track: &TrackRef, element: &MediaElement) {
    if let Err(e) = track.attach(element).await {
        warn!("Failed to attach {} track: {e:?}", track.kind());
    }
}
