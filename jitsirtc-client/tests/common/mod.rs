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

//! In-memory stand-ins for the conferencing library and the host, shared by
//! the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_broadcast::{InactiveReceiver, Receiver, Sender};
use async_trait::async_trait;
use jitsirtc_client::types::{
    AvSettings, CustomUrls, ExternalParticipantId, HostUserId, MediaKind, RoomName, VoiceMode,
};
use jitsirtc_client::{
    BroadcastPolicy, ClientConfig, Conference, ConferenceEvent, ConnectionOptions, Credentials,
    DeviceInfo, HostNotifier, HostUser, Localizer, MediaElement, MediaTrack, Notice,
    ParticipantRef, ReceiverConstraints, RemoteParticipant, RtcLibrary, SettingsStore, TrackRef,
    TrackRequest, Transport, TransportEvent, UserDirectory,
};

pub const LOCAL_USER: &str = "local-user";
pub const ROOM: &str = "tavern";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ext(id: &str) -> ExternalParticipantId {
    ExternalParticipantId::from(id)
}

pub fn user(id: &str) -> HostUserId {
    HostUserId::from(id)
}

/// Short timeouts and debounce so paused-time tests finish quickly.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        connect_timeout: Duration::from_secs(5),
        render_debounce: Duration::from_millis(20),
        ..ClientConfig::default()
    }
}

/// Let spawned tasks and pending timers run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn channel<T: Clone>() -> (Sender<T>, InactiveReceiver<T>) {
    let (mut tx, rx) = async_broadcast::broadcast(64);
    tx.set_overflow(true);
    (tx, rx.deactivate())
}

//
// Tracks and participants
//

#[derive(Debug)]
pub struct MockTrack {
    kind: MediaKind,
    local: bool,
    owner: Option<ExternalParticipantId>,
    muted: AtomicBool,
    disposed: AtomicBool,
    pub attached: Mutex<Vec<MediaElement>>,
    pub audio_output: Mutex<Option<String>>,
}

impl MockTrack {
    fn build(kind: MediaKind, local: bool, owner: Option<ExternalParticipantId>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            local,
            owner,
            muted: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            attached: Mutex::new(Vec::new()),
            audio_output: Mutex::new(None),
        })
    }

    pub fn local(kind: MediaKind) -> Arc<Self> {
        Self::build(kind, true, None)
    }

    pub fn remote(kind: MediaKind, owner: &str) -> Arc<Self> {
        Self::build(kind, false, Some(ext(owner)))
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn attached_to(&self) -> Vec<MediaElement> {
        self.attached.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTrack for MockTrack {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn participant_id(&self) -> Option<ExternalParticipantId> {
        self.owner.clone()
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    async fn mute(&self) -> Result<()> {
        self.muted.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unmute(&self) -> Result<()> {
        self.muted.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn attach(&self, element: &MediaElement) -> Result<()> {
        self.attached.lock().unwrap().push(element.clone());
        Ok(())
    }

    fn set_audio_output(&self, device_id: &str) -> Result<()> {
        *self.audio_output.lock().unwrap() = Some(device_id.to_string());
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockParticipant {
    pub id: ExternalParticipantId,
    pub display_name: Option<String>,
    pub properties: HashMap<String, String>,
    pub hidden: bool,
    pub tracks: Mutex<Vec<TrackRef>>,
}

impl MockParticipant {
    fn build(id: &str, display_name: &str, properties: HashMap<String, String>, hidden: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ext(id),
            display_name: Some(display_name.to_string()),
            properties,
            hidden,
            tracks: Mutex::new(Vec::new()),
        })
    }

    /// A participant whose display name carries a host user id.
    pub fn named(id: &str, display_name: &str) -> Arc<Self> {
        Self::build(id, display_name, HashMap::new(), false)
    }

    /// A participant announcing its host user id as a property.
    pub fn declaring(id: &str, display_name: &str, host_user_id: &str) -> Arc<Self> {
        let properties = HashMap::from([("fvttUserId".to_string(), host_user_id.to_string())]);
        Self::build(id, display_name, properties, false)
    }

    pub fn hidden(id: &str) -> Arc<Self> {
        Self::build(id, "recorder", HashMap::new(), true)
    }

    pub fn add_track(&self, track: TrackRef) {
        self.tracks.lock().unwrap().push(track);
    }
}

impl RemoteParticipant for MockParticipant {
    fn id(&self) -> ExternalParticipantId {
        self.id.clone()
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }

    fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn tracks_by_media_type(&self, kind: MediaKind) -> Vec<TrackRef> {
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .filter(|track| track.kind() == kind)
            .cloned()
            .collect()
    }
}

//
// Conference
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinBehavior {
    Join,
    Fail,
    Hang,
    /// The connection drops during the first join; later joins succeed.
    InterruptOnce,
}

pub struct MockConference {
    events: Sender<ConferenceEvent>,
    _keep_open: InactiveReceiver<ConferenceEvent>,
    local_id: ExternalParticipantId,
    pub behavior: Mutex<JoinBehavior>,
    /// Announced on the next join, ahead of our own join.
    pub occupants: Mutex<Vec<Arc<MockParticipant>>>,
    pub participants: Mutex<HashMap<ExternalParticipantId, ParticipantRef>>,
    pub added: Mutex<Vec<TrackRef>>,
    pub kicked: Mutex<Vec<ExternalParticipantId>>,
    pub properties: Mutex<HashMap<String, String>>,
    pub display_name: Mutex<Option<String>>,
    pub selected: Mutex<Vec<ExternalParticipantId>>,
    pub constraints: Mutex<Option<ReceiverConstraints>>,
    pub joins: AtomicU32,
    pub leaves: AtomicU32,
}

impl MockConference {
    pub fn new() -> Arc<Self> {
        let (events, keep_open) = channel();
        Arc::new(Self {
            events,
            _keep_open: keep_open,
            local_id: ext("local-ep"),
            behavior: Mutex::new(JoinBehavior::Join),
            occupants: Mutex::new(Vec::new()),
            participants: Mutex::new(HashMap::new()),
            added: Mutex::new(Vec::new()),
            kicked: Mutex::new(Vec::new()),
            properties: Mutex::new(HashMap::new()),
            display_name: Mutex::new(None),
            selected: Mutex::new(Vec::new()),
            constraints: Mutex::new(None),
            joins: AtomicU32::new(0),
            leaves: AtomicU32::new(0),
        })
    }

    pub fn emit(&self, event: ConferenceEvent) {
        let _ = self.events.try_broadcast(event);
    }

    /// Register `participant` and announce it, as the library does on join.
    pub fn add_participant(&self, participant: Arc<MockParticipant>) {
        let participant: ParticipantRef = participant;
        self.participants
            .lock()
            .unwrap()
            .insert(participant.id(), participant.clone());
        self.emit(ConferenceEvent::ParticipantJoined(participant));
    }

    /// Seat `participant` in the room before we join it.
    pub fn seat(&self, participant: Arc<MockParticipant>) {
        self.occupants.lock().unwrap().push(participant);
    }

    pub fn remove_participant(&self, id: &str) {
        self.participants.lock().unwrap().remove(&ext(id));
        self.emit(ConferenceEvent::ParticipantLeft(ext(id)));
    }

    pub fn kicked(&self) -> Vec<ExternalParticipantId> {
        self.kicked.lock().unwrap().clone()
    }

    pub fn added_count(&self) -> usize {
        self.added.lock().unwrap().len()
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl Conference for MockConference {
    fn events(&self) -> Receiver<ConferenceEvent> {
        self.events.new_receiver()
    }

    fn join(&self) {
        self.joins.fetch_add(1, Ordering::SeqCst);
        let occupants: Vec<_> = self.occupants.lock().unwrap().drain(..).collect();
        for occupant in occupants {
            self.add_participant(occupant);
        }
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            JoinBehavior::Join => self.emit(ConferenceEvent::Joined),
            JoinBehavior::Fail => self.emit(ConferenceEvent::Error(
                "conference.authenticationRequired".to_string(),
            )),
            JoinBehavior::Hang => {}
            JoinBehavior::InterruptOnce => {
                *self.behavior.lock().unwrap() = JoinBehavior::Join;
                self.emit(ConferenceEvent::ConnectionInterrupted);
            }
        }
    }

    async fn leave(&self) -> Result<()> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn my_user_id(&self) -> ExternalParticipantId {
        self.local_id.clone()
    }

    async fn add_track(&self, track: TrackRef) -> Result<()> {
        self.added.lock().unwrap().push(track);
        Ok(())
    }

    fn local_tracks(&self) -> Vec<TrackRef> {
        self.added.lock().unwrap().clone()
    }

    fn set_display_name(&self, name: &str) {
        *self.display_name.lock().unwrap() = Some(name.to_string());
    }

    fn set_local_participant_property(&self, key: &str, value: &str) {
        self.properties
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn participant(&self, id: &ExternalParticipantId) -> Option<ParticipantRef> {
        self.participants.lock().unwrap().get(id).cloned()
    }

    fn kick_participant(&self, id: &ExternalParticipantId) {
        self.kicked.lock().unwrap().push(id.clone());
    }

    fn select_participants(&self, ids: &[ExternalParticipantId]) {
        *self.selected.lock().unwrap() = ids.to_vec();
    }

    fn set_receiver_constraints(&self, constraints: &ReceiverConstraints) -> Result<()> {
        *self.constraints.lock().unwrap() = Some(constraints.clone());
        Ok(())
    }
}

//
// Transport
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportBehavior {
    Establish,
    Fail,
    Hang,
    /// Drops during the first handshake; later transports establish.
    DropOnce,
}

pub struct MockTransport {
    events: Sender<TransportEvent>,
    _keep_open: InactiveReceiver<TransportEvent>,
    behavior: TransportBehavior,
    conference: Arc<MockConference>,
    pub options: ConnectionOptions,
    pub credentials: Mutex<Option<Credentials>>,
    pub rooms: Mutex<Vec<RoomName>>,
    pub disconnects: AtomicU32,
}

impl MockTransport {
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.try_broadcast(event);
    }

    pub fn disconnected(&self) -> bool {
        self.disconnects.load(Ordering::SeqCst) > 0
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn events(&self) -> Receiver<TransportEvent> {
        self.events.new_receiver()
    }

    async fn connect(&self, credentials: Option<Credentials>) {
        *self.credentials.lock().unwrap() = credentials;
        match self.behavior {
            TransportBehavior::Establish => self.emit(TransportEvent::Established),
            TransportBehavior::Fail => self.emit(TransportEvent::Failed {
                code: "connection.passwordRequired".to_string(),
                message: None,
            }),
            TransportBehavior::Hang => {}
            TransportBehavior::DropOnce => {
                self.emit(TransportEvent::Disconnected(Some("network".to_string())))
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn init_conference(&self, room: &RoomName, _options: &ConnectionOptions) -> Arc<dyn Conference> {
        self.rooms.lock().unwrap().push(room.clone());
        self.conference.clone()
    }
}

//
// Library
//

pub struct MockLibrary {
    pub conference: Arc<MockConference>,
    pub transport_behavior: Mutex<TransportBehavior>,
    pub transports: Mutex<Vec<Arc<MockTransport>>>,
    pub init_error: Mutex<Option<String>>,
    pub inits: AtomicU32,
    pub debug_logging: AtomicBool,
    pub devices: Mutex<Result<Vec<DeviceInfo>, String>>,
    /// Kinds whose capture fails, as with a camera held by another program.
    pub unavailable: Mutex<HashSet<MediaKind>>,
    /// Delay applied to successive capture calls, first in first out.
    pub capture_delays: Mutex<VecDeque<Duration>>,
    pub capture_requests: Mutex<Vec<TrackRequest>>,
    pub created: Mutex<Vec<Arc<MockTrack>>>,
    pub output_change: AtomicBool,
}

impl MockLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            conference: MockConference::new(),
            transport_behavior: Mutex::new(TransportBehavior::Establish),
            transports: Mutex::new(Vec::new()),
            init_error: Mutex::new(None),
            inits: AtomicU32::new(0),
            debug_logging: AtomicBool::new(false),
            devices: Mutex::new(Ok(Vec::new())),
            unavailable: Mutex::new(HashSet::new()),
            capture_delays: Mutex::new(VecDeque::new()),
            capture_requests: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            output_change: AtomicBool::new(true),
        })
    }

    pub fn set_transport_behavior(&self, behavior: TransportBehavior) {
        *self.transport_behavior.lock().unwrap() = behavior;
    }

    pub fn make_unavailable(&self, kind: MediaKind) {
        self.unavailable.lock().unwrap().insert(kind);
    }

    pub fn delay_next_capture(&self, delay: Duration) {
        self.capture_delays.lock().unwrap().push_back(delay);
    }

    pub fn transport_count(&self) -> usize {
        self.transports.lock().unwrap().len()
    }

    pub fn last_transport(&self) -> Option<Arc<MockTransport>> {
        self.transports.lock().unwrap().last().cloned()
    }

    pub fn created_tracks(&self) -> Vec<Arc<MockTrack>> {
        self.created.lock().unwrap().clone()
    }

    pub fn capture_requests(&self) -> Vec<TrackRequest> {
        self.capture_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RtcLibrary for MockLibrary {
    async fn init(&self, _options: &ConnectionOptions) -> Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        let error = self.init_error.lock().unwrap().clone();
        match error {
            Some(e) => Err(anyhow!(e)),
            None => Ok(()),
        }
    }

    fn set_debug_logging(&self, enabled: bool) {
        self.debug_logging.store(enabled, Ordering::SeqCst);
    }

    fn create_connection(&self, options: &ConnectionOptions) -> Arc<dyn Transport> {
        let (events, keep_open) = channel();
        let behavior = {
            let mut current = self.transport_behavior.lock().unwrap();
            let behavior = *current;
            if behavior == TransportBehavior::DropOnce {
                *current = TransportBehavior::Establish;
            }
            behavior
        };
        let transport = Arc::new(MockTransport {
            events,
            _keep_open: keep_open,
            behavior,
            conference: self.conference.clone(),
            options: options.clone(),
            credentials: Mutex::new(None),
            rooms: Mutex::new(Vec::new()),
            disconnects: AtomicU32::new(0),
        });
        self.transports.lock().unwrap().push(transport.clone());
        transport
    }

    async fn create_local_tracks(&self, request: &TrackRequest) -> Result<Vec<TrackRef>> {
        self.capture_requests.lock().unwrap().push(request.clone());
        let delay = self.capture_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let kinds = request.kinds();
        let busy = {
            let unavailable = self.unavailable.lock().unwrap();
            kinds.iter().any(|kind| unavailable.contains(kind))
        };
        if busy {
            bail!("NotReadableError: could not start source");
        }
        let tracks: Vec<Arc<MockTrack>> = kinds.into_iter().map(MockTrack::local).collect();
        self.created.lock().unwrap().extend(tracks.iter().cloned());
        Ok(tracks.into_iter().map(|track| track as TrackRef).collect())
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>> {
        let devices = self.devices.lock().unwrap().clone();
        devices.map_err(|e| anyhow!(e))
    }

    fn output_device_change_available(&self) -> bool {
        self.output_change.load(Ordering::SeqCst)
    }
}

//
// Host
//

pub struct MockHost {
    local: HostUser,
    pub users: Mutex<HashMap<HostUserId, HostUser>>,
    pub settings: Mutex<AvSettings>,
    pub denied_broadcast: Mutex<HashSet<MediaKind>>,
    pub denied_share: Mutex<HashSet<MediaKind>>,
    pub renders: AtomicU32,
    pub notices: Mutex<Vec<(Notice, String)>>,
    pub errors: Mutex<Vec<String>>,
    pub speaking: Mutex<Vec<(HostUserId, bool)>>,
    pub captions: Mutex<Vec<(String, HostUserId, String)>>,
    pub remote_audio_muted: Mutex<Option<bool>>,
    pub join_links: Mutex<Vec<String>>,
    pub videos_set: Mutex<Vec<(HostUserId, MediaElement)>>,
    pub breakout_rooms: Mutex<HashMap<HostUserId, RoomName>>,
    pub external_users_url: Mutex<Option<String>>,
    pub custom_urls: Mutex<Option<CustomUrls>>,
}

impl MockHost {
    /// A host with the local user plus Alice and Bob, configured for room
    /// [ROOM] on the default server.
    pub fn new() -> Arc<Self> {
        let local = HostUser {
            id: user(LOCAL_USER),
            name: "Gamemaster".to_string(),
            active: true,
            temporary: false,
        };
        let mut users = HashMap::new();
        users.insert(local.id.clone(), local.clone());
        for (id, name) in [("user-alice", "Alice"), ("user-bob", "Bob")] {
            users.insert(
                user(id),
                HostUser {
                    id: user(id),
                    name: name.to_string(),
                    active: false,
                    temporary: false,
                },
            );
        }
        let mut settings = AvSettings::default();
        settings.world.server.room = Some(RoomName::from(ROOM));

        Arc::new(Self {
            local,
            users: Mutex::new(users),
            settings: Mutex::new(settings),
            denied_broadcast: Mutex::new(HashSet::new()),
            denied_share: Mutex::new(HashSet::new()),
            renders: AtomicU32::new(0),
            notices: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            speaking: Mutex::new(Vec::new()),
            captions: Mutex::new(Vec::new()),
            remote_audio_muted: Mutex::new(None),
            join_links: Mutex::new(Vec::new()),
            videos_set: Mutex::new(Vec::new()),
            breakout_rooms: Mutex::new(HashMap::new()),
            external_users_url: Mutex::new(None),
            custom_urls: Mutex::new(None),
        })
    }

    pub fn update_settings(&self, f: impl FnOnce(&mut AvSettings)) {
        f(&mut self.settings.lock().unwrap());
    }

    pub fn render_count(&self) -> u32 {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }

    pub fn has_user(&self, id: &HostUserId) -> bool {
        self.users.lock().unwrap().contains_key(id)
    }

    pub fn temporary_users(&self) -> Vec<HostUser> {
        self.users
            .lock()
            .unwrap()
            .values()
            .filter(|user| user.temporary)
            .cloned()
            .collect()
    }
}

impl UserDirectory for MockHost {
    fn user(&self, id: &HostUserId) -> Option<HostUser> {
        self.users.lock().unwrap().get(id).cloned()
    }

    fn insert_temporary_user(&self, user: HostUser) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    fn remove_user(&self, id: &HostUserId) {
        self.users.lock().unwrap().remove(id);
    }

    fn set_user_active(&self, id: &HostUserId, active: bool) {
        if let Some(user) = self.users.lock().unwrap().get_mut(id) {
            user.active = active;
        }
    }

    fn local_user(&self) -> HostUser {
        self.local.clone()
    }
}

impl BroadcastPolicy for MockHost {
    fn can_broadcast(&self, _user: &HostUserId, kind: MediaKind) -> bool {
        !self.denied_broadcast.lock().unwrap().contains(&kind)
    }

    fn can_share(&self, _user: &HostUserId, kind: MediaKind) -> bool {
        !self.denied_share.lock().unwrap().contains(&kind)
    }
}

impl HostNotifier for MockHost {
    fn render(&self) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn set_user_speaking(&self, user: &HostUserId, speaking: bool) {
        self.speaking.lock().unwrap().push((user.clone(), speaking));
    }

    fn notify(&self, notice: Notice, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((notice, message.to_string()));
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn caption(&self, message_id: &str, user: &HostUserId, text: &str) {
        self.captions
            .lock()
            .unwrap()
            .push((message_id.to_string(), user.clone(), text.to_string()));
    }

    fn set_remote_audio_muted(&self, muted: bool) {
        *self.remote_audio_muted.lock().unwrap() = Some(muted);
    }

    fn offer_join_link(&self, url: &str) {
        self.join_links.lock().unwrap().push(url.to_string());
    }

    fn audio_element_for(&self, _user: &HostUserId, video: &MediaElement) -> Option<MediaElement> {
        Some(MediaElement(format!("{}-audio", video.0)))
    }

    fn video_set(&self, user: &HostUserId, element: &MediaElement) {
        self.videos_set
            .lock()
            .unwrap()
            .push((user.clone(), element.clone()));
    }
}

impl SettingsStore for MockHost {
    fn settings(&self) -> AvSettings {
        self.settings.lock().unwrap().clone()
    }

    fn set_room(&self, room: &RoomName) {
        self.settings.lock().unwrap().world.server.room = Some(room.clone());
    }

    fn set_voice_mode(&self, mode: VoiceMode) {
        self.settings.lock().unwrap().client.voice.mode = mode;
    }

    fn user_breakout_room(&self, user: &HostUserId) -> Option<RoomName> {
        self.breakout_rooms.lock().unwrap().get(user).cloned()
    }

    fn set_user_breakout_room(&self, user: &HostUserId, room: Option<&RoomName>) {
        let mut rooms = self.breakout_rooms.lock().unwrap();
        match room {
            Some(room) => {
                rooms.insert(user.clone(), room.clone());
            }
            None => {
                rooms.remove(user);
            }
        }
    }

    fn set_external_users_url(&self, url: &str) {
        *self.external_users_url.lock().unwrap() = Some(url.to_string());
    }

    fn set_captions_enabled(&self, enabled: bool) {
        self.settings.lock().unwrap().client.captions_enabled = enabled;
    }

    fn set_custom_urls(&self, urls: Option<CustomUrls>) {
        *self.custom_urls.lock().unwrap() = urls;
    }
}

impl Localizer for MockHost {}
