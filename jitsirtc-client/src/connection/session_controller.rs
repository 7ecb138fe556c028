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

//! Lifecycle of the transport connection and the conference built on it.
//!
//! Every [`SessionController::connect`] starts a new generation. Each await in
//! the connect sequence is followed by a generation check, so a connect that
//! was overtaken by a later `connect()` or `disconnect()` drops out and
//! disposes whatever it acquired instead of installing it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use anyhow::anyhow;
use async_broadcast::{Receiver, RecvError};
use jitsirtc_types::{AvSettings, Callback, ExternalParticipantId, RoomName, ServerKind};
use log::{debug, error, info, warn};

use super::subscription::Subscription;
use crate::config::{ClientConfig, ConnectionOptions};
use crate::constants::{HOST_USER_ID_PROPERTY, REQUESTING_TRANSCRIPTION_PROPERTY, ROOM_NAME_LENGTH};
use crate::encode::{DeviceSelection, TrackSet};
use crate::error::AvError;
use crate::event_bridge::{BridgeContext, EventBridge};
use crate::events::{ConferenceEvent, TransportEvent};
use crate::host::{AvHost, HostNotifier, Localizer, Notice, SettingsStore, UserDirectory};
use crate::library::{Conference, Credentials, RtcLibrary, Transport};
use crate::registry::ParticipantRegistry;
use crate::utils::{lock, random_id};

/// A joined conference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHandle {
    pub room: RoomName,
    pub local_id: ExternalParticipantId,
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(SessionHandle),
    Reconnecting,
}

enum ConnectFailure {
    /// A later connect or disconnect took over.
    Superseded,
    /// The library dropped the connection before the join completed.
    Interrupted,
    Failed(AvError),
}

impl From<AvError> for ConnectFailure {
    fn from(e: AvError) -> Self {
        ConnectFailure::Failed(e)
    }
}

struct ControllerInner {
    state: SessionState,
    generation: u64,
    options: Option<ConnectionOptions>,
    transport: Option<Arc<dyn Transport>>,
    conference: Option<Arc<dyn Conference>>,
    subscription: Option<Subscription>,
    room: Option<RoomName>,
    breakout_room: Option<RoomName>,
}

struct Shared {
    inner: Mutex<ControllerInner>,
    active: Arc<AtomicBool>,
    library: Arc<dyn RtcLibrary>,
    host: Arc<dyn AvHost>,
    registry: Arc<Mutex<ParticipantRegistry>>,
    tracks: Arc<TrackSet>,
    bridge: Arc<EventBridge>,
    config: ClientConfig,
}

/// Owns the [SessionState]; no other component transitions it.
///
/// Cloning yields another handle on the same controller.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(
        library: Arc<dyn RtcLibrary>,
        host: Arc<dyn AvHost>,
        registry: Arc<Mutex<ParticipantRegistry>>,
        tracks: Arc<TrackSet>,
        bridge: Arc<EventBridge>,
        config: ClientConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(ControllerInner {
                    state: SessionState::Disconnected,
                    generation: 0,
                    options: None,
                    transport: None,
                    conference: None,
                    subscription: None,
                    room: None,
                    breakout_room: None,
                }),
                active: Arc::new(AtomicBool::new(false)),
                library,
                host,
                registry,
                tracks,
                bridge,
                config,
            }),
        }
    }

    /// Set the options used by every following connect.
    pub fn configure(&self, options: ConnectionOptions) {
        lock(&self.shared.inner).options = Some(options);
    }

    pub fn state(&self) -> SessionState {
        lock(&self.shared.inner).state.clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        lock(&self.shared.inner).generation
    }

    pub fn conference(&self) -> Option<Arc<dyn Conference>> {
        lock(&self.shared.inner).conference.clone()
    }

    /// Room of the current or last connection.
    pub fn room(&self) -> Option<RoomName> {
        lock(&self.shared.inner).room.clone()
    }

    pub fn breakout_room(&self) -> Option<RoomName> {
        lock(&self.shared.inner).breakout_room.clone()
    }

    /// Tear down whatever is left, then connect, join and publish local
    /// tracks. Returns false when the transport or the conference could not
    /// be established, or when a later call took over.
    pub async fn connect(&self) -> bool {
        self.disconnect().await;

        let generation = {
            let mut inner = lock(&self.shared.inner);
            inner.generation += 1;
            inner.state = SessionState::Connecting;
            inner.generation
        };
        self.shared.active.store(true, Ordering::SeqCst);
        debug!("Starting connect attempt {generation}");

        match self.try_connect(generation).await {
            Ok(()) => true,
            Err(ConnectFailure::Superseded) => {
                debug!("Connect attempt {generation} was superseded");
                false
            }
            Err(ConnectFailure::Interrupted) => {
                if self.is_active() {
                    warn!("Connect attempt {generation} interrupted; reconnecting");
                    self.reconnect_callback(generation).emit(());
                } else {
                    debug!("Connect attempt {generation} interrupted after disconnect");
                }
                false
            }
            Err(ConnectFailure::Failed(e)) => {
                error!("Login error: {e}");
                let message = self.shared.host.localize(Notice::LoginError.i18n_key());
                self.shared.host.notify(Notice::LoginError, &message);
                self.abandon(generation).await;
                false
            }
        }
    }

    /// Leave the conference, close the transport and release local tracks.
    /// Safe in any state. Returns whether anything was torn down.
    pub async fn disconnect(&self) -> bool {
        self.shared.active.store(false, Ordering::SeqCst);
        let (subscription, conference, transport) = {
            let mut inner = lock(&self.shared.inner);
            inner.generation += 1;
            inner.state = SessionState::Disconnected;
            (
                inner.subscription.take(),
                inner.conference.take(),
                inner.transport.take(),
            )
        };
        self.teardown(subscription, conference, transport).await
    }

    /// Switch to a breakout room, or back to the main room with `None`, and
    /// reconnect. Switching to the room already in use does nothing and
    /// returns false.
    pub async fn switch_room(&self, room: Option<RoomName>) -> bool {
        {
            let mut inner = lock(&self.shared.inner);
            if inner.breakout_room == room {
                debug!("Already in breakout room {room:?}");
                return false;
            }
            debug!("Switching to breakout room: {room:?}");
            inner.breakout_room = room;
        }
        self.connect().await
    }

    async fn teardown(
        &self,
        subscription: Option<Subscription>,
        conference: Option<Arc<dyn Conference>>,
        transport: Option<Arc<dyn Transport>>,
    ) -> bool {
        let mut torn_down = false;
        if let Some(mut subscription) = subscription {
            torn_down |= subscription.unsubscribe();
        }
        self.shared.bridge.cancel_render();
        if !self.shared.tracks.local_tracks().is_empty() {
            self.shared.tracks.release(None).await;
            torn_down = true;
        }
        if let Some(conference) = conference {
            if let Err(e) = conference.leave().await {
                debug!("Error leaving conference: {e:?}");
            }
            torn_down = true;
        }
        if let Some(transport) = transport {
            if let Err(e) = transport.disconnect().await {
                debug!("Error closing transport: {e:?}");
            }
            torn_down = true;
        }
        {
            let mut registry = lock(&self.shared.registry);
            if !registry.is_empty() {
                registry.clear();
                torn_down = true;
            }
        }
        if torn_down {
            info!("Disconnected");
        }
        torn_down
    }

    /// Undo a failed connect, unless a later call already took over.
    async fn abandon(&self, generation: u64) {
        let taken = {
            let mut inner = lock(&self.shared.inner);
            if inner.generation != generation {
                return;
            }
            inner.state = SessionState::Disconnected;
            (
                inner.subscription.take(),
                inner.conference.take(),
                inner.transport.take(),
            )
        };
        self.shared.active.store(false, Ordering::SeqCst);
        let (subscription, conference, transport) = taken;
        self.teardown(subscription, conference, transport).await;
    }

    /// Run `f` on the inner state if `generation` is still current.
    fn with_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut ControllerInner) -> R,
    ) -> Result<R, ConnectFailure> {
        let mut inner = lock(&self.shared.inner);
        if inner.generation != generation {
            return Err(ConnectFailure::Superseded);
        }
        Ok(f(&mut inner))
    }

    fn check(&self, generation: u64) -> Result<(), ConnectFailure> {
        self.with_current(generation, |_| ())
    }

    /// Breakout room if one is set, else the configured room. Without a
    /// configured room a random one is generated and persisted so every
    /// participant converges on it.
    fn resolve_room(&self, settings: &AvSettings) -> (RoomName, bool) {
        if let Some(room) = self.breakout_room() {
            return (room, true);
        }
        if let Some(room) = settings.world.server.configured_room() {
            return (room.clone(), false);
        }
        warn!("No meeting room set, creating random name.");
        let room = RoomName::new(random_id(ROOM_NAME_LENGTH));
        self.shared.host.set_room(&room);
        (room, false)
    }

    async fn try_connect(&self, generation: u64) -> Result<(), ConnectFailure> {
        let shared = &self.shared;
        let settings = shared.host.settings();
        let options = lock(&shared.inner)
            .options
            .clone()
            .ok_or(AvError::NotInitialized)?;

        let (room, in_breakout) = self.resolve_room(&settings);
        debug!("Meeting room name: {room}");
        let options = options.with_room(&room)?;

        // Transport
        let transport = shared.library.create_connection(&options);
        let mut transport_events = transport.events();
        self.with_current(generation, |inner| {
            inner.transport = Some(transport.clone());
            inner.room = Some(room.clone());
        })?;
        debug!("Connection created with options: {options:?}");

        if lock(&shared.registry).allows_external_users() {
            shared
                .host
                .set_external_users_url(&options.meeting_url(&room));
        }

        let server = &settings.world.server;
        let credentials = (server.kind == ServerKind::Custom).then(|| Credentials {
            id: server.username.clone(),
            password: server.password.clone(),
        });
        transport.connect(credentials).await;
        self.check(generation)?;
        self.await_transport(&mut transport_events).await?;
        self.check(generation)?;

        // Conference
        let conference = transport.init_conference(&room, &options);
        let local_user = shared.host.local_user();
        conference.set_display_name(&local_user.name);
        conference.set_local_participant_property(HOST_USER_ID_PROPERTY, local_user.id.as_str());
        let mut conference_events = conference.events();

        // Occupants already in the room are announced before our own join,
        // so the bridge has to be listening before join() is called.
        let ctx = BridgeContext {
            conference: conference.clone(),
            room: room.clone(),
            in_breakout,
            active: shared.active.clone(),
            reconnect: self.reconnect_callback(generation),
        };
        let subscription = shared.bridge.subscribe(
            ctx,
            transport_events.clone(),
            conference_events.clone(),
        );
        self.with_current(generation, |inner| {
            inner.conference = Some(conference.clone());
            inner.subscription = Some(subscription);
        })?;
        conference.join();
        let joined = self
            .await_join(&mut transport_events, &mut conference_events)
            .await;
        // Unread receivers would hold back the channels once they fill up.
        drop(transport_events);
        drop(conference_events);
        joined?;
        self.check(generation)?;
        if settings.client.captions_enabled {
            conference.set_local_participant_property(REQUESTING_TRANSCRIPTION_PROPERTY, "true");
        }

        // Local tracks
        let selection = DeviceSelection {
            audio_id: settings
                .client
                .audio_src
                .clone()
                .filter(|_| settings.world.mode.audio_enabled()),
            video_id: settings
                .client
                .video_src
                .clone()
                .filter(|_| settings.world.mode.video_enabled()),
        };
        let acquired = shared.tracks.acquire(&selection).await;
        if self.check(generation).is_err() {
            acquired.dispose_all().await;
            return Err(ConnectFailure::Superseded);
        }
        let published = shared.tracks.publish(conference.as_ref(), acquired).await;
        if self.check(generation).is_err() {
            published.dispose_all().await;
            return Err(ConnectFailure::Superseded);
        }
        shared.tracks.install(published).await;
        shared
            .tracks
            .apply_initial_state(settings.client.voice.mode)
            .await;

        // Local participant
        let local_id = conference.my_user_id();
        self.with_current(generation, |inner| {
            lock(&shared.registry).register_local(&local_id, &local_user);
            inner.state = SessionState::Connected(SessionHandle {
                room: room.clone(),
                local_id: local_id.clone(),
                generation,
            });
        })?;

        info!("Joined room {room} as {local_id}");
        shared.bridge.request_render();
        Ok(())
    }

    async fn await_transport(
        &self,
        events: &mut Receiver<TransportEvent>,
    ) -> Result<(), ConnectFailure> {
        let wait = async {
            loop {
                match events.recv().await {
                    Ok(TransportEvent::Established) => return Ok::<(), ConnectFailure>(()),
                    Ok(TransportEvent::Failed { code, message }) => {
                        return Err(transport_failure(code, message).into())
                    }
                    Ok(TransportEvent::Disconnected(reason)) => {
                        debug!("Disconnected while connecting: {reason:?}");
                        return Err(ConnectFailure::Interrupted);
                    }
                    Err(RecvError::Overflowed(skipped)) => {
                        warn!("Missed {skipped} transport events");
                    }
                    Err(RecvError::Closed) => {
                        return Err(AvError::Library(anyhow!("transport event channel closed")).into())
                    }
                }
            }
        };
        match tokio::time::timeout(self.shared.config.connect_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(AvError::Timeout("transport").into()),
        }
    }

    /// Wait for our own join. Everything else on the channels is left to the
    /// bridge, which reads its own copies of them.
    async fn await_join(
        &self,
        transport: &mut Receiver<TransportEvent>,
        conference: &mut Receiver<ConferenceEvent>,
    ) -> Result<(), ConnectFailure> {
        let wait = async {
            loop {
                tokio::select! {
                    event = conference.recv() => match event {
                        Ok(ConferenceEvent::Joined) => return Ok::<(), ConnectFailure>(()),
                        Ok(ConferenceEvent::Error(code)) => {
                            return Err(AvError::Library(anyhow!("conference error: {code}")).into())
                        }
                        Ok(ConferenceEvent::ConnectionInterrupted) => {
                            debug!("Conference interrupted while joining");
                            return Err(ConnectFailure::Interrupted);
                        }
                        Ok(_) => {}
                        Err(RecvError::Overflowed(skipped)) => {
                            warn!("Missed {skipped} conference events");
                        }
                        Err(RecvError::Closed) => {
                            return Err(
                                AvError::Library(anyhow!("conference event channel closed")).into()
                            )
                        }
                    },
                    event = transport.recv() => match event {
                        Ok(TransportEvent::Established) => {}
                        Ok(TransportEvent::Failed { code, message }) => {
                            return Err(transport_failure(code, message).into())
                        }
                        Ok(TransportEvent::Disconnected(reason)) => {
                            debug!("Disconnected while joining: {reason:?}");
                            return Err(ConnectFailure::Interrupted);
                        }
                        Err(RecvError::Overflowed(skipped)) => {
                            warn!("Missed {skipped} transport events");
                        }
                        Err(RecvError::Closed) => {
                            return Err(
                                AvError::Library(anyhow!("transport event channel closed")).into()
                            )
                        }
                    },
                }
            }
        };
        match tokio::time::timeout(self.shared.config.connect_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(AvError::Timeout("conference join").into()),
        }
    }

    /// Callback the bridge fires on an unsolicited interruption. It only acts
    /// for the generation it was created for, and only once.
    fn reconnect_callback(&self, generation: u64) -> Callback<()> {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        Callback::from(move |_: ()| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            {
                let mut inner = lock(&shared.inner);
                if inner.generation != generation || inner.state == SessionState::Reconnecting {
                    return;
                }
                inner.state = SessionState::Reconnecting;
            }
            let controller = SessionController { shared };
            tokio::spawn(async move {
                if !controller.connect().await {
                    warn!("Reconnect failed");
                }
            });
        })
    }
}

fn transport_failure(code: String, message: Option<String>) -> AvError {
    AvError::Library(anyhow!(
        "connection failed: {code} {}",
        message.unwrap_or_default()
    ))
}
